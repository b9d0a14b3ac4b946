//! rlc-util - Shared infrastructure for the Royal compiler.
//!
//! This crate holds the types every other phase of `rlc` depends on,
//! most importantly the [`Reporter`] used to collect diagnostics. The
//! front-end never propagates parse failures as `Result` errors; parsers
//! return `Option` and register faults with the reporter, so the reporter
//! is the single source of truth for "did this compilation fail".
//!
//! The reporter carries two channels:
//!
//! - the **immediate** channel, used by parsers that know the construct
//!   at hand is the right one and that the input is malformed, and
//! - the **queued** channel, used while probing one of several candidate
//!   productions. The caller either flushes the queue (the probe was the
//!   right production and its faults are real) or clears it (a different
//!   production matched, the probe's faults are noise).
//!
//! All per-compilation state lives in owned context objects; there are no
//! process-wide statics, which keeps one compilation per `Reporter` safe
//! to run per thread.

pub mod diagnostic;

pub use diagnostic::{Fault, Reporter};

// Re-export commonly used collection types.
pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;
