//! Diagnostic collection for the Royal front-end.
//!
//! Faults are data, not exceptions: every parser that rejects its input
//! registers a [`Fault`] here and returns `None` to its caller. The
//! [`Reporter`] owns all diagnostic state for one compilation and is
//! threaded by reference through the scanner, grouper and parsers.
//!
//! # Examples
//!
//! ```
//! use rlc_util::Reporter;
//!
//! let reporter = Reporter::new();
//! reporter.error("main.rl", 3, "Missing ';' from declaration.");
//!
//! if reporter.has_errors() {
//!     for fault in reporter.faults() {
//!         eprintln!("{}", fault);
//!     }
//! }
//! ```
//!
//! ## Speculative parsing
//!
//! ```
//! use rlc_util::Reporter;
//!
//! let reporter = Reporter::new();
//!
//! // Probe a production that turns out not to match.
//! reporter.queue("main.rl", 7, "Missing '(' from function call.");
//! reporter.clear_queued();
//! assert!(!reporter.has_errors());
//!
//! // Probe a production that does match; surface its faults.
//! reporter.queue("main.rl", 9, "Missing assignment operator.");
//! assert!(reporter.flush_queued());
//! assert!(reporter.has_errors());
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;

/// A single diagnostic bound to a source location.
///
/// Rendered as `source(line) Error: message`, matching the format the
/// driver writes to stderr.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fault {
    /// Source label, usually the path of the file being compiled.
    pub source: String,
    /// Line the fault was raised on (1-based).
    pub line: u32,
    /// Human-readable description of what went wrong.
    pub message: String,
}

impl Fault {
    /// Create a new fault.
    pub fn new(source: impl Into<String>, line: u32, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            line,
            message: message.into(),
        }
    }

    /// The source label with path separators normalized to the host
    /// convention. Forward slashes are rendered as backslashes on Windows;
    /// elsewhere the label is unchanged.
    pub fn location(&self) -> String {
        if cfg!(windows) {
            self.source.replace('/', "\\")
        } else {
            self.source.clone()
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}) Error: {}", self.location(), self.line, self.message)
    }
}

/// Collector for compilation diagnostics.
///
/// The reporter keeps a sticky has-errors bit alongside the fault list so
/// callers can cheaply check for failure at phase boundaries. Interior
/// mutability lets every parse function share one reporter by plain
/// reference; the type is deliberately not `Sync` — one compilation, one
/// reporter, one thread.
pub struct Reporter {
    /// Faults surfaced to the user, in emission order.
    faults: RefCell<Vec<Fault>>,
    /// Faults raised inside a speculative probe, awaiting flush or clear.
    queued: RefCell<Vec<Fault>>,
    /// Sticky bit, set by `error` and `flush_queued`.
    failed: Cell<bool>,
}

impl Reporter {
    /// Create an empty reporter.
    pub fn new() -> Self {
        Self {
            faults: RefCell::new(Vec::new()),
            queued: RefCell::new(Vec::new()),
            failed: Cell::new(false),
        }
    }

    /// Register a fault on the immediate channel and set the sticky
    /// has-errors bit.
    pub fn error(&self, source: &str, line: u32, message: impl Into<String>) {
        self.faults.borrow_mut().push(Fault::new(source, line, message));
        self.failed.set(true);
    }

    /// Append a fault to the speculative queue without setting the
    /// has-errors bit. The fault only becomes real on [`flush_queued`].
    ///
    /// [`flush_queued`]: Reporter::flush_queued
    pub fn queue(&self, source: &str, line: u32, message: impl Into<String>) {
        self.queued.borrow_mut().push(Fault::new(source, line, message));
    }

    /// Surface every queued fault in FIFO order and set the has-errors
    /// bit. Returns whether any fault was queued.
    pub fn flush_queued(&self) -> bool {
        let mut queued = self.queued.borrow_mut();
        if queued.is_empty() {
            return false;
        }
        self.faults.borrow_mut().append(&mut queued);
        self.failed.set(true);
        true
    }

    /// Discard every queued fault. Used when a speculative probe lost to
    /// another production.
    pub fn clear_queued(&self) {
        self.queued.borrow_mut().clear();
    }

    /// Whether any fault is waiting on the speculative queue.
    pub fn has_queued(&self) -> bool {
        !self.queued.borrow().is_empty()
    }

    /// Whether any fault has been surfaced this compilation.
    pub fn has_errors(&self) -> bool {
        self.failed.get()
    }

    /// Number of surfaced faults.
    pub fn fault_count(&self) -> usize {
        self.faults.borrow().len()
    }

    /// Snapshot of the surfaced faults, in emission order.
    pub fn faults(&self) -> Vec<Fault> {
        self.faults.borrow().clone()
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_reporter_is_clean() {
        let reporter = Reporter::new();
        assert!(!reporter.has_errors());
        assert!(!reporter.has_queued());
        assert_eq!(reporter.fault_count(), 0);
    }

    #[test]
    fn test_error_sets_sticky_bit() {
        let reporter = Reporter::new();
        reporter.error("main.rl", 1, "Missing ';' from declaration.");
        assert!(reporter.has_errors());
        assert_eq!(reporter.fault_count(), 1);
    }

    #[test]
    fn test_queue_does_not_set_sticky_bit() {
        let reporter = Reporter::new();
        reporter.queue("main.rl", 1, "Missing '(' from function call.");
        assert!(!reporter.has_errors());
        assert!(reporter.has_queued());
        assert_eq!(reporter.fault_count(), 0);
    }

    #[test]
    fn test_flush_queued_surfaces_faults() {
        let reporter = Reporter::new();
        reporter.queue("main.rl", 1, "first");
        reporter.queue("main.rl", 2, "second");
        assert!(reporter.flush_queued());
        assert!(reporter.has_errors());
        assert!(!reporter.has_queued());

        let faults = reporter.faults();
        assert_eq!(faults.len(), 2);
        assert_eq!(faults[0].message, "first");
        assert_eq!(faults[1].message, "second");
    }

    #[test]
    fn test_flush_queued_empty_returns_false() {
        let reporter = Reporter::new();
        assert!(!reporter.flush_queued());
        assert!(!reporter.has_errors());
    }

    #[test]
    fn test_clear_queued_discards() {
        let reporter = Reporter::new();
        reporter.queue("main.rl", 1, "noise");
        reporter.clear_queued();
        assert!(!reporter.has_queued());
        assert!(!reporter.flush_queued());
        assert!(!reporter.has_errors());
    }

    #[test]
    fn test_faults_preserve_emission_order() {
        let reporter = Reporter::new();
        reporter.error("a.rl", 5, "one");
        reporter.queue("a.rl", 9, "two");
        reporter.flush_queued();
        reporter.error("a.rl", 12, "three");

        let messages: Vec<_> = reporter.faults().into_iter().map(|f| f.message).collect();
        assert_eq!(messages, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_fault_display_format() {
        let fault = Fault::new("src/main.rl", 14, "Missing ')' from expression.");
        let rendered = format!("{}", fault);
        if cfg!(windows) {
            assert_eq!(rendered, "src\\main.rl(14) Error: Missing ')' from expression.");
        } else {
            assert_eq!(rendered, "src/main.rl(14) Error: Missing ')' from expression.");
        }
    }
}
