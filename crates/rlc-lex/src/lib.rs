//! rlc-lex - Lexical analysis for the Royal language.
//!
//! This crate covers the first two stages of the front-end:
//!
//! 1. The [`Scanner`] turns source text into a flat list of line-tagged
//!    [`Lexeme`]s. Strings, characters, comments and compound operators
//!    are recognized here; whitespace is dropped and comments are dropped
//!    unless the caller asks for them.
//! 2. The grouper ([`group`]) folds the lexeme list into a hierarchical
//!    [`TokenNode`] tree by splitting on `;` and `{`…`}`. The parser in
//!    `rlc-par` walks this tree instead of the raw lexeme stream, which
//!    keeps every statement parser a simple left-to-right walk over one
//!    line of tokens.
//!
//! Neither stage fails: malformed input still produces a lexeme list and
//! a tree, and the parsers downstream are responsible for rejecting it.
//! The only diagnostics raised here are for scope braces the grouper
//! cannot place.

pub mod cursor;
pub mod lexeme;
pub mod scanner;
pub mod tree;

pub use lexeme::Lexeme;
pub use scanner::{scan, Scanner};
pub use tree::{group, TokenNode};
