//! The hand-written scanner.
//!
//! Scanning policy:
//!
//! - The line counter starts at 1 and is bumped on `\n`; stray `\r`
//!   outside literals is dropped.
//! - String literals (`"…"`) and character literals (`'…'`) are absorbed
//!   into a single lexeme, quotes included. A backslash escapes the
//!   following character, so escaped quotes do not terminate the literal.
//! - `//` comments run to end of line, `/* … */` comments to their
//!   terminator. Both are dropped unless comment inclusion is requested.
//! - Symbols are single characters, except that two adjacent symbol
//!   characters fuse into one lexeme when neither is structural
//!   (`(`, `)`, `{`, `}`, `]`, `,`). This yields `==`, `<=`, `>>`, `||`,
//!   `&&`, `^^`, `!!` and friends without a dedicated operator table.
//! - The dot is not a symbol: it stays glued to the surrounding
//!   identifier (`a.b`, `3.14`), except immediately after a `)` where it
//!   is emitted on its own to support method chaining.
//! - Everything else accumulates into an identifier/number lexeme that is
//!   flushed at the next symbol or whitespace.

use crate::cursor::Cursor;
use crate::lexeme::{is_structural, is_symbol_char, Lexeme};

/// Scan `source` into lexemes, dropping comments.
pub fn scan(source: &str) -> Vec<Lexeme> {
    Scanner::new(source).scan()
}

/// Configurable scanner over one source file.
///
/// # Example
///
/// ```
/// use rlc_lex::Scanner;
///
/// let lexemes = Scanner::new("var x = 10;").scan();
/// let texts: Vec<&str> = lexemes.iter().map(|l| l.text.as_str()).collect();
/// assert_eq!(texts, vec!["var", "x", "=", "10", ";"]);
/// ```
pub struct Scanner<'a> {
    cursor: Cursor<'a>,
    include_comments: bool,
    lexemes: Vec<Lexeme>,
    accumulator: String,
    accumulator_line: u32,
}

impl<'a> Scanner<'a> {
    /// Create a scanner over `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            include_comments: false,
            lexemes: Vec::new(),
            accumulator: String::new(),
            accumulator_line: 1,
        }
    }

    /// Emit comments as lexemes instead of dropping them.
    pub fn with_comments(mut self) -> Self {
        self.include_comments = true;
        self
    }

    /// Run the scanner to completion.
    pub fn scan(mut self) -> Vec<Lexeme> {
        while !self.cursor.is_at_end() {
            let c = self.cursor.current_char();

            match c {
                '\r' => {
                    // Dropped outside literals; literals absorb their own.
                    self.flush();
                    self.cursor.advance();
                },
                _ if c.is_whitespace() => {
                    self.flush();
                    self.cursor.advance();
                },
                '"' | '\'' => {
                    self.flush();
                    self.scan_literal(c);
                },
                '/' if self.cursor.char_at(1) == '/' => {
                    self.flush();
                    self.scan_line_comment();
                },
                '/' if self.cursor.char_at(1) == '*' => {
                    self.flush();
                    self.scan_block_comment();
                },
                '.' => self.scan_dot(),
                _ if is_symbol_char(c) => {
                    self.flush();
                    self.scan_symbol(c);
                },
                _ => {
                    if self.accumulator.is_empty() {
                        self.accumulator_line = self.cursor.line();
                    }
                    self.accumulator.push(c);
                    self.cursor.advance();
                },
            }
        }

        self.flush();
        self.lexemes
    }

    /// Flush the identifier/number accumulator, if any.
    fn flush(&mut self) {
        if !self.accumulator.is_empty() {
            let text = std::mem::take(&mut self.accumulator);
            self.lexemes.push(Lexeme::new(text, self.accumulator_line));
        }
    }

    /// Absorb a string or character literal, quotes included. A backslash
    /// always carries the next character along, so escaped quotes and
    /// escaped backslashes never terminate the literal early.
    fn scan_literal(&mut self, quote: char) {
        let line = self.cursor.line();
        let mut text = String::new();
        text.push(quote);
        self.cursor.advance();

        while !self.cursor.is_at_end() {
            let c = self.cursor.current_char();
            if c == '\\' {
                text.push(c);
                self.cursor.advance();
                if !self.cursor.is_at_end() {
                    text.push(self.cursor.current_char());
                    self.cursor.advance();
                }
                continue;
            }

            text.push(c);
            self.cursor.advance();
            if c == quote {
                break;
            }
        }

        self.lexemes.push(Lexeme::new(text, line));
    }

    /// Absorb a `//` comment up to (not including) the end of line.
    fn scan_line_comment(&mut self) {
        let line = self.cursor.line();
        let mut text = String::new();

        while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
            text.push(self.cursor.current_char());
            self.cursor.advance();
        }

        if self.include_comments {
            self.lexemes.push(Lexeme::new(text, line));
        }
    }

    /// Absorb a `/* … */` comment, terminator included.
    fn scan_block_comment(&mut self) {
        let line = self.cursor.line();
        let mut text = String::new();

        while !self.cursor.is_at_end() {
            let c = self.cursor.current_char();
            text.push(c);
            self.cursor.advance();
            if c == '*' && self.cursor.current_char() == '/' {
                text.push('/');
                self.cursor.advance();
                break;
            }
        }

        if self.include_comments {
            self.lexemes.push(Lexeme::new(text, line));
        }
    }

    /// The dot is glued to the surrounding identifier, except directly
    /// after a `)` where it becomes its own symbol so chained calls
    /// (`foo().bar()`) split at the call boundary.
    fn scan_dot(&mut self) {
        let after_paren = self.accumulator.is_empty()
            && self
                .lexemes
                .last()
                .map(|l| l.text == ")")
                .unwrap_or(false);

        if after_paren {
            let line = self.cursor.line();
            self.cursor.advance();
            self.lexemes.push(Lexeme::new(".", line));
        } else {
            if self.accumulator.is_empty() {
                self.accumulator_line = self.cursor.line();
            }
            self.accumulator.push('.');
            self.cursor.advance();
        }
    }

    /// Emit a one- or two-character symbol lexeme.
    fn scan_symbol(&mut self, first: char) {
        let line = self.cursor.line();
        let mut text = String::new();
        text.push(first);
        self.cursor.advance();

        let second = self.cursor.current_char();
        if is_symbol_char(second) && !is_structural(first) && !is_structural(second) {
            text.push(second);
            self.cursor.advance();
        }

        self.lexemes.push(Lexeme::new(text, line));
    }
}


#[cfg(test)]
mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Every lexeme's line is within the line count of the source.
        #[test]
        fn lexeme_lines_within_bounds(source in "\\PC*") {
            let line_count = source.split('\n').count() as u32;
            for lexeme in scan(&source) {
                prop_assert!(lexeme.line >= 1);
                prop_assert!(lexeme.line <= line_count.max(1));
            }
        }

        /// Scanning arbitrary input never panics and never emits an
        /// empty lexeme.
        #[test]
        fn no_empty_lexemes(source in ".*") {
            for lexeme in scan(&source) {
                prop_assert!(!lexeme.text.is_empty());
            }
        }
    }
}
