//! The lexeme type and the symbol classification policy.
//!
//! A lexeme is the smallest chunk of source the scanner emits: an
//! identifier or number, a string or character literal with its quotes, a
//! one- or two-character symbol, or (when requested) a comment. Every
//! lexeme carries the line its first character was seen on.

/// One scanned chunk of source text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lexeme {
    /// The exact text of the lexeme. String and character literals keep
    /// their surrounding quotes.
    pub text: String,
    /// Line the lexeme started on (1-based).
    pub line: u32,
}

impl Lexeme {
    /// Create a lexeme.
    pub fn new(text: impl Into<String>, line: u32) -> Self {
        Self {
            text: text.into(),
            line,
        }
    }

    /// Whether this lexeme is a string literal (kept with quotes).
    pub fn is_string(&self) -> bool {
        self.text.len() >= 2 && self.text.starts_with('"') && self.text.ends_with('"')
    }
}

/// Whether `c` is scanned as a symbol character.
///
/// The underscore belongs to identifiers, quotes open literals, and the
/// dot is glued to identifiers (see the scanner for the one exception
/// after `)`), so none of those count as symbols.
pub fn is_symbol_char(c: char) -> bool {
    c.is_ascii_punctuation() && !matches!(c, '_' | '.' | '"' | '\'')
}

/// Whether `c` is a structural character that never participates in a
/// two-character compound symbol: `(`, `)`, `{`, `}`, `]` and `,`.
///
/// `[` is deliberately absent; the exclusion set is exactly the one the
/// compound policy is defined over.
pub fn is_structural(c: char) -> bool {
    matches!(c, '(' | ')' | '{' | '}' | ']' | ',')
}

/// Whether `text` could begin an identifier or number accumulator, i.e.
/// is not a symbol, literal or whitespace chunk.
pub fn is_word(text: &str) -> bool {
    text.chars()
        .next()
        .map(|c| !is_symbol_char(c) && c != '"' && c != '\'')
        .unwrap_or(false)
}
