//! Lexer token types

// ============================================================================
// LEXER TYPES
// ============================================================================

/// Token kinds for the command-line grammar.
///
/// Quote stripping and unescaping (`""` and `\"` to `"`) happen during
/// scanning, so the carried strings are the resolved content. Whether a token
/// is an option is decided at scan time: an unquoted `=` splits the token
/// into name and value before any quote is seen.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A bare word: the command name or a field token.
    Word(String),
    /// A `name=value` pair with the value already unescaped.
    Option { name: String, value: String },

    // Special
    Eof,
    Error(String),
}

/// Source location span within the single raw command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// One-based column of the span start, for diagnostics.
    pub fn column(&self) -> usize {
        self.start + 1
    }
}

/// A token with its kind and source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}
