//! The token definition for console search commands.

/// A token is a single unit of a command line, with a specific kind and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Span,
}

/// The kind of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'a> {
    /// A bare run of characters, e.g. `posts`, `user.name`, `>=`.
    Word(&'a str),
    /// The contents of a double-quoted string, without the quotes.
    String(&'a str),

    // Punctuation
    Comma,  // ,
    Equals, // =

    // Special
    Illegal, // An unterminated string
}

/// Represents a span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// The starting byte offset.
    pub start: usize,
    /// The ending byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}
