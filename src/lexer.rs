//! Lexer for console search commands.
//!
//! Words run until whitespace, `,`, `=` or `"`. A word that starts with a
//! comparison character (`<`, `>`, `!`) also swallows the `=` that follows,
//! so `operator=>=` lexes as `operator`, `=`, `>=`, and otherwise runs on like
//! any other word, so `!important` stays one word.

use crate::token::{Span, Token, TokenKind};

pub struct Lexer<'a> {
    input: &'a str,
    /// Current byte position in the input.
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, position: 0 }
    }

    /// Returns the character at the current position without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// Advances one character and returns it.
    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if let Some(c) = c {
            self.position += c.len_utf8();
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// Reads a double-quoted string; the opening quote is already consumed.
    fn read_string(&mut self, start: usize) -> Token<'a> {
        let content_start = self.position;
        while let Some(c) = self.peek() {
            if c == '"' {
                let content = &self.input[content_start..self.position];
                self.bump(); // closing quote
                return Token {
                    kind: TokenKind::String(content),
                    span: Span::new(start, self.position),
                };
            }
            self.bump();
        }
        Token {
            kind: TokenKind::Illegal,
            span: Span::new(start, self.position),
        }
    }

    /// Reads a comparison word such as `>`, `>=`, `!=` or `<>`, or a plain
    /// word that happens to start with one of those characters.
    fn read_operator(&mut self, start: usize) -> Token<'a> {
        while let Some(c) = self.peek() {
            if matches!(c, '<' | '>' | '!' | '=') {
                self.bump();
            } else {
                break;
            }
        }
        self.read_word(start)
    }

    fn read_word(&mut self, start: usize) -> Token<'a> {
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, ',' | '=' | '"') {
                break;
            }
            self.bump();
        }
        self.finish_word(start)
    }

    fn finish_word(&self, start: usize) -> Token<'a> {
        Token {
            kind: TokenKind::Word(&self.input[start..self.position]),
            span: Span::new(start, self.position),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        let start = self.position;

        let c = self.bump()?;

        let token = match c {
            ',' => Token { kind: TokenKind::Comma, span: Span::new(start, self.position) },
            '=' => Token { kind: TokenKind::Equals, span: Span::new(start, self.position) },
            '"' => self.read_string(start),
            '<' | '>' | '!' => self.read_operator(start),
            _ => self.read_word(start),
        };
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind<'_>> {
        Lexer::new(input).map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_command() {
        let input = r#"posts title,user.name "launch day""#;
        let mut lexer = Lexer::new(input);

        assert_eq!(lexer.next().unwrap().kind, TokenKind::Word("posts"));
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Word("title"));
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Comma);
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Word("user.name"));
        assert_eq!(lexer.next().unwrap().kind, TokenKind::String("launch day"));
        assert_eq!(lexer.next(), None);
    }

    #[test]
    fn test_options_and_operators() {
        assert_eq!(
            kinds("matchType=exact operator=>= operator=<> operator=!="),
            vec![
                TokenKind::Word("matchType"),
                TokenKind::Equals,
                TokenKind::Word("exact"),
                TokenKind::Word("operator"),
                TokenKind::Equals,
                TokenKind::Word(">="),
                TokenKind::Word("operator"),
                TokenKind::Equals,
                TokenKind::Word("<>"),
                TokenKind::Word("operator"),
                TokenKind::Equals,
                TokenKind::Word("!="),
            ]
        );
    }

    #[test]
    fn test_word_starting_with_comparison_char() {
        assert_eq!(
            kinds("posts title !important,<draft> >=5"),
            vec![
                TokenKind::Word("posts"),
                TokenKind::Word("title"),
                TokenKind::Word("!important"),
                TokenKind::Comma,
                TokenKind::Word("<draft>"),
                TokenKind::Word(">=5"),
            ]
        );
    }

    #[test]
    fn test_spans() {
        let tokens: Vec<_> = Lexer::new(r#"a "bc""#).collect();
        assert_eq!(tokens[0].span, Span::new(0, 1));
        assert_eq!(tokens[1].span, Span::new(2, 6));
    }

    #[test]
    fn test_unterminated_string_is_illegal() {
        assert_eq!(kinds(r#"posts "open"#), vec![TokenKind::Word("posts"), TokenKind::Illegal]);
    }

    #[test]
    fn test_unicode_words() {
        assert_eq!(kinds("café,naïve"), vec![
            TokenKind::Word("café"),
            TokenKind::Comma,
            TokenKind::Word("naïve"),
        ]);
    }
}
