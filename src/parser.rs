//! Parser for console search commands.
//!
//! ```text
//! command  := meta | search
//! meta     := "help" | "entities" | "quit" | "exit"
//! search   := entity list list option*
//! list     := value ("," value)*
//! option   := WORD "=" value
//! value    := WORD | STRING
//! ```
//!
//! ```text
//! posts title,user.name "launch day",release matchType=exact boolean=and
//! products price 100 operator=> page=2 perPage=20
//! ```
//!
//! `page` and `perPage` paginate the result; every other option key is
//! handed to [`SearchOptions::from_pairs`](crate::ast::SearchOptions::from_pairs).

use crate::token::{Span, Token, TokenKind};

/// A parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Entities,
    Quit,
    Search(SearchCommand),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchCommand {
    pub entity: String,
    pub fields: Vec<String>,
    pub terms: Vec<String>,
    /// Search option pairs in input order.
    pub options: Vec<(String, String)>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

pub struct Parser<'a> {
    tokens: &'a [Token<'a>],
    position: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Option<Span>,
}

impl ParseError {
    fn new(message: String, span: Option<Span>) -> Self {
        Self { message, span }
    }

    fn at_position(message: String, span: Span) -> Self {
        Self { message, span: Some(span) }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.span {
            Some(span) => write!(f, "{} (at {}-{})", self.message, span.start, span.end),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ParseError {}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token<'a>]) -> Self {
        Self { tokens, position: 0 }
    }

    /// Returns the current token without advancing.
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.position)
    }

    /// Returns the token after the current one.
    fn peek_next(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.position + 1)
    }

    fn advance(&mut self) -> Option<&Token<'a>> {
        let token = self.tokens.get(self.position);
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn match_token(&self, kind: &TokenKind) -> bool {
        self.peek()
            .map(|t| std::mem::discriminant(&t.kind) == std::mem::discriminant(kind))
            .unwrap_or(false)
    }

    pub fn parse(&mut self) -> Result<Command, ParseError> {
        let Some(first) = self.peek() else {
            return Err(ParseError::new("Empty command".to_string(), None));
        };

        if self.tokens.len() == 1 {
            if let TokenKind::Word(word) = first.kind {
                match word.to_ascii_lowercase().as_str() {
                    "help" => return Ok(Command::Help),
                    "entities" => return Ok(Command::Entities),
                    "quit" | "exit" => return Ok(Command::Quit),
                    _ => {}
                }
            }
        }

        self.parse_search().map(Command::Search)
    }

    fn parse_search(&mut self) -> Result<SearchCommand, ParseError> {
        let entity = self.parse_word("entity name")?;
        let fields = self.parse_list("field list")?;
        let terms = self.parse_list("search terms")?;

        let mut command = SearchCommand {
            entity,
            fields,
            terms,
            ..Default::default()
        };

        while self.peek().is_some() {
            let key_span = self.peek().map(|t| t.span).unwrap_or_default();
            let key = self.parse_word("option key")?;
            self.expect_equals()?;
            let value_span = self.peek().map(|t| t.span).unwrap_or(key_span);
            let value = self.parse_value("option value")?;

            match key.as_str() {
                "page" => command.page = Some(parse_number(&value, value_span)?),
                "perPage" => command.per_page = Some(parse_number(&value, value_span)?),
                _ => command.options.push((key, value)),
            }
        }

        Ok(command)
    }

    /// Parses `value ("," value)*`.
    ///
    /// A word directly followed by `=` is an option, not a list item.
    fn parse_list(&mut self, what: &str) -> Result<Vec<String>, ParseError> {
        if let (Some(_), Some(next)) = (self.peek(), self.peek_next()) {
            if matches!(next.kind, TokenKind::Equals) {
                return Err(ParseError::at_position(
                    format!("Expected {}, found an option", what),
                    next.span,
                ));
            }
        }

        let mut values = vec![self.parse_value(what)?];
        while self.match_token(&TokenKind::Comma) {
            self.advance(); // consume ','
            values.push(self.parse_value(what)?);
        }
        Ok(values)
    }

    fn parse_word(&mut self, what: &str) -> Result<String, ParseError> {
        match self.advance() {
            Some(Token { kind: TokenKind::Word(w), .. }) => Ok(w.to_string()),
            Some(token) => Err(ParseError::at_position(
                format!("Expected {}, found {:?}", what, token.kind),
                token.span,
            )),
            None => Err(ParseError::new(format!("Expected {}, but reached end of input", what), None)),
        }
    }

    fn parse_value(&mut self, what: &str) -> Result<String, ParseError> {
        match self.advance() {
            Some(Token { kind: TokenKind::Word(w), .. }) => Ok(w.to_string()),
            Some(Token { kind: TokenKind::String(s), .. }) => Ok(s.to_string()),
            Some(Token { kind: TokenKind::Illegal, span }) => Err(ParseError::at_position(
                "Unterminated string".to_string(),
                *span,
            )),
            Some(token) => Err(ParseError::at_position(
                format!("Expected {}, found {:?}", what, token.kind),
                token.span,
            )),
            None => Err(ParseError::new(format!("Expected {}, but reached end of input", what), None)),
        }
    }

    fn expect_equals(&mut self) -> Result<(), ParseError> {
        match self.advance() {
            Some(Token { kind: TokenKind::Equals, .. }) => Ok(()),
            Some(token) => Err(ParseError::at_position(
                format!("Expected '=', found {:?}", token.kind),
                token.span,
            )),
            None => Err(ParseError::new("Expected '=', but reached end of input".to_string(), None)),
        }
    }
}

fn parse_number(value: &str, span: Span) -> Result<u64, ParseError> {
    value
        .parse::<u64>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ParseError::at_position(format!("'{}' is not a positive number", value), span))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse_string(input: &str) -> Result<Command, ParseError> {
        let tokens: Vec<_> = Lexer::new(input).collect();
        Parser::new(&tokens).parse()
    }

    fn parse_search(input: &str) -> SearchCommand {
        match parse_string(input).unwrap() {
            Command::Search(command) => command,
            other => panic!("Expected search command, got {:?}", other),
        }
    }

    #[test]
    fn test_simple_search() {
        let command = parse_search("posts title launch");
        assert_eq!(command.entity, "posts");
        assert_eq!(command.fields, vec!["title"]);
        assert_eq!(command.terms, vec!["launch"]);
        assert!(command.options.is_empty());
    }

    #[test]
    fn test_lists_and_quoted_terms() {
        let command = parse_search(r#"posts title,user.name "launch day",release"#);
        assert_eq!(command.fields, vec!["title", "user.name"]);
        assert_eq!(command.terms, vec!["launch day", "release"]);
    }

    #[test]
    fn test_options_and_pagination() {
        let command = parse_search("products price 100 operator=> page=2 perPage=20");
        assert_eq!(command.options, vec![("operator".to_string(), ">".to_string())]);
        assert_eq!(command.page, Some(2));
        assert_eq!(command.per_page, Some(20));
    }

    #[test]
    fn test_quoted_option_value() {
        let command = parse_search(r#"posts title x matchType="startsWith""#);
        assert_eq!(
            command.options,
            vec![("matchType".to_string(), "startsWith".to_string())]
        );
    }

    #[test]
    fn test_meta_commands() {
        assert_eq!(parse_string("help").unwrap(), Command::Help);
        assert_eq!(parse_string("entities").unwrap(), Command::Entities);
        assert_eq!(parse_string("EXIT").unwrap(), Command::Quit);
    }

    #[test]
    fn test_missing_terms_is_error() {
        let err = parse_string("posts title").unwrap_err();
        assert!(err.message.contains("search terms"));

        let err = parse_string("posts title matchType=exact").unwrap_err();
        assert!(err.message.contains("found an option"));
    }

    #[test]
    fn test_trailing_comma_is_error() {
        assert!(parse_string("posts title, launch").is_err());
        assert!(parse_string("posts title launch,").is_err());
    }

    #[test]
    fn test_bad_page_is_error() {
        let err = parse_string("posts title x page=first").unwrap_err();
        assert!(err.span.is_some());
    }

    #[test]
    fn test_zero_page_size_is_error() {
        let err = parse_string("posts title x perPage=0").unwrap_err();
        assert_eq!(err.message, "'0' is not a positive number");
        assert!(parse_string("posts title x page=0").is_err());
    }

    #[test]
    fn test_term_starting_with_bang() {
        let command = parse_search("posts title !important boolean=and");
        assert_eq!(command.terms, vec!["!important"]);
        assert_eq!(command.options, vec![("boolean".to_string(), "and".to_string())]);
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let err = parse_string(r#"posts title "launch"#).unwrap_err();
        assert_eq!(err.message, "Unterminated string");
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(parse_string("   ").is_err());
    }
}
