//! Parse error types

use crate::parser::token::{Span, Token};
use thiserror::Error;

/// A parse error with location and contextual information.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Parse error at {}:{}: {message}", span.line, span.column)]
pub struct ParseError {
    /// The kind of error that occurred
    pub kind: ParseErrorKind,

    /// Source location of the error
    pub span: Span,

    /// Human-readable error message
    pub message: String,
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// Unexpected token found
    UnexpectedToken { expected: Vec<Token>, found: Token },

    /// Unexpected end of file
    UnexpectedEof { expected: Vec<Token> },

    /// Invalid syntax
    InvalidSyntax { reason: String },

    /// Parser exceeded its depth limit
    ParserLimitExceeded,
}

fn describe(expected: &[Token]) -> String {
    match expected {
        [] => "a token".to_string(),
        [single] => single.to_string(),
        many => {
            let names: Vec<String> = many.iter().map(|t| t.to_string()).collect();
            format!("one of {}", names.join(", "))
        }
    }
}

impl ParseError {
    /// Create an "unexpected token" error.
    pub fn unexpected_token(expected: Vec<Token>, found: Token, span: Span) -> Self {
        let message = format!("expected {}, found {}", describe(&expected), found);
        Self {
            kind: ParseErrorKind::UnexpectedToken { expected, found },
            span,
            message,
        }
    }

    /// Create an "unexpected EOF" error.
    pub fn unexpected_eof(expected: Vec<Token>, span: Span) -> Self {
        let message = format!("unexpected end of file, expected {}", describe(&expected));
        Self {
            kind: ParseErrorKind::UnexpectedEof { expected },
            span,
            message,
        }
    }

    /// Create an "invalid syntax" error.
    pub fn invalid_syntax(reason: impl Into<String>, span: Span) -> Self {
        let reason = reason.into();
        Self {
            message: format!("invalid syntax: {}", reason),
            kind: ParseErrorKind::InvalidSyntax { reason },
            span,
        }
    }

    /// Create a "parser limit exceeded" error.
    pub fn parser_limit_exceeded(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ParseErrorKind::ParserLimitExceeded,
            span,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_token_message() {
        let err = ParseError::unexpected_token(
            vec![Token::Semicolon],
            Token::Comma,
            Span::new(4, 5, 2, 3),
        );
        assert_eq!(err.to_string(), "Parse error at 2:3: expected ;, found ,");
    }

    #[test]
    fn test_multiple_expected() {
        let err = ParseError::unexpected_eof(
            vec![Token::RightParen, Token::Comma],
            Span::default(),
        );
        assert!(err.message.contains("one of ), ,"));
    }
}
