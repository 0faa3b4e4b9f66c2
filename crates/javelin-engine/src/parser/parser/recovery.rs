//! Error recovery strategies for the parser.
//!
//! After an error the parser skips tokens to a statement boundary so that
//! later errors in the same file are still reported.

use super::Parser;
use crate::parser::token::Token;

/// Synchronize to the next statement boundary.
pub fn sync_to_statement_boundary(parser: &mut Parser) {
    while !parser.at_eof() {
        match parser.current() {
            Token::Function
            | Token::Class
            | Token::Interface
            | Token::Enum
            | Token::Let
            | Token::Const
            | Token::Var
            | Token::If
            | Token::While
            | Token::Do
            | Token::For
            | Token::Switch
            | Token::Try
            | Token::Return
            | Token::Break
            | Token::Continue
            | Token::Throw
            | Token::Import
            | Token::Export => return,

            // Semicolon marks end of previous statement
            Token::Semicolon => {
                parser.advance();
                return;
            }

            Token::RightBrace => {
                parser.advance();
                return;
            }

            _ => {
                parser.advance();
            }
        }
    }
}

/// Skip tokens until we find one of the expected tokens.
pub fn skip_until(parser: &mut Parser, expected: &[Token]) {
    while !parser.at_eof() && !parser.check_any(expected) {
        parser.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_to_statement_boundary() {
        let mut parser = Parser::new("invalid tokens let x = 42;").unwrap();
        parser.advance();
        parser.advance();
        sync_to_statement_boundary(&mut parser);
        assert!(matches!(parser.current(), Token::Let));
    }

    #[test]
    fn test_sync_consumes_semicolon() {
        let mut parser = Parser::new("a b ; c").unwrap();
        sync_to_statement_boundary(&mut parser);
        assert!(parser.check_identifier("c"));
    }

    #[test]
    fn test_skip_until() {
        let mut parser = Parser::new("a b ) c").unwrap();
        skip_until(&mut parser, &[Token::RightParen]);
        assert!(matches!(parser.current(), Token::RightParen));
    }
}
