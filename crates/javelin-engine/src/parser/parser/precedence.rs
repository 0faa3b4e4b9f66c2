//! Operator precedence table for binary expression parsing.
//!
//! Follows JavaScript/TypeScript precedence rules. Assignment and the
//! conditional operator are handled separately by the expression parser.

use crate::parser::token::Token;

/// Operator precedence level (higher = tighter binding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    None = 0,
    NullCoalescing = 1,  // ??
    LogicalOr = 2,       // ||
    LogicalAnd = 3,      // &&
    BitwiseOr = 4,       // |
    BitwiseXor = 5,      // ^
    BitwiseAnd = 6,      // &
    Equality = 7,        // ==, !=, ===, !==
    Relational = 8,      // <, >, <=, >=, instanceof, in, as
    Shift = 9,           // <<, >>, >>>
    Additive = 10,       // +, -
    Multiplicative = 11, // *, /, %
    Exponentiation = 12, // **
}

/// Get the precedence of a binary operator token.
pub fn get_precedence(token: &Token) -> Precedence {
    match token {
        Token::QuestionQuestion => Precedence::NullCoalescing,
        Token::PipePipe => Precedence::LogicalOr,
        Token::AmpAmp => Precedence::LogicalAnd,
        Token::Pipe => Precedence::BitwiseOr,
        Token::Caret => Precedence::BitwiseXor,
        Token::Amp => Precedence::BitwiseAnd,
        Token::EqualEqual | Token::BangEqual | Token::EqualEqualEqual | Token::BangEqualEqual => {
            Precedence::Equality
        }
        Token::Less
        | Token::LessEqual
        | Token::Greater
        | Token::GreaterEqual
        | Token::Instanceof
        | Token::In
        | Token::As => Precedence::Relational,
        Token::LessLess | Token::GreaterGreater | Token::GreaterGreaterGreater => Precedence::Shift,
        Token::Plus | Token::Minus => Precedence::Additive,
        Token::Star | Token::Slash | Token::Percent => Precedence::Multiplicative,
        Token::StarStar => Precedence::Exponentiation,
        _ => Precedence::None,
    }
}

/// Check if an operator is right-associative.
pub fn is_right_associative(token: &Token) -> bool {
    matches!(token, Token::StarStar)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_ordering() {
        assert!(get_precedence(&Token::Star) > get_precedence(&Token::Plus));
        assert!(get_precedence(&Token::Plus) > get_precedence(&Token::Less));
        assert!(get_precedence(&Token::AmpAmp) > get_precedence(&Token::PipePipe));
        assert_eq!(get_precedence(&Token::Comma), Precedence::None);
    }

    #[test]
    fn test_right_associative() {
        assert!(is_right_associative(&Token::StarStar));
        assert!(!is_right_associative(&Token::Minus));
    }
}
