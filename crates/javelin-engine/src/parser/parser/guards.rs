//! Parser guards against runaway recursion

use super::{ParseError, Parser};

/// Maximum nesting depth before rejecting parse
pub const MAX_PARSE_DEPTH: usize = 64;

/// Increment the parser depth, failing once the limit is crossed.
/// Every successful call must be paired with [`leave`].
pub fn enter(parser: &mut Parser, what: &str) -> Result<(), ParseError> {
    parser.depth += 1;
    if parser.depth > MAX_PARSE_DEPTH {
        parser.depth -= 1;
        return Err(ParseError::parser_limit_exceeded(
            format!("maximum nesting depth ({}) exceeded in {}", MAX_PARSE_DEPTH, what),
            parser.current_span(),
        ));
    }
    Ok(())
}

#[inline]
pub fn leave(parser: &mut Parser) {
    parser.depth -= 1;
}

#[cfg(test)]
mod tests {
    use crate::parser::parser::Parser;

    #[test]
    fn test_deep_nesting_is_rejected() {
        let source = format!("let x = {}1{};", "(".repeat(400), ")".repeat(400));
        let errors = Parser::new(&source).unwrap().parse().unwrap_err();
        assert!(errors[0].message.contains("maximum nesting depth"));
    }

    #[test]
    fn test_moderate_nesting_is_accepted() {
        let source = format!("let x = {}1{};", "(".repeat(20), ")".repeat(20));
        assert!(Parser::new(&source).unwrap().parse().is_ok());
    }
}
