//! Pattern parsing (for destructuring and parameter bindings)

use super::{expr, guards, ParseError, Parser};
use crate::parser::ast::*;
use crate::parser::token::Token;

/// Parse a binding pattern (identifier or destructuring).
pub fn parse_pattern(parser: &mut Parser) -> Result<Pattern, ParseError> {
    guards::enter(parser, "pattern")?;
    let result = match parser.current() {
        Token::LeftBracket => parse_array_pattern(parser),
        Token::LeftBrace => parse_object_pattern(parser),
        _ => parser.expect_identifier().map(Pattern::Identifier),
    };
    guards::leave(parser);
    result
}

/// Parse array destructuring pattern: [a, b], [x, , z], [first, ...rest]
fn parse_array_pattern(parser: &mut Parser) -> Result<Pattern, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::LeftBracket)?;

    let mut elements = Vec::new();
    let mut rest = None;
    while !parser.check(&Token::RightBracket) && !parser.at_eof() {
        if parser.eat(&Token::Comma) {
            elements.push(None);
            continue;
        }
        if parser.eat(&Token::DotDotDot) {
            rest = Some(Box::new(parse_pattern(parser)?));
            break;
        }
        let pattern = parse_pattern(parser)?;
        // Element defaults are accepted and dropped; destructuring is not lowered.
        if parser.eat(&Token::Equal) {
            expr::parse_assignment_expression(parser)?;
        }
        elements.push(Some(pattern));
        if !parser.eat(&Token::Comma) {
            break;
        }
    }
    parser.expect(Token::RightBracket)?;

    Ok(Pattern::Array(ArrayPattern {
        elements,
        rest,
        span: parser.span_from(&start_span),
    }))
}

/// Parse object destructuring pattern: { x, y: z, w = 1, ...rest }
fn parse_object_pattern(parser: &mut Parser) -> Result<Pattern, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::LeftBrace)?;

    let mut properties = Vec::new();
    let mut rest = None;
    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        if parser.eat(&Token::DotDotDot) {
            rest = Some(parser.expect_identifier()?);
            break;
        }
        let prop_start = parser.current_span();
        let key = parser.expect_property_name()?;
        let value = if parser.eat(&Token::Colon) {
            parse_pattern(parser)?
        } else {
            Pattern::Identifier(key.clone())
        };
        let default_value = if parser.eat(&Token::Equal) {
            Some(expr::parse_assignment_expression(parser)?)
        } else {
            None
        };
        properties.push(ObjectPatternProperty {
            key,
            value,
            default_value,
            span: parser.span_from(&prop_start),
        });
        if !parser.eat(&Token::Comma) {
            break;
        }
    }
    parser.expect(Token::RightBrace)?;

    Ok(Pattern::Object(ObjectPattern {
        properties,
        rest,
        span: parser.span_from(&start_span),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(source: &str) -> Pattern {
        let mut parser = Parser::new(source).unwrap();
        parse_pattern(&mut parser).unwrap()
    }

    #[test]
    fn test_identifier_pattern() {
        assert_eq!(pattern("value").as_identifier().unwrap().name, "value");
    }

    #[test]
    fn test_contextual_keyword_as_binding() {
        assert_eq!(pattern("type").as_identifier().unwrap().name, "type");
    }

    #[test]
    fn test_array_pattern_with_hole_and_rest() {
        match pattern("[a, , b, ...rest]") {
            Pattern::Array(arr) => {
                assert_eq!(arr.elements.len(), 3);
                assert!(arr.elements[1].is_none());
                assert!(arr.rest.is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_object_pattern_rename_and_default() {
        match pattern("{ x, y: z, w = 1 }") {
            Pattern::Object(obj) => {
                assert_eq!(obj.properties.len(), 3);
                assert_eq!(obj.properties[1].value.as_identifier().unwrap().name, "z");
                assert!(obj.properties[2].default_value.is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
