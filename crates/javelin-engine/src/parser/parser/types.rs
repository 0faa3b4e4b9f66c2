//! Type annotation parsing

use super::{guards, ParseError, Parser};
use crate::parser::ast::*;
use crate::parser::token::Token;

/// Parse a type annotation (after the `:` has been consumed).
pub fn parse_type_annotation(parser: &mut Parser) -> Result<TypeAnnotation, ParseError> {
    guards::enter(parser, "type annotation")?;
    let result = parse_union_type(parser);
    guards::leave(parser);
    result
}

/// Parse `: T` if present.
pub fn parse_optional_annotation(parser: &mut Parser) -> Result<Option<TypeAnnotation>, ParseError> {
    if parser.eat(&Token::Colon) {
        Ok(Some(parse_type_annotation(parser)?))
    } else {
        Ok(None)
    }
}

fn parse_union_type(parser: &mut Parser) -> Result<TypeAnnotation, ParseError> {
    let start_span = parser.current_span();
    // Leading `|` is allowed: type A = | "x" | "y"
    parser.eat(&Token::Pipe);

    let first = parse_postfix_type(parser)?;
    if !parser.check(&Token::Pipe) && !parser.check(&Token::Amp) {
        return Ok(first);
    }

    let mut members = vec![first];
    while parser.eat(&Token::Pipe) || parser.eat(&Token::Amp) {
        members.push(parse_postfix_type(parser)?);
    }
    let span = parser.span_from(&start_span);
    Ok(TypeAnnotation::new(Type::Union(members), span))
}

fn parse_postfix_type(parser: &mut Parser) -> Result<TypeAnnotation, ParseError> {
    let start_span = parser.current_span();
    let mut ty = parse_primary_type(parser)?;

    // T[] and T[][]; no line break allowed before `[`
    while parser.check(&Token::LeftBracket)
        && matches!(parser.peek(), Some(Token::RightBracket))
        && !parser.at_line_break()
    {
        parser.advance();
        parser.advance();
        let span = parser.span_from(&start_span);
        ty = TypeAnnotation::new(
            Type::Array(ArrayType {
                element_type: Box::new(ty),
            }),
            span,
        );
    }
    Ok(ty)
}

fn parse_primary_type(parser: &mut Parser) -> Result<TypeAnnotation, ParseError> {
    let start_span = parser.current_span();
    match parser.current().clone() {
        Token::LeftParen => {
            if let Some(function) = try_parse_function_type(parser)? {
                return Ok(function);
            }
            parser.advance();
            let inner = parse_type_annotation(parser)?;
            parser.expect(Token::RightParen)?;
            let span = parser.span_from(&start_span);
            Ok(TypeAnnotation::new(Type::Parenthesized(Box::new(inner)), span))
        }
        Token::LeftBracket => {
            parser.advance();
            let mut elements = Vec::new();
            while !parser.check(&Token::RightBracket) && !parser.at_eof() {
                elements.push(parse_type_annotation(parser)?);
                if !parser.eat(&Token::Comma) {
                    break;
                }
            }
            parser.expect(Token::RightBracket)?;
            let span = parser.span_from(&start_span);
            Ok(TypeAnnotation::new(Type::Tuple(elements), span))
        }
        Token::LeftBrace => parse_object_type(parser),
        Token::StringLiteral(value) => {
            parser.advance();
            Ok(TypeAnnotation::new(Type::Literal(LiteralType::String(value)), start_span))
        }
        Token::IntLiteral(raw) | Token::FloatLiteral(raw) => {
            parser.advance();
            Ok(TypeAnnotation::new(Type::Literal(LiteralType::Number(raw)), start_span))
        }
        Token::True | Token::False => {
            let value = matches!(parser.advance(), Token::True);
            Ok(TypeAnnotation::new(Type::Literal(LiteralType::Boolean(value)), start_span))
        }
        Token::Void => {
            parser.advance();
            Ok(TypeAnnotation::new(Type::Primitive(PrimitiveType::Void), start_span))
        }
        Token::Null => {
            parser.advance();
            Ok(TypeAnnotation::new(Type::Primitive(PrimitiveType::Null), start_span))
        }
        Token::Typeof => {
            // Type queries carry no information the lowering can use.
            parser.advance();
            parser.expect_identifier()?;
            while parser.eat(&Token::Dot) {
                parser.expect_property_name()?;
            }
            let span = parser.span_from(&start_span);
            Ok(TypeAnnotation::new(Type::Primitive(PrimitiveType::Any), span))
        }
        Token::Identifier(ref name) => {
            if let Some(primitive) = PrimitiveType::from_name(name) {
                if !matches!(parser.peek(), Some(Token::Dot)) {
                    parser.advance();
                    return Ok(TypeAnnotation::new(Type::Primitive(primitive), start_span));
                }
            }
            parse_type_reference(parser)
        }
        _ => Err(parser.unexpected_token(&[Token::Identifier(String::new()), Token::LeftParen])),
    }
}

fn parse_type_reference(parser: &mut Parser) -> Result<TypeAnnotation, ParseError> {
    let start_span = parser.current_span();
    let mut name = vec![parser.expect_identifier()?];
    while parser.check(&Token::Dot) {
        parser.advance();
        name.push(parser.expect_property_name()?);
    }

    let type_args = if parser.check(&Token::Less) {
        Some(parse_type_arguments(parser)?)
    } else {
        None
    };

    let span = parser.span_from(&start_span);
    Ok(TypeAnnotation::new(
        Type::Reference(TypeReference { name, type_args }),
        span,
    ))
}

/// Parse `<A, B>`.
pub fn parse_type_arguments(parser: &mut Parser) -> Result<Vec<TypeAnnotation>, ParseError> {
    parser.expect(Token::Less)?;
    let mut args = Vec::new();
    loop {
        args.push(parse_type_annotation(parser)?);
        if !parser.eat(&Token::Comma) {
            break;
        }
    }
    parser.expect_closing_angle()?;
    Ok(args)
}

/// Parse `<T extends X = Y, U>`.
pub fn parse_type_parameters(parser: &mut Parser) -> Result<Vec<TypeParameter>, ParseError> {
    parser.expect(Token::Less)?;
    let mut params = Vec::new();
    while !parser.check(&Token::Greater) && !parser.at_eof() {
        let start_span = parser.current_span();
        let name = parser.expect_identifier()?;
        let constraint = if parser.eat(&Token::Extends) {
            Some(parse_type_annotation(parser)?)
        } else {
            None
        };
        let default = if parser.eat(&Token::Equal) {
            Some(parse_type_annotation(parser)?)
        } else {
            None
        };
        params.push(TypeParameter {
            name,
            constraint,
            default,
            span: parser.span_from(&start_span),
        });
        if !parser.eat(&Token::Comma) {
            break;
        }
    }
    parser.expect_closing_angle()?;
    Ok(params)
}

/// Parse `<...>` type parameters when present.
pub fn parse_optional_type_parameters(
    parser: &mut Parser,
) -> Result<Option<Vec<TypeParameter>>, ParseError> {
    if parser.check(&Token::Less) {
        Ok(Some(parse_type_parameters(parser)?))
    } else {
        Ok(None)
    }
}

/// Try `(params) => R`; restores the cursor and returns `None` when the
/// parenthesis turns out to be a grouping.
fn try_parse_function_type(parser: &mut Parser) -> Result<Option<TypeAnnotation>, ParseError> {
    let start_span = parser.current_span();
    let checkpoint = parser.checkpoint();
    let params = match parse_function_type_params(parser) {
        Ok(params) if parser.check(&Token::Arrow) => params,
        _ => {
            parser.restore(checkpoint);
            return Ok(None);
        }
    };
    parser.expect(Token::Arrow)?;
    let return_type = parse_type_annotation(parser)?;
    let span = parser.span_from(&start_span);
    Ok(Some(TypeAnnotation::new(
        Type::Function(FunctionType {
            params,
            return_type: Box::new(return_type),
        }),
        span,
    )))
}

fn parse_function_type_params(parser: &mut Parser) -> Result<Vec<FunctionTypeParam>, ParseError> {
    parser.expect(Token::LeftParen)?;
    let mut params = Vec::new();
    while !parser.check(&Token::RightParen) && !parser.at_eof() {
        let is_rest = parser.eat(&Token::DotDotDot);
        let name = if parser.check(&Token::This) {
            let span = parser.current_span();
            parser.advance();
            Identifier::new("this", span)
        } else {
            parser.expect_identifier()?
        };
        let optional = parser.eat(&Token::Question);
        let ty = if parser.eat(&Token::Colon) {
            parse_type_annotation(parser)?
        } else {
            TypeAnnotation::new(Type::Primitive(PrimitiveType::Any), name.span)
        };
        params.push(FunctionTypeParam {
            name: Some(name),
            ty,
            optional,
            is_rest,
        });
        if !parser.eat(&Token::Comma) {
            break;
        }
    }
    parser.expect(Token::RightParen)?;
    Ok(params)
}

fn parse_object_type(parser: &mut Parser) -> Result<TypeAnnotation, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::LeftBrace)?;
    let mut members = Vec::new();
    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        parser.eat(&Token::Readonly);
        let member_start = parser.current_span();
        let name = parser.expect_property_name()?;
        let optional = parser.eat(&Token::Question);
        let ty = if parser.check(&Token::LeftParen) || parser.check(&Token::Less) {
            // Method signature: name(params): R
            parse_optional_type_parameters(parser)?;
            let params = parse_function_type_params(parser)?;
            let return_type = match parse_optional_annotation(parser)? {
                Some(ty) => ty,
                None => TypeAnnotation::new(Type::Primitive(PrimitiveType::Void), member_start),
            };
            TypeAnnotation::new(
                Type::Function(FunctionType {
                    params,
                    return_type: Box::new(return_type),
                }),
                parser.span_from(&member_start),
            )
        } else {
            parser.expect(Token::Colon)?;
            parse_type_annotation(parser)?
        };
        members.push(ObjectTypeMember { name, ty, optional });
        if !parser.eat(&Token::Semicolon) && !parser.eat(&Token::Comma) {
            break;
        }
    }
    parser.expect(Token::RightBrace)?;
    let span = parser.span_from(&start_span);
    Ok(TypeAnnotation::new(Type::Object(ObjectType { members }), span))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_type(source: &str) -> Type {
        let mut parser = Parser::new(source).unwrap();
        parse_type_annotation(&mut parser).unwrap().ty
    }

    #[test]
    fn test_primitive_types() {
        assert_eq!(parse_type("number"), Type::Primitive(PrimitiveType::Number));
        assert_eq!(parse_type("void"), Type::Primitive(PrimitiveType::Void));
    }

    #[test]
    fn test_array_of_reference() {
        match parse_type("Foo<string>[]") {
            Type::Array(arr) => match &arr.element_type.ty {
                Type::Reference(r) => {
                    assert_eq!(r.simple_name(), "Foo");
                    assert_eq!(r.type_args.as_ref().unwrap().len(), 1);
                }
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_function_type() {
        match parse_type("(x: number, y: string) => boolean") {
            Type::Function(f) => {
                assert_eq!(f.params.len(), 2);
                assert_eq!(f.return_type.ty, Type::Primitive(PrimitiveType::Boolean));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parenthesized_union_array() {
        match parse_type("(number | string)[]") {
            Type::Array(arr) => assert!(matches!(
                &arr.element_type.ty,
                Type::Parenthesized(inner) if matches!(inner.ty, Type::Union(_))
            )),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_object_type_literal() {
        match parse_type("{ x: number; y?: string }") {
            Type::Object(obj) => {
                assert_eq!(obj.members.len(), 2);
                assert!(obj.members[1].optional);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_type_parameters_with_constraint() {
        let mut parser = Parser::new("<T extends Shape, U = string>").unwrap();
        let params = parse_type_parameters(&mut parser).unwrap();
        assert_eq!(params.len(), 2);
        assert!(params[0].constraint.is_some());
        assert!(params[1].default.is_some());
    }
}
