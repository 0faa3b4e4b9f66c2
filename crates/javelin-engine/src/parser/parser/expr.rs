//! Expression parsing
//!
//! Precedence climbing for binary operators; assignment, conditional, unary
//! and postfix levels are separate functions. Arrow functions and explicit
//! call type arguments are recognised speculatively.

use super::precedence::{get_precedence, is_right_associative, Precedence};
use super::{guards, stmt, types, ParseError, Parser};
use crate::parser::ast::*;
use crate::parser::lexer::LexError;
use crate::parser::token::{Span, TemplatePart, Token};

/// Parse a full expression (assignment level; the comma operator is not
/// part of the subset).
pub fn parse_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    guards::enter(parser, "expression")?;
    let result = parse_assignment_expression(parser);
    guards::leave(parser);
    result
}

/// Parse an assignment expression, including arrow functions.
pub fn parse_assignment_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    if let Some(arrow) = try_parse_arrow_function(parser)? {
        return Ok(arrow);
    }

    let start_span = parser.current_span();
    let left = parse_conditional_expression(parser)?;

    let operator = match parser.current() {
        Token::Equal => AssignmentOperator::Assign,
        Token::PlusEqual => AssignmentOperator::AddAssign,
        Token::MinusEqual => AssignmentOperator::SubtractAssign,
        Token::StarEqual => AssignmentOperator::MultiplyAssign,
        Token::SlashEqual => AssignmentOperator::DivideAssign,
        Token::PercentEqual => AssignmentOperator::ModuloAssign,
        Token::AmpEqual => AssignmentOperator::BitwiseAndAssign,
        Token::PipeEqual => AssignmentOperator::BitwiseOrAssign,
        Token::CaretEqual => AssignmentOperator::BitwiseXorAssign,
        Token::LessLessEqual => AssignmentOperator::LeftShiftAssign,
        Token::GreaterGreaterEqual => AssignmentOperator::RightShiftAssign,
        Token::GreaterGreaterGreaterEqual => AssignmentOperator::UnsignedRightShiftAssign,
        _ => return Ok(left),
    };

    if !matches!(
        left.unparenthesized(),
        Expression::Identifier(_) | Expression::Member(_) | Expression::Index(_) | Expression::NonNull(_)
    ) {
        return Err(ParseError::invalid_syntax(
            "invalid assignment target",
            *left.span(),
        ));
    }

    parser.advance();
    let right = parse_expression(parser)?;
    let span = parser.combine_spans(&start_span, right.span());
    Ok(Expression::Assignment(AssignmentExpression {
        operator,
        left: Box::new(left),
        right: Box::new(right),
        span,
    }))
}

fn parse_conditional_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    let start_span = parser.current_span();
    let test = parse_binary_expression(parser, Precedence::NullCoalescing)?;
    if !parser.eat(&Token::Question) {
        return Ok(test);
    }
    let consequent = parse_expression(parser)?;
    parser.expect(Token::Colon)?;
    let alternate = parse_expression(parser)?;
    let span = parser.combine_spans(&start_span, alternate.span());
    Ok(Expression::Conditional(ConditionalExpression {
        test: Box::new(test),
        consequent: Box::new(consequent),
        alternate: Box::new(alternate),
        span,
    }))
}

/// Precedence climbing over the binary operator table.
fn parse_binary_expression(parser: &mut Parser, min: Precedence) -> Result<Expression, ParseError> {
    let start_span = parser.current_span();
    let mut left = parse_unary_expression(parser)?;

    loop {
        let token = parser.current().clone();
        let precedence = get_precedence(&token);
        if precedence == Precedence::None || precedence < min {
            break;
        }
        // `as` must stay on the line of its operand to avoid eating an
        // identifier that begins the next statement.
        if matches!(token, Token::As) && parser.at_line_break() {
            break;
        }
        parser.advance();

        left = match token {
            Token::As => {
                let target = types::parse_type_annotation(parser)?;
                let span = parser.combine_spans(&start_span, &target.span);
                Expression::As(AsExpression {
                    expression: Box::new(left),
                    target,
                    span,
                })
            }
            Token::Instanceof => {
                let type_name = types::parse_type_annotation(parser)?;
                let span = parser.combine_spans(&start_span, &type_name.span);
                Expression::Instanceof(InstanceofExpression {
                    object: Box::new(left),
                    type_name,
                    span,
                })
            }
            _ => {
                let next_min = if is_right_associative(&token) {
                    precedence
                } else {
                    next_precedence(precedence)
                };
                let right = parse_binary_expression(parser, next_min)?;
                let span = parser.combine_spans(&start_span, right.span());
                build_binary(token, left, right, span)
            }
        };
    }

    Ok(left)
}

fn next_precedence(precedence: Precedence) -> Precedence {
    match precedence {
        Precedence::None => Precedence::NullCoalescing,
        Precedence::NullCoalescing => Precedence::LogicalOr,
        Precedence::LogicalOr => Precedence::LogicalAnd,
        Precedence::LogicalAnd => Precedence::BitwiseOr,
        Precedence::BitwiseOr => Precedence::BitwiseXor,
        Precedence::BitwiseXor => Precedence::BitwiseAnd,
        Precedence::BitwiseAnd => Precedence::Equality,
        Precedence::Equality => Precedence::Relational,
        Precedence::Relational => Precedence::Shift,
        Precedence::Shift => Precedence::Additive,
        Precedence::Additive => Precedence::Multiplicative,
        Precedence::Multiplicative | Precedence::Exponentiation => Precedence::Exponentiation,
    }
}

fn build_binary(token: Token, left: Expression, right: Expression, span: Span) -> Expression {
    let logical = match token {
        Token::AmpAmp => Some(LogicalOperator::And),
        Token::PipePipe => Some(LogicalOperator::Or),
        Token::QuestionQuestion => Some(LogicalOperator::NullishCoalescing),
        _ => None,
    };
    if let Some(operator) = logical {
        return Expression::Logical(LogicalExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            span,
        });
    }

    let operator = match token {
        Token::Plus => BinaryOperator::Add,
        Token::Minus => BinaryOperator::Subtract,
        Token::Star => BinaryOperator::Multiply,
        Token::Slash => BinaryOperator::Divide,
        Token::Percent => BinaryOperator::Modulo,
        Token::StarStar => BinaryOperator::Exponent,
        Token::EqualEqual => BinaryOperator::Equal,
        Token::BangEqual => BinaryOperator::NotEqual,
        Token::EqualEqualEqual => BinaryOperator::StrictEqual,
        Token::BangEqualEqual => BinaryOperator::StrictNotEqual,
        Token::Less => BinaryOperator::LessThan,
        Token::LessEqual => BinaryOperator::LessEqual,
        Token::Greater => BinaryOperator::GreaterThan,
        Token::GreaterEqual => BinaryOperator::GreaterEqual,
        Token::Amp => BinaryOperator::BitwiseAnd,
        Token::Pipe => BinaryOperator::BitwiseOr,
        Token::Caret => BinaryOperator::BitwiseXor,
        Token::LessLess => BinaryOperator::LeftShift,
        Token::GreaterGreater => BinaryOperator::RightShift,
        Token::GreaterGreaterGreater => BinaryOperator::UnsignedRightShift,
        _ => BinaryOperator::In,
    };
    Expression::Binary(BinaryExpression {
        operator,
        left: Box::new(left),
        right: Box::new(right),
        span,
    })
}

fn parse_unary_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    let start_span = parser.current_span();
    let operator = match parser.current() {
        Token::Plus => UnaryOperator::Plus,
        Token::Minus => UnaryOperator::Minus,
        Token::Bang => UnaryOperator::Not,
        Token::Tilde => UnaryOperator::BitwiseNot,
        Token::Void => UnaryOperator::Void,
        Token::PlusPlus => UnaryOperator::PrefixIncrement,
        Token::MinusMinus => UnaryOperator::PrefixDecrement,
        Token::Typeof => {
            parser.advance();
            let argument = parse_unary_expression(parser)?;
            let span = parser.combine_spans(&start_span, argument.span());
            return Ok(Expression::Typeof(TypeofExpression {
                argument: Box::new(argument),
                span,
            }));
        }
        Token::Less => return parse_angle_cast(parser),
        _ => return parse_postfix_expression(parser),
    };
    parser.advance();
    guards::enter(parser, "unary expression")?;
    let operand = parse_unary_expression(parser);
    guards::leave(parser);
    let operand = operand?;
    let span = parser.combine_spans(&start_span, operand.span());
    Ok(Expression::Unary(UnaryExpression {
        operator,
        operand: Box::new(operand),
        span,
    }))
}

/// Old-style cast `<T>expr`, represented as an `as` expression.
fn parse_angle_cast(parser: &mut Parser) -> Result<Expression, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Less)?;
    let target = types::parse_type_annotation(parser)?;
    parser.expect_closing_angle()?;
    let expression = parse_unary_expression(parser)?;
    let span = parser.combine_spans(&start_span, expression.span());
    Ok(Expression::As(AsExpression {
        expression: Box::new(expression),
        target,
        span,
    }))
}

fn parse_postfix_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    let start_span = parser.current_span();
    let mut expr = parse_call_expression(parser)?;

    // No line break before postfix ++/--
    if parser.check_any(&[Token::PlusPlus, Token::MinusMinus]) && !parser.at_line_break() {
        let operator = match parser.advance() {
            Token::PlusPlus => UnaryOperator::PostfixIncrement,
            _ => UnaryOperator::PostfixDecrement,
        };
        expr = Expression::Unary(UnaryExpression {
            operator,
            operand: Box::new(expr),
            span: parser.span_from(&start_span),
        });
    }
    Ok(expr)
}

fn parse_call_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    let start_span = parser.current_span();
    let mut expr = if parser.check(&Token::New) {
        parse_new_expression(parser)?
    } else {
        parse_primary_expression(parser)?
    };

    loop {
        match parser.current() {
            Token::Dot => {
                parser.advance();
                let property = parser.expect_property_name()?;
                expr = Expression::Member(MemberExpression {
                    object: Box::new(expr),
                    property,
                    optional: false,
                    span: parser.span_from(&start_span),
                });
            }
            Token::QuestionDot => {
                parser.advance();
                match parser.current() {
                    Token::LeftParen => {
                        let arguments = parse_arguments(parser)?;
                        expr = Expression::Call(CallExpression {
                            callee: Box::new(expr),
                            type_args: None,
                            arguments,
                            optional: true,
                            span: parser.span_from(&start_span),
                        });
                    }
                    Token::LeftBracket => {
                        parser.advance();
                        let index = parse_expression(parser)?;
                        parser.expect(Token::RightBracket)?;
                        expr = Expression::Index(IndexExpression {
                            object: Box::new(expr),
                            index: Box::new(index),
                            span: parser.span_from(&start_span),
                        });
                    }
                    _ => {
                        let property = parser.expect_property_name()?;
                        expr = Expression::Member(MemberExpression {
                            object: Box::new(expr),
                            property,
                            optional: true,
                            span: parser.span_from(&start_span),
                        });
                    }
                }
            }
            Token::LeftBracket => {
                parser.advance();
                let index = parse_expression(parser)?;
                parser.expect(Token::RightBracket)?;
                expr = Expression::Index(IndexExpression {
                    object: Box::new(expr),
                    index: Box::new(index),
                    span: parser.span_from(&start_span),
                });
            }
            Token::LeftParen => {
                let arguments = parse_arguments(parser)?;
                expr = Expression::Call(CallExpression {
                    callee: Box::new(expr),
                    type_args: None,
                    arguments,
                    optional: false,
                    span: parser.span_from(&start_span),
                });
            }
            Token::Less => match try_parse_call_type_arguments(parser) {
                Some(type_args) => {
                    let arguments = parse_arguments(parser)?;
                    expr = Expression::Call(CallExpression {
                        callee: Box::new(expr),
                        type_args: Some(type_args),
                        arguments,
                        optional: false,
                        span: parser.span_from(&start_span),
                    });
                }
                None => break,
            },
            Token::Bang if !parser.at_line_break() => {
                parser.advance();
                expr = Expression::NonNull(NonNullExpression {
                    expression: Box::new(expr),
                    span: parser.span_from(&start_span),
                });
            }
            Token::TemplateLiteral(_) if !parser.at_line_break() => {
                return Err(ParseError::invalid_syntax(
                    "tagged templates are not supported",
                    parser.current_span(),
                ))
            }
            _ => break,
        }
    }

    Ok(expr)
}

/// `f<T>(x)`: type arguments are only accepted when directly followed by
/// an argument list; otherwise `<` is a comparison.
fn try_parse_call_type_arguments(parser: &mut Parser) -> Option<Vec<TypeAnnotation>> {
    let checkpoint = parser.checkpoint();
    match types::parse_type_arguments(parser) {
        Ok(args) if parser.check(&Token::LeftParen) => Some(args),
        _ => {
            parser.restore(checkpoint);
            None
        }
    }
}

fn parse_new_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::New)?;

    // Callee: identifier or dotted path, no calls
    let mut callee = if parser.check(&Token::New) {
        parse_new_expression(parser)?
    } else {
        parse_primary_expression(parser)?
    };
    while parser.eat(&Token::Dot) {
        let property = parser.expect_property_name()?;
        callee = Expression::Member(MemberExpression {
            object: Box::new(callee),
            property,
            optional: false,
            span: parser.span_from(&start_span),
        });
    }

    let type_args = if parser.check(&Token::Less) {
        Some(types::parse_type_arguments(parser)?)
    } else {
        None
    };
    let arguments = if parser.check(&Token::LeftParen) {
        parse_arguments(parser)?
    } else {
        Vec::new()
    };

    Ok(Expression::New(NewExpression {
        callee: Box::new(callee),
        type_args,
        arguments,
        span: parser.span_from(&start_span),
    }))
}

/// Parse `(a, b, ...rest)`.
pub fn parse_arguments(parser: &mut Parser) -> Result<Vec<Expression>, ParseError> {
    parser.expect(Token::LeftParen)?;
    let mut arguments = Vec::new();
    while !parser.check(&Token::RightParen) && !parser.at_eof() {
        arguments.push(parse_element(parser)?);
        if !parser.eat(&Token::Comma) {
            break;
        }
    }
    parser.expect(Token::RightParen)?;
    Ok(arguments)
}

/// An argument or array element, possibly spread.
fn parse_element(parser: &mut Parser) -> Result<Expression, ParseError> {
    let start_span = parser.current_span();
    if parser.eat(&Token::DotDotDot) {
        let argument = parse_assignment_expression(parser)?;
        let span = parser.combine_spans(&start_span, argument.span());
        return Ok(Expression::Spread(SpreadElement {
            argument: Box::new(argument),
            span,
        }));
    }
    parse_assignment_expression(parser)
}

fn parse_primary_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    let span = parser.current_span();
    match parser.current().clone() {
        Token::IntLiteral(raw) => {
            parser.advance();
            Ok(number(raw, NumberKind::Int, span))
        }
        Token::FloatLiteral(raw) => {
            parser.advance();
            Ok(number(raw, NumberKind::Float, span))
        }
        Token::BigIntLiteral(raw) => {
            parser.advance();
            Ok(number(raw, NumberKind::BigInt, span))
        }
        Token::StringLiteral(value) => {
            parser.advance();
            Ok(Expression::String(StringLiteral { value, span }))
        }
        Token::TemplateLiteral(parts) => {
            parser.advance();
            parse_template(parts, span)
        }
        Token::True | Token::False => {
            let value = matches!(parser.advance(), Token::True);
            Ok(Expression::Boolean(BooleanLiteral { value, span }))
        }
        Token::Null => {
            parser.advance();
            Ok(Expression::Null(span))
        }
        Token::This => {
            parser.advance();
            Ok(Expression::This(span))
        }
        Token::Super => {
            parser.advance();
            Ok(Expression::Super(span))
        }
        Token::LeftParen => {
            parser.advance();
            let expression = parse_expression(parser)?;
            parser.expect(Token::RightParen)?;
            Ok(Expression::Parenthesized(ParenthesizedExpression {
                expression: Box::new(expression),
                span: parser.span_from(&span),
            }))
        }
        Token::LeftBracket => parse_array_literal(parser),
        Token::LeftBrace => parse_object_literal(parser),
        Token::Function => parse_function_expression(parser),
        Token::Identifier(name) => {
            parser.advance();
            Ok(Expression::Identifier(Identifier::new(name, span)))
        }
        tok if tok.is_contextual_keyword() => {
            parser.advance();
            Ok(Expression::Identifier(Identifier::new(
                tok.keyword_text().unwrap_or_default(),
                span,
            )))
        }
        _ => Err(parser.unexpected_token(&[Token::Identifier(String::new())])),
    }
}

fn number(raw: String, kind: NumberKind, span: Span) -> Expression {
    Expression::Number(NumberLiteral { raw, kind, span })
}

/// Parse the tokenized holes of a template literal.
fn parse_template(parts: Vec<TemplatePart>, span: Span) -> Result<Expression, ParseError> {
    let mut elements = Vec::with_capacity(parts.len());
    for part in parts {
        match part {
            TemplatePart::String(text) => elements.push(TemplateElement::Text(text)),
            TemplatePart::Expression(tokens) => {
                let mut sub = Parser::from_tokens(tokens);
                let expression = parse_expression(&mut sub)?;
                if !sub.at_eof() {
                    return Err(sub.unexpected_token(&[Token::RightBrace]));
                }
                elements.push(TemplateElement::Expression(expression));
            }
        }
    }
    Ok(Expression::Template(TemplateLiteral {
        parts: elements,
        span,
    }))
}

fn parse_array_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::LeftBracket)?;
    let mut elements = Vec::new();
    while !parser.check(&Token::RightBracket) && !parser.at_eof() {
        elements.push(parse_element(parser)?);
        if !parser.eat(&Token::Comma) {
            break;
        }
    }
    parser.expect(Token::RightBracket)?;
    Ok(Expression::Array(ArrayExpression {
        elements,
        span: parser.span_from(&start_span),
    }))
}

fn parse_object_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::LeftBrace)?;
    let mut properties = Vec::new();
    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        let prop_start = parser.current_span();
        if parser.eat(&Token::DotDotDot) {
            let argument = parse_assignment_expression(parser)?;
            properties.push(ObjectProperty::Spread(SpreadElement {
                argument: Box::new(argument),
                span: parser.span_from(&prop_start),
            }));
        } else {
            let key = parse_property_key(parser)?;
            let (value, shorthand) = if parser.eat(&Token::Colon) {
                (parse_assignment_expression(parser)?, false)
            } else if parser.check(&Token::LeftParen) || parser.check(&Token::Less) {
                // Method shorthand: key(params) { ... }
                let function = parse_function_rest(parser, None, prop_start)?;
                (function, false)
            } else {
                match &key {
                    PropertyKey::Identifier(id) => (Expression::Identifier(id.clone()), true),
                    _ => return Err(parser.unexpected_token(&[Token::Colon])),
                }
            };
            properties.push(ObjectProperty::Property {
                key,
                value,
                shorthand,
                span: parser.span_from(&prop_start),
            });
        }
        if !parser.eat(&Token::Comma) {
            break;
        }
    }
    parser.expect(Token::RightBrace)?;
    Ok(Expression::Object(ObjectExpression {
        properties,
        span: parser.span_from(&start_span),
    }))
}

fn parse_property_key(parser: &mut Parser) -> Result<PropertyKey, ParseError> {
    let span = parser.current_span();
    match parser.current().clone() {
        Token::StringLiteral(value) => {
            parser.advance();
            Ok(PropertyKey::String(StringLiteral { value, span }))
        }
        Token::IntLiteral(raw) | Token::FloatLiteral(raw) => {
            parser.advance();
            Ok(PropertyKey::Number(NumberLiteral {
                raw,
                kind: NumberKind::Int,
                span,
            }))
        }
        Token::LeftBracket => {
            parser.advance();
            let expr = parse_expression(parser)?;
            parser.expect(Token::RightBracket)?;
            Ok(PropertyKey::Computed(Box::new(expr)))
        }
        _ => parser.expect_property_name().map(PropertyKey::Identifier),
    }
}

fn parse_function_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Function)?;
    let name = if parser.at_identifier() {
        Some(parser.expect_identifier()?)
    } else {
        None
    };
    parse_function_rest(parser, name, start_span)
}

/// Type parameters, parameters, return type and body of a function
/// expression or object method.
fn parse_function_rest(
    parser: &mut Parser,
    name: Option<Identifier>,
    start_span: Span,
) -> Result<Expression, ParseError> {
    let type_params = types::parse_optional_type_parameters(parser)?;
    let params = stmt::parse_parameters(parser)?;
    let return_type = types::parse_optional_annotation(parser)?;
    let body = stmt::parse_block(parser)?;
    Ok(Expression::Function(FunctionExpression {
        name,
        type_params,
        params,
        return_type,
        body,
        span: parser.span_from(&start_span),
    }))
}

/// Recognise `x => ...`, `(a, b) => ...`, `(a: T): R => ...` and
/// `<T>(a: T) => ...`. Restores the cursor when the input is not an arrow.
fn try_parse_arrow_function(parser: &mut Parser) -> Result<Option<Expression>, ParseError> {
    let start_span = parser.current_span();

    // Single identifier parameter: x => ...
    if parser.at_identifier() && matches!(parser.peek(), Some(Token::Arrow)) {
        let name = parser.expect_identifier()?;
        let param = Parameter {
            span: name.span,
            pattern: Pattern::Identifier(name),
            type_annotation: None,
            default_value: None,
            optional: false,
            is_rest: false,
            accessibility: None,
            readonly: false,
        };
        parser.expect(Token::Arrow)?;
        let body = parse_arrow_body(parser)?;
        return Ok(Some(Expression::Arrow(ArrowFunction {
            type_params: None,
            params: vec![param],
            return_type: None,
            body,
            span: parser.span_from(&start_span),
        })));
    }

    let candidate = match parser.current() {
        Token::Less => true,
        Token::LeftParen => matches!(
            parser.peek(),
            Some(
                Token::RightParen
                    | Token::Identifier(_)
                    | Token::DotDotDot
                    | Token::LeftBracket
                    | Token::LeftBrace
                    | Token::This
                    | Token::Type
                    | Token::From
                    | Token::Of
                    | Token::As
                    | Token::Readonly
            )
        ),
        _ => false,
    };
    if !candidate {
        return Ok(None);
    }

    let checkpoint = parser.checkpoint();
    let (type_params, params, return_type) = match parse_arrow_head(parser) {
        Ok(head) => head,
        Err(_) => {
            parser.restore(checkpoint);
            return Ok(None);
        }
    };

    let body = parse_arrow_body(parser)?;
    Ok(Some(Expression::Arrow(ArrowFunction {
        type_params,
        params,
        return_type,
        body,
        span: parser.span_from(&start_span),
    })))
}

type ArrowHead = (Option<Vec<TypeParameter>>, Vec<Parameter>, Option<TypeAnnotation>);

fn parse_arrow_head(parser: &mut Parser) -> Result<ArrowHead, ParseError> {
    let type_params = types::parse_optional_type_parameters(parser)?;
    let params = stmt::parse_parameters(parser)?;
    let return_type = types::parse_optional_annotation(parser)?;
    parser.expect(Token::Arrow)?;
    Ok((type_params, params, return_type))
}

fn parse_arrow_body(parser: &mut Parser) -> Result<ArrowBody, ParseError> {
    if parser.check(&Token::LeftBrace) {
        Ok(ArrowBody::Block(stmt::parse_block(parser)?))
    } else {
        Ok(ArrowBody::Expression(Box::new(parse_assignment_expression(parser)?)))
    }
}

/// Parse a standalone expression from source text.
pub fn parse_expression_source(source: &str) -> Result<Expression, Vec<ParseError>> {
    let mut parser = Parser::new(source).map_err(|errors| {
        errors
            .into_iter()
            .map(|e: LexError| ParseError::invalid_syntax(e.to_string(), *e.span()))
            .collect::<Vec<_>>()
    })?;
    let expr = parse_expression(&mut parser).map_err(|e| vec![e])?;
    if !parser.at_eof() {
        return Err(vec![parser.unexpected_token(&[Token::Eof])]);
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(source: &str) -> Expression {
        parse_expression_source(source).unwrap()
    }

    #[test]
    fn test_binary_precedence() {
        match expr("1 + 2 * 3") {
            Expression::Binary(bin) => {
                assert_eq!(bin.operator, BinaryOperator::Add);
                assert!(matches!(*bin.right, Expression::Binary(ref r) if r.operator == BinaryOperator::Multiply));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_exponent_is_right_associative() {
        match expr("2 ** 3 ** 2") {
            Expression::Binary(bin) => {
                assert!(matches!(*bin.left, Expression::Number(_)));
                assert!(matches!(*bin.right, Expression::Binary(_)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_arrow_with_types() {
        match expr("(x: number, y: number): number => x + y") {
            Expression::Arrow(arrow) => {
                assert_eq!(arrow.params.len(), 2);
                assert!(arrow.return_type.is_some());
                assert!(matches!(arrow.body, ArrowBody::Expression(_)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parenthesized_is_not_arrow() {
        assert!(matches!(expr("(a + b) * c"), Expression::Binary(_)));
        assert!(matches!(expr("(a)"), Expression::Parenthesized(_)));
    }

    #[test]
    fn test_single_param_arrow_with_block() {
        match expr("x => { return x; }") {
            Expression::Arrow(arrow) => assert!(matches!(arrow.body, ArrowBody::Block(_))),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_generic_call_vs_comparison() {
        match expr("identity<number>(1)") {
            Expression::Call(call) => assert_eq!(call.type_args.as_ref().unwrap().len(), 1),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(expr("a < b"), Expression::Binary(_)));
    }

    #[test]
    fn test_member_call_chain() {
        match expr("console.log(a, b)") {
            Expression::Call(call) => {
                assert_eq!(call.arguments.len(), 2);
                assert!(matches!(*call.callee, Expression::Member(ref m) if m.property.name == "log"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_new_with_type_args() {
        match expr("new Map<string, number>()") {
            Expression::New(new) => assert_eq!(new.type_args.as_ref().unwrap().len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_as_and_non_null() {
        assert!(matches!(expr("value as string"), Expression::As(_)));
        assert!(matches!(expr("maybe!"), Expression::NonNull(_)));
    }

    #[test]
    fn test_nullish_and_conditional() {
        assert!(matches!(expr("a ?? b"), Expression::Logical(ref l) if l.operator == LogicalOperator::NullishCoalescing));
        assert!(matches!(expr("a ? b : c"), Expression::Conditional(_)));
    }

    #[test]
    fn test_template_with_expression() {
        match expr("`n = ${n + 1}`") {
            Expression::Template(t) => {
                assert_eq!(t.parts.len(), 2);
                assert!(matches!(t.parts[1], TemplateElement::Expression(Expression::Binary(_))));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_object_literal_forms() {
        match expr("{ a: 1, b, c() { return 2; }, ...rest }") {
            Expression::Object(obj) => assert_eq!(obj.properties.len(), 4),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert!(parse_expression_source("1 = 2").is_err());
    }
}
