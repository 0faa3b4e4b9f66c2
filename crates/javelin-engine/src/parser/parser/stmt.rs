//! Statement parsing

use super::{expr, guards, pattern, recovery, types, ParseError, Parser};
use crate::parser::ast::*;
use crate::parser::token::{Span, Token};

/// Parse a statement.
pub fn parse_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    guards::enter(parser, "statement")?;
    let result = parse_statement_inner(parser);
    guards::leave(parser);
    result
}

fn parse_statement_inner(parser: &mut Parser) -> Result<Statement, ParseError> {
    match parser.current() {
        Token::Const if matches!(parser.peek(), Some(Token::Enum)) => {
            parser.advance();
            parse_enum_declaration(parser)
        }
        Token::Let | Token::Const | Token::Var => {
            let decl = parse_variable_declaration(parser)?;
            parser.consume_semicolon();
            Ok(Statement::VariableDecl(decl))
        }
        Token::Function => parse_function_declaration(parser).map(Statement::FunctionDecl),
        Token::Class => parse_class_declaration(parser).map(Statement::ClassDecl),
        Token::Abstract if matches!(parser.peek(), Some(Token::Class)) => {
            parse_class_declaration(parser).map(Statement::ClassDecl)
        }
        Token::Interface => parse_interface_declaration(parser),
        Token::Enum => parse_enum_declaration(parser),
        Token::Type if matches!(parser.peek(), Some(Token::Identifier(_))) => {
            parse_type_alias_declaration(parser)
        }
        Token::Import if !matches!(parser.peek(), Some(Token::LeftParen | Token::Dot)) => {
            parse_import_declaration(parser)
        }
        Token::Export => parse_export_declaration(parser),
        Token::If => parse_if_statement(parser),
        Token::While => parse_while_statement(parser),
        Token::Do => parse_do_while_statement(parser),
        Token::For => parse_for_statement(parser),
        Token::Switch => parse_switch_statement(parser),
        Token::Try => parse_try_statement(parser),
        Token::Return => parse_return_statement(parser),
        Token::Break => {
            let start_span = parser.current_span();
            parser.advance();
            let label = parse_optional_label(parser)?;
            parser.consume_semicolon();
            Ok(Statement::Break(BreakStatement {
                label,
                span: parser.span_from(&start_span),
            }))
        }
        Token::Continue => {
            let start_span = parser.current_span();
            parser.advance();
            let label = parse_optional_label(parser)?;
            parser.consume_semicolon();
            Ok(Statement::Continue(ContinueStatement {
                label,
                span: parser.span_from(&start_span),
            }))
        }
        Token::Throw => {
            let start_span = parser.current_span();
            parser.advance();
            let value = expr::parse_expression(parser)?;
            parser.consume_semicolon();
            Ok(Statement::Throw(ThrowStatement {
                value,
                span: parser.span_from(&start_span),
            }))
        }
        Token::LeftBrace => parse_block(parser).map(Statement::Block),
        Token::Semicolon => {
            let span = parser.current_span();
            parser.advance();
            Ok(Statement::Empty(span))
        }
        Token::Identifier(_) if matches!(parser.peek(), Some(Token::Colon)) => {
            let start_span = parser.current_span();
            let label = parser.expect_identifier()?;
            parser.expect(Token::Colon)?;
            let body = parse_statement(parser)?;
            Ok(Statement::Labeled(LabeledStatement {
                label,
                body: Box::new(body),
                span: parser.span_from(&start_span),
            }))
        }
        _ => parse_expression_statement(parser),
    }
}

fn parse_expression_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    let expression = expr::parse_expression(parser)?;
    if !parser.eat(&Token::Semicolon)
        && !parser.check(&Token::RightBrace)
        && !parser.at_eof()
        && !parser.at_line_break()
    {
        return Err(parser.unexpected_token(&[Token::Semicolon]));
    }
    Ok(Statement::Expression(ExpressionStatement {
        expression,
        span: parser.span_from(&start_span),
    }))
}

fn parse_optional_label(parser: &mut Parser) -> Result<Option<Identifier>, ParseError> {
    if matches!(parser.current(), Token::Identifier(_)) && !parser.at_line_break() {
        Ok(Some(parser.expect_identifier()?))
    } else {
        Ok(None)
    }
}

// ============================================================================
// Variable Declarations
// ============================================================================

/// Parse `let a = 1, b: T` without the trailing semicolon.
fn parse_variable_declaration(parser: &mut Parser) -> Result<VariableDecl, ParseError> {
    let start_span = parser.current_span();
    let kind = match parser.advance() {
        Token::Const => VariableKind::Const,
        Token::Var => VariableKind::Var,
        _ => VariableKind::Let,
    };

    let mut declarations = Vec::new();
    loop {
        declarations.push(parse_variable_declarator(parser)?);
        if !parser.eat(&Token::Comma) {
            break;
        }
    }

    Ok(VariableDecl {
        kind,
        declarations,
        span: parser.span_from(&start_span),
    })
}

fn parse_variable_declarator(parser: &mut Parser) -> Result<VariableDeclarator, ParseError> {
    let start_span = parser.current_span();
    let pattern = pattern::parse_pattern(parser)?;
    // Definite assignment assertion: let x!: number;
    parser.eat(&Token::Bang);
    let type_annotation = types::parse_optional_annotation(parser)?;
    let initializer = if parser.eat(&Token::Equal) {
        Some(expr::parse_expression(parser)?)
    } else {
        None
    };
    Ok(VariableDeclarator {
        pattern,
        type_annotation,
        initializer,
        span: parser.span_from(&start_span),
    })
}

// ============================================================================
// Functions
// ============================================================================

fn parse_function_declaration(parser: &mut Parser) -> Result<FunctionDecl, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Function)?;
    let name = parser.expect_identifier()?;
    let type_params = types::parse_optional_type_parameters(parser)?;
    let params = parse_parameters(parser)?;
    let return_type = types::parse_optional_annotation(parser)?;
    let body = parse_block(parser)?;
    Ok(FunctionDecl {
        name,
        type_params,
        params,
        return_type,
        body,
        span: parser.span_from(&start_span),
    })
}

/// Parse a parenthesized parameter list.
pub fn parse_parameters(parser: &mut Parser) -> Result<Vec<Parameter>, ParseError> {
    parser.expect(Token::LeftParen)?;
    let mut params = Vec::new();
    while !parser.check(&Token::RightParen) && !parser.at_eof() {
        params.push(parse_parameter(parser)?);
        if !parser.eat(&Token::Comma) {
            break;
        }
    }
    parser.expect(Token::RightParen)?;
    Ok(params)
}

fn parse_parameter(parser: &mut Parser) -> Result<Parameter, ParseError> {
    let start_span = parser.current_span();

    let mut accessibility = None;
    let mut readonly = false;
    loop {
        let is_modifier = matches!(
            parser.peek(),
            Some(Token::Identifier(_) | Token::LeftBrace | Token::LeftBracket)
        ) || parser.peek().is_some_and(|t| t.is_contextual_keyword());
        if !is_modifier {
            break;
        }
        match parser.current() {
            Token::Public => accessibility = Some(Visibility::Public),
            Token::Private => accessibility = Some(Visibility::Private),
            Token::Protected => accessibility = Some(Visibility::Protected),
            Token::Readonly => readonly = true,
            _ => break,
        }
        parser.advance();
    }

    let is_rest = parser.eat(&Token::DotDotDot);
    let pattern = if parser.check(&Token::This) {
        let span = parser.current_span();
        parser.advance();
        Pattern::Identifier(Identifier::new("this", span))
    } else {
        pattern::parse_pattern(parser)?
    };
    let optional = parser.eat(&Token::Question);
    let type_annotation = types::parse_optional_annotation(parser)?;
    let default_value = if parser.eat(&Token::Equal) {
        Some(expr::parse_assignment_expression(parser)?)
    } else {
        None
    };

    Ok(Parameter {
        pattern,
        type_annotation,
        default_value,
        optional,
        is_rest,
        accessibility,
        readonly,
        span: parser.span_from(&start_span),
    })
}

/// Parse `{ statements }`.
pub fn parse_block(parser: &mut Parser) -> Result<BlockStatement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::LeftBrace)?;
    let mut statements = Vec::new();
    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        statements.push(parse_statement(parser)?);
    }
    parser.expect(Token::RightBrace)?;
    Ok(BlockStatement {
        statements,
        span: parser.span_from(&start_span),
    })
}

// ============================================================================
// Classes
// ============================================================================

fn parse_class_declaration(parser: &mut Parser) -> Result<ClassDecl, ParseError> {
    let start_span = parser.current_span();
    let is_abstract = parser.eat(&Token::Abstract);
    parser.expect(Token::Class)?;
    // `export default class {}` has no name of its own
    let name = if parser.at_identifier() {
        parser.expect_identifier()?
    } else {
        Identifier::new("default", parser.current_span())
    };
    let type_params = types::parse_optional_type_parameters(parser)?;

    let extends = if parser.eat(&Token::Extends) {
        Some(types::parse_type_annotation(parser)?)
    } else {
        None
    };

    let mut implements = Vec::new();
    if parser.eat(&Token::Implements) {
        loop {
            implements.push(types::parse_type_annotation(parser)?);
            if !parser.eat(&Token::Comma) {
                break;
            }
        }
    }

    parser.expect(Token::LeftBrace)?;
    let mut members = Vec::new();
    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        if parser.eat(&Token::Semicolon) {
            continue;
        }
        members.push(parse_class_member(parser)?);
    }
    parser.expect(Token::RightBrace)?;

    Ok(ClassDecl {
        name,
        type_params,
        extends,
        implements,
        members,
        is_abstract,
        span: parser.span_from(&start_span),
    })
}

/// True when the current token is followed by something that can only
/// continue a member name, so the current token is not a modifier.
fn next_ends_member_name(parser: &Parser) -> bool {
    matches!(
        parser.peek(),
        Some(
            Token::LeftParen
                | Token::Colon
                | Token::Equal
                | Token::Semicolon
                | Token::Question
                | Token::Bang
                | Token::Less
                | Token::RightBrace
        ) | None
    )
}

fn parse_class_member(parser: &mut Parser) -> Result<ClassMember, ParseError> {
    let start_span = parser.current_span();

    let mut modifiers = MemberModifiers::default();
    loop {
        if next_ends_member_name(parser) {
            break;
        }
        match parser.current() {
            Token::Public => modifiers.visibility = Some(Visibility::Public),
            Token::Private => modifiers.visibility = Some(Visibility::Private),
            Token::Protected => modifiers.visibility = Some(Visibility::Protected),
            Token::Static => modifiers.is_static = true,
            Token::Readonly => modifiers.is_readonly = true,
            Token::Abstract => modifiers.is_abstract = true,
            Token::Identifier(id) if id == "override" || id == "declare" => {}
            _ => break,
        }
        parser.advance();
    }

    // Accessors: get name() / set name(v)
    let mut kind = MethodKind::Method;
    if (parser.check_identifier("get") || parser.check_identifier("set")) && !next_ends_member_name(parser) {
        kind = if parser.check_identifier("get") {
            MethodKind::Getter
        } else {
            MethodKind::Setter
        };
        parser.advance();
    }

    if kind == MethodKind::Method
        && parser.check_identifier("constructor")
        && matches!(parser.peek(), Some(Token::LeftParen))
    {
        parser.advance();
        let params = parse_parameters(parser)?;
        let body = parse_block(parser)?;
        return Ok(ClassMember::Constructor(ConstructorDecl {
            modifiers,
            params,
            body,
            span: parser.span_from(&start_span),
        }));
    }

    let name = match parser.current().clone() {
        Token::StringLiteral(value) => {
            let span = parser.current_span();
            parser.advance();
            Identifier::new(value, span)
        }
        _ => parser.expect_property_name()?,
    };
    let optional = parser.eat(&Token::Question);
    parser.eat(&Token::Bang);

    if parser.check(&Token::LeftParen) || parser.check(&Token::Less) {
        let type_params = types::parse_optional_type_parameters(parser)?;
        let params = parse_parameters(parser)?;
        let return_type = types::parse_optional_annotation(parser)?;
        let body = if parser.check(&Token::LeftBrace) {
            Some(parse_block(parser)?)
        } else {
            parser.consume_semicolon();
            None
        };
        return Ok(ClassMember::Method(MethodDecl {
            name,
            kind,
            modifiers,
            type_params,
            params,
            return_type,
            body,
            span: parser.span_from(&start_span),
        }));
    }

    let type_annotation = types::parse_optional_annotation(parser)?;
    let initializer = if parser.eat(&Token::Equal) {
        Some(expr::parse_expression(parser)?)
    } else {
        None
    };
    parser.consume_semicolon();
    Ok(ClassMember::Field(FieldDecl {
        name,
        modifiers,
        type_annotation,
        initializer,
        optional,
        span: parser.span_from(&start_span),
    }))
}

// ============================================================================
// Interfaces, enums, type aliases
// ============================================================================

fn parse_interface_declaration(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Interface)?;
    let name = parser.expect_identifier()?;
    let type_params = types::parse_optional_type_parameters(parser)?;

    let mut extends = Vec::new();
    if parser.eat(&Token::Extends) {
        loop {
            extends.push(types::parse_type_annotation(parser)?);
            if !parser.eat(&Token::Comma) {
                break;
            }
        }
    }

    parser.expect(Token::LeftBrace)?;
    let mut members = Vec::new();
    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        if parser.eat(&Token::Semicolon) || parser.eat(&Token::Comma) {
            continue;
        }
        let member_start = parser.current_span();

        // Index and call signatures carry nothing the lowering uses.
        if parser.check(&Token::LeftBracket) || parser.check(&Token::LeftParen) {
            recovery::skip_until(parser, &[Token::Semicolon, Token::Comma, Token::RightBrace]);
            continue;
        }

        let readonly = !next_ends_member_name(parser) && parser.eat(&Token::Readonly);
        let name = parser.expect_property_name()?;
        let optional = parser.eat(&Token::Question);

        if parser.check(&Token::LeftParen) || parser.check(&Token::Less) {
            let type_params = types::parse_optional_type_parameters(parser)?;
            let params = parse_parameters(parser)?;
            let return_type = types::parse_optional_annotation(parser)?;
            members.push(InterfaceMember::Method {
                name,
                type_params,
                params,
                return_type,
                span: parser.span_from(&member_start),
            });
        } else {
            parser.expect(Token::Colon)?;
            let type_annotation = types::parse_type_annotation(parser)?;
            members.push(InterfaceMember::Property {
                name,
                type_annotation,
                optional,
                readonly,
                span: parser.span_from(&member_start),
            });
        }
    }
    parser.expect(Token::RightBrace)?;

    Ok(Statement::InterfaceDecl(InterfaceDecl {
        name,
        type_params,
        extends,
        members,
        span: parser.span_from(&start_span),
    }))
}

fn parse_enum_declaration(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Enum)?;
    let name = parser.expect_identifier()?;
    parser.expect(Token::LeftBrace)?;
    let mut members = Vec::new();
    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        let member_start = parser.current_span();
        let member_name = match parser.current().clone() {
            Token::StringLiteral(value) => {
                parser.advance();
                Identifier::new(value, member_start)
            }
            _ => parser.expect_property_name()?,
        };
        let initializer = if parser.eat(&Token::Equal) {
            Some(expr::parse_expression(parser)?)
        } else {
            None
        };
        members.push(EnumMember {
            name: member_name,
            initializer,
            span: parser.span_from(&member_start),
        });
        if !parser.eat(&Token::Comma) {
            break;
        }
    }
    parser.expect(Token::RightBrace)?;
    Ok(Statement::EnumDecl(EnumDecl {
        name,
        members,
        span: parser.span_from(&start_span),
    }))
}

fn parse_type_alias_declaration(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Type)?;
    let name = parser.expect_identifier()?;
    let type_params = types::parse_optional_type_parameters(parser)?;
    parser.expect(Token::Equal)?;
    let type_annotation = types::parse_type_annotation(parser)?;
    parser.consume_semicolon();
    Ok(Statement::TypeAliasDecl(TypeAliasDecl {
        name,
        type_params,
        type_annotation,
        span: parser.span_from(&start_span),
    }))
}

// ============================================================================
// Control flow
// ============================================================================

fn parse_if_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::If)?;
    parser.expect(Token::LeftParen)?;
    let condition = expr::parse_expression(parser)?;
    parser.expect(Token::RightParen)?;
    let then_branch = Box::new(parse_statement(parser)?);
    let else_branch = if parser.eat(&Token::Else) {
        Some(Box::new(parse_statement(parser)?))
    } else {
        None
    };
    Ok(Statement::If(IfStatement {
        condition,
        then_branch,
        else_branch,
        span: parser.span_from(&start_span),
    }))
}

fn parse_while_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::While)?;
    parser.expect(Token::LeftParen)?;
    let condition = expr::parse_expression(parser)?;
    parser.expect(Token::RightParen)?;
    let body = Box::new(parse_statement(parser)?);
    Ok(Statement::While(WhileStatement {
        condition,
        body,
        span: parser.span_from(&start_span),
    }))
}

fn parse_do_while_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Do)?;
    let body = Box::new(parse_statement(parser)?);
    parser.expect(Token::While)?;
    parser.expect(Token::LeftParen)?;
    let condition = expr::parse_expression(parser)?;
    parser.expect(Token::RightParen)?;
    parser.consume_semicolon();
    Ok(Statement::DoWhile(DoWhileStatement {
        body,
        condition,
        span: parser.span_from(&start_span),
    }))
}

fn parse_for_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::For)?;
    parser.expect(Token::LeftParen)?;

    let init = if parser.check_any(&[Token::Let, Token::Const, Token::Var]) {
        // Peek past `kind pattern [: T]` for `of`.
        let checkpoint = parser.checkpoint();
        let kind = match parser.advance() {
            Token::Const => VariableKind::Const,
            Token::Var => VariableKind::Var,
            _ => VariableKind::Let,
        };
        let pattern = pattern::parse_pattern(parser)?;
        let type_annotation = types::parse_optional_annotation(parser)?;
        if parser.eat(&Token::Of) {
            return parse_for_of_rest(parser, kind, pattern, type_annotation, start_span);
        }
        if parser.check(&Token::In) {
            return Err(ParseError::invalid_syntax(
                "for-in loops are not supported",
                parser.current_span(),
            ));
        }
        parser.restore(checkpoint);
        Some(ForInit::VariableDecl(parse_variable_declaration(parser)?))
    } else if parser.check(&Token::Semicolon) {
        None
    } else {
        Some(ForInit::Expression(expr::parse_expression(parser)?))
    };
    parser.expect(Token::Semicolon)?;

    let test = if parser.check(&Token::Semicolon) {
        None
    } else {
        Some(expr::parse_expression(parser)?)
    };
    parser.expect(Token::Semicolon)?;

    let update = if parser.check(&Token::RightParen) {
        None
    } else {
        Some(expr::parse_expression(parser)?)
    };
    parser.expect(Token::RightParen)?;

    let body = Box::new(parse_statement(parser)?);
    Ok(Statement::For(ForStatement {
        init,
        test,
        update,
        body,
        span: parser.span_from(&start_span),
    }))
}

fn parse_for_of_rest(
    parser: &mut Parser,
    kind: VariableKind,
    pattern: Pattern,
    type_annotation: Option<TypeAnnotation>,
    start_span: Span,
) -> Result<Statement, ParseError> {
    let right = expr::parse_expression(parser)?;
    parser.expect(Token::RightParen)?;
    let body = Box::new(parse_statement(parser)?);
    Ok(Statement::ForOf(ForOfStatement {
        kind,
        pattern,
        type_annotation,
        right,
        body,
        span: parser.span_from(&start_span),
    }))
}

fn parse_switch_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Switch)?;
    parser.expect(Token::LeftParen)?;
    let discriminant = expr::parse_expression(parser)?;
    parser.expect(Token::RightParen)?;
    parser.expect(Token::LeftBrace)?;

    let mut cases = Vec::new();
    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        let case_start = parser.current_span();
        let test = if parser.eat(&Token::Default) {
            None
        } else {
            parser.expect(Token::Case)?;
            Some(expr::parse_expression(parser)?)
        };
        parser.expect(Token::Colon)?;

        let mut consequent = Vec::new();
        while !parser.check_any(&[Token::Case, Token::Default, Token::RightBrace]) && !parser.at_eof() {
            consequent.push(parse_statement(parser)?);
        }
        cases.push(SwitchCase {
            test,
            consequent,
            span: parser.span_from(&case_start),
        });
    }
    parser.expect(Token::RightBrace)?;

    Ok(Statement::Switch(SwitchStatement {
        discriminant,
        cases,
        span: parser.span_from(&start_span),
    }))
}

fn parse_try_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Try)?;
    let body = parse_block(parser)?;

    let catch_clause = if parser.check(&Token::Catch) {
        let catch_start = parser.current_span();
        parser.advance();
        let (param, type_annotation) = if parser.eat(&Token::LeftParen) {
            let param = pattern::parse_pattern(parser)?;
            let annotation = types::parse_optional_annotation(parser)?;
            parser.expect(Token::RightParen)?;
            (Some(param), annotation)
        } else {
            (None, None)
        };
        let body = parse_block(parser)?;
        Some(CatchClause {
            param,
            type_annotation,
            body,
            span: parser.span_from(&catch_start),
        })
    } else {
        None
    };

    let finally_clause = if parser.eat(&Token::Finally) {
        Some(parse_block(parser)?)
    } else {
        None
    };

    if catch_clause.is_none() && finally_clause.is_none() {
        return Err(parser.unexpected_token(&[Token::Catch, Token::Finally]));
    }

    Ok(Statement::Try(TryStatement {
        body,
        catch_clause,
        finally_clause,
        span: parser.span_from(&start_span),
    }))
}

fn parse_return_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Return)?;
    let value = if parser.check_any(&[Token::Semicolon, Token::RightBrace, Token::Eof])
        || parser.at_line_break()
    {
        None
    } else {
        Some(expr::parse_expression(parser)?)
    };
    parser.consume_semicolon();
    Ok(Statement::Return(ReturnStatement {
        value,
        span: parser.span_from(&start_span),
    }))
}

// ============================================================================
// Modules
// ============================================================================

fn parse_module_specifier(parser: &mut Parser) -> Result<StringLiteral, ParseError> {
    let span = parser.current_span();
    match parser.current().clone() {
        Token::StringLiteral(value) => {
            parser.advance();
            Ok(StringLiteral { value, span })
        }
        _ => Err(parser.unexpected_token(&[Token::StringLiteral(String::new())])),
    }
}

fn parse_import_declaration(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Import)?;

    // import "./side-effect";
    if let Token::StringLiteral(_) = parser.current() {
        let source = parse_module_specifier(parser)?;
        parser.consume_semicolon();
        return Ok(Statement::ImportDecl(ImportDecl {
            specifiers: Vec::new(),
            source,
            type_only: false,
            span: parser.span_from(&start_span),
        }));
    }

    let type_only = parser.check(&Token::Type)
        && !matches!(parser.peek(), Some(Token::From | Token::Comma));
    if type_only {
        parser.advance();
    }

    let mut specifiers = Vec::new();
    if parser.at_identifier() {
        specifiers.push(ImportSpecifier::Default(parser.expect_identifier()?));
        parser.eat(&Token::Comma);
    }
    if parser.eat(&Token::Star) {
        parser.expect(Token::As)?;
        specifiers.push(ImportSpecifier::Namespace(parser.expect_identifier()?));
    } else if parser.eat(&Token::LeftBrace) {
        while !parser.check(&Token::RightBrace) && !parser.at_eof() {
            // Inline `type` modifier: import { type Foo }
            if parser.check(&Token::Type) && !matches!(parser.peek(), Some(Token::As | Token::Comma | Token::RightBrace)) {
                parser.advance();
            }
            let imported = parser.expect_property_name()?;
            let local = if parser.eat(&Token::As) {
                Some(parser.expect_identifier()?)
            } else {
                None
            };
            specifiers.push(ImportSpecifier::Named { imported, local });
            if !parser.eat(&Token::Comma) {
                break;
            }
        }
        parser.expect(Token::RightBrace)?;
    }

    parser.expect(Token::From)?;
    let source = parse_module_specifier(parser)?;
    parser.consume_semicolon();

    Ok(Statement::ImportDecl(ImportDecl {
        specifiers,
        source,
        type_only,
        span: parser.span_from(&start_span),
    }))
}

fn parse_export_declaration(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Export)?;

    let export = match parser.current() {
        Token::Default => {
            parser.advance();
            match parser.current() {
                Token::Class | Token::Abstract | Token::Function | Token::Interface => {
                    let declaration = match parser.current() {
                        Token::Function => parse_default_function(parser)?,
                        _ => parse_statement(parser)?,
                    };
                    ExportDecl::DefaultDeclaration(Box::new(declaration))
                }
                _ => {
                    let expression = expr::parse_expression(parser)?;
                    parser.consume_semicolon();
                    ExportDecl::DefaultExpression {
                        expression,
                        span: parser.span_from(&start_span),
                    }
                }
            }
        }
        Token::Star => {
            parser.advance();
            let alias = if parser.eat(&Token::As) {
                Some(parser.expect_identifier()?)
            } else {
                None
            };
            parser.expect(Token::From)?;
            let source = parse_module_specifier(parser)?;
            parser.consume_semicolon();
            ExportDecl::All {
                source,
                alias,
                span: parser.span_from(&start_span),
            }
        }
        Token::LeftBrace => parse_export_specifiers(parser, start_span)?,
        Token::Type if matches!(parser.peek(), Some(Token::LeftBrace)) => {
            parser.advance();
            parse_export_specifiers(parser, start_span)?
        }
        _ => ExportDecl::Declaration(Box::new(parse_statement(parser)?)),
    };

    Ok(Statement::ExportDecl(export))
}

/// `export default function (...) {}` may omit the name.
fn parse_default_function(parser: &mut Parser) -> Result<Statement, ParseError> {
    let named = parser.peek().is_some_and(|t| {
        matches!(t, Token::Identifier(_)) || t.is_contextual_keyword()
    });
    if named {
        return parse_function_declaration(parser).map(Statement::FunctionDecl);
    }
    let start_span = parser.current_span();
    parser.expect(Token::Function)?;
    let name = Identifier::new("default", start_span);
    let type_params = types::parse_optional_type_parameters(parser)?;
    let params = parse_parameters(parser)?;
    let return_type = types::parse_optional_annotation(parser)?;
    let body = parse_block(parser)?;
    Ok(Statement::FunctionDecl(FunctionDecl {
        name,
        type_params,
        params,
        return_type,
        body,
        span: parser.span_from(&start_span),
    }))
}

fn parse_export_specifiers(parser: &mut Parser, start_span: Span) -> Result<ExportDecl, ParseError> {
    parser.expect(Token::LeftBrace)?;
    let mut specifiers = Vec::new();
    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        let local = parser.expect_property_name()?;
        let exported = if parser.eat(&Token::As) {
            Some(parser.expect_property_name()?)
        } else {
            None
        };
        specifiers.push(ExportSpecifier { local, exported });
        if !parser.eat(&Token::Comma) {
            break;
        }
    }
    parser.expect(Token::RightBrace)?;
    let source = if parser.eat(&Token::From) {
        Some(parse_module_specifier(parser)?)
    } else {
        None
    };
    parser.consume_semicolon();
    Ok(ExportDecl::Named {
        specifiers,
        source,
        span: parser.span_from(&start_span),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Vec<Statement> {
        Parser::new(source).unwrap().parse().unwrap().statements
    }

    #[test]
    fn test_function_with_defaults() {
        let stmts = parse("function f(a: number, b = 1, c: string = 'x') {}");
        match &stmts[0] {
            Statement::FunctionDecl(f) => {
                assert_eq!(f.params.len(), 3);
                assert!(f.params[0].default_value.is_none());
                assert!(f.params[1].default_value.is_some());
                assert!(f.params[2].type_annotation.is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_class_members() {
        let stmts = parse(
            "abstract class Shape extends Base implements A, B {
                private static count: number = 0;
                readonly name: string;
                constructor(public id: number) { super(); }
                abstract area(): number;
                describe(): string { return this.name; }
                get size() { return 1; }
            }",
        );
        match &stmts[0] {
            Statement::ClassDecl(class) => {
                assert!(class.is_abstract);
                assert_eq!(class.implements.len(), 2);
                assert_eq!(class.members.len(), 6);
                match &class.members[0] {
                    ClassMember::Field(f) => {
                        assert!(f.modifiers.is_static);
                        assert_eq!(f.modifiers.visibility, Some(Visibility::Private));
                    }
                    other => panic!("unexpected {:?}", other),
                }
                match &class.members[2] {
                    ClassMember::Constructor(c) => {
                        assert_eq!(c.params[0].accessibility, Some(Visibility::Public))
                    }
                    other => panic!("unexpected {:?}", other),
                }
                assert!(matches!(&class.members[3], ClassMember::Method(m) if m.body.is_none()));
                assert!(matches!(&class.members[5], ClassMember::Method(m) if m.kind == MethodKind::Getter));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_import_forms() {
        let stmts = parse(
            "import Foo, { a, b as c } from './mod';
             import * as ns from './ns';
             import type { T } from './types';",
        );
        match &stmts[0] {
            Statement::ImportDecl(import) => {
                assert_eq!(import.specifiers.len(), 3);
                assert_eq!(import.specifiers[2].local_name().name, "c");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(&stmts[1], Statement::ImportDecl(i) if matches!(i.specifiers[0], ImportSpecifier::Namespace(_))));
        assert!(matches!(&stmts[2], Statement::ImportDecl(i) if i.type_only));
    }

    #[test]
    fn test_export_forms() {
        let stmts = parse(
            "export default class Widget {}
             export function helper() {}
             export { helper as util } from './x';
             export * from './all';
             export default 42;",
        );
        assert!(matches!(&stmts[0], Statement::ExportDecl(ExportDecl::DefaultDeclaration(_))));
        assert!(matches!(&stmts[1], Statement::ExportDecl(ExportDecl::Declaration(_))));
        assert!(matches!(&stmts[2], Statement::ExportDecl(ExportDecl::Named { source: Some(_), .. })));
        assert!(matches!(&stmts[3], Statement::ExportDecl(ExportDecl::All { .. })));
        assert!(matches!(&stmts[4], Statement::ExportDecl(ExportDecl::DefaultExpression { .. })));
    }

    #[test]
    fn test_anonymous_default_function() {
        let stmts = parse("export default function (x: number) { return x; }");
        match &stmts[0] {
            Statement::ExportDecl(ExportDecl::DefaultDeclaration(decl)) => {
                assert!(matches!(decl.as_ref(), Statement::FunctionDecl(f) if f.name.name == "default"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_for_variants() {
        let stmts = parse(
            "for (let i = 0; i < 10; i++) {}
             for (const x of items) {}
             for (;;) { break; }",
        );
        assert!(matches!(&stmts[0], Statement::For(f) if f.init.is_some()));
        assert!(matches!(&stmts[1], Statement::ForOf(f) if f.kind == VariableKind::Const));
        assert!(matches!(&stmts[2], Statement::For(f) if f.test.is_none()));
    }

    #[test]
    fn test_return_respects_line_break() {
        let stmts = parse("function f() { return\n 1 }");
        match &stmts[0] {
            Statement::FunctionDecl(f) => {
                assert!(matches!(&f.body.statements[0], Statement::Return(r) if r.value.is_none()));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_switch_and_try() {
        let stmts = parse(
            "switch (x) { case 1: a(); break; default: b(); }
             try { f(); } catch (e) { g(); } finally { h(); }",
        );
        assert!(matches!(&stmts[0], Statement::Switch(s) if s.cases.len() == 2));
        assert!(matches!(&stmts[1], Statement::Try(t) if t.catch_clause.is_some() && t.finally_clause.is_some()));
    }

    #[test]
    fn test_interface_enum_alias() {
        let stmts = parse(
            "interface Shape extends Named { area(): number; readonly sides?: number }
             const enum Color { Red, Green = 2 }
             type Callback = (x: number) => void;",
        );
        assert!(matches!(&stmts[0], Statement::InterfaceDecl(i) if i.members.len() == 2));
        assert!(matches!(&stmts[1], Statement::EnumDecl(e) if e.members.len() == 2));
        assert!(matches!(&stmts[2], Statement::TypeAliasDecl(_)));
    }

    #[test]
    fn test_missing_semicolon_on_same_line() {
        assert!(Parser::new("a b").unwrap().parse().is_err());
        assert!(Parser::new("a\nb").unwrap().parse().is_ok());
    }
}
