//! Recursive descent parser
//!
//! Transforms the token stream produced by the lexer into the AST in
//! [`crate::parser::ast`]. Statement, expression, type and pattern parsing
//! live in the submodules; this file holds the token cursor shared by all of
//! them.

pub mod error;
pub mod expr;
pub mod guards;
pub mod pattern;
pub mod precedence;
pub mod recovery;
pub mod stmt;
pub mod types;

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer};
use crate::parser::token::{Span, Token};

pub use error::{ParseError, ParseErrorKind};

/// Parser state.
///
/// Mostly LL(2); arrow functions and explicit call type arguments are
/// recognised by speculative parsing with [`Parser::checkpoint`] and
/// [`Parser::restore`].
pub struct Parser {
    /// Pre-tokenized input, always terminated by `Eof`
    tokens: Vec<(Token, Span)>,

    /// Current position in token stream
    pos: usize,

    /// Accumulated parse errors (allows continuing after errors)
    errors: Vec<ParseError>,

    /// Current nesting depth, bounded by [`guards::MAX_PARSE_DEPTH`]
    pub(crate) depth: usize,
}

/// Saved cursor for speculative parsing.
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint {
    pos: usize,
    errors: usize,
    depth: usize,
}

impl Parser {
    /// Create a new parser from source code.
    pub fn new(source: &str) -> Result<Self, Vec<LexError>> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self::from_tokens(tokens))
    }

    /// Create a parser over an already lexed token stream.
    pub fn from_tokens(mut tokens: Vec<(Token, Span)>) -> Self {
        if !matches!(tokens.last(), Some((Token::Eof, _))) {
            let eof_span = match tokens.last() {
                Some((_, last)) => Span::new(last.end, last.end, last.line, last.column),
                None => Span::new(0, 0, 1, 1),
            };
            tokens.push((Token::Eof, eof_span));
        }
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            depth: 0,
        }
    }

    /// Parse the entire source file into a Module AST.
    ///
    /// Returns the Module on success, or all accumulated errors on failure.
    pub fn parse(mut self) -> Result<Module, Vec<ParseError>> {
        let start_span = self.current_span();
        let mut statements = Vec::new();

        while !self.at_eof() {
            let before = self.pos;
            match stmt::parse_statement(&mut self) {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    recovery::sync_to_statement_boundary(&mut self);
                    if self.pos == before {
                        self.advance();
                    }
                }
            }
        }

        if !self.errors.is_empty() {
            return Err(self.errors);
        }

        let span = match statements.last() {
            Some(last) => self.combine_spans(&start_span, last.span()),
            None => start_span,
        };
        Ok(Module { statements, span })
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Get the current token.
    #[inline]
    pub fn current(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    /// Get the current token's span.
    #[inline]
    pub fn current_span(&self) -> Span {
        self.tokens[self.pos].1
    }

    /// Span of the most recently consumed token.
    #[inline]
    pub fn previous_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].1
    }

    /// Peek at the next token (lookahead).
    #[inline]
    pub fn peek(&self) -> Option<&Token> {
        self.peek_nth(1)
    }

    /// Peek `n` tokens ahead of the current one.
    #[inline]
    pub fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|(tok, _)| tok)
    }

    /// Advance to the next token, returning the previous current token.
    pub fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].0.clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    /// Check if the current token matches the given kind.
    #[inline]
    pub fn check(&self, expected: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(expected)
    }

    /// Check if the current token matches any of the given kinds.
    pub fn check_any(&self, expected: &[Token]) -> bool {
        expected.iter().any(|tok| self.check(tok))
    }

    /// Check if the current token is the identifier `name`.
    pub fn check_identifier(&self, name: &str) -> bool {
        matches!(self.current(), Token::Identifier(id) if id == name)
    }

    /// Consume the current token if it matches.
    pub fn eat(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Check if we've reached EOF.
    #[inline]
    pub fn at_eof(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    /// True when the current token starts a new source line.
    pub fn at_line_break(&self) -> bool {
        self.pos > 0 && self.current_span().line > self.previous_span().line
    }

    /// Consume the current token if it matches the expected kind.
    pub fn expect(&mut self, expected: Token) -> Result<Token, ParseError> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected_token(&[expected]))
        }
    }

    /// Consume a closing `>` of a type argument list, splitting `>>`, `>>>`,
    /// `>=` and friends so nested generics close correctly.
    pub fn expect_closing_angle(&mut self) -> Result<(), ParseError> {
        let rest = match self.current() {
            Token::Greater => {
                self.advance();
                return Ok(());
            }
            Token::GreaterGreater => Token::Greater,
            Token::GreaterGreaterGreater => Token::GreaterGreater,
            Token::GreaterEqual => Token::Equal,
            Token::GreaterGreaterEqual => Token::GreaterEqual,
            Token::GreaterGreaterGreaterEqual => Token::GreaterGreaterEqual,
            _ => return Err(self.unexpected_token(&[Token::Greater])),
        };
        let span = &mut self.tokens[self.pos].1;
        span.start += 1;
        span.column += 1;
        self.tokens[self.pos].0 = rest;
        Ok(())
    }

    /// Consume an identifier, accepting contextual keywords as names.
    pub fn expect_identifier(&mut self) -> Result<Identifier, ParseError> {
        let span = self.current_span();
        match self.current().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(Identifier::new(name, span))
            }
            tok if tok.is_contextual_keyword() => {
                self.advance();
                Ok(Identifier::new(tok.keyword_text().unwrap_or_default(), span))
            }
            _ => Err(self.unexpected_token(&[Token::Identifier(String::new())])),
        }
    }

    /// Consume a property name: any identifier or keyword.
    pub fn expect_property_name(&mut self) -> Result<Identifier, ParseError> {
        let span = self.current_span();
        let name = match self.current() {
            Token::Identifier(name) => name.clone(),
            tok => match tok.keyword_text() {
                Some(text) => text.to_string(),
                None => return Err(self.unexpected_token(&[Token::Identifier(String::new())])),
            },
        };
        self.advance();
        Ok(Identifier::new(name, span))
    }

    /// True when the current token can be used as a binding name.
    pub fn at_identifier(&self) -> bool {
        matches!(self.current(), Token::Identifier(_)) || self.current().is_contextual_keyword()
    }

    /// Consume an optional statement terminator.
    pub fn consume_semicolon(&mut self) {
        self.eat(&Token::Semicolon);
    }

    // ========================================================================
    // Speculation
    // ========================================================================

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            errors: self.errors.len(),
            depth: self.depth,
        }
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.errors.truncate(checkpoint.errors);
        self.depth = checkpoint.depth;
    }

    // ========================================================================
    // Error Handling
    // ========================================================================

    /// Create an "unexpected token" error at the current position.
    pub fn unexpected_token(&self, expected: &[Token]) -> ParseError {
        let span = self.current_span();
        if self.at_eof() {
            ParseError::unexpected_eof(expected.to_vec(), span)
        } else {
            ParseError::unexpected_token(expected.to_vec(), self.current().clone(), span)
        }
    }

    /// Span covering `start` through `end`.
    pub fn combine_spans(&self, start: &Span, end: &Span) -> Span {
        start.to(end)
    }

    /// Span from `start` to the end of the last consumed token.
    pub fn span_from(&self, start: &Span) -> Span {
        start.to(&self.previous_span())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Module {
        Parser::new(source).unwrap().parse().unwrap()
    }

    #[test]
    fn test_parse_empty_module() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_parse_collects_multiple_errors() {
        let errors = Parser::new("let = 1;\nlet = 2;\nlet ok = 3;")
            .unwrap()
            .parse()
            .unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_nested_generic_closing() {
        let module = parse("let x: Array<Array<number>> = [];");
        match &module.statements[0] {
            Statement::VariableDecl(decl) => {
                let annotation = decl.declarations[0].type_annotation.as_ref().unwrap();
                match &annotation.ty {
                    Type::Reference(r) => {
                        let args = r.type_args.as_ref().unwrap();
                        assert!(matches!(&args[0].ty, Type::Reference(inner) if inner.simple_name() == "Array"));
                    }
                    other => panic!("unexpected type {:?}", other),
                }
            }
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn test_checkpoint_restore() {
        let mut parser = Parser::new("a b c").unwrap();
        let cp = parser.checkpoint();
        parser.advance();
        parser.advance();
        parser.restore(cp);
        assert!(parser.check_identifier("a"));
    }
}
