//! Lexer for the TypeScript subset.
//!
//! Built on `logos`. The logos token enum is private; it is converted into the
//! public [`Token`] enum together with a [`Span`] carrying line and column.

use crate::parser::token::{Span, TemplatePart, Token};
use logos::Logos;
use thiserror::Error;

#[derive(Logos, Debug, Clone, PartialEq)]
enum LogosToken {
    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    Whitespace,

    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[token("/*", lex_block_comment)]
    BlockComment,

    #[token("function")]
    Function,
    #[token("class")]
    Class,
    #[token("interface")]
    Interface,
    #[token("type")]
    Type,
    #[token("enum")]
    Enum,
    #[token("let")]
    Let,
    #[token("const")]
    Const,
    #[token("var")]
    Var,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("for")]
    For,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("return")]
    Return,
    #[token("try")]
    Try,
    #[token("catch")]
    Catch,
    #[token("finally")]
    Finally,
    #[token("throw")]
    Throw,
    #[token("import")]
    Import,
    #[token("export")]
    Export,
    #[token("from")]
    From,
    #[token("new")]
    New,
    #[token("this")]
    This,
    #[token("super")]
    Super,
    #[token("static")]
    Static,
    #[token("abstract")]
    Abstract,
    #[token("readonly")]
    Readonly,
    #[token("extends")]
    Extends,
    #[token("implements")]
    Implements,
    #[token("private")]
    Private,
    #[token("protected")]
    Protected,
    #[token("public")]
    Public,
    #[token("typeof")]
    Typeof,
    #[token("instanceof")]
    Instanceof,
    #[token("as")]
    As,
    #[token("void")]
    Void,
    #[token("in")]
    In,
    #[token("of")]
    Of,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_string())]
    Identifier(String),

    #[regex(r"0[xX][0-9a-fA-F]+(_[0-9a-fA-F]+)*", |lex| lex.slice().to_string())]
    #[regex(r"0[bB][01]+(_[01]+)*", |lex| lex.slice().to_string())]
    #[regex(r"0[oO][0-7]+(_[0-7]+)*", octal_to_decimal)]
    #[regex(r"[0-9]+(_[0-9]+)*", |lex| lex.slice().to_string())]
    IntLiteral(String),

    #[regex(r"[0-9]+(_[0-9]+)*\.[0-9]*(_[0-9]+)*([eE][+-]?[0-9]+)?", |lex| lex.slice().to_string())]
    #[regex(r"[0-9]+(_[0-9]+)*[eE][+-]?[0-9]+", |lex| lex.slice().to_string())]
    #[regex(r"\.[0-9]+(_[0-9]+)*([eE][+-]?[0-9]+)?", |lex| lex.slice().to_string())]
    FloatLiteral(String),

    #[regex(r"[0-9]+(_[0-9]+)*n", |lex| lex.slice().trim_end_matches('n').to_string())]
    BigIntLiteral(String),

    #[regex(r#""([^"\\\n]|\\.)*""#, parse_string)]
    #[regex(r"'([^'\\\n]|\\.)*'", parse_string)]
    StringLiteral(String),

    /// Raw body of a template literal, holes still unparsed.
    #[token("`", lex_template)]
    Template(String),

    #[token("===")]
    EqualEqualEqual,
    #[token("!==")]
    BangEqualEqual,
    #[token(">>>=")]
    GreaterGreaterGreaterEqual,
    #[token(">>>")]
    GreaterGreaterGreater,
    #[token("...")]
    DotDotDot,
    #[token("**")]
    StarStar,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    BangEqual,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("<<=")]
    LessLessEqual,
    #[token(">>=")]
    GreaterGreaterEqual,
    #[token("<<")]
    LessLess,
    #[token(">>")]
    GreaterGreater,
    #[token("?.")]
    QuestionDot,
    #[token("??")]
    QuestionQuestion,
    #[token("=>")]
    Arrow,
    #[token("+=")]
    PlusEqual,
    #[token("-=")]
    MinusEqual,
    #[token("*=")]
    StarEqual,
    #[token("/=")]
    SlashEqual,
    #[token("%=")]
    PercentEqual,
    #[token("&=")]
    AmpEqual,
    #[token("|=")]
    PipeEqual,
    #[token("^=")]
    CaretEqual,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("=")]
    Equal,
    #[token("?")]
    Question,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
}

fn lex_block_comment(lex: &mut logos::Lexer<LogosToken>) -> logos::Skip {
    let remainder = lex.remainder();
    match remainder.find("*/") {
        Some(end) => lex.bump(end + 2),
        None => lex.bump(remainder.len()),
    }
    logos::Skip
}

fn octal_to_decimal(lex: &mut logos::Lexer<LogosToken>) -> Option<String> {
    let digits = lex.slice()[2..].replace('_', "");
    i64::from_str_radix(&digits, 8).ok().map(|n| n.to_string())
}

fn parse_string(lex: &mut logos::Lexer<LogosToken>) -> Option<String> {
    let s = lex.slice();
    Some(unescape(&s[1..s.len() - 1]))
}

/// Scan to the closing backtick, skipping escapes and `${ ... }` holes.
fn lex_template(lex: &mut logos::Lexer<LogosToken>) -> Option<String> {
    let remainder = lex.remainder();
    let mut chars = remainder.char_indices().peekable();
    let mut depth = 0usize;
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            '$' if depth == 0 && matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                depth = 1;
            }
            '{' if depth > 0 => depth += 1,
            '}' if depth > 0 => depth -= 1,
            '`' if depth == 0 => {
                let body = remainder[..idx].to_string();
                lex.bump(idx + 1);
                return Some(body);
            }
            _ => {}
        }
    }
    lex.bump(remainder.len());
    None
}

fn unescape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('0') => result.push('\0'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) => result.push(ch),
                    None => {
                        result.push('u');
                        result.push_str(&hex);
                    }
                }
            }
            Some(other) => result.push(other),
            None => break,
        }
    }
    result
}

/// Lexer error types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("Unexpected character '{char}' at {}:{}", span.line, span.column)]
    UnexpectedCharacter { char: char, span: Span },

    #[error("Unterminated template literal at {}:{}", span.line, span.column)]
    UnterminatedTemplate { span: Span },

    #[error("Invalid number '{text}' at {}:{}", span.line, span.column)]
    InvalidNumber { text: String, span: Span },
}

impl LexError {
    pub fn span(&self) -> &Span {
        match self {
            LexError::UnexpectedCharacter { span, .. }
            | LexError::UnterminatedTemplate { span }
            | LexError::InvalidNumber { span, .. } => span,
        }
    }
}

/// Main lexer structure.
pub struct Lexer<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();
        Self {
            source,
            line_starts,
            errors: Vec::new(),
        }
    }

    /// Tokenize the whole source. The returned stream always ends with `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<(Token, Span)>, Vec<LexError>> {
        let mut tokens = self.tokenize_range(0, self.source.len());
        let end = self.source.len();
        tokens.push((Token::Eof, self.span(end, end)));
        if self.errors.is_empty() {
            Ok(tokens)
        } else {
            Err(self.errors)
        }
    }

    fn tokenize_range(&mut self, start: usize, end: usize) -> Vec<(Token, Span)> {
        let mut tokens = Vec::new();
        let mut logos_lexer = LogosToken::lexer(&self.source[start..end]);
        while let Some(result) = logos_lexer.next() {
            let range = logos_lexer.span();
            let span = self.span(start + range.start, start + range.end);
            match result {
                Ok(LogosToken::Template(body)) => {
                    let parts = self.template_parts(&body, span.start + 1);
                    tokens.push((Token::TemplateLiteral(parts), span));
                }
                Ok(token) => tokens.push((convert(token), span)),
                Err(()) => {
                    let text = logos_lexer.slice();
                    if text.starts_with('`') {
                        self.errors.push(LexError::UnterminatedTemplate { span });
                    } else if text.starts_with(|c: char| c.is_ascii_digit()) {
                        self.errors.push(LexError::InvalidNumber {
                            text: text.to_string(),
                            span,
                        });
                    } else {
                        let char = text.chars().next().unwrap_or('\0');
                        self.errors.push(LexError::UnexpectedCharacter { char, span });
                    }
                }
            }
        }
        tokens
    }

    /// Split a raw template body into text and tokenized holes.
    /// `base` is the byte offset of the body inside the source.
    fn template_parts(&mut self, body: &str, base: usize) -> Vec<TemplatePart> {
        let mut parts = Vec::new();
        let mut text = String::new();
        let mut chars = body.char_indices().peekable();
        while let Some((idx, ch)) = chars.next() {
            match ch {
                '\\' => {
                    if let Some((_, escaped)) = chars.next() {
                        text.push_str(&unescape(&format!("\\{}", escaped)));
                    }
                }
                '$' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    if !text.is_empty() {
                        parts.push(TemplatePart::String(std::mem::take(&mut text)));
                    }
                    let hole_start = idx + 2;
                    let mut depth = 1usize;
                    let mut hole_end = body.len();
                    for (pos, c) in chars.by_ref() {
                        match c {
                            '{' => depth += 1,
                            '}' => {
                                depth -= 1;
                                if depth == 0 {
                                    hole_end = pos;
                                    break;
                                }
                            }
                            _ => {}
                        }
                    }
                    let tokens = self.tokenize_range(base + hole_start, base + hole_end);
                    parts.push(TemplatePart::Expression(tokens));
                }
                _ => text.push(ch),
            }
        }
        if !text.is_empty() {
            parts.push(TemplatePart::String(text));
        }
        parts
    }

    fn span(&self, start: usize, end: usize) -> Span {
        let line_idx = match self.line_starts.binary_search(&start) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let column = self.source[self.line_starts[line_idx]..start].chars().count() + 1;
        Span::new(start, end, line_idx as u32 + 1, column as u32)
    }
}

fn convert(token: LogosToken) -> Token {
    match token {
        LogosToken::Function => Token::Function,
        LogosToken::Class => Token::Class,
        LogosToken::Interface => Token::Interface,
        LogosToken::Type => Token::Type,
        LogosToken::Enum => Token::Enum,
        LogosToken::Let => Token::Let,
        LogosToken::Const => Token::Const,
        LogosToken::Var => Token::Var,
        LogosToken::If => Token::If,
        LogosToken::Else => Token::Else,
        LogosToken::Switch => Token::Switch,
        LogosToken::Case => Token::Case,
        LogosToken::Default => Token::Default,
        LogosToken::For => Token::For,
        LogosToken::While => Token::While,
        LogosToken::Do => Token::Do,
        LogosToken::Break => Token::Break,
        LogosToken::Continue => Token::Continue,
        LogosToken::Return => Token::Return,
        LogosToken::Try => Token::Try,
        LogosToken::Catch => Token::Catch,
        LogosToken::Finally => Token::Finally,
        LogosToken::Throw => Token::Throw,
        LogosToken::Import => Token::Import,
        LogosToken::Export => Token::Export,
        LogosToken::From => Token::From,
        LogosToken::New => Token::New,
        LogosToken::This => Token::This,
        LogosToken::Super => Token::Super,
        LogosToken::Static => Token::Static,
        LogosToken::Abstract => Token::Abstract,
        LogosToken::Readonly => Token::Readonly,
        LogosToken::Extends => Token::Extends,
        LogosToken::Implements => Token::Implements,
        LogosToken::Private => Token::Private,
        LogosToken::Protected => Token::Protected,
        LogosToken::Public => Token::Public,
        LogosToken::Typeof => Token::Typeof,
        LogosToken::Instanceof => Token::Instanceof,
        LogosToken::As => Token::As,
        LogosToken::Void => Token::Void,
        LogosToken::In => Token::In,
        LogosToken::Of => Token::Of,
        LogosToken::True => Token::True,
        LogosToken::False => Token::False,
        LogosToken::Null => Token::Null,
        LogosToken::Identifier(s) => Token::Identifier(s),
        LogosToken::IntLiteral(s) => Token::IntLiteral(s),
        LogosToken::FloatLiteral(s) => Token::FloatLiteral(s),
        LogosToken::BigIntLiteral(s) => Token::BigIntLiteral(s),
        LogosToken::StringLiteral(s) => Token::StringLiteral(s),
        LogosToken::EqualEqualEqual => Token::EqualEqualEqual,
        LogosToken::BangEqualEqual => Token::BangEqualEqual,
        LogosToken::GreaterGreaterGreaterEqual => Token::GreaterGreaterGreaterEqual,
        LogosToken::GreaterGreaterGreater => Token::GreaterGreaterGreater,
        LogosToken::DotDotDot => Token::DotDotDot,
        LogosToken::StarStar => Token::StarStar,
        LogosToken::EqualEqual => Token::EqualEqual,
        LogosToken::BangEqual => Token::BangEqual,
        LogosToken::LessEqual => Token::LessEqual,
        LogosToken::GreaterEqual => Token::GreaterEqual,
        LogosToken::AmpAmp => Token::AmpAmp,
        LogosToken::PipePipe => Token::PipePipe,
        LogosToken::PlusPlus => Token::PlusPlus,
        LogosToken::MinusMinus => Token::MinusMinus,
        LogosToken::LessLessEqual => Token::LessLessEqual,
        LogosToken::GreaterGreaterEqual => Token::GreaterGreaterEqual,
        LogosToken::LessLess => Token::LessLess,
        LogosToken::GreaterGreater => Token::GreaterGreater,
        LogosToken::QuestionDot => Token::QuestionDot,
        LogosToken::QuestionQuestion => Token::QuestionQuestion,
        LogosToken::Arrow => Token::Arrow,
        LogosToken::PlusEqual => Token::PlusEqual,
        LogosToken::MinusEqual => Token::MinusEqual,
        LogosToken::StarEqual => Token::StarEqual,
        LogosToken::SlashEqual => Token::SlashEqual,
        LogosToken::PercentEqual => Token::PercentEqual,
        LogosToken::AmpEqual => Token::AmpEqual,
        LogosToken::PipeEqual => Token::PipeEqual,
        LogosToken::CaretEqual => Token::CaretEqual,
        LogosToken::Plus => Token::Plus,
        LogosToken::Minus => Token::Minus,
        LogosToken::Star => Token::Star,
        LogosToken::Slash => Token::Slash,
        LogosToken::Percent => Token::Percent,
        LogosToken::Bang => Token::Bang,
        LogosToken::Tilde => Token::Tilde,
        LogosToken::Less => Token::Less,
        LogosToken::Greater => Token::Greater,
        LogosToken::Amp => Token::Amp,
        LogosToken::Pipe => Token::Pipe,
        LogosToken::Caret => Token::Caret,
        LogosToken::Equal => Token::Equal,
        LogosToken::Question => Token::Question,
        LogosToken::Dot => Token::Dot,
        LogosToken::Colon => Token::Colon,
        LogosToken::LeftParen => Token::LeftParen,
        LogosToken::RightParen => Token::RightParen,
        LogosToken::LeftBrace => Token::LeftBrace,
        LogosToken::RightBrace => Token::RightBrace,
        LogosToken::LeftBracket => Token::LeftBracket,
        LogosToken::RightBracket => Token::RightBracket,
        LogosToken::Semicolon => Token::Semicolon,
        LogosToken::Comma => Token::Comma,
        LogosToken::Whitespace
        | LogosToken::LineComment
        | LogosToken::BlockComment
        | LogosToken::Template(_) => {
            unreachable!("skipped or handled before conversion")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|(tok, _)| tok)
            .collect()
    }

    #[test]
    fn test_numeric_literal_kinds() {
        let tokens = kinds("1 1.0 .5 2e3 10n 0x1F 0o17");
        assert_eq!(tokens[0], Token::IntLiteral("1".into()));
        assert_eq!(tokens[1], Token::FloatLiteral("1.0".into()));
        assert_eq!(tokens[2], Token::FloatLiteral(".5".into()));
        assert_eq!(tokens[3], Token::FloatLiteral("2e3".into()));
        assert_eq!(tokens[4], Token::BigIntLiteral("10".into()));
        assert_eq!(tokens[5], Token::IntLiteral("0x1F".into()));
        assert_eq!(tokens[6], Token::IntLiteral("15".into()));
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let tokens = kinds("export default class Foo extends Bar");
        assert_eq!(
            tokens,
            vec![
                Token::Export,
                Token::Default,
                Token::Class,
                Token::Identifier("Foo".into()),
                Token::Extends,
                Token::Identifier("Bar".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        let tokens = kinds(r#"'it\'s' "a\nb""#);
        assert_eq!(tokens[0], Token::StringLiteral("it's".into()));
        assert_eq!(tokens[1], Token::StringLiteral("a\nb".into()));
    }

    #[test]
    fn test_template_literal_with_hole() {
        let tokens = kinds("`sum: ${a + b}!`");
        match &tokens[0] {
            Token::TemplateLiteral(parts) => {
                assert_eq!(parts.len(), 3);
                assert_eq!(parts[0], TemplatePart::String("sum: ".into()));
                match &parts[1] {
                    TemplatePart::Expression(hole) => {
                        assert_eq!(hole.len(), 3);
                        assert_eq!(hole[0].0, Token::Identifier("a".into()));
                        assert_eq!(hole[0].1.start, 8);
                    }
                    other => panic!("expected hole, got {:?}", other),
                }
                assert_eq!(parts[2], TemplatePart::String("!".into()));
            }
            other => panic!("expected template, got {:?}", other),
        }
    }

    #[test]
    fn test_line_and_column() {
        let tokens = Lexer::new("let a\n  = 1;").tokenize().unwrap();
        let (_, eq_span) = &tokens[2];
        assert_eq!(eq_span.line, 2);
        assert_eq!(eq_span.column, 3);
    }

    #[test]
    fn test_comments_skipped() {
        let tokens = kinds("a /* block */ // line\n b");
        assert_eq!(
            tokens,
            vec![
                Token::Identifier("a".into()),
                Token::Identifier("b".into()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_unterminated_template_is_error() {
        let result = Lexer::new("`abc").tokenize();
        assert!(matches!(
            result,
            Err(errors) if matches!(errors[0], LexError::UnterminatedTemplate { .. })
        ));
    }

    #[test]
    fn test_unexpected_character() {
        let result = Lexer::new("let # = 1").tokenize();
        let errors = result.unwrap_err();
        assert!(matches!(errors[0], LexError::UnexpectedCharacter { char: '#', .. }));
    }
}
