//! Token definitions for the TypeScript subset accepted by Javelin.
//!
//! Keywords, operators, literals and the `Span` type that every token and
//! AST node carries.

use std::fmt;

/// A token of the source language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Declarations
    Function,
    Class,
    Interface,
    Type,
    Enum,
    Let,
    Const,
    Var,

    // Control flow
    If,
    Else,
    Switch,
    Case,
    Default,
    For,
    While,
    Do,
    Break,
    Continue,
    Return,
    Try,
    Catch,
    Finally,
    Throw,

    // Modules
    Import,
    Export,
    From,

    // OOP keywords
    New,
    This,
    Super,
    Static,
    Abstract,
    Readonly,
    Extends,
    Implements,
    Private,
    Protected,
    Public,

    // Type operators
    Typeof,
    Instanceof,
    As,
    Void,
    In,
    Of,

    // Literals. Numeric literals keep their source text so the lowering can
    // decide the target type lexically.
    IntLiteral(String),
    FloatLiteral(String),
    BigIntLiteral(String),
    StringLiteral(String),
    TemplateLiteral(Vec<TemplatePart>),
    True,
    False,
    Null,

    Identifier(String),

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    StarStar,

    // Unary
    PlusPlus,
    MinusMinus,
    Bang,
    Tilde,

    // Comparison
    EqualEqual,
    BangEqual,
    EqualEqualEqual,
    BangEqualEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    // Logical
    AmpAmp,
    PipePipe,

    // Bitwise
    Amp,
    Pipe,
    Caret,
    LessLess,
    GreaterGreater,
    GreaterGreaterGreater,

    // Assignment
    Equal,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    AmpEqual,
    PipeEqual,
    CaretEqual,
    LessLessEqual,
    GreaterGreaterEqual,
    GreaterGreaterGreaterEqual,

    // Other
    Question,
    QuestionQuestion,
    QuestionDot,
    DotDotDot,
    Dot,
    Colon,
    Arrow,

    // Delimiters
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Semicolon,
    Comma,

    Eof,
}

/// A part of a template literal.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    String(String),
    /// Tokens of a `${...}` hole, spans already relative to the whole file.
    Expression(Vec<(Token, Span)>),
}

/// Source location information for a token or node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// Span from the start of `self` to the end of `other`.
    pub fn to(&self, other: &Span) -> Span {
        Span {
            start: self.start,
            end: other.end.max(self.end),
            line: self.line,
            column: self.column,
        }
    }
}

impl Token {
    /// Keywords that may still be used as property names (`obj.type`,
    /// `{ default: 1 }`) and, for the contextual ones, as identifiers.
    pub fn keyword_text(&self) -> Option<&'static str> {
        let text = match self {
            Token::Function => "function",
            Token::Class => "class",
            Token::Interface => "interface",
            Token::Type => "type",
            Token::Enum => "enum",
            Token::Let => "let",
            Token::Const => "const",
            Token::Var => "var",
            Token::If => "if",
            Token::Else => "else",
            Token::Switch => "switch",
            Token::Case => "case",
            Token::Default => "default",
            Token::For => "for",
            Token::While => "while",
            Token::Do => "do",
            Token::Break => "break",
            Token::Continue => "continue",
            Token::Return => "return",
            Token::Try => "try",
            Token::Catch => "catch",
            Token::Finally => "finally",
            Token::Throw => "throw",
            Token::Import => "import",
            Token::Export => "export",
            Token::From => "from",
            Token::New => "new",
            Token::This => "this",
            Token::Super => "super",
            Token::Static => "static",
            Token::Abstract => "abstract",
            Token::Readonly => "readonly",
            Token::Extends => "extends",
            Token::Implements => "implements",
            Token::Private => "private",
            Token::Protected => "protected",
            Token::Public => "public",
            Token::Typeof => "typeof",
            Token::Instanceof => "instanceof",
            Token::As => "as",
            Token::Void => "void",
            Token::In => "in",
            Token::Of => "of",
            Token::True => "true",
            Token::False => "false",
            Token::Null => "null",
            _ => return None,
        };
        Some(text)
    }

    /// Contextual keywords that are valid binding names in TypeScript.
    pub fn is_contextual_keyword(&self) -> bool {
        matches!(
            self,
            Token::Type
                | Token::From
                | Token::Of
                | Token::As
                | Token::Readonly
                | Token::Abstract
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.keyword_text() {
            return f.write_str(text);
        }
        let text = match self {
            Token::IntLiteral(n) | Token::FloatLiteral(n) => return f.write_str(n),
            Token::BigIntLiteral(n) => return write!(f, "{}n", n),
            Token::StringLiteral(_) => "<string>",
            Token::TemplateLiteral(_) => "`...`",
            Token::Identifier(name) => return write!(f, "identifier '{}'", name),
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::StarStar => "**",
            Token::PlusPlus => "++",
            Token::MinusMinus => "--",
            Token::Bang => "!",
            Token::Tilde => "~",
            Token::EqualEqual => "==",
            Token::BangEqual => "!=",
            Token::EqualEqualEqual => "===",
            Token::BangEqualEqual => "!==",
            Token::Less => "<",
            Token::LessEqual => "<=",
            Token::Greater => ">",
            Token::GreaterEqual => ">=",
            Token::AmpAmp => "&&",
            Token::PipePipe => "||",
            Token::Amp => "&",
            Token::Pipe => "|",
            Token::Caret => "^",
            Token::LessLess => "<<",
            Token::GreaterGreater => ">>",
            Token::GreaterGreaterGreater => ">>>",
            Token::Equal => "=",
            Token::PlusEqual => "+=",
            Token::MinusEqual => "-=",
            Token::StarEqual => "*=",
            Token::SlashEqual => "/=",
            Token::PercentEqual => "%=",
            Token::AmpEqual => "&=",
            Token::PipeEqual => "|=",
            Token::CaretEqual => "^=",
            Token::LessLessEqual => "<<=",
            Token::GreaterGreaterEqual => ">>=",
            Token::GreaterGreaterGreaterEqual => ">>>=",
            Token::Question => "?",
            Token::QuestionQuestion => "??",
            Token::QuestionDot => "?.",
            Token::DotDotDot => "...",
            Token::Dot => ".",
            Token::Colon => ":",
            Token::Arrow => "=>",
            Token::LeftParen => "(",
            Token::RightParen => ")",
            Token::LeftBrace => "{",
            Token::RightBrace => "}",
            Token::LeftBracket => "[",
            Token::RightBracket => "]",
            Token::Semicolon => ";",
            Token::Comma => ",",
            Token::Eof => "end of file",
            _ => "<token>",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_to() {
        let a = Span::new(0, 3, 1, 1);
        let b = Span::new(5, 9, 1, 6);
        let joined = a.to(&b);
        assert_eq!(joined.start, 0);
        assert_eq!(joined.end, 9);
        assert_eq!(joined.column, 1);
    }

    #[test]
    fn test_contextual_keywords() {
        assert!(Token::From.is_contextual_keyword());
        assert!(!Token::Class.is_contextual_keyword());
        assert_eq!(Token::Readonly.keyword_text(), Some("readonly"));
    }
}
