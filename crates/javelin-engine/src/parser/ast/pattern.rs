//! Binding patterns used by variable declarations, parameters and catch
//! clauses.

use super::*;
use crate::parser::token::Span;

/// Binding pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Simple identifier: x
    Identifier(Identifier),

    /// Array destructuring: [x, y]
    Array(ArrayPattern),

    /// Object destructuring: { x, y: z }
    Object(ObjectPattern),
}

impl Pattern {
    pub fn span(&self) -> &Span {
        match self {
            Pattern::Identifier(id) => &id.span,
            Pattern::Array(p) => &p.span,
            Pattern::Object(p) => &p.span,
        }
    }

    /// The bound name when the pattern is a plain identifier.
    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            Pattern::Identifier(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayPattern {
    /// `None` marks an elision: `[, b]`
    pub elements: Vec<Option<Pattern>>,
    pub rest: Option<Box<Pattern>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPattern {
    pub properties: Vec<ObjectPatternProperty>,
    pub rest: Option<Identifier>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPatternProperty {
    pub key: Identifier,
    pub value: Pattern,
    pub default_value: Option<Expression>,
    pub span: Span,
}
