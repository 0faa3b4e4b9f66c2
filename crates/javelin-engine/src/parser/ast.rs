//! Abstract Syntax Tree for the TypeScript subset.
//!
//! This module defines the AST the lowering engine consumes:
//! - Module structure
//! - Statements (declarations, control flow, imports/exports)
//! - Expressions
//! - Type annotations
//! - Binding patterns
//!
//! Every AST node includes a `Span` for precise source location tracking.

use crate::parser::token::Span;

pub mod expression;
pub mod pattern;
pub mod statement;
pub mod types;

pub use expression::*;
pub use pattern::*;
pub use statement::*;
pub use types::*;

/// Root node: one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Top-level statements (declarations, imports, exports)
    pub statements: Vec<Statement>,

    /// Span covering the entire module
    pub span: Span,
}

impl Module {
    pub fn new(statements: Vec<Statement>, span: Span) -> Self {
        Self { statements, span }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }
}

/// A name for a variable, function, class, property, etc.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Member visibility as written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
    Protected,
}
