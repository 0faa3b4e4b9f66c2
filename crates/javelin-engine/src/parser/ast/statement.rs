//! Statement AST nodes
//!
//! This module defines all statement types, including:
//! - Variable declarations (let, const, var)
//! - Function, class, interface, enum and type alias declarations
//! - Control flow statements (if, while, for, switch, etc.)
//! - Import/export declarations

use super::*;
use crate::parser::token::Span;

/// Top-level or block-level statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    VariableDecl(VariableDecl),
    FunctionDecl(FunctionDecl),
    ClassDecl(ClassDecl),
    InterfaceDecl(InterfaceDecl),
    EnumDecl(EnumDecl),
    TypeAliasDecl(TypeAliasDecl),
    ImportDecl(ImportDecl),
    ExportDecl(ExportDecl),
    Expression(ExpressionStatement),
    If(IfStatement),
    Switch(SwitchStatement),
    While(WhileStatement),
    DoWhile(DoWhileStatement),
    For(ForStatement),
    ForOf(ForOfStatement),
    Break(BreakStatement),
    Continue(ContinueStatement),
    Return(ReturnStatement),
    Throw(ThrowStatement),
    Try(TryStatement),
    Labeled(LabeledStatement),
    Block(BlockStatement),
    /// Empty statement (;)
    Empty(Span),
}

impl Statement {
    /// Get the span of this statement
    pub fn span(&self) -> &Span {
        match self {
            Statement::VariableDecl(s) => &s.span,
            Statement::FunctionDecl(s) => &s.span,
            Statement::ClassDecl(s) => &s.span,
            Statement::InterfaceDecl(s) => &s.span,
            Statement::EnumDecl(s) => &s.span,
            Statement::TypeAliasDecl(s) => &s.span,
            Statement::ImportDecl(s) => &s.span,
            Statement::ExportDecl(s) => s.span(),
            Statement::Expression(s) => &s.span,
            Statement::If(s) => &s.span,
            Statement::Switch(s) => &s.span,
            Statement::While(s) => &s.span,
            Statement::DoWhile(s) => &s.span,
            Statement::For(s) => &s.span,
            Statement::ForOf(s) => &s.span,
            Statement::Break(s) => &s.span,
            Statement::Continue(s) => &s.span,
            Statement::Return(s) => &s.span,
            Statement::Throw(s) => &s.span,
            Statement::Try(s) => &s.span,
            Statement::Labeled(s) => &s.span,
            Statement::Block(s) => &s.span,
            Statement::Empty(span) => span,
        }
    }

    /// Check if this statement is a declaration
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            Statement::VariableDecl(_)
                | Statement::FunctionDecl(_)
                | Statement::ClassDecl(_)
                | Statement::InterfaceDecl(_)
                | Statement::EnumDecl(_)
                | Statement::TypeAliasDecl(_)
        )
    }
}

// ============================================================================
// Variable Declaration
// ============================================================================

/// Variable declaration: `let x = 42, y;` or `const y: number = 10;`
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub kind: VariableKind,
    pub declarations: Vec<VariableDeclarator>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Let,
    Const,
    Var,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarator {
    pub pattern: Pattern,
    pub type_annotation: Option<TypeAnnotation>,
    pub initializer: Option<Expression>,
    pub span: Span,
}

// ============================================================================
// Function Declaration
// ============================================================================

/// Function declaration
///
/// # Example
/// ```text
/// function add(x: number, y: number = 1): number {
///     return x + y;
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Identifier,
    pub type_params: Option<Vec<TypeParameter>>,
    pub params: Vec<Parameter>,
    pub return_type: Option<TypeAnnotation>,
    pub body: BlockStatement,
    pub span: Span,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub pattern: Pattern,
    pub type_annotation: Option<TypeAnnotation>,
    /// Default value for the parameter (e.g., `x: number = 10`)
    pub default_value: Option<Expression>,
    /// `x?: T`
    pub optional: bool,
    /// `...rest: T[]`
    pub is_rest: bool,
    /// Constructor parameter property: `constructor(private x: number)`
    pub accessibility: Option<Visibility>,
    pub readonly: bool,
    pub span: Span,
}

impl Parameter {
    pub fn name(&self) -> Option<&Identifier> {
        self.pattern.as_identifier()
    }
}

// ============================================================================
// Class Declaration
// ============================================================================

/// Class declaration
///
/// # Example
/// ```text
/// class Point extends Base implements Shape {
///     private x: number = 0;
///     constructor(x: number) { super(); this.x = x; }
///     area(): number { return 0; }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Identifier,
    pub type_params: Option<Vec<TypeParameter>>,
    pub extends: Option<TypeAnnotation>,
    pub implements: Vec<TypeAnnotation>,
    pub members: Vec<ClassMember>,
    pub is_abstract: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Field(FieldDecl),
    Method(MethodDecl),
    Constructor(ConstructorDecl),
}

impl ClassMember {
    pub fn span(&self) -> &Span {
        match self {
            ClassMember::Field(f) => &f.span,
            ClassMember::Method(m) => &m.span,
            ClassMember::Constructor(c) => &c.span,
        }
    }
}

/// Modifiers written before a class member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemberModifiers {
    pub visibility: Option<Visibility>,
    pub is_static: bool,
    pub is_readonly: bool,
    pub is_abstract: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: Identifier,
    pub modifiers: MemberModifiers,
    pub type_annotation: Option<TypeAnnotation>,
    pub initializer: Option<Expression>,
    pub optional: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Method,
    Getter,
    Setter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: Identifier,
    pub kind: MethodKind,
    pub modifiers: MemberModifiers,
    pub type_params: Option<Vec<TypeParameter>>,
    pub params: Vec<Parameter>,
    pub return_type: Option<TypeAnnotation>,
    /// `None` for abstract methods
    pub body: Option<BlockStatement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDecl {
    pub modifiers: MemberModifiers,
    pub params: Vec<Parameter>,
    pub body: BlockStatement,
    pub span: Span,
}

// ============================================================================
// Interface, Enum and Type Alias
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub name: Identifier,
    pub type_params: Option<Vec<TypeParameter>>,
    pub extends: Vec<TypeAnnotation>,
    pub members: Vec<InterfaceMember>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceMember {
    Property {
        name: Identifier,
        type_annotation: TypeAnnotation,
        optional: bool,
        readonly: bool,
        span: Span,
    },
    Method {
        name: Identifier,
        type_params: Option<Vec<TypeParameter>>,
        params: Vec<Parameter>,
        return_type: Option<TypeAnnotation>,
        span: Span,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: Identifier,
    pub members: Vec<EnumMember>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: Identifier,
    pub initializer: Option<Expression>,
    pub span: Span,
}

/// Type alias: `type Callback = (x: number) => void;`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasDecl {
    pub name: Identifier,
    pub type_params: Option<Vec<TypeParameter>>,
    pub type_annotation: TypeAnnotation,
    pub span: Span,
}

// ============================================================================
// Import / Export
// ============================================================================

/// `import Foo, { a, b as c } from "./mod";`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub specifiers: Vec<ImportSpecifier>,
    pub source: StringLiteral,
    /// `import type { ... }`
    pub type_only: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportSpecifier {
    /// `import Foo from`
    Default(Identifier),
    /// `import { a as b } from`
    Named {
        imported: Identifier,
        local: Option<Identifier>,
    },
    /// `import * as ns from`
    Namespace(Identifier),
}

impl ImportSpecifier {
    /// Name the import binds in the importing module.
    pub fn local_name(&self) -> &Identifier {
        match self {
            ImportSpecifier::Default(id) | ImportSpecifier::Namespace(id) => id,
            ImportSpecifier::Named { imported, local } => local.as_ref().unwrap_or(imported),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportDecl {
    /// `export function f() {}`, `export const x = 1;`
    Declaration(Box<Statement>),

    /// `export default class Foo {}`, `export default function () {}`
    DefaultDeclaration(Box<Statement>),

    /// `export default expr;`
    DefaultExpression { expression: Expression, span: Span },

    /// `export { a, b as c }` or `export { a } from "./mod"`
    Named {
        specifiers: Vec<ExportSpecifier>,
        source: Option<StringLiteral>,
        span: Span,
    },

    /// `export * from "./mod"` or `export * as ns from "./mod"`
    All {
        source: StringLiteral,
        alias: Option<Identifier>,
        span: Span,
    },
}

impl ExportDecl {
    pub fn span(&self) -> &Span {
        match self {
            ExportDecl::Declaration(stmt) | ExportDecl::DefaultDeclaration(stmt) => stmt.span(),
            ExportDecl::DefaultExpression { span, .. }
            | ExportDecl::Named { span, .. }
            | ExportDecl::All { span, .. } => span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    pub local: Identifier,
    pub exported: Option<Identifier>,
}

impl ExportSpecifier {
    pub fn exported_name(&self) -> &Identifier {
        self.exported.as_ref().unwrap_or(&self.local)
    }
}

// ============================================================================
// Control flow
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub condition: Expression,
    pub then_branch: Box<Statement>,
    pub else_branch: Option<Box<Statement>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStatement {
    pub discriminant: Expression,
    pub cases: Vec<SwitchCase>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// `None` for `default:`
    pub test: Option<Expression>,
    pub consequent: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Box<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileStatement {
    pub body: Box<Statement>,
    pub condition: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    pub init: Option<ForInit>,
    pub test: Option<Expression>,
    pub update: Option<Expression>,
    pub body: Box<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    VariableDecl(VariableDecl),
    Expression(Expression),
}

/// `for (const x of items) { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct ForOfStatement {
    pub kind: VariableKind,
    pub pattern: Pattern,
    pub type_annotation: Option<TypeAnnotation>,
    pub right: Expression,
    pub body: Box<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakStatement {
    pub label: Option<Identifier>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContinueStatement {
    pub label: Option<Identifier>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub value: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThrowStatement {
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryStatement {
    pub body: BlockStatement,
    pub catch_clause: Option<CatchClause>,
    pub finally_clause: Option<BlockStatement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub param: Option<Pattern>,
    pub type_annotation: Option<TypeAnnotation>,
    pub body: BlockStatement,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledStatement {
    pub label: Identifier,
    pub body: Box<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
    pub span: Span,
}
