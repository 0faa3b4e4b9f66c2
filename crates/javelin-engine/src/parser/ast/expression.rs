//! Expression AST nodes.

use super::*;
use crate::parser::token::Span;

/// Expression (produces a value)
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Numeric literal: 42, 3.14, 10n
    Number(NumberLiteral),

    /// String literal: "hello", 'hello'
    String(StringLiteral),

    /// Template literal: `Hello ${name}`
    Template(TemplateLiteral),

    /// Boolean literal: true, false
    Boolean(BooleanLiteral),

    /// null
    Null(Span),

    /// Identifier reference
    Identifier(Identifier),

    /// Array literal: [1, 2, ...rest]
    Array(ArrayExpression),

    /// Object literal: { x: 1, y }
    Object(ObjectExpression),

    /// Unary operation: -x, !flag, ++i, i--
    Unary(UnaryExpression),

    /// Binary operation: a + b, a === b
    Binary(BinaryExpression),

    /// Logical operation: a && b, a || b, a ?? b
    Logical(LogicalExpression),

    /// Assignment: x = 1, x += 2
    Assignment(AssignmentExpression),

    /// Conditional: cond ? a : b
    Conditional(ConditionalExpression),

    /// Call: f(x), obj.method<T>(y)
    Call(CallExpression),

    /// Member access: obj.prop, obj?.prop
    Member(MemberExpression),

    /// Index access: arr[0]
    Index(IndexExpression),

    /// Construction: new Foo(x)
    New(NewExpression),

    /// Arrow function: (x) => x + 1
    Arrow(ArrowFunction),

    /// Function expression: function (x) { ... }
    Function(FunctionExpression),

    /// this
    This(Span),

    /// super
    Super(Span),

    /// (expr)
    Parenthesized(ParenthesizedExpression),

    /// typeof x
    Typeof(TypeofExpression),

    /// x instanceof Foo
    Instanceof(InstanceofExpression),

    /// x as T
    As(AsExpression),

    /// x!
    NonNull(NonNullExpression),

    /// ...x (call arguments and array elements)
    Spread(SpreadElement),
}

impl Expression {
    pub fn span(&self) -> &Span {
        match self {
            Expression::Number(e) => &e.span,
            Expression::String(e) => &e.span,
            Expression::Template(e) => &e.span,
            Expression::Boolean(e) => &e.span,
            Expression::Null(span) => span,
            Expression::Identifier(e) => &e.span,
            Expression::Array(e) => &e.span,
            Expression::Object(e) => &e.span,
            Expression::Unary(e) => &e.span,
            Expression::Binary(e) => &e.span,
            Expression::Logical(e) => &e.span,
            Expression::Assignment(e) => &e.span,
            Expression::Conditional(e) => &e.span,
            Expression::Call(e) => &e.span,
            Expression::Member(e) => &e.span,
            Expression::Index(e) => &e.span,
            Expression::New(e) => &e.span,
            Expression::Arrow(e) => &e.span,
            Expression::Function(e) => &e.span,
            Expression::This(span) => span,
            Expression::Super(span) => span,
            Expression::Parenthesized(e) => &e.span,
            Expression::Typeof(e) => &e.span,
            Expression::Instanceof(e) => &e.span,
            Expression::As(e) => &e.span,
            Expression::NonNull(e) => &e.span,
            Expression::Spread(e) => &e.span,
        }
    }

    /// Literals and names that never need parentheses when concatenated.
    pub fn is_primary(&self) -> bool {
        matches!(
            self,
            Expression::Number(_)
                | Expression::String(_)
                | Expression::Boolean(_)
                | Expression::Null(_)
                | Expression::Identifier(_)
                | Expression::This(_)
                | Expression::Call(_)
                | Expression::Member(_)
                | Expression::Index(_)
                | Expression::Parenthesized(_)
        )
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparenthesized(&self) -> &Expression {
        match self {
            Expression::Parenthesized(p) => p.expression.unparenthesized(),
            other => other,
        }
    }
}

// ============================================================================
// Literals
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Int,
    Float,
    BigInt,
}

/// Numeric literal, kept as source text.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteral {
    pub raw: String,
    pub kind: NumberKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLiteral {
    pub parts: Vec<TemplateElement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateElement {
    Text(String),
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub value: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayExpression {
    pub elements: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectExpression {
    pub properties: Vec<ObjectProperty>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectProperty {
    /// `key: value`, `key` (shorthand) or `key() {}`
    Property {
        key: PropertyKey,
        value: Expression,
        shorthand: bool,
        span: Span,
    },
    /// `...other`
    Spread(SpreadElement),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    Identifier(Identifier),
    String(StringLiteral),
    Number(NumberLiteral),
    Computed(Box<Expression>),
}

// ============================================================================
// Operators
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    pub operator: UnaryOperator,
    pub operand: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Minus,
    Not,
    BitwiseNot,
    Void,
    PrefixIncrement,
    PrefixDecrement,
    PostfixIncrement,
    PostfixDecrement,
}

impl UnaryOperator {
    pub fn text(&self) -> &'static str {
        match self {
            UnaryOperator::Plus => "+",
            UnaryOperator::Minus => "-",
            UnaryOperator::Not => "!",
            UnaryOperator::BitwiseNot => "~",
            UnaryOperator::Void => "void",
            UnaryOperator::PrefixIncrement | UnaryOperator::PostfixIncrement => "++",
            UnaryOperator::PrefixDecrement | UnaryOperator::PostfixDecrement => "--",
        }
    }

    pub fn is_postfix(&self) -> bool {
        matches!(
            self,
            UnaryOperator::PostfixIncrement | UnaryOperator::PostfixDecrement
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    pub operator: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Exponent,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    In,
}

impl BinaryOperator {
    pub fn text(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Exponent => "**",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::StrictEqual => "===",
            BinaryOperator::StrictNotEqual => "!==",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::BitwiseAnd => "&",
            BinaryOperator::BitwiseOr => "|",
            BinaryOperator::BitwiseXor => "^",
            BinaryOperator::LeftShift => "<<",
            BinaryOperator::RightShift => ">>",
            BinaryOperator::UnsignedRightShift => ">>>",
            BinaryOperator::In => "in",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Equal
                | BinaryOperator::NotEqual
                | BinaryOperator::StrictEqual
                | BinaryOperator::StrictNotEqual
                | BinaryOperator::LessThan
                | BinaryOperator::LessEqual
                | BinaryOperator::GreaterThan
                | BinaryOperator::GreaterEqual
                | BinaryOperator::In
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogicalExpression {
    pub operator: LogicalOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
    NullishCoalescing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentExpression {
    pub operator: AssignmentOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
    ModuloAssign,
    BitwiseAndAssign,
    BitwiseOrAssign,
    BitwiseXorAssign,
    LeftShiftAssign,
    RightShiftAssign,
    UnsignedRightShiftAssign,
}

impl AssignmentOperator {
    pub fn text(&self) -> &'static str {
        match self {
            AssignmentOperator::Assign => "=",
            AssignmentOperator::AddAssign => "+=",
            AssignmentOperator::SubtractAssign => "-=",
            AssignmentOperator::MultiplyAssign => "*=",
            AssignmentOperator::DivideAssign => "/=",
            AssignmentOperator::ModuloAssign => "%=",
            AssignmentOperator::BitwiseAndAssign => "&=",
            AssignmentOperator::BitwiseOrAssign => "|=",
            AssignmentOperator::BitwiseXorAssign => "^=",
            AssignmentOperator::LeftShiftAssign => "<<=",
            AssignmentOperator::RightShiftAssign => ">>=",
            AssignmentOperator::UnsignedRightShiftAssign => ">>>=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpression {
    pub test: Box<Expression>,
    pub consequent: Box<Expression>,
    pub alternate: Box<Expression>,
    pub span: Span,
}

// ============================================================================
// Calls and member access
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub callee: Box<Expression>,
    pub type_args: Option<Vec<TypeAnnotation>>,
    pub arguments: Vec<Expression>,
    /// `f?.()`
    pub optional: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpression {
    pub object: Box<Expression>,
    pub property: Identifier,
    /// `obj?.prop`
    pub optional: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpression {
    pub object: Box<Expression>,
    pub index: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpression {
    pub callee: Box<Expression>,
    pub type_args: Option<Vec<TypeAnnotation>>,
    pub arguments: Vec<Expression>,
    pub span: Span,
}

// ============================================================================
// Functions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ArrowFunction {
    pub type_params: Option<Vec<TypeParameter>>,
    pub params: Vec<Parameter>,
    pub return_type: Option<TypeAnnotation>,
    pub body: ArrowBody,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrowBody {
    Expression(Box<Expression>),
    Block(BlockStatement),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionExpression {
    pub name: Option<Identifier>,
    pub type_params: Option<Vec<TypeParameter>>,
    pub params: Vec<Parameter>,
    pub return_type: Option<TypeAnnotation>,
    pub body: BlockStatement,
    pub span: Span,
}

// ============================================================================
// Miscellaneous
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ParenthesizedExpression {
    pub expression: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeofExpression {
    pub argument: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceofExpression {
    pub object: Box<Expression>,
    pub type_name: TypeAnnotation,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AsExpression {
    pub expression: Box<Expression>,
    pub target: TypeAnnotation,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NonNullExpression {
    pub expression: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpreadElement {
    pub argument: Box<Expression>,
    pub span: Span,
}
