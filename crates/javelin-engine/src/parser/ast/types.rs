//! Type annotation AST nodes.

use super::*;
use crate::parser::token::Span;

/// Type annotation with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub ty: Type,
    pub span: Span,
}

impl TypeAnnotation {
    pub fn new(ty: Type, span: Span) -> Self {
        Self { ty, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// number, string, boolean, void, any, ...
    Primitive(PrimitiveType),

    /// Named type with optional arguments: `Foo`, `Array<T>`, `ns.Bar`
    Reference(TypeReference),

    /// `T[]`
    Array(ArrayType),

    /// `(x: number, y: string) => boolean`
    Function(FunctionType),

    /// `A | B`
    Union(Vec<TypeAnnotation>),

    /// `[A, B]`
    Tuple(Vec<TypeAnnotation>),

    /// `{ x: number; y?: string }`
    Object(ObjectType),

    /// `"on"`, `42`, `true`
    Literal(LiteralType),

    /// `(T)`
    Parenthesized(Box<TypeAnnotation>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Number,
    String,
    Boolean,
    BigInt,
    Void,
    Null,
    Undefined,
    Any,
    Unknown,
    Never,
    Object,
}

impl PrimitiveType {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "number" => PrimitiveType::Number,
            "string" => PrimitiveType::String,
            "boolean" => PrimitiveType::Boolean,
            "bigint" => PrimitiveType::BigInt,
            "void" => PrimitiveType::Void,
            "null" => PrimitiveType::Null,
            "undefined" => PrimitiveType::Undefined,
            "any" => PrimitiveType::Any,
            "unknown" => PrimitiveType::Unknown,
            "never" => PrimitiveType::Never,
            "object" => PrimitiveType::Object,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::Number => "number",
            PrimitiveType::String => "string",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::BigInt => "bigint",
            PrimitiveType::Void => "void",
            PrimitiveType::Null => "null",
            PrimitiveType::Undefined => "undefined",
            PrimitiveType::Any => "any",
            PrimitiveType::Unknown => "unknown",
            PrimitiveType::Never => "never",
            PrimitiveType::Object => "object",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeReference {
    /// Dotted segments: `ns.Foo` is `["ns", "Foo"]`
    pub name: Vec<Identifier>,
    pub type_args: Option<Vec<TypeAnnotation>>,
}

impl TypeReference {
    /// Last segment of the name.
    pub fn simple_name(&self) -> &str {
        self.name.last().map(|id| id.name.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub element_type: Box<TypeAnnotation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub params: Vec<FunctionTypeParam>,
    pub return_type: Box<TypeAnnotation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionTypeParam {
    pub name: Option<Identifier>,
    pub ty: TypeAnnotation,
    pub optional: bool,
    pub is_rest: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    pub members: Vec<ObjectTypeMember>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectTypeMember {
    pub name: Identifier,
    pub ty: TypeAnnotation,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralType {
    String(String),
    Number(String),
    Boolean(bool),
}

/// Generic type parameter: `T`, `T extends Foo`, `T = string`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameter {
    pub name: Identifier,
    pub constraint: Option<TypeAnnotation>,
    pub default: Option<TypeAnnotation>,
    pub span: Span,
}
