//! Java type model
//!
//! Types are plain data. Anything that can only be known once other units
//! are lowered is expressed as [`JavaType::Unresolved`] and evaluated during
//! finalization by [`BuildContext::resolve_type`](super::context::BuildContext::resolve_type).

use std::fmt;

use once_cell::unsync::OnceCell;

use super::decl::DeclId;

/// Java types that need no import and have a fixed spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Int,
    Double,
    Boolean,
    Void,
    String,
    Object,
    Char,
    Long,
}

impl Primitive {
    /// Source spelling.
    pub fn text(&self) -> &'static str {
        match self {
            Primitive::Int => "int",
            Primitive::Double => "double",
            Primitive::Boolean => "boolean",
            Primitive::Void => "void",
            Primitive::String => "String",
            Primitive::Object => "Object",
            Primitive::Char => "char",
            Primitive::Long => "long",
        }
    }

    /// Spelling inside generic type arguments.
    pub fn boxed(&self) -> &'static str {
        match self {
            Primitive::Int => "Integer",
            Primitive::Double => "Double",
            Primitive::Boolean => "Boolean",
            Primitive::Void => "Void",
            Primitive::String => "String",
            Primitive::Object => "Object",
            Primitive::Char => "Character",
            Primitive::Long => "Long",
        }
    }

    /// Name segment used when naming function interfaces.
    pub fn name_part(&self) -> &'static str {
        match self {
            Primitive::Int => "Int",
            Primitive::Double => "Double",
            Primitive::Boolean => "Boolean",
            Primitive::Void => "Void",
            Primitive::String => "String",
            Primitive::Object => "Object",
            Primitive::Char => "Char",
            Primitive::Long => "Long",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Primitive::Int | Primitive::Double | Primitive::Long | Primitive::Char)
    }
}

/// A named library type such as `java.util.List<String>`
#[derive(Debug, Clone, PartialEq)]
pub struct GenericType {
    pub name: String,
    /// Owning package; `None` for `java.lang` types that need no import
    pub package: Option<String>,
    pub args: Vec<JavaType>,
}

impl GenericType {
    /// Fully-qualified name, if the type lives outside `java.lang`.
    pub fn fqn(&self) -> Option<String> {
        self.package
            .as_ref()
            .map(|package| format!("{}.{}", package, self.name))
    }
}

/// A class, interface or enum declared by some unit
#[derive(Debug, Clone, PartialEq)]
pub struct ClassType {
    pub decl: DeclId,
    pub args: Vec<JavaType>,
}

/// Shape of a callable value. Values of this type are Java function
/// interfaces synthesized into `Functions.java`.
#[derive(Debug, Clone)]
pub struct FunctionType {
    pub params: Vec<JavaType>,
    pub ret: Box<JavaType>,
    name: OnceCell<String>,
}

impl PartialEq for FunctionType {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params && self.ret == other.ret
    }
}

impl FunctionType {
    pub fn new(params: Vec<JavaType>, ret: JavaType) -> Self {
        Self {
            params,
            ret: Box::new(ret),
            name: OnceCell::new(),
        }
    }

    /// Interface name: camel-cased parameter type names, then
    /// `Return<ReturnType>`. `(double) => double` is `DoubleReturnDouble`.
    ///
    /// The name is memoized, so call this only on resolved types whose
    /// class declarations carry their final names.
    pub fn interface_name(&self, names: &dyn ClassNames) -> &str {
        self.name.get_or_init(|| {
            let mut name = String::new();
            for param in &self.params {
                name.push_str(&param.name_part(names));
            }
            name.push_str("Return");
            name.push_str(&self.ret.name_part(names));
            name
        })
    }
}

/// Array or variadic parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub element: Box<JavaType>,
    /// Rendered as `T...` instead of `T[]`
    pub variadic: bool,
}

/// Bound of a type parameter
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Extends(Box<JavaType>),
    Super(Box<JavaType>),
}

/// Generic type parameter; an absent bound means `Object`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub name: String,
    pub bound: Option<Bound>,
}

/// Lazily evaluated type
#[derive(Debug, Clone, PartialEq)]
pub enum TypeQuery {
    /// Declared type of a declaration (following import proxies)
    Decl(DeclId),
    /// A class declaration applied to type arguments
    Applied { decl: DeclId, args: Vec<JavaType> },
    /// An export of another unit used as a type (`ns.Shape`)
    Export {
        unit: String,
        name: String,
        args: Vec<JavaType>,
    },
    /// Return type of a callable type
    Return(Box<JavaType>),
    /// Type of a named member of a class type
    Member(Box<JavaType>, String),
    /// Element type of an array type
    Element(Box<JavaType>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum JavaType {
    Primitive(Primitive),
    Generic(GenericType),
    Class(ClassType),
    Function(FunctionType),
    Array(ArrayType),
    TypeParam(TypeParam),
    /// A whole unit, bound by `import * as ns`; holds the unit FQN
    Namespace(String),
    Unresolved(TypeQuery),
}

/// Current names of class declarations, used when naming interfaces.
pub trait ClassNames {
    fn class_name(&self, decl: DeclId) -> String;
}

impl JavaType {
    pub fn int() -> Self {
        JavaType::Primitive(Primitive::Int)
    }

    pub fn double() -> Self {
        JavaType::Primitive(Primitive::Double)
    }

    pub fn boolean() -> Self {
        JavaType::Primitive(Primitive::Boolean)
    }

    pub fn string() -> Self {
        JavaType::Primitive(Primitive::String)
    }

    pub fn object() -> Self {
        JavaType::Primitive(Primitive::Object)
    }

    pub fn void() -> Self {
        JavaType::Primitive(Primitive::Void)
    }

    pub fn long() -> Self {
        JavaType::Primitive(Primitive::Long)
    }

    pub fn array_of(element: JavaType) -> Self {
        JavaType::Array(ArrayType {
            element: Box::new(element),
            variadic: false,
        })
    }

    pub fn function(params: Vec<JavaType>, ret: JavaType) -> Self {
        JavaType::Function(FunctionType::new(params, ret))
    }

    pub fn library(name: &str, package: Option<&str>, args: Vec<JavaType>) -> Self {
        JavaType::Generic(GenericType {
            name: name.to_string(),
            package: package.map(str::to_string),
            args,
        })
    }

    pub fn class(decl: DeclId) -> Self {
        JavaType::Class(ClassType {
            decl,
            args: Vec::new(),
        })
    }

    pub fn of_decl(decl: DeclId) -> Self {
        JavaType::Unresolved(TypeQuery::Decl(decl))
    }

    pub fn return_of(callee: JavaType) -> Self {
        match callee {
            JavaType::Function(f) => *f.ret,
            other => JavaType::Unresolved(TypeQuery::Return(Box::new(other))),
        }
    }

    pub fn element_of(array: JavaType) -> Self {
        match array {
            JavaType::Array(a) => *a.element,
            other => JavaType::Unresolved(TypeQuery::Element(Box::new(other))),
        }
    }

    pub fn member_of(object: JavaType, name: &str) -> Self {
        JavaType::Unresolved(TypeQuery::Member(Box::new(object), name.to_string()))
    }

    pub fn is_primitive(&self, primitive: Primitive) -> bool {
        matches!(self, JavaType::Primitive(p) if *p == primitive)
    }

    pub fn is_string(&self) -> bool {
        self.is_primitive(Primitive::String)
    }

    pub fn is_void(&self) -> bool {
        self.is_primitive(Primitive::Void)
    }

    pub fn is_object(&self) -> bool {
        self.is_primitive(Primitive::Object)
    }

    pub fn is_function(&self) -> bool {
        matches!(self, JavaType::Function(_))
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, JavaType::Unresolved(_))
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            JavaType::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Camel-cased segment used inside interface names.
    pub fn name_part(&self, names: &dyn ClassNames) -> String {
        match self {
            JavaType::Primitive(p) => p.name_part().to_string(),
            JavaType::Generic(g) => {
                let mut part = capitalize(&g.name);
                for arg in &g.args {
                    part.push_str(&arg.name_part(names));
                }
                part
            }
            JavaType::Class(c) => {
                let mut part = capitalize(&names.class_name(c.decl));
                for arg in &c.args {
                    part.push_str(&arg.name_part(names));
                }
                part
            }
            JavaType::Function(f) => f.interface_name(names).to_string(),
            JavaType::Array(a) => format!("{}Array", a.element.name_part(names)),
            JavaType::TypeParam(_) | JavaType::Namespace(_) | JavaType::Unresolved(_) => {
                Primitive::Object.name_part().to_string()
            }
        }
    }
}

impl fmt::Display for JavaType {
    /// Debug-oriented spelling; emitted code goes through the finalizer.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JavaType::Primitive(p) => write!(f, "{}", p.text()),
            JavaType::Generic(g) => {
                write!(f, "{}", g.name)?;
                write_args(f, &g.args)
            }
            JavaType::Class(c) => {
                write!(f, "class#{}", c.decl.0)?;
                write_args(f, &c.args)
            }
            JavaType::Function(func) => {
                write!(f, "(")?;
                for (i, param) in func.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ") -> {}", func.ret)
            }
            JavaType::Array(a) if a.variadic => write!(f, "{}...", a.element),
            JavaType::Array(a) => write!(f, "{}[]", a.element),
            JavaType::TypeParam(p) => write!(f, "{}", p.name),
            JavaType::Namespace(unit) => write!(f, "namespace {}", unit),
            JavaType::Unresolved(_) => write!(f, "?"),
        }
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[JavaType]) -> fmt::Result {
    if args.is_empty() {
        return Ok(());
    }
    write!(f, "<")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", arg)?;
    }
    write!(f, ">")
}

/// Map a TypeScript primitive type name to its Java type.
pub fn resolve_primitive(name: &str) -> Option<JavaType> {
    let primitive = match name {
        "number" => Primitive::Double,
        "string" => Primitive::String,
        "boolean" => Primitive::Boolean,
        "void" => Primitive::Void,
        // bigint stays fixed-width; see DESIGN.md
        "bigint" => Primitive::Int,
        "any" | "unknown" | "object" | "null" | "undefined" | "never" => Primitive::Object,
        _ => return None,
    };
    Some(JavaType::Primitive(primitive))
}

/// Upper-case the first character.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoClasses;

    impl ClassNames for NoClasses {
        fn class_name(&self, decl: DeclId) -> String {
            format!("C{}", decl.0)
        }
    }

    #[test]
    fn test_resolve_primitive() {
        assert_eq!(resolve_primitive("number"), Some(JavaType::double()));
        assert_eq!(resolve_primitive("string"), Some(JavaType::string()));
        assert_eq!(resolve_primitive("bigint"), Some(JavaType::int()));
        assert_eq!(resolve_primitive("undefined"), Some(JavaType::object()));
        assert_eq!(resolve_primitive("Shape"), None);
    }

    #[test]
    fn test_interface_names() {
        let square = FunctionType::new(vec![JavaType::double()], JavaType::double());
        assert_eq!(square.interface_name(&NoClasses), "DoubleReturnDouble");

        let thunk = FunctionType::new(vec![], JavaType::void());
        assert_eq!(thunk.interface_name(&NoClasses), "ReturnVoid");

        let list = JavaType::library("List", Some("java.util"), vec![JavaType::string()]);
        let consume = FunctionType::new(
            vec![JavaType::array_of(JavaType::int()), list],
            JavaType::boolean(),
        );
        assert_eq!(
            consume.interface_name(&NoClasses),
            "IntArrayListStringReturnBoolean"
        );
    }

    #[test]
    fn test_nested_function_and_class_names() {
        let inner = JavaType::function(vec![JavaType::string()], JavaType::void());
        let outer = FunctionType::new(vec![inner, JavaType::class(DeclId(3))], JavaType::int());
        assert_eq!(
            outer.interface_name(&NoClasses),
            "StringReturnVoidC3ReturnInt"
        );
    }

    #[test]
    fn test_equality_ignores_memo() {
        let a = FunctionType::new(vec![JavaType::int()], JavaType::int());
        let b = a.clone();
        a.interface_name(&NoClasses);
        assert_eq!(a, b);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("point"), "Point");
        assert_eq!(capitalize(""), "");
    }
}
