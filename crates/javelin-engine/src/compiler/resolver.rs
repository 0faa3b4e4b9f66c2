//! Identifier and type-annotation resolution
//!
//! Names resolve in a fixed order: the enclosing class's own source name,
//! the scope chain, the unit's import aliases, the unit's exports, then the
//! built-in globals. Cross-unit names resolve to import proxies, which are
//! only followed at finalization.

use std::path::Path;

use crate::parser::ast::{self, LiteralType, Type, TypeAnnotation};

use super::decl::{DeclArena, DeclId, DeclKind, ImportedName};
use super::diagnostic::Diagnostic;
use super::scope::ScopeTree;
use super::types::{resolve_primitive, ArrayType, JavaType, Primitive, TypeParam, TypeQuery};
use super::unit::CompilationUnit;

/// Globals every unit can use without importing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Console,
    Math,
    Undefined,
    NaN,
    Infinity,
    Error,
    ParseInt,
    ParseFloat,
    String,
    IsNaN,
    Map,
    Set,
    Date,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        Some(match name {
            "console" => Builtin::Console,
            "Math" => Builtin::Math,
            "undefined" => Builtin::Undefined,
            "NaN" => Builtin::NaN,
            "Infinity" => Builtin::Infinity,
            "Error" => Builtin::Error,
            "parseInt" => Builtin::ParseInt,
            "parseFloat" => Builtin::ParseFloat,
            "String" => Builtin::String,
            "isNaN" => Builtin::IsNaN,
            "Map" => Builtin::Map,
            "Set" => Builtin::Set,
            "Date" => Builtin::Date,
            _ => return None,
        })
    }

    /// Java spelling when the global is used as a plain value or callee.
    pub fn java_text(&self) -> &'static str {
        match self {
            Builtin::Console => "System.out",
            Builtin::Math => "Math",
            Builtin::Undefined => "null",
            Builtin::NaN => "Double.NaN",
            Builtin::Infinity => "Double.POSITIVE_INFINITY",
            Builtin::Error => "RuntimeException",
            Builtin::ParseInt => "Integer.parseInt",
            Builtin::ParseFloat => "Double.parseDouble",
            Builtin::String => "String.valueOf",
            Builtin::IsNaN => "Double.isNaN",
            Builtin::Map => "HashMap",
            Builtin::Set => "HashSet",
            Builtin::Date => "Date",
        }
    }

    /// Type of the global used as a value.
    pub fn value_type(&self) -> JavaType {
        match self {
            Builtin::NaN | Builtin::Infinity => JavaType::double(),
            Builtin::ParseInt => JavaType::function(vec![JavaType::string()], JavaType::int()),
            Builtin::ParseFloat => {
                JavaType::function(vec![JavaType::string()], JavaType::double())
            }
            Builtin::String => JavaType::function(vec![JavaType::object()], JavaType::string()),
            Builtin::IsNaN => JavaType::function(vec![JavaType::double()], JavaType::boolean()),
            _ => JavaType::object(),
        }
    }

    /// Type of `new Global(...)`.
    pub fn instance_type(&self, args: Vec<JavaType>) -> Option<JavaType> {
        match self {
            Builtin::Error => Some(JavaType::library("RuntimeException", None, Vec::new())),
            Builtin::Map => Some(JavaType::library("Map", Some("java.util"), args)),
            Builtin::Set => Some(JavaType::library("Set", Some("java.util"), args)),
            Builtin::Date => Some(JavaType::library("Date", Some("java.util"), Vec::new())),
            _ => None,
        }
    }

    /// Class instantiated by `new Global(...)`.
    pub fn constructed_class(&self) -> Option<JavaType> {
        match self {
            Builtin::Error => Some(JavaType::library("RuntimeException", None, Vec::new())),
            Builtin::Map => Some(JavaType::library("HashMap", Some("java.util"), Vec::new())),
            Builtin::Set => Some(JavaType::library("HashSet", Some("java.util"), Vec::new())),
            Builtin::Date => Some(JavaType::library("Date", Some("java.util"), Vec::new())),
            _ => None,
        }
    }

    /// Generic library classes are constructed with the diamond operator.
    pub fn is_generic(&self) -> bool {
        matches!(self, Builtin::Map | Builtin::Set)
    }
}

/// What a name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    Decl(DeclId),
    Builtin(Builtin),
}

/// Resolver over one unit's lowering state
pub struct NameResolver<'a> {
    pub scopes: &'a ScopeTree,
    pub unit: &'a CompilationUnit,
    pub decls: &'a DeclArena,
    /// Source name and declaration of the innermost enclosing class
    pub class_self: Option<(&'a str, DeclId)>,
}

impl<'a> NameResolver<'a> {
    pub fn resolve(&self, name: &str) -> Option<Resolved> {
        self.resolve_decl(name)
            .map(Resolved::Decl)
            .or_else(|| Builtin::lookup(name).map(Resolved::Builtin))
    }

    /// Like [`NameResolver::resolve`], without the built-in globals.
    pub fn resolve_decl(&self, name: &str) -> Option<DeclId> {
        if let Some((source_name, class)) = self.class_self {
            if source_name == name {
                return Some(class);
            }
        }
        self.scopes
            .lookup(name)
            .or_else(|| self.unit.aliases.get(name).copied())
            .or_else(|| self.unit.exports.get(name).copied())
    }

    fn file(&self) -> &Path {
        &self.unit.path
    }

    /// Convert a type annotation. Unknown names are reported and become
    /// `Object`.
    pub fn resolve_annotation(
        &self,
        annotation: &TypeAnnotation,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> JavaType {
        match &annotation.ty {
            Type::Primitive(p) => resolve_primitive(p.name()).unwrap_or_else(JavaType::object),
            Type::Reference(reference) => {
                self.resolve_reference(reference, annotation, diagnostics)
            }
            Type::Array(array) => {
                JavaType::array_of(self.resolve_annotation(&array.element_type, diagnostics))
            }
            Type::Function(function) => {
                let params = function
                    .params
                    .iter()
                    .map(|param| {
                        let ty = self.resolve_annotation(&param.ty, diagnostics);
                        if param.is_rest {
                            variadic(ty)
                        } else {
                            ty
                        }
                    })
                    .collect();
                let ret = self.resolve_annotation(&function.return_type, diagnostics);
                JavaType::function(params, ret)
            }
            Type::Union(members) => self.resolve_union(members, diagnostics),
            Type::Tuple(elements) => {
                let types: Vec<JavaType> = elements
                    .iter()
                    .map(|e| self.resolve_annotation(e, diagnostics))
                    .collect();
                JavaType::array_of(join_types(&types))
            }
            Type::Object(_) => {
                tracing::trace!(target: "javelin::lower", "object type literal erased to Object");
                JavaType::object()
            }
            Type::Literal(LiteralType::String(_)) => JavaType::string(),
            Type::Literal(LiteralType::Number(raw)) => {
                if raw.contains('.') {
                    JavaType::double()
                } else {
                    JavaType::int()
                }
            }
            Type::Literal(LiteralType::Boolean(_)) => JavaType::boolean(),
            Type::Parenthesized(inner) => self.resolve_annotation(inner, diagnostics),
        }
    }

    fn resolve_reference(
        &self,
        reference: &ast::TypeReference,
        annotation: &TypeAnnotation,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> JavaType {
        let args: Vec<JavaType> = reference
            .type_args
            .iter()
            .flatten()
            .map(|arg| self.resolve_annotation(arg, diagnostics))
            .collect();

        if let [namespace, member] = reference.name.as_slice() {
            if let Some(id) = self.resolve_decl(&namespace.name) {
                if let Some(target) = self.decls.get(id).import_target() {
                    if target.name == ImportedName::Namespace {
                        return JavaType::Unresolved(TypeQuery::Export {
                            unit: target.unit.clone(),
                            name: member.name.clone(),
                            args,
                        });
                    }
                }
            }
        }

        let name = reference.simple_name();
        if reference.name.len() == 1 {
            if let Some(id) = self.resolve_decl(name) {
                let decl = self.decls.get(id);
                match &decl.kind {
                    DeclKind::TypeParameter => {
                        return JavaType::TypeParam(TypeParam {
                            name: decl.name.clone(),
                            bound: None,
                        })
                    }
                    DeclKind::Class(_) => {
                        return JavaType::Class(super::types::ClassType { decl: id, args })
                    }
                    DeclKind::TypeAlias => return decl.ty.clone(),
                    DeclKind::Import(_) => {
                        return JavaType::Unresolved(TypeQuery::Applied { decl: id, args })
                    }
                    _ => {}
                }
            }
            if let Some(ty) = library_type(name, &args) {
                return ty;
            }
        }

        let written: Vec<&str> = reference.name.iter().map(|id| id.name.as_str()).collect();
        diagnostics.push(Diagnostic::unknown_type(
            &written.join("."),
            self.file(),
            annotation.span,
        ));
        JavaType::object()
    }

    /// `T | null | undefined` is `T`; any other union is `Object` unless
    /// every member maps to the same type.
    fn resolve_union(
        &self,
        members: &[TypeAnnotation],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> JavaType {
        let types: Vec<JavaType> = members
            .iter()
            .filter(|m| !is_nullish(&m.ty))
            .map(|m| self.resolve_annotation(m, diagnostics))
            .collect();
        match types.split_first() {
            Some((first, rest)) if rest.iter().all(|t| t == first) => first.clone(),
            _ => JavaType::object(),
        }
    }
}

fn is_nullish(ty: &Type) -> bool {
    matches!(
        ty,
        Type::Primitive(ast::PrimitiveType::Null) | Type::Primitive(ast::PrimitiveType::Undefined)
    )
}

fn variadic(ty: JavaType) -> JavaType {
    match ty {
        JavaType::Array(array) => JavaType::Array(ArrayType {
            element: array.element,
            variadic: true,
        }),
        other => JavaType::Array(ArrayType {
            element: Box::new(other),
            variadic: true,
        }),
    }
}

/// Rest parameter type: `...xs: T[]` is `T...`.
pub fn rest_parameter(ty: JavaType) -> JavaType {
    variadic(ty)
}

/// Library type names with a fixed Java counterpart.
fn library_type(name: &str, args: &[JavaType]) -> Option<JavaType> {
    let first = || args.first().cloned().unwrap_or_else(JavaType::object);
    Some(match name {
        "Array" | "ReadonlyArray" => JavaType::array_of(first()),
        "Map" | "Record" | "ReadonlyMap" => {
            JavaType::library("Map", Some("java.util"), args.to_vec())
        }
        "Set" | "ReadonlySet" => JavaType::library("Set", Some("java.util"), args.to_vec()),
        "Error" => JavaType::library("RuntimeException", None, Vec::new()),
        "Date" => JavaType::library("Date", Some("java.util"), Vec::new()),
        "Promise" => first(),
        "String" => JavaType::string(),
        "Number" => JavaType::double(),
        "Boolean" => JavaType::boolean(),
        "Object" => JavaType::object(),
        _ => return None,
    })
}

/// Common type of several values: numeric types widen to `double`,
/// otherwise all must agree or the result is `Object`.
pub fn join_types(types: &[JavaType]) -> JavaType {
    let (first, rest) = match types.split_first() {
        Some(split) => split,
        None => return JavaType::object(),
    };
    if rest.iter().all(|t| t == first) {
        return first.clone();
    }
    let numeric = |t: &JavaType| matches!(t, JavaType::Primitive(p) if p.is_numeric());
    if types.iter().all(numeric) {
        if types.iter().any(|t| t.is_primitive(Primitive::Double)) {
            return JavaType::double();
        }
        if types.iter().any(|t| t.is_primitive(Primitive::Long)) {
            return JavaType::long();
        }
        return JavaType::int();
    }
    JavaType::object()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::decl::{ClassFlavor, ClassInfo, Declaration, ImportTarget};
    use crate::compiler::unit::UnitIdentity;
    use crate::parser::ast::{Identifier, PrimitiveType, TypeReference};
    use crate::parser::token::Span;
    use std::path::Path;

    fn unit() -> CompilationUnit {
        CompilationUnit::new(
            Path::new("src/shapes.ts"),
            UnitIdentity {
                package: "app".to_string(),
                class_name: "Shapes".to_string(),
            },
        )
    }

    fn reference(names: &[&str], args: Vec<TypeAnnotation>) -> TypeAnnotation {
        TypeAnnotation::new(
            Type::Reference(TypeReference {
                name: names
                    .iter()
                    .map(|n| Identifier::new(*n, Span::default()))
                    .collect(),
                type_args: if args.is_empty() { None } else { Some(args) },
            }),
            Span::default(),
        )
    }

    fn primitive(p: PrimitiveType) -> TypeAnnotation {
        TypeAnnotation::new(Type::Primitive(p), Span::default())
    }

    #[test]
    fn test_resolution_order() {
        let mut decls = DeclArena::new();
        let mut scopes = ScopeTree::new();
        let mut unit = unit();

        let local = decls.alloc(Declaration::new(
            "app.Shapes",
            "x",
            DeclKind::Variable,
            JavaType::int(),
            Span::default(),
        ));
        let imported = decls.alloc(Declaration::new(
            "app.Shapes",
            "y",
            DeclKind::Import(ImportTarget {
                unit: "app.Other".to_string(),
                name: ImportedName::Named("y".to_string()),
            }),
            JavaType::object(),
            Span::default(),
        ));
        unit.aliases.insert("x".to_string(), imported);
        unit.aliases.insert("y".to_string(), imported);
        scopes.declare("x", local);

        let resolver = NameResolver {
            scopes: &scopes,
            unit: &unit,
            decls: &decls,
            class_self: None,
        };
        assert_eq!(resolver.resolve("x"), Some(Resolved::Decl(local)));
        assert_eq!(resolver.resolve("y"), Some(Resolved::Decl(imported)));
        assert_eq!(
            resolver.resolve("console"),
            Some(Resolved::Builtin(Builtin::Console))
        );
        assert_eq!(resolver.resolve("missing"), None);
    }

    #[test]
    fn test_class_self_reference_wins() {
        let mut decls = DeclArena::new();
        let mut scopes = ScopeTree::new();
        let unit = unit();
        let class = decls.alloc(Declaration::new(
            "app.Shapes",
            "Shapes",
            DeclKind::Class(ClassInfo::new(ClassFlavor::Class)),
            JavaType::object(),
            Span::default(),
        ));
        let other = decls.alloc(Declaration::new(
            "app.Shapes",
            "Circle",
            DeclKind::Variable,
            JavaType::int(),
            Span::default(),
        ));
        scopes.declare("Circle", other);

        let resolver = NameResolver {
            scopes: &scopes,
            unit: &unit,
            decls: &decls,
            class_self: Some(("Circle", class)),
        };
        assert_eq!(resolver.resolve("Circle"), Some(Resolved::Decl(class)));
    }

    #[test]
    fn test_annotations() {
        let decls = DeclArena::new();
        let scopes = ScopeTree::new();
        let unit = unit();
        let resolver = NameResolver {
            scopes: &scopes,
            unit: &unit,
            decls: &decls,
            class_self: None,
        };
        let mut diagnostics = Vec::new();

        let map = reference(
            &["Map"],
            vec![
                primitive(PrimitiveType::String),
                primitive(PrimitiveType::Number),
            ],
        );
        assert_eq!(
            resolver.resolve_annotation(&map, &mut diagnostics),
            JavaType::library(
                "Map",
                Some("java.util"),
                vec![JavaType::string(), JavaType::double()]
            )
        );

        let nullable = TypeAnnotation::new(
            Type::Union(vec![
                primitive(PrimitiveType::String),
                primitive(PrimitiveType::Null),
            ]),
            Span::default(),
        );
        assert_eq!(
            resolver.resolve_annotation(&nullable, &mut diagnostics),
            JavaType::string()
        );

        let array = reference(&["Array"], vec![primitive(PrimitiveType::Boolean)]);
        assert_eq!(
            resolver.resolve_annotation(&array, &mut diagnostics),
            JavaType::array_of(JavaType::boolean())
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unknown_type_warns() {
        let decls = DeclArena::new();
        let scopes = ScopeTree::new();
        let unit = unit();
        let resolver = NameResolver {
            scopes: &scopes,
            unit: &unit,
            decls: &decls,
            class_self: None,
        };
        let mut diagnostics = Vec::new();
        let ty = resolver.resolve_annotation(&reference(&["Widget"], vec![]), &mut diagnostics);
        assert!(ty.is_object());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, "W2001");
        assert!(!diagnostics[0].is_error());
    }

    #[test]
    fn test_join_types() {
        assert_eq!(
            join_types(&[JavaType::int(), JavaType::double()]),
            JavaType::double()
        );
        assert_eq!(join_types(&[JavaType::int(), JavaType::int()]), JavaType::int());
        assert!(join_types(&[JavaType::int(), JavaType::string()]).is_object());
        assert!(join_types(&[]).is_object());
    }
}
