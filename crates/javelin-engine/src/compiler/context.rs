//! Build-wide state
//!
//! [`BuildContext`] owns everything shared between units: the declaration
//! arena, the unit registry and the function interface registry. It is
//! threaded explicitly through lowering and finalization.

use rustc_hash::FxHashSet;

use super::config::TargetConfig;
use super::decl::{DeclArena, DeclId, DeclKind, ImportedName};
use super::interfaces::InterfaceRegistry;
use super::types::{ClassNames, ClassType, FunctionType, GenericType, JavaType, TypeQuery};
use super::unit::UnitRegistry;

/// Queries nest through types; anything deeper than this is a cycle.
const MAX_RESOLVE_DEPTH: usize = 32;

/// What an import proxy (or any declaration) ultimately refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Decl(DeclId),
    /// A whole unit, by FQN
    Namespace(String),
}

/// An import whose target unit or export does not exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dangling {
    pub unit: String,
    pub name: String,
}

#[derive(Debug, Default)]
pub struct BuildContext {
    pub config: TargetConfig,
    pub decls: DeclArena,
    pub units: UnitRegistry,
    pub interfaces: InterfaceRegistry,
}

impl BuildContext {
    pub fn new(config: TargetConfig) -> Self {
        Self {
            config,
            decls: DeclArena::new(),
            units: UnitRegistry::new(),
            interfaces: InterfaceRegistry::new(),
        }
    }

    /// Follow import proxies (through re-exports) to the declaration they
    /// stand for. Non-proxy declarations are returned as they are.
    pub fn follow(&self, id: DeclId) -> Result<Target, Dangling> {
        let mut current = id;
        let mut seen = FxHashSet::default();
        loop {
            let decl = self.decls.get(current);
            let target = match &decl.kind {
                DeclKind::Import(target) => target,
                _ => return Ok(Target::Decl(current)),
            };
            let dangling = || Dangling {
                unit: target.unit.clone(),
                name: target.name.describe().to_string(),
            };
            if !seen.insert(current) {
                return Err(dangling());
            }
            if target.name == ImportedName::Namespace {
                return match self.units.get(&target.unit) {
                    Some(_) => Ok(Target::Namespace(target.unit.clone())),
                    None => Err(dangling()),
                };
            }
            current = self
                .export_of(&target.unit, &target.name)
                .ok_or_else(dangling)?;
        }
    }

    /// Look up an export of a unit, searching `export *` re-exports.
    pub fn export_of(&self, unit: &str, name: &ImportedName) -> Option<DeclId> {
        let mut visited = FxHashSet::default();
        self.export_of_inner(unit, name, &mut visited)
    }

    fn export_of_inner<'a>(
        &'a self,
        unit: &'a str,
        name: &ImportedName,
        visited: &mut FxHashSet<&'a str>,
    ) -> Option<DeclId> {
        if !visited.insert(unit) {
            return None;
        }
        let unit = self.units.get(unit)?;
        match name {
            ImportedName::Default => unit.default_export,
            ImportedName::Namespace => None,
            ImportedName::Named(n) => unit.exports.get(n).copied().or_else(|| {
                unit.reexports
                    .iter()
                    .find_map(|r| self.export_of_inner(r, name, visited))
            }),
        }
    }

    /// Find a member of a class, walking its `extends` chain.
    pub fn member_decl(&self, class: DeclId, name: &str) -> Option<DeclId> {
        let mut current = class;
        for _ in 0..MAX_RESOLVE_DEPTH {
            let info = self.decls.get(current).class_info()?;
            if let Some(member) = info.members.get(name) {
                return Some(*member);
            }
            let parent = info.extends.as_ref().map(|ty| self.resolve_type(ty));
            match parent {
                Some(JavaType::Class(ClassType { decl, .. })) => current = decl,
                _ => return None,
            }
        }
        None
    }

    /// Evaluate every lazy query inside `ty`. Whatever cannot be resolved
    /// becomes `Object`.
    pub fn resolve_type(&self, ty: &JavaType) -> JavaType {
        self.resolve_at(ty, 0)
    }

    fn resolve_at(&self, ty: &JavaType, depth: usize) -> JavaType {
        if depth > MAX_RESOLVE_DEPTH {
            return JavaType::object();
        }
        let next = depth + 1;
        match ty {
            JavaType::Unresolved(query) => self.resolve_query(query, next),
            JavaType::Function(f) => JavaType::Function(FunctionType::new(
                f.params.iter().map(|p| self.resolve_at(p, next)).collect(),
                self.resolve_at(&f.ret, next),
            )),
            JavaType::Array(a) => JavaType::Array(super::types::ArrayType {
                element: Box::new(self.resolve_at(&a.element, next)),
                variadic: a.variadic,
            }),
            JavaType::Generic(g) => JavaType::Generic(GenericType {
                name: g.name.clone(),
                package: g.package.clone(),
                args: g.args.iter().map(|a| self.resolve_at(a, next)).collect(),
            }),
            JavaType::Class(c) => JavaType::Class(ClassType {
                decl: c.decl,
                args: c.args.iter().map(|a| self.resolve_at(a, next)).collect(),
            }),
            other => other.clone(),
        }
    }

    fn resolve_query(&self, query: &TypeQuery, depth: usize) -> JavaType {
        match query {
            TypeQuery::Decl(id) => match self.follow(*id) {
                Ok(Target::Decl(decl)) => self.resolve_at(&self.decls.get(decl).ty, depth),
                Ok(Target::Namespace(unit)) => JavaType::Namespace(unit),
                Err(_) => JavaType::object(),
            },
            TypeQuery::Applied { decl, args } => self.apply(*decl, args, depth),
            TypeQuery::Export { unit, name, args } => {
                match self.export_of(unit, &ImportedName::Named(name.clone())) {
                    Some(decl) => self.apply(decl, args, depth),
                    None => JavaType::object(),
                }
            }
            TypeQuery::Return(callee) => match self.resolve_at(callee, depth) {
                JavaType::Function(f) => *f.ret,
                _ => JavaType::object(),
            },
            TypeQuery::Member(object, name) => {
                let object = self.resolve_at(object, depth);
                self.member_type(&object, name, depth)
            }
            TypeQuery::Element(array) => match self.resolve_at(array, depth) {
                JavaType::Array(a) => *a.element,
                _ => JavaType::object(),
            },
        }
    }

    fn apply(&self, decl: DeclId, args: &[JavaType], depth: usize) -> JavaType {
        let target = match self.follow(decl) {
            Ok(Target::Decl(target)) => target,
            Ok(Target::Namespace(unit)) => return JavaType::Namespace(unit),
            Err(_) => return JavaType::object(),
        };
        let declaration = self.decls.get(target);
        match declaration.kind {
            DeclKind::Class(_) => JavaType::Class(ClassType {
                decl: target,
                args: args.iter().map(|a| self.resolve_at(a, depth)).collect(),
            }),
            _ => self.resolve_at(&declaration.ty, depth),
        }
    }

    fn member_type(&self, object: &JavaType, name: &str, depth: usize) -> JavaType {
        match object {
            JavaType::Class(c) => match self.member_decl(c.decl, name) {
                Some(member) => self.resolve_at(&self.decls.get(member).ty, depth),
                None => JavaType::object(),
            },
            JavaType::Namespace(unit) => {
                match self.export_of(unit, &ImportedName::Named(name.to_string())) {
                    Some(export) => self.resolve_at(&JavaType::of_decl(export), depth),
                    None => JavaType::object(),
                }
            }
            JavaType::Array(_) | JavaType::Primitive(super::types::Primitive::String)
                if name == "length" =>
            {
                JavaType::int()
            }
            _ => JavaType::object(),
        }
    }
}

impl ClassNames for BuildContext {
    fn class_name(&self, decl: DeclId) -> String {
        self.decls.get(decl).name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::decl::{ClassFlavor, ClassInfo, Declaration, ImportTarget, Placement};
    use crate::compiler::unit::{CompilationUnit, UnitIdentity};
    use crate::parser::Span;
    use std::path::Path;

    fn unit(class_name: &str) -> CompilationUnit {
        CompilationUnit::new(
            Path::new("x.ts"),
            UnitIdentity {
                package: "app".to_string(),
                class_name: class_name.to_string(),
            },
        )
    }

    fn function(ctx: &mut BuildContext, name: &str, ty: JavaType) -> DeclId {
        ctx.decls.alloc(
            Declaration::new("app.A", name, DeclKind::Function, ty, Span::default())
                .with_placement(Placement::Module),
        )
    }

    fn proxy(ctx: &mut BuildContext, unit: &str, name: ImportedName) -> DeclId {
        ctx.decls.alloc(Declaration::new(
            "app.B",
            "p",
            DeclKind::Import(ImportTarget {
                unit: unit.to_string(),
                name,
            }),
            JavaType::object(),
            Span::default(),
        ))
    }

    #[test]
    fn test_follow_through_reexport() {
        let mut ctx = BuildContext::default();
        let f = function(&mut ctx, "f", JavaType::function(vec![], JavaType::int()));
        let mut a = unit("A");
        a.exports.insert("f".to_string(), f);
        ctx.units.insert(a);
        let mut index = unit("Index");
        index.reexports.push("app.A".to_string());
        ctx.units.insert(index);

        let p = proxy(&mut ctx, "app.Index", ImportedName::Named("f".to_string()));
        assert_eq!(ctx.follow(p), Ok(Target::Decl(f)));
        assert_eq!(
            ctx.resolve_type(&JavaType::return_of(JavaType::of_decl(p))),
            JavaType::int()
        );
    }

    #[test]
    fn test_dangling_proxy() {
        let mut ctx = BuildContext::default();
        let p = proxy(&mut ctx, "app.Missing", ImportedName::Default);
        assert_eq!(
            ctx.follow(p),
            Err(Dangling {
                unit: "app.Missing".to_string(),
                name: "default".to_string()
            })
        );
        assert_eq!(ctx.resolve_type(&JavaType::of_decl(p)), JavaType::object());
    }

    #[test]
    fn test_reexport_cycle_terminates() {
        let mut ctx = BuildContext::default();
        let mut a = unit("A");
        a.reexports.push("app.B".to_string());
        ctx.units.insert(a);
        let mut b = unit("B");
        b.reexports.push("app.A".to_string());
        ctx.units.insert(b);
        assert_eq!(ctx.export_of("app.A", &ImportedName::Named("x".to_string())), None);
    }

    #[test]
    fn test_member_through_extends() {
        let mut ctx = BuildContext::default();
        let base = ctx.decls.alloc(Declaration::new(
            "app.A",
            "Base",
            DeclKind::Class(ClassInfo::new(ClassFlavor::Class)),
            JavaType::object(),
            Span::default(),
        ));
        let field = ctx.decls.alloc(Declaration::new(
            "app.A",
            "label",
            DeclKind::Variable,
            JavaType::string(),
            Span::default(),
        ));
        ctx.decls.add_member(base, "label", field);
        let mut info = ClassInfo::new(ClassFlavor::Class);
        info.extends = Some(JavaType::class(base));
        let derived = ctx.decls.alloc(Declaration::new(
            "app.A",
            "Derived",
            DeclKind::Class(info),
            JavaType::object(),
            Span::default(),
        ));
        let ty = JavaType::member_of(JavaType::class(derived), "label");
        assert_eq!(ctx.resolve_type(&ty), JavaType::string());
    }

    #[test]
    fn test_element_and_length() {
        let ctx = BuildContext::default();
        let array = JavaType::array_of(JavaType::double());
        assert_eq!(
            ctx.resolve_type(&JavaType::Unresolved(TypeQuery::Element(Box::new(array.clone())))),
            JavaType::double()
        );
        assert_eq!(ctx.resolve_type(&JavaType::member_of(array, "length")), JavaType::int());
        assert_eq!(
            ctx.resolve_type(&JavaType::member_of(JavaType::string(), "length")),
            JavaType::int()
        );
    }
}
