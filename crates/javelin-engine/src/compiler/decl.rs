//! Declaration arena
//!
//! Every named thing the lowering creates lives here and is referenced by
//! [`DeclId`]. Emitted code refers to declarations by id, so renaming an
//! entry once changes every place it is printed.

use rustc_hash::FxHashMap;

use super::types::JavaType;
use crate::parser::Span;

/// Index into [`DeclArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

/// Java access level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeclVisibility {
    #[default]
    Public,
    Private,
    Protected,
    /// No modifier
    Package,
}

impl DeclVisibility {
    /// Modifier keyword, empty for package-private.
    pub fn keyword(&self) -> &'static str {
        match self {
            DeclVisibility::Public => "public",
            DeclVisibility::Private => "private",
            DeclVisibility::Protected => "protected",
            DeclVisibility::Package => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub visibility: DeclVisibility,
    pub is_static: bool,
    pub is_final: bool,
}

/// Where a declaration lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Top level of a unit: a static member of the unit class
    Module,
    /// Member of a class, interface or enum
    Member,
    /// Parameter or local inside a body
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassFlavor {
    Class,
    Interface,
    Enum,
}

impl ClassFlavor {
    pub fn keyword(&self) -> &'static str {
        match self {
            ClassFlavor::Class => "class",
            ClassFlavor::Interface => "interface",
            ClassFlavor::Enum => "enum",
        }
    }
}

/// Member table and header of a class-like declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ClassInfo {
    pub flavor: ClassFlavor,
    pub members: FxHashMap<String, DeclId>,
    pub type_params: Vec<String>,
    pub extends: Option<JavaType>,
    pub implements: Vec<JavaType>,
    pub is_abstract: bool,
    /// Default-exported class merged into its unit class
    pub is_unit_class: bool,
}

impl ClassInfo {
    pub fn new(flavor: ClassFlavor) -> Self {
        Self {
            flavor,
            members: FxHashMap::default(),
            type_params: Vec::new(),
            extends: None,
            implements: Vec::new(),
            is_abstract: false,
            is_unit_class: false,
        }
    }
}

/// Which export of the target unit an import refers to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImportedName {
    Named(String),
    Default,
    Namespace,
}

impl ImportedName {
    pub fn describe(&self) -> &str {
        match self {
            ImportedName::Named(name) => name,
            ImportedName::Default => "default",
            ImportedName::Namespace => "*",
        }
    }
}

/// Import proxy target: an export of another unit, looked up lazily
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTarget {
    /// Fully-qualified name of the target unit
    pub unit: String,
    pub name: ImportedName,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclKind {
    Variable,
    Parameter,
    Function,
    Constructor,
    Class(ClassInfo),
    Lambda,
    TypeParameter,
    /// `type X = ...`; only used for resolving annotations
    TypeAlias,
    /// Enum constant
    EnumConstant,
    Import(ImportTarget),
}

impl DeclKind {
    /// Functions and constructors are called directly; every other callable
    /// value goes through its interface's `call` method.
    pub fn is_callable_declaration(&self) -> bool {
        matches!(self, DeclKind::Function | DeclKind::Constructor)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// FQN of the owning unit
    pub unit: String,
    pub name: String,
    pub kind: DeclKind,
    pub ty: JavaType,
    pub modifiers: Modifiers,
    pub placement: Placement,
    pub span: Span,
    /// Declared with an explicit type annotation
    pub annotated: bool,
    pub has_initializer: bool,
    /// Enclosing class for members
    pub owner: Option<DeclId>,
}

impl Declaration {
    pub fn new(unit: &str, name: &str, kind: DeclKind, ty: JavaType, span: Span) -> Self {
        Self {
            unit: unit.to_string(),
            name: name.to_string(),
            kind,
            ty,
            modifiers: Modifiers::default(),
            placement: Placement::Local,
            span,
            annotated: false,
            has_initializer: false,
            owner: None,
        }
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn class_info(&self) -> Option<&ClassInfo> {
        match &self.kind {
            DeclKind::Class(info) => Some(info),
            _ => None,
        }
    }

    pub fn import_target(&self) -> Option<&ImportTarget> {
        match &self.kind {
            DeclKind::Import(target) => Some(target),
            _ => None,
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, DeclKind::Class(_))
    }
}

/// Owner of all declarations of a build
#[derive(Debug, Default)]
pub struct DeclArena {
    decls: Vec<Declaration>,
}

impl DeclArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, decl: Declaration) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    pub fn get(&self, id: DeclId) -> &Declaration {
        &self.decls[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: DeclId) -> &mut Declaration {
        &mut self.decls[id.0 as usize]
    }

    /// Register `member` in the member table of class `class`.
    pub fn add_member(&mut self, class: DeclId, name: &str, member: DeclId) {
        if let DeclKind::Class(info) = &mut self.get_mut(class).kind {
            info.members.insert(name.to_string(), member);
        }
        self.get_mut(member).owner = Some(class);
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

impl super::types::ClassNames for DeclArena {
    fn class_name(&self, decl: DeclId) -> String {
        self.get(decl).name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_and_get() {
        let mut arena = DeclArena::new();
        let id = arena.alloc(Declaration::new(
            "app.Main",
            "helper",
            DeclKind::Function,
            JavaType::void(),
            Span::default(),
        ));
        assert_eq!(arena.get(id).name, "helper");
        assert_eq!(arena.get(id).placement, Placement::Local);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_add_member_sets_owner() {
        let mut arena = DeclArena::new();
        let class = arena.alloc(Declaration::new(
            "app.Main",
            "Point",
            DeclKind::Class(ClassInfo::new(ClassFlavor::Class)),
            JavaType::object(),
            Span::default(),
        ));
        let field = arena.alloc(
            Declaration::new("app.Main", "x", DeclKind::Variable, JavaType::double(), Span::default())
                .with_placement(Placement::Member),
        );
        arena.add_member(class, "x", field);
        assert_eq!(arena.get(field).owner, Some(class));
        assert_eq!(arena.get(class).class_info().unwrap().members.get("x"), Some(&field));
    }
}
