//! Scope chain for name resolution during lowering
//!
//! One tree per unit. Scopes are pushed when a class, constructor, method,
//! function, lambda or block is entered and are never destroyed; popping
//! only moves the cursor back to the parent.

use rustc_hash::FxHashMap;

use super::decl::DeclId;

/// Scope identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

/// Scope kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Unit root
    Module,
    Class,
    Constructor,
    Method,
    Function,
    Lambda,
    Block,
}

impl ScopeKind {
    /// Scopes that start a new Java method body.
    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            ScopeKind::Constructor | ScopeKind::Method | ScopeKind::Function | ScopeKind::Lambda
        )
    }
}

/// Scope in the scope tree
#[derive(Debug, Clone)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    /// Parent scope (None for the root)
    pub parent: Option<ScopeId>,
    /// Class or function name this scope belongs to, may be empty
    pub namespace: String,
    /// Names bound in this scope
    pub bindings: FxHashMap<String, DeclId>,
}

impl Scope {
    fn new(id: ScopeId, kind: ScopeKind, parent: Option<ScopeId>, namespace: String) -> Self {
        Scope {
            id,
            kind,
            parent,
            namespace,
            bindings: FxHashMap::default(),
        }
    }
}

/// Scope tree with a cursor at the current scope
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl ScopeTree {
    /// Create a tree holding only the module scope.
    pub fn new() -> Self {
        ScopeTree {
            scopes: vec![Scope::new(ScopeId(0), ScopeKind::Module, None, String::new())],
            current: ScopeId(0),
        }
    }

    /// Push a child of the current scope and make it current.
    pub fn push_scope(&mut self, kind: ScopeKind, namespace: &str) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes
            .push(Scope::new(id, kind, Some(self.current), namespace.to_string()));
        self.current = id;
        id
    }

    /// Return to the parent scope. Does nothing at the root.
    pub fn pop_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current.0 as usize].parent {
            self.current = parent;
        }
    }

    /// Bind `name` in the current scope, shadowing outer bindings.
    pub fn declare(&mut self, name: &str, decl: DeclId) {
        self.scopes[self.current.0 as usize]
            .bindings
            .insert(name.to_string(), decl);
    }

    /// Rebind `name` in the scope that already owns it.
    ///
    /// Returns false, and binds nothing, when no scope on the chain defines
    /// the name.
    pub fn assign(&mut self, name: &str, decl: DeclId) -> bool {
        let mut scope_id = self.current;
        loop {
            let scope = &mut self.scopes[scope_id.0 as usize];
            if let Some(slot) = scope.bindings.get_mut(name) {
                *slot = decl;
                return true;
            }
            match scope.parent {
                Some(parent) => scope_id = parent,
                None => return false,
            }
        }
    }

    /// Resolve `name` from the current scope outwards.
    pub fn lookup(&self, name: &str) -> Option<DeclId> {
        self.lookup_with_scope(name).map(|(decl, _)| decl)
    }

    /// Resolve `name` and report which scope owns it.
    pub fn lookup_with_scope(&self, name: &str) -> Option<(DeclId, ScopeId)> {
        let mut scope_id = self.current;
        loop {
            let scope = &self.scopes[scope_id.0 as usize];
            if let Some(decl) = scope.bindings.get(name) {
                return Some((*decl, scope_id));
            }
            match scope.parent {
                Some(parent) => scope_id = parent,
                None => return None,
            }
        }
    }

    /// Resolve `name` in the current scope only.
    pub fn lookup_local(&self, name: &str) -> Option<DeclId> {
        self.current().bindings.get(name).copied()
    }

    /// True while the cursor is at the module scope.
    pub fn is_root(&self) -> bool {
        self.current == ScopeId(0)
    }

    pub fn current(&self) -> &Scope {
        &self.scopes[self.current.0 as usize]
    }

    pub fn current_id(&self) -> ScopeId {
        self.current
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    /// Nearest enclosing callable scope, if any.
    pub fn enclosing_callable(&self) -> Option<ScopeId> {
        let mut scope_id = self.current;
        loop {
            let scope = &self.scopes[scope_id.0 as usize];
            if scope.kind.is_callable() {
                return Some(scope_id);
            }
            scope_id = scope.parent?;
        }
    }

    /// Dotted path of the non-empty namespaces from the root to the
    /// current scope, for log messages.
    pub fn namespace_path(&self) -> String {
        let mut parts = Vec::new();
        let mut scope_id = Some(self.current);
        while let Some(id) = scope_id {
            let scope = &self.scopes[id.0 as usize];
            if !scope.namespace.is_empty() {
                parts.push(scope.namespace.as_str());
            }
            scope_id = scope.parent;
        }
        parts.reverse();
        parts.join(".")
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tree_is_root() {
        let tree = ScopeTree::new();
        assert!(tree.is_root());
        assert_eq!(tree.scope_count(), 1);
        assert_eq!(tree.current().kind, ScopeKind::Module);
    }

    #[test]
    fn test_shadow_in_nested_scope() {
        let mut tree = ScopeTree::new();
        tree.declare("x", DeclId(1));
        tree.push_scope(ScopeKind::Function, "f");
        tree.declare("x", DeclId(2));
        assert_eq!(tree.lookup("x"), Some(DeclId(2)));
        tree.pop_scope();
        assert_eq!(tree.lookup("x"), Some(DeclId(1)));
    }

    #[test]
    fn test_resolve_in_parent_scope() {
        let mut tree = ScopeTree::new();
        tree.declare("outer", DeclId(7));
        tree.push_scope(ScopeKind::Block, "");
        tree.push_scope(ScopeKind::Lambda, "");
        assert_eq!(tree.lookup("outer"), Some(DeclId(7)));
        assert_eq!(tree.lookup_local("outer"), None);
        assert_eq!(tree.lookup("missing"), None);
    }

    #[test]
    fn test_assign_updates_owning_scope() {
        let mut tree = ScopeTree::new();
        tree.declare("x", DeclId(1));
        tree.push_scope(ScopeKind::Block, "");
        assert!(tree.assign("x", DeclId(5)));
        assert_eq!(tree.lookup_local("x"), None);
        tree.pop_scope();
        assert_eq!(tree.lookup("x"), Some(DeclId(5)));
    }

    #[test]
    fn test_assign_missing_is_noop() {
        let mut tree = ScopeTree::new();
        tree.push_scope(ScopeKind::Method, "run");
        assert!(!tree.assign("ghost", DeclId(3)));
        assert_eq!(tree.lookup("ghost"), None);
    }

    #[test]
    fn test_pop_at_root_stays() {
        let mut tree = ScopeTree::new();
        tree.pop_scope();
        assert!(tree.is_root());
    }

    #[test]
    fn test_namespace_path_and_callable() {
        let mut tree = ScopeTree::new();
        assert_eq!(tree.enclosing_callable(), None);
        tree.push_scope(ScopeKind::Class, "Point");
        let method = tree.push_scope(ScopeKind::Method, "norm");
        tree.push_scope(ScopeKind::Block, "");
        assert_eq!(tree.namespace_path(), "Point.norm");
        assert_eq!(tree.enclosing_callable(), Some(method));
    }
}
