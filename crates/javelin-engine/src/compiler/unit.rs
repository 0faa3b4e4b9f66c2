//! Compilation units
//!
//! One unit per source file; it becomes one top-level Java class named
//! after the file, in a package named after the file's directory.

use std::path::{Component, Path, PathBuf};

use rustc_hash::FxHashMap;

use super::config::{is_java_identifier, is_java_keyword, TargetConfig};
use super::decl::DeclId;
use super::diagnostic::Diagnostic;
use super::printer::Printer;
use super::types::capitalize;

/// Lifecycle of a unit. A unit never goes back to `Lowering` once
/// finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Unparsed,
    Lowering,
    Lowered,
    Finalized,
}

/// Package and class a source file maps to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitIdentity {
    pub package: String,
    pub class_name: String,
}

impl UnitIdentity {
    /// Compute the identity of the file at `path`.
    ///
    /// `src/util/string-helpers.ts` under source root `src` with base
    /// package `app` is `app.util.StringHelpers`.
    pub fn from_path(path: &Path, config: &TargetConfig) -> Self {
        let relative = relative_to_root(path, &config.source_root);
        let mut segments: Vec<String> = Vec::new();
        if let Some(parent) = relative.parent() {
            for component in parent.components() {
                if let Component::Normal(part) = component {
                    segments.push(package_segment(&part.to_string_lossy()));
                }
            }
        }
        let stem = relative
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        UnitIdentity {
            package: config.package_for(&segments),
            class_name: class_name_for(&stem),
        }
    }

    pub fn fqn(&self) -> String {
        qualify(&self.package, &self.class_name)
    }
}

/// `package.name`, or just `name` in the default package.
pub fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", package, name)
    }
}

fn relative_to_root(path: &Path, root: &Path) -> PathBuf {
    let strip_cur = |p: &Path| -> PathBuf {
        p.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    };
    let path = strip_cur(path);
    let root = strip_cur(root);
    if root.as_os_str().is_empty() {
        return path;
    }
    match path.strip_prefix(&root) {
        Ok(rest) => rest.to_path_buf(),
        Err(_) => path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_default(),
    }
}

fn package_segment(dir: &str) -> String {
    let mut segment: String = dir
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if !is_java_identifier(&segment) || is_java_keyword(&segment) {
        segment.insert(0, '_');
    }
    segment
}

fn class_name_for(stem: &str) -> String {
    let mut name: String = stem
        .split(|c: char| !c.is_alphanumeric())
        .filter(|piece| !piece.is_empty())
        .map(capitalize)
        .collect();
    if name.is_empty() {
        name.push_str("Main");
    }
    if !is_java_identifier(&name) {
        name.insert(0, '_');
    }
    name
}

/// One source file being lowered to one Java class
#[derive(Debug)]
pub struct CompilationUnit {
    pub path: PathBuf,
    pub package: String,
    pub class_name: String,
    pub state: UnitState,
    /// Exported name to declaration (or import proxy, for re-exports)
    pub exports: FxHashMap<String, DeclId>,
    /// Target of `export default`, renamed to the class name
    pub default_export: Option<DeclId>,
    /// Units re-exported with `export * from`
    pub reexports: Vec<String>,
    /// Local import name to import proxy
    pub aliases: FxHashMap<String, DeclId>,
    /// Every import proxy created for this unit, in source order
    pub proxies: Vec<DeclId>,
    /// Module-level declarations, in source order
    pub module_decls: Vec<DeclId>,
    /// Default-exported class merged into the unit class
    pub unit_class: Option<DeclId>,
    /// Type parameters, `extends` and `implements` of the unit class
    pub header: Printer,
    /// Fields, methods and nested types of the unit class
    pub root: Printer,
    /// Body of the static initializer
    pub static_init: Printer,
    /// A `main` method was declared at module level
    pub has_main: bool,
    pub diagnostics: Vec<Diagnostic>,
    /// Import lines, filled during finalization
    pub imports: Vec<String>,
}

impl CompilationUnit {
    pub fn new(path: &Path, identity: UnitIdentity) -> Self {
        Self {
            path: path.to_path_buf(),
            package: identity.package,
            class_name: identity.class_name,
            state: UnitState::Unparsed,
            exports: FxHashMap::default(),
            default_export: None,
            reexports: Vec::new(),
            aliases: FxHashMap::default(),
            proxies: Vec::new(),
            module_decls: Vec::new(),
            unit_class: None,
            header: Printer::new(),
            root: Printer::new(),
            static_init: Printer::new(),
            has_main: false,
            diagnostics: Vec::new(),
            imports: Vec::new(),
        }
    }

    pub fn fqn(&self) -> String {
        qualify(&self.package, &self.class_name)
    }

    /// An empty `main` is added so that the static initializer runs.
    pub fn needs_main(&self) -> bool {
        !self.has_main && !self.static_init.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Output path relative to the output directory.
    pub fn output_path(&self) -> PathBuf {
        let mut path: PathBuf = self.package.split('.').filter(|s| !s.is_empty()).collect();
        path.push(format!("{}.java", self.class_name));
        path
    }
}

/// All units of a build, in lowering order
#[derive(Debug, Default)]
pub struct UnitRegistry {
    units: Vec<CompilationUnit>,
    by_fqn: FxHashMap<String, usize>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a lowered unit. A unit with the same FQN is replaced.
    pub fn insert(&mut self, unit: CompilationUnit) {
        let fqn = unit.fqn();
        match self.by_fqn.get(&fqn) {
            Some(&index) => self.units[index] = unit,
            None => {
                self.by_fqn.insert(fqn, self.units.len());
                self.units.push(unit);
            }
        }
    }

    pub fn get(&self, fqn: &str) -> Option<&CompilationUnit> {
        self.by_fqn.get(fqn).map(|&i| &self.units[i])
    }

    pub fn get_mut(&mut self, fqn: &str) -> Option<&mut CompilationUnit> {
        match self.by_fqn.get(fqn) {
            Some(&i) => Some(&mut self.units[i]),
            None => None,
        }
    }

    pub fn state_of(&self, fqn: &str) -> UnitState {
        self.get(fqn).map(|u| u.state).unwrap_or(UnitState::Unparsed)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompilationUnit> {
        self.units.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut CompilationUnit> {
        self.units.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(package: &str, root: &str) -> TargetConfig {
        TargetConfig::new(package, "17", root).unwrap()
    }

    #[test]
    fn test_identity_from_nested_path() {
        let id = UnitIdentity::from_path(
            Path::new("src/util/string-helpers.ts"),
            &config("base", "src"),
        );
        assert_eq!(id.package, "base.util");
        assert_eq!(id.class_name, "StringHelpers");
        assert_eq!(id.fqn(), "base.util.StringHelpers");
    }

    #[test]
    fn test_identity_with_current_dir_root() {
        let id = UnitIdentity::from_path(Path::new("./main.ts"), &config("app", "."));
        assert_eq!(id.fqn(), "app.Main");
    }

    #[test]
    fn test_identity_outside_root_uses_file_name() {
        let id = UnitIdentity::from_path(Path::new("/elsewhere/lib/math_utils.ts"), &config("app", "src"));
        assert_eq!(id.fqn(), "app.MathUtils");
    }

    #[test]
    fn test_identity_sanitizes_segments() {
        let id = UnitIdentity::from_path(
            Path::new("src/My-Lib/class/2d.ts"),
            &config("", "src"),
        );
        assert_eq!(id.package, "my_lib._class");
        assert_eq!(id.class_name, "_2d");
    }

    #[test]
    fn test_output_path() {
        let unit = CompilationUnit::new(
            Path::new("src/a/b.ts"),
            UnitIdentity {
                package: "app.a".to_string(),
                class_name: "B".to_string(),
            },
        );
        assert_eq!(unit.output_path(), PathBuf::from("app/a/B.java"));
        assert!(!unit.needs_main());
    }

    #[test]
    fn test_registry_state() {
        let mut registry = UnitRegistry::new();
        assert_eq!(registry.state_of("app.A"), UnitState::Unparsed);
        let mut unit = CompilationUnit::new(
            Path::new("a.ts"),
            UnitIdentity {
                package: "app".to_string(),
                class_name: "A".to_string(),
            },
        );
        unit.state = UnitState::Lowered;
        registry.insert(unit);
        assert_eq!(registry.state_of("app.A"), UnitState::Lowered);
        assert_eq!(registry.len(), 1);
    }
}
