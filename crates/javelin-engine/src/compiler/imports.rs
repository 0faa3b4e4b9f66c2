//! Per-unit import table
//!
//! Built during the finalization resolution pass. The first import of a
//! simple name wins; a later, different FQN with the same simple name (or
//! one that clashes with a name the unit declares itself) is not imported
//! and is spelled fully qualified wherever it is used.

use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ImportKind {
    /// `import a.b.C;`
    Type,
    /// `import static a.b.C.member;`
    Static,
}

#[derive(Debug, Default)]
pub struct ImportTable {
    own: FxHashSet<String>,
    by_simple: FxHashMap<String, String>,
    entries: Vec<(ImportKind, String)>,
}

impl ImportTable {
    /// `own_names` are names declared by the unit itself.
    pub fn new(own_names: impl IntoIterator<Item = String>) -> Self {
        Self {
            own: own_names.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Ask to refer to `fqn` by `simple`. Returns whether the simple name
    /// may be used.
    pub fn request(&mut self, simple: &str, fqn: &str, kind: ImportKind) -> bool {
        if self.own.contains(simple) {
            return false;
        }
        match self.by_simple.get(simple) {
            Some(existing) => existing == fqn,
            None => {
                self.by_simple.insert(simple.to_string(), fqn.to_string());
                self.entries.push((kind, fqn.to_string()));
                true
            }
        }
    }

    /// Whether `fqn` was imported under `simple`.
    pub fn usable(&self, simple: &str, fqn: &str) -> bool {
        self.by_simple.get(simple).map(String::as_str) == Some(fqn)
    }

    /// `simple` if imported, otherwise `fqn`.
    pub fn spell<'a>(&self, simple: &'a str, fqn: &'a str) -> &'a str {
        if self.usable(simple, fqn) {
            simple
        } else {
            fqn
        }
    }

    /// Import lines: type imports, then static imports, each sorted.
    pub fn lines(&self) -> Vec<String> {
        let mut entries = self.entries.clone();
        entries.sort();
        entries
            .into_iter()
            .map(|(kind, fqn)| match kind {
                ImportKind::Type => format!("import {};", fqn),
                ImportKind::Static => format!("import static {};", fqn),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_import_wins() {
        let mut table = ImportTable::new(Vec::new());
        assert!(table.request("Point", "app.geo.Shapes.Point", ImportKind::Type));
        assert!(table.request("Point", "app.geo.Shapes.Point", ImportKind::Type));
        assert!(!table.request("Point", "app.ui.Widgets.Point", ImportKind::Type));
        assert_eq!(table.len(), 1);
        assert_eq!(table.spell("Point", "app.geo.Shapes.Point"), "Point");
        assert_eq!(table.spell("Point", "app.ui.Widgets.Point"), "app.ui.Widgets.Point");
    }

    #[test]
    fn test_own_names_are_never_shadowed() {
        let mut table = ImportTable::new(vec!["helper".to_string()]);
        assert!(!table.request("helper", "app.Util.helper", ImportKind::Static));
        assert!(table.is_empty());
        assert_eq!(table.spell("helper", "app.Util.helper"), "app.Util.helper");
    }

    #[test]
    fn test_lines_sorted_by_kind() {
        let mut table = ImportTable::new(Vec::new());
        table.request("max", "app.Util.max", ImportKind::Static);
        table.request("Objects", "java.util.Objects", ImportKind::Type);
        table.request("Functions", "app.Functions", ImportKind::Type);
        assert_eq!(
            table.lines(),
            vec![
                "import app.Functions;",
                "import java.util.Objects;",
                "import static app.Util.max;",
            ]
        );
    }
}
