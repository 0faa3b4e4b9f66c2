//! Source file collection

use std::path::{Component, Path, PathBuf};

use anyhow::Context;

/// Directory names never searched for sources.
const SKIPPED_DIRS: &[&str] = &["node_modules", "dist", "target"];

/// Collect `.ts`/`.tsx` sources from the given files and directories.
///
/// Explicit files are kept as given, in argument order. Directories are
/// searched recursively, skipping hidden and dependency directories, and
/// contribute their files in sorted order. Duplicates are dropped.
pub fn collect_sources(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_source(path) {
                push_unique(&mut files, path.clone());
            } else {
                tracing::warn!(target: "javelin::cli", path = %path.display(), "not a TypeScript file; skipped");
            }
        } else if path.is_dir() {
            for found in sources_in_dir(path)? {
                push_unique(&mut files, found);
            }
        } else {
            anyhow::bail!("No such file or directory: {}", path.display());
        }
    }

    Ok(files)
}

fn sources_in_dir(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for extension in ["ts", "tsx"] {
        let pattern = dir.join("**").join(format!("*.{}", extension));
        let pattern = pattern.to_string_lossy();
        let entries = glob::glob(&pattern)
            .with_context(|| format!("Invalid search pattern {}", pattern))?;
        for path in entries.flatten() {
            let relative = path.strip_prefix(dir).unwrap_or(&path);
            if path.is_file() && !is_skipped(relative) && !is_declaration_file(&path) {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}

fn push_unique(files: &mut Vec<PathBuf>, path: PathBuf) {
    if !files.contains(&path) {
        files.push(path);
    }
}

fn is_source(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("ts") | Some("tsx"))
        && !is_declaration_file(path)
}

fn is_declaration_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".d.ts"))
}

fn is_skipped(relative: &Path) -> bool {
    relative.components().any(|component| match component {
        Component::Normal(name) => {
            let name = name.to_string_lossy();
            name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
        }
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_collects_nested_sources_sorted() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("b.ts"));
        touch(&root.join("a/view.tsx"));
        touch(&root.join("a/model.ts"));
        touch(&root.join("notes.md"));

        let files = collect_sources(&[root.to_path_buf()]).unwrap();
        assert_eq!(
            files,
            vec![root.join("a/model.ts"), root.join("a/view.tsx"), root.join("b.ts")]
        );
    }

    #[test]
    fn test_skips_hidden_dependency_and_declaration_files() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("main.ts"));
        touch(&root.join("node_modules/lib/index.ts"));
        touch(&root.join(".cache/tmp.ts"));
        touch(&root.join("types.d.ts"));

        let files = collect_sources(&[root.to_path_buf()]).unwrap();
        assert_eq!(files, vec![root.join("main.ts")]);
    }

    #[test]
    fn test_explicit_files_keep_argument_order() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("z.ts"));
        touch(&root.join("a.ts"));

        let files = collect_sources(&[root.join("z.ts"), root.join("a.ts"), root.join("z.ts")]).unwrap();
        assert_eq!(files, vec![root.join("z.ts"), root.join("a.ts")]);
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = collect_sources(&[temp.path().join("absent")]).unwrap_err();
        assert!(err.to_string().starts_with("No such file or directory"));
    }
}
