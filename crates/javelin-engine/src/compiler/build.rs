//! Build pipeline
//!
//! A [`Transpiler`] owns the [`BuildContext`] of one build. Callers hand it
//! every source file through [`Transpiler::lower_unit`], in any order, and
//! then call [`Transpiler::build_finished`] once to finalize and render all
//! units. Import specifiers are turned into paths by a [`ModuleHost`].

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::config::TargetConfig;
use super::context::BuildContext;
use super::diagnostic::Diagnostic;
use super::error::{CompileError, CompileResult};
use super::finalize::finalize_build;
use super::lower::Lowerer;
use super::printer::LineMapping;
use super::unit::{UnitIdentity, UnitState};
use crate::parser::ast::Module;
use crate::parser::Parser;

/// Maps an import specifier to the source file it names
pub trait ModuleHost {
    /// Path of the module `specifier` refers to, as imported from `from`.
    /// `None` when the specifier cannot be followed.
    fn resolve_specifier(&self, specifier: &str, from: &Path) -> Option<PathBuf>;
}

/// Resolves relative specifiers (`./x`, `../y`) against the filesystem.
///
/// For `import { x } from "./util"` it tries, in order:
/// 1. `./util.ts`
/// 2. `./util.tsx`
/// 3. `./util/index.ts`
///
/// Paths stay relative to how the importing file was named, so the unit
/// identity computed for an import matches the one computed when that
/// file is lowered.
#[derive(Debug, Clone, Default)]
pub struct FsModuleHost;

impl FsModuleHost {
    pub fn new() -> Self {
        Self
    }

    fn candidates(base: &Path) -> Vec<PathBuf> {
        let has_source_ext = matches!(
            base.extension().and_then(|e| e.to_str()),
            Some("ts") | Some("tsx")
        );
        if has_source_ext {
            return vec![base.to_path_buf()];
        }
        let with_suffix = |suffix: &str| {
            let mut path = base.as_os_str().to_os_string();
            path.push(suffix);
            PathBuf::from(path)
        };
        vec![
            with_suffix(".ts"),
            with_suffix(".tsx"),
            base.join("index.ts"),
        ]
    }
}

impl ModuleHost for FsModuleHost {
    fn resolve_specifier(&self, specifier: &str, from: &Path) -> Option<PathBuf> {
        if !(specifier.starts_with("./") || specifier.starts_with("../")) {
            tracing::trace!(target: "javelin::build", specifier, "not a relative specifier");
            return None;
        }
        let dir = from.parent().unwrap_or_else(|| Path::new(""));
        let base = normalize(&dir.join(specifier));
        let found = Self::candidates(&base).into_iter().find(|path| path.is_file());
        if found.is_none() {
            tracing::debug!(
                target: "javelin::build",
                specifier,
                from = %from.display(),
                "module not found"
            );
        }
        found
    }
}

/// Lexically remove `.` and `..` components.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Parse the source of one unit. Needs no build state, so callers may
/// parse on several threads and lower afterwards.
pub fn parse_unit(source: &str, path: &Path) -> CompileResult<Module> {
    Parser::new(source)
        .map_err(|errors| CompileError::Lex {
            path: path.to_path_buf(),
            errors,
        })?
        .parse()
        .map_err(|errors| CompileError::Parse {
            path: path.to_path_buf(),
            errors,
        })
}

/// Result of lowering one unit
#[derive(Debug, Clone, PartialEq)]
pub struct UnitReport {
    pub fqn: String,
    pub path: PathBuf,
    pub diagnostics: Vec<Diagnostic>,
}

impl UnitReport {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }
}

/// Generated-to-source line map written next to a Java file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMap {
    /// Generated file, relative to the output directory
    pub file: PathBuf,
    /// Source file the unit was lowered from
    pub source: PathBuf,
    pub mappings: Vec<LineMapping>,
}

impl SourceMap {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// One generated Java file
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFile {
    /// Relative to the output directory
    pub path: PathBuf,
    pub code: String,
    pub source_map: Option<SourceMap>,
}

/// Everything a finished build produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOutput {
    pub files: Vec<OutputFile>,
    /// Diagnostics of every unit, in lowering order
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildOutput {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<&OutputFile> {
        self.files.iter().find(|f| f.path == path.as_ref())
    }
}

/// Drives lowering and finalization of one build
pub struct Transpiler<H: ModuleHost> {
    ctx: BuildContext,
    host: H,
    source_maps: bool,
    finished: bool,
}

impl<H: ModuleHost> Transpiler<H> {
    pub fn new(config: TargetConfig, host: H) -> Self {
        Self {
            ctx: BuildContext::new(config),
            host,
            source_maps: false,
            finished: false,
        }
    }

    /// Attach a [`SourceMap`] to every generated unit file.
    pub fn with_source_maps(mut self, enabled: bool) -> Self {
        self.source_maps = enabled;
        self
    }

    pub fn context(&self) -> &BuildContext {
        &self.ctx
    }

    pub fn config(&self) -> &TargetConfig {
        &self.ctx.config
    }

    /// Parse and lower one source file into its compilation unit.
    pub fn lower_unit(&mut self, source: &str, path: &Path) -> CompileResult<UnitReport> {
        let module = parse_unit(source, path)?;
        self.lower_module(&module, path)
    }

    /// Lower an already parsed module into the compilation unit of `path`.
    pub fn lower_module(&mut self, module: &Module, path: &Path) -> CompileResult<UnitReport> {
        let identity = UnitIdentity::from_path(path, &self.ctx.config);
        let fqn = identity.fqn();

        if self.finished || self.ctx.units.state_of(&fqn) == UnitState::Finalized {
            return Err(CompileError::UnitFinalized { unit: fqn });
        }
        if let Some(existing) = self.ctx.units.get(&fqn) {
            return Err(CompileError::DuplicateUnit {
                unit: fqn,
                first: existing.path.clone(),
            });
        }

        let unit = Lowerer::new(&mut self.ctx, &self.host, path, identity).lower_module(module);
        let report = UnitReport {
            fqn: fqn.clone(),
            path: path.to_path_buf(),
            diagnostics: unit.diagnostics.clone(),
        };
        self.ctx.units.insert(unit);
        tracing::debug!(
            target: "javelin::build",
            unit = %fqn,
            diagnostics = report.diagnostics.len(),
            "registered unit"
        );
        Ok(report)
    }

    /// Finalize and render every lowered unit. Units cannot be added
    /// afterwards.
    pub fn build_finished(&mut self) -> CompileResult<BuildOutput> {
        let (units, functions) = finalize_build(&mut self.ctx)?;
        self.finished = true;

        let mut files = Vec::with_capacity(units.len() + 1);
        for unit in units {
            let source_map = self.source_maps.then(|| SourceMap {
                file: unit.output.clone(),
                source: unit.source.clone(),
                mappings: unit.mappings.clone(),
            });
            files.push(OutputFile {
                path: unit.output,
                code: unit.code,
                source_map,
            });
        }
        if let Some(functions) = functions {
            files.push(OutputFile {
                path: functions.output,
                code: functions.code,
                source_map: None,
            });
        }

        let diagnostics: Vec<Diagnostic> = self
            .ctx
            .units
            .iter()
            .flat_map(|unit| unit.diagnostics.iter().cloned())
            .collect();
        tracing::info!(
            target: "javelin::build",
            units = self.ctx.units.len(),
            files = files.len(),
            interfaces = self.ctx.interfaces.len(),
            errors = diagnostics.iter().filter(|d| d.is_error()).count(),
            "build finished"
        );
        Ok(BuildOutput { files, diagnostics })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_removes_dot_segments() {
        assert_eq!(normalize(Path::new("src/./a/../b.ts")), PathBuf::from("src/b.ts"));
        assert_eq!(normalize(Path::new("../x/./y")), PathBuf::from("../x/y"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn test_fs_host_resolution_order() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("lib")).unwrap();
        fs::write(src.join("main.ts"), "").unwrap();
        fs::write(src.join("util.ts"), "").unwrap();
        fs::write(src.join("view.tsx"), "").unwrap();
        fs::write(src.join("lib").join("index.ts"), "").unwrap();

        let host = FsModuleHost::new();
        let main = src.join("main.ts");
        assert_eq!(host.resolve_specifier("./util", &main), Some(src.join("util.ts")));
        assert_eq!(host.resolve_specifier("./view", &main), Some(src.join("view.tsx")));
        assert_eq!(host.resolve_specifier("./lib", &main), Some(src.join("lib").join("index.ts")));
        assert_eq!(host.resolve_specifier("./util.ts", &main), Some(src.join("util.ts")));
        assert_eq!(host.resolve_specifier("./missing", &main), None);
        assert_eq!(host.resolve_specifier("fs", &main), None);
    }

    #[test]
    fn test_fs_host_parent_directory() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("shared.ts"), "").unwrap();

        let host = FsModuleHost::new();
        let from = src.join("nested").join("module.ts");
        assert_eq!(host.resolve_specifier("../shared", &from), Some(src.join("shared.ts")));
    }

    struct NoModules;

    impl ModuleHost for NoModules {
        fn resolve_specifier(&self, _specifier: &str, _from: &Path) -> Option<PathBuf> {
            None
        }
    }

    #[test]
    fn test_duplicate_unit_is_rejected() {
        let mut transpiler = Transpiler::new(TargetConfig::default(), NoModules);
        transpiler.lower_unit("export const a = 1;", Path::new("a.ts")).unwrap();
        let err = transpiler.lower_unit("export const b = 2;", Path::new("a.ts")).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateUnit { .. }));
    }

    #[test]
    fn test_lowering_after_finish_is_rejected() {
        let mut transpiler = Transpiler::new(TargetConfig::default(), NoModules);
        transpiler.lower_unit("export const a = 1;", Path::new("a.ts")).unwrap();
        transpiler.build_finished().unwrap();
        let err = transpiler.lower_unit("export const b = 2;", Path::new("b.ts")).unwrap_err();
        assert!(matches!(err, CompileError::UnitFinalized { .. }));
    }

    #[test]
    fn test_parse_error_leaves_other_units_intact() {
        let mut transpiler = Transpiler::new(TargetConfig::default(), NoModules);
        let err = transpiler.lower_unit("let = ;", Path::new("bad.ts")).unwrap_err();
        assert!(matches!(err, CompileError::Parse { .. }));
        transpiler.lower_unit("export const ok = true;", Path::new("good.ts")).unwrap();
        let output = transpiler.build_finished().unwrap();
        assert_eq!(output.files.len(), 1);
        assert_eq!(output.files[0].path, PathBuf::from("app/Good.java"));
    }

    #[test]
    fn test_source_maps_are_attached_on_request() {
        let mut transpiler =
            Transpiler::new(TargetConfig::default(), NoModules).with_source_maps(true);
        transpiler
            .lower_unit("export function f(): number {\n  return 1;\n}\n", Path::new("f.ts"))
            .unwrap();
        let output = transpiler.build_finished().unwrap();
        let map = output.files[0].source_map.as_ref().unwrap();
        assert_eq!(map.file, PathBuf::from("app/F.java"));
        assert_eq!(map.source, PathBuf::from("f.ts"));
        assert!(map.mappings.iter().any(|m| m.original == 2));
        let json = map.to_json().unwrap();
        assert!(json.contains("\"mappings\""));
    }
}
