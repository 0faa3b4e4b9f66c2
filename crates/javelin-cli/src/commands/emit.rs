//! `javelin emit`: print the Java for a single file.
//!
//! Only the named file is lowered. Imports are not followed, so imported
//! names are dropped with a warning.

use std::path::{Path, PathBuf};

use anyhow::Context;
use javelin_engine::compiler::Diagnostic;
use javelin_engine::{CompileError, ModuleHost, Transpiler};

use super::{load_target, TargetArgs};
use crate::output::StyledOutput;

/// Module host that follows no imports
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedHost;

impl ModuleHost for DetachedHost {
    fn resolve_specifier(&self, _specifier: &str, _from: &Path) -> Option<PathBuf> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct EmitArgs {
    pub file: PathBuf,
    pub target: TargetArgs,
    pub config: Option<PathBuf>,
}

/// Java text of the unit for `source`, followed by `Functions.java` when
/// one was synthesized.
pub fn emit_source(
    transpiler: &mut Transpiler<DetachedHost>,
    source: &str,
    path: &Path,
) -> Result<(String, Vec<Diagnostic>), CompileError> {
    let report = transpiler.lower_unit(source, path)?;
    let output = transpiler.build_finished()?;
    let text = output
        .files
        .iter()
        .map(|file| file.code.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    Ok((text, report.diagnostics))
}

/// Returns whether the file lowered without errors.
pub fn execute(args: EmitArgs, out: &mut StyledOutput) -> anyhow::Result<bool> {
    let source = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let target = load_target(args.config.as_deref(), args.target, args.file.parent())?;
    let mut transpiler = Transpiler::new(target, DetachedHost);

    match emit_source(&mut transpiler, &source, &args.file) {
        Ok((text, diagnostics)) => {
            print!("{}", text);
            if !diagnostics.is_empty() {
                out.diagnostics(&args.file, &source, &diagnostics);
            }
            Ok(!diagnostics.iter().any(Diagnostic::is_error))
        }
        Err(CompileError::Lex { errors, .. }) => {
            let diagnostics: Vec<Diagnostic> = errors
                .iter()
                .map(|e| Diagnostic::from_lex_error(e, &args.file))
                .collect();
            out.diagnostics(&args.file, &source, &diagnostics);
            Ok(false)
        }
        Err(CompileError::Parse { errors, .. }) => {
            let diagnostics: Vec<Diagnostic> = errors
                .iter()
                .map(|e| Diagnostic::from_parse_error(e, &args.file))
                .collect();
            out.diagnostics(&args.file, &source, &diagnostics);
            Ok(false)
        }
        Err(error) => Err(error.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use javelin_engine::TargetConfig;

    #[test]
    fn test_emit_prints_unit_then_functions() {
        let mut transpiler = Transpiler::new(TargetConfig::default(), DetachedHost);
        let (text, diagnostics) = emit_source(
            &mut transpiler,
            "export let cb: (n: number) => void;\n",
            Path::new("main.ts"),
        )
        .unwrap();
        assert!(diagnostics.is_empty());
        let unit = text.find("public class Main").unwrap();
        let functions = text.find("public final class Functions").unwrap();
        assert!(unit < functions);
        assert!(text.contains("public interface DoubleReturnVoid {"));
    }

    #[test]
    fn test_imports_are_dropped_with_warning() {
        let mut transpiler = Transpiler::new(TargetConfig::default(), DetachedHost);
        let (text, diagnostics) = emit_source(
            &mut transpiler,
            "import { helper } from \"./util\";\nexport const x = 1;\n",
            Path::new("main.ts"),
        )
        .unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, "W1002");
        assert!(!text.contains("import app.Util"));
    }
}
