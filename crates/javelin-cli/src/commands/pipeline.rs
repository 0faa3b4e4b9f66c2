//! Parallel parse, ordered lowering
//!
//! Workers claim files by index, read and parse them concurrently, then
//! take turns on the shared transpiler: file `i` is lowered only after
//! files `0..i`. Output is therefore identical for any `--jobs` value.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use javelin_engine::compiler::{parse_unit, CompileError, CompileResult, Diagnostic};
use javelin_engine::{BuildOutput, ModuleHost, Transpiler, UnitReport};
use parking_lot::{Condvar, Mutex};

/// What happened to one input file
#[derive(Debug)]
pub enum UnitOutcome {
    Lowered(UnitReport),
    Failed(CompileError),
    Unreadable(std::io::Error),
}

#[derive(Debug)]
pub struct UnitResult {
    pub path: PathBuf,
    /// Empty when the file could not be read
    pub source: String,
    pub outcome: UnitOutcome,
}

impl UnitResult {
    /// Located diagnostics of this file, including lexer and parser errors.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match &self.outcome {
            UnitOutcome::Lowered(report) => report.diagnostics.clone(),
            UnitOutcome::Failed(CompileError::Lex { errors, .. }) => errors
                .iter()
                .map(|e| Diagnostic::from_lex_error(e, &self.path))
                .collect(),
            UnitOutcome::Failed(CompileError::Parse { errors, .. }) => errors
                .iter()
                .map(|e| Diagnostic::from_parse_error(e, &self.path))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Failure that has no source location.
    pub fn unlocated_error(&self) -> Option<String> {
        match &self.outcome {
            UnitOutcome::Lowered(_) => None,
            UnitOutcome::Failed(CompileError::Lex { .. } | CompileError::Parse { .. }) => None,
            UnitOutcome::Failed(error) => Some(error.to_string()),
            UnitOutcome::Unreadable(error) => {
                Some(format!("Failed to read {}: {}", self.path.display(), error))
            }
        }
    }

    pub fn has_errors(&self) -> bool {
        match &self.outcome {
            UnitOutcome::Lowered(report) => report.error_count() > 0,
            _ => true,
        }
    }
}

/// Per-file results in input order plus the finalized build
#[derive(Debug)]
pub struct PipelineRun {
    pub units: Vec<UnitResult>,
    pub build: CompileResult<BuildOutput>,
}

impl PipelineRun {
    pub fn has_errors(&self) -> bool {
        self.build.is_err() || self.units.iter().any(UnitResult::has_errors)
    }

    pub fn error_count(&self) -> usize {
        let per_unit: usize = self
            .units
            .iter()
            .map(|unit| match &unit.outcome {
                UnitOutcome::Lowered(report) => report.error_count(),
                _ => unit.diagnostics().len().max(1),
            })
            .sum();
        per_unit + usize::from(self.build.is_err())
    }
}

struct LowerState<H: ModuleHost> {
    next: usize,
    transpiler: Transpiler<H>,
    results: Vec<Option<UnitResult>>,
}

/// Lower every file through `transpiler` and finalize the build.
pub fn run<H: ModuleHost + Send>(
    files: &[PathBuf],
    transpiler: Transpiler<H>,
    jobs: usize,
) -> PipelineRun {
    let jobs = jobs.clamp(1, files.len().max(1));
    let _span = tracing::info_span!(target: "javelin::cli", "pipeline", files = files.len(), jobs).entered();

    let claim = AtomicUsize::new(0);
    let turn = Condvar::new();
    let state = Mutex::new(LowerState {
        next: 0,
        transpiler,
        results: (0..files.len()).map(|_| None).collect(),
    });

    thread::scope(|scope| {
        for _ in 0..jobs {
            scope.spawn(|| loop {
                let index = claim.fetch_add(1, Ordering::Relaxed);
                let Some(path) = files.get(index) else {
                    break;
                };
                let parsed = std::fs::read_to_string(path).map(|source| {
                    let module = parse_unit(&source, path);
                    (source, module)
                });

                let mut state = state.lock();
                while state.next != index {
                    turn.wait(&mut state);
                }
                let (source, outcome) = match parsed {
                    Ok((source, Ok(module))) => {
                        let outcome = match state.transpiler.lower_module(&module, path) {
                            Ok(report) => UnitOutcome::Lowered(report),
                            Err(error) => UnitOutcome::Failed(error),
                        };
                        (source, outcome)
                    }
                    Ok((source, Err(error))) => (source, UnitOutcome::Failed(error)),
                    Err(error) => (String::new(), UnitOutcome::Unreadable(error)),
                };
                log_outcome(path, &outcome);
                state.results[index] = Some(UnitResult {
                    path: path.clone(),
                    source,
                    outcome,
                });
                state.next += 1;
                turn.notify_all();
            });
        }
    });

    let mut state = state.into_inner();
    let build = state.transpiler.build_finished();
    if let Err(error) = &build {
        tracing::error!(target: "javelin::cli", %error, "build failed");
    }
    PipelineRun {
        units: state.results.into_iter().flatten().collect(),
        build,
    }
}

fn log_outcome(path: &Path, outcome: &UnitOutcome) {
    match outcome {
        UnitOutcome::Lowered(report) => tracing::debug!(
            target: "javelin::cli",
            path = %path.display(),
            unit = %report.fqn,
            errors = report.error_count(),
            "lowered"
        ),
        UnitOutcome::Failed(error) => {
            tracing::warn!(target: "javelin::cli", path = %path.display(), %error, "unit failed")
        }
        UnitOutcome::Unreadable(error) => {
            tracing::warn!(target: "javelin::cli", path = %path.display(), %error, "unreadable")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use javelin_engine::{FsModuleHost, TargetConfig};
    use std::fs;
    use tempfile::TempDir;

    fn write_sources(root: &Path, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let path = root.join(format!("mod{}.ts", i));
                let next = (i + 1) % count;
                fs::write(
                    &path,
                    format!(
                        "import {{ value{next} }} from \"./mod{next}\";\nexport const value{i}: number = {i};\nexport function read{i}(): number {{\n  return value{next};\n}}\n"
                    ),
                )
                .unwrap();
                path
            })
            .collect()
    }

    fn run_with_jobs(root: &Path, files: &[PathBuf], jobs: usize) -> Vec<(PathBuf, String)> {
        let config = TargetConfig::new("app", "17", root).unwrap();
        let transpiler = Transpiler::new(config, FsModuleHost::new());
        let run = run(files, transpiler, jobs);
        assert!(!run.has_errors());
        let output = run.build.unwrap();
        output.files.into_iter().map(|f| (f.path, f.code)).collect()
    }

    #[test]
    fn test_output_does_not_depend_on_job_count() {
        let temp = TempDir::new().unwrap();
        let files = write_sources(temp.path(), 12);
        let serial = run_with_jobs(temp.path(), &files, 1);
        let parallel = run_with_jobs(temp.path(), &files, 4);
        assert_eq!(serial.len(), 12);
        assert_eq!(serial, parallel);
    }

    #[test]
    fn test_parse_failure_is_isolated_to_its_file() {
        let temp = TempDir::new().unwrap();
        let good = temp.path().join("good.ts");
        let bad = temp.path().join("bad.ts");
        fs::write(&good, "export const ok = 1;\n").unwrap();
        fs::write(&bad, "let = ;\n").unwrap();

        let config = TargetConfig::new("app", "17", temp.path()).unwrap();
        let run = run(
            &[bad.clone(), good.clone()],
            Transpiler::new(config, FsModuleHost::new()),
            2,
        );
        assert!(run.has_errors());
        assert_eq!(run.units[0].path, bad);
        assert!(matches!(run.units[0].outcome, UnitOutcome::Failed(CompileError::Parse { .. })));
        assert!(!run.units[0].diagnostics().is_empty());
        assert!(run.units[0].unlocated_error().is_none());

        let output = run.build.unwrap();
        assert_eq!(output.files.len(), 1);
        assert!(output.files[0].code.contains("public static final int ok;"));
    }

    #[test]
    fn test_unreadable_file_is_reported() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("gone.ts");
        let config = TargetConfig::new("app", "17", temp.path()).unwrap();
        let run = run(&[missing], Transpiler::new(config, FsModuleHost::new()), 1);
        assert!(matches!(run.units[0].outcome, UnitOutcome::Unreadable(_)));
        assert!(run.units[0].unlocated_error().unwrap().starts_with("Failed to read"));
        assert_eq!(run.error_count(), 1);
    }
}
