//! Subcommand implementations

pub mod build;
pub mod check;
pub mod emit;
pub mod pipeline;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::ValueEnum;
use javelin_engine::compiler::config::{ConfigFile, TargetSection, VersionValue, CONFIG_FILE_NAME};
use javelin_engine::compiler::Diagnostic;
use javelin_engine::TargetConfig;
use serde::Serialize;

use crate::output::StyledOutput;
use pipeline::PipelineRun;

/// How `build` and `check` report results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// Rendered diagnostics on stderr
    #[default]
    Pretty,
    /// One JSON document on stdout
    Json,
}

/// Machine-readable summary of a run
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub success: bool,
    /// Files written, relative to the output directory
    pub files: Vec<&'a Path>,
    pub diagnostics: Vec<Diagnostic>,
    /// Failures without a source location
    pub errors: Vec<String>,
}

impl<'a> Report<'a> {
    pub fn new(run: &'a PipelineRun, files: Vec<&'a Path>) -> Self {
        let mut errors: Vec<String> = run.units.iter().filter_map(|u| u.unlocated_error()).collect();
        if let Err(error) = &run.build {
            errors.push(error.to_string());
        }
        Report {
            success: !run.has_errors(),
            files,
            diagnostics: run.units.iter().flat_map(|u| u.diagnostics()).collect(),
            errors,
        }
    }
}

/// Print diagnostics and failures of `run` in `format`.
pub fn report(
    run: &PipelineRun,
    files: Vec<&Path>,
    format: ReportFormat,
    out: &mut StyledOutput,
) -> anyhow::Result<()> {
    match format {
        ReportFormat::Json => {
            let report = Report::new(run, files);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        ReportFormat::Pretty => {
            for unit in &run.units {
                let diagnostics = unit.diagnostics();
                if !diagnostics.is_empty() {
                    out.diagnostics(&unit.path, &unit.source, &diagnostics);
                }
                if let Some(error) = unit.unlocated_error() {
                    out.error(&error);
                }
            }
            if let Err(error) = &run.build {
                out.error(&error.to_string());
            }
        }
    }
    Ok(())
}

/// `[target]` values given on the command line
#[derive(Debug, Clone, Default)]
pub struct TargetArgs {
    pub package: Option<String>,
    pub java_version: Option<String>,
    pub root: Option<PathBuf>,
}

impl TargetArgs {
    fn into_section(self) -> TargetSection {
        TargetSection {
            package: self.package,
            java_version: self.java_version.map(VersionValue::Text),
            source_root: self.root,
        }
    }
}

/// Build the target configuration.
///
/// Reads `config` when given, else `javelin.toml` in the working directory
/// if there is one. Flags override file values; `fallback_root` is used
/// when neither names a source root.
pub fn load_target(
    config: Option<&Path>,
    args: TargetArgs,
    fallback_root: Option<&Path>,
) -> anyhow::Result<TargetConfig> {
    let file = match config {
        Some(path) => Some(
            ConfigFile::from_file(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
        ),
        None => {
            let default = Path::new(CONFIG_FILE_NAME);
            if default.is_file() {
                Some(ConfigFile::from_file(default)?)
            } else {
                None
            }
        }
    };
    if file.is_some() {
        tracing::debug!(target: "javelin::cli", "loaded configuration file");
    }
    let mut section = file.unwrap_or_default().target.merged(args.into_section());
    if section.source_root.is_none() {
        section.source_root = fallback_root.map(Path::to_path_buf);
    }
    let target = TargetConfig::from_section(&section)?;
    tracing::debug!(
        target: "javelin::cli",
        package = %target.base_package,
        java_version = target.java_version,
        source_root = %target.source_root.display(),
        "target configuration"
    );
    Ok(target)
}

/// Source root implied by the inputs: the directory itself when exactly
/// one directory is given.
pub fn implied_root(paths: &[PathBuf]) -> Option<&Path> {
    match paths {
        [only] if only.is_dir() => Some(only.as_path()),
        _ => None,
    }
}

/// Worker count for `--jobs`; zero or absent means one per CPU.
pub fn job_count(jobs: Option<usize>) -> usize {
    match jobs {
        Some(n) if n > 0 => n,
        _ => num_cpus::get().max(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_flags_override_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("javelin.toml");
        fs::write(
            &path,
            "[target]\npackage = \"com.example\"\njava-version = 11\nsource-root = \"src\"\n",
        )
        .unwrap();

        let target = load_target(
            Some(&path),
            TargetArgs {
                java_version: Some("1.8".to_string()),
                ..TargetArgs::default()
            },
            Some(Path::new("elsewhere")),
        )
        .unwrap();
        assert_eq!(target.base_package, "com.example");
        assert_eq!(target.java_version, 8);
        assert_eq!(target.source_root, temp.path().join("src"));
    }

    #[test]
    fn test_invalid_package_is_fatal() {
        let err = load_target(
            None,
            TargetArgs {
                package: Some("com.class".to_string()),
                root: Some(PathBuf::from(".")),
                ..TargetArgs::default()
            },
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid package name"));
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");
        assert!(load_target(Some(&missing), TargetArgs::default(), None).is_err());
    }

    #[test]
    fn test_fallback_root_fills_gap() {
        let temp = TempDir::new().unwrap();
        let target = load_target(None, TargetArgs::default(), Some(temp.path())).unwrap();
        assert_eq!(target.source_root, temp.path());
        assert_eq!(target.base_package, "app");
        assert_eq!(implied_root(&[temp.path().to_path_buf()]), Some(temp.path()));
        assert_eq!(implied_root(&[]), None);
    }

    #[test]
    fn test_job_count() {
        assert_eq!(job_count(Some(3)), 3);
        assert!(job_count(Some(0)) >= 1);
        assert!(job_count(None) >= 1);
    }
}
