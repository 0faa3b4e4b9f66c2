//! `javelin build`: transpile sources and write Java files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use javelin_engine::{BuildOutput, FsModuleHost, Transpiler};

use super::{implied_root, job_count, load_target, pipeline, report, ReportFormat, TargetArgs};
use crate::files::collect_sources;
use crate::output::StyledOutput;

#[derive(Debug, Clone)]
pub struct BuildArgs {
    pub paths: Vec<PathBuf>,
    pub out_dir: PathBuf,
    pub target: TargetArgs,
    pub config: Option<PathBuf>,
    pub sourcemap: bool,
    pub jobs: Option<usize>,
    pub format: ReportFormat,
}

/// Returns whether the build was free of errors.
pub fn execute(args: BuildArgs, out: &mut StyledOutput) -> anyhow::Result<bool> {
    let files = collect_sources(&args.paths)?;
    if files.is_empty() {
        anyhow::bail!("No TypeScript sources found");
    }
    let target = load_target(args.config.as_deref(), args.target, implied_root(&args.paths))?;
    let transpiler = Transpiler::new(target, FsModuleHost::new()).with_source_maps(args.sourcemap);

    let run = pipeline::run(&files, transpiler, job_count(args.jobs));
    let written = match &run.build {
        Ok(output) => write_outputs(&args.out_dir, output)?,
        Err(_) => Vec::new(),
    };

    report(&run, written.iter().map(PathBuf::as_path).collect(), args.format, out)?;
    let success = !run.has_errors();
    if args.format == ReportFormat::Pretty {
        if success {
            out.success(
                "Built",
                &format!("{} file(s) into {}", written.len(), args.out_dir.display()),
            );
        } else {
            out.error(&format!("build failed with {} error(s)", run.error_count()));
        }
    }
    Ok(success)
}

/// Write every generated file (and its source map) below `out_dir`.
/// Returns the written Java paths relative to `out_dir`.
pub fn write_outputs(out_dir: &Path, output: &BuildOutput) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(output.files.len());
    for file in &output.files {
        let target = out_dir.join(&file.path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&target, &file.code)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        if let Some(map) = &file.source_map {
            let map_path = target.with_extension("java.map");
            fs::write(&map_path, map.to_json()?)
                .with_context(|| format!("Failed to write {}", map_path.display()))?;
        }
        tracing::debug!(target: "javelin::cli", path = %target.display(), "wrote");
        written.push(file.path.clone());
    }
    Ok(written)
}
