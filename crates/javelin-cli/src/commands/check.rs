//! `javelin check`: lower and finalize without writing anything.

use std::path::PathBuf;

use javelin_engine::{FsModuleHost, Transpiler};

use super::{implied_root, job_count, load_target, pipeline, report, ReportFormat, TargetArgs};
use crate::files::collect_sources;
use crate::output::StyledOutput;

#[derive(Debug, Clone)]
pub struct CheckArgs {
    pub paths: Vec<PathBuf>,
    pub target: TargetArgs,
    pub config: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub format: ReportFormat,
}

/// Returns whether every unit lowered without errors.
pub fn execute(args: CheckArgs, out: &mut StyledOutput) -> anyhow::Result<bool> {
    let files = collect_sources(&args.paths)?;
    if files.is_empty() {
        anyhow::bail!("No TypeScript sources found");
    }
    let target = load_target(args.config.as_deref(), args.target, implied_root(&args.paths))?;
    let run = pipeline::run(&files, Transpiler::new(target, FsModuleHost::new()), job_count(args.jobs));

    report(&run, Vec::new(), args.format, out)?;
    let success = !run.has_errors();
    if args.format == ReportFormat::Pretty {
        if success {
            out.success("Checked", &format!("{} file(s)", files.len()));
        } else {
            out.error(&format!("check failed with {} error(s)", run.error_count()));
        }
    }
    Ok(success)
}
