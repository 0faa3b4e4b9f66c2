//! `javelin`: TypeScript subset to Java transpiler

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use javelin_cli::commands::build::{self, BuildArgs};
use javelin_cli::commands::check::{self, CheckArgs};
use javelin_cli::commands::emit::{self, EmitArgs};
use javelin_cli::commands::{ReportFormat, TargetArgs};
use javelin_cli::logging::{init_logging, LogOptions};
use javelin_cli::output::{resolve_color_choice, StyledOutput};

#[derive(Parser)]
#[command(name = "javelin")]
#[command(about = "Transpile a statically typed TypeScript subset to Java", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Log format: text or json
    #[arg(long, global = true, value_name = "FORMAT")]
    log_format: Option<String>,

    /// When to use colors: auto, always, never
    #[arg(long, global = true, value_name = "WHEN")]
    color: Option<String>,

    /// Configuration file (defaults to ./javelin.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug, Clone, Default)]
struct TargetFlags {
    /// Base Java package
    #[arg(long)]
    package: Option<String>,

    /// Target Java release, e.g. 17 or 1.8
    #[arg(long, value_name = "VERSION")]
    java_version: Option<String>,

    /// Directory that maps to the base package
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,
}

impl From<TargetFlags> for TargetArgs {
    fn from(flags: TargetFlags) -> Self {
        TargetArgs {
            package: flags.package,
            java_version: flags.java_version,
            root: flags.root,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Transpile sources and write Java files
    Build {
        /// Files or directories to build
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,
        /// Output directory
        #[arg(short, long, default_value = "out")]
        out_dir: PathBuf,
        #[command(flatten)]
        target: TargetFlags,
        /// Write a .java.map line map next to each generated file
        #[arg(long)]
        sourcemap: bool,
        /// Worker threads for parsing (default: one per CPU)
        #[arg(short, long)]
        jobs: Option<usize>,
        /// Report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Pretty)]
        format: ReportFormat,
    },

    /// Print the Java for a single file
    Emit {
        /// Source file
        file: PathBuf,
        #[command(flatten)]
        target: TargetFlags,
    },

    /// Report diagnostics without writing files
    Check {
        /// Files or directories to check
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,
        #[command(flatten)]
        target: TargetFlags,
        /// Worker threads for parsing (default: one per CPU)
        #[arg(short, long)]
        jobs: Option<usize>,
        /// Report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Pretty)]
        format: ReportFormat,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(LogOptions::resolve(
        cli.log_level.as_deref(),
        cli.log_format.as_deref(),
    ));
    let mut out = StyledOutput::new(resolve_color_choice(cli.color.as_deref()));

    let result = match cli.command {
        Commands::Build {
            paths,
            out_dir,
            target,
            sourcemap,
            jobs,
            format,
        } => build::execute(
            BuildArgs {
                paths,
                out_dir,
                target: target.into(),
                config: cli.config,
                sourcemap,
                jobs,
                format,
            },
            &mut out,
        ),
        Commands::Emit { file, target } => emit::execute(
            EmitArgs {
                file,
                target: target.into(),
                config: cli.config,
            },
            &mut out,
        ),
        Commands::Check {
            paths,
            target,
            jobs,
            format,
        } => check::execute(
            CheckArgs {
                paths,
                target: target.into(),
                config: cli.config,
                jobs,
                format,
            },
            &mut out,
        ),
    };

    match result {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(error) => {
            out.error(&format!("{:#}", error));
            std::process::exit(1);
        }
    }
}
