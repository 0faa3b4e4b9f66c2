//! Javelin engine
//!
//! Lowers a statically typed TypeScript subset to Java source. The
//! [`parser`] module turns source text into an AST; the [`compiler`] module
//! lowers parsed modules into per-unit Java classes and renders them once
//! every unit of a build is known.

pub mod compiler;
pub mod parser;

pub use compiler::{
    BuildOutput, CompileError, FsModuleHost, ModuleHost, OutputFile, TargetConfig, Transpiler,
    UnitReport,
};
