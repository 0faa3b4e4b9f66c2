//! Java lowering
//!
//! The compiler works in two phases:
//!
//! 1. **Lowering** ([`lower`]): each parsed module becomes a
//!    [`unit::CompilationUnit`] whose output is a tree of [`printer::Printer`]
//!    fragments. Anything that depends on other units (imported names,
//!    inferred types, whether a call needs `.call`) is recorded as a
//!    [`printer::Deferred`] fragment instead of being decided immediately.
//! 2. **Finalization** ([`finalize`]): once every unit is lowered, a
//!    resolution pass resolves deferred types, synthesizes function
//!    interfaces and builds each unit's import table; a pure render pass
//!    then produces the Java text.
//!
//! [`build::Transpiler`] drives both phases.

pub mod build;
pub mod config;
pub mod context;
pub mod decl;
pub mod diagnostic;
pub mod error;
pub mod finalize;
pub mod imports;
pub mod interfaces;
pub mod lower;
pub mod printer;
pub mod resolver;
pub mod scope;
pub mod types;
pub mod unit;

pub use build::{
    parse_unit, BuildOutput, FsModuleHost, ModuleHost, OutputFile, SourceMap, Transpiler,
    UnitReport,
};
pub use config::{ConfigError, TargetConfig};
pub use context::BuildContext;
pub use decl::{DeclArena, DeclId, DeclKind, Declaration};
pub use diagnostic::{Diagnostic, Severity};
pub use error::{CompileError, CompileResult};
pub use interfaces::InterfaceRegistry;
pub use printer::{Deferred, DeferredResolver, Printer};
pub use scope::{ScopeId, ScopeKind, ScopeTree};
pub use types::{FunctionType, JavaType, Primitive};
pub use unit::{CompilationUnit, UnitRegistry, UnitState};
