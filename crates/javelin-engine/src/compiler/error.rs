//! Compiler errors
//!
//! Fatal conditions only. Recoverable problems (unresolved identifiers,
//! unknown types, dropped imports) are reported as
//! [`Diagnostic`](super::diagnostic::Diagnostic)s on the unit instead.

use std::path::PathBuf;

use thiserror::Error;

use super::config::ConfigError;
use crate::parser::{LexError, ParseError};

/// Errors that abort lowering of a unit or the whole build
#[derive(Debug, Error)]
pub enum CompileError {
    /// The source could not be tokenized
    #[error("Lexer error in {}: {}", path.display(), first_message(errors))]
    Lex { path: PathBuf, errors: Vec<LexError> },

    /// The source could not be parsed
    #[error("Parse error in {}: {}", path.display(), first_message(errors))]
    Parse { path: PathBuf, errors: Vec<ParseError> },

    /// A unit was submitted for lowering after the build was finalized
    #[error("Unit {unit} is already finalized")]
    UnitFinalized { unit: String },

    /// Two source files map to the same Java class
    #[error("Unit {unit} was already lowered from {}", first.display())]
    DuplicateUnit { unit: String, first: PathBuf },

    /// An import could not be followed to a declaration at finalization
    #[error("Unit {unit} imports `{name}` from {target}, which does not provide it")]
    DanglingImport {
        unit: String,
        target: String,
        name: String,
    },

    /// Invalid target configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for compiler operations
pub type CompileResult<T> = Result<T, CompileError>;

fn first_message<E: std::fmt::Display>(errors: &[E]) -> String {
    match errors {
        [] => "unknown error".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    #[test]
    fn test_parse_error_message_counts_rest() {
        let errors = Parser::new("let = 1;\nlet = 2;").unwrap().parse().unwrap_err();
        let err = CompileError::Parse {
            path: PathBuf::from("src/a.ts"),
            errors,
        };
        let message = err.to_string();
        assert!(message.starts_with("Parse error in src/a.ts:"));
        assert!(message.ends_with("(and 1 more)"));
    }

    #[test]
    fn test_dangling_import_message() {
        let err = CompileError::DanglingImport {
            unit: "app.Main".to_string(),
            target: "app.Util".to_string(),
            name: "helper".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unit app.Main imports `helper` from app.Util, which does not provide it"
        );
    }
}
