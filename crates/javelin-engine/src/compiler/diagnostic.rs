//! Non-fatal problems found while lowering
//!
//! Diagnostics are collected per unit and converted to `codespan-reporting`
//! diagnostics for display.

use std::path::{Path, PathBuf};

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, Severity as CsSeverity};
use serde::{Deserialize, Serialize};

use crate::parser::{LexError, ParseError, Span};

/// Error code for a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

/// Identifier that resolves to nothing
pub const UNRESOLVED_IDENTIFIER: ErrorCode = ErrorCode("E1001");
/// Import specifier that resolves to no file
pub const UNRESOLVED_IMPORT: ErrorCode = ErrorCode("W1002");
/// Type name that resolves to nothing; lowered as `Object`
pub const UNKNOWN_TYPE: ErrorCode = ErrorCode("W2001");
/// Lexer failure
pub const LEX_ERROR: ErrorCode = ErrorCode("E0001");
/// Parser failure
pub const PARSE_ERROR: ErrorCode = ErrorCode("E0002");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A located message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
    #[serde(skip)]
    pub span: Span,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        code: ErrorCode,
        message: impl Into<String>,
        file: &Path,
        span: Span,
    ) -> Self {
        Diagnostic {
            severity,
            code: code.0.to_string(),
            message: message.into(),
            file: file.to_path_buf(),
            line: span.line,
            column: span.column,
            span,
        }
    }

    pub fn unresolved_identifier(name: &str, file: &Path, span: Span) -> Self {
        Self::new(
            Severity::Error,
            UNRESOLVED_IDENTIFIER,
            format!("Cannot find name '{}'", name),
            file,
            span,
        )
    }

    pub fn unresolved_import(specifier: &str, file: &Path, span: Span) -> Self {
        Self::new(
            Severity::Warning,
            UNRESOLVED_IMPORT,
            format!("Cannot resolve module '{}'; import dropped", specifier),
            file,
            span,
        )
    }

    pub fn unknown_type(name: &str, file: &Path, span: Span) -> Self {
        Self::new(
            Severity::Warning,
            UNKNOWN_TYPE,
            format!("Cannot find type '{}'; using Object", name),
            file,
            span,
        )
    }

    pub fn from_parse_error(error: &ParseError, file: &Path) -> Self {
        Self::new(Severity::Error, PARSE_ERROR, error.message.clone(), file, error.span)
    }

    pub fn from_lex_error(error: &LexError, file: &Path) -> Self {
        Self::new(Severity::Error, LEX_ERROR, error.to_string(), file, *error.span())
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Convert for rendering with `codespan_reporting::term::emit`.
    pub fn to_codespan(&self, file_id: usize) -> CsDiagnostic<usize> {
        let severity = match self.severity {
            Severity::Error => CsSeverity::Error,
            Severity::Warning => CsSeverity::Warning,
        };
        let label_text = match self.code.as_str() {
            "E1001" => "not found in this scope",
            "W1002" => "unresolved module",
            "W2001" => "type not found",
            _ => "here",
        };
        CsDiagnostic::new(severity)
            .with_message(&self.message)
            .with_code(&self.code)
            .with_labels(vec![
                Label::primary(file_id, self.span.start..self.span.end).with_message(label_text)
            ])
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(
            f,
            "{}:{}:{}: {}[{}]: {}",
            self.file.display(),
            self.line,
            self.column,
            level,
            self.code,
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    #[test]
    fn test_unresolved_identifier() {
        let diag = Diagnostic::unresolved_identifier("foo", Path::new("a.ts"), Span::new(4, 7, 1, 5));
        assert!(diag.is_error());
        assert_eq!(diag.code, "E1001");
        assert_eq!(diag.to_string(), "a.ts:1:5: error[E1001]: Cannot find name 'foo'");
    }

    #[test]
    fn test_codespan_conversion() {
        let diag = Diagnostic::unknown_type("Shape", Path::new("a.ts"), Span::new(10, 15, 2, 3));
        let cs = diag.to_codespan(0);
        assert_eq!(cs.severity, CsSeverity::Warning);
        assert_eq!(cs.code.as_deref(), Some("W2001"));
        assert_eq!(cs.labels[0].range, 10..15);
    }

    #[test]
    fn test_from_parse_error() {
        let errors = Parser::new("let = 1;").unwrap().parse().unwrap_err();
        let diag = Diagnostic::from_parse_error(&errors[0], Path::new("b.ts"));
        assert_eq!(diag.code, "E0002");
        assert_eq!(diag.line, 1);
    }

    #[test]
    fn test_json_omits_span() {
        let diag = Diagnostic::unresolved_import("./gone", Path::new("c.ts"), Span::new(0, 5, 3, 1));
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["line"], 3);
        assert!(json.get("span").is_none());
    }
}
