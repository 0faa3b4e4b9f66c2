//! Terminal output
//!
//! Status lines use `termcolor`; diagnostics are rendered with
//! `codespan-reporting` against the source text they point into. Both
//! respect `NO_COLOR` and `--color`.

use std::io::Write;
use std::path::Path;

use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term::{self, Config};
use javelin_engine::compiler::Diagnostic;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Resolve `ColorChoice` from the `--color` flag and environment.
///
/// Priority: `NO_COLOR` env > `--color` flag > auto-detect TTY.
pub fn resolve_color_choice(flag: Option<&str>) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// Styled status and diagnostic writer. Everything goes to stderr; stdout
/// is reserved for generated code and JSON reports.
pub struct StyledOutput {
    stderr: StandardStream,
    config: Config,
}

impl StyledOutput {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stderr: StandardStream::stderr(choice),
            config: Config::default(),
        }
    }

    fn write_styled(&mut self, text: &str, color: Option<Color>, bold: bool) {
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(bold);
        let _ = self.stderr.set_color(&spec);
        let _ = write!(self.stderr, "{}", text);
        let _ = self.stderr.reset();
    }

    /// `label` in bold green, then `text`.
    pub fn success(&mut self, label: &str, text: &str) {
        self.write_styled(label, Some(Color::Green), true);
        let _ = writeln!(self.stderr, " {}", text);
    }

    /// `error:` in bold red, then `text`.
    pub fn error(&mut self, text: &str) {
        self.write_styled("error", Some(Color::Red), true);
        let _ = writeln!(self.stderr, ": {}", text);
    }

    pub fn warning(&mut self, text: &str) {
        self.write_styled("warning", Some(Color::Yellow), true);
        let _ = writeln!(self.stderr, ": {}", text);
    }

    /// Render diagnostics of one source file.
    pub fn diagnostics(&mut self, path: &Path, source: &str, diagnostics: &[Diagnostic]) {
        let mut lock = self.stderr.lock();
        render_diagnostics(&mut lock, &self.config, path, source, diagnostics);
    }
}

/// Render `diagnostics` as codespan reports. A diagnostic whose span does
/// not fit `source` is written as a single line instead.
pub fn render_diagnostics(
    writer: &mut dyn WriteColor,
    config: &Config,
    path: &Path,
    source: &str,
    diagnostics: &[Diagnostic],
) {
    let mut files = SimpleFiles::new();
    let file_id = files.add(path.display().to_string(), source);
    for diagnostic in diagnostics {
        let fits = diagnostic.span.start <= diagnostic.span.end
            && diagnostic.span.end <= source.len()
            && source.is_char_boundary(diagnostic.span.start)
            && source.is_char_boundary(diagnostic.span.end);
        if !fits || term::emit(writer, config, &files, &diagnostic.to_codespan(file_id)).is_err() {
            let _ = writeln!(writer, "{}", diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use javelin_engine::compiler::Severity;
    use javelin_engine::parser::Span;
    use std::path::PathBuf;
    use termcolor::NoColor;

    fn render(source: &str, diagnostic: Diagnostic) -> String {
        let mut buffer = NoColor::new(Vec::new());
        render_diagnostics(
            &mut buffer,
            &Config::default(),
            Path::new("main.ts"),
            source,
            &[diagnostic],
        );
        String::from_utf8(buffer.into_inner()).unwrap()
    }

    #[test]
    fn test_flag_choice() {
        if std::env::var_os("NO_COLOR").is_some() {
            return;
        }
        assert!(matches!(resolve_color_choice(Some("always")), ColorChoice::Always));
        assert!(matches!(resolve_color_choice(Some("never")), ColorChoice::Never));
        assert!(matches!(resolve_color_choice(None), ColorChoice::Auto));
    }

    #[test]
    fn test_renders_codespan_report() {
        let source = "console.log(missing);\n";
        let diag = Diagnostic::unresolved_identifier("missing", Path::new("main.ts"), Span::new(12, 19, 1, 13));
        let text = render(source, diag);
        assert!(text.contains("error[E1001]: Cannot find name 'missing'"));
        assert!(text.contains("main.ts:1:13"));
        assert!(text.contains("not found in this scope"));
    }

    #[test]
    fn test_out_of_range_span_falls_back_to_one_line() {
        let diag = Diagnostic {
            severity: Severity::Warning,
            code: "W2001".to_string(),
            message: "Cannot find type 'Shape'; using Object".to_string(),
            file: PathBuf::from("main.ts"),
            line: 9,
            column: 1,
            span: Span::new(500, 505, 9, 1),
        };
        let text = render("let x = 1;\n", diag);
        assert_eq!(text, "main.ts:9:1: warning[W2001]: Cannot find type 'Shape'; using Object\n");
    }
}
