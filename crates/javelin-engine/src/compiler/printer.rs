//! Deferred text emitter
//!
//! Lowering writes Java source as a flat list of [`Fragment`]s. Most are
//! literal text; [`Deferred`] fragments stand for text that depends on the
//! whole build (a declaration's final name, an inferred type, whether a call
//! needs `.call`) and are resolved by a [`DeferredResolver`] at render time.
//!
//! Separators are explicit: every text fragment carries a [`Glue`] saying
//! whether it is separated from the previous fragment by a space. A deferred
//! fragment that resolves to nothing is skipped, and its glue carries over
//! to the next fragment.

use serde::{Deserialize, Serialize};

use super::decl::DeclId;
use super::types::JavaType;

/// One indentation level
pub const INDENT: &str = "    ";

/// Separation from the preceding fragment on the same line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glue {
    Space,
    Tight,
}

/// What a call suffix is computed from
#[derive(Debug, Clone, PartialEq)]
pub enum CallTarget {
    /// Callee is a name bound to this declaration
    Decl(DeclId),
    /// Callee is `object.member` with `object` of the given type
    Member(JavaType, String),
    /// Callee is any other expression of the given type
    Value(JavaType),
}

/// Position of a fragment inside a lowered `==`/`!=`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EqualityPart {
    /// `Objects.equals(` or nothing
    Open,
    /// `,` or nothing
    Separator,
    /// `==`/`!=` or nothing
    Operator,
    /// `)` or nothing
    Close,
}

/// Text decided at render time
#[derive(Debug, Clone, PartialEq)]
pub enum Deferred {
    /// Current name of a declaration, qualified when it cannot be imported
    Name(DeclId),
    /// `.call` when the callee holds a function interface value
    CallSuffix(CallTarget),
    /// Declared type of a declaration, or `var` when allowed and elidable
    DeclType { decl: DeclId, allow_var: bool },
    /// A type; `boxed` for use as a generic type argument
    Type { ty: JavaType, boxed: bool },
    /// `Owner::name` for a function declaration used as a value
    MethodRef(DeclId),
    /// One part of an equality that becomes `Objects.equals` on strings
    Equality {
        part: EqualityPart,
        left: JavaType,
        right: JavaType,
        negated: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Text { text: String, glue: Glue },
    Newline,
    /// Increase indentation for following lines
    Enter,
    /// Decrease indentation for following lines
    Exit,
    /// The next line is generated from this (1-based) source line
    Mark(u32),
    Deferred { deferred: Deferred, glue: Glue },
}

/// Evaluates deferred fragments during rendering.
pub trait DeferredResolver {
    fn resolve(&self, deferred: &Deferred) -> String;
}

/// Source line a generated line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineMapping {
    pub generated: u32,
    pub original: u32,
}

/// Output of [`Printer::render`]
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub text: String,
    pub mappings: Vec<LineMapping>,
}

/// Fragment buffer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Printer {
    fragments: Vec<Fragment>,
}

impl Printer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text separated from the previous fragment by a space.
    pub fn write(&mut self, text: impl Into<String>) {
        self.push_text(text.into(), Glue::Space);
    }

    /// Text joined directly to the previous fragment.
    pub fn write_tight(&mut self, text: impl Into<String>) {
        self.push_text(text.into(), Glue::Tight);
    }

    /// Start a new line, then write `text` if given.
    pub fn writeln(&mut self, text: Option<&str>) {
        self.fragments.push(Fragment::Newline);
        if let Some(text) = text {
            self.write(text);
        }
    }

    pub fn write_deferred(&mut self, deferred: Deferred) {
        self.fragments.push(Fragment::Deferred {
            deferred,
            glue: Glue::Space,
        });
    }

    pub fn write_deferred_tight(&mut self, deferred: Deferred) {
        self.fragments.push(Fragment::Deferred {
            deferred,
            glue: Glue::Tight,
        });
    }

    pub fn enter_closure(&mut self) {
        self.fragments.push(Fragment::Enter);
    }

    pub fn exit_closure(&mut self) {
        self.fragments.push(Fragment::Exit);
    }

    /// Map the next generated line to `line` of the source.
    pub fn mark(&mut self, line: u32) {
        self.fragments.push(Fragment::Mark(line));
    }

    /// `(p1, p2, ...)` joined tightly to the preceding name.
    pub fn write_params(&mut self, params: Vec<Printer>) {
        self.write_list(params);
    }

    /// `(a1, a2, ...)` joined tightly to the preceding callee.
    pub fn write_arguments(&mut self, args: Vec<Printer>) {
        self.write_list(args);
    }

    fn write_list(&mut self, items: Vec<Printer>) {
        self.write_tight("(");
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                self.write_tight(",");
                self.append_glued(item, Glue::Space);
            } else {
                self.append_glued(item, Glue::Tight);
            }
        }
        self.write_tight(")");
    }

    /// ` { ... }` around `body`, or ` {}` when it holds no statements.
    pub fn write_body(&mut self, body: Printer) {
        self.write("{");
        if body.is_empty() {
            self.write_tight("}");
            return;
        }
        self.enter_closure();
        self.append(body);
        self.exit_closure();
        self.writeln(Some("}"));
    }

    /// Splice another printer's fragments.
    pub fn append(&mut self, other: Printer) {
        self.fragments.extend(other.fragments);
    }

    /// Splice `other`, overriding the glue of its first text.
    pub fn append_glued(&mut self, mut other: Printer, glue: Glue) {
        other.set_leading_glue(glue);
        self.append(other);
    }

    /// Splice `other` joined directly to what precedes it.
    pub fn append_tight(&mut self, other: Printer) {
        self.append_glued(other, Glue::Tight);
    }

    /// Override the glue of the first text or deferred fragment.
    pub fn set_leading_glue(&mut self, new_glue: Glue) {
        for fragment in &mut self.fragments {
            match fragment {
                Fragment::Text { glue, .. } | Fragment::Deferred { glue, .. } => {
                    *glue = new_glue;
                    return;
                }
                _ => {}
            }
        }
    }

    /// True when nothing but layout fragments were written.
    pub fn is_empty(&self) -> bool {
        !self
            .fragments
            .iter()
            .any(|f| matches!(f, Fragment::Text { .. } | Fragment::Deferred { .. }))
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Visit every deferred fragment in order.
    pub fn deferred(&self) -> impl Iterator<Item = &Deferred> {
        self.fragments.iter().filter_map(|f| match f {
            Fragment::Deferred { deferred, .. } => Some(deferred),
            _ => None,
        })
    }

    fn push_text(&mut self, text: String, glue: Glue) {
        if !text.is_empty() {
            self.fragments.push(Fragment::Text { text, glue });
        }
    }

    /// Produce the final text. Does not modify the printer.
    pub fn render(&self, resolver: &impl DeferredResolver) -> Rendered {
        let mut state = RenderState::default();
        for fragment in &self.fragments {
            match fragment {
                Fragment::Text { text, glue } => state.emit(text, *glue),
                Fragment::Deferred { deferred, glue } => {
                    let text = resolver.resolve(deferred);
                    if text.is_empty() {
                        state.pending_space |= *glue == Glue::Space;
                    } else {
                        state.emit(&text, *glue);
                    }
                }
                Fragment::Newline => state.newline(),
                Fragment::Enter => state.indent.push_str(INDENT),
                Fragment::Exit => {
                    let len = state.indent.len().saturating_sub(INDENT.len());
                    state.indent.truncate(len);
                }
                Fragment::Mark(original) => state.mark(*original),
            }
        }
        Rendered {
            text: state.out,
            mappings: state.mappings,
        }
    }
}

struct RenderState {
    out: String,
    indent: String,
    at_line_start: bool,
    pending_space: bool,
    line: u32,
    mappings: Vec<LineMapping>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            out: String::new(),
            indent: String::new(),
            at_line_start: true,
            pending_space: false,
            line: 1,
            mappings: Vec::new(),
        }
    }
}

impl RenderState {
    fn emit(&mut self, text: &str, glue: Glue) {
        if self.at_line_start {
            self.out.push_str(&self.indent);
            self.at_line_start = false;
        } else if (glue == Glue::Space || self.pending_space) && !self.out.is_empty() {
            self.out.push(' ');
        }
        self.pending_space = false;
        self.out.push_str(text);
        self.line += text.matches('\n').count() as u32;
    }

    fn newline(&mut self) {
        self.out.push('\n');
        self.line += 1;
        self.at_line_start = true;
        self.pending_space = false;
    }

    fn mark(&mut self, original: u32) {
        match self.mappings.last_mut() {
            Some(last) if last.generated == self.line => last.original = original,
            _ => self.mappings.push(LineMapping {
                generated: self.line,
                original,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl DeferredResolver for Fixed {
        fn resolve(&self, deferred: &Deferred) -> String {
            match deferred {
                Deferred::Name(id) => format!("n{}", id.0),
                Deferred::CallSuffix(_) => ".call".to_string(),
                _ => String::new(),
            }
        }
    }

    fn statement(text: &str) -> Printer {
        let mut p = Printer::new();
        p.writeln(Some(text));
        p
    }

    #[test]
    fn test_space_and_tight() {
        let mut p = Printer::new();
        p.write("int");
        p.write("x");
        p.write("=");
        p.write("1");
        p.write_tight(";");
        assert_eq!(p.render(&Fixed).text, "int x = 1;");
    }

    #[test]
    fn test_empty_body_is_braces() {
        let mut p = Printer::new();
        p.write("void");
        p.write("run");
        p.write_params(vec![]);
        p.write_body(Printer::new());
        assert_eq!(p.render(&Fixed).text, "void run() {}");
    }

    #[test]
    fn test_body_indentation() {
        let mut inner = Printer::new();
        inner.write("if");
        inner.write_tight("");
        inner.write("(x)");
        let mut nested = statement("a();");
        nested.append(statement("b();"));
        inner.write_body(nested);

        let mut body = Printer::new();
        body.writeln(None);
        body.append(inner);

        let mut p = Printer::new();
        p.write("class");
        p.write("A");
        p.write_body(body);
        assert_eq!(
            p.render(&Fixed).text,
            "class A {\n    if (x) {\n        a();\n        b();\n    }\n}"
        );
    }

    #[test]
    fn test_arguments_and_deferred() {
        let mut arg = Printer::new();
        arg.write("1");
        let mut arg2 = Printer::new();
        arg2.write_deferred(Deferred::Name(DeclId(2)));

        let mut p = Printer::new();
        p.write_deferred(Deferred::Name(DeclId(1)));
        p.write_deferred_tight(Deferred::CallSuffix(CallTarget::Decl(DeclId(1))));
        p.write_arguments(vec![arg, arg2]);
        assert_eq!(p.render(&Fixed).text, "n1.call(1, n2)");
    }

    #[test]
    fn test_skipped_deferred_passes_space_on() {
        let mut operand = Printer::new();
        operand.write("a");

        let mut p = Printer::new();
        p.write("x");
        p.write("=");
        p.write_deferred(Deferred::Type {
            ty: JavaType::int(),
            boxed: false,
        });
        p.append_tight(operand);
        assert_eq!(p.render(&Fixed).text, "x = a");
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut p = statement("a();");
        p.write_deferred(Deferred::Name(DeclId(0)));
        let first = p.render(&Fixed);
        assert_eq!(first, p.render(&Fixed));
    }

    #[test]
    fn test_blank_lines_have_no_indent() {
        let mut body = statement("a();");
        body.writeln(None);
        body.append(statement("b();"));
        let mut p = Printer::new();
        p.write("{");
        p.enter_closure();
        p.append(body);
        p.exit_closure();
        p.writeln(Some("}"));
        assert_eq!(p.render(&Fixed).text, "{\n    a();\n\n    b();\n}");
    }

    #[test]
    fn test_marks_map_generated_lines() {
        let mut p = Printer::new();
        p.write("class A {");
        p.writeln(None);
        p.mark(3);
        p.write("x();");
        p.writeln(None);
        p.mark(4);
        p.mark(5);
        p.write("y();");
        let rendered = p.render(&Fixed);
        assert_eq!(
            rendered.mappings,
            vec![
                LineMapping { generated: 2, original: 3 },
                LineMapping { generated: 3, original: 5 },
            ]
        );
    }
}
