//! Statement lowering

use crate::parser::ast::{
    BlockStatement, Expression, ForInit, ForOfStatement, ForStatement, FunctionDecl, IfStatement,
    Statement, SwitchStatement, ThrowStatement, TryStatement, VariableDecl, VariableDeclarator,
};

use super::expr::{parenthesized, LambdaBody, LambdaParts};
use super::{Export, Lowerer};
use crate::compiler::decl::{DeclId, DeclKind, Placement};
use crate::compiler::interfaces::CALL_METHOD;
use crate::compiler::printer::{Deferred, Printer};
use crate::compiler::resolver::{Builtin, Resolved};
use crate::compiler::scope::ScopeKind;
use crate::compiler::types::{JavaType, Primitive};

/// A new line mapped to `line` of the source.
fn statement_start(line: u32) -> Printer {
    let mut p = Printer::new();
    p.writeln(None);
    p.mark(line);
    p
}

impl<'a> Lowerer<'a> {
    pub(super) fn lower_statements(&mut self, statements: &[Statement]) -> Printer {
        let mut p = Printer::new();
        for statement in statements {
            p.append(self.lower_statement(statement));
        }
        p
    }

    pub(super) fn lower_statement(&mut self, statement: &Statement) -> Printer {
        match statement {
            Statement::VariableDecl(variable) => self.lower_local_variables(variable),
            Statement::FunctionDecl(function) => self.lower_local_function(function),
            Statement::ClassDecl(class) => {
                let id = self.declare_class(class, Placement::Local, Export::None);
                self.scopes.declare(&class.name.name, id);
                self.hoist_class_members(class, id);
                self.lower_class(class, id)
            }
            Statement::InterfaceDecl(interface) => {
                let id = self.declare_interface(interface, Placement::Local, Export::None);
                self.scopes.declare(&interface.name.name, id);
                self.hoist_interface_members(interface, id);
                self.lower_interface(interface, id)
            }
            Statement::EnumDecl(decl) => {
                let id = self.declare_enum(decl, Placement::Local, Export::None);
                self.scopes.declare(&decl.name.name, id);
                self.lower_enum(decl, id)
            }
            Statement::TypeAliasDecl(alias) => {
                let id = self.declare_type_alias(alias);
                self.scopes.declare(&alias.name.name, id);
                Printer::new()
            }
            Statement::ImportDecl(import) => {
                self.skip("nested import", &import.span);
                Printer::new()
            }
            Statement::ExportDecl(export) => {
                self.skip("nested export", export.span());
                Printer::new()
            }
            Statement::Expression(s) => {
                let expression = self.lower_expr(&s.expression);
                if expression.is_empty() {
                    return expression;
                }
                let mut p = statement_start(s.span.line);
                p.append(expression);
                p.write_tight(";");
                p
            }
            Statement::If(s) => {
                let mut p = statement_start(s.span.line);
                self.write_if_chain(&mut p, s);
                p
            }
            Statement::Switch(s) => self.lower_switch(s),
            Statement::While(s) => {
                let mut p = statement_start(s.span.line);
                p.write("while");
                p.append(parenthesized(self.lower_expr(&s.condition)));
                p.write_body(self.lower_branch(&s.body));
                p
            }
            Statement::DoWhile(s) => {
                let mut p = statement_start(s.span.line);
                p.write("do");
                p.write_body(self.lower_branch(&s.body));
                p.write("while");
                p.append(parenthesized(self.lower_expr(&s.condition)));
                p.write_tight(";");
                p
            }
            Statement::For(s) => self.lower_for(s),
            Statement::ForOf(s) => self.lower_for_of(s),
            Statement::Break(s) => {
                let mut p = statement_start(s.span.line);
                p.write("break");
                if let Some(label) = &s.label {
                    p.write(label.name.clone());
                }
                p.write_tight(";");
                p
            }
            Statement::Continue(s) => {
                let mut p = statement_start(s.span.line);
                p.write("continue");
                if let Some(label) = &s.label {
                    p.write(label.name.clone());
                }
                p.write_tight(";");
                p
            }
            Statement::Return(s) => {
                let mut p = statement_start(s.span.line);
                p.write("return");
                if let Some(value) = &s.value {
                    p.append(self.lower_expr(value));
                    let ty = self.type_of(value);
                    if let Some(frame) = self.functions.last_mut() {
                        if frame.infer_return && frame.returned.is_none() {
                            frame.returned = Some(ty);
                        }
                    }
                }
                p.write_tight(";");
                p
            }
            Statement::Throw(s) => self.lower_throw(s),
            Statement::Try(s) => self.lower_try(s),
            Statement::Labeled(s) => {
                let mut p = statement_start(s.span.line);
                p.write(s.label.name.clone());
                p.write_tight(":");
                p.append(self.lower_statement(&s.body));
                p
            }
            Statement::Block(block) => {
                let mut p = statement_start(block.span.line);
                p.write_body(self.lower_block(block));
                p
            }
            Statement::Empty(_) => Printer::new(),
        }
    }

    /// Statements of a block in their own scope, without braces.
    fn lower_block(&mut self, block: &BlockStatement) -> Printer {
        self.scopes.push_scope(ScopeKind::Block, "");
        let body = self.lower_statements(&block.statements);
        self.scopes.pop_scope();
        body
    }

    /// Body of a control statement; a single statement gets braces too.
    fn lower_branch(&mut self, statement: &Statement) -> Printer {
        match statement {
            Statement::Block(block) => self.lower_block(block),
            other => {
                self.scopes.push_scope(ScopeKind::Block, "");
                let body = self.lower_statement(other);
                self.scopes.pop_scope();
                body
            }
        }
    }

    fn write_if_chain(&mut self, p: &mut Printer, s: &IfStatement) {
        p.write("if");
        p.append(parenthesized(self.lower_expr(&s.condition)));
        p.write_body(self.lower_branch(&s.then_branch));
        if let Some(otherwise) = &s.else_branch {
            p.write("else");
            match otherwise.as_ref() {
                Statement::If(nested) => self.write_if_chain(p, nested),
                other => p.write_body(self.lower_branch(other)),
            }
        }
    }

    /// Whether a local declared by `declarator` may be written as `var`.
    fn var_elidable(&self, declarator: &VariableDeclarator) -> bool {
        if !self.ctx.config.allows_var() || declarator.type_annotation.is_some() {
            return false;
        }
        match &declarator.initializer {
            None | Some(Expression::Null(_)) => false,
            Some(Expression::Identifier(ident)) => !matches!(
                self.resolve(&ident.name),
                Some(Resolved::Builtin(Builtin::Undefined))
            ),
            Some(_) => true,
        }
    }

    /// Lower the initializer of a local and declare it. The initializer is
    /// lowered before the name is bound.
    fn declare_local(&mut self, declarator: &VariableDeclarator) -> Option<(DeclId, Printer)> {
        let ident = match declarator.pattern.as_identifier() {
            Some(ident) => ident,
            None => {
                self.skip("destructuring declaration", &declarator.span);
                return None;
            }
        };
        let annotated = declarator
            .type_annotation
            .as_ref()
            .map(|a| self.annotation_type(a));
        let value = declarator
            .initializer
            .as_ref()
            .map(|init| self.lower_initializer(init, annotated.as_ref()));
        let ty = match (annotated, &declarator.initializer) {
            (Some(ty), _) => ty,
            (None, Some(init)) => self.type_of(init),
            (None, None) => JavaType::object(),
        };
        let mut decl = self
            .new_decl(&ident.name, DeclKind::Variable, ty, ident.span)
            .with_placement(Placement::Local);
        decl.annotated = declarator.type_annotation.is_some();
        decl.has_initializer = declarator.initializer.is_some();
        let id = self.alloc(decl);
        self.scopes.declare(&ident.name, id);

        let mut p = Printer::new();
        p.write_deferred(Deferred::Name(id));
        if let Some(value) = value {
            p.write("=");
            p.append(value);
        }
        Some((id, p))
    }

    /// One Java declaration statement per declarator.
    fn lower_local_variables(&mut self, variable: &VariableDecl) -> Printer {
        let mut p = Printer::new();
        for declarator in &variable.declarations {
            let allow_var = self.var_elidable(declarator);
            if let Some((id, binding)) = self.declare_local(declarator) {
                p.append(statement_start(declarator.span.line));
                p.write_deferred(Deferred::DeclType {
                    decl: id,
                    allow_var,
                });
                p.append(binding);
                p.write_tight(";");
            }
        }
        p
    }

    /// `int i = 0, j = 1` inside a `for` header; the first declarator's
    /// type is shared.
    fn lower_for_declaration(&mut self, variable: &VariableDecl) -> Printer {
        let single = variable.declarations.len() == 1;
        let mut p = Printer::new();
        let mut first = true;
        for declarator in &variable.declarations {
            let allow_var = single && self.var_elidable(declarator);
            if let Some((id, binding)) = self.declare_local(declarator) {
                if first {
                    p.write_deferred(Deferred::DeclType {
                        decl: id,
                        allow_var,
                    });
                    first = false;
                } else {
                    p.write_tight(",");
                }
                p.append(binding);
            }
        }
        p
    }

    /// Local function: a value stored in a variable typed by its function
    /// interface. A lambda cannot refer to the variable it initializes, so a
    /// function that calls itself becomes an anonymous class whose `call`
    /// recurses through `this`.
    fn lower_local_function(&mut self, function: &FunctionDecl) -> Printer {
        let ty = self.signature_type(
            function.type_params.as_deref(),
            &function.params,
            function.return_type.as_ref(),
            Some(&function.body),
        );
        let name = &function.name.name;
        let decl = self
            .new_decl(name, DeclKind::Lambda, ty.clone(), function.name.span)
            .with_placement(Placement::Local);
        let id = self.alloc(decl);
        self.scopes.declare(name, id);

        // Inside its own body the function is the anonymous instance.
        self.scopes.push_scope(ScopeKind::Block, "");
        let this = self
            .new_decl("this", DeclKind::Lambda, ty, function.name.span)
            .with_placement(Placement::Local);
        let this = self.alloc(this);
        self.scopes.declare(name, this);
        let lowered = self.lower_lambda_parts(LambdaParts {
            type_params: function.type_params.as_deref(),
            params: &function.params,
            return_type: function.return_type.as_ref(),
            body: LambdaBody::Block(&function.body),
            span: function.span,
        });
        self.scopes.pop_scope();
        self.set_type(id, lowered.ty.clone());
        self.set_type(this, lowered.ty.clone());

        let recursive = lowered
            .body
            .deferred()
            .any(|deferred| matches!(deferred, Deferred::Name(used) if *used == this));

        let mut p = statement_start(function.span.line);
        p.write_deferred(Deferred::DeclType {
            decl: id,
            allow_var: false,
        });
        p.write_deferred(Deferred::Name(id));
        p.write("=");
        if recursive {
            tracing::trace!(
                target: "javelin::lower",
                name = name.as_str(),
                "recursive local function lowered to an anonymous class"
            );
            let mut call = Printer::new();
            call.writeln(None);
            call.mark(function.span.line);
            call.write("public");
            call.write_deferred(Deferred::Type {
                ty: JavaType::return_of(lowered.ty.clone()),
                boxed: false,
            });
            call.write(CALL_METHOD);
            call.write_params(lowered.params.iter().map(|id| Self::param_printer(*id)).collect());
            call.write_body(lowered.body);

            p.write("new");
            p.write_deferred(Deferred::Type {
                ty: lowered.ty,
                boxed: false,
            });
            p.write_tight("()");
            p.write_body(call);
        } else {
            p.append(Self::lambda_printer(lowered));
        }
        p.write_tight(";");
        p
    }

    fn lower_for(&mut self, s: &ForStatement) -> Printer {
        self.scopes.push_scope(ScopeKind::Block, "");
        let mut header = Printer::new();
        match &s.init {
            Some(ForInit::VariableDecl(variable)) => {
                header.append(self.lower_for_declaration(variable))
            }
            Some(ForInit::Expression(e)) => header.append(self.lower_expr(e)),
            None => {}
        }
        header.write_tight(";");
        if let Some(test) = &s.test {
            header.append(self.lower_expr(test));
        }
        header.write_tight(";");
        if let Some(update) = &s.update {
            header.append(self.lower_expr(update));
        }

        let mut p = statement_start(s.span.line);
        p.write("for");
        p.write("(");
        p.append_tight(header);
        p.write_tight(")");
        p.write_body(self.lower_branch(&s.body));
        self.scopes.pop_scope();
        p
    }

    /// `for (T x : items)`
    fn lower_for_of(&mut self, s: &ForOfStatement) -> Printer {
        let items = self.lower_expr(&s.right);
        let element = JavaType::element_of(self.type_of(&s.right));
        self.scopes.push_scope(ScopeKind::Block, "");

        let ident = match s.pattern.as_identifier() {
            Some(ident) => ident,
            None => {
                self.skip("destructuring loop variable", s.pattern.span());
                self.scopes.pop_scope();
                return Printer::new();
            }
        };
        let ty = match &s.type_annotation {
            Some(annotation) => self.annotation_type(annotation),
            None => element,
        };
        let mut decl = self
            .new_decl(&ident.name, DeclKind::Variable, ty, ident.span)
            .with_placement(Placement::Local);
        decl.annotated = s.type_annotation.is_some();
        let id = self.alloc(decl);
        self.scopes.declare(&ident.name, id);

        let mut p = statement_start(s.span.line);
        p.write("for");
        p.write("(");
        p.write_deferred_tight(Deferred::DeclType {
            decl: id,
            allow_var: self.ctx.config.allows_var() && s.type_annotation.is_none(),
        });
        p.write_deferred(Deferred::Name(id));
        p.write(":");
        p.append(items);
        p.write_tight(")");
        p.write_body(self.lower_branch(&s.body));
        self.scopes.pop_scope();
        p
    }

    fn lower_switch(&mut self, s: &SwitchStatement) -> Printer {
        let discriminant = parenthesized(self.lower_expr(&s.discriminant));
        let mut p = statement_start(s.span.line);
        p.write("switch");
        if self
            .eager_type(&s.discriminant)
            .is_primitive(Primitive::Double)
        {
            p.write("(");
            p.write_tight("(int)");
            p.append(discriminant);
            p.write_tight(")");
        } else {
            p.append(discriminant);
        }

        self.scopes.push_scope(ScopeKind::Block, "");
        let mut cases = Printer::new();
        for case in &s.cases {
            cases.writeln(None);
            cases.mark(case.span.line);
            match &case.test {
                Some(test) => {
                    cases.write("case");
                    cases.append(self.lower_expr(test));
                    cases.write_tight(":");
                }
                None => cases.write("default:"),
            }
            let body = self.lower_statements(&case.consequent);
            if !body.is_empty() {
                cases.enter_closure();
                cases.append(body);
                cases.exit_closure();
            }
        }
        self.scopes.pop_scope();
        p.write_body(cases);
        p
    }

    /// Thrown strings and other plain values are wrapped in a
    /// `RuntimeException`.
    fn lower_throw(&mut self, s: &ThrowStatement) -> Printer {
        let value = self.lower_expr(&s.value);
        let mut p = statement_start(s.span.line);
        p.write("throw");
        match self.eager_type(&s.value) {
            JavaType::Primitive(primitive) => {
                p.write("new");
                p.write(Builtin::Error.java_text());
                let argument = if primitive == Primitive::String {
                    value
                } else {
                    let mut wrapped = Printer::new();
                    wrapped.write(Builtin::String.java_text());
                    wrapped.write_arguments(vec![value]);
                    wrapped
                };
                p.write_arguments(vec![argument]);
            }
            _ => p.append(value),
        }
        p.write_tight(";");
        p
    }

    fn lower_try(&mut self, s: &TryStatement) -> Printer {
        let mut p = statement_start(s.span.line);
        p.write("try");
        p.write_body(self.lower_block(&s.body));

        if let Some(catch) = &s.catch_clause {
            self.scopes.push_scope(ScopeKind::Block, "");
            let name = match catch.param.as_ref() {
                Some(pattern) => match pattern.as_identifier() {
                    Some(ident) => ident.name.clone(),
                    None => {
                        self.skip("destructuring catch binding", pattern.span());
                        "ignored".to_string()
                    }
                },
                None => "ignored".to_string(),
            };
            let exception = JavaType::library("Exception", None, Vec::new());
            let decl = self
                .new_decl(&name, DeclKind::Variable, exception, catch.span)
                .with_placement(Placement::Local);
            let id = self.alloc(decl);
            self.scopes.declare(&name, id);

            p.write("catch");
            p.write("(");
            p.write_tight("Exception");
            p.write_deferred(Deferred::Name(id));
            p.write_tight(")");
            p.write_body(self.lower_statements(&catch.body.statements));
            self.scopes.pop_scope();
        }

        if let Some(finally) = &s.finally_clause {
            p.write("finally");
            p.write_body(self.lower_block(finally));
        }
        p
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use crate::compiler::build::ModuleHost;
    use crate::compiler::config::TargetConfig;
    use crate::compiler::context::BuildContext;
    use crate::compiler::finalize::finalize_build;
    use crate::compiler::lower::Lowerer;
    use crate::compiler::unit::UnitIdentity;
    use crate::parser::Parser;

    struct NoModules;

    impl ModuleHost for NoModules {
        fn resolve_specifier(&self, _specifier: &str, _from: &Path) -> Option<PathBuf> {
            None
        }
    }

    fn emit_with(config: TargetConfig, source: &str) -> String {
        let mut ctx = BuildContext::new(config);
        let path = Path::new("main.ts");
        let identity = UnitIdentity::from_path(path, &ctx.config);
        let module = Parser::new(source).unwrap().parse().unwrap();
        let unit = Lowerer::new(&mut ctx, &NoModules, path, identity).lower_module(&module);
        ctx.units.insert(unit);
        let (units, _) = finalize_build(&mut ctx).unwrap();
        units[0].code.clone()
    }

    fn emit(source: &str) -> String {
        emit_with(TargetConfig::default(), source)
    }

    #[test]
    fn test_local_variables_use_var() {
        let code = emit("function f(): void { let a = 1; let b: number = 2; let c; }\n");
        assert!(code.contains("var a = 1;"));
        assert!(code.contains("double b = 2;"));
        assert!(code.contains("Object c;"));
    }

    #[test]
    fn test_locals_are_typed_before_java_10() {
        let mut config = TargetConfig::default();
        config.java_version = 8;
        let code = emit_with(config, "function f(): void { let a = 1.5; }\n");
        assert!(code.contains("double a = 1.5;"));
    }

    #[test]
    fn test_if_else_chain() {
        let code = emit(
            "function sign(x: number): number {\n  if (x > 0) { return 1; } else if (x < 0) { return -1; } else { return 0; }\n}\n",
        );
        assert!(code.contains("if (x > 0) {"));
        assert!(code.contains("} else if (x < 0) {"));
        assert!(code.contains("} else {"));
        assert!(code.contains("return -1;"));
    }

    #[test]
    fn test_loops() {
        let code = emit(
            "function f(xs: number[]): void {\n  for (let i = 0; i < 3; i++) { console.log(i); }\n  for (const x of xs) { console.log(x); }\n  while (false) {}\n}\n",
        );
        assert!(code.contains("for (var i = 0; i < 3; i++) {"));
        assert!(code.contains("for (var x : xs) {"));
        assert!(code.contains("System.out.println(x);"));
        assert!(code.contains("while (false) {}"));
    }

    #[test]
    fn test_labeled_break_and_continue_keep_their_label() {
        let code = emit(
            "function f(): void {\n  outer: for (let i = 0; i < 3; i++) {\n    for (let j = 0; j < 3; j++) {\n      if (j == 1) break outer;\n      if (j == 2) continue outer;\n    }\n  }\n}\n",
        );
        assert!(code.contains("outer:"));
        assert!(code.contains("break outer;"));
        assert!(code.contains("continue outer;"));
        assert!(!code.contains("break;"));
        assert!(!code.contains("continue;"));
    }

    #[test]
    fn test_switch_on_number_casts() {
        let code = emit(
            "function f(x: number): void {\n  switch (x) {\n    case 1:\n      console.log(\"one\");\n      break;\n    default:\n      break;\n  }\n}\n",
        );
        assert!(code.contains("switch ((int) (x)) {"));
        assert!(code.contains("case 1:"));
        assert!(code.contains("default:"));
    }

    #[test]
    fn test_throw_string_and_try() {
        let code = emit(
            "function f(): void {\n  try { throw \"bad\"; } catch (e) { console.log(e.message); } finally { console.log(1); }\n}\n",
        );
        assert!(code.contains("throw new RuntimeException(\"bad\");"));
        assert!(code.contains("} catch (Exception e) {"));
        assert!(code.contains("System.out.println(e.getMessage());"));
        assert!(code.contains("} finally {"));
    }

    #[test]
    fn test_local_function_becomes_lambda() {
        let code = emit(
            "function outer(): number {\n  function inc(n: number): number { return n + 1; }\n  return inc(1);\n}\n",
        );
        assert!(code.contains("DoubleReturnDouble inc = (double n) -> {"));
        assert!(code.contains("return inc.call(1);"));
        assert!(code.contains("import app.Functions.DoubleReturnDouble;"));
    }

    #[test]
    fn test_recursive_local_function_becomes_anonymous_class() {
        let code = emit(
            "function outer(): number {\n  function fact(n: number): number { return n <= 1 ? 1 : n * fact(n - 1); }\n  return fact(5);\n}\n",
        );
        assert!(code.contains("DoubleReturnDouble fact = new DoubleReturnDouble() {"));
        assert!(code.contains("public double call(double n) {"));
        assert!(code.contains("n * this.call(n - 1)"));
        assert!(code.contains("return fact.call(5);"));
        assert!(!code.contains("fact.call(n - 1)"));
        assert!(!code.contains("->"));
    }
}
