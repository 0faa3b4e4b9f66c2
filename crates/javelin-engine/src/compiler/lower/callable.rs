//! Functions, methods and constructors
//!
//! Java has no default parameter values. A callable whose parameter list
//! ends in a run of defaulted parameters gets one overload per parameter of
//! that run; each overload forwards to the full signature with the missing
//! defaults filled in.

use crate::parser::ast::{
    BlockStatement, Expression, FunctionDecl, Parameter, Statement, TypeAnnotation, TypeParameter,
};
use crate::parser::token::Span;

use super::{FunctionFrame, Lowerer};
use crate::compiler::decl::{DeclId, DeclKind};
use crate::compiler::printer::{Deferred, Printer};
use crate::compiler::resolver::rest_parameter;
use crate::compiler::scope::ScopeKind;
use crate::compiler::types::JavaType;

/// Start of the trailing run of defaulted parameters, if the list ends
/// with one.
///
/// `(a, b = 1, c = 2)` gives `Some(1)`; `(a, b = 1, c)` gives `None`.
pub fn trailing_default_run(has_default: &[bool]) -> Option<usize> {
    let mut run_start = None;
    for (i, defaulted) in has_default.iter().enumerate() {
        match (defaulted, run_start) {
            (true, None) => run_start = Some(i),
            (false, _) => run_start = None,
            (true, Some(_)) => {}
        }
    }
    run_start
}

/// Parameter counts of the overloads generated for a parameter list.
pub fn overload_arities(has_default: &[bool]) -> Vec<usize> {
    match trailing_default_run(has_default) {
        Some(start) => (start..has_default.len()).collect(),
        None => Vec::new(),
    }
}

/// Whether a body returns a value somewhere, not counting nested
/// functions and classes.
pub(super) fn returns_value(block: &BlockStatement) -> bool {
    block.statements.iter().any(statement_returns_value)
}

fn statement_returns_value(statement: &Statement) -> bool {
    match statement {
        Statement::Return(ret) => ret.value.is_some(),
        Statement::If(s) => {
            statement_returns_value(&s.then_branch)
                || s.else_branch.as_deref().is_some_and(statement_returns_value)
        }
        Statement::While(s) => statement_returns_value(&s.body),
        Statement::DoWhile(s) => statement_returns_value(&s.body),
        Statement::For(s) => statement_returns_value(&s.body),
        Statement::ForOf(s) => statement_returns_value(&s.body),
        Statement::Labeled(s) => statement_returns_value(&s.body),
        Statement::Block(b) => returns_value(b),
        Statement::Try(s) => {
            returns_value(&s.body)
                || s.catch_clause.as_ref().is_some_and(|c| returns_value(&c.body))
                || s.finally_clause.as_ref().is_some_and(returns_value)
        }
        Statement::Switch(s) => s
            .cases
            .iter()
            .any(|case| case.consequent.iter().any(statement_returns_value)),
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CallableKind {
    /// Module-level function
    Function,
    Method,
    Constructor,
    /// Abstract method or interface method: no body
    Signature,
}

/// Everything needed to lower one callable
pub(super) struct Callable<'n> {
    pub kind: CallableKind,
    /// The function or method; the class for constructors
    pub decl: DeclId,
    pub modifiers: Vec<&'static str>,
    pub type_params: Option<&'n [TypeParameter]>,
    pub params: &'n [Parameter],
    pub return_type: Option<&'n TypeAnnotation>,
    pub body: Option<&'n BlockStatement>,
    pub span: Span,
    pub name: &'n str,
}

impl<'a> Lowerer<'a> {
    /// Type of a parameter: its annotation, the type of its default value,
    /// or `Object`.
    pub(super) fn param_type(&mut self, param: &Parameter) -> JavaType {
        let ty = match (&param.type_annotation, &param.default_value) {
            (Some(annotation), _) => self.annotation_type(annotation),
            (None, Some(default)) => self.type_of(default),
            (None, None) => JavaType::object(),
        };
        if param.is_rest {
            rest_parameter(ty)
        } else {
            ty
        }
    }

    /// Function type of a signature, computed while hoisting. An
    /// unannotated return type is `void` when the body never returns a
    /// value; otherwise it is settled once the body has been lowered.
    pub(super) fn signature_type(
        &mut self,
        type_params: Option<&[TypeParameter]>,
        params: &[Parameter],
        return_type: Option<&TypeAnnotation>,
        body: Option<&BlockStatement>,
    ) -> JavaType {
        // Annotations are resolved again when the body is lowered; report
        // their problems once, from there.
        let reported = self.unit.diagnostics.len();
        self.scopes.push_scope(ScopeKind::Function, "");
        self.declare_type_params(type_params);
        let mut param_types = Vec::with_capacity(params.len());
        for param in params {
            param_types.push(self.param_type(param));
        }
        let ret = match return_type {
            Some(annotation) => self.annotation_type(annotation),
            None if body.is_some_and(returns_value) => JavaType::object(),
            None => JavaType::void(),
        };
        self.scopes.pop_scope();
        self.unit.diagnostics.truncate(reported);
        JavaType::function(param_types, ret)
    }

    pub(super) fn lower_function_decl(&mut self, function: &FunctionDecl, id: DeclId) -> Vec<Printer> {
        let visibility = self.decl(id).modifiers.visibility.keyword();
        self.lower_callable(Callable {
            kind: CallableKind::Function,
            decl: id,
            modifiers: vec![visibility, "static"],
            type_params: function.type_params.as_deref(),
            params: &function.params,
            return_type: function.return_type.as_ref(),
            body: Some(&function.body),
            span: function.span,
            name: &function.name.name,
        })
    }

    /// Declare parameters in the current scope.
    pub(super) fn declare_params(&mut self, params: &[Parameter]) -> (Vec<DeclId>, Vec<JavaType>) {
        let mut ids = Vec::with_capacity(params.len());
        let mut types = Vec::with_capacity(params.len());
        for (i, param) in params.iter().enumerate() {
            let ty = self.param_type(param);
            let name = match param.name() {
                Some(ident) => ident.name.clone(),
                None => {
                    self.skip("destructuring parameter", &param.span);
                    format!("arg{}", i)
                }
            };
            let mut decl = self.new_decl(&name, DeclKind::Parameter, ty.clone(), param.span);
            decl.annotated = param.type_annotation.is_some();
            let id = self.alloc(decl);
            self.scopes.declare(&name, id);
            ids.push(id);
            types.push(ty);
        }
        (ids, types)
    }

    /// Lower a callable and its default-parameter overloads.
    pub(super) fn lower_callable(&mut self, callable: Callable<'_>) -> Vec<Printer> {
        let kind = callable.kind;
        let scope_kind = match kind {
            CallableKind::Function => ScopeKind::Function,
            CallableKind::Constructor => ScopeKind::Constructor,
            CallableKind::Method | CallableKind::Signature => ScopeKind::Method,
        };
        self.scopes.push_scope(scope_kind, callable.name);
        let type_params = self.declare_type_params(callable.type_params);
        let (param_ids, param_types) = self.declare_params(callable.params);

        let infer = callable.return_type.is_none()
            && callable.body.is_some_and(returns_value)
            && kind != CallableKind::Constructor;
        let annotated = callable.return_type.map(|a| self.annotation_type(a));
        let placeholder = match (&annotated, infer) {
            (Some(ty), _) => ty.clone(),
            (None, true) => JavaType::object(),
            (None, false) => JavaType::void(),
        };
        if kind != CallableKind::Constructor {
            self.set_type(callable.decl, JavaType::function(param_types.clone(), placeholder));
        }

        self.functions.push(FunctionFrame {
            infer_return: infer,
            returned: None,
        });
        let body = callable.body.map(|block| match kind {
            CallableKind::Constructor => {
                self.lower_constructor_body(block, callable.params, &param_ids)
            }
            _ => self.lower_statements(&block.statements),
        });
        let frame = self.functions.pop().unwrap_or_default();

        let ret = match annotated {
            Some(ty) => ty,
            None if infer => frame.returned.unwrap_or_else(JavaType::object),
            None => JavaType::void(),
        };
        if kind != CallableKind::Constructor {
            self.set_type(callable.decl, JavaType::function(param_types, ret.clone()));
        }

        let header = |arity: usize| {
            let mut p = Printer::new();
            p.writeln(None);
            p.mark(callable.span.line);
            for modifier in &callable.modifiers {
                p.write(*modifier);
            }
            p.append(Self::type_params_printer(&type_params));
            if kind != CallableKind::Constructor {
                p.write_deferred(Deferred::Type {
                    ty: JavaType::return_of(JavaType::of_decl(callable.decl)),
                    boxed: false,
                });
            }
            p.write_deferred(Deferred::Name(callable.decl));
            p.write_params(param_ids[..arity].iter().map(|id| Self::param_printer(*id)).collect());
            p
        };

        let mut full = header(param_ids.len());
        match body {
            Some(body) => full.write_body(body),
            None => full.write_tight(";"),
        }
        let mut printers = vec![full];

        if kind != CallableKind::Signature {
            let has_default: Vec<bool> = callable
                .params
                .iter()
                .map(|p| p.default_value.is_some())
                .collect();
            let arities = overload_arities(&has_default);
            if let Some(&first) = arities.first() {
                let defaults: Vec<Printer> = callable.params[first..]
                    .iter()
                    .filter_map(|p| p.default_value.as_ref())
                    .map(|value| self.lower_expr(value))
                    .collect();
                let returns = !self.ctx.resolve_type(&ret).is_void();
                for arity in arities {
                    let mut args: Vec<Printer> = param_ids[..arity]
                        .iter()
                        .map(|id| {
                            let mut p = Printer::new();
                            p.write_deferred(Deferred::Name(*id));
                            p
                        })
                        .collect();
                    args.extend(defaults[arity - first..].iter().cloned());

                    let mut forward = Printer::new();
                    forward.writeln(None);
                    forward.mark(callable.span.line);
                    if kind == CallableKind::Constructor {
                        forward.write("this");
                    } else {
                        if returns {
                            forward.write("return");
                        }
                        forward.write_deferred(Deferred::Name(callable.decl));
                    }
                    forward.write_arguments(args);
                    forward.write_tight(";");

                    let mut overload = header(arity);
                    overload.write_body(forward);
                    printers.push(overload);
                }
                tracing::trace!(
                    target: "javelin::lower",
                    name = callable.name,
                    overloads = printers.len() - 1,
                    "expanded default parameters"
                );
            }
        }

        self.scopes.pop_scope();
        printers
    }

    /// `Type name` of one parameter.
    pub(super) fn param_printer(id: DeclId) -> Printer {
        let mut p = Printer::new();
        p.write_deferred(Deferred::DeclType {
            decl: id,
            allow_var: false,
        });
        p.write_deferred(Deferred::Name(id));
        p
    }

    /// Constructor body with `this.x = x;` for parameter properties, placed
    /// after a leading `super(...)` call.
    fn lower_constructor_body(
        &mut self,
        block: &BlockStatement,
        params: &[Parameter],
        param_ids: &[DeclId],
    ) -> Printer {
        let class = self.current_class();
        let mut assignments = Printer::new();
        for (param, id) in params.iter().zip(param_ids) {
            if param.accessibility.is_none() && !param.readonly {
                continue;
            }
            let field = param.name().and_then(|name| {
                class.and_then(|class| self.ctx.member_decl(class, &name.name))
            });
            if let Some(field) = field {
                assignments.writeln(None);
                assignments.mark(param.span.line);
                assignments.write("this");
                assignments.write_tight(".");
                assignments.write_deferred_tight(Deferred::Name(field));
                assignments.write("=");
                assignments.write_deferred(Deferred::Name(*id));
                assignments.write_tight(";");
            }
        }

        let statements = &block.statements;
        let leading_super = matches!(
            statements.first(),
            Some(Statement::Expression(s)) if matches!(
                &s.expression,
                Expression::Call(call) if matches!(*call.callee, Expression::Super(_))
            )
        );
        let mut body = Printer::new();
        if leading_super {
            body.append(self.lower_statements(&statements[..1]));
            body.append(assignments);
            body.append(self.lower_statements(&statements[1..]));
        } else {
            body.append(assignments);
            body.append(self.lower_statements(statements));
        }
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_run() {
        assert_eq!(trailing_default_run(&[false, true, true]), Some(1));
        assert_eq!(trailing_default_run(&[false, true, false]), None);
        assert_eq!(trailing_default_run(&[true, false, true]), Some(2));
        assert_eq!(trailing_default_run(&[]), None);
        assert_eq!(trailing_default_run(&[true, true]), Some(0));
    }

    #[test]
    fn test_overload_arities() {
        assert_eq!(overload_arities(&[false, true, true]), vec![1, 2]);
        assert!(overload_arities(&[false, true, false]).is_empty());
        assert_eq!(overload_arities(&[true]), vec![0]);
    }
}
