//! Expression lowering
//!
//! Every printer returned here starts with a space-glued fragment, so
//! callers splice it with `append` after an operator or keyword and with
//! `append_tight` after an opening bracket.

use crate::parser::ast::{
    ArrayExpression, ArrowBody, AssignmentExpression, BinaryExpression, BinaryOperator,
    BlockStatement, CallExpression, Expression, Identifier, LogicalExpression, LogicalOperator,
    MemberExpression, NewExpression, NumberKind, NumberLiteral, Parameter, TemplateElement,
    TemplateLiteral, TypeAnnotation, TypeParameter, UnaryExpression, UnaryOperator,
};
use crate::parser::token::Span;

use super::callable::returns_value;
use super::infer::is_exception;
use super::intrinsics::{console_method, string_method, string_property};
use super::{span_key, FunctionFrame, Lowerer};
use crate::compiler::decl::{DeclId, DeclKind};
use crate::compiler::printer::{CallTarget, Deferred, EqualityPart, Printer};
use crate::compiler::resolver::{Builtin, Resolved};
use crate::compiler::scope::ScopeKind;
use crate::compiler::types::{JavaType, Primitive};

/// Body of an arrow function or function expression
pub(super) enum LambdaBody<'n> {
    Expression(&'n Expression),
    Block(&'n BlockStatement),
}

pub(super) struct LambdaParts<'n> {
    pub type_params: Option<&'n [TypeParameter]>,
    pub params: &'n [Parameter],
    pub return_type: Option<&'n TypeAnnotation>,
    pub body: LambdaBody<'n>,
    pub span: Span,
}

pub(super) struct LoweredLambda {
    pub params: Vec<DeclId>,
    /// Every parameter carries an annotation
    pub typed: bool,
    /// Statements of a block body, or the expression
    pub body: Printer,
    pub block: bool,
    pub ty: JavaType,
}

fn text(text: impl Into<String>) -> Printer {
    let mut p = Printer::new();
    p.write(text);
    p
}

pub(super) fn parenthesized(inner: Printer) -> Printer {
    let mut p = Printer::new();
    p.write("(");
    p.append_tight(inner);
    p.write_tight(")");
    p
}

/// Java spelling of a numeric literal. Bigint suffixes are dropped and
/// octal literals are written in decimal.
pub(super) fn number_literal(literal: &NumberLiteral) -> String {
    let raw = match literal.kind {
        NumberKind::BigInt => literal.raw.strip_suffix('n').unwrap_or(&literal.raw),
        NumberKind::Int | NumberKind::Float => &literal.raw,
    };
    let octal = raw.strip_prefix("0o").or_else(|| raw.strip_prefix("0O"));
    if let Some(digits) = octal {
        let digits: String = digits.chars().filter(|c| *c != '_').collect();
        if let Ok(value) = i64::from_str_radix(&digits, 8) {
            return value.to_string();
        }
    }
    raw.to_string()
}

/// Quote and escape a string value as a Java string literal.
pub(super) fn java_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `<A, B>` of boxed type arguments, joined to the preceding name.
fn type_arguments(args: Vec<JavaType>) -> Printer {
    let mut p = Printer::new();
    p.write_tight("<");
    for (i, ty) in args.into_iter().enumerate() {
        let ty = Deferred::Type { ty, boxed: true };
        if i > 0 {
            p.write_tight(",");
            p.write_deferred(ty);
        } else {
            p.write_deferred_tight(ty);
        }
    }
    p.write_tight(">");
    p
}

impl<'a> Lowerer<'a> {
    pub(super) fn lower_expr(&mut self, expr: &Expression) -> Printer {
        match expr {
            Expression::Number(n) => text(number_literal(n)),
            Expression::String(s) => text(java_string(&s.value)),
            Expression::Template(t) => self.lower_template(t),
            Expression::Boolean(b) => text(if b.value { "true" } else { "false" }),
            Expression::Null(_) => text("null"),
            Expression::Identifier(ident) => self.lower_identifier(ident),
            Expression::Array(array) => {
                let element = self.array_element_type(array);
                self.lower_array(array, element)
            }
            Expression::Object(o) => {
                self.skip("object literal", &o.span);
                Printer::new()
            }
            Expression::Unary(unary) => self.lower_unary(unary),
            Expression::Binary(binary) => self.lower_binary(binary),
            Expression::Logical(logical) => self.lower_logical(logical),
            Expression::Assignment(assignment) => self.lower_assignment(assignment),
            Expression::Conditional(c) => {
                let mut p = self.lower_expr(&c.test);
                p.write("?");
                p.append(self.lower_expr(&c.consequent));
                p.write(":");
                p.append(self.lower_expr(&c.alternate));
                p
            }
            Expression::Call(call) => self.lower_call(call),
            Expression::Member(member) => self.lower_member(member),
            Expression::Index(index) => {
                let mut p = self.lower_expr(&index.object);
                p.write_tight("[");
                p.append_tight(self.lower_expr(&index.index));
                p.write_tight("]");
                p
            }
            Expression::New(new) => self.lower_new(new),
            Expression::Arrow(arrow) => {
                let body = match &arrow.body {
                    ArrowBody::Expression(e) => LambdaBody::Expression(e),
                    ArrowBody::Block(b) => LambdaBody::Block(b),
                };
                let parts = LambdaParts {
                    type_params: arrow.type_params.as_deref(),
                    params: &arrow.params,
                    return_type: arrow.return_type.as_ref(),
                    body,
                    span: arrow.span,
                };
                self.lower_lambda(parts).0
            }
            Expression::Function(function) => {
                let parts = LambdaParts {
                    type_params: function.type_params.as_deref(),
                    params: &function.params,
                    return_type: function.return_type.as_ref(),
                    body: LambdaBody::Block(&function.body),
                    span: function.span,
                };
                self.lower_lambda(parts).0
            }
            Expression::This(_) => text("this"),
            Expression::Super(_) => text("super"),
            Expression::Parenthesized(p) => parenthesized(self.lower_expr(&p.expression)),
            Expression::Typeof(t) => {
                self.skip("typeof", &t.span);
                Printer::new()
            }
            Expression::Instanceof(check) => {
                let ty = self.annotation_type(&check.type_name);
                let mut p = self.lower_expr(&check.object);
                p.write("instanceof");
                p.write_deferred(Deferred::Type { ty, boxed: true });
                p
            }
            Expression::As(cast) => {
                let ty = self.annotation_type(&cast.target);
                let mut p = Printer::new();
                p.write("(");
                p.write_tight("(");
                p.write_deferred_tight(Deferred::Type { ty, boxed: false });
                p.write_tight(")");
                p.append(self.lower_expr(&cast.expression));
                p.write_tight(")");
                p
            }
            Expression::NonNull(n) => self.lower_expr(&n.expression),
            Expression::Spread(s) => {
                self.skip("spread", &s.span);
                Printer::new()
            }
        }
    }

    /// Lower a value stored into a slot of type `expected`; array literals
    /// take their element type from the slot.
    pub(super) fn lower_initializer(
        &mut self,
        expr: &Expression,
        expected: Option<&JavaType>,
    ) -> Printer {
        match (expr.unparenthesized(), expected) {
            (Expression::Array(array), Some(expected)) => {
                let element = JavaType::element_of(expected.clone());
                self.lower_array(array, element)
            }
            _ => self.lower_expr(expr),
        }
    }

    fn lower_identifier(&mut self, ident: &Identifier) -> Printer {
        let resolved = self.resolve(&ident.name);
        match resolved {
            Some(Resolved::Decl(id)) => {
                let mut p = Printer::new();
                match self.decl(id).kind {
                    DeclKind::Function | DeclKind::Import(_) => {
                        p.write_deferred(Deferred::MethodRef(id))
                    }
                    _ => p.write_deferred(Deferred::Name(id)),
                }
                p
            }
            Some(Resolved::Builtin(builtin)) => text(builtin.java_text()),
            None => {
                self.report_unresolved(&ident.name, ident.span);
                Printer::new()
            }
        }
    }

    /// `"" + a + " text " + (b + c)`
    fn lower_template(&mut self, template: &TemplateLiteral) -> Printer {
        let parts: Vec<&TemplateElement> = template
            .parts
            .iter()
            .filter(|part| !matches!(part, TemplateElement::Text(t) if t.is_empty()))
            .collect();
        let mut p = Printer::new();
        if !matches!(parts.first(), Some(TemplateElement::Text(_))) {
            p.write("\"\"");
            if parts.is_empty() {
                return p;
            }
            p.write("+");
        }
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                p.write("+");
            }
            match part {
                TemplateElement::Text(t) => p.write(java_string(t)),
                TemplateElement::Expression(e) => {
                    let lowered = self.lower_expr(e);
                    if e.is_primary() {
                        p.append(lowered);
                    } else {
                        p.append(parenthesized(lowered));
                    }
                }
            }
        }
        p
    }

    /// `new T[] {a, b}`
    fn lower_array(&mut self, array: &ArrayExpression, element: JavaType) -> Printer {
        let mut p = Printer::new();
        p.write("new");
        p.write_deferred(Deferred::Type {
            ty: element.clone(),
            boxed: false,
        });
        p.write_tight("[]");
        p.write("{");
        let mut first = true;
        for value in &array.elements {
            if let Expression::Spread(spread) = value {
                self.skip("spread element", &spread.span);
                continue;
            }
            let lowered = self.lower_initializer(value, Some(&element));
            if first {
                p.append_tight(lowered);
                first = false;
            } else {
                p.write_tight(",");
                p.append(lowered);
            }
        }
        p.write_tight("}");
        p
    }

    fn lower_unary(&mut self, unary: &UnaryExpression) -> Printer {
        let op = unary.operator;
        if op == UnaryOperator::Void {
            self.skip("void operator", &unary.span);
            return Printer::new();
        }
        let operand = self.lower_expr(&unary.operand);
        let mut p = Printer::new();
        if op.is_postfix() {
            p.append(operand);
            p.write_tight(op.text());
            return p;
        }
        p.write(op.text());
        // `- -x` must not become `--x`
        let collides = match unary.operand.as_ref() {
            Expression::Unary(inner) => matches!(
                (op, inner.operator),
                (UnaryOperator::Minus, UnaryOperator::Minus)
                    | (UnaryOperator::Minus, UnaryOperator::PrefixDecrement)
                    | (UnaryOperator::Plus, UnaryOperator::Plus)
                    | (UnaryOperator::Plus, UnaryOperator::PrefixIncrement)
            ),
            _ => false,
        };
        if collides {
            p.append(operand);
        } else {
            p.append_tight(operand);
        }
        p
    }

    fn lower_binary(&mut self, binary: &BinaryExpression) -> Printer {
        match binary.operator {
            BinaryOperator::Exponent => {
                let base = self.lower_expr(&binary.left);
                let exponent = self.lower_expr(&binary.right);
                let mut p = text("Math.pow");
                p.write_arguments(vec![base, exponent]);
                p
            }
            BinaryOperator::Equal
            | BinaryOperator::NotEqual
            | BinaryOperator::StrictEqual
            | BinaryOperator::StrictNotEqual => self.lower_equality(binary),
            BinaryOperator::In => {
                self.skip("`in` operator", &binary.span);
                Printer::new()
            }
            op => {
                let mut p = self.lower_expr(&binary.left);
                p.write(op.text());
                p.append(self.lower_expr(&binary.right));
                p
            }
        }
    }

    /// `a == b`, or `Objects.equals(a, b)` once either side is known to be
    /// a `String`.
    fn lower_equality(&mut self, binary: &BinaryExpression) -> Printer {
        let negated = matches!(
            binary.operator,
            BinaryOperator::NotEqual | BinaryOperator::StrictNotEqual
        );
        let left_ty = self.type_of(&binary.left);
        let right_ty = self.type_of(&binary.right);
        let part = |part: EqualityPart| Deferred::Equality {
            part,
            left: left_ty.clone(),
            right: right_ty.clone(),
            negated,
        };
        let left = self.lower_expr(&binary.left);
        let right = self.lower_expr(&binary.right);

        let mut p = Printer::new();
        p.write_deferred(part(EqualityPart::Open));
        p.append_tight(left);
        p.write_deferred_tight(part(EqualityPart::Separator));
        p.write_deferred(part(EqualityPart::Operator));
        p.append(right);
        p.write_deferred_tight(part(EqualityPart::Close));
        p
    }

    fn lower_logical(&mut self, logical: &LogicalExpression) -> Printer {
        let left = self.lower_expr(&logical.left);
        let right = self.lower_expr(&logical.right);
        let mut p = Printer::new();
        match logical.operator {
            LogicalOperator::And | LogicalOperator::Or => {
                let op = if logical.operator == LogicalOperator::And {
                    "&&"
                } else {
                    "||"
                };
                p.append(left);
                p.write(op);
                p.append(right);
            }
            LogicalOperator::NullishCoalescing => {
                p.write("(");
                p.append_tight(left.clone());
                p.write("!=");
                p.write("null");
                p.write("?");
                p.append(left);
                p.write(":");
                p.append(right);
                p.write_tight(")");
            }
        }
        p
    }

    fn lower_assignment(&mut self, assignment: &AssignmentExpression) -> Printer {
        let target = self.type_of(&assignment.left);
        let mut p = self.lower_expr(&assignment.left);
        p.write(assignment.operator.text());
        p.append(self.lower_initializer(&assignment.right, Some(&target)));
        p
    }

    fn lower_arguments(&mut self, arguments: &[Expression]) -> Vec<Printer> {
        let mut lowered = Vec::with_capacity(arguments.len());
        for argument in arguments {
            if let Expression::Spread(spread) = argument {
                self.skip("spread argument", &spread.span);
                continue;
            }
            lowered.push(self.lower_expr(argument));
        }
        lowered
    }

    fn lower_call(&mut self, call: &CallExpression) -> Printer {
        match call.callee.unparenthesized() {
            Expression::Member(member) => {
                if let Some(p) = self.lower_intrinsic_call(member, &call.arguments) {
                    return p;
                }
                let object_ty = self.type_of(&member.object);
                let name = member.property.name.clone();
                let accessor = self.is_interface_property(&object_ty, &name);
                let mut p = self.lower_expr(&member.object);
                p.write_tight(".");
                p.write_tight(name.clone());
                if accessor {
                    p.write_tight("()");
                }
                p.write_deferred_tight(Deferred::CallSuffix(CallTarget::Member(object_ty, name)));
                p.write_arguments(self.lower_arguments(&call.arguments));
                p
            }
            Expression::Identifier(ident) => {
                let resolved = self.resolve(&ident.name);
                let mut p = Printer::new();
                match resolved {
                    Some(Resolved::Decl(id)) => {
                        p.write_deferred(Deferred::Name(id));
                        p.write_deferred_tight(Deferred::CallSuffix(CallTarget::Decl(id)));
                    }
                    Some(Resolved::Builtin(Builtin::Error)) => {
                        p.write("new");
                        p.write(Builtin::Error.java_text());
                    }
                    Some(Resolved::Builtin(builtin)) => p.write(builtin.java_text()),
                    None => {
                        self.report_unresolved(&ident.name, ident.span);
                        return p;
                    }
                }
                p.write_arguments(self.lower_arguments(&call.arguments));
                p
            }
            Expression::Super(_) => {
                let mut p = text("super");
                p.write_arguments(self.lower_arguments(&call.arguments));
                p
            }
            callee => {
                let callee_ty = self.type_of(callee);
                let mut p = self.lower_expr(&call.callee);
                p.write_deferred_tight(Deferred::CallSuffix(CallTarget::Value(callee_ty)));
                p.write_arguments(self.lower_arguments(&call.arguments));
                p
            }
        }
    }

    /// `console.*`, `Math.*` and `String` method calls.
    fn lower_intrinsic_call(
        &mut self,
        member: &MemberExpression,
        arguments: &[Expression],
    ) -> Option<Printer> {
        let name = member.property.name.as_str();
        if let Expression::Identifier(object) = member.object.unparenthesized() {
            let resolved = self.resolve(&object.name);
            match resolved {
                Some(Resolved::Builtin(Builtin::Console)) => {
                    return Some(match console_method(name) {
                        Some(print) => self.lower_print(print, arguments),
                        None => {
                            self.skip("console method", &member.span);
                            Printer::new()
                        }
                    });
                }
                Some(Resolved::Builtin(Builtin::Math)) => {
                    let mut p = text(format!("Math.{}", name));
                    p.write_arguments(self.lower_arguments(arguments));
                    return Some(p);
                }
                _ => {}
            }
        }
        let method = string_method(name)?;
        if !self.eager_type(&member.object).is_string() {
            return None;
        }
        let mut p = self.lower_expr(&member.object);
        p.write_tight(".");
        p.write_tight(method.java);
        p.write_arguments(self.lower_arguments(arguments));
        Some(p)
    }

    /// `System.out.println(a + " " + b)`
    fn lower_print(&mut self, print: &str, arguments: &[Expression]) -> Printer {
        let values: Vec<&Expression> = arguments
            .iter()
            .filter(|a| !matches!(a, Expression::Spread(_)))
            .collect();
        let mut joined = Printer::new();
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                joined.write("+");
                joined.write("\" \"");
                joined.write("+");
            }
            let lowered = self.lower_expr(value);
            if values.len() > 1 && !value.is_primary() {
                joined.append(parenthesized(lowered));
            } else {
                joined.append(lowered);
            }
        }
        let mut p = text(print);
        p.write_arguments(if values.is_empty() {
            Vec::new()
        } else {
            vec![joined]
        });
        p
    }

    fn lower_member(&mut self, member: &MemberExpression) -> Printer {
        let name = member.property.name.clone();
        if let Expression::Identifier(object) = member.object.unparenthesized() {
            if let Some(Resolved::Builtin(Builtin::Math)) = self.resolve(&object.name) {
                return text(format!("Math.{}", name));
            }
        }
        let object_ty = self.type_of(&member.object);
        let resolved = self.ctx.resolve_type(&object_ty);
        let mut p = self.lower_expr(&member.object);
        let string_member = match resolved {
            JavaType::Primitive(Primitive::String) => string_property(&name),
            _ => None,
        };
        if let Some(java) = string_member {
            p.write_tight(".");
            p.write_tight(java);
            return p;
        }
        match resolved {
            JavaType::Generic(g) if is_exception(&g.name) && name == "message" => {
                p.write_tight(".");
                p.write_tight("getMessage()");
            }
            _ if self.is_interface_property(&object_ty, &name) => {
                p.write_tight(".");
                p.write_tight(format!("{}()", name));
            }
            _ if self.is_method_member(&object_ty, &name) => {
                p.write_tight("::");
                p.write_tight(name);
            }
            _ => {
                p.write_tight(".");
                p.write_tight(name);
            }
        }
        p
    }

    fn lower_new(&mut self, new: &NewExpression) -> Printer {
        let type_args: Vec<JavaType> = new
            .type_args
            .iter()
            .flatten()
            .map(|a| self.annotation_type(a))
            .collect();
        let mut p = text("new");
        match new.callee.unparenthesized() {
            Expression::Identifier(ident) => {
                let resolved = self.resolve(&ident.name);
                match resolved {
                    Some(Resolved::Builtin(builtin)) => match builtin.constructed_class() {
                        Some(class) => {
                            p.write_deferred(Deferred::Type {
                                ty: class,
                                boxed: false,
                            });
                            if builtin.is_generic() {
                                p.write_tight("<>");
                            }
                        }
                        None => {
                            self.skip("construction of a non-constructible global", &new.span);
                            return Printer::new();
                        }
                    },
                    Some(Resolved::Decl(id)) => {
                        p.write_deferred(Deferred::Name(id));
                        let generic = self
                            .decl(id)
                            .class_info()
                            .is_some_and(|info| !info.type_params.is_empty());
                        if !type_args.is_empty() {
                            p.append(type_arguments(type_args));
                        } else if generic {
                            p.write_tight("<>");
                        }
                    }
                    None => {
                        self.report_unresolved(&ident.name, ident.span);
                        return Printer::new();
                    }
                }
            }
            callee => p.append(self.lower_expr(callee)),
        }
        p.write_arguments(self.lower_arguments(&new.arguments));
        p
    }

    /// Lower an arrow function or function expression to a Java lambda and
    /// record its function type.
    pub(super) fn lower_lambda(&mut self, parts: LambdaParts<'_>) -> (Printer, JavaType) {
        let lowered = self.lower_lambda_parts(parts);
        let ty = lowered.ty.clone();
        (Self::lambda_printer(lowered), ty)
    }

    /// `(params) -> body`, with parameter types only when all are annotated.
    pub(super) fn lambda_printer(lowered: LoweredLambda) -> Printer {
        let mut p = Printer::new();
        p.write("(");
        for (i, id) in lowered.params.iter().enumerate() {
            let param = if lowered.typed {
                Self::param_printer(*id)
            } else {
                let mut name = Printer::new();
                name.write_deferred(Deferred::Name(*id));
                name
            };
            if i > 0 {
                p.write_tight(",");
                p.append(param);
            } else {
                p.append_tight(param);
            }
        }
        p.write_tight(")");
        p.write("->");
        if lowered.block {
            p.write_body(lowered.body);
        } else {
            p.append(lowered.body);
        }
        p
    }

    /// Parameters, body and function type of a lambda, before they are
    /// assembled into Java text.
    pub(super) fn lower_lambda_parts(&mut self, parts: LambdaParts<'_>) -> LoweredLambda {
        self.scopes.push_scope(ScopeKind::Lambda, "");
        self.declare_type_params(parts.type_params);
        let (params, param_types) = self.declare_params(parts.params);
        let annotated = parts.return_type.map(|a| self.annotation_type(a));
        let typed = !parts.params.is_empty()
            && parts.params.iter().all(|param| param.type_annotation.is_some());

        let (body, block, ret) = match parts.body {
            LambdaBody::Expression(body) => {
                let lowered = self.lower_expr(body);
                let ret = annotated.unwrap_or_else(|| self.type_of(body));
                (lowered, false, ret)
            }
            LambdaBody::Block(block) => {
                let infer = annotated.is_none() && returns_value(block);
                self.functions.push(FunctionFrame {
                    infer_return: infer,
                    returned: None,
                });
                let lowered = self.lower_statements(&block.statements);
                let frame = self.functions.pop().unwrap_or_default();
                let ret = match annotated {
                    Some(ty) => ty,
                    None if infer => frame.returned.unwrap_or_else(JavaType::object),
                    None => JavaType::void(),
                };
                (lowered, true, ret)
            }
        };
        self.scopes.pop_scope();

        let ty = JavaType::function(param_types, ret);
        self.lambda_types.insert(span_key(&parts.span), ty.clone());
        LoweredLambda {
            params,
            typed,
            body,
            block,
            ty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(raw: &str, kind: NumberKind) -> NumberLiteral {
        NumberLiteral {
            raw: raw.to_string(),
            kind,
            span: Span::default(),
        }
    }

    #[test]
    fn test_number_literals() {
        assert_eq!(number_literal(&number("42", NumberKind::Int)), "42");
        assert_eq!(number_literal(&number("10n", NumberKind::BigInt)), "10");
        assert_eq!(number_literal(&number("0o17", NumberKind::Int)), "15");
        assert_eq!(number_literal(&number("0xFF", NumberKind::Int)), "0xFF");
        assert_eq!(number_literal(&number("1.5e3", NumberKind::Float)), "1.5e3");
    }

    #[test]
    fn test_java_string_escapes() {
        assert_eq!(java_string("plain"), "\"plain\"");
        assert_eq!(java_string("say \"hi\"\n"), "\"say \\\"hi\\\"\\n\"");
        assert_eq!(java_string("a\\b"), "\"a\\\\b\"");
        assert_eq!(java_string("\u{1}"), "\"\\u0001\"");
    }
}
