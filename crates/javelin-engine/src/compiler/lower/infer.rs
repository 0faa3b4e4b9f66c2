//! Expression typing
//!
//! [`Lowerer::type_of`] answers the static type of an expression. The
//! answer may be lazy (an unresolved query over declarations of units that
//! are not lowered yet); [`Lowerer::eager_type`] resolves it against what
//! is known now, for decisions that must be taken during lowering.

use crate::parser::ast::{
    ArrayExpression, ArrowBody, BinaryOperator, Expression, LogicalOperator, MemberExpression,
    NewExpression, NumberKind, Parameter, TypeAnnotation, UnaryOperator,
};

use super::intrinsics::{math_call_type, string_method};
use super::{span_key, Lowerer};
use crate::compiler::decl::{ClassFlavor, DeclId, DeclKind};
use crate::compiler::resolver::{join_types, Builtin, Resolved};
use crate::compiler::types::{JavaType, Primitive, TypeQuery};

impl<'a> Lowerer<'a> {
    /// Static type of `expr`, possibly lazy.
    pub fn type_of(&self, expr: &Expression) -> JavaType {
        match expr {
            Expression::Number(n) => match n.kind {
                NumberKind::Float => JavaType::double(),
                NumberKind::Int | NumberKind::BigInt => JavaType::int(),
            },
            Expression::String(_) | Expression::Template(_) | Expression::Typeof(_) => {
                JavaType::string()
            }
            Expression::Boolean(_) | Expression::Instanceof(_) => JavaType::boolean(),
            Expression::Null(_) | Expression::Object(_) => JavaType::object(),
            Expression::Identifier(ident) => match self.resolve(&ident.name) {
                Some(Resolved::Decl(id)) => JavaType::of_decl(id),
                Some(Resolved::Builtin(builtin)) => builtin.value_type(),
                None => JavaType::object(),
            },
            Expression::Array(array) => JavaType::array_of(self.array_element_type(array)),
            Expression::Unary(unary) => match unary.operator {
                UnaryOperator::Not => JavaType::boolean(),
                UnaryOperator::BitwiseNot => JavaType::int(),
                UnaryOperator::Void => JavaType::object(),
                _ => self.type_of(&unary.operand),
            },
            Expression::Binary(binary) => match binary.operator {
                op if op.is_comparison() => JavaType::boolean(),
                BinaryOperator::Exponent => JavaType::double(),
                BinaryOperator::Add => {
                    let left = self.eager_type(&binary.left);
                    let right = self.eager_type(&binary.right);
                    if left.is_string() || right.is_string() {
                        JavaType::string()
                    } else {
                        join_types(&[left, right])
                    }
                }
                BinaryOperator::Subtract
                | BinaryOperator::Multiply
                | BinaryOperator::Divide
                | BinaryOperator::Modulo => join_types(&[
                    self.eager_type(&binary.left),
                    self.eager_type(&binary.right),
                ]),
                _ => JavaType::int(),
            },
            Expression::Logical(logical) => match logical.operator {
                LogicalOperator::And | LogicalOperator::Or => {
                    let left = self.type_of(&logical.left);
                    if self.ctx.resolve_type(&left).is_primitive(Primitive::Boolean) {
                        JavaType::boolean()
                    } else {
                        left
                    }
                }
                LogicalOperator::NullishCoalescing => self.type_of(&logical.left),
            },
            Expression::Assignment(assignment) => self.type_of(&assignment.left),
            Expression::Conditional(conditional) => self.type_of(&conditional.consequent),
            Expression::Call(call) => {
                match call.callee.unparenthesized() {
                    Expression::Member(member) => {
                        if let Some(ty) = self.intrinsic_call_type(member, &call.arguments) {
                            return ty;
                        }
                    }
                    Expression::Identifier(ident) => {
                        if let Some(Resolved::Builtin(Builtin::Error)) = self.resolve(&ident.name) {
                            return Builtin::Error
                                .instance_type(Vec::new())
                                .unwrap_or_else(JavaType::object);
                        }
                    }
                    Expression::Super(_) => return JavaType::void(),
                    _ => {}
                }
                JavaType::return_of(self.type_of(&call.callee))
            }
            Expression::Member(member) => self.member_type(member),
            Expression::Index(index) => JavaType::element_of(self.type_of(&index.object)),
            Expression::New(new) => self.constructed_type(new),
            Expression::Arrow(arrow) => match self.lambda_types.get(&span_key(&arrow.span)) {
                Some(ty) => ty.clone(),
                None => {
                    let ret = match (&arrow.return_type, &arrow.body) {
                        (Some(annotation), _) => self.quiet_annotation(annotation),
                        (None, ArrowBody::Expression(body)) => self.type_of(body),
                        (None, ArrowBody::Block(_)) => JavaType::object(),
                    };
                    self.shallow_function_type(&arrow.params, ret)
                }
            },
            Expression::Function(function) => {
                match self.lambda_types.get(&span_key(&function.span)) {
                    Some(ty) => ty.clone(),
                    None => {
                        let ret = match &function.return_type {
                            Some(annotation) => self.quiet_annotation(annotation),
                            None => JavaType::object(),
                        };
                        self.shallow_function_type(&function.params, ret)
                    }
                }
            }
            Expression::This(_) => match self.current_class() {
                Some(class) => JavaType::class(class),
                None => JavaType::object(),
            },
            Expression::Super(_) => self
                .current_class()
                .and_then(|class| self.decl(class).class_info())
                .and_then(|info| info.extends.clone())
                .unwrap_or_else(JavaType::object),
            Expression::Parenthesized(p) => self.type_of(&p.expression),
            Expression::As(cast) => self.quiet_annotation(&cast.target),
            Expression::NonNull(n) => self.type_of(&n.expression),
            Expression::Spread(s) => self.type_of(&s.argument),
        }
    }

    /// Type of `expr` resolved against the current state of the build.
    pub fn eager_type(&self, expr: &Expression) -> JavaType {
        self.ctx.resolve_type(&self.type_of(expr))
    }

    /// Whether values of `ty` are interface-typed objects whose member
    /// `name` is a property (an accessor method in Java).
    pub(super) fn is_interface_property(&self, ty: &JavaType, name: &str) -> bool {
        let class = match self.ctx.resolve_type(ty) {
            JavaType::Class(class) => class.decl,
            _ => return false,
        };
        let member = match self.interface_member(class, name) {
            Some(member) => member,
            None => return false,
        };
        let decl = self.decl(member);
        matches!(decl.kind, DeclKind::Variable)
            && decl
                .owner
                .and_then(|owner| self.decl(owner).class_info())
                .is_some_and(|info| info.flavor == ClassFlavor::Interface)
    }

    /// Whether member `name` of values of `ty` is a method.
    pub(super) fn is_method_member(&self, ty: &JavaType, name: &str) -> bool {
        match self.ctx.resolve_type(ty) {
            JavaType::Class(class) => self
                .interface_member(class.decl, name)
                .is_some_and(|member| self.decl(member).kind == DeclKind::Function),
            _ => false,
        }
    }

    /// Member lookup that also searches the interfaces a type extends.
    fn interface_member(
        &self,
        class: DeclId,
        name: &str,
    ) -> Option<DeclId> {
        if let Some(member) = self.ctx.member_decl(class, name) {
            return Some(member);
        }
        let info = self.decl(class).class_info()?;
        info.implements.iter().find_map(|parent| match self.ctx.resolve_type(parent) {
            JavaType::Class(parent) => self.ctx.member_decl(parent.decl, name),
            _ => None,
        })
    }

    /// Element type of an array literal: the shared type of its elements.
    pub(super) fn array_element_type(&self, array: &ArrayExpression) -> JavaType {
        let elements: Vec<JavaType> = array
            .elements
            .iter()
            .filter(|e| !matches!(e, Expression::Spread(_)))
            .map(|e| self.type_of(e))
            .collect();
        self.common_type(&elements)
    }

    fn common_type(&self, types: &[JavaType]) -> JavaType {
        match types.split_first() {
            None => JavaType::object(),
            Some((first, rest)) if rest.iter().all(|t| t == first) => first.clone(),
            Some(_) => {
                let resolved: Vec<JavaType> =
                    types.iter().map(|t| self.ctx.resolve_type(t)).collect();
                join_types(&resolved)
            }
        }
    }

    fn quiet_annotation(&self, annotation: &TypeAnnotation) -> JavaType {
        self.resolver().resolve_annotation(annotation, &mut Vec::new())
    }

    fn shallow_function_type(
        &self,
        params: &[Parameter],
        ret: JavaType,
    ) -> JavaType {
        let params = params
            .iter()
            .map(|p| match &p.type_annotation {
                Some(annotation) => self.quiet_annotation(annotation),
                None => JavaType::object(),
            })
            .collect();
        JavaType::function(params, ret)
    }

    /// Result type of calls the intrinsic table rewrites.
    pub(super) fn intrinsic_call_type(
        &self,
        member: &MemberExpression,
        arguments: &[Expression],
    ) -> Option<JavaType> {
        if let Expression::Identifier(object) = member.object.unparenthesized() {
            match self.resolve(&object.name) {
                Some(Resolved::Builtin(Builtin::Console)) => return Some(JavaType::void()),
                Some(Resolved::Builtin(Builtin::Math)) => {
                    let args: Vec<JavaType> =
                        arguments.iter().map(|a| self.eager_type(a)).collect();
                    return Some(math_call_type(&member.property.name, &args));
                }
                _ => {}
            }
        }
        if self.eager_type(&member.object).is_string() {
            return string_method(&member.property.name).map(|m| m.returns.java_type());
        }
        None
    }

    fn member_type(&self, member: &MemberExpression) -> JavaType {
        if let Expression::Identifier(object) = member.object.unparenthesized() {
            if let Some(Resolved::Builtin(Builtin::Math)) = self.resolve(&object.name) {
                return JavaType::double();
            }
        }
        let object = self.type_of(&member.object);
        match self.ctx.resolve_type(&object) {
            JavaType::Primitive(Primitive::String) if member.property.name == "length" => {
                JavaType::int()
            }
            JavaType::Generic(g) if is_exception(&g.name) && member.property.name == "message" => {
                JavaType::string()
            }
            _ => JavaType::member_of(object, &member.property.name),
        }
    }

    fn constructed_type(&self, new: &NewExpression) -> JavaType {
        let args: Vec<JavaType> = new
            .type_args
            .iter()
            .flatten()
            .map(|a| self.quiet_annotation(a))
            .collect();
        match new.callee.unparenthesized() {
            Expression::Identifier(ident) => match self.resolve(&ident.name) {
                Some(Resolved::Decl(id)) => JavaType::Unresolved(TypeQuery::Applied { decl: id, args }),
                Some(Resolved::Builtin(builtin)) => {
                    builtin.instance_type(args).unwrap_or_else(JavaType::object)
                }
                None => JavaType::object(),
            },
            _ => JavaType::object(),
        }
    }
}

/// Java exception types `catch` and `new Error(...)` produce.
pub(super) fn is_exception(name: &str) -> bool {
    matches!(name, "Exception" | "RuntimeException")
}
