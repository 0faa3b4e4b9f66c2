//! Classes, interfaces, enums and type aliases
//!
//! Declaring a type only allocates its declaration, so every type name of
//! a module is known before any signature is resolved. Members are hoisted
//! in a second step, and lowered last.

use crate::parser::ast::{
    ClassDecl, ClassMember, EnumDecl, Expression, InterfaceDecl, InterfaceMember,
    MemberModifiers, MethodDecl, MethodKind, TypeAliasDecl, Visibility,
};
use crate::parser::token::Span;

use super::callable::{Callable, CallableKind};
use super::{span_key, ClassFrame, Export, Lowerer};
use crate::compiler::decl::{
    ClassFlavor, ClassInfo, DeclId, DeclKind, DeclVisibility, Modifiers, Placement,
};
use crate::compiler::printer::{Deferred, Printer};
use crate::compiler::scope::ScopeKind;
use crate::compiler::types::{JavaType, TypeParam};

fn member_visibility(visibility: Option<Visibility>) -> DeclVisibility {
    match visibility {
        None | Some(Visibility::Public) => DeclVisibility::Public,
        Some(Visibility::Private) => DeclVisibility::Private,
        Some(Visibility::Protected) => DeclVisibility::Protected,
    }
}

fn member_modifiers(modifiers: &MemberModifiers) -> Modifiers {
    Modifiers {
        visibility: member_visibility(modifiers.visibility),
        is_static: modifiers.is_static,
        is_final: modifiers.is_readonly,
    }
}

/// Modifiers of a type declaration; local types take none.
fn type_modifiers(placement: Placement, export: Export) -> Modifiers {
    match placement {
        Placement::Module => Modifiers {
            visibility: export.visibility(),
            is_static: true,
            is_final: false,
        },
        Placement::Member | Placement::Local => Modifiers {
            visibility: DeclVisibility::Package,
            is_static: false,
            is_final: false,
        },
    }
}

/// ` extends A, B` or ` implements A, B`
fn write_type_list(p: &mut Printer, keyword: &str, types: &[JavaType]) {
    if types.is_empty() {
        return;
    }
    p.write(keyword.to_string());
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            p.write_tight(",");
        }
        p.write_deferred(Deferred::Type {
            ty: ty.clone(),
            boxed: true,
        });
    }
}

/// Opening line of a type declaration: modifiers, keyword and name.
fn type_opening(modifiers: Modifiers, placement: Placement, keyword: &str, id: DeclId, line: u32) -> Printer {
    let mut p = Printer::new();
    p.writeln(None);
    p.mark(line);
    if placement == Placement::Module {
        p.write(modifiers.visibility.keyword());
        p.write("static");
    }
    p.write(keyword.to_string());
    p.write_deferred(Deferred::Name(id));
    p
}

impl<'a> Lowerer<'a> {
    // ------------------------------------------------------------------
    // Declaration
    // ------------------------------------------------------------------

    fn declare_type(
        &mut self,
        name: &str,
        info: ClassInfo,
        placement: Placement,
        export: Export,
        name_span: Span,
        span: Span,
    ) -> DeclId {
        let decl = self
            .new_decl(name, DeclKind::Class(info), JavaType::object(), name_span)
            .with_placement(placement)
            .with_modifiers(type_modifiers(placement, export));
        let id = self.alloc(decl);
        self.set_type(id, JavaType::class(id));
        self.hoisted.insert(span_key(&span), id);
        id
    }

    /// Whether a module-level type becomes the unit class: a default
    /// export (classes only) or a type named like the unit. The first such
    /// type in the file wins.
    fn claims_unit_class(&self, name: &str, placement: Placement, by_default: bool) -> bool {
        placement == Placement::Module
            && self.unit.unit_class.is_none()
            && (by_default || name == self.unit.class_name)
    }

    /// Allocate a class declaration. The unit class takes the unit's class
    /// name.
    pub(super) fn declare_class(
        &mut self,
        class: &ClassDecl,
        placement: Placement,
        export: Export,
    ) -> DeclId {
        let unit_class = self.claims_unit_class(&class.name.name, placement, export == Export::Default);
        let name = if unit_class {
            self.unit.class_name.clone()
        } else {
            class.name.name.clone()
        };
        let mut info = ClassInfo::new(ClassFlavor::Class);
        info.is_abstract = class.is_abstract;
        info.is_unit_class = unit_class;
        self.declare_type(&name, info, placement, export, class.name.span, class.span)
    }

    pub(super) fn declare_interface(
        &mut self,
        interface: &InterfaceDecl,
        placement: Placement,
        export: Export,
    ) -> DeclId {
        let mut info = ClassInfo::new(ClassFlavor::Interface);
        info.is_unit_class = self.claims_unit_class(&interface.name.name, placement, false);
        self.declare_type(
            &interface.name.name,
            info,
            placement,
            export,
            interface.name.span,
            interface.span,
        )
    }

    /// Allocate an enum and its constants. Constant initializers are
    /// dropped.
    pub(super) fn declare_enum(
        &mut self,
        decl: &EnumDecl,
        placement: Placement,
        export: Export,
    ) -> DeclId {
        let mut info = ClassInfo::new(ClassFlavor::Enum);
        info.is_unit_class = self.claims_unit_class(&decl.name.name, placement, false);
        let id = self.declare_type(&decl.name.name, info, placement, export, decl.name.span, decl.span);
        for member in &decl.members {
            if let Some(init) = &member.initializer {
                self.skip("enum initializer", &init.span());
            }
            let modifiers = Modifiers {
                visibility: DeclVisibility::Public,
                is_static: true,
                is_final: true,
            };
            let constant = self
                .new_decl(&member.name.name, DeclKind::EnumConstant, JavaType::class(id), member.name.span)
                .with_placement(Placement::Member)
                .with_modifiers(modifiers);
            let constant = self.alloc(constant);
            self.ctx.decls.add_member(id, &member.name.name, constant);
        }
        id
    }

    /// Type aliases are erased: the alias resolves to the aliased type.
    pub(super) fn declare_type_alias(&mut self, alias: &TypeAliasDecl) -> DeclId {
        self.scopes.push_scope(ScopeKind::Block, &alias.name.name);
        self.declare_type_params(alias.type_params.as_deref());
        let ty = self.annotation_type(&alias.type_annotation);
        self.scopes.pop_scope();
        self.skip("type alias declaration", &alias.span);
        let decl = self
            .new_decl(&alias.name.name, DeclKind::TypeAlias, ty, alias.name.span)
            .with_placement(Placement::Module);
        self.alloc(decl)
    }

    fn enter_class(&mut self, source_name: &str, id: DeclId) {
        self.scopes.push_scope(ScopeKind::Class, source_name);
        self.classes.push(ClassFrame {
            source_name: source_name.to_string(),
            decl: id,
        });
    }

    fn leave_class(&mut self) {
        self.classes.pop();
        self.scopes.pop_scope();
    }

    fn set_class_header(
        &mut self,
        id: DeclId,
        type_params: Vec<TypeParam>,
        extends: Option<JavaType>,
        implements: Vec<JavaType>,
    ) {
        if let DeclKind::Class(info) = &mut self.ctx.decls.get_mut(id).kind {
            info.type_params = type_params.iter().map(|p| p.name.clone()).collect();
            info.extends = extends;
            info.implements = implements;
        }
        self.class_type_params.insert(id, type_params);
    }

    fn add_member_decl(&mut self, class: DeclId, name: &str, member: DeclId, span: Span) {
        self.ctx.decls.add_member(class, name, member);
        self.hoisted.insert(span_key(&span), member);
    }

    // ------------------------------------------------------------------
    // Member hoisting
    // ------------------------------------------------------------------

    /// Resolve a class header and register its fields, methods and
    /// parameter properties.
    pub(super) fn hoist_class_members(&mut self, class: &ClassDecl, id: DeclId) {
        self.enter_class(&class.name.name, id);
        let type_params = self.declare_type_params(class.type_params.as_deref());
        let extends = class.extends.as_ref().map(|a| self.annotation_type(a));
        let implements: Vec<JavaType> = class
            .implements
            .iter()
            .map(|a| self.annotation_type(a))
            .collect();

        for member in &class.members {
            match member {
                ClassMember::Field(field) => {
                    let ty = match (&field.type_annotation, &field.initializer) {
                        (Some(annotation), _) => self.annotation_type(annotation),
                        (None, Some(init)) => self.type_of(init),
                        (None, None) => JavaType::object(),
                    };
                    let mut decl = self
                        .new_decl(&field.name.name, DeclKind::Variable, ty, field.name.span)
                        .with_placement(Placement::Member)
                        .with_modifiers(member_modifiers(&field.modifiers));
                    decl.annotated = field.type_annotation.is_some();
                    decl.has_initializer = field.initializer.is_some();
                    let member = self.alloc(decl);
                    self.add_member_decl(id, &field.name.name, member, field.span);
                }
                ClassMember::Method(method) => self.hoist_method(method, id),
                ClassMember::Constructor(ctor) => {
                    for param in &ctor.params {
                        if param.accessibility.is_none() && !param.readonly {
                            continue;
                        }
                        let ident = match param.name() {
                            Some(ident) => ident,
                            None => continue,
                        };
                        let ty = self.param_type(param);
                        let modifiers = Modifiers {
                            visibility: member_visibility(param.accessibility),
                            is_static: false,
                            is_final: param.readonly,
                        };
                        let mut decl = self
                            .new_decl(&ident.name, DeclKind::Variable, ty, ident.span)
                            .with_placement(Placement::Member)
                            .with_modifiers(modifiers);
                        decl.annotated = param.type_annotation.is_some();
                        let member = self.alloc(decl);
                        self.add_member_decl(id, &ident.name, member, param.span);
                    }
                }
            }
        }

        self.leave_class();
        self.set_class_header(id, type_params, extends, implements);
    }

    fn hoist_method(&mut self, method: &MethodDecl, class: DeclId) {
        if method.kind != MethodKind::Method {
            self.skip("accessor", &method.span);
            return;
        }
        if method.body.is_none() && !method.modifiers.is_abstract {
            self.skip("overload signature", &method.span);
            return;
        }
        let ty = self.signature_type(
            method.type_params.as_deref(),
            &method.params,
            method.return_type.as_ref(),
            method.body.as_ref(),
        );
        let mut decl = self
            .new_decl(&method.name.name, DeclKind::Function, ty, method.name.span)
            .with_placement(Placement::Member)
            .with_modifiers(member_modifiers(&method.modifiers));
        decl.annotated = method.return_type.is_some();
        let member = self.alloc(decl);
        self.add_member_decl(class, &method.name.name, member, method.span);
    }

    /// Register interface properties and method signatures. Extended
    /// interfaces are kept in `implements`.
    pub(super) fn hoist_interface_members(&mut self, interface: &InterfaceDecl, id: DeclId) {
        self.enter_class(&interface.name.name, id);
        let type_params = self.declare_type_params(interface.type_params.as_deref());
        let extends: Vec<JavaType> = interface
            .extends
            .iter()
            .map(|a| self.annotation_type(a))
            .collect();
        let modifiers = Modifiers {
            visibility: DeclVisibility::Public,
            is_static: false,
            is_final: false,
        };

        for member in &interface.members {
            match member {
                InterfaceMember::Property {
                    name,
                    type_annotation,
                    span,
                    ..
                } => {
                    let ty = self.annotation_type(type_annotation);
                    let mut decl = self
                        .new_decl(&name.name, DeclKind::Variable, ty, name.span)
                        .with_placement(Placement::Member)
                        .with_modifiers(modifiers);
                    decl.annotated = true;
                    let member = self.alloc(decl);
                    self.add_member_decl(id, &name.name, member, *span);
                }
                InterfaceMember::Method {
                    name,
                    type_params,
                    params,
                    return_type,
                    span,
                } => {
                    let ty = self.signature_type(
                        type_params.as_deref(),
                        params,
                        return_type.as_ref(),
                        None,
                    );
                    let mut decl = self
                        .new_decl(&name.name, DeclKind::Function, ty, name.span)
                        .with_placement(Placement::Member)
                        .with_modifiers(modifiers);
                    decl.annotated = return_type.is_some();
                    let member = self.alloc(decl);
                    self.add_member_decl(id, &name.name, member, *span);
                }
            }
        }

        self.leave_class();
        self.set_class_header(id, type_params, None, extends);
    }

    // ------------------------------------------------------------------
    // Emission
    // ------------------------------------------------------------------

    /// Bind the hoisted type parameters of a class in the current scope.
    fn redeclare_type_params(&mut self, params: &[TypeParam]) {
        for param in params {
            let decl = self.new_decl(
                &param.name,
                DeclKind::TypeParameter,
                JavaType::TypeParam(param.clone()),
                Span::default(),
            );
            let id = self.alloc(decl);
            self.scopes.declare(&param.name, id);
        }
    }

    /// `<T> extends Base implements Shape`, joined to the type name.
    fn type_header(&self, id: DeclId) -> Printer {
        let mut p = Printer::new();
        if let Some(params) = self.class_type_params.get(&id) {
            p.append_tight(Self::type_params_printer(params));
        }
        if let Some(info) = self.decl(id).class_info() {
            match info.flavor {
                ClassFlavor::Interface => write_type_list(&mut p, "extends", &info.implements),
                ClassFlavor::Class | ClassFlavor::Enum => {
                    if let Some(extends) = &info.extends {
                        write_type_list(&mut p, "extends", std::slice::from_ref(extends));
                    }
                    write_type_list(&mut p, "implements", &info.implements);
                }
            }
        }
        p
    }

    /// A nested or local class.
    pub(super) fn lower_class(&mut self, class: &ClassDecl, id: DeclId) -> Printer {
        let (header, members) = self.lower_class_parts(class, id);
        let decl = self.decl(id);
        let is_abstract = decl.class_info().is_some_and(|info| info.is_abstract);
        let keyword = if is_abstract { "abstract class" } else { "class" };
        let mut p = type_opening(decl.modifiers, decl.placement, keyword, id, class.span.line);
        p.append(header);
        let mut body = Printer::new();
        for member in members {
            Self::push_member(&mut body, member);
        }
        p.write_body(body);
        p
    }

    /// The unit class: its header and members go straight into the class
    /// of the unit.
    pub(super) fn lower_unit_class(&mut self, class: &ClassDecl, id: DeclId) {
        let (header, members) = self.lower_class_parts(class, id);
        self.unit.header = header;
        for member in members {
            Self::push_member(&mut self.unit.root, member);
        }
    }

    fn lower_class_parts(&mut self, class: &ClassDecl, id: DeclId) -> (Printer, Vec<Printer>) {
        self.enter_class(&class.name.name, id);
        let params = self.class_type_params.get(&id).cloned().unwrap_or_default();
        self.redeclare_type_params(&params);
        let header = self.type_header(id);

        let mut members = Vec::new();
        for member in &class.members {
            match member {
                ClassMember::Field(field) => {
                    if let Some(field_id) = self.hoisted.get(&span_key(&field.span)).copied() {
                        let printer = self.lower_field(
                            field_id,
                            field.initializer.as_ref(),
                            field.type_annotation.is_some(),
                            field.span.line,
                        );
                        members.push(printer);
                    }
                }
                ClassMember::Method(method) => {
                    if let Some(method_id) = self.hoisted.get(&span_key(&method.span)).copied() {
                        members.extend(self.lower_method(method, method_id));
                    }
                }
                ClassMember::Constructor(ctor) => {
                    for param in &ctor.params {
                        if let Some(field_id) = self.hoisted.get(&span_key(&param.span)).copied() {
                            members.push(self.lower_field(field_id, None, true, param.span.line));
                        }
                    }
                    let visibility = member_visibility(ctor.modifiers.visibility).keyword();
                    members.extend(self.lower_callable(Callable {
                        kind: CallableKind::Constructor,
                        decl: id,
                        modifiers: vec![visibility],
                        type_params: None,
                        params: &ctor.params,
                        return_type: None,
                        body: Some(&ctor.body),
                        span: ctor.span,
                        name: &class.name.name,
                    }));
                }
            }
        }
        members.extend(self.property_accessors(id));
        self.leave_class();
        (header, members)
    }

    fn lower_method(&mut self, method: &MethodDecl, id: DeclId) -> Vec<Printer> {
        let modifiers = self.decl(id).modifiers;
        let mut words = vec![modifiers.visibility.keyword()];
        if modifiers.is_static {
            words.push("static");
        }
        let kind = match method.body {
            Some(_) => CallableKind::Method,
            None => {
                words.push("abstract");
                CallableKind::Signature
            }
        };
        self.lower_callable(Callable {
            kind,
            decl: id,
            modifiers: words,
            type_params: method.type_params.as_deref(),
            params: &method.params,
            return_type: method.return_type.as_ref(),
            body: method.body.as_ref(),
            span: method.span,
            name: &method.name.name,
        })
    }

    /// Field declaration with its inline initializer.
    fn lower_field(
        &mut self,
        id: DeclId,
        initializer: Option<&Expression>,
        annotated: bool,
        line: u32,
    ) -> Printer {
        let modifiers = self.decl(id).modifiers;
        let mut p = Printer::new();
        p.writeln(None);
        p.mark(line);
        p.write(modifiers.visibility.keyword());
        if modifiers.is_static {
            p.write("static");
        }
        if modifiers.is_final {
            p.write("final");
        }
        p.write_deferred(Deferred::DeclType {
            decl: id,
            allow_var: false,
        });
        p.write_deferred(Deferred::Name(id));
        if let Some(init) = initializer {
            let expected = self.decl(id).ty.clone();
            let value = self.lower_initializer(init, Some(&expected));
            if !annotated {
                let ty = self.type_of(init);
                self.set_type(id, ty);
            }
            p.write("=");
            p.append(value);
        }
        p.write_tight(";");
        p
    }

    /// `public T name() { return this.name; }` for every property of an
    /// implemented interface that the class stores in a field. Interfaces
    /// whose unit is not lowered yet are not visible here.
    fn property_accessors(&self, id: DeclId) -> Vec<Printer> {
        let info = match self.decl(id).class_info() {
            Some(info) => info,
            None => return Vec::new(),
        };
        let mut accessors = Vec::new();
        for parent in &info.implements {
            let parent = match self.ctx.resolve_type(parent) {
                JavaType::Class(class) => class.decl,
                _ => continue,
            };
            let mut properties: Vec<(&String, DeclId)> = match self.decl(parent).class_info() {
                Some(parent) if parent.flavor == ClassFlavor::Interface => parent
                    .members
                    .iter()
                    .filter(|(_, member)| self.decl(**member).kind == DeclKind::Variable)
                    .map(|(name, member)| (name, *member))
                    .collect(),
                _ => continue,
            };
            properties.sort_by_key(|(_, member)| member.0);

            for (name, _) in properties {
                let field = match info.members.get(name) {
                    Some(field) if self.decl(*field).kind == DeclKind::Variable => *field,
                    _ => continue,
                };
                let mut body = Printer::new();
                body.writeln(Some("return"));
                body.write("this");
                body.write_tight(".");
                body.write_tight(name.clone());
                body.write_tight(";");

                let mut p = Printer::new();
                p.writeln(None);
                p.mark(self.decl(field).span.line);
                p.write("public");
                p.write_deferred(Deferred::DeclType {
                    decl: field,
                    allow_var: false,
                });
                p.write(name.clone());
                p.write_tight("()");
                p.write_body(body);
                accessors.push(p);
            }
        }
        accessors
    }

    pub(super) fn lower_interface(&mut self, interface: &InterfaceDecl, id: DeclId) -> Printer {
        let (header, members) = self.lower_interface_parts(interface, id);
        let decl = self.decl(id);
        let mut p = type_opening(decl.modifiers, decl.placement, "interface", id, interface.span.line);
        p.append(header);
        let mut body = Printer::new();
        for member in members {
            Self::push_member(&mut body, member);
        }
        p.write_body(body);
        p
    }

    /// An interface named like its unit becomes the unit's own type.
    pub(super) fn lower_unit_interface(&mut self, interface: &InterfaceDecl, id: DeclId) {
        let (header, members) = self.lower_interface_parts(interface, id);
        self.unit.header = header;
        for member in members {
            Self::push_member(&mut self.unit.root, member);
        }
    }

    fn lower_interface_parts(&mut self, interface: &InterfaceDecl, id: DeclId) -> (Printer, Vec<Printer>) {
        self.enter_class(&interface.name.name, id);
        let params = self.class_type_params.get(&id).cloned().unwrap_or_default();
        self.redeclare_type_params(&params);
        let header = self.type_header(id);

        let mut members = Vec::new();
        for member in &interface.members {
            match member {
                InterfaceMember::Property { name, span, .. } => {
                    if let Some(member) = self.hoisted.get(&span_key(span)).copied() {
                        let mut p = Printer::new();
                        p.writeln(None);
                        p.mark(span.line);
                        p.write_deferred(Deferred::DeclType {
                            decl: member,
                            allow_var: false,
                        });
                        p.write(name.name.clone());
                        p.write_tight("()");
                        p.write_tight(";");
                        members.push(p);
                    }
                }
                InterfaceMember::Method {
                    name,
                    type_params,
                    params,
                    return_type,
                    span,
                } => {
                    if let Some(member) = self.hoisted.get(&span_key(span)).copied() {
                        let printers = self.lower_callable(Callable {
                            kind: CallableKind::Signature,
                            decl: member,
                            modifiers: Vec::new(),
                            type_params: type_params.as_deref(),
                            params,
                            return_type: return_type.as_ref(),
                            body: None,
                            span: *span,
                            name: &name.name,
                        });
                        members.extend(printers);
                    }
                }
            }
        }
        self.leave_class();
        (header, members)
    }

    pub(super) fn lower_enum(&mut self, decl: &EnumDecl, id: DeclId) -> Printer {
        let constants = enum_constants(decl);
        let declaration = self.decl(id);
        let mut p = type_opening(
            declaration.modifiers,
            declaration.placement,
            "enum",
            id,
            decl.span.line,
        );
        p.write_body(constants);
        p
    }

    /// An enum named like its unit becomes the unit's own type. Its
    /// constants come first and are closed with `;` so module members can
    /// follow.
    pub(super) fn lower_unit_enum(&mut self, decl: &EnumDecl) {
        let mut root = enum_constants(decl);
        if root.is_empty() {
            root.writeln(Some(";"));
        } else {
            root.write_tight(";");
        }
        root.append(std::mem::take(&mut self.unit.root));
        self.unit.root = root;
    }
}

fn enum_constants(decl: &EnumDecl) -> Printer {
    let mut constants = Printer::new();
    if !decl.members.is_empty() {
        constants.writeln(None);
        for (i, member) in decl.members.iter().enumerate() {
            if i > 0 {
                constants.write_tight(",");
            }
            constants.write(member.name.name.clone());
        }
    }
    constants
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

    fn emit(file: &str, source: &str) -> (BuildContext, String) {
        let mut ctx = BuildContext::new(TargetConfig::default());
        let path = Path::new(file);
        let identity = UnitIdentity::from_path(path, &ctx.config);
        let module = Parser::new(source).unwrap().parse().unwrap();
        let unit = Lowerer::new(&mut ctx, &NoModules, path, identity).lower_module(&module);
        ctx.units.insert(unit);
        let (units, _) = finalize_build(&mut ctx).unwrap();
        let code = units[0].code.clone();
        (ctx, code)
    }

    #[test]
    fn test_nested_class_with_constructor() {
        let (_, code) = emit(
            "shapes.ts",
            "export class Point {\n  constructor(private x: number, public y: number = 0) {}\n  sum(): number { return this.x + this.y; }\n}\n",
        );
        assert!(code.contains("public static class Point {"));
        assert!(code.contains("private double x;"));
        assert!(code.contains("public double y;"));
        assert!(code.contains("public Point(double x, double y) {"));
        assert!(code.contains("this.x = x;"));
        assert!(code.contains("public Point(double x) {"));
        assert!(code.contains("this(x, 0);"));
        assert!(code.contains("public double sum() {"));
        assert!(code.contains("return this.x + this.y;"));
    }

    #[test]
    fn test_forward_type_reference_in_same_file() {
        let (ctx, code) = emit(
            "zoo.ts",
            "export function make(): Animal { return new Animal(); }\nexport class Animal {}\n",
        );
        assert!(code.contains("public static Animal make() {"));
        assert!(code.contains("return new Animal();"));
        let unit = ctx.units.iter().next().unwrap();
        assert!(unit.diagnostics.is_empty());
    }

    #[test]
    fn test_default_class_is_the_unit_class() {
        let (_, code) = emit(
            "counter.ts",
            "export default class Counter extends Error {\n  count: number = 0;\n  bump(): void { this.count++; }\n}\n",
        );
        assert!(code.contains("public class Counter extends RuntimeException {"));
        assert!(code.contains("public double count = 0;"));
        assert!(code.contains("public void bump() {"));
        assert!(!code.contains("static class"));
    }

    #[test]
    fn test_interface_properties_become_accessors() {
        let (_, code) = emit(
            "people.ts",
            "interface Named { name: string; greet(other: Named): string; }\nclass Person implements Named {\n  constructor(public name: string) {}\n  greet(other: Named): string { return \"hi \" + other.name; }\n}\n",
        );
        assert!(code.contains("private static interface Named {"));
        assert!(code.contains("String name();"));
        assert!(code.contains("String greet(Named other);"));
        assert!(code.contains("private static class Person implements Named {"));
        assert!(code.contains("return \"hi \" + other.name();"));
        assert!(code.contains("public String name() {\n"));
        assert!(code.contains("return this.name;"));
    }

    #[test]
    fn test_enum_and_abstract_class() {
        let (_, code) = emit(
            "kinds.ts",
            "export enum Color { Red, Green = 2 }\nexport abstract class Shape {\n  abstract area(): number;\n}\n",
        );
        assert!(code.contains("public static enum Color {"));
        assert!(code.contains("Red, Green"));
        assert!(code.contains("public static abstract class Shape {"));
        assert!(code.contains("public abstract double area();"));
    }

    #[test]
    fn test_class_named_like_the_unit_is_the_unit_class() {
        let (ctx, code) = emit(
            "item.ts",
            "export class Item {\n  size: number = 1;\n}\nexport function make(): Item { return new Item(); }\n",
        );
        assert!(code.contains("public class Item {"));
        assert!(code.contains("public double size = 1;"));
        assert!(code.contains("public static Item make() {"));
        assert!(!code.contains("static class Item"));
        let unit = ctx.units.iter().next().unwrap();
        assert!(unit.exports.contains_key("Item"));
    }

    #[test]
    fn test_interface_and_enum_named_like_the_unit() {
        let (_, shape) = emit("shape.ts", "export interface Shape { area(): number; }\n");
        assert!(shape.contains("public interface Shape {"));
        assert!(shape.contains("double area();"));
        assert!(!shape.contains("static interface"));

        let (_, color) = emit(
            "color.ts",
            "export function count(): number { return 2; }\nexport enum Color { Red, Green }\n",
        );
        assert!(color.contains("public enum Color {"));
        assert!(!color.contains("static enum"));
        let constants = color.find("Red, Green;").unwrap();
        let function = color.find("public static double count()").unwrap();
        assert!(constants < function);
    }
}
