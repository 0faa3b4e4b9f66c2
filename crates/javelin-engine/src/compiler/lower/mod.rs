//! Lowering engine
//!
//! Turns one parsed module into the Printer buffers of its
//! [`CompilationUnit`]. Lowering runs in two steps:
//!
//! 1. **Hoisting** registers every top-level declaration (imports, functions,
//!    variables, classes, interfaces, enums, type aliases) so that code can
//!    refer to declarations that appear later in the file.
//! 2. **Emission** walks the statements again and writes Java text. Anything
//!    that depends on other units (names, types, `.call` suffixes) is written
//!    as a deferred fragment and settled at finalization.
//!
//! Statement, expression, class and callable lowering live in the
//! submodules; this file holds the shared state and the module level.

mod callable;
mod class;
mod expr;
pub mod infer;
pub mod intrinsics;
mod stmt;

pub use callable::{overload_arities, trailing_default_run};

use std::path::Path;

use rustc_hash::FxHashMap;

use crate::parser::ast::{
    ExportDecl, ExportSpecifier, Expression, Identifier, ImportDecl, ImportSpecifier, Module,
    Statement, StringLiteral, TypeAnnotation, TypeParameter, VariableDecl, VariableKind,
};
use crate::parser::token::Span;

use super::build::ModuleHost;
use super::context::BuildContext;
use super::decl::{
    DeclId, DeclKind, DeclVisibility, Declaration, ImportTarget, ImportedName, Modifiers,
    Placement,
};
use super::diagnostic::Diagnostic;
use super::printer::{Deferred, Printer};
use super::resolver::{NameResolver, Resolved};
use super::scope::ScopeTree;
use super::types::{Bound, JavaType, TypeParam};
use super::unit::{CompilationUnit, UnitIdentity, UnitState};

type SpanKey = (usize, usize);

fn span_key(span: &Span) -> SpanKey {
    (span.start, span.end)
}

/// How a top-level declaration is exported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Export {
    None,
    Named,
    Default,
}

impl Export {
    fn visibility(self) -> DeclVisibility {
        match self {
            Export::None => DeclVisibility::Private,
            Export::Named | Export::Default => DeclVisibility::Public,
        }
    }
}

/// Innermost class being lowered
#[derive(Debug, Clone)]
struct ClassFrame {
    source_name: String,
    decl: DeclId,
}

/// Innermost function body being lowered
#[derive(Debug, Clone, Default)]
struct FunctionFrame {
    /// Infer the return type from the first `return value;`
    infer_return: bool,
    returned: Option<JavaType>,
}

/// Lowers one unit against the shared build context
pub struct Lowerer<'a> {
    ctx: &'a mut BuildContext,
    host: &'a dyn ModuleHost,
    unit: CompilationUnit,
    fqn: String,
    scopes: ScopeTree,
    classes: Vec<ClassFrame>,
    functions: Vec<FunctionFrame>,
    /// Function types of lowered lambdas, by source span
    lambda_types: FxHashMap<SpanKey, JavaType>,
    /// Declarations created while hoisting, by the span of their syntax
    hoisted: FxHashMap<SpanKey, DeclId>,
    /// Resolved type parameters of hoisted classes and interfaces
    class_type_params: FxHashMap<DeclId, Vec<TypeParam>>,
}

impl<'a> Lowerer<'a> {
    pub fn new(
        ctx: &'a mut BuildContext,
        host: &'a dyn ModuleHost,
        path: &Path,
        identity: UnitIdentity,
    ) -> Self {
        let mut unit = CompilationUnit::new(path, identity);
        unit.state = UnitState::Lowering;
        let fqn = unit.fqn();
        Self {
            ctx,
            host,
            unit,
            fqn,
            scopes: ScopeTree::new(),
            classes: Vec::new(),
            functions: Vec::new(),
            lambda_types: FxHashMap::default(),
            hoisted: FxHashMap::default(),
            class_type_params: FxHashMap::default(),
        }
    }

    /// Lower every statement of `module` and hand back the lowered unit.
    pub fn lower_module(mut self, module: &Module) -> CompilationUnit {
        self.hoist(module);
        for statement in &module.statements {
            self.lower_top_level(statement);
        }
        self.unit.state = UnitState::Lowered;
        tracing::debug!(
            target: "javelin::lower",
            unit = %self.fqn,
            decls = self.ctx.decls.len(),
            scopes = self.scopes.scope_count(),
            "lowered unit"
        );
        self.unit
    }

    // ------------------------------------------------------------------
    // Shared helpers
    // ------------------------------------------------------------------

    fn resolver(&self) -> NameResolver<'_> {
        NameResolver {
            scopes: &self.scopes,
            unit: &self.unit,
            decls: &self.ctx.decls,
            class_self: self
                .classes
                .last()
                .map(|frame| (frame.source_name.as_str(), frame.decl)),
        }
    }

    fn resolve(&self, name: &str) -> Option<Resolved> {
        self.resolver().resolve(name)
    }

    fn annotation_type(&mut self, annotation: &TypeAnnotation) -> JavaType {
        let mut diagnostics = Vec::new();
        let ty = self.resolver().resolve_annotation(annotation, &mut diagnostics);
        self.unit.diagnostics.extend(diagnostics);
        ty
    }

    fn alloc(&mut self, decl: Declaration) -> DeclId {
        self.ctx.decls.alloc(decl)
    }

    fn decl(&self, id: DeclId) -> &Declaration {
        self.ctx.decls.get(id)
    }

    fn new_decl(&self, name: &str, kind: DeclKind, ty: JavaType, span: Span) -> Declaration {
        Declaration::new(&self.fqn, name, kind, ty, span)
    }

    fn set_type(&mut self, id: DeclId, ty: JavaType) {
        self.ctx.decls.get_mut(id).ty = ty;
    }

    fn report_unresolved(&mut self, name: &str, span: Span) {
        let diagnostic = Diagnostic::unresolved_identifier(name, &self.unit.path, span);
        self.unit.diagnostics.push(diagnostic);
    }

    fn skip(&self, what: &str, span: &Span) {
        tracing::trace!(
            target: "javelin::lower",
            unit = %self.fqn,
            line = span.line,
            "skipping unsupported {}",
            what
        );
    }

    fn current_class(&self) -> Option<DeclId> {
        self.classes.last().map(|frame| frame.decl)
    }

    /// Declare type parameters in the current scope.
    fn declare_type_params(&mut self, params: Option<&[TypeParameter]>) -> Vec<TypeParam> {
        let mut declared = Vec::new();
        for param in params.unwrap_or_default() {
            let ty = JavaType::TypeParam(TypeParam {
                name: param.name.name.clone(),
                bound: None,
            });
            let decl = self.new_decl(&param.name.name, DeclKind::TypeParameter, ty, param.span);
            let id = self.alloc(decl);
            self.scopes.declare(&param.name.name, id);
            let bound = param
                .constraint
                .as_ref()
                .map(|c| Bound::Extends(Box::new(self.annotation_type(c))));
            declared.push(TypeParam {
                name: param.name.name.clone(),
                bound,
            });
        }
        declared
    }

    /// `<T, U extends Shape>`
    fn type_params_printer(params: &[TypeParam]) -> Printer {
        let mut p = Printer::new();
        if params.is_empty() {
            return p;
        }
        p.write("<");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                p.write_tight(",");
                p.write(param.name.clone());
            } else {
                p.write_tight(param.name.clone());
            }
            match &param.bound {
                Some(Bound::Extends(ty)) => {
                    p.write("extends");
                    p.write_deferred(Deferred::Type {
                        ty: (**ty).clone(),
                        boxed: true,
                    });
                }
                Some(Bound::Super(ty)) => {
                    p.write("super");
                    p.write_deferred(Deferred::Type {
                        ty: (**ty).clone(),
                        boxed: true,
                    });
                }
                None => {}
            }
        }
        p.write_tight(">");
        p
    }

    /// Add a member to a class body, separated from the previous one by a
    /// blank line.
    fn push_member(body: &mut Printer, member: Printer) {
        if member.is_empty() {
            return;
        }
        if !body.is_empty() {
            body.writeln(None);
        }
        body.append(member);
    }

    // ------------------------------------------------------------------
    // Hoisting
    // ------------------------------------------------------------------

    fn hoist(&mut self, module: &Module) {
        let declarations: Vec<(&Statement, Export)> = module
            .statements
            .iter()
            .filter_map(|statement| match statement {
                Statement::ExportDecl(ExportDecl::Declaration(inner)) => {
                    Some((inner.as_ref(), Export::Named))
                }
                Statement::ExportDecl(ExportDecl::DefaultDeclaration(inner)) => {
                    Some((inner.as_ref(), Export::Default))
                }
                Statement::ExportDecl(_) | Statement::ImportDecl(_) => None,
                other => Some((other, Export::None)),
            })
            .collect();
        // Type names first, then aliases over them, so signatures can name
        // types declared further down the file.
        for (statement, export) in &declarations {
            self.hoist_type_name(statement, *export);
        }
        for (statement, export) in &declarations {
            if let Statement::TypeAliasDecl(alias) = statement {
                let id = self.declare_type_alias(alias);
                self.scopes.declare(&alias.name.name, id);
                if *export == Export::Named {
                    self.unit.exports.insert(alias.name.name.clone(), id);
                }
            }
        }

        let mut local_exports: Vec<&ExportSpecifier> = Vec::new();
        for statement in &module.statements {
            match statement {
                Statement::ImportDecl(import) => self.hoist_import(import),
                Statement::ExportDecl(export) => match export {
                    ExportDecl::Declaration(inner) => self.hoist_declaration(inner, Export::Named),
                    ExportDecl::DefaultDeclaration(inner) => {
                        self.hoist_declaration(inner, Export::Default)
                    }
                    ExportDecl::DefaultExpression { expression, span } => {
                        self.hoist_default_expression(expression, *span)
                    }
                    ExportDecl::Named {
                        specifiers,
                        source: None,
                        ..
                    } => local_exports.extend(specifiers),
                    ExportDecl::Named {
                        specifiers,
                        source: Some(source),
                        ..
                    } => self.hoist_reexports(specifiers, source),
                    ExportDecl::All {
                        source,
                        alias,
                        span,
                    } => self.hoist_export_all(source, alias.as_ref(), *span),
                },
                other => self.hoist_declaration(other, Export::None),
            }
        }

        for specifier in local_exports {
            let resolved = self.resolver().resolve_decl(&specifier.local.name);
            match resolved {
                Some(id) => {
                    let exported = specifier.exported_name().name.clone();
                    let decl = self.ctx.decls.get_mut(id);
                    if decl.placement == Placement::Module && decl.unit == self.fqn {
                        decl.modifiers.visibility = DeclVisibility::Public;
                    }
                    if exported == "default" {
                        self.unit.default_export = Some(id);
                    } else {
                        self.unit.exports.insert(exported, id);
                    }
                }
                None => self.report_unresolved(&specifier.local.name, specifier.local.span),
            }
        }
    }

    /// FQN of the unit a module specifier names, or a W1002 warning.
    fn import_unit(&mut self, source: &StringLiteral) -> Option<String> {
        match self.host.resolve_specifier(&source.value, &self.unit.path) {
            Some(path) => Some(UnitIdentity::from_path(&path, &self.ctx.config).fqn()),
            None => {
                let diagnostic =
                    Diagnostic::unresolved_import(&source.value, &self.unit.path, source.span);
                self.unit.diagnostics.push(diagnostic);
                None
            }
        }
    }

    fn alloc_proxy(&mut self, local: &Identifier, unit: &str, name: ImportedName) -> DeclId {
        let target = ImportTarget {
            unit: unit.to_string(),
            name,
        };
        let decl = self
            .new_decl(&local.name, DeclKind::Import(target), JavaType::object(), local.span)
            .with_placement(Placement::Module);
        let id = self.alloc(decl);
        self.unit.proxies.push(id);
        id
    }

    fn hoist_import(&mut self, import: &ImportDecl) {
        let unit = match self.import_unit(&import.source) {
            Some(unit) => unit,
            None => return,
        };
        for specifier in &import.specifiers {
            let name = match specifier {
                ImportSpecifier::Default(_) => ImportedName::Default,
                ImportSpecifier::Named { imported, .. } => {
                    ImportedName::Named(imported.name.clone())
                }
                ImportSpecifier::Namespace(_) => ImportedName::Namespace,
            };
            let local = specifier.local_name();
            let id = self.alloc_proxy(local, &unit, name);
            self.unit.aliases.insert(local.name.clone(), id);
        }
    }

    fn hoist_reexports(&mut self, specifiers: &[ExportSpecifier], source: &StringLiteral) {
        let unit = match self.import_unit(source) {
            Some(unit) => unit,
            None => return,
        };
        for specifier in specifiers {
            let name = match specifier.local.name.as_str() {
                "default" => ImportedName::Default,
                other => ImportedName::Named(other.to_string()),
            };
            let exported = specifier.exported_name();
            let id = self.alloc_proxy(exported, &unit, name);
            self.unit.exports.insert(exported.name.clone(), id);
        }
    }

    fn hoist_export_all(&mut self, source: &StringLiteral, alias: Option<&Identifier>, _span: Span) {
        let unit = match self.import_unit(source) {
            Some(unit) => unit,
            None => return,
        };
        match alias {
            Some(alias) => {
                let id = self.alloc_proxy(alias, &unit, ImportedName::Namespace);
                self.unit.exports.insert(alias.name.clone(), id);
            }
            None => self.unit.reexports.push(unit),
        }
    }

    /// Bind a hoisted top-level declaration and record its export.
    fn register_module_decl(&mut self, source_name: &str, id: DeclId, export: Export) {
        self.scopes.declare(source_name, id);
        self.unit.module_decls.push(id);
        match export {
            Export::None => {}
            Export::Named => {
                self.unit.exports.insert(source_name.to_string(), id);
            }
            Export::Default => self.unit.default_export = Some(id),
        }
    }

    /// Declare the name of a class, interface or enum.
    fn hoist_type_name(&mut self, statement: &Statement, export: Export) {
        match statement {
            Statement::ClassDecl(class) => {
                let id = self.declare_class(class, Placement::Module, export);
                self.register_type_decl(&class.name.name, id, export);
            }
            Statement::InterfaceDecl(interface) => {
                let id = self.declare_interface(interface, Placement::Module, export);
                self.register_type_decl(&interface.name.name, id, export);
            }
            Statement::EnumDecl(decl) => {
                let id = self.declare_enum(decl, Placement::Module, export);
                self.register_type_decl(&decl.name.name, id, export);
            }
            _ => {}
        }
    }

    /// Bind a hoisted type. The unit class is spelled as the unit itself,
    /// so it is not one of the unit's members.
    fn register_type_decl(&mut self, source_name: &str, id: DeclId, export: Export) {
        let is_unit_class = self.decl(id).class_info().is_some_and(|info| info.is_unit_class);
        if !is_unit_class {
            self.register_module_decl(source_name, id, export);
            return;
        }
        self.scopes.declare(source_name, id);
        self.unit.unit_class = Some(id);
        match export {
            Export::None => {}
            Export::Named => {
                self.unit.exports.insert(source_name.to_string(), id);
            }
            Export::Default => self.unit.default_export = Some(id),
        }
    }

    fn hoist_declaration(&mut self, statement: &Statement, export: Export) {
        match statement {
            Statement::FunctionDecl(function) => {
                let name = match export {
                    Export::Default => self.unit.class_name.clone(),
                    _ => function.name.name.clone(),
                };
                let ty = self.signature_type(
                    function.type_params.as_deref(),
                    &function.params,
                    function.return_type.as_ref(),
                    Some(&function.body),
                );
                let modifiers = Modifiers {
                    visibility: export.visibility(),
                    is_static: true,
                    is_final: false,
                };
                let mut decl = self
                    .new_decl(&name, DeclKind::Function, ty, function.name.span)
                    .with_placement(Placement::Module)
                    .with_modifiers(modifiers);
                decl.annotated = function.return_type.is_some();
                let id = self.alloc(decl);
                self.hoisted.insert(span_key(&function.span), id);
                if name == "main" {
                    self.unit.has_main = true;
                }
                self.register_module_decl(&function.name.name, id, export);
            }
            Statement::VariableDecl(variable) => self.hoist_variables(variable, export),
            Statement::ClassDecl(class) => {
                if let Some(id) = self.hoisted.get(&span_key(&class.span)).copied() {
                    self.hoist_class_members(class, id);
                }
            }
            Statement::InterfaceDecl(interface) => {
                if let Some(id) = self.hoisted.get(&span_key(&interface.span)).copied() {
                    self.hoist_interface_members(interface, id);
                }
            }
            _ => {}
        }
    }

    fn hoist_variables(&mut self, variable: &VariableDecl, export: Export) {
        for declarator in &variable.declarations {
            let ident = match declarator.pattern.as_identifier() {
                Some(ident) => ident,
                None => {
                    self.skip("destructuring declaration", &declarator.span);
                    continue;
                }
            };
            let ty = match &declarator.type_annotation {
                Some(annotation) => self.annotation_type(annotation),
                None => JavaType::object(),
            };
            let modifiers = Modifiers {
                visibility: export.visibility(),
                is_static: true,
                is_final: variable.kind == VariableKind::Const,
            };
            let mut decl = self
                .new_decl(&ident.name, DeclKind::Variable, ty, ident.span)
                .with_placement(Placement::Module)
                .with_modifiers(modifiers);
            decl.annotated = declarator.type_annotation.is_some();
            decl.has_initializer = declarator.initializer.is_some();
            let id = self.alloc(decl);
            self.hoisted.insert(span_key(&declarator.span), id);
            self.register_module_decl(&ident.name, id, export);
        }
    }

    /// `export default <expr>;` becomes a static field named after the
    /// unit, unless it names a declaration of this unit.
    fn hoist_default_expression(&mut self, expression: &Expression, span: Span) {
        if let Expression::Identifier(ident) = expression.unparenthesized() {
            let resolved = self.resolver().resolve_decl(&ident.name);
            if let Some(id) = resolved {
                self.unit.default_export = Some(id);
                return;
            }
        }
        let modifiers = Modifiers {
            visibility: DeclVisibility::Public,
            is_static: true,
            is_final: true,
        };
        let name = self.unit.class_name.clone();
        let mut decl = self
            .new_decl(&name, DeclKind::Variable, JavaType::object(), span)
            .with_placement(Placement::Module)
            .with_modifiers(modifiers);
        decl.has_initializer = true;
        let id = self.alloc(decl);
        self.hoisted.insert(span_key(&span), id);
        self.unit.module_decls.push(id);
        self.unit.default_export = Some(id);
    }

    // ------------------------------------------------------------------
    // Module level emission
    // ------------------------------------------------------------------

    fn lower_top_level(&mut self, statement: &Statement) {
        match statement {
            Statement::ImportDecl(_) => {}
            Statement::ExportDecl(export) => match export {
                ExportDecl::Declaration(inner) | ExportDecl::DefaultDeclaration(inner) => {
                    self.lower_top_level(inner)
                }
                ExportDecl::DefaultExpression { expression, span } => {
                    if let Some(id) = self.hoisted.get(&span_key(span)).copied() {
                        self.lower_module_field(id, Some(expression), None, *span);
                    }
                }
                ExportDecl::Named { .. } | ExportDecl::All { .. } => {}
            },
            Statement::FunctionDecl(function) => {
                if let Some(id) = self.hoisted.get(&span_key(&function.span)).copied() {
                    for member in self.lower_function_decl(function, id) {
                        Self::push_member(&mut self.unit.root, member);
                    }
                }
            }
            Statement::VariableDecl(variable) => {
                for declarator in &variable.declarations {
                    if let Some(id) = self.hoisted.get(&span_key(&declarator.span)).copied() {
                        self.lower_module_field(
                            id,
                            declarator.initializer.as_ref(),
                            declarator.type_annotation.as_ref(),
                            declarator.span,
                        );
                    }
                }
            }
            Statement::ClassDecl(class) => {
                if let Some(id) = self.hoisted.get(&span_key(&class.span)).copied() {
                    if self.unit.unit_class == Some(id) {
                        self.lower_unit_class(class, id);
                    } else {
                        let printer = self.lower_class(class, id);
                        Self::push_member(&mut self.unit.root, printer);
                    }
                }
            }
            Statement::InterfaceDecl(interface) => {
                if let Some(id) = self.hoisted.get(&span_key(&interface.span)).copied() {
                    if self.unit.unit_class == Some(id) {
                        self.lower_unit_interface(interface, id);
                    } else {
                        let printer = self.lower_interface(interface, id);
                        Self::push_member(&mut self.unit.root, printer);
                    }
                }
            }
            Statement::EnumDecl(decl) => {
                if let Some(id) = self.hoisted.get(&span_key(&decl.span)).copied() {
                    if self.unit.unit_class == Some(id) {
                        self.lower_unit_enum(decl);
                    } else {
                        let printer = self.lower_enum(decl, id);
                        Self::push_member(&mut self.unit.root, printer);
                    }
                }
            }
            Statement::TypeAliasDecl(_) => {}
            other => {
                let printer = self.lower_statement(other);
                self.unit.static_init.append(printer);
            }
        }
    }

    /// Static field in the unit class, initialized in the static block.
    fn lower_module_field(
        &mut self,
        id: DeclId,
        initializer: Option<&Expression>,
        annotation: Option<&TypeAnnotation>,
        span: Span,
    ) {
        if let Some(init) = initializer {
            let expected = annotation.map(|_| self.decl(id).ty.clone());
            let value = self.lower_initializer(init, expected.as_ref());
            if annotation.is_none() {
                let ty = self.type_of(init);
                self.set_type(id, ty);
            }
            let mut assign = Printer::new();
            assign.writeln(None);
            assign.mark(span.line);
            assign.write_deferred(Deferred::Name(id));
            assign.write("=");
            assign.append(value);
            assign.write_tight(";");
            self.unit.static_init.append(assign);
        }

        let modifiers = self.decl(id).modifiers;
        let mut field = Printer::new();
        field.writeln(None);
        field.mark(span.line);
        field.write(modifiers.visibility.keyword());
        field.write("static");
        if modifiers.is_final {
            field.write("final");
        }
        field.write_deferred(Deferred::DeclType {
            decl: id,
            allow_var: false,
        });
        field.write_deferred(Deferred::Name(id));
        field.write_tight(";");
        Self::push_member(&mut self.unit.root, field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::config::TargetConfig;
    use crate::compiler::finalize::finalize_build;
    use crate::parser::Parser;
    use std::path::PathBuf;

    struct NoModules;

    impl ModuleHost for NoModules {
        fn resolve_specifier(&self, _specifier: &str, _from: &Path) -> Option<PathBuf> {
            None
        }
    }

    fn lower(source: &str) -> (BuildContext, String) {
        let mut ctx = BuildContext::new(TargetConfig::default());
        let path = Path::new("main.ts");
        let identity = UnitIdentity::from_path(path, &ctx.config);
        let module = Parser::new(source).unwrap().parse().unwrap();
        let unit = Lowerer::new(&mut ctx, &NoModules, path, identity).lower_module(&module);
        ctx.units.insert(unit);
        let (units, _) = finalize_build(&mut ctx).unwrap();
        let code = units[0].code.clone();
        (ctx, code)
    }

    #[test]
    fn test_module_function_and_field() {
        let (_, code) = lower("export function twice(x: number): number { return x * 2; }\nconst y = twice(2);\n");
        assert!(code.starts_with("package app;\n"));
        assert!(code.contains("public static double twice(double x) {"));
        assert!(code.contains("private static final double y;"));
        assert!(code.contains("static {\n        y = twice(2);\n    }"));
        assert!(code.contains("public static void main(String[] args) {}"));
    }

    #[test]
    fn test_unresolved_identifier_is_reported() {
        let (ctx, _) = lower("console.log(missing);\n");
        let unit = ctx.units.iter().next().unwrap();
        assert_eq!(unit.error_count(), 1);
        assert_eq!(unit.diagnostics[0].code, "E1001");
    }

    #[test]
    fn test_unresolvable_import_is_dropped() {
        let (ctx, code) = lower("import { readFile } from \"fs\";\nexport const n = 1;\n");
        let unit = ctx.units.iter().next().unwrap();
        assert_eq!(unit.diagnostics.len(), 1);
        assert_eq!(unit.diagnostics[0].code, "W1002");
        assert!(!code.contains("import"));
    }

    #[test]
    fn test_default_function_is_renamed() {
        let (_, code) = lower("export default function helper(): void {}\nhelper();\n");
        assert!(code.contains("public static void Main() {}"));
        assert!(code.contains("Main();"));
        assert!(!code.contains("helper"));
    }
}
