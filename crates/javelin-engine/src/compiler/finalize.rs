//! Finalization: resolution pass and render pass
//!
//! Runs once, after every unit is lowered. For each unit the resolution
//! pass walks its deferred fragments in order, resolving types,
//! synthesizing function interfaces and filling the unit's import table.
//! The render pass then spells every fragment against that (now frozen)
//! table. Both passes share [`Speller`], so a name is spelled exactly as it
//! was requested.

use std::path::PathBuf;

use super::context::{BuildContext, Target};
use super::decl::{ClassFlavor, DeclId, DeclKind, ImportedName, Placement};
use super::error::{CompileError, CompileResult};
use super::imports::{ImportKind, ImportTable};
use super::interfaces::{CALL_METHOD, FUNCTIONS_CLASS};
use super::printer::{CallTarget, Deferred, DeferredResolver, EqualityPart, LineMapping, Printer};
use super::types::{FunctionType, JavaType};
use super::unit::{qualify, CompilationUnit, UnitState};

/// Rendered Java class of one unit
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedUnit {
    pub fqn: String,
    pub source: PathBuf,
    /// Relative to the output directory
    pub output: PathBuf,
    pub code: String,
    pub mappings: Vec<LineMapping>,
}

/// Rendered `Functions.java`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionsFile {
    pub output: PathBuf,
    pub code: String,
}

/// Finalize every lowered unit, then the function interface holder.
pub fn finalize_build(
    ctx: &mut BuildContext,
) -> CompileResult<(Vec<FinalizedUnit>, Option<FunctionsFile>)> {
    check_imports(ctx)?;

    let fqns: Vec<String> = ctx
        .units
        .iter()
        .filter(|u| u.state == UnitState::Lowered)
        .map(CompilationUnit::fqn)
        .collect();

    let mut finalized = Vec::with_capacity(fqns.len());
    for fqn in &fqns {
        let (result, functions, import_lines) = {
            let unit = match ctx.units.get(fqn) {
                Some(unit) => unit,
                None => continue,
            };
            finalize_unit(ctx, unit)
        };
        for function in &functions {
            ctx.interfaces.synthesize(function, &ctx.decls);
        }
        if let Some(unit) = ctx.units.get_mut(fqn) {
            unit.imports = import_lines;
            unit.state = UnitState::Finalized;
        }
        tracing::debug!(target: "javelin::finalize", unit = %fqn, "finalized unit");
        finalized.push(result);
    }

    let functions = render_functions(ctx);
    Ok((finalized, functions))
}

/// Every import proxy must lead to a declaration.
fn check_imports(ctx: &BuildContext) -> CompileResult<()> {
    for unit in ctx.units.iter().filter(|u| u.state == UnitState::Lowered) {
        for proxy in &unit.proxies {
            if let Err(dangling) = ctx.follow(*proxy) {
                return Err(CompileError::DanglingImport {
                    unit: unit.fqn(),
                    target: dangling.unit,
                    name: dangling.name,
                });
            }
        }
    }
    Ok(())
}

fn finalize_unit(
    ctx: &BuildContext,
    unit: &CompilationUnit,
) -> (FinalizedUnit, Vec<FunctionType>, Vec<String>) {
    let body = assemble(ctx, unit);

    let own_names = std::iter::once(unit.class_name.clone())
        .chain(unit.module_decls.iter().map(|id| ctx.decls.get(*id).name.clone()));
    let mut imports = ImportTable::new(own_names);
    let mut functions = Vec::new();
    {
        let mut speller = Speller {
            ctx,
            unit: Some(unit),
            sink: Prepare {
                imports: &mut imports,
                functions: &mut functions,
            },
        };
        for deferred in body.deferred() {
            speller.deferred(deferred);
        }
    }

    let rendered = body.render(&UnitRenderer {
        ctx,
        unit,
        imports: &imports,
    });

    let mut header = String::new();
    let mut offset = 0;
    if !unit.package.is_empty() {
        header.push_str(&format!("package {};\n\n", unit.package));
        offset += 2;
    }
    let lines = imports.lines();
    for line in &lines {
        header.push_str(line);
        header.push('\n');
    }
    if !lines.is_empty() {
        header.push('\n');
        offset += lines.len() as u32 + 1;
    }

    let mappings = rendered
        .mappings
        .iter()
        .map(|m| LineMapping {
            generated: m.generated + offset,
            original: m.original,
        })
        .collect();

    let result = FinalizedUnit {
        fqn: unit.fqn(),
        source: unit.path.clone(),
        output: unit.output_path(),
        code: format!("{}{}\n", header, rendered.text),
        mappings,
    };
    (result, functions, lines)
}

/// Wrap the unit's buffers in its class declaration.
fn assemble(ctx: &BuildContext, unit: &CompilationUnit) -> Printer {
    let info = unit
        .unit_class
        .and_then(|id| ctx.decls.get(id).class_info());
    let flavor = info.map(|i| i.flavor).unwrap_or(ClassFlavor::Class);

    let mut body = Printer::new();
    body.write("public");
    if info.map(|i| i.is_abstract).unwrap_or(false) {
        body.write("abstract");
    }
    body.write(flavor.keyword());
    body.write(unit.class_name.clone());
    body.append(unit.header.clone());

    let mut members = unit.root.clone();
    if !unit.static_init.is_empty() {
        if !members.is_empty() {
            members.writeln(None);
        }
        members.writeln(Some("static"));
        members.write_body(unit.static_init.clone());
    }
    if unit.needs_main() {
        members.writeln(None);
        members.writeln(Some("public static void main(String[] args)"));
        members.write_body(Printer::new());
    }
    body.write_body(members);
    body
}

fn render_functions(ctx: &BuildContext) -> Option<FunctionsFile> {
    if ctx.interfaces.is_empty() {
        return None;
    }
    let own_names = std::iter::once(FUNCTIONS_CLASS.to_string())
        .chain(ctx.interfaces.iter().map(|e| e.name.clone()));
    let mut imports = ImportTable::new(own_names);
    let mut unused = Vec::new();
    {
        let mut speller = Speller {
            ctx,
            unit: None,
            sink: Prepare {
                imports: &mut imports,
                functions: &mut unused,
            },
        };
        for entry in ctx.interfaces.iter() {
            for ty in entry.params.iter().chain(std::iter::once(&entry.ret)) {
                speller.resolved(ty, false);
            }
        }
    }

    let package = &ctx.config.base_package;
    let code = ctx.interfaces.flush(package, &imports.lines(), |ty| {
        Speller {
            ctx,
            unit: None,
            sink: Lookup { imports: &imports },
        }
        .resolved(ty, false)
    })?;

    let mut output: PathBuf = package.split('.').filter(|s| !s.is_empty()).collect();
    output.push(format!("{}.java", FUNCTIONS_CLASS));
    Some(FunctionsFile { output, code })
}

/// How the speller refers to a class or static member of another unit
trait Sink {
    fn reference(&mut self, simple: &str, fqn: &str, kind: ImportKind) -> String;
    fn function(&mut self, ty: &FunctionType);
}

/// Resolution pass: requests imports and records function types
struct Prepare<'t> {
    imports: &'t mut ImportTable,
    functions: &'t mut Vec<FunctionType>,
}

impl Sink for Prepare<'_> {
    fn reference(&mut self, simple: &str, fqn: &str, kind: ImportKind) -> String {
        if self.imports.request(simple, fqn, kind) {
            simple.to_string()
        } else {
            fqn.to_string()
        }
    }

    fn function(&mut self, ty: &FunctionType) {
        self.functions.push(ty.clone());
    }
}

/// Render pass: consults the frozen import table
struct Lookup<'t> {
    imports: &'t ImportTable,
}

impl Sink for Lookup<'_> {
    fn reference(&mut self, simple: &str, fqn: &str, _kind: ImportKind) -> String {
        self.imports.spell(simple, fqn).to_string()
    }

    fn function(&mut self, _ty: &FunctionType) {}
}

struct UnitRenderer<'a> {
    ctx: &'a BuildContext,
    unit: &'a CompilationUnit,
    imports: &'a ImportTable,
}

impl DeferredResolver for UnitRenderer<'_> {
    fn resolve(&self, deferred: &Deferred) -> String {
        Speller {
            ctx: self.ctx,
            unit: Some(self.unit),
            sink: Lookup {
                imports: self.imports,
            },
        }
        .deferred(deferred)
    }
}

/// Spells deferred fragments and types for one unit (or for
/// `Functions.java` when `unit` is `None`).
struct Speller<'a, S: Sink> {
    ctx: &'a BuildContext,
    unit: Option<&'a CompilationUnit>,
    sink: S,
}

impl<S: Sink> Speller<'_, S> {
    fn deferred(&mut self, deferred: &Deferred) -> String {
        match deferred {
            Deferred::Name(id) => self.name(*id),
            Deferred::CallSuffix(target) => self.call_suffix(target),
            Deferred::DeclType { decl, allow_var } => {
                let ty = self.ctx.resolve_type(&JavaType::of_decl(*decl));
                if *allow_var && !ty.is_function() {
                    "var".to_string()
                } else {
                    self.resolved(&ty, false)
                }
            }
            Deferred::Type { ty, boxed } => {
                let ty = self.ctx.resolve_type(ty);
                self.resolved(&ty, *boxed)
            }
            Deferred::MethodRef(id) => self.method_ref(*id),
            Deferred::Equality {
                part,
                left,
                right,
                negated,
            } => {
                let strings = self.ctx.resolve_type(left).is_string()
                    || self.ctx.resolve_type(right).is_string();
                self.equality(*part, strings, *negated)
            }
        }
    }

    fn equality(&mut self, part: EqualityPart, strings: bool, negated: bool) -> String {
        match (part, strings) {
            (EqualityPart::Open, true) => {
                let objects = self
                    .sink
                    .reference("Objects", "java.util.Objects", ImportKind::Type);
                format!("{}{}.equals(", if negated { "!" } else { "" }, objects)
            }
            (EqualityPart::Separator, true) => ",".to_string(),
            (EqualityPart::Close, true) => ")".to_string(),
            (EqualityPart::Operator, false) => if negated { "!=" } else { "==" }.to_string(),
            _ => String::new(),
        }
    }

    fn own_unit(&self) -> Option<String> {
        self.unit.map(CompilationUnit::fqn)
    }

    /// Spell a declaration's current name from inside this unit.
    fn name(&mut self, id: DeclId) -> String {
        let target = match self.ctx.follow(id) {
            Ok(Target::Decl(target)) => target,
            Ok(Target::Namespace(unit)) => return self.unit_class(&unit),
            Err(_) => return self.ctx.decls.get(id).name.clone(),
        };
        let decl = self.ctx.decls.get(target);
        if decl.is_class() {
            return self.class(target);
        }
        if decl.placement != Placement::Module || Some(&decl.unit) == self.own_unit().as_ref() {
            return decl.name.clone();
        }
        let fqn = format!("{}.{}", decl.unit, decl.name);
        self.sink.reference(&decl.name, &fqn, ImportKind::Static)
    }

    fn unit_class(&mut self, fqn: &str) -> String {
        if Some(fqn) == self.own_unit().as_deref() {
            return self.unit.map(|u| u.class_name.clone()).unwrap_or_default();
        }
        match self.ctx.units.get(fqn) {
            Some(unit) => {
                let simple = unit.class_name.clone();
                self.sink.reference(&simple, fqn, ImportKind::Type)
            }
            None => fqn.to_string(),
        }
    }

    /// Spell a class declaration.
    fn class(&mut self, id: DeclId) -> String {
        let decl = self.ctx.decls.get(id);
        let is_unit_class = decl.class_info().map(|i| i.is_unit_class).unwrap_or(false);
        if is_unit_class {
            return self.unit_class(&decl.unit);
        }
        if decl.placement != Placement::Module || Some(&decl.unit) == self.own_unit().as_ref() {
            return decl.name.clone();
        }
        let fqn = format!("{}.{}", decl.unit, decl.name);
        self.sink.reference(&decl.name, &fqn, ImportKind::Type)
    }

    fn method_ref(&mut self, id: DeclId) -> String {
        let target = match self.ctx.follow(id) {
            Ok(Target::Decl(target)) => target,
            _ => return self.name(id),
        };
        let decl = self.ctx.decls.get(target);
        if decl.kind != DeclKind::Function {
            return self.name(id);
        }
        let owner = match decl.owner {
            Some(class) => self.class(class),
            None => self.unit_class(&decl.unit),
        };
        format!("{}::{}", owner, decl.name)
    }

    fn call_suffix(&mut self, target: &CallTarget) -> String {
        let holds_function = match target {
            CallTarget::Decl(id) => self.decl_holds_function(*id),
            CallTarget::Member(object, name) => match self.ctx.resolve_type(object) {
                JavaType::Class(class) => match self.ctx.member_decl(class.decl, name) {
                    Some(member) => self.decl_holds_function(member),
                    None => false,
                },
                JavaType::Namespace(unit) => {
                    match self.ctx.export_of(&unit, &ImportedName::Named(name.clone())) {
                        Some(export) => self.decl_holds_function(export),
                        None => false,
                    }
                }
                _ => false,
            },
            CallTarget::Value(ty) => self.ctx.resolve_type(ty).is_function(),
        };
        if holds_function {
            format!(".{}", CALL_METHOD)
        } else {
            String::new()
        }
    }

    fn decl_holds_function(&self, id: DeclId) -> bool {
        match self.ctx.follow(id) {
            Ok(Target::Decl(target)) => {
                let decl = self.ctx.decls.get(target);
                !decl.kind.is_callable_declaration()
                    && self.ctx.resolve_type(&decl.ty).is_function()
            }
            _ => false,
        }
    }

    /// Spell a resolved type.
    fn resolved(&mut self, ty: &JavaType, boxed: bool) -> String {
        match ty {
            JavaType::Primitive(p) => {
                if boxed {
                    p.boxed().to_string()
                } else {
                    p.text().to_string()
                }
            }
            JavaType::Generic(g) => {
                let base = match g.fqn() {
                    Some(fqn) => self.sink.reference(&g.name, &fqn, ImportKind::Type),
                    None => g.name.clone(),
                };
                self.with_args(base, &g.args)
            }
            JavaType::Class(c) => {
                let base = self.class(c.decl);
                self.with_args(base, &c.args)
            }
            JavaType::Function(f) => {
                let name = f.interface_name(&self.ctx.decls).to_string();
                self.sink.function(f);
                if self.unit.is_none() {
                    return name;
                }
                let holder = qualify(&self.ctx.config.base_package, FUNCTIONS_CLASS);
                let fqn = format!("{}.{}", holder, name);
                self.sink.reference(&name, &fqn, ImportKind::Type)
            }
            JavaType::Array(a) => {
                let element = self.resolved(&a.element, false);
                if a.variadic {
                    format!("{}...", element)
                } else {
                    format!("{}[]", element)
                }
            }
            JavaType::TypeParam(p) => p.name.clone(),
            JavaType::Namespace(unit) => self.unit_class(unit),
            JavaType::Unresolved(_) => {
                let resolved = self.ctx.resolve_type(ty);
                if resolved.is_unresolved() {
                    "Object".to_string()
                } else {
                    self.resolved(&resolved, boxed)
                }
            }
        }
    }

    fn with_args(&mut self, base: String, args: &[JavaType]) -> String {
        if args.is_empty() {
            return base;
        }
        let args: Vec<String> = args.iter().map(|a| self.resolved(a, true)).collect();
        format!("{}<{}>", base, args.join(", "))
    }
}
