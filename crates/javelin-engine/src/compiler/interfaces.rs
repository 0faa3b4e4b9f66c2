//! Function interface registry
//!
//! Every function type used by a build becomes one `@FunctionalInterface`
//! nested in the generated `Functions` class. Interfaces are keyed by
//! [`FunctionType::interface_name`], so identical shapes share one entry no
//! matter how many units use them.

use rustc_hash::FxHashMap;

use super::printer::Printer;
use super::types::{ArrayType, ClassNames, ClassType, FunctionType, GenericType, JavaType};

/// Name of the generated holder class
pub const FUNCTIONS_CLASS: &str = "Functions";

/// Method every synthesized interface declares
pub const CALL_METHOD: &str = "call";

/// One synthesized interface
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInterface {
    pub name: String,
    pub params: Vec<JavaType>,
    pub ret: JavaType,
}

/// Ordered, deduplicated set of function interfaces
#[derive(Debug, Default)]
pub struct InterfaceRegistry {
    entries: Vec<FunctionInterface>,
    index: FxHashMap<String, usize>,
}

impl InterfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the interface for `ty` (and for any function types nested
    /// in its signature) and return its name. Registering the same shape
    /// again returns the existing name.
    ///
    /// `ty` must be fully resolved.
    pub fn synthesize(&mut self, ty: &FunctionType, names: &dyn ClassNames) -> String {
        let name = ty.interface_name(names).to_string();
        if self.index.contains_key(&name) {
            return name;
        }
        for part in ty.params.iter().chain(std::iter::once(ty.ret.as_ref())) {
            self.synthesize_nested(part, names);
        }
        let entry = FunctionInterface {
            name: name.clone(),
            params: ty.params.iter().map(erase).collect(),
            ret: erase(&ty.ret),
        };
        tracing::trace!(target: "javelin::interfaces", interface = %name, "synthesized function interface");
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push(entry);
        name
    }

    fn synthesize_nested(&mut self, ty: &JavaType, names: &dyn ClassNames) {
        match ty {
            JavaType::Function(f) => {
                self.synthesize(f, names);
            }
            JavaType::Array(a) => self.synthesize_nested(&a.element, names),
            JavaType::Generic(GenericType { args, .. }) | JavaType::Class(ClassType { args, .. }) => {
                for arg in args {
                    self.synthesize_nested(arg, names);
                }
            }
            _ => {}
        }
    }

    pub fn get(&self, name: &str) -> Option<&FunctionInterface> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionInterface> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render `Functions.java`, or `None` when no interface was synthesized.
    ///
    /// `render_type` spells a type inside the file; `imports` are the import
    /// lines it needs.
    pub fn flush(
        &self,
        package: &str,
        imports: &[String],
        render_type: impl Fn(&JavaType) -> String,
    ) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let mut body = Printer::new();
        body.writeln(None);
        body.write(format!("private {}()", FUNCTIONS_CLASS));
        body.write_body(Printer::new());
        for entry in &self.entries {
            body.writeln(None);
            body.writeln(Some("@FunctionalInterface"));
            body.writeln(Some("public interface"));
            body.write(entry.name.clone());

            let params = entry
                .params
                .iter()
                .enumerate()
                .map(|(i, param)| {
                    let mut p = Printer::new();
                    p.write(render_type(param));
                    p.write(format!("arg{}", i));
                    p
                })
                .collect();
            let mut method = Printer::new();
            method.writeln(Some(&render_type(&entry.ret)));
            method.write(CALL_METHOD);
            method.write_params(params);
            method.write_tight(";");
            body.write_body(method);
        }

        let mut file = Printer::new();
        if !package.is_empty() {
            file.write(format!("package {};", package));
            file.writeln(None);
            file.writeln(None);
        }
        for import in imports {
            file.write(import.clone());
            file.writeln(None);
        }
        if !imports.is_empty() {
            file.writeln(None);
        }
        file.write(format!("public final class {}", FUNCTIONS_CLASS));
        file.write_body(body);
        file.writeln(None);
        Some(file.render(&NoDeferred).text)
    }
}

struct NoDeferred;

impl super::printer::DeferredResolver for NoDeferred {
    fn resolve(&self, _deferred: &super::printer::Deferred) -> String {
        String::new()
    }
}

/// Interfaces are not generic: type parameters and anything unresolved
/// become `Object`.
fn erase(ty: &JavaType) -> JavaType {
    match ty {
        JavaType::TypeParam(_) | JavaType::Namespace(_) | JavaType::Unresolved(_) => {
            JavaType::object()
        }
        JavaType::Array(a) => JavaType::Array(ArrayType {
            element: Box::new(erase(&a.element)),
            variadic: a.variadic,
        }),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::decl::DeclId;

    struct Names;

    impl ClassNames for Names {
        fn class_name(&self, decl: DeclId) -> String {
            format!("C{}", decl.0)
        }
    }

    fn func(params: Vec<JavaType>, ret: JavaType) -> FunctionType {
        FunctionType::new(params, ret)
    }

    #[test]
    fn test_identical_shapes_register_once() {
        let mut registry = InterfaceRegistry::new();
        let a = registry.synthesize(&func(vec![JavaType::double()], JavaType::double()), &Names);
        let b = registry.synthesize(&func(vec![JavaType::double()], JavaType::double()), &Names);
        assert_eq!(a, "DoubleReturnDouble");
        assert_eq!(a, b);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_parameter_order_is_part_of_key() {
        let mut registry = InterfaceRegistry::new();
        registry.synthesize(&func(vec![JavaType::int(), JavaType::string()], JavaType::void()), &Names);
        registry.synthesize(&func(vec![JavaType::string(), JavaType::int()], JavaType::void()), &Names);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("IntStringReturnVoid"));
        assert!(registry.contains("StringIntReturnVoid"));
    }

    #[test]
    fn test_nested_function_registered_first() {
        let mut registry = InterfaceRegistry::new();
        let callback = JavaType::function(vec![JavaType::string()], JavaType::void());
        registry.synthesize(&func(vec![callback], JavaType::void()), &Names);
        let names: Vec<_> = registry.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["StringReturnVoid", "StringReturnVoidReturnVoid"]);
    }

    #[test]
    fn test_flush_renders_holder_class() {
        let mut registry = InterfaceRegistry::new();
        assert!(registry.flush("app", &[], |t| t.to_string()).is_none());

        registry.synthesize(&func(vec![JavaType::double()], JavaType::double()), &Names);
        let text = registry.flush("app", &[], |t| t.to_string()).unwrap();
        assert_eq!(
            text,
            "package app;\n\npublic final class Functions {\n    private Functions() {}\n\n    @FunctionalInterface\n    public interface DoubleReturnDouble {\n        double call(double arg0);\n    }\n}\n"
        );
    }
}
