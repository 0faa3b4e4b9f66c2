//! End-to-end lowering of single units

use javelin_engine::compiler::decl::DeclId;
use javelin_engine::compiler::lower::overload_arities;
use javelin_engine::compiler::{ScopeKind, ScopeTree};
use javelin_engine::{ModuleHost, TargetConfig, Transpiler};
use std::path::{Path, PathBuf};

struct NoModules;

impl ModuleHost for NoModules {
    fn resolve_specifier(&self, _specifier: &str, _from: &Path) -> Option<PathBuf> {
        None
    }
}

fn transpile(file: &str, source: &str) -> String {
    let mut transpiler = Transpiler::new(TargetConfig::default(), NoModules);
    transpiler.lower_unit(source, Path::new(file)).unwrap();
    let output = transpiler.build_finished().unwrap();
    output.files[0].code.clone()
}

#[test]
fn test_inner_binding_shadows_until_scope_ends() {
    let mut scopes = ScopeTree::new();
    scopes.declare("x", DeclId(0));
    scopes.push_scope(ScopeKind::Block, "");
    scopes.declare("x", DeclId(1));
    assert_eq!(scopes.lookup("x"), Some(DeclId(1)));
    scopes.pop_scope();
    assert_eq!(scopes.lookup("x"), Some(DeclId(0)));
}

#[test]
fn test_shadowed_local_keeps_its_own_type() {
    let code = transpile(
        "main.ts",
        "const label = \"outer\";\nfunction show(): void {\n  const label = 42;\n  console.log(label);\n}\nconsole.log(label);\n",
    );
    assert!(code.contains("private static final String label;"));
    assert!(code.contains("var label = 42;"));
}

#[test]
fn test_default_parameter_overload_counts() {
    assert_eq!(overload_arities(&[false, true, true]), vec![1, 2]);
    assert!(overload_arities(&[false, true, false]).is_empty());

    let code = transpile(
        "calc.ts",
        "export function sum(a: number, b: number = 1, c: number = 2): number {\n  return a + b + c;\n}\nexport function gap(a: number, b: number = 1, c: number): number {\n  return a + b + c;\n}\n",
    );
    assert_eq!(code.matches("public static double sum(").count(), 3);
    assert!(code.contains("public static double sum(double a) {"));
    assert!(code.contains("return sum(a, 1, 2);"));
    assert!(code.contains("return sum(a, b, 2);"));
    assert_eq!(code.matches("public static double gap(").count(), 1);
}

#[test]
fn test_numeric_literal_typing() {
    let code = transpile("nums.ts", "export const i = 1;\nexport const d = 1.0;\nexport const e = 2e3;\n");
    assert!(code.contains("public static final int i;"));
    assert!(code.contains("public static final double d;"));
    assert!(code.contains("public static final double e;"));
    assert!(code.contains("i = 1;"));
    assert!(code.contains("d = 1.0;"));
}

#[test]
fn test_string_equality_uses_objects_equals() {
    let code = transpile(
        "eq.ts",
        "export function same(a: string, b: string): boolean {\n  return a === b;\n}\nexport function differ(a: number, b: number): boolean {\n  return a !== b;\n}\n",
    );
    assert!(code.contains("import java.util.Objects;"));
    assert!(code.contains("return Objects.equals(a, b);"));
    assert!(code.contains("return a != b;"));
}

#[test]
fn test_callable_values_use_call() {
    let code = transpile(
        "apply.ts",
        "export function apply(f: (n: number) => number, v: number): number {\n  return f(v);\n}\nexport function twice(n: number): number {\n  return n * 2;\n}\nconsole.log(apply(twice, 3));\n",
    );
    assert!(code.contains("import app.Functions.DoubleReturnDouble;"));
    assert!(code.contains("public static double apply(DoubleReturnDouble f, double v) {"));
    assert!(code.contains("return f.call(v);"));
    assert!(code.contains("System.out.println(apply(Apply::twice, 3));"));
}
