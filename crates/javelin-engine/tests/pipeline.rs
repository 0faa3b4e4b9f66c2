//! Integration tests for multi-unit builds
//!
//! Units are lowered in arbitrary order through the public `Transpiler`
//! API; cross-unit names only settle in `build_finished`.

use javelin_engine::compiler::CompileError;
use javelin_engine::{FsModuleHost, ModuleHost, TargetConfig, Transpiler};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Resolves specifiers from a fixed table.
struct MapHost(Vec<(&'static str, &'static str)>);

impl ModuleHost for MapHost {
    fn resolve_specifier(&self, specifier: &str, _from: &Path) -> Option<PathBuf> {
        self.0
            .iter()
            .find(|(name, _)| *name == specifier)
            .map(|(_, path)| PathBuf::from(path))
    }
}

fn code_of<'a>(output: &'a javelin_engine::BuildOutput, path: &str) -> &'a str {
    match output.file(path) {
        Some(file) => &file.code,
        None => panic!("no output file {}", path),
    }
}

#[test]
fn test_forward_reference_to_unlowered_unit() {
    let host = MapHost(vec![("./widget-kit", "widget-kit.ts")]);
    let mut transpiler = Transpiler::new(TargetConfig::default(), host);

    // The importer is lowered before the unit it imports.
    transpiler
        .lower_unit(
            "import Widget from \"./widget-kit\";\nexport function make(): Widget {\n  return new Widget();\n}\n",
            Path::new("b.ts"),
        )
        .unwrap();
    transpiler
        .lower_unit(
            "export default class Widget {\n  size: number = 1;\n}\n",
            Path::new("widget-kit.ts"),
        )
        .unwrap();

    let output = transpiler.build_finished().unwrap();
    let b = code_of(&output, "app/B.java");
    assert!(b.contains("import app.WidgetKit;"));
    assert!(b.contains("public static WidgetKit make() {"));
    assert!(b.contains("return new WidgetKit();"));
    assert!(!b.contains("Widget make"));

    let kit = code_of(&output, "app/WidgetKit.java");
    assert!(kit.contains("public class WidgetKit {"));
    assert!(kit.contains("public double size = 1;"));
}

#[test]
fn test_renamed_default_export_leaves_no_old_name() {
    let host = MapHost(vec![("./tools", "tools.ts")]);
    let mut transpiler = Transpiler::new(TargetConfig::default(), host);
    transpiler
        .lower_unit(
            "import helper from \"./tools\";\nexport const x = helper();\n",
            Path::new("main.ts"),
        )
        .unwrap();
    transpiler
        .lower_unit(
            "export default function helper(): number {\n  return 1;\n}\n",
            Path::new("tools.ts"),
        )
        .unwrap();

    let output = transpiler.build_finished().unwrap();
    let main = code_of(&output, "app/Main.java");
    let tools = code_of(&output, "app/Tools.java");
    assert!(main.contains("import static app.Tools.Tools;"));
    assert!(main.contains("public static final double x;"));
    assert!(main.contains("x = Tools();"));
    assert!(tools.contains("public static double Tools() {"));
    assert!(!main.contains("helper"));
    assert!(!tools.contains("helper"));
}

#[test]
fn test_function_interfaces_are_shared_across_units() {
    let mut transpiler = Transpiler::new(TargetConfig::default(), MapHost(Vec::new()));
    transpiler
        .lower_unit("export let f: (a: number, b: string) => void;\n", Path::new("one.ts"))
        .unwrap();
    transpiler
        .lower_unit("export let g: (a: number, b: string) => void;\n", Path::new("two.ts"))
        .unwrap();
    transpiler
        .lower_unit("export let h: (b: string, a: number) => void;\n", Path::new("three.ts"))
        .unwrap();

    let output = transpiler.build_finished().unwrap();
    let functions = code_of(&output, "app/Functions.java");
    assert_eq!(functions.matches("public interface").count(), 2);
    assert!(functions.contains("public interface DoubleStringReturnVoid {"));
    assert!(functions.contains("public interface StringDoubleReturnVoid {"));
    assert!(functions.contains("void call(double arg0, String arg1);"));

    let one = code_of(&output, "app/One.java");
    assert!(one.contains("import app.Functions.DoubleStringReturnVoid;"));
    assert!(one.contains("public static DoubleStringReturnVoid f;"));
}

#[test]
fn test_dangling_import_fails_the_build() {
    let host = MapHost(vec![("./lib", "lib.ts")]);
    let mut transpiler = Transpiler::new(TargetConfig::default(), host);
    transpiler
        .lower_unit("import { missing } from \"./lib\";\nmissing();\n", Path::new("main.ts"))
        .unwrap();
    transpiler
        .lower_unit("export const present = 1;\n", Path::new("lib.ts"))
        .unwrap();

    let err = transpiler.build_finished().unwrap_err();
    assert!(matches!(err, CompileError::DanglingImport { ref name, .. } if name == "missing"));
}

#[test]
fn test_filesystem_build_with_nested_packages() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    fs::create_dir_all(src.join("geometry")).unwrap();
    fs::write(
        src.join("geometry").join("shapes.ts"),
        "export class Circle {\n  constructor(public radius: number) {}\n  area(): number { return Math.PI * this.radius ** 2; }\n}\n",
    )
    .unwrap();
    fs::write(
        src.join("main.ts"),
        "import { Circle } from \"./geometry/shapes\";\nconst c = new Circle(2);\nconsole.log(c.area());\n",
    )
    .unwrap();

    let config = TargetConfig::new("com.example", "17", &src).unwrap();
    let mut transpiler = Transpiler::new(config, FsModuleHost::new());
    for name in ["main.ts", "geometry/shapes.ts"] {
        let path = src.join(name);
        let source = fs::read_to_string(&path).unwrap();
        let report = transpiler.lower_unit(&source, &path).unwrap();
        assert_eq!(report.error_count(), 0, "{:?}", report.diagnostics);
    }

    let output = transpiler.build_finished().unwrap();
    assert_eq!(output.error_count(), 0);
    let main = code_of(&output, "com/example/Main.java");
    assert!(main.starts_with("package com.example;\n"));
    assert!(main.contains("import com.example.geometry.Shapes.Circle;"));
    assert!(main.contains("private static final Circle c;"));
    assert!(main.contains("c = new Circle(2);"));
    assert!(main.contains("System.out.println(c.area());"));

    let shapes = code_of(&output, "com/example/geometry/Shapes.java");
    assert!(shapes.starts_with("package com.example.geometry;\n"));
    assert!(shapes.contains("public static class Circle {"));
    assert!(shapes.contains("return Math.PI * Math.pow(this.radius, 2);"));
}

#[test]
fn test_class_named_like_its_unit_is_the_unit_class() {
    let host = MapHost(vec![("./x/item", "x/item.ts"), ("./y/item", "y/item.ts")]);
    let mut transpiler = Transpiler::new(TargetConfig::default(), host);
    transpiler
        .lower_unit(
            "export class Item {\n  size: number = 1;\n}\n",
            Path::new("x/item.ts"),
        )
        .unwrap();
    transpiler
        .lower_unit(
            "export class Item {\n  weight: number = 2;\n}\n",
            Path::new("y/item.ts"),
        )
        .unwrap();
    transpiler
        .lower_unit(
            "import { Item } from \"./x/item\";\nimport { Item as Other } from \"./y/item\";\nexport function make(): Item {\n  const other = new Other();\n  return new Item();\n}\n",
            Path::new("main.ts"),
        )
        .unwrap();

    let output = transpiler.build_finished().unwrap();
    let item = code_of(&output, "app/x/Item.java");
    assert!(item.contains("public class Item {"));
    assert!(item.contains("public double size = 1;"));
    assert!(!item.contains("static class Item"));

    let main = code_of(&output, "app/Main.java");
    assert!(main.contains("import app.x.Item;"));
    assert!(main.contains("public static Item make() {"));
    assert!(main.contains("new app.y.Item()"));
    assert!(!main.contains("Item.Item"));
}
