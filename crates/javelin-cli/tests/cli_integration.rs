//! Integration tests for the `javelin` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn javelin(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_javelin"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("JAVELIN_LOG_LEVEL")
        .env_remove("JAVELIN_LOG_FORMAT")
        .output()
        .expect("failed to run javelin")
}

fn write(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ────────────────────────────────────────────────────────────────────────────
// build
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_build_writes_package_tree() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        &root.join("src/util/calc.ts"),
        "export function square(n: number): number {\n  return n * n;\n}\n",
    );
    write(
        &root.join("src/main.ts"),
        "import { square } from \"./util/calc\";\nconsole.log(square(3));\n",
    );
    write(
        &root.join("javelin.toml"),
        "[target]\npackage = \"com.example\"\nsource-root = \"src\"\n",
    );

    let output = javelin(root, &["build", "src", "--out-dir", "out", "--sourcemap"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stderr(&output).contains("Built 2 file(s)"));

    let main = fs::read_to_string(root.join("out/com/example/Main.java")).unwrap();
    assert!(main.starts_with("package com.example;\n"));
    assert!(main.contains("import static com.example.util.Calc.square;"));
    assert!(main.contains("System.out.println(square(3));"));
    assert!(main.contains("public static void main(String[] args)"));

    let calc = fs::read_to_string(root.join("out/com/example/util/Calc.java")).unwrap();
    assert!(calc.contains("public static double square(double n) {"));
    assert!(root.join("out/com/example/util/Calc.java.map").is_file());
}

#[test]
fn test_build_package_flag_overrides_config() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(&root.join("lib/greet.ts"), "export const greeting = \"hi\";\n");
    write(&root.join("javelin.toml"), "[target]\npackage = \"com.example\"\n");

    let output = javelin(
        root,
        &["build", "lib", "--out-dir", "gen", "--package", "org.sample", "--jobs", "2"],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let greet = fs::read_to_string(root.join("gen/org/sample/Greet.java")).unwrap();
    assert!(greet.starts_with("package org.sample;\n"));
    assert!(greet.contains("public static final String greeting;"));
}

#[test]
fn test_build_json_report_lists_files() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(&root.join("src/a.ts"), "export const a = 1;\n");

    let output = javelin(root, &["build", "src", "--out-dir", "out", "--format", "json"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["success"], true);
    assert_eq!(report["files"][0], "app/A.java");
    assert!(report["diagnostics"].as_array().unwrap().is_empty());
}

#[test]
fn test_build_fails_on_parse_error_but_writes_other_units() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(&root.join("src/good.ts"), "export const ok = true;\n");
    write(&root.join("src/bad.ts"), "export const = ;\n");

    let output = javelin(root, &["build", "src", "--out-dir", "out"]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("E0002"), "{}", err);
    assert!(err.contains("build failed"));
    assert!(root.join("out/app/Good.java").is_file());
    assert!(!root.join("out/app/Bad.java").exists());
}

#[test]
fn test_build_rejects_invalid_java_version() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(&root.join("src/a.ts"), "export const a = 1;\n");

    let output = javelin(root, &["build", "src", "--java-version", "seventeen"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid Java version: seventeen"));
}

// ────────────────────────────────────────────────────────────────────────────
// emit / check
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_emit_prints_java() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        &root.join("counter.ts"),
        "export default class Counter {\n  count: number = 0;\n  increment(): void {\n    this.count += 1;\n  }\n}\n",
    );

    let output = javelin(root, &["emit", "counter.ts"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let java = stdout(&output);
    assert!(java.starts_with("package app;\n"));
    assert!(java.contains("public class Counter {"));
    assert!(java.contains("this.count += 1;"));
    assert!(!root.join("out").exists());
}

#[test]
fn test_check_reports_unresolved_name() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(&root.join("src/main.ts"), "console.log(nowhere);\n");

    let output = javelin(root, &["check", "src"]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("error[E1001]: Cannot find name 'nowhere'"), "{}", err);
    assert!(!root.join("out").exists());
}

#[test]
fn test_check_json_reports_diagnostics() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(&root.join("src/main.ts"), "const p: Point = null;\n");

    let output = javelin(root, &["check", "src", "--format", "json"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["success"], true);
    assert_eq!(report["diagnostics"][0]["code"], "W2001");
    assert_eq!(report["diagnostics"][0]["severity"], "warning");
}

#[test]
fn test_missing_input_fails() {
    let temp = TempDir::new().unwrap();
    let output = javelin(temp.path(), &["check", "nothing-here"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("No such file or directory"));
}
