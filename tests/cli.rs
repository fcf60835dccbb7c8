//! Driving the built binary end to end.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn omni() -> Command {
    Command::new(env!("CARGO_BIN_EXE_omni"))
}

fn temp_program(name: &str, source: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("omni_cli_{}_{}.omni", std::process::id(), name));
    fs::write(&path, source).expect("failed to write program file");
    path
}

#[test]
fn test_version_flag() {
    let output = omni().arg("--version").output().expect("failed to run omni");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("omni"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_runs_program_file() {
    let path = temp_program("hello", "def main():\n    print(\"hi there\")\n");
    let output = omni().arg(&path).output().expect("failed to run omni");
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "hi there\n");
    fs::remove_file(&path).ok();
}

#[test]
fn test_tokens_mode_dumps_and_exits() {
    let path = temp_program("tokens", "def main():\n    x = 1\n");
    let output = omni()
        .arg("--tokens")
        .arg(&path)
        .output()
        .expect("failed to run omni");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("=== Tokens ==="));
    assert!(stdout.contains("DEF(def)"));
    assert!(stdout.contains("ID(main)"));
    assert!(stdout.contains("INDENT(INDENT)"));
    assert!(stdout.contains("DEDENT(DEDENT)"));
    assert!(!stdout.contains("NEWLINE"));
    fs::remove_file(&path).ok();
}

#[test]
fn test_ast_mode_summarizes() {
    let path = temp_program(
        "ast",
        "class Point:\n    int x\n    def __init__(self, x):\n        self.x = x\n\ndef main():\n    return 0\n",
    );
    let output = omni()
        .arg("--ast")
        .arg(&path)
        .output()
        .expect("failed to run omni");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("=== Omni AST ==="));
    assert!(stdout.contains("[CLASS] Point"));
    assert!(stdout.contains("[FIELD] int x"));
    assert!(stdout.contains("[CONSTRUCTOR] __init__"));
    assert!(stdout.contains("[FUNCTION] main"));
    fs::remove_file(&path).ok();
}

#[test]
fn test_uncaught_exception_exits_nonzero() {
    let path = temp_program("boom", "def main():\n    throw \"boom\"\n");
    let output = omni()
        .arg("--color")
        .arg("never")
        .arg(&path)
        .output()
        .expect("failed to run omni");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Runtime Error at line 2: boom"));
    fs::remove_file(&path).ok();
}

#[test]
fn test_missing_main_exits_nonzero() {
    let path = temp_program("nomain", "def helper():\n    return 1\n");
    let output = omni()
        .arg("--color")
        .arg("never")
        .arg(&path)
        .output()
        .expect("failed to run omni");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("No main() function found"));
    fs::remove_file(&path).ok();
}

#[test]
fn test_missing_file_exits_nonzero() {
    let output = omni()
        .arg("--color")
        .arg("never")
        .arg("/no/such/program.omni")
        .output()
        .expect("failed to run omni");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Cannot open file"));
}

#[test]
fn test_parse_errors_reported_but_program_still_runs() {
    let path = temp_program(
        "recover",
        "def broken(\n\ndef main():\n    print(\"alive\")\n",
    );
    let output = omni()
        .arg("--color")
        .arg("never")
        .arg(&path)
        .output()
        .expect("failed to run omni");
    let stderr = String::from_utf8(output.stderr).unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stderr.contains("Parse Error:"));
    assert!(stdout.contains("alive"));
    fs::remove_file(&path).ok();
}

#[test]
fn test_demo_runs_without_file() {
    let output = omni().output().expect("failed to run omni");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Hello, World!"));
}
