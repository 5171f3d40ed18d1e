// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Integration tests for the `try` binary.
//! Each test runs fixtures from tests/fixtures and checks the exit code and
//! output.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn try_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_try"))
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

fn run_try(args: &[&str]) -> (Output, String, i32) {
    let output = Command::new(try_binary())
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run try");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let code = output.status.code().unwrap_or(-1);
    (output, stdout, code)
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

#[test]
fn passing_file_exits_zero() {
    let (_, stdout, code) = run_try(&[&path_arg(&fixture("passing_try.rhai"))]);
    assert_eq!(code, 0, "stdout:\n{}", stdout);
    assert!(stdout.contains("adds to the base"));
    assert!(stdout.contains("1 file, 3 tests, 3 passed, 0 failed"));
}

#[test]
fn failing_case_exits_one() {
    let (_, stdout, code) = run_try(&[&path_arg(&fixture("failing_try.rhai"))]);
    assert_eq!(code, 1, "stdout:\n{}", stdout);
    assert!(stdout.contains("✗"));
    assert!(stdout.contains("expected: 7"));
    assert!(stdout.contains("actual:   6"));
}

#[test]
fn setup_failure_exits_two() {
    let (_, stdout, code) = run_try(&[&path_arg(&fixture("broken_setup_try.rhai"))]);
    assert_eq!(code, 2, "stdout:\n{}", stdout);
    assert!(stdout.contains("setup failed: RuntimeError: database unavailable"));
    assert!(stdout.contains("1 setup failure"));
}

#[test]
fn parse_error_exits_two() {
    let (output, _, code) = run_try(&[&path_arg(&fixture("stray_try.rhai"))]);
    assert_eq!(code, 2);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("stray_try.rhai"), "stderr:\n{}", stderr);
}

#[test]
fn could_not_run_wins_over_failures() {
    let (_, _, code) = run_try(&[
        &path_arg(&fixture("failing_try.rhai")),
        &path_arg(&fixture("broken_setup_try.rhai")),
    ]);
    assert_eq!(code, 2);
}

#[test]
fn fresh_context_isolates_cases() {
    let counter = path_arg(&fixture("counter_try.rhai"));
    let (_, _, shared) = run_try(&[&counter]);
    assert_eq!(shared, 1);
    let (_, stdout, fresh) = run_try(&["--fresh-context", &counter]);
    assert_eq!(fresh, 0, "stdout:\n{}", stdout);
}

#[test]
fn line_selection_runs_one_case() {
    // Lines 5-7 hold the failing case only.
    let failing = path_arg(&fixture("failing_try.rhai"));
    let (_, stdout, code) = run_try(&[&format!("{}:5-7", failing)]);
    assert_eq!(code, 1);
    assert!(stdout.contains("1 file, 1 test, 0 passed, 1 failed"), "stdout:\n{}", stdout);

    let (_, _, code) = run_try(&[&format!("{}:L2", failing)]);
    assert_eq!(code, 0);
}

#[test]
fn bad_line_selection_is_a_usage_error() {
    let failing = path_arg(&fixture("failing_try.rhai"));
    let (output, _, code) = run_try(&[&format!("{}:9-3", failing)]);
    assert_eq!(code, 2);
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid line selection"));
}

#[test]
fn json_report() {
    let (_, stdout, code) = run_try(&["--format", "json", &path_arg(&fixture("failing_try.rhai"))]);
    assert_eq!(code, 1);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("stdout should be json");
    assert_eq!(json["exit_code"], 1);
    assert_eq!(json["summary"]["passed"], 1);
    assert_eq!(json["summary"]["failed"], 1);
    assert_eq!(json["files"][0]["cases"][1]["success"], false);
}

#[test]
fn inspect_prints_structure() {
    let (_, stdout, code) = run_try(&["--inspect", &path_arg(&fixture("passing_try.rhai"))]);
    assert_eq!(code, 0);
    assert!(stdout.contains("setup"));
    assert!(stdout.contains("strings know their length"));
    assert!(stdout.contains("#=:> Integer"));
    assert!(stdout.contains("3 cases, 3 runnable"));
}

#[test]
fn directories_are_searched() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("math")).unwrap();
    fs::write(dir.path().join("math").join("add_try.rhai"), "## adds\n1 + 1\n#=> 2\n").unwrap();
    fs::write(dir.path().join("mul.try.rhai"), "## multiplies\n2 * 2\n#=> 4\n").unwrap();
    fs::write(dir.path().join("ignored.rhai"), "## not collected\n1\n#=> 2\n").unwrap();

    let (_, stdout, code) = run_try(&[&path_arg(dir.path())]);
    assert_eq!(code, 0, "stdout:\n{}", stdout);
    assert!(stdout.contains("2 files, 2 tests, 2 passed, 0 failed"));
}

#[test]
fn exit_inside_a_case_keeps_going() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("exit_try.rhai");
    fs::write(&file, "## exits\nexit(4);\n#=> 1\n\n## continues\n5\n#=> 5\n").unwrap();
    let (_, stdout, code) = run_try(&["--fails", &path_arg(&file)]);
    assert_eq!(code, 1);
    assert!(stdout.contains("non-local exit: exit(4)"), "stdout:\n{}", stdout);
    assert!(!stdout.contains("continues"));
}

#[test]
fn missing_path_exits_two() {
    let (output, _, code) = run_try(&["/no/such/path_try.rhai"]);
    assert_eq!(code, 2);
    assert!(String::from_utf8_lossy(&output.stderr).contains("no such file or directory"));
}
