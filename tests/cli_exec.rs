//! Integration tests for `proctor exec`
//!
//! These tests execute the compiled proctor binary directly using `assert_cmd`.

#![cfg(unix)]

use assert_cmd::assert::OutputAssertExt;
use predicates::prelude::*;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// A scratch directory with a `.git` marker so config discovery never
/// escapes it.
fn sandbox() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join(".git")).unwrap();
    dir
}

fn proctor(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("proctor"));
    cmd.current_dir(dir.path());
    cmd.env_remove("RUST_LOG");
    cmd.stdin(Stdio::null());
    cmd
}

#[test]
fn relays_stdout_and_stderr() {
    let dir = sandbox();
    proctor(&dir)
        .args(["exec", "--", "sh", "-c", "echo out; echo err >&2"])
        .assert()
        .success()
        .stdout("out\n")
        .stderr(predicate::str::contains("err\n"));
}

#[test]
fn propagates_the_program_exit_code() {
    let dir = sandbox();
    proctor(&dir)
        .args(["exec", "--", "sh", "-c", "exit 7"])
        .assert()
        .code(7);
}

#[test]
fn feeds_input_to_stdin() {
    let dir = sandbox();
    proctor(&dir)
        .args(["exec", "--input", "hello\n", "--", "tr", "a-z", "A-Z"])
        .assert()
        .success()
        .stdout("HELLO\n");
}

#[test]
fn feeds_input_file_to_stdin() {
    let dir = sandbox();
    std::fs::write(dir.path().join("in.txt"), "one\ntwo\n").unwrap();
    proctor(&dir)
        .args(["exec", "--input-file", "in.txt", "--", "wc", "-l"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2"));
}

#[test]
fn missing_input_file_is_an_internal_error() {
    let dir = sandbox();
    proctor(&dir)
        .args(["exec", "--input-file", "absent.txt", "--", "cat"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read input file"));
}

#[test]
fn timeout_exits_10_and_kills_the_group() {
    let dir = sandbox();
    let start = Instant::now();
    proctor(&dir)
        .args(["--timeout", "1", "exec", "--", "sh", "-c", "sleep 30 & sleep 30"])
        .assert()
        .code(10)
        .stderr(predicate::str::contains("Error: 1s timeout expired"));
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[test]
fn missing_program_exits_127() {
    let dir = sandbox();
    proctor(&dir)
        .args(["exec", "--", "definitely-not-a-real-program-xyz"])
        .assert()
        .code(127)
        .stderr(predicate::str::contains(
            "unable to run command 'definitely-not-a-real-program-xyz'",
        ));
}

#[test]
fn json_output_describes_the_run() {
    let dir = sandbox();
    let output = proctor(&dir)
        .args(["exec", "--json", "--", "sh", "-c", "echo hi; exit 3"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["outcome"], "completed");
    assert_eq!(json["exit_code"], 3);
    assert_eq!(json["stdout"], "hi\n");
    assert!(json["elapsed_ms"].is_u64());
    assert!(json.get("message").is_none());
}

#[test]
fn json_output_on_timeout() {
    let dir = sandbox();
    let output = proctor(&dir)
        .args(["--timeout", "1", "exec", "--json", "--", "sleep", "30"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(10));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["outcome"], "timed_out");
    assert_eq!(json["message"], "1s timeout expired");
}

#[test]
fn arguments_after_separator_reach_the_program() {
    let dir = sandbox();
    proctor(&dir)
        .args(["exec", "--", "echo", "--json", "-v"])
        .assert()
        .success()
        .stdout("--json -v\n");
}

#[test]
fn zero_timeout_is_rejected() {
    let dir = sandbox();
    proctor(&dir)
        .args(["--timeout", "0", "exec", "--", "true"])
        .assert()
        .code(2);
}

#[test]
fn help_lists_subcommands() {
    let dir = sandbox();
    proctor(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("exec"))
        .stdout(predicate::str::contains("grade"))
        .stdout(predicate::str::contains("config"));
}
