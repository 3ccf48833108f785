//! Integration tests for `proctor config` and config discovery

use assert_cmd::assert::OutputAssertExt;
use predicates::prelude::*;
use std::process::{Command, Stdio};
use tempfile::TempDir;

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

fn write_config(dir: &TempDir, content: &str) {
    let config_dir = dir.path().join(".proctor");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), content).unwrap();
}

#[test]
fn defaults_are_attributed_to_default() {
    let dir = sandbox();
    proctor(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Effective configuration:\n"))
        .stdout(predicate::str::contains("timeout_secs = 30 (from default)"))
        .stdout(predicate::str::contains("iota = ./bin/iota (from default)"));
}

#[test]
fn cli_flag_beats_config_file() {
    let dir = sandbox();
    write_config(&dir, "[defaults]\ntimeout_secs = 12\njobs = 3\n");

    proctor(&dir)
        .args(["--timeout", "5", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("timeout_secs = 5 (from cli)"))
        .stdout(predicate::str::contains("jobs = 3 (from config)"));
}

#[test]
fn config_file_is_found_from_a_subdirectory() {
    let dir = sandbox();
    write_config(&dir, "[toolchains]\njava = \"/opt/jdk/bin/java\"\n");
    let nested = dir.path().join("hw1").join("src");
    std::fs::create_dir_all(&nested).unwrap();

    let mut cmd = proctor(&dir);
    cmd.current_dir(&nested)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("java = /opt/jdk/bin/java (from config)"));
}

#[test]
fn explicit_config_path() {
    let dir = sandbox();
    std::fs::write(dir.path().join("grading.toml"), "[defaults]\nverbose = true\n").unwrap();

    proctor(&dir)
        .args(["--config", "grading.toml", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("verbose = true (from config)"));
}

#[test]
fn json_output_has_value_and_source() {
    let dir = sandbox();
    let output = proctor(&dir)
        .args(["--timeout", "7", "config", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["timeout_secs"]["value"], "7");
    assert_eq!(json["timeout_secs"]["source"], "cli");
    assert_eq!(json["jmm"]["value"], "./bin/j--");
    assert_eq!(json["jmm"]["source"], "default");
}

#[test]
fn invalid_config_file_exits_2() {
    let dir = sandbox();
    write_config(&dir, "[defaults]\ntimeout_secs = \"soon\"\n");

    proctor(&dir)
        .arg("config")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to load config file"));
}

#[test]
fn unknown_config_key_exits_2() {
    let dir = sandbox();
    write_config(&dir, "[defaults]\nretries = 3\n");

    proctor(&dir).arg("config").assert().code(2);
}
