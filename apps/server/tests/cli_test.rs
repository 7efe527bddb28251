//! Tests for the `conductor` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn conductor(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("conductor").unwrap();
    cmd.current_dir(dir.path()).env("RUST_LOG", "off");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    conductor(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("validate-config"));
}

#[test]
fn test_validate_config_prints_defaults() {
    let dir = TempDir::new().unwrap();
    conductor(&dir)
        .arg("validate-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("port = 8000"))
        .stdout(predicate::str::contains("agent_timeout_secs = 30"));
}

#[test]
fn test_validate_config_reads_file_and_env() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(&path, "[server]\nport = 9100\n\n[model]\napi_key = \"sk-secret\"\n").unwrap();

    conductor(&dir)
        .env("CONDUCTOR_ORCHESTRATOR__REQUEST_DEADLINE_SECS", "45")
        .args(["--config", path.to_str().unwrap(), "validate-config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("port = 9100"))
        .stdout(predicate::str::contains("request_deadline_secs = 45"))
        .stdout(predicate::str::contains("sk-secret").not());
}

#[test]
fn test_default_config_file_picked_up() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("conductor.toml"), "[search]\nmax_results = 3\n").unwrap();

    conductor(&dir)
        .arg("validate-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("max_results = 3"));
}

#[test]
fn test_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[model]\nprovider = \"gemini\"\n").unwrap();

    conductor(&dir)
        .args(["--config", path.to_str().unwrap(), "validate-config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("gemini"));
}

#[test]
fn test_run_prints_result_json() {
    let dir = TempDir::new().unwrap();
    conductor(&dir)
        .args(["run", "Draft an email about the launch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success\": true"))
        .stdout(predicate::str::contains("\"agents_executed\""))
        .stdout(predicate::str::contains("\"mail\""));
}

#[test]
fn test_run_with_attachment() {
    let dir = TempDir::new().unwrap();
    let notes = dir.path().join("notes.md");
    fs::write(&notes, "# Q4\nRevenue grew 12%.").unwrap();

    conductor(&dir)
        .args(["run", "Summarise these notes", "--file", notes.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"file\""))
        .stdout(predicate::str::contains("notes.md"));
}

#[test]
fn test_run_rejects_empty_query() {
    let dir = TempDir::new().unwrap();
    conductor(&dir)
        .args(["run", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Query must not be empty"));
}
