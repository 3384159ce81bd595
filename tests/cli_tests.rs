//! Integration tests for the `portable` binary

mod common;

use assert_cmd::Command;
use common::snapshot;
use predicates::prelude::*;
use tempfile::TempDir;

fn portable(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("portable").unwrap();
    cmd.env("PORTABLE_DATA_DIR", data_dir.path());
    cmd
}

#[test]
fn test_cli_help_lists_commands() {
    let mut cmd = Command::cargo_bin("portable").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("reset"));
}

#[test]
fn test_unknown_collision_exits_with_configuration_status() {
    let temp = TempDir::new().unwrap();
    portable(&temp)
        .args(["import", "--from-job", "nightly", "--collision", "merge"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("collision resolution"));

    assert!(!temp.path().join("destination.json").exists());
    assert!(!temp.path().join("checkpoints").exists());
}

#[test]
fn test_missing_source_snapshot_fails() {
    let temp = TempDir::new().unwrap();
    portable(&temp)
        .args(["export", "--source"])
        .arg(temp.path().join("absent.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load source snapshot"));
}

#[test]
fn test_status_of_empty_data_dir() {
    let temp = TempDir::new().unwrap();
    portable(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No jobs found"));

    portable(&temp)
        .args(["status", "never-ran"])
        .assert()
        .code(3);
}

#[test]
fn test_export_then_status_json() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("users.json");
    std::fs::write(&source, serde_json::to_vec(&snapshot(5)).unwrap()).unwrap();

    portable(&temp)
        .args(["export", "--job-id", "cli-a", "--source"])
        .arg(&source)
        .assert()
        .success()
        .stdout(predicate::str::contains("Job cli-a"))
        .stdout(predicate::str::contains("Exported Users"));

    portable(&temp)
        .args(["status", "cli-a", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"job_id\": \"cli-a\""))
        .stdout(predicate::str::contains("\"processed_items\": 5"));
}

#[test]
fn test_export_then_import_by_export_job() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("users.json");
    std::fs::write(&source, serde_json::to_vec(&snapshot(3)).unwrap()).unwrap();

    portable(&temp)
        .args(["import", "--from-job", "cli-a"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No export job cli-a"));

    portable(&temp)
        .args(["export", "--job-id", "cli-a", "--source"])
        .arg(&source)
        .assert()
        .success();
    assert!(temp.path().join("staging").join("cli-a").is_dir());

    portable(&temp)
        .args(["import", "--job-id", "cli-b", "--from-job", "cli-a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported Users"));
    assert!(temp.path().join("destination.json").exists());
}
