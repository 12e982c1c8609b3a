//! CLI integration tests
//!
//! These run the `revtrail` binary against a scratch ledger and check that
//! capture, history and delete go through the engine layer.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_revtrail"))
        .current_dir(dir)
        .env("RUST_LOG", "off")
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn write_state(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
    path
}

fn contract(status: &str) -> Value {
    json!({
        "id": "contract-1",
        "companyName": "Cong Ty A",
        "status": status,
        "resellerId": "r-1"
    })
}

/// Captures draft -> active and returns the ledger path
fn seed(temp: &TempDir) -> PathBuf {
    let db = temp.path().join("ledger.db");
    let before = write_state(temp.path(), "before.json", &contract("draft"));
    let after = write_state(temp.path(), "after.json", &contract("active"));

    let output = run(
        temp.path(),
        &[
            "capture",
            "--db",
            db.to_str().unwrap(),
            "--entity-type",
            "contract",
            "--entity",
            "contract-1",
            "--before",
            before.to_str().unwrap(),
            "--after",
            after.to_str().unwrap(),
        ],
    );
    assert!(
        output.status.success(),
        "capture failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("Recorded revision #1"));
    db
}

#[test]
fn test_cli_history_json_lists_structured_change() {
    // Given: one captured status change
    let temp = TempDir::new().unwrap();
    let db = seed(&temp);

    // When: history is requested as JSON in English
    let output = run(
        temp.path(),
        &[
            "history",
            "--db",
            db.to_str().unwrap(),
            "--entity",
            "contract-1",
            "--lang",
            "en",
            "--json",
        ],
    );

    // Then: the page holds one group with the status change
    assert!(output.status.success());
    let page: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(page["totalCount"], json!(1));
    let change = &page["items"][0]["changes"][0];
    assert_eq!(change["path"], json!("status"));
    assert_eq!(change["label"], json!("Status"));
    assert_eq!(change["oldValue"], json!("draft"));
    assert_eq!(change["newValue"], json!("active"));
}

#[test]
fn test_cli_history_text_output_uses_labels() {
    let temp = TempDir::new().unwrap();
    let db = seed(&temp);

    let output = run(
        temp.path(),
        &["history", "--db", db.to_str().unwrap(), "--entity", "contract-1"],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Revisions for contract-1"));
    assert!(stdout.contains("Trạng thái: draft -> active"));
}

#[test]
fn test_cli_capture_identical_states_records_nothing() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("ledger.db");
    let same = write_state(temp.path(), "same.json", &contract("draft"));

    let output = run(
        temp.path(),
        &[
            "capture",
            "--db",
            db.to_str().unwrap(),
            "--entity-type",
            "contract",
            "--entity",
            "contract-1",
            "--before",
            same.to_str().unwrap(),
            "--after",
            same.to_str().unwrap(),
        ],
    );

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No change recorded"));
}

#[test]
fn test_cli_delete_then_history_is_empty() {
    let temp = TempDir::new().unwrap();
    let db = seed(&temp);

    let output = run(temp.path(), &["delete", "--db", db.to_str().unwrap(), "--id", "1"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Deleted revision #1"));

    let output = run(
        temp.path(),
        &[
            "history",
            "--db",
            db.to_str().unwrap(),
            "--entity",
            "contract-1",
            "--json",
        ],
    );
    let page: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(page["totalCount"], json!(0));
    assert_eq!(page["items"], json!([]));
}

#[test]
fn test_cli_delete_missing_revision_fails() {
    let temp = TempDir::new().unwrap();
    let db = seed(&temp);

    let output = run(temp.path(), &["delete", "--db", db.to_str().unwrap(), "--id", "99"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("ERR_NOT_FOUND"));
}

#[test]
fn test_cli_history_rejects_zero_page() {
    let temp = TempDir::new().unwrap();
    let db = seed(&temp);

    let output = run(
        temp.path(),
        &[
            "history",
            "--db",
            db.to_str().unwrap(),
            "--entity",
            "contract-1",
            "--page",
            "0",
        ],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_INVALID_INPUT"));
}

#[test]
fn test_cli_history_with_config_file_overrides_labels() {
    let temp = TempDir::new().unwrap();
    let db = seed(&temp);
    let config = temp.path().join("diff.toml");
    fs::write(
        &config,
        "language = \"en\"\n\n[labels.status]\nvi = \"Tình trạng\"\nen = \"Lifecycle\"\n",
    )
    .unwrap();

    let output = run(
        temp.path(),
        &[
            "history",
            "--db",
            db.to_str().unwrap(),
            "--entity",
            "contract-1",
            "--config",
            config.to_str().unwrap(),
        ],
    );

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Lifecycle: draft -> active"));
}
