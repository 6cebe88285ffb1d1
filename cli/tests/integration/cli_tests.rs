//! Integration tests for the deck command surface.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `deck` with config and credential files isolated in `home`.
fn deck(home: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("deck"));
    cmd.env("NO_COLOR", "1")
        .env("DECK_CONFIG", home.path().join("config.yaml"))
        .env("DECK_AUTH_FILE", home.path().join("auth.json"))
        .env_remove("DECK_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn home() -> TempDir {
    TempDir::new().expect("tempdir")
}

// --- Help and version ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    let home = home();
    deck(&home).assert().code(2).stderr(predicate::str::contains(
        "Run one-off processes and control containers on deck",
    ));
}

#[test]
fn test_cli_help_lists_commands() {
    let home = home();
    deck(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("send-signal"));
}

#[test]
fn test_version_command_shows_version() {
    let home = home();
    deck(&home)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(concat!("deck v", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let home = home();
    let output = deck(&home)
        .args(["version", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(v["version"], env!("CARGO_PKG_VERSION"));
}

// --- Argument validation ---

#[test]
fn test_run_without_command_is_usage_error() {
    let home = home();
    deck(&home)
        .args(["run", "--app", "demo"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("COMMAND"));
}

#[test]
fn test_send_signal_without_names_fails_before_login() {
    let home = home();
    deck(&home)
        .args(["send-signal", "--app", "demo", "--signal", "SIGUSR1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "at least one container name should be given",
        ));
    assert!(!home.path().join("auth.json").exists());
}

#[test]
fn test_send_signal_blank_signal_fails_before_login() {
    let home = home();
    deck(&home)
        .args(["kill", "--app", "demo", "--signal", " ", "web-1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("signal must not be empty"));
}

#[test]
fn test_json_errors_use_error_schema() {
    let home = home();
    let output = deck(&home)
        .args(["send-signal", "--json", "-a", "demo", "-s", "SIGTERM"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    let v: serde_json::Value = serde_json::from_slice(&output.stderr).expect("JSON error");
    assert_eq!(v["error"], true);
    assert_eq!(v["code"], "invalid_argument");
}

// --- Configuration ---

#[test]
fn test_invalid_api_url_flag_is_rejected() {
    let home = home();
    deck(&home)
        .args(["--api-url", "ftp://api.example.test", "version"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("api.url"));
}

#[test]
fn test_invalid_config_file_is_reported_with_its_path() {
    let home = home();
    std::fs::write(home.path().join("config.yaml"), "api:\n  url: not a url\n").expect("write");
    deck(&home)
        .arg("version")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config.yaml"));
}

// --- Credential commands ---

#[test]
fn test_logout_without_credential_succeeds() {
    let home = home();
    deck(&home)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));
}

#[test]
fn test_logout_removes_stored_credential() {
    let home = home();
    let auth = home.path().join("auth.json");
    std::fs::write(
        &auth,
        r#"{"username":"ada","email":"ada@example.test","token":"t","issued_at":"2024-01-01T00:00:00Z"}"#,
    )
    .expect("write");

    deck(&home)
        .args(["logout", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"logged_out\": true"));
    assert!(!auth.exists());
}

#[test]
fn test_whoami_without_credential_asks_to_login() {
    let home = home();
    deck(&home)
        .arg("whoami")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("deck login"));
}
