//! Integration tests for dotenv failure handling in CLI.
//!
//! Responsibilities:
//! - Prove that invalid `.env` files cause the CLI to fail at startup.
//! - Prove that error messages do not leak secrets from the `.env` file.
//! - Ensure DOTENV_DISABLED=1 allows the CLI to skip a malformed `.env`.
//! - Prove that a valid `.env` feeds `KCONNECT_*` provider items.
//!
//! Invariants:
//! - Tests must explicitly clear `DOTENV_DISABLED` to enable dotenv loading.
//! - Tests use temp directories and set current_dir to isolate `.env` file effects.

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn kconnect_in(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("kconnect");
    cmd.current_dir(dir.path());
    for (key, _) in std::env::vars() {
        if key.starts_with("KCONNECT_") {
            cmd.env_remove(&key);
        }
    }
    cmd.env_remove("DOTENV_DISABLED");
    cmd
}

#[test]
fn test_invalid_dotenv_causes_cli_failure() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(".env"), "INVALID_LINE_WITHOUT_EQUALS").unwrap();

    kconnect_in(&temp_dir)
        .arg("providers")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(".env"));
}

#[test]
fn test_invalid_dotenv_does_not_leak_secrets() {
    let temp_dir = TempDir::new().unwrap();
    let secret_value = "supersecret_kconnect_password_12345";
    fs::write(
        temp_dir.path().join(".env"),
        format!("KCONNECT_PASSWORD={}\nINVALID_LINE", secret_value),
    )
    .unwrap();

    kconnect_in(&temp_dir)
        .arg("providers")
        .assert()
        .failure()
        .stderr(predicate::str::contains(secret_value).not());
}

#[test]
fn test_dotenv_disabled_skips_invalid_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(".env"), "INVALID_LINE_WITHOUT_EQUALS").unwrap();

    kconnect_in(&temp_dir)
        .env("DOTENV_DISABLED", "1")
        .arg("providers")
        .assert()
        .success();
}

#[test]
fn test_dotenv_values_populate_provider_items() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(".env"),
        "KCONNECT_CREDENTIAL_LIFETIME=0\n",
    )
    .unwrap();

    kconnect_in(&temp_dir)
        .args(["auth", "aws-iam"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("credential-lifetime"));
}
