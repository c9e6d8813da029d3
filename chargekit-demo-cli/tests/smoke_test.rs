//! Smoke tests for chargekit-demo-cli
//!
//! These run the built binary against a temporary storage directory and never
//! reach a server or platform.

use std::process::{Command, Output};

use tempfile::TempDir;

fn run(storage: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_chargekit-demo"))
        .arg("--storage-dir")
        .arg(storage.path())
        .args(["--server", "http://127.0.0.1:9"])
        .args(args)
        .env_remove("PLATFORM_API_URL")
        .env_remove("CHARGEKIT_DEMO_DIR")
        .output()
        .expect("Failed to execute command")
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_chargekit-demo"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    for command in ["wallet", "subscribe", "status", "charge", "revoke", "show"] {
        assert!(stdout.contains(command), "Help should mention '{}'", command);
    }
}

#[test]
fn test_show_with_empty_storage() {
    let storage = TempDir::new().unwrap();
    let output = run(&storage, &["show"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("No wallet yet"));
    assert!(stdout.contains("No subscription yet"));
}

#[test]
fn test_charge_without_identity_is_rejected_locally() {
    let storage = TempDir::new().unwrap();
    let output = run(&storage, &["charge"]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success());
    assert!(stderr.contains("Create a wallet and a subscription before charging"));
}

#[test]
fn test_invalid_charge_amount() {
    let storage = TempDir::new().unwrap();
    let output = run(&storage, &["charge", "--amount", "abc"]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success());
    assert!(stderr.contains("Invalid amount"));
}

#[test]
fn test_restored_identity_is_shown() {
    let storage = TempDir::new().unwrap();
    std::fs::write(
        storage.path().join("identity.json"),
        r#"{"chargekit_wallet":"{\"version\":1,\"record\":{\"address\":\"0xabc\",\"walletName\":\"demo\"}}"}"#,
    )
    .unwrap();

    let output = run(&storage, &["show"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("0xabc"));
}

#[test]
fn test_reset_clears_storage() {
    let storage = TempDir::new().unwrap();
    std::fs::write(
        storage.path().join("identity.json"),
        r#"{"chargekit_wallet":"{\"version\":1,\"record\":{\"address\":\"0xabc\"}}"}"#,
    )
    .unwrap();

    let output = run(&storage, &["reset", "--yes"]);
    assert!(output.status.success());

    let output = run(&storage, &["show"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("0xabc"));
    assert!(stdout.contains("No wallet yet"));
}
