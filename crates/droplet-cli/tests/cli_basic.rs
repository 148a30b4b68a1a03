//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. The dev
//! data directory keeps them away from a real user config.

use std::process::Command;

fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "droplet-cli", "--"])
        .args(args)
        .env("DROPLET_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn messages_lists_the_catalog() {
    let (stdout, _stderr, code) = run_cli(&["messages"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.lines().count(), 3);
}

#[test]
fn config_path_points_at_a_toml_file() {
    let (stdout, _stderr, code) = run_cli(&["config", "path"]);
    assert_eq!(code, 0);
    assert!(stdout.trim().ends_with("config.toml"));
}

#[test]
fn config_get_unknown_key_fails() {
    let (_stdout, stderr, code) = run_cli(&["config", "get", "nonexistent"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown config key"));
}
