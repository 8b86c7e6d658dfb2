//! Integration tests for the `connectrix` CLI binary.
//!
//! These tests run against the built-in demo services with simulated
//! latency switched off. Every test gets its own HOME so config and the
//! persisted session never leak between tests or into the user's account.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `connectrix` binary isolated under `home`.
fn connectrix_cmd(home: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("connectrix");
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("CONNECTRIX_DEFAULTS__LATENCY_MS", "0")
        .env("NO_COLOR", "1")
        .env_remove("CONNECTRIX_OUTPUT")
        .env_remove("CONNECTRIX_TIMEOUT")
        .env_remove("CONNECTRIX_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

fn login(home: &TempDir, email: &str, password: &str, role: &str) {
    connectrix_cmd(home)
        .args(["login", "--email", email, "--password", password, "--role", role])
        .assert()
        .success()
        .stderr(predicate::str::contains("Login successful!"));
}

fn login_admin(home: &TempDir) {
    login(home, "admin@connectrix.io", "Admin@123", "admin");
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = connectrix_cmd(&home).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    connectrix_cmd(&home).arg("--help").assert().success().stdout(
        predicate::str::contains("Connectrix WiFi")
            .and(predicate::str::contains("login"))
            .and(predicate::str::contains("clients"))
            .and(predicate::str::contains("usage")),
    );
}

#[test]
fn test_completions_zsh() {
    let home = TempDir::new().unwrap();
    connectrix_cmd(&home)
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Session guard ───────────────────────────────────────────────────

#[test]
fn test_roster_requires_login() {
    let home = TempDir::new().unwrap();
    connectrix_cmd(&home)
        .args(["clients", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Not signed in"));
}

#[test]
fn test_bad_password_is_rejected() {
    let home = TempDir::new().unwrap();
    let output = connectrix_cmd(&home)
        .args([
            "login",
            "--email",
            "admin@connectrix.io",
            "--password",
            "wrong",
            "--role",
            "admin",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("Invalid email, password, or role"), "{text}");
}

#[test]
fn test_wrong_role_is_rejected() {
    let home = TempDir::new().unwrap();
    connectrix_cmd(&home)
        .args([
            "login",
            "--email",
            "john@example.com",
            "--password",
            "Client@123",
            "--role",
            "admin",
        ])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid email, password, or role"));
}

#[test]
fn test_client_cannot_open_roster() {
    let home = TempDir::new().unwrap();
    login(&home, "john@example.com", "Client@123", "client");
    connectrix_cmd(&home)
        .args(["clients", "list"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("requires the admin role"));
}

#[test]
fn test_session_survives_and_logout_clears_it() {
    let home = TempDir::new().unwrap();
    login_admin(&home);

    connectrix_cmd(&home)
        .args(["whoami", "-o", "plain"])
        .assert()
        .success()
        .stdout("admin@connectrix.io\n");

    connectrix_cmd(&home)
        .arg("logout")
        .assert()
        .success()
        .stderr(predicate::str::contains("Logged out"));

    connectrix_cmd(&home).arg("whoami").assert().code(3);
}

#[test]
fn test_route_resolution() {
    let home = TempDir::new().unwrap();
    connectrix_cmd(&home)
        .args(["route", "/admin/dashboard", "-o", "plain"])
        .assert()
        .success()
        .stdout("/login\n");

    login(&home, "jane@example.com", "Client@123", "client");
    connectrix_cmd(&home)
        .args(["route", "/admin/clients/new", "-o", "plain"])
        .assert()
        .success()
        .stdout("/unauthorized\n");
}

// ── Roster ──────────────────────────────────────────────────────────

#[test]
fn test_list_and_filter() {
    let home = TempDir::new().unwrap();
    login_admin(&home);

    connectrix_cmd(&home)
        .args(["clients", "list", "-o", "plain"])
        .assert()
        .success()
        .stdout("1\n2\n3\n");

    connectrix_cmd(&home)
        .args(["clients", "list", "--search", "JOHN", "-o", "plain"])
        .assert()
        .success()
        .stdout("1\n3\n");

    connectrix_cmd(&home)
        .args(["clients", "list", "--filter", "disconnected", "-o", "plain"])
        .assert()
        .success()
        .stdout("3\n");
}

#[test]
fn test_get_unknown_client() {
    let home = TempDir::new().unwrap();
    login_admin(&home);
    connectrix_cmd(&home)
        .args(["clients", "get", "99"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_disconnect_needs_confirmation_without_terminal() {
    let home = TempDir::new().unwrap();
    login_admin(&home);
    connectrix_cmd(&home)
        .args(["clients", "disconnect", "1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn test_disconnect_with_yes() {
    let home = TempDir::new().unwrap();
    login_admin(&home);
    connectrix_cmd(&home)
        .args(["-y", "clients", "disconnect", "1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("John Doe has been disconnected"));

    connectrix_cmd(&home)
        .args(["-y", "clients", "disconnect", "3"])
        .assert()
        .success()
        .stderr(predicate::str::contains("already disconnected"));
}

#[test]
fn test_bulk_disconnect_reports_once() {
    let home = TempDir::new().unwrap();
    login_admin(&home);
    connectrix_cmd(&home)
        .args(["-y", "clients", "bulk-disconnect", "1", "2", "-o", "plain"])
        .assert()
        .success()
        .stdout("1\n2\n")
        .stderr(predicate::str::contains("2 clients disconnected"));
}

#[test]
fn test_bulk_disconnect_empty_selection() {
    let home = TempDir::new().unwrap();
    login_admin(&home);
    connectrix_cmd(&home)
        .args([
            "-y",
            "clients",
            "bulk-disconnect",
            "--all-visible",
            "--search",
            "nobody",
        ])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("No clients selected"));
}

#[test]
fn test_limit_speed_and_reminder() {
    let home = TempDir::new().unwrap();
    login_admin(&home);
    connectrix_cmd(&home)
        .args(["clients", "limit-speed", "2", "5"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Jane Smith limited to 5Mbps"));

    connectrix_cmd(&home)
        .args(["clients", "remind", "1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Reminder sent to John Doe"));
}

#[test]
fn test_create_client() {
    let home = TempDir::new().unwrap();
    login_admin(&home);
    connectrix_cmd(&home)
        .args([
            "clients",
            "create",
            "--name",
            "Ann Lee",
            "--email",
            "ann@example.com",
            "--phone",
            "+254745678901",
            "--plan",
            "premium",
            "-o",
            "plain",
        ])
        .assert()
        .success()
        .stdout("4\n")
        .stderr(predicate::str::contains("Client created successfully!"));
}

#[test]
fn test_create_client_rejects_bad_email() {
    let home = TempDir::new().unwrap();
    login_admin(&home);
    connectrix_cmd(&home)
        .args([
            "clients",
            "create",
            "--name",
            "Ann Lee",
            "--email",
            "not-an-email",
            "--phone",
            "+254745678901",
            "--plan",
            "premium",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Please fill in all required fields"));
}

// ── Client portal ───────────────────────────────────────────────────

#[test]
fn test_usage_for_client() {
    let home = TempDir::new().unwrap();
    login(&home, "john@example.com", "Client@123", "client");
    connectrix_cmd(&home)
        .args(["usage", "-o", "json-compact"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"name\":\"John Doe\"")
                .and(predicate::str::contains("\"usage_percent\":45.0")),
        );
}

#[test]
fn test_usage_is_client_only() {
    let home = TempDir::new().unwrap();
    login_admin(&home);
    connectrix_cmd(&home).arg("usage").assert().code(5);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_set_and_show() {
    let home = TempDir::new().unwrap();
    connectrix_cmd(&home)
        .args(["config", "set", "defaults.timeout", "4"])
        .assert()
        .success();
    connectrix_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("timeout = 4"));
}

#[test]
fn test_invalid_config_value() {
    let home = TempDir::new().unwrap();
    connectrix_cmd(&home)
        .args(["config", "set", "defaults.output", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("defaults.output"));
}
