//! Integration tests for the `switchyard` CLI binary.
//!
//! Argument parsing, help output and completions run without any
//! configuration. The end-to-end tests use a temporary config with an
//! in-memory test switch, so no network access is needed.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `switchyard` binary with env isolation.
///
/// Clears all `SWITCHYARD_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn switchyard_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("switchyard");
    cmd.env("HOME", "/tmp/switchyard-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/switchyard-cli-test-nonexistent")
        .env("XDG_DATA_HOME", "/tmp/switchyard-cli-test-nonexistent")
        .env_remove("SWITCHYARD_CONFIG")
        .env_remove("SWITCHYARD_USER")
        .env_remove("SWITCHYARD_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// A config with one test switch, written into `dir`.
fn lab_config(dir: &Path) -> PathBuf {
    let path = dir.join("switchyard.toml");
    let data = dir.join("data");
    let text = format!(
        r#"
[defaults]
keyring = false
data_dir = "{data}"

[[groups]]
id = 1
name = "Lab"
members = ["netops", "guest"]
vlans = [10, 20]

[[devices]]
id = 1
name = "lab-sw1"
hostname = "lab-sw1.example.net"
group_id = 1
connector = "test-dummy"

[[users]]
name = "netops"
is_staff = true

[[users]]
name = "guest"
read_only = true

[[users]]
name = "outsider"

[[commands]]
id = 1
name = "clock"
command = "show clock"
"#,
        data = data.display()
    );
    std::fs::write(&path, text).unwrap();
    path
}

fn lab_cmd(config: &Path, user: &str) -> assert_cmd::Command {
    let mut cmd = switchyard_cmd();
    cmd.env("SWITCHYARD_CONFIG", config)
        .args(["--user", user, "--color", "never"]);
    cmd
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = switchyard_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    switchyard_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("layer-2")
            .and(predicate::str::contains("groups"))
            .and(predicate::str::contains("bulk-edit"))
            .and(predicate::str::contains("vlan")),
    );
}

#[test]
fn test_version_flag() {
    switchyard_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("switchyard"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    switchyard_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    switchyard_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_fish() {
    switchyard_cmd()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = switchyard_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_invalid_output_format() {
    let output = switchyard_cmd()
        .args(["--output", "invalid", "groups"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected output format error:\n{text}"
    );
}

#[test]
fn test_groups_without_config_names_the_user() {
    switchyard_cmd()
        .args(["--user", "nobody", "groups"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("nobody"));
}

#[test]
fn test_config_show_no_config() {
    // A missing file renders the defaults
    switchyard_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"));
}

#[test]
fn test_config_init_and_validate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/switchyard.toml");

    switchyard_cmd()
        .env("SWITCHYARD_CONFIG", &path)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(path.exists());

    switchyard_cmd()
        .env("SWITCHYARD_CONFIG", &path)
        .args(["config", "validate"])
        .assert()
        .success()
        .stderr(predicate::str::contains("1 switch(es)"));

    // A second init must not clobber the file
    switchyard_cmd()
        .env("SWITCHYARD_CONFIG", &path)
        .args(["config", "init"])
        .assert()
        .code(6);
}

// ── End to end against the test switch ──────────────────────────────

#[test]
fn test_groups_lists_member_switches() {
    let dir = tempfile::tempdir().unwrap();
    let config = lab_config(dir.path());

    lab_cmd(&config, "netops")
        .args(["--output", "plain", "groups"])
        .assert()
        .success()
        .stdout("lab-sw1\n");

    lab_cmd(&config, "outsider")
        .args(["--output", "json", "groups"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn test_show_then_change_an_interface() {
    let dir = tempfile::tempdir().unwrap();
    let config = lab_config(dir.path());

    lab_cmd(&config, "netops")
        .args(["show", "lab-sw1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Gi1/0/3").and(predicate::str::contains("Interfaces")));

    lab_cmd(&config, "netops")
        .args(["interface", "lab-sw1", "3", "down"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Interface Gi1/0/3: Disabled"));

    // The cached view remembers the change and the unsaved config
    lab_cmd(&config, "netops")
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("switchyard save"));

    lab_cmd(&config, "netops")
        .args(["--output", "json", "logs", "--action", "interface-down"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"if_name\": \"Gi1/0/3\""));
}

#[test]
fn test_read_only_user_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let config = lab_config(dir.path());

    lab_cmd(&config, "guest")
        .args(["interface", "lab-sw1", "3", "down"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Access denied"));

    lab_cmd(&config, "outsider")
        .args(["show", "lab-sw1"])
        .assert()
        .code(5);
}

#[test]
fn test_vlan_delete_needs_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    let config = lab_config(dir.path());

    // stdin is not a terminal here
    lab_cmd(&config, "netops")
        .args(["vlan", "lab-sw1", "delete", "20"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn test_bulk_edit_needs_a_change() {
    let dir = tempfile::tempdir().unwrap();
    let config = lab_config(dir.path());

    lab_cmd(&config, "netops")
        .args(["bulk-edit", "lab-sw1", "--interfaces", "1,2"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nothing to change"));
}

#[test]
fn test_exec_list_and_stats() {
    let dir = tempfile::tempdir().unwrap();
    let config = lab_config(dir.path());

    lab_cmd(&config, "netops")
        .args(["exec", "lab-sw1", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("show clock"));

    lab_cmd(&config, "netops")
        .args(["groups"])
        .assert()
        .success();

    // Counters persist between runs
    lab_cmd(&config, "netops")
        .args(["--output", "plain", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("views=1"));

    lab_cmd(&config, "guest")
        .args(["stats"])
        .assert()
        .code(5);
}
