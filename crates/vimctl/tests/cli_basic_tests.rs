use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper to create a test command isolated from the caller's environment
fn vimctl() -> Command {
    let mut cmd = Command::cargo_bin("vimctl").unwrap();
    for var in [
        "VIMCTL_PROFILE",
        "VIMCTL_CONFIG_FILE",
        "VIMCTL_URL",
        "VIMCTL_USERNAME",
        "VIMCTL_PASSWORD",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn config_file(dir: &TempDir) -> String {
    dir.path().join("config.toml").to_string_lossy().to_string()
}

#[test]
fn test_help_flag() {
    vimctl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("vSphere"))
        .stdout(predicate::str::contains("EXAMPLES:"));
}

#[test]
fn test_version_flag() {
    vimctl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vimctl"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_version_subcommand_json() {
    vimctl()
        .args(["version", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"vimctl\""));
}

#[test]
fn test_no_args_shows_help() {
    vimctl()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_invalid_subcommand() {
    vimctl()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_create_help_lists_item_types() {
    vimctl()
        .args(["create", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--parentname"))
        .stdout(predicate::str::contains("--itemtype"))
        .stdout(predicate::str::contains("--itemname"))
        .stdout(predicate::str::contains("--licensekey"))
        .stdout(predicate::str::contains("Host-Standalone"));
}

#[test]
fn test_create_missing_required_args() {
    vimctl()
        .args(["create", "--parentname", "Root", "--itemtype", "Folder"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--itemname"));
}

#[test]
fn test_create_without_profile_or_url_exits_one() {
    let dir = TempDir::new().unwrap();
    vimctl()
        .args(["--config-file", &config_file(&dir)])
        .args([
            "create",
            "--parentname",
            "Root",
            "--itemtype",
            "Folder",
            "--itemname",
            "myFolder",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No profile configured"));
}

#[test]
fn test_create_without_password_on_non_terminal_exits_one() {
    let dir = TempDir::new().unwrap();
    vimctl()
        .args(["--config-file", &config_file(&dir)])
        .args(["--url", "https://127.0.0.1:1", "--username", "root"])
        .args([
            "create",
            "--parentname",
            "Root",
            "--itemtype",
            "Folder",
            "--itemname",
            "myFolder",
        ])
        .write_stdin("")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Missing password"));
}

#[test]
fn test_create_unreachable_server_exits_one() {
    let dir = TempDir::new().unwrap();
    vimctl()
        .args(["--config-file", &config_file(&dir)])
        .args([
            "--url",
            "http://127.0.0.1:1",
            "--username",
            "root",
            "--password",
            "secret",
        ])
        .args([
            "create",
            "--parentname",
            "Root",
            "--itemtype",
            "Datacenter",
            "--itemname",
            "dc",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_profile_set_list_show_remove() {
    let dir = TempDir::new().unwrap();
    let config = config_file(&dir);

    vimctl()
        .args(["--config-file", &config, "profile", "set", "lab"])
        .args(["--url", "https://vcenter.lab.local"])
        .args(["--username", "administrator@vsphere.local"])
        .args(["--task-timeout", "120"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile 'lab' saved"))
        .stdout(predicate::str::contains("Set as default profile"));

    vimctl()
        .args(["--config-file", &config, "profile", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lab*"))
        .stdout(predicate::str::contains("https://vcenter.lab.local"));

    vimctl()
        .args(["--config-file", &config, "profile", "show", "lab", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"is_default\": true"))
        .stdout(predicate::str::contains("\"task_timeout_secs\": 120"))
        .stdout(predicate::str::contains("\"has_password\": false"));

    vimctl()
        .args(["--config-file", &config, "profile", "remove", "lab"])
        .assert()
        .success();

    vimctl()
        .args(["--config-file", &config, "profile", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No profiles configured"));
}

#[test]
fn test_profile_set_requires_url() {
    let dir = TempDir::new().unwrap();
    vimctl()
        .args(["--config-file", &config_file(&dir), "profile", "set", "lab"])
        .args(["--username", "root"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Missing url"));
}

#[test]
fn test_profile_show_unknown_profile() {
    let dir = TempDir::new().unwrap();
    vimctl()
        .args(["--config-file", &config_file(&dir), "profile", "show", "nope"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Profile 'nope' not found"));
}

#[test]
fn test_profile_path_uses_explicit_config_file() {
    let dir = TempDir::new().unwrap();
    let config = config_file(&dir);
    vimctl()
        .args(["--config-file", &config, "profile", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(config.as_str()));
}

#[test]
fn test_completions_bash() {
    vimctl()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vimctl"));
}
