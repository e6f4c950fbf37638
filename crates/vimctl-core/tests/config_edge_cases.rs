use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use vimctl_core::config::{Config, ConfigError, Profile};

/// Returns true if running as root (euid == 0). Used to skip permission tests.
#[cfg(unix)]
fn is_root() -> bool {
    std::process::Command::new("id")
        .arg("-u")
        .output()
        .ok()
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim() == "0")
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Missing, empty and corrupt files
// ---------------------------------------------------------------------------

#[test]
fn load_from_nonexistent_path_returns_default_config() {
    let path = PathBuf::from("/tmp/vimctl-test-nonexistent/does/not/exist/config.toml");
    assert!(!path.exists());

    let config = Config::load_from_path(&path).expect("missing file is not an error");

    assert!(config.profiles.is_empty());
    assert!(config.default_profile.is_none());
}

#[test]
fn load_empty_config_file_returns_default_config() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "").unwrap();

    let config = Config::load_from_path(&config_path).expect("empty file should parse as default");

    assert!(config.profiles.is_empty());
    assert!(config.default_profile.is_none());
}

#[test]
fn load_corrupt_toml_returns_parse_error() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "[[[broken").unwrap();

    let err = Config::load_from_path(&config_path).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("parse"), "error should mention parsing: {msg}");
}

#[test]
fn load_profile_missing_url_returns_error() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
[profiles.lab]
username = "administrator@vsphere.local"
"#,
    )
    .unwrap();

    assert!(Config::load_from_path(&config_path).is_err());
}

#[test]
fn load_config_with_unknown_fields_ignores_them() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
default_profile = "lab"
color = "always"

[profiles.lab]
url = "https://vcenter.lab.local"
username = "administrator@vsphere.local"
datastore = "ds01"
"#,
    )
    .unwrap();

    let config = Config::load_from_path(&config_path).unwrap();
    assert_eq!(config.default_profile.as_deref(), Some("lab"));
    assert_eq!(config.profiles["lab"].url, "https://vcenter.lab.local");
}

// ---------------------------------------------------------------------------
// Save / load round trip
// ---------------------------------------------------------------------------

#[test]
fn save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("nested").join("vimctl").join("config.toml");

    let mut config = Config::default();
    let mut profile = Profile::new("https://esx01.lab.local", "root");
    profile.insecure = true;
    profile.release = Some("8.0.2.0".to_string());
    config.set_profile("esx".to_string(), profile.clone());

    config.save_to_path(&config_path).unwrap();
    let loaded = Config::load_from_path(&config_path).unwrap();

    assert_eq!(loaded.profiles["esx"], profile);
    // Unset optional fields are not written out
    let raw = fs::read_to_string(&config_path).unwrap();
    assert!(!raw.contains("password"));
    assert!(!raw.contains("ca_cert"));
}

// ---------------------------------------------------------------------------
// Permission errors (unix only)
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[test]
fn load_unreadable_file_returns_clear_error() {
    use std::os::unix::fs::PermissionsExt;

    if is_root() {
        eprintln!("skipping test: running as root");
        return;
    }

    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "# valid toml").unwrap();
    fs::set_permissions(&config_path, fs::Permissions::from_mode(0o000)).unwrap();

    let msg = Config::load_from_path(&config_path).unwrap_err().to_string();
    assert!(
        msg.contains("load") || msg.contains("Permission"),
        "error should reference loading or permissions: {msg}"
    );

    fs::set_permissions(&config_path, fs::Permissions::from_mode(0o644)).unwrap();
}

#[cfg(unix)]
#[test]
fn save_to_readonly_directory_returns_clear_error() {
    use std::os::unix::fs::PermissionsExt;

    if is_root() {
        eprintln!("skipping test: running as root");
        return;
    }

    let dir = TempDir::new().unwrap();
    let readonly_dir = dir.path().join("readonly");
    fs::create_dir(&readonly_dir).unwrap();
    fs::set_permissions(&readonly_dir, fs::Permissions::from_mode(0o444)).unwrap();

    let config_path = readonly_dir.join("config.toml");
    let msg = Config::default()
        .save_to_path(&config_path)
        .unwrap_err()
        .to_string();
    assert!(
        msg.contains("save") || msg.contains("Permission"),
        "error should reference saving or permissions: {msg}"
    );

    fs::set_permissions(&readonly_dir, fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn io_failures_name_the_offending_path() {
    let dir = TempDir::new().unwrap();

    // A directory where the file should be cannot be read, even as root
    let err = Config::load_from_path(dir.path()).unwrap_err();
    match err {
        ConfigError::LoadError { path, .. } => assert_eq!(path, dir.path().display().to_string()),
        other => panic!("expected LoadError, got {other:?}"),
    }

    // A regular file in place of the parent directory
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    let err = Config::default()
        .save_to_path(&blocker.join("config.toml"))
        .unwrap_err();
    match err {
        ConfigError::SaveError { path, .. } => assert_eq!(path, blocker.display().to_string()),
        other => panic!("expected SaveError, got {other:?}"),
    }
}
