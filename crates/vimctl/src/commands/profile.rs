//! Profile management command implementations

use serde_json::json;
use tracing::{debug, trace};
use vimctl_core::config::CredentialStore;
use vimctl_core::{Config, Profile};

use crate::cli::{OutputFormat, ProfileCommands};
use crate::connection::{ConnectionManager, ConnectionOverrides};
use crate::error::{Result as CliResult, VimCtlError};
use crate::output::{self, print_output};

pub async fn handle_profile_command(
    profile_cmd: &ProfileCommands,
    overrides: &ConnectionOverrides,
    conn_mgr: &ConnectionManager,
    output_format: OutputFormat,
) -> CliResult<()> {
    use ProfileCommands::*;

    match profile_cmd {
        List => handle_list(conn_mgr, output_format),
        Path => handle_path(conn_mgr, output_format),
        Show { name } => handle_show(conn_mgr, name, output_format),
        Set {
            name,
            ca_cert,
            release,
            task_timeout,
            task_interval,
            #[cfg(feature = "secure-storage")]
            use_keyring,
        } => {
            let mut profile = Profile::new(
                required(overrides.url.as_deref(), "url")?,
                required(overrides.username.as_deref(), "username")?,
            );
            profile.password = overrides.password.clone();
            profile.insecure = overrides.insecure;
            profile.ca_cert = ca_cert.clone();
            profile.release = release.clone();
            profile.task_timeout_secs = *task_timeout;
            profile.task_interval_secs = *task_interval;

            #[cfg(feature = "secure-storage")]
            let store_in_keyring = *use_keyring;
            #[cfg(not(feature = "secure-storage"))]
            let store_in_keyring = false;

            handle_set(conn_mgr, name, profile, store_in_keyring)
        }
        Remove { name } => handle_remove(conn_mgr, name),
        Default { name } => handle_default(conn_mgr, name),
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> CliResult<&'a str> {
    value.ok_or_else(|| VimCtlError::MissingCredentials {
        field: field.to_string(),
    })
}

fn config_path_string(conn_mgr: &ConnectionManager) -> Option<String> {
    conn_mgr
        .config_path
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .or_else(|| {
            Config::config_path()
                .ok()
                .map(|p| p.to_string_lossy().to_string())
        })
}

fn profile_summary(conn_mgr: &ConnectionManager, name: &str, profile: &Profile) -> serde_json::Value {
    let mut obj = json!({
        "name": name,
        "url": profile.url,
        "username": profile.username,
        "insecure": profile.insecure,
        "is_default": conn_mgr.config.default_profile.as_deref() == Some(name),
        "has_password": profile.has_password(),
    });
    if let Some(ca_cert) = &profile.ca_cert {
        obj["ca_cert"] = json!(ca_cert);
    }
    if let Some(release) = &profile.release {
        obj["release"] = json!(release);
    }
    let wait = profile.wait_config();
    obj["task_timeout_secs"] = json!(wait.timeout.as_secs());
    obj["task_interval_secs"] = json!(wait.interval.as_secs());
    obj
}

fn handle_list(conn_mgr: &ConnectionManager, output_format: OutputFormat) -> CliResult<()> {
    debug!("Listing all configured profiles");
    let profiles = conn_mgr.config.list_profiles();
    trace!("Found {} profiles", profiles.len());

    if let Some(fmt) = output::OutputFormat::from_cli(output_format) {
        let list: Vec<_> = profiles
            .iter()
            .map(|(name, profile)| profile_summary(conn_mgr, name, profile))
            .collect();
        return print_output(
            json!({
                "config_path": config_path_string(conn_mgr),
                "profiles": list,
                "count": list.len(),
            }),
            fmt,
        );
    }

    if profiles.is_empty() {
        println!("No profiles configured.");
        println!("Use 'vimctl profile set' to create a profile.");
        return Ok(());
    }

    if let Some(path) = config_path_string(conn_mgr) {
        println!("Configuration file: {}", path);
        println!();
    }
    println!("{:<15} {:<40} {}", "NAME", "URL", "USERNAME");
    println!("{:-<15} {:-<40} {:-<25}", "", "", "");
    for (name, profile) in profiles {
        let marker = if conn_mgr.config.default_profile.as_deref() == Some(name.as_str()) {
            "*"
        } else {
            ""
        };
        println!(
            "{:<15} {:<40} {}",
            format!("{}{}", name, marker),
            profile.url,
            profile.username
        );
    }
    Ok(())
}

fn handle_path(conn_mgr: &ConnectionManager, output_format: OutputFormat) -> CliResult<()> {
    let config_path = match &conn_mgr.config_path {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };

    match output::OutputFormat::from_cli(output_format) {
        Some(fmt) => print_output(json!({ "config_path": config_path.to_str() }), fmt),
        None => {
            println!("{}", config_path.display());
            Ok(())
        }
    }
}

fn handle_show(
    conn_mgr: &ConnectionManager,
    name: &str,
    output_format: OutputFormat,
) -> CliResult<()> {
    let profile = conn_mgr
        .config
        .profiles
        .get(name)
        .ok_or_else(|| VimCtlError::ProfileNotFound {
            name: name.to_string(),
        })?;

    if let Some(fmt) = output::OutputFormat::from_cli(output_format) {
        return print_output(profile_summary(conn_mgr, name, profile), fmt);
    }

    let password = match profile.password.as_deref() {
        Some(p) if CredentialStore::is_keyring_reference(p) => "(keyring)",
        Some(_) => "(stored)",
        None => "(prompt)",
    };
    let wait = profile.wait_config();

    println!("Profile: {}", name);
    println!("URL: {}", profile.url);
    println!("Username: {}", profile.username);
    println!("Password: {}", password);
    println!("Insecure: {}", profile.insecure);
    if let Some(ca_cert) = &profile.ca_cert {
        println!("CA certificate: {}", ca_cert);
    }
    if let Some(release) = &profile.release {
        println!("API release: {}", release);
    }
    println!(
        "Task wait: {}s timeout, {}s interval",
        wait.timeout.as_secs(),
        wait.interval.as_secs()
    );
    if conn_mgr.config.default_profile.as_deref() == Some(name) {
        println!("Default: yes");
    }
    Ok(())
}

fn handle_set(
    conn_mgr: &ConnectionManager,
    name: &str,
    mut profile: Profile,
    store_in_keyring: bool,
) -> CliResult<()> {
    debug!("Setting profile: {}", name);

    if store_in_keyring && let Some(password) = profile.password.take() {
        let store = CredentialStore::new();
        profile.password = Some(store.store_credential(&format!("{}-password", name), &password)?);
        debug!("Password stored via {} backend", store.storage_backend());
    }

    let mut config = conn_mgr.config.clone();
    let is_first = config.profiles.is_empty();
    config.set_profile(name.to_string(), profile);
    if is_first {
        config.default_profile = Some(name.to_string());
    }

    ConnectionManager::with_config_path(config, conn_mgr.config_path.clone()).save_config()?;

    println!("Profile '{}' saved successfully.", name);
    if is_first {
        println!("Set as default profile.");
    }
    Ok(())
}

fn handle_remove(conn_mgr: &ConnectionManager, name: &str) -> CliResult<()> {
    debug!("Removing profile: {}", name);

    let mut config = conn_mgr.config.clone();
    let removed = config
        .remove_profile(name)
        .ok_or_else(|| VimCtlError::ProfileNotFound {
            name: name.to_string(),
        })?;

    if let Some(password) = &removed.password
        && CredentialStore::is_keyring_reference(password)
    {
        CredentialStore::new().delete_credential(&format!("{}-password", name))?;
    }

    ConnectionManager::with_config_path(config, conn_mgr.config_path.clone()).save_config()?;
    println!("Profile '{}' removed successfully.", name);
    Ok(())
}

fn handle_default(conn_mgr: &ConnectionManager, name: &str) -> CliResult<()> {
    debug!("Setting default profile: {}", name);

    if !conn_mgr.config.profiles.contains_key(name) {
        return Err(VimCtlError::ProfileNotFound {
            name: name.to_string(),
        });
    }

    let mut config = conn_mgr.config.clone();
    config.default_profile = Some(name.to_string());
    ConnectionManager::with_config_path(config, conn_mgr.config_path.clone()).save_config()?;

    println!("Default profile set to '{}'.", name);
    Ok(())
}
