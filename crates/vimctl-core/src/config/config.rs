//! Configuration management for vimctl
//!
//! Handles configuration loading from files and environment variables.
//! Configuration is stored in TOML format with support for multiple named profiles.

#[cfg(target_os = "macos")]
use directories::BaseDirs;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::credential::CredentialStore;
use super::error::{ConfigError, Result};
use crate::progress::WaitConfig;

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Profile used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Map of profile name -> profile configuration
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// Connection settings for one vCenter or ESXi endpoint
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Profile {
    /// Server URL, e.g. `https://vcenter.example.com`
    pub url: String,
    pub username: String,
    /// Optional; prompted for when missing. Supports keyring: prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Skip TLS certificate verification
    #[serde(default)]
    pub insecure: bool,
    /// Path to a PEM CA certificate to trust
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<String>,
    /// VI/JSON API release, e.g. `8.0.1.0`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    /// Upper bound on task waits, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_timeout_secs: Option<u64>,
    /// Polling interval for task waits, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_interval_secs: Option<u64>,
}

/// Profile with credentials resolved from env vars and the keyring
#[derive(Clone)]
pub struct ResolvedProfile {
    pub url: String,
    pub username: String,
    pub password: Option<String>,
    pub insecure: bool,
    pub ca_cert: Option<String>,
    pub release: Option<String>,
}

impl std::fmt::Debug for ResolvedProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedProfile")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("insecure", &self.insecure)
            .field("ca_cert", &self.ca_cert)
            .field("release", &self.release)
            .finish()
    }
}

impl Profile {
    pub fn new(url: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: None,
            insecure: false,
            ca_cert: None,
            release: None,
            task_timeout_secs: None,
            task_interval_secs: None,
        }
    }

    /// Check if this profile has a stored password
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Task wait bounds, falling back to the defaults for unset fields
    ///
    /// A poll interval below one second is raised to one second.
    pub fn wait_config(&self) -> WaitConfig {
        let defaults = WaitConfig::default();
        WaitConfig {
            timeout: self
                .task_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            interval: self
                .task_interval_secs
                .map(|secs| Duration::from_secs(secs.max(1)))
                .unwrap_or(defaults.interval),
        }
    }

    /// Get resolved credentials (with keyring support)
    pub fn resolve_credentials(&self) -> Result<ResolvedProfile> {
        let store = CredentialStore::new();

        // Resolve each credential with environment variable fallback
        let url = store
            .get_credential(&self.url, Some("VIMCTL_URL"))
            .map_err(|e| ConfigError::CredentialError(format!("Failed to resolve URL: {}", e)))?;
        let username = store
            .get_credential(&self.username, Some("VIMCTL_USERNAME"))
            .map_err(|e| {
                ConfigError::CredentialError(format!("Failed to resolve username: {}", e))
            })?;
        let password = self
            .password
            .as_ref()
            .map(|p| {
                store
                    .get_credential(p, Some("VIMCTL_PASSWORD"))
                    .map_err(|e| {
                        ConfigError::CredentialError(format!("Failed to resolve password: {}", e))
                    })
            })
            .transpose()?;

        Ok(ResolvedProfile {
            url,
            username,
            password,
            insecure: self.insecure,
            ca_cert: self.ca_cert.clone(),
            release: self.release.clone(),
        })
    }
}

impl Config {
    /// Resolve which profile to use
    ///
    /// Order: explicit name, then `default_profile`, then the first profile
    /// alphabetically.
    pub fn resolve_profile(&self, explicit_profile: Option<&str>) -> Result<String> {
        if let Some(name) = explicit_profile {
            if !self.profiles.contains_key(name) {
                return Err(ConfigError::ProfileNotFound {
                    name: name.to_string(),
                });
            }
            return Ok(name.to_string());
        }

        if let Some(ref default) = self.default_profile {
            return Ok(default.clone());
        }

        let mut names: Vec<_> = self.profiles.keys().collect();
        names.sort();
        names
            .first()
            .map(|name| name.to_string())
            .ok_or_else(|| ConfigError::NoProfiles {
                suggestion: "Use 'vimctl profile set' to create a profile, or pass --url and --username."
                    .to_string(),
            })
    }

    /// Look up a profile, resolving the name first
    pub fn get_profile(&self, explicit_profile: Option<&str>) -> Result<(String, &Profile)> {
        let name = self.resolve_profile(explicit_profile)?;
        let profile = self
            .profiles
            .get(&name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.clone() })?;
        Ok((name, profile))
    }

    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        // Expand environment variables in the config content
        let expanded_content = Self::expand_env_vars(&content);

        let config: Config = toml::from_str(&expanded_content)?;

        Ok(config)
    }

    /// Save configuration to the standard location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::SaveError {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        fs::write(config_path, content).map_err(|e| ConfigError::SaveError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        Ok(())
    }

    /// Set or update a profile
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Remove a profile by name
    pub fn remove_profile(&mut self, name: &str) -> Option<Profile> {
        if self.default_profile.as_deref() == Some(name) {
            self.default_profile = None;
        }
        self.profiles.remove(name)
    }

    /// List all profiles sorted by name
    pub fn list_profiles(&self) -> Vec<(&String, &Profile)> {
        let mut profiles: Vec<_> = self.profiles.iter().collect();
        profiles.sort_by_key(|(name, _)| *name);
        profiles
    }

    /// Get the path to the configuration file
    ///
    /// On macOS, this supports both the standard macOS path and Linux-style ~/.config path:
    /// 1. Check ~/.config/vimctl/config.toml (Linux-style, preferred for consistency)
    /// 2. Fall back to ~/Library/Application Support/com.vimctl.vimctl/config.toml
    ///
    /// On Linux: ~/.config/vimctl/config.toml
    /// On Windows: %APPDATA%\vimctl\vimctl\config\config.toml
    pub fn config_path() -> Result<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(base_dirs) = BaseDirs::new() {
                let linux_style_path = base_dirs
                    .home_dir()
                    .join(".config")
                    .join("vimctl")
                    .join("config.toml");

                if linux_style_path.exists()
                    || linux_style_path
                        .parent()
                        .map(|p| p.exists())
                        .unwrap_or(false)
                {
                    return Ok(linux_style_path);
                }
            }
        }

        let proj_dirs =
            ProjectDirs::from("com", "vimctl", "vimctl").ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Expand environment variables in configuration content
    ///
    /// Supports ${VAR} and ${VAR:-default} syntax, e.g.
    /// ```toml
    /// password = "${VCENTER_PASSWORD}"
    /// url = "${VCENTER_URL:-https://vcenter.lab.local}"
    /// ```
    fn expand_env_vars(content: &str) -> String {
        // Unset variables are left unexpanded so profiles that are not in use
        // do not need their variables defined
        let expanded =
            shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok());
        expanded.to_string()
    }
}
