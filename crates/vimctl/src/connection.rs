//! Connection management for vCenter and ESXi endpoints

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use tracing::{debug, info, trace};
use vimctl_core::{Config, ConfigError, SessionCredentials, VimClient, WaitConfig};

use crate::error::{Result as CliResult, VimCtlError};

/// User agent string for vimctl HTTP requests
const VIMCTL_USER_AGENT: &str = concat!("vimctl/", env!("CARGO_PKG_VERSION"));

/// Per-request HTTP timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection values given on the command line or through `VIMCTL_*`
#[derive(Debug, Default, Clone)]
pub struct ConnectionOverrides {
    pub profile: Option<String>,
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub insecure: bool,
}

/// Everything needed to open a session, after flags and profile are merged
#[derive(Clone)]
pub struct ConnectionTarget {
    pub url: String,
    pub username: String,
    pub password: Option<String>,
    pub insecure: bool,
    pub ca_cert: Option<String>,
    pub release: Option<String>,
    pub wait: WaitConfig,
}

/// A logged-in client plus what the creator needs from the login
pub struct Session {
    pub client: VimClient,
    pub credentials: SessionCredentials,
    pub wait: WaitConfig,
}

/// Connection manager for creating authenticated clients
#[derive(Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl ConnectionManager {
    /// Create a new connection manager with a custom config path
    pub fn with_config_path(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Save the configuration to the appropriate location
    pub fn save_config(&self) -> CliResult<()> {
        if let Some(ref path) = self.config_path {
            self.config
                .save_to_path(path)
                .context("Failed to save configuration")?;
        } else {
            self.config.save().context("Failed to save configuration")?;
        }
        Ok(())
    }

    /// Merge command-line overrides with the selected profile
    ///
    /// A profile is optional when `--url` is given. Flags win field by field.
    pub fn resolve_target(&self, overrides: &ConnectionOverrides) -> CliResult<ConnectionTarget> {
        let profile = match self.config.get_profile(overrides.profile.as_deref()) {
            Ok((name, profile)) => {
                debug!("Using profile '{}'", name);
                Some((profile.resolve_credentials()?, profile.wait_config()))
            }
            Err(ConfigError::NoProfiles { .. }) if overrides.url.is_some() => {
                debug!("No profiles configured, using command-line connection values");
                None
            }
            Err(e) => return Err(e.into()),
        };

        let target = match profile {
            Some((resolved, wait)) => ConnectionTarget {
                url: overrides.url.clone().unwrap_or(resolved.url),
                username: overrides.username.clone().unwrap_or(resolved.username),
                password: overrides.password.clone().or(resolved.password),
                insecure: overrides.insecure || resolved.insecure,
                ca_cert: resolved.ca_cert,
                release: resolved.release,
                wait,
            },
            None => ConnectionTarget {
                url: overrides.url.clone().unwrap_or_default(),
                username: overrides.username.clone().ok_or_else(|| {
                    VimCtlError::MissingCredentials {
                        field: "username".to_string(),
                    }
                })?,
                password: overrides.password.clone(),
                insecure: overrides.insecure,
                ca_cert: None,
                release: None,
                wait: WaitConfig::default(),
            },
        };

        trace!(
            "Resolved target url={} username={} insecure={}",
            target.url, target.username, target.insecure
        );
        Ok(target)
    }

    /// Connect, log in and capture the session credentials
    pub async fn open_session(&self, overrides: &ConnectionOverrides) -> CliResult<Session> {
        let target = self.resolve_target(overrides)?;
        let password = match target.password.clone() {
            Some(password) => password,
            None => prompt_password(&target)?,
        };

        let mut builder = VimClient::builder(target.url.clone())
            .insecure(target.insecure)
            .user_agent(VIMCTL_USER_AGENT)
            .timeout(REQUEST_TIMEOUT);
        if let Some(release) = &target.release {
            builder = builder.release(release.clone());
        }
        if let Some(path) = &target.ca_cert {
            let pem = std::fs::read(path).map_err(|e| VimCtlError::FileError {
                path: path.clone(),
                message: e.to_string(),
            })?;
            builder = builder.ca_cert_pem(pem);
        }

        if target.insecure {
            debug!("Certificate verification disabled for {}", target.url);
        }
        let mut client = builder.connect().await?;
        client.login(&target.username, &password).await?;
        info!("Logged in to {} as {}", target.url, target.username);

        let credentials = SessionCredentials::new(target.username, password, client.port());
        Ok(Session {
            client,
            credentials,
            wait: target.wait,
        })
    }
}

fn prompt_password(target: &ConnectionTarget) -> CliResult<String> {
    if !std::io::stdin().is_terminal() {
        return Err(VimCtlError::MissingCredentials {
            field: "password".to_string(),
        });
    }
    rpassword::prompt_password(format!("Password for {}: ", target.username)).map_err(|e| {
        VimCtlError::InvalidInput {
            message: format!("Failed to read password: {}", e),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vimctl_core::Profile;

    fn manager(profiles: &[(&str, Profile)], default: Option<&str>) -> ConnectionManager {
        let mut config = Config::default();
        for (name, profile) in profiles {
            config.set_profile(name.to_string(), profile.clone());
        }
        config.default_profile = default.map(String::from);
        ConnectionManager::with_config_path(config, None)
    }

    #[test]
    fn flags_alone_are_enough_without_profiles() {
        let mgr = manager(&[], None);
        let target = mgr
            .resolve_target(&ConnectionOverrides {
                url: Some("https://vcenter.lab.local".to_string()),
                username: Some("administrator@vsphere.local".to_string()),
                password: Some("pw".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(target.url, "https://vcenter.lab.local");
        assert_eq!(target.password.as_deref(), Some("pw"));
        assert_eq!(target.wait.timeout, Duration::from_secs(600));
    }

    #[test]
    fn url_without_username_is_rejected() {
        let mgr = manager(&[], None);
        let err = mgr
            .resolve_target(&ConnectionOverrides {
                url: Some("https://vcenter.lab.local".to_string()),
                ..Default::default()
            })
            .err()
            .unwrap();
        assert!(matches!(err, VimCtlError::MissingCredentials { ref field } if field == "username"));
    }

    #[test]
    fn no_profile_and_no_url_is_reported() {
        let mgr = manager(&[], None);
        let err = mgr
            .resolve_target(&ConnectionOverrides::default())
            .err()
            .unwrap();
        assert!(matches!(err, VimCtlError::NoProfileConfigured));
    }

    #[test]
    fn flags_override_profile_fields() {
        let mut profile = Profile::new("https://vc01.lab.local", "svc-vimctl");
        profile.ca_cert = Some("/etc/ssl/lab-ca.pem".to_string());
        profile.task_timeout_secs = Some(120);
        let mgr = manager(&[("lab", profile)], Some("lab"));

        let target = mgr
            .resolve_target(&ConnectionOverrides {
                username: Some("administrator@vsphere.local".to_string()),
                insecure: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(target.url, "https://vc01.lab.local");
        assert_eq!(target.username, "administrator@vsphere.local");
        assert!(target.insecure);
        assert_eq!(target.ca_cert.as_deref(), Some("/etc/ssl/lab-ca.pem"));
        assert_eq!(target.wait.timeout, Duration::from_secs(120));
    }

    #[test]
    fn explicit_missing_profile_is_an_error_even_with_url() {
        let mgr = manager(&[], None);
        let err = mgr
            .resolve_target(&ConnectionOverrides {
                profile: Some("prod".to_string()),
                url: Some("https://vcenter".to_string()),
                username: Some("admin".to_string()),
                ..Default::default()
            })
            .err()
            .unwrap();
        assert!(matches!(err, VimCtlError::ProfileNotFound { ref name } if name == "prod"));
    }
}
