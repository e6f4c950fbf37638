//! Error types for vimctl
//!
//! Every failure that reaches `main` becomes a [`VimCtlError`], which knows how
//! to print itself as a cargo-style diagnostic with tips.

use colored::Colorize;
use thiserror::Error;
use vimctl_core::{ConfigError, CoreError, FaultKind, VimError};

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: Parent folder 'NoSuchFolder' not found
///
///   tip: check the folder name, matching is exact and case-sensitive
/// ```
pub struct CliDiagnostic {
    message: String,
    detail: Option<String>,
    tips: Vec<(String, Vec<String>)>,
}

impl CliDiagnostic {
    /// Start a new error diagnostic with the given message.
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            detail: None,
            tips: Vec::new(),
        }
    }

    /// Add a detail line below the error message.
    pub fn detail(mut self, text: &str) -> Self {
        self.detail = Some(text.to_string());
        self
    }

    /// Add a tip with optional example commands.
    pub fn tip(mut self, description: &str, commands: &[&str]) -> Self {
        self.tips.push((
            description.to_string(),
            commands.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        if let Some(detail) = &self.detail {
            eprintln!("  {}", detail);
        }

        for (description, commands) in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", description);
            for cmd in commands {
                eprintln!("      {}", cmd);
            }
        }
    }
}

/// Main error type for the vimctl application
#[derive(Error, Debug)]
pub enum VimCtlError {
    /// Creation or task failure, reported with the core message unchanged
    #[error(transparent)]
    Create(CoreError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("No profile configured and no --url given")]
    NoProfileConfigured,

    #[error("Missing {field}: pass --{field}, set VIMCTL_{env}, or save it in a profile", env = .field.to_uppercase())]
    MissingCredentials { field: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("File error for '{path}': {message}")]
    FileError { path: String, message: String },

    #[error("Output formatting error: {message}")]
    OutputError { message: String },

    #[error("Interrupted")]
    Interrupted,
}

/// Result type for vimctl operations
pub type Result<T> = std::result::Result<T, VimCtlError>;

impl VimCtlError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            VimCtlError::Create(CoreError::ParentNotFound(_)) => vec![
                "Check the folder name; matching is exact and case-sensitive".to_string(),
                "The parent must be a Folder, not a datacenter or cluster".to_string(),
            ],
            VimCtlError::Create(CoreError::UnknownItemType(_)) => vec![
                "Item types are case-sensitive: vimctl create --help".to_string(),
            ],
            VimCtlError::Create(CoreError::DuplicateName(_)) => vec![
                "Choose a different --itemname or a different --parentname".to_string(),
            ],
            VimCtlError::Create(CoreError::TaskTimeout(_)) => vec![
                "The task may still complete on the server; check the vSphere client".to_string(),
                "Raise the limit with --wait-timeout <secs>".to_string(),
            ],
            VimCtlError::Create(CoreError::TaskFailed(message))
                if message.contains("certificate") || message.contains("thumbprint") =>
            {
                vec!["The host's SSL thumbprint may need to be accepted in vCenter first".to_string()]
            }
            VimCtlError::ProfileNotFound { name } => vec![
                "List available profiles: vimctl profile list".to_string(),
                format!(
                    "Create profile '{}': vimctl profile set {} --url <url> --username <user>",
                    name, name
                ),
            ],
            VimCtlError::NoProfileConfigured => vec![
                "Create a profile: vimctl profile set <name> --url <url> --username <user>"
                    .to_string(),
                "Or pass --url and --username (or VIMCTL_URL and VIMCTL_USERNAME)".to_string(),
            ],
            VimCtlError::MissingCredentials { .. } => vec![
                "Check profile details: vimctl profile show <profile>".to_string(),
                "Verify environment variables are set correctly".to_string(),
            ],
            VimCtlError::AuthenticationFailed { .. } => vec![
                "Verify the user name and password".to_string(),
                "vCenter SSO users usually need a domain, e.g. administrator@vsphere.local"
                    .to_string(),
            ],
            VimCtlError::ConnectionError { message }
                if message.contains("certificate") || message.contains("SSL") =>
            {
                vec![
                    "Try with --insecure for self-signed certificates".to_string(),
                    "Or trust the server CA: vimctl profile set <name> --ca-cert <pem>".to_string(),
                ]
            }
            VimCtlError::ConnectionError { .. } => vec![
                "Check network connectivity".to_string(),
                "Verify the server URL is correct: vimctl profile show <profile>".to_string(),
            ],
            VimCtlError::FileError { path, .. } => vec![
                format!("Check that file exists: {}", path),
                "Verify file permissions are correct".to_string(),
            ],
            _ => vec![],
        }
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&format!("{}", self));

        if let VimCtlError::Create(CoreError::RemoteFault(VimError::Fault { kind, .. })) = self {
            diag = diag.detail(&format!("server fault: {}", kind.type_name()));
        }

        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion, &[]);
        }

        diag.print();
    }
}

impl From<VimError> for VimCtlError {
    fn from(err: VimError) -> Self {
        match err {
            VimError::Fault {
                kind: FaultKind::InvalidLogin | FaultKind::NotAuthenticated,
                message,
            } => VimCtlError::AuthenticationFailed { message },
            VimError::MissingSessionToken => VimCtlError::AuthenticationFailed {
                message: err.to_string(),
            },
            VimError::InvalidUrl { .. } => VimCtlError::InvalidInput {
                message: err.to_string(),
            },
            ref e if e.is_connection() => VimCtlError::ConnectionError {
                message: connection_message(e),
            },
            other => VimCtlError::Create(CoreError::from(other)),
        }
    }
}

impl From<CoreError> for VimCtlError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::RemoteFault(vim) if vim.is_unauthorized() || vim.is_connection() => {
                VimCtlError::from(vim)
            }
            CoreError::Config(message) => VimCtlError::Configuration(message),
            other => VimCtlError::Create(other),
        }
    }
}

impl From<ConfigError> for VimCtlError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name } => VimCtlError::ProfileNotFound { name },
            ConfigError::NoProfiles { .. } => VimCtlError::NoProfileConfigured,
            other => VimCtlError::Configuration(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for VimCtlError {
    fn from(err: serde_json::Error) -> Self {
        VimCtlError::OutputError {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<serde_yaml::Error> for VimCtlError {
    fn from(err: serde_yaml::Error) -> Self {
        VimCtlError::OutputError {
            message: format!("YAML error: {}", err),
        }
    }
}

impl From<std::io::Error> for VimCtlError {
    fn from(err: std::io::Error) -> Self {
        VimCtlError::OutputError {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<anyhow::Error> for VimCtlError {
    fn from(err: anyhow::Error) -> Self {
        VimCtlError::Configuration(format!("{:#}", err))
    }
}

/// reqwest hides the interesting part of a connect failure in its source chain
fn connection_message(err: &VimError) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = std::error::Error::source(inner);
    }
    message
}
