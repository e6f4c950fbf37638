//! Unified error handling for vimctl-core
//!
//! Every failure of an entity creation lands in one [`CoreError`] variant.
//! Faults reported by the server are sorted into the name-validation kinds
//! and a catch-all remote fault.
//!
//! # Example
//!
//! ```rust
//! use vimctl_core::{CoreError, FaultKind, VimError};
//!
//! let fault = VimError::Fault {
//!     kind: FaultKind::DuplicateName,
//!     message: "myFolder".to_string(),
//! };
//! let err: CoreError = fault.into();
//! assert!(matches!(err, CoreError::DuplicateName(_)));
//! assert!(err.is_user_error());
//! ```

use std::time::Duration;
use thiserror::Error;

use crate::create::ItemType;
use crate::vim::{FaultKind, VimError};

/// Core error type for entity creation
#[derive(Error, Debug)]
pub enum CoreError {
    /// The parent folder name did not match any folder in the inventory
    #[error("Parent folder '{0}' not found")]
    ParentNotFound(String),

    /// The requested item type is not one of the accepted tags
    #[error("Unknown item type '{0}'. Allowed types are: {allowed}", allowed = ItemType::ACCEPTED.join(", "))]
    UnknownItemType(String),

    /// An entity with this name already exists under the parent
    #[error("Duplicate name: {0}")]
    DuplicateName(String),

    /// The server rejected the name
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Any other failure reported by, or on the way to, the server
    #[error("Remote fault: {0}")]
    RemoteFault(VimError),

    /// The server-side task ended in the error state
    #[error("Task failed: {0}")]
    TaskFailed(String),

    /// Task did not reach a terminal state in time
    #[error("Task timed out after {0:?}")]
    TaskTimeout(Duration),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl From<VimError> for CoreError {
    fn from(err: VimError) -> Self {
        match err {
            VimError::Fault {
                kind: FaultKind::DuplicateName,
                message,
            } => CoreError::DuplicateName(message),
            VimError::Fault {
                kind: FaultKind::InvalidName,
                message,
            } => CoreError::InvalidName(message),
            other => CoreError::RemoteFault(other),
        }
    }
}

impl From<crate::config::ConfigError> for CoreError {
    fn from(err: crate::config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

impl CoreError {
    /// Returns true if the caller can fix this by changing the input
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            CoreError::ParentNotFound(_)
                | CoreError::UnknownItemType(_)
                | CoreError::DuplicateName(_)
                | CoreError::InvalidName(_)
        )
    }

    /// Returns true if this is a timeout error
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            CoreError::TaskTimeout(_) => true,
            CoreError::RemoteFault(VimError::Request(e)) => e.is_timeout(),
            _ => false,
        }
    }

    /// Returns true if this is an authentication error
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        match self {
            CoreError::RemoteFault(e) => e.is_unauthorized(),
            _ => false,
        }
    }

    /// Returns true if the server was involved in the failure
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            CoreError::DuplicateName(_)
                | CoreError::InvalidName(_)
                | CoreError::RemoteFault(_)
                | CoreError::TaskFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_from_invalid_name_fault() {
        let err: CoreError = VimError::Fault {
            kind: FaultKind::InvalidName,
            message: "bad/name".to_string(),
        }
        .into();

        assert!(matches!(err, CoreError::InvalidName(ref m) if m == "bad/name"));
        assert!(err.is_user_error());
        assert!(err.is_remote());
    }

    #[test]
    fn test_other_faults_become_remote_fault() {
        for kind in [
            FaultKind::HostConnect,
            FaultKind::InvalidLogin,
            FaultKind::InvalidProperty,
            FaultKind::InvalidCollectorVersion,
        ] {
            let err: CoreError = VimError::Fault {
                kind,
                message: "boom".to_string(),
            }
            .into();
            assert!(matches!(err, CoreError::RemoteFault(_)));
            assert!(!err.is_user_error());
        }
    }

    #[test]
    fn test_invalid_login_is_unauthorized() {
        let err: CoreError = VimError::Fault {
            kind: FaultKind::InvalidLogin,
            message: "incorrect user name or password".to_string(),
        }
        .into();
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_parent_not_found_display() {
        let err = CoreError::ParentNotFound("NoSuchFolder".to_string());
        assert_eq!(err.to_string(), "Parent folder 'NoSuchFolder' not found");
        assert!(!err.is_remote());
    }

    #[test]
    fn test_unknown_item_type_lists_accepted_tags() {
        let msg = CoreError::UnknownItemType("VirtualMachine".to_string()).to_string();
        for tag in ["Host-Standalone", "Cluster", "Datacenter", "Folder"] {
            assert!(msg.contains(tag), "missing {tag} in: {msg}");
        }
    }

    #[test]
    fn test_task_timeout() {
        let err = CoreError::TaskTimeout(Duration::from_secs(600));
        assert!(err.is_timeout());
        assert!(err.to_string().contains("timed out"));
        assert!(!err.is_user_error());
    }
}
