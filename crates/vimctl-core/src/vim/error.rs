//! Errors reported by the VI/JSON client

use serde_json::Value;
use thiserror::Error;

/// Fault types the server can raise from the calls this client makes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaultKind {
    DuplicateName,
    InvalidName,
    InvalidProperty,
    HostConnect,
    InvalidLogin,
    NotAuthenticated,
    InvalidCollectorVersion,
    /// Any other `MethodFault` subtype, keeping its type name
    Other(String),
}

impl FaultKind {
    pub fn from_type_name(type_name: &str) -> Self {
        match type_name {
            "DuplicateName" => FaultKind::DuplicateName,
            "InvalidName" => FaultKind::InvalidName,
            "InvalidProperty" => FaultKind::InvalidProperty,
            "HostConnectFault" => FaultKind::HostConnect,
            "InvalidLogin" => FaultKind::InvalidLogin,
            "NotAuthenticated" => FaultKind::NotAuthenticated,
            "InvalidCollectorVersion" => FaultKind::InvalidCollectorVersion,
            other => FaultKind::Other(other.to_string()),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            FaultKind::DuplicateName => "DuplicateName",
            FaultKind::InvalidName => "InvalidName",
            FaultKind::InvalidProperty => "InvalidProperty",
            FaultKind::HostConnect => "HostConnectFault",
            FaultKind::InvalidLogin => "InvalidLogin",
            FaultKind::NotAuthenticated => "NotAuthenticated",
            FaultKind::InvalidCollectorVersion => "InvalidCollectorVersion",
            FaultKind::Other(name) => name,
        }
    }
}

/// Errors from talking to the vSphere endpoint
#[derive(Error, Debug)]
pub enum VimError {
    /// The server answered with a structured fault
    #[error("{}: {message}", kind.type_name())]
    Fault { kind: FaultKind, message: String },

    /// Non-success status with a body that is not a fault object
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid endpoint URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Login response did not carry a session token")]
    MissingSessionToken,

    #[error("No active session; call login first")]
    NotLoggedIn,
}

pub type Result<T> = std::result::Result<T, VimError>;

impl VimError {
    /// Build an error from a non-success response body
    pub fn from_response(status: u16, body: &str) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(body) else {
            return VimError::Http {
                status,
                body: body.to_string(),
            };
        };

        match value.get("_typeName").and_then(Value::as_str) {
            Some(type_name) => VimError::Fault {
                kind: FaultKind::from_type_name(type_name),
                message: fault_message(&value, type_name),
            },
            None => VimError::Http {
                status,
                body: body.to_string(),
            },
        }
    }

    /// The fault kind, if the server reported one
    pub fn fault_kind(&self) -> Option<&FaultKind> {
        match self {
            VimError::Fault { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// Returns true for login and session failures
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            VimError::Fault {
                kind: FaultKind::InvalidLogin | FaultKind::NotAuthenticated,
                ..
            } | VimError::Http { status: 401, .. }
                | VimError::NotLoggedIn
        )
    }

    /// Returns true when the server could not be reached at all
    pub fn is_connection(&self) -> bool {
        match self {
            VimError::Request(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}

/// Pull a readable message out of a VI/JSON fault object
///
/// Faults carry `faultMessage` as a list of localizable messages; some also
/// name the offending object in `name`.
fn fault_message(fault: &Value, type_name: &str) -> String {
    let messages: Vec<&str> = fault
        .get("faultMessage")
        .and_then(Value::as_array)
        .map(|msgs| {
            msgs.iter()
                .filter_map(|m| m.get("message").and_then(Value::as_str))
                .filter(|m| !m.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if !messages.is_empty() {
        return messages.join("; ");
    }

    match fault.get("name").and_then(Value::as_str) {
        Some(name) => format!("{} ({})", type_name, name),
        None => type_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name_fault() {
        let body = r#"{"_typeName":"DuplicateName","name":"myFolder","object":{"_typeName":"ManagedObjectReference","type":"Folder","value":"group-v3"}}"#;
        let err = VimError::from_response(500, body);

        assert_eq!(err.fault_kind(), Some(&FaultKind::DuplicateName));
        assert!(err.to_string().contains("myFolder"));
    }

    #[test]
    fn test_fault_message_from_localizable_messages() {
        let body = r#"{"_typeName":"InvalidLogin","faultMessage":[{"_typeName":"LocalizableMessage","key":"x","message":"Cannot complete login due to an incorrect user name or password."}]}"#;
        let err = VimError::from_response(500, body);

        assert!(err.is_unauthorized());
        assert!(err.to_string().contains("incorrect user name or password"));
    }

    #[test]
    fn test_unknown_fault_kind_keeps_type_name() {
        let err = VimError::from_response(500, r#"{"_typeName":"SSLVerifyFault"}"#);
        assert_eq!(
            err.fault_kind(),
            Some(&FaultKind::Other("SSLVerifyFault".to_string()))
        );
        assert_eq!(err.to_string(), "SSLVerifyFault: SSLVerifyFault");
    }

    #[test]
    fn test_non_json_body_is_http_error() {
        let err = VimError::from_response(503, "Service Unavailable");
        assert!(matches!(err, VimError::Http { status: 503, .. }));
        assert!(err.fault_kind().is_none());
    }
}
