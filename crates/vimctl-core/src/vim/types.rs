//! Wire types for the VI/JSON binding of the vSphere Web Services API
//!
//! Only the handful of data objects needed for inventory lookup, entity
//! creation and task polling are modelled. Every data object on the wire
//! carries a `_typeName` discriminator; request types emit it on
//! serialization, response types ignore it.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Opaque, server-issued handle identifying a managed object
///
/// Received from the server and passed back to it; the client never
/// fabricates one from user input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct ManagedObjectReference {
    /// Managed object type, e.g. `Folder`, `Datacenter`, `Task`
    #[serde(rename = "type")]
    pub kind: String,
    /// Server-side identifier, e.g. `group-d1`
    pub value: String,
}

impl ManagedObjectReference {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

impl Serialize for ManagedObjectReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ManagedObjectReference", 3)?;
        state.serialize_field("_typeName", "ManagedObjectReference")?;
        state.serialize_field("type", &self.kind)?;
        state.serialize_field("value", &self.value)?;
        state.end()
    }
}

impl fmt::Display for ManagedObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

/// Subset of `ServiceInstance.content` used by the client
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceContent {
    pub root_folder: ManagedObjectReference,
    pub session_manager: ManagedObjectReference,
    pub view_manager: ManagedObjectReference,
    #[serde(default)]
    pub about: Option<AboutInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutInfo {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub api_version: Option<String>,
}

/// Lifecycle state of a server-side task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Queued,
    Running,
    Success,
    Error,
}

impl TaskState {
    /// `Success` and `Error` end the task; nothing follows them
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Success | TaskState::Error)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Queued => "queued",
            TaskState::Running => "running",
            TaskState::Success => "success",
            TaskState::Error => "error",
        };
        f.write_str(s)
    }
}

/// Fault payload attached to a failed task
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedMethodFault {
    #[serde(default)]
    pub localized_message: Option<String>,
    #[serde(default)]
    pub fault: Option<serde_json::Value>,
}

impl LocalizedMethodFault {
    /// Human-readable description, falling back to the fault's type name
    pub fn message(&self) -> String {
        if let Some(msg) = self.localized_message.as_deref()
            && !msg.is_empty()
        {
            return msg.to_string();
        }
        self.fault
            .as_ref()
            .and_then(|f| f.get("_typeName"))
            .and_then(|t| t.as_str())
            .map(|t| format!("Task failed with fault {}", t))
            .unwrap_or_else(|| "Task failed without a fault description".to_string())
    }
}

/// `Task.info` as returned by the server
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    #[serde(default)]
    pub key: Option<String>,
    pub state: TaskState,
    #[serde(default)]
    pub error: Option<LocalizedMethodFault>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub progress: Option<i32>,
}

impl TaskInfo {
    /// The task result as a managed object reference, if it is one
    pub fn result_reference(&self) -> Option<ManagedObjectReference> {
        self.result
            .as_ref()
            .and_then(|r| serde_json::from_value(r.clone()).ok())
    }
}

/// Empty cluster configuration for `CreateClusterEx`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterConfigSpecEx;

impl Serialize for ClusterConfigSpecEx {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ClusterConfigSpecEx", 1)?;
        state.serialize_field("_typeName", "ClusterConfigSpecEx")?;
        state.end()
    }
}

/// Connection parameters the server uses to reach a new host
#[derive(Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConnectSpec {
    #[serde(rename = "_typeName")]
    type_name: &'static str,
    pub host_name: String,
    pub port: u16,
    pub user_name: String,
    pub password: String,
    pub force: bool,
}

impl HostConnectSpec {
    pub fn new(host_name: &str, user_name: &str, password: &str, port: u16) -> Self {
        Self {
            type_name: "HostConnectSpec",
            host_name: host_name.to_string(),
            port,
            user_name: user_name.to_string(),
            password: password.to_string(),
            force: false,
        }
    }
}

impl fmt::Debug for HostConnectSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostConnectSpec")
            .field("host_name", &self.host_name)
            .field("port", &self.port)
            .field("user_name", &self.user_name)
            .field("password", &"<redacted>")
            .field("force", &self.force)
            .finish()
    }
}

/// Swap file placement for VMs on a compute resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SwapPlacement {
    VmDirectory,
    HostLocal,
    Inherit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeResourceConfigSpec {
    #[serde(rename = "_typeName")]
    type_name: &'static str,
    pub vm_swap_placement: SwapPlacement,
}

impl ComputeResourceConfigSpec {
    pub fn with_swap_placement(vm_swap_placement: SwapPlacement) -> Self {
        Self {
            type_name: "ComputeResourceConfigSpec",
            vm_swap_placement,
        }
    }
}

/// Body of `Folder.AddStandaloneHost_Task`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddHostRequest {
    pub spec: HostConnectSpec,
    pub comp_res_spec: ComputeResourceConfigSpec,
    pub add_connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}
