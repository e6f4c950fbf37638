//! Entity creation under an inventory folder
//!
//! Resolves the parent folder by name, then issues exactly one of four
//! creation calls depending on the requested [`ItemType`]. Adding a standalone
//! host is asynchronous on the server and is followed by a task wait.

use serde::Serialize;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::error::{CoreError, Result};
use crate::progress::{ProgressCallback, WaitConfig, wait_for_task_info};
use crate::vim::{
    AddHostRequest, ClusterConfigSpecEx, ComputeResourceConfigSpec, HostConnectSpec,
    ManagedObjectReference, SwapPlacement, TaskState, VimApi,
};

/// Inventory type searched when resolving the parent
const PARENT_TYPE: &str = "Folder";

/// Kind of entity to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemType {
    Folder,
    Datacenter,
    Cluster,
    HostStandalone,
    /// Any tag that is not one of [`ItemType::ACCEPTED`]
    Unknown(String),
}

impl ItemType {
    /// Textual tags accepted on input
    pub const ACCEPTED: [&'static str; 4] = ["Host-Standalone", "Cluster", "Datacenter", "Folder"];

    pub fn as_str(&self) -> &str {
        match self {
            ItemType::Folder => "Folder",
            ItemType::Datacenter => "Datacenter",
            ItemType::Cluster => "Cluster",
            ItemType::HostStandalone => "Host-Standalone",
            ItemType::Unknown(tag) => tag,
        }
    }
}

impl FromStr for ItemType {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "Folder" => ItemType::Folder,
            "Datacenter" => ItemType::Datacenter,
            "Cluster" => ItemType::Cluster,
            "Host-Standalone" => ItemType::HostStandalone,
            other => ItemType::Unknown(other.to_string()),
        })
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ItemType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// What to create and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationRequest {
    pub parent_name: String,
    pub item_type: ItemType,
    pub item_name: String,
    /// Only used for standalone hosts
    pub license_key: Option<String>,
}

impl CreationRequest {
    pub fn new(
        parent_name: impl Into<String>,
        item_type: ItemType,
        item_name: impl Into<String>,
    ) -> Self {
        Self {
            parent_name: parent_name.into(),
            item_type,
            item_name: item_name.into(),
            license_key: None,
        }
    }

    pub fn with_license_key(mut self, license_key: Option<String>) -> Self {
        self.license_key = license_key;
        self
    }
}

/// Credentials handed to the server so it can connect to a new host
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredentials {
    pub username: String,
    pub password: String,
    pub port: u16,
}

impl SessionCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>, port: u16) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            port,
        }
    }
}

impl fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .finish()
    }
}

/// Result of a successful creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreationOutcome {
    pub item_name: String,
    pub item_type: ItemType,
    pub parent: ManagedObjectReference,
    /// The new entity, when the server reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<ManagedObjectReference>,
}

/// Options for the host-addition task wait
#[derive(Default)]
pub struct HostWait {
    pub config: WaitConfig,
    pub on_progress: Option<ProgressCallback>,
}

impl HostWait {
    pub fn new(config: WaitConfig) -> Self {
        Self {
            config,
            on_progress: None,
        }
    }

    pub fn with_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.on_progress = Some(on_progress);
        self
    }
}

/// Create the requested entity under its parent folder
///
/// Issues at most one creation call. Nothing is sent to the server beyond the
/// folder lookup when the parent is missing or the item type is unknown.
pub async fn create_entity<A>(
    api: &A,
    request: &CreationRequest,
    credentials: &SessionCredentials,
    wait: HostWait,
) -> Result<CreationOutcome>
where
    A: VimApi + ?Sized,
{
    let root = api.root_folder();
    let folders = api.in_folder_by_type(&root, PARENT_TYPE).await?;
    let parent = folders
        .get(&request.parent_name)
        .cloned()
        .ok_or_else(|| CoreError::ParentNotFound(request.parent_name.clone()))?;
    debug!("Resolved parent '{}' to {}", request.parent_name, parent);

    let name = request.item_name.as_str();
    let reference = match &request.item_type {
        ItemType::Folder => Some(api.create_folder(&parent, name).await?),
        ItemType::Datacenter => Some(api.create_datacenter(&parent, name).await?),
        ItemType::Cluster => Some(
            api.create_cluster(&parent, name, &ClusterConfigSpecEx)
                .await?,
        ),
        ItemType::HostStandalone => {
            add_standalone_host(api, &parent, request, credentials, wait).await?
        }
        ItemType::Unknown(tag) => {
            warn!(
                "Unknown item type '{}'; allowed types are {}",
                tag,
                ItemType::ACCEPTED.join(", ")
            );
            return Err(CoreError::UnknownItemType(tag.clone()));
        }
    };

    info!("Created {} '{}' under '{}'", request.item_type, name, request.parent_name);
    Ok(CreationOutcome {
        item_name: request.item_name.clone(),
        item_type: request.item_type.clone(),
        parent,
        reference,
    })
}

async fn add_standalone_host<A>(
    api: &A,
    parent: &ManagedObjectReference,
    request: &CreationRequest,
    credentials: &SessionCredentials,
    wait: HostWait,
) -> Result<Option<ManagedObjectReference>>
where
    A: VimApi + ?Sized,
{
    let add = AddHostRequest {
        spec: HostConnectSpec::new(
            &request.item_name,
            &credentials.username,
            &credentials.password,
            credentials.port,
        ),
        comp_res_spec: ComputeResourceConfigSpec::with_swap_placement(SwapPlacement::VmDirectory),
        add_connected: true,
        license: request.license_key.clone(),
    };

    let task = api.add_standalone_host_task(parent, &add).await?;
    debug!("Host addition running as {}", task);

    let info = wait_for_task_info(api, &task, wait.config, wait.on_progress).await?;
    if info.state != TaskState::Success {
        return Err(CoreError::TaskFailed(format!(
            "Host '{}' not created",
            request.item_name
        )));
    }

    // The task result names the new compute resource
    let reference = info.result_reference();
    if reference.is_none() {
        debug!("Task {} succeeded without a result reference", task);
    }
    Ok(reference)
}
