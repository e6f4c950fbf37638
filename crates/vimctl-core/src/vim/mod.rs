//! vSphere Web Services access over the VI/JSON binding
//!
//! [`VimApi`] is the seam the entity creator and task waiter are written
//! against. [`VimClient`] implements it over HTTP; tests substitute a mock.

pub mod client;
pub mod error;
pub mod types;

use async_trait::async_trait;
use std::collections::HashMap;

pub use client::{DEFAULT_RELEASE, VimClient, VimClientBuilder};
pub use error::{FaultKind, Result, VimError};
pub use types::{
    AddHostRequest, ClusterConfigSpecEx, ComputeResourceConfigSpec, HostConnectSpec,
    LocalizedMethodFault, ManagedObjectReference, ServiceContent, SwapPlacement, TaskInfo,
    TaskState,
};

/// Remote operations used to place new entities in the inventory
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VimApi: Send + Sync {
    /// Root of the inventory tree
    fn root_folder(&self) -> ManagedObjectReference;

    /// Name-keyed view of every entity of `type_name` below `root`
    async fn in_folder_by_type(
        &self,
        root: &ManagedObjectReference,
        type_name: &str,
    ) -> Result<HashMap<String, ManagedObjectReference>>;

    async fn create_folder(
        &self,
        parent: &ManagedObjectReference,
        name: &str,
    ) -> Result<ManagedObjectReference>;

    async fn create_datacenter(
        &self,
        parent: &ManagedObjectReference,
        name: &str,
    ) -> Result<ManagedObjectReference>;

    async fn create_cluster(
        &self,
        parent: &ManagedObjectReference,
        name: &str,
        spec: &ClusterConfigSpecEx,
    ) -> Result<ManagedObjectReference>;

    /// Starts adding a standalone host; returns the task tracking it
    async fn add_standalone_host_task(
        &self,
        parent: &ManagedObjectReference,
        request: &AddHostRequest,
    ) -> Result<ManagedObjectReference>;

    async fn task_info(&self, task: &ManagedObjectReference) -> Result<TaskInfo>;
}
