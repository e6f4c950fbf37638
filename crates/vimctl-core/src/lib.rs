//! # vimctl-core
//!
//! Shared engine behind the `vimctl` CLI: a VI/JSON client for vSphere,
//! entity creation under an inventory folder, and bounded waiting on
//! server-side tasks.
//!
//! ## Layers
//!
//! - [`vim`] - session handling and the remote calls, behind the [`VimApi`] trait
//! - [`create`] - resolve a parent folder and create a folder, datacenter,
//!   cluster or standalone host under it
//! - [`progress`] - poll a task until it succeeds, fails or times out
//! - [`config`] - TOML profiles and credential resolution
//!
//! ## Example
//!
//! ```rust,ignore
//! use vimctl_core::{create_entity, CreationRequest, HostWait, ItemType, SessionCredentials, VimClient};
//!
//! let mut client = VimClient::builder("https://vcenter.example.com")
//!     .insecure(true)
//!     .connect()
//!     .await?;
//! client.login("administrator@vsphere.local", &password).await?;
//!
//! let request = CreationRequest::new("Datacenters", ItemType::Datacenter, "dc-east");
//! let credentials = SessionCredentials::new("administrator@vsphere.local", &password, client.port());
//! let outcome = create_entity(&client, &request, &credentials, HostWait::default()).await?;
//! println!("Successfully created::{}", outcome.item_name);
//!
//! client.logout().await?;
//! ```

pub mod config;
pub mod create;
pub mod error;
pub mod progress;
pub mod vim;

pub use config::{Config, ConfigError, Profile, ResolvedProfile};
pub use create::{
    CreationOutcome, CreationRequest, HostWait, ItemType, SessionCredentials, create_entity,
};
pub use error::{CoreError, Result};
pub use progress::{ProgressCallback, ProgressEvent, WaitConfig, wait_for_task, wait_for_task_info};
pub use vim::{FaultKind, ManagedObjectReference, TaskState, VimApi, VimClient, VimError};
