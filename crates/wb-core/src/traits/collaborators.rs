//! Collaborator traits
//!
//! The bootstrap only sequences calls against these capabilities; the
//! concrete metadata server, token issuer, container supervisor and cloud
//! API live behind them.

use async_trait::async_trait;

use crate::error::BootstrapError;
use crate::types::{ContainerHandle, MetadataPatch, RunSpec};

/// Read-only key/value view of the instance metadata
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch a metadata value, `None` when the key is not set
    async fn get(&self, key: &str) -> Result<Option<String>, BootstrapError>;

    /// Fetch an operator-supplied instance attribute
    async fn attribute(&self, name: &str) -> Result<Option<String>, BootstrapError> {
        self.get(&format!("instance/attributes/{}", name)).await
    }
}

/// Issuer of short-lived credentials for the current VM
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Signed identity document bound to `audience`
    async fn identity_token(&self, audience: &str) -> Result<String, BootstrapError>;

    /// Bearer access token
    async fn access_token(&self) -> Result<String, BootstrapError>;
}

/// Supervisor of long-running named processes
#[async_trait]
pub trait Supervisor: Send + Sync {
    /// Find a process (running or stopped) carrying exactly `name`
    async fn find(&self, name: &str) -> Result<Option<ContainerHandle>, BootstrapError>;

    async fn stop(&self, handle: &ContainerHandle) -> Result<(), BootstrapError>;

    async fn remove(&self, handle: &ContainerHandle) -> Result<(), BootstrapError>;

    /// Start a new process and return its handle
    async fn run(&self, spec: &RunSpec) -> Result<ContainerHandle, BootstrapError>;
}

/// Remote writer of an instance's metadata
#[async_trait]
pub trait MetadataWriter: Send + Sync {
    /// Merge `patch` into the metadata of `instance` in `zone`.
    ///
    /// Callers bound this with a timeout by dropping the future, so any
    /// spawned work must be torn down on drop.
    async fn add_metadata(
        &self,
        instance: &str,
        zone: &str,
        patch: &MetadataPatch,
    ) -> Result<(), BootstrapError>;
}
