//! wb-core: Core abstractions and configuration for the Workbench proxy bootstrap
//!
//! This crate provides the shared domain types, the error taxonomy, the
//! file configuration and the traits behind which every external
//! collaborator (metadata server, token issuer, container supervisor,
//! cloud metadata writer, run reporter) is hidden.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{BootstrapError, ConfigError};
pub use types::{
    AgentConfig, ContainerHandle, MetadataPatch, ProxyMode, ProxyRegistration, RunSpec,
    VmIdentity,
};

/// Result alias used throughout the bootstrap
pub type Result<T, E = BootstrapError> = std::result::Result<T, E>;
