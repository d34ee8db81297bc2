//! Core error types for the proxy bootstrap
//!
//! Every variant is terminal: a run never retries and never rolls back, so
//! each error carries the step context needed to diagnose it from the log.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::ProxyMode;

/// Top-level error type for a bootstrap run
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// A required identity fact is absent from the metadata server
    #[error("Missing identity: metadata key '{key}' is not set")]
    MissingIdentity { key: String },

    /// Unparseable proxy mode, or `mail` mode without an email
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Region config document could not be fetched or lacks the proxy URL
    #[error("Proxy config unavailable from {url}: {reason}")]
    ProxyConfigUnavailable { url: String, reason: String },

    /// Registration reached with a mode that has no request shape
    #[error("Unsupported proxy-mode: {0}")]
    UnsupportedProxyMode(ProxyMode),

    /// Registration response lacks `backendID` or `hostname`
    #[error("Malformed registration response from {url}: {reason}")]
    MalformedRegistrationResponse { url: String, reason: String },

    /// A container supervisor operation failed
    #[error("Agent lifecycle failure during {operation}: {reason}")]
    AgentLifecycleFailure { operation: String, reason: String },

    /// Writing the instance metadata timed out or was rejected
    #[error("Failed to publish metadata on instance '{instance}' in zone '{zone}': {reason}")]
    MetadataPublishFailure {
        instance: String,
        zone: String,
        reason: String,
    },

    /// Metadata server unreachable or answered with an unexpected status
    #[error("Metadata server error for '{key}': {reason}")]
    Metadata { key: String, reason: String },

    /// Token issuer could not produce a credential
    #[error("Credential error: {0}")]
    Credentials(String),

    /// Transport error or non-success status from the registration endpoint
    #[error("Registration request to {url} failed: {reason}")]
    Registration { url: String, reason: String },

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl BootstrapError {
    /// Build an `AgentLifecycleFailure` for the given supervisor operation
    pub fn lifecycle(operation: impl Into<String>, reason: impl ToString) -> Self {
        Self::AgentLifecycleFailure {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
