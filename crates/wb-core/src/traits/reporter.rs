//! Run reporting
//!
//! Components report progress through an injected [`Reporter`] instead of
//! logging globally, so each one can be exercised in isolation.

use std::fmt;

use crate::types::{ContainerHandle, ProxyMode, VmIdentity};

/// Where the proxy base URL came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxySource {
    /// `proxy-registration-url` attribute
    Override,
    /// Published region config document
    RegionConfig,
}

impl fmt::Display for ProxySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxySource::Override => write!(f, "metadata override"),
            ProxySource::RegionConfig => write!(f, "region config"),
        }
    }
}

/// Progress of a bootstrap run
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    IdentityResolved {
        identity: VmIdentity,
    },
    ModeResolved {
        mode: ProxyMode,
        mail: Option<String>,
    },
    ProxyLocated {
        url: String,
        source: ProxySource,
    },
    Registering {
        endpoint: String,
        mode: ProxyMode,
        mail: Option<String>,
    },
    Registered {
        backend_id: String,
        hostname: String,
    },
    AgentStopped {
        handle: ContainerHandle,
    },
    AgentRemoved {
        handle: ContainerHandle,
    },
    AgentStarted {
        handle: ContainerHandle,
        env: Vec<(String, String)>,
    },
    MetadataPublished {
        instance: String,
        zone: String,
        entries: String,
    },
}

/// Observer of run progress
pub trait Reporter: Send + Sync {
    fn report(&self, event: &RunEvent);
}

/// Reporter that forwards every event to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, event: &RunEvent) {
        match event {
            RunEvent::IdentityResolved { identity } => tracing::info!(
                instance_id = %identity.instance_id,
                instance = %identity.instance_name,
                zone = %identity.zone,
                region = %identity.region,
                project = %identity.project_id,
                "Resolved VM identity"
            ),
            RunEvent::ModeResolved { mode, mail } => tracing::info!(
                mode = %mode,
                mail = mail.as_deref().unwrap_or("-"),
                "Resolved proxy mode"
            ),
            RunEvent::ProxyLocated { url, source } => {
                tracing::info!(url = %url, source = %source, "Using proxy URL")
            }
            RunEvent::Registering {
                endpoint,
                mode,
                mail,
            } => match mail {
                Some(mail) => tracing::info!(
                    "Registering on proxy '{}' with mode '{}' and email '{}'",
                    endpoint,
                    mode,
                    mail
                ),
                None => tracing::info!("Registering on proxy '{}' with mode '{}'", endpoint, mode),
            },
            RunEvent::Registered {
                backend_id,
                hostname,
            } => tracing::info!(
                "Received backend ID '{}' and hostname '{}'",
                backend_id,
                hostname
            ),
            RunEvent::AgentStopped { handle } => {
                tracing::info!("Stopped existing agent container '{}'", handle)
            }
            RunEvent::AgentRemoved { handle } => {
                tracing::info!("Removed agent container '{}'", handle)
            }
            RunEvent::AgentStarted { handle, env } => {
                tracing::debug!("Agent environment: {:?}", env);
                tracing::info!("Agent container running under ID '{}'", handle)
            }
            RunEvent::MetadataPublished {
                instance,
                zone,
                entries,
            } => tracing::info!(
                "Set metadata '{}' on instance '{}' in zone '{}'",
                entries,
                instance,
                zone
            ),
        }
    }
}
