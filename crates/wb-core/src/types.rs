//! Core domain types

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::config::AgentSettings;
use crate::error::BootstrapError;

/// Registration strategy requested from the proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyMode {
    /// Access restricted to a single operator email
    Mail,
    /// No registration shape; reaching the protocol with it is an error
    None,
    /// Access for every editor of the project
    ProjectEditors,
    /// Access for users of the VM's service account
    ServiceAccount,
    /// Access decided by custom IAM on the instance
    UseIam,
}

impl ProxyMode {
    /// All recognized modes
    pub const ALL: [ProxyMode; 5] = [
        ProxyMode::Mail,
        ProxyMode::None,
        ProxyMode::ProjectEditors,
        ProxyMode::ServiceAccount,
        ProxyMode::UseIam,
    ];

    /// Attribute value naming this mode
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyMode::Mail => "mail",
            ProxyMode::None => "none",
            ProxyMode::ProjectEditors => "project_editors",
            ProxyMode::ServiceAccount => "service_account",
            ProxyMode::UseIam => "use_iam",
        }
    }
}

impl fmt::Display for ProxyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProxyMode {
    type Err = BootstrapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        ProxyMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == value)
            .ok_or_else(|| {
                BootstrapError::InvalidConfiguration(format!(
                    "'{}' is not a valid proxy-mode (expected one of: mail, none, project_editors, service_account, use_iam)",
                    value
                ))
            })
    }
}

/// Snapshot of the VM's identity taken at the start of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmIdentity {
    /// Numeric instance id
    pub instance_id: String,
    /// Instance name
    pub instance_name: String,
    /// Short zone name (e.g., "us-central1-a")
    pub zone: String,
    /// Region derived from the zone (e.g., "us-central1")
    pub region: String,
    /// Project id
    pub project_id: String,
}

impl VmIdentity {
    /// Build an identity, normalizing the zone and deriving the region
    pub fn new(
        instance_id: impl Into<String>,
        instance_name: impl Into<String>,
        zone: &str,
        project_id: impl Into<String>,
    ) -> Self {
        let zone = short_zone(zone).to_string();
        Self {
            instance_id: instance_id.into(),
            instance_name: instance_name.into(),
            region: region_of(&zone).to_string(),
            zone,
            project_id: project_id.into(),
        }
    }
}

/// Keep only the final path segment of a zone
/// (e.g., "projects/123/zones/us-central1-a" -> "us-central1-a")
pub fn short_zone(zone: &str) -> &str {
    zone.rsplit('/').next().unwrap_or(zone)
}

/// Derive the region by stripping the last `-`-delimited token of a zone
pub fn region_of(zone: &str) -> &str {
    zone.rsplit_once('-').map(|(region, _)| region).unwrap_or(zone)
}

/// Result of a successful handshake with the proxy
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProxyRegistration {
    /// Opaque backend identifier assigned by the proxy
    #[serde(rename = "backendID")]
    pub backend_id: String,
    /// Public hostname the console routes through
    pub hostname: String,
}

/// Environment handed to the forwarding agent container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub backend_id: String,
    pub proxy_url: String,
    pub proxy_timeout: String,
    pub shim_websockets: bool,
    pub shim_path: String,
    pub port: u16,
    pub health_check_path: String,
    pub health_check_interval_seconds: u32,
    pub monitoring_project_id: String,
    pub monitoring_resource_labels: String,
    pub metric_domain: String,
    pub debug: bool,
}

impl AgentConfig {
    /// Build a fresh agent configuration for this run
    pub fn new(
        registration: &ProxyRegistration,
        proxy_url: &str,
        identity: &VmIdentity,
        settings: &AgentSettings,
    ) -> Self {
        Self {
            backend_id: registration.backend_id.clone(),
            proxy_url: proxy_url.to_string(),
            proxy_timeout: settings.proxy_timeout.clone(),
            shim_websockets: settings.shim_websockets,
            shim_path: settings.shim_path.clone(),
            port: settings.port,
            health_check_path: settings.health_check_path.clone(),
            health_check_interval_seconds: settings.health_check_interval_seconds,
            monitoring_project_id: identity.project_id.clone(),
            monitoring_resource_labels: format!(
                "instance-id={},instance-zone={}",
                identity.instance_id, identity.zone
            ),
            metric_domain: settings.metric_domain.clone(),
            debug: settings.debug,
        }
    }

    /// Render as ordered environment variables
    pub fn to_env(&self) -> Vec<(String, String)> {
        [
            ("BACKEND", self.backend_id.clone()),
            ("PROXY", self.proxy_url.clone()),
            ("PROXY_TIMEOUT", self.proxy_timeout.clone()),
            ("SHIM_WEBSOCKETS", self.shim_websockets.to_string()),
            ("SHIM_PATH", self.shim_path.clone()),
            ("PORT", self.port.to_string()),
            ("HEALTH_CHECK_PATH", self.health_check_path.clone()),
            (
                "HEALTH_CHECK_INTERVAL_SECONDS",
                self.health_check_interval_seconds.to_string(),
            ),
            ("MONITORING_PROJECT_ID", self.monitoring_project_id.clone()),
            (
                "MONITORING_RESOURCE_LABELS",
                self.monitoring_resource_labels.clone(),
            ),
            ("METRIC_DOMAIN", self.metric_domain.clone()),
            ("DEBUG", self.debug.to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}

/// Key/value pairs written onto the instance's metadata.
///
/// Insertion order is kept; setting an existing key replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataPatch {
    entries: Vec<(String, String)>,
}

impl MetadataPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key, replacing any previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Serialize as `key=value,key=value` for `gcloud --metadata`.
    ///
    /// When a key or value contains a comma the list switches to gcloud's
    /// `^DELIM^` form with the first delimiter that appears nowhere in the
    /// patch.
    pub fn to_flag_value(&self) -> String {
        let contains = |c: char| {
            self.entries
                .iter()
                .any(|(k, v)| k.contains(c) || v.contains(c))
        };
        if !contains(',') {
            return self.join(",");
        }
        match FLAG_DELIMITERS.into_iter().find(|d| !contains(*d)) {
            Some(delim) => format!("^{}^{}", delim, self.join(&delim.to_string())),
            // Every candidate is taken; fall back to the plain form
            None => self.join(","),
        }
    }

    fn join(&self, delim: &str) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(delim)
    }
}

/// Alternate list delimiters accepted by gcloud's `^DELIM^` escaping
const FLAG_DELIMITERS: [char; 6] = ['|', ';', '~', '#', '@', ':'];

/// Opaque handle to a supervised process (a container id for docker)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerHandle(pub String);

impl ContainerHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything the supervisor needs to start a named process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSpec {
    pub name: String,
    pub image: String,
    pub env: Vec<(String, String)>,
    /// Restart the process whenever it exits
    pub restart_always: bool,
    /// Share the host's network namespace
    pub host_network: bool,
}
