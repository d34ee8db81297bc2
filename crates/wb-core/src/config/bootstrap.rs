//! Bootstrap configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default base URL of the GCE metadata server
pub const DEFAULT_METADATA_URL: &str = "http://metadata/computeMetadata/v1";

/// Published per-region proxy agent configuration; `{region}` is substituted
pub const DEFAULT_REGION_CONFIG_URL: &str = "https://storage.googleapis.com/dl-platform-public-configs/regionalized-configs/proxy-agent-config-{region}.json";

/// Configuration for a bootstrap run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Base URL of the metadata server (`.../computeMetadata/v1`)
    pub metadata_url: String,

    /// Template of the region config document URL
    pub region_config_url: String,

    /// Where the bearer access token comes from
    pub access_token_source: AccessTokenSource,

    /// `gcloud` executable
    pub gcloud_bin: String,

    /// `docker` executable
    pub docker_bin: String,

    /// Upper bound on the final metadata write, in seconds
    pub publish_timeout: u64,

    /// Forwarding agent container settings
    pub agent: AgentSettings,

    /// Descriptive labels published next to `proxy-url`
    pub labels: LabelSettings,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            metadata_url: DEFAULT_METADATA_URL.to_string(),
            region_config_url: DEFAULT_REGION_CONFIG_URL.to_string(),
            access_token_source: AccessTokenSource::default(),
            gcloud_bin: "gcloud".to_string(),
            docker_bin: "docker".to_string(),
            publish_timeout: 30,
            agent: AgentSettings::default(),
            labels: LabelSettings::default(),
        }
    }
}

impl BootstrapConfig {
    pub fn publish_deadline(&self) -> Duration {
        Duration::from_secs(self.publish_timeout)
    }
}

/// Source of the bearer access token sent to the proxy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessTokenSource {
    /// `gcloud auth print-access-token`
    #[default]
    Gcloud,
    /// `instance/service-accounts/default/token` on the metadata server
    Metadata,
}

/// Fixed settings of the forwarding agent container
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub image: String,
    /// Reserved container name; at most one instance carries it
    pub container_name: String,
    pub port: u16,
    pub health_check_path: String,
    pub health_check_interval_seconds: u32,
    pub proxy_timeout: String,
    pub shim_websockets: bool,
    pub shim_path: String,
    pub metric_domain: String,
    pub debug: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            image: "gcr.io/inverting-proxy/agent".to_string(),
            container_name: "proxy-agent".to_string(),
            port: 8080,
            health_check_path: "/".to_string(),
            health_check_interval_seconds: 30,
            proxy_timeout: "60s".to_string(),
            shim_websockets: false,
            shim_path: "websocket-shim".to_string(),
            metric_domain: "notebooks.googleapis.com".to_string(),
            debug: false,
        }
    }
}

/// Labels the Workbench UI shows for the image running on the VM
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSettings {
    pub title: String,
    pub framework: String,
    pub version: String,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            title: "OpenVSCode with Pyenv and Poetry".to_string(),
            framework: "OpenVSCode/Pyenv/Poetry".to_string(),
            version: "latest".to_string(),
        }
    }
}
