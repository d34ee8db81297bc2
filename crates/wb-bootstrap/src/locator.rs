//! Proxy base URL discovery

use std::sync::Arc;

use serde::Deserialize;

use wb_core::traits::{ProxySource, Reporter, RunEvent};
use wb_core::{BootstrapError, Result};

/// Region config document published for every region
#[derive(Debug, Deserialize)]
struct RegionConfig {
    #[serde(rename = "agent-docker-containers")]
    agent_docker_containers: AgentContainers,
}

#[derive(Debug, Deserialize)]
struct AgentContainers {
    latest: AgentRelease,
}

#[derive(Debug, Deserialize)]
struct AgentRelease {
    #[serde(rename = "proxy-url")]
    proxy_url: String,
}

/// Extract `agent-docker-containers.latest.proxy-url` from a region config
/// document
pub fn parse_region_config(body: &[u8]) -> std::result::Result<String, serde_json::Error> {
    let config: RegionConfig = serde_json::from_slice(body)?;
    Ok(config.agent_docker_containers.latest.proxy_url)
}

/// Determines the base URL of the regional proxy
pub struct ProxyLocator {
    client: reqwest::Client,
    /// Region config URL template containing `{region}`
    region_config_url: String,
    reporter: Arc<dyn Reporter>,
}

impl ProxyLocator {
    pub fn new(
        client: reqwest::Client,
        region_config_url: impl Into<String>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            client,
            region_config_url: region_config_url.into(),
            reporter,
        }
    }

    /// Proxy base URL for `region`; an override is used verbatim and skips
    /// the region config fetch
    pub async fn locate(&self, region: &str, override_url: Option<&str>) -> Result<String> {
        if let Some(url) = override_url {
            self.reporter.report(&RunEvent::ProxyLocated {
                url: url.to_string(),
                source: ProxySource::Override,
            });
            return Ok(url.to_string());
        }

        let url = self.region_config_url.replace("{region}", region);
        tracing::debug!("Fetching proxy config for region '{}' from {}", region, url);

        let unavailable = |reason: String| BootstrapError::ProxyConfigUnavailable {
            url: url.clone(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| unavailable(e.to_string()))?;
        let body = response
            .bytes()
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        let proxy_url = parse_region_config(&body).map_err(|e| unavailable(e.to_string()))?;

        self.reporter.report(&RunEvent::ProxyLocated {
            url: proxy_url.clone(),
            source: ProxySource::RegionConfig,
        });
        Ok(proxy_url)
    }
}
