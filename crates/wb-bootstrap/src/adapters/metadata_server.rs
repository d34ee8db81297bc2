//! GCE metadata server client

use async_trait::async_trait;
use reqwest::StatusCode;

use wb_core::traits::MetadataSource;
use wb_core::BootstrapError;

/// Header required by the metadata server
pub const METADATA_FLAVOR_HEADER: &str = "Metadata-Flavor";

/// Reads values from `<base_url>/<key>`
pub struct MetadataServer {
    client: reqwest::Client,
    base_url: String,
}

impl MetadataServer {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch `key` with extra query parameters; 404 maps to `None`
    pub async fn get_with_query(
        &self,
        key: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<String>, BootstrapError> {
        let url = format!("{}/{}", self.base_url, key);
        let error = |reason: String| BootstrapError::Metadata {
            key: key.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .header(METADATA_FLAVOR_HEADER, "Google")
            .query(query)
            .send()
            .await
            .map_err(|e| error(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .text()
                .await
                .map(Some)
                .map_err(|e| error(e.to_string())),
            status => Err(error(format!("HTTP {}", status))),
        }
    }
}

#[async_trait]
impl MetadataSource for MetadataServer {
    async fn get(&self, key: &str) -> Result<Option<String>, BootstrapError> {
        self.get_with_query(key, &[]).await
    }
}
