//! Credentials for the registration request

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use wb_core::config::AccessTokenSource;
use wb_core::traits::{MetadataSource, TokenIssuer};
use wb_core::BootstrapError;

use super::command::run_command;
use super::metadata_server::MetadataServer;

/// Metadata key of the identity document endpoint
pub const IDENTITY_KEY: &str = "instance/service-accounts/default/identity";
/// Metadata key of the access token endpoint
pub const TOKEN_KEY: &str = "instance/service-accounts/default/token";

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

/// Issues the VM's identity document and access token
pub struct GceTokenIssuer {
    metadata: Arc<MetadataServer>,
    access_token_source: AccessTokenSource,
    gcloud_bin: String,
}

impl GceTokenIssuer {
    pub fn new(
        metadata: Arc<MetadataServer>,
        access_token_source: AccessTokenSource,
        gcloud_bin: impl Into<String>,
    ) -> Self {
        Self {
            metadata,
            access_token_source,
            gcloud_bin: gcloud_bin.into(),
        }
    }
}

#[async_trait]
impl TokenIssuer for GceTokenIssuer {
    async fn identity_token(&self, audience: &str) -> Result<String, BootstrapError> {
        self.metadata
            .get_with_query(IDENTITY_KEY, &[("format", "full"), ("audience", audience)])
            .await?
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                BootstrapError::Credentials(format!(
                    "no identity document for audience '{}'",
                    audience
                ))
            })
    }

    async fn access_token(&self) -> Result<String, BootstrapError> {
        let token = match self.access_token_source {
            AccessTokenSource::Gcloud => {
                run_command(&self.gcloud_bin, ["auth", "print-access-token"])
                    .await
                    .map_err(|e| BootstrapError::Credentials(e.to_string()))?
            }
            AccessTokenSource::Metadata => {
                let body = self.metadata.get(TOKEN_KEY).await?.ok_or_else(|| {
                    BootstrapError::Credentials("no access token on metadata server".to_string())
                })?;
                serde_json::from_str::<AccessTokenResponse>(&body)
                    .map_err(|e| {
                        BootstrapError::Credentials(format!("invalid token response: {}", e))
                    })?
                    .access_token
            }
        };

        if token.is_empty() {
            return Err(BootstrapError::Credentials(
                "empty access token".to_string(),
            ));
        }
        Ok(token)
    }
}
