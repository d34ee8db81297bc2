//! VM identity and operator configuration
//!
//! Reads the identity facts and the `proxy-*` attributes from the metadata
//! server. Identity facts are required: a missing one aborts the run before
//! anything is registered or started.

use std::sync::Arc;

use wb_core::traits::{MetadataSource, Reporter, RunEvent};
use wb_core::{BootstrapError, ProxyMode, Result, VmIdentity};

/// Metadata key of the numeric instance id
pub const INSTANCE_ID_KEY: &str = "instance/id";
/// Metadata key of the instance name
pub const INSTANCE_NAME_KEY: &str = "instance/name";
/// Metadata key of the fully-qualified zone
pub const INSTANCE_ZONE_KEY: &str = "instance/zone";
/// Metadata key of the project id
pub const PROJECT_ID_KEY: &str = "project/project-id";

/// Attribute selecting the registration mode
pub const PROXY_MODE_ATTR: &str = "proxy-mode";
/// Attribute holding the operator email for `mail` mode
pub const PROXY_USER_MAIL_ATTR: &str = "proxy-user-mail";
/// Attribute overriding the proxy base URL
pub const PROXY_REGISTRATION_URL_ATTR: &str = "proxy-registration-url";

/// Resolves who this VM is and how it should register
pub struct IdentityResolver {
    source: Arc<dyn MetadataSource>,
    reporter: Arc<dyn Reporter>,
}

impl IdentityResolver {
    pub fn new(source: Arc<dyn MetadataSource>, reporter: Arc<dyn Reporter>) -> Self {
        Self { source, reporter }
    }

    /// Snapshot the VM identity
    pub async fn resolve(&self) -> Result<VmIdentity> {
        let instance_id = self.required(INSTANCE_ID_KEY).await?;
        let instance_name = self.required(INSTANCE_NAME_KEY).await?;
        let zone = self.required(INSTANCE_ZONE_KEY).await?;
        let project_id = self.required(PROJECT_ID_KEY).await?;

        let identity = VmIdentity::new(instance_id, instance_name, &zone, project_id);
        if identity.zone.is_empty() {
            return Err(BootstrapError::MissingIdentity {
                key: INSTANCE_ZONE_KEY.to_string(),
            });
        }

        self.reporter.report(&RunEvent::IdentityResolved {
            identity: identity.clone(),
        });
        Ok(identity)
    }

    /// Registration mode: explicit `proxy-mode`, else `mail` when an email
    /// is configured, else `none`
    pub async fn proxy_mode(&self) -> Result<ProxyMode> {
        if let Some(mode) = self.source.attribute(PROXY_MODE_ATTR).await? {
            return mode.parse();
        }

        if self.source.attribute(PROXY_USER_MAIL_ATTR).await?.is_some() {
            return Ok(ProxyMode::Mail);
        }

        Ok(ProxyMode::None)
    }

    /// Operator email, if set and non-empty
    pub async fn proxy_mail(&self) -> Result<Option<String>> {
        Ok(self
            .source
            .attribute(PROXY_USER_MAIL_ATTR)
            .await?
            .map(|mail| mail.trim().to_string())
            .filter(|mail| !mail.is_empty()))
    }

    /// Operator override of the proxy base URL
    pub async fn proxy_override_url(&self) -> Result<Option<String>> {
        self.source.attribute(PROXY_REGISTRATION_URL_ATTR).await
    }

    async fn required(&self, key: &str) -> Result<String> {
        match self.source.get(key).await? {
            Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            _ => Err(BootstrapError::MissingIdentity {
                key: key.to_string(),
            }),
        }
    }
}
