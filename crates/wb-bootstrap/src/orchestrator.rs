//! Bootstrap run sequencing
//!
//! resolve identity -> resolve mode -> locate proxy -> register ->
//! replace agent -> publish metadata. Every step blocks the next and the
//! first failure ends the run; nothing is retried or rolled back.

use std::sync::Arc;

use wb_core::config::{AgentSettings, BootstrapConfig, LabelSettings};
use wb_core::traits::{MetadataSource, MetadataWriter, Reporter, RunEvent, Supervisor, TokenIssuer};
use wb_core::{
    AgentConfig, ContainerHandle, MetadataPatch, ProxyRegistration, Result, VmIdentity,
};

use crate::identity::IdentityResolver;
use crate::lifecycle::AgentManager;
use crate::locator::ProxyLocator;
use crate::publisher::MetadataPublisher;
use crate::registration::Registrar;

/// Metadata key the console reads the routing hostname from
pub const PROXY_URL_KEY: &str = "proxy-url";

/// External capabilities a run depends on
#[derive(Clone)]
pub struct Collaborators {
    pub metadata: Arc<dyn MetadataSource>,
    pub tokens: Arc<dyn TokenIssuer>,
    pub supervisor: Arc<dyn Supervisor>,
    pub writer: Arc<dyn MetadataWriter>,
    pub reporter: Arc<dyn Reporter>,
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub identity: VmIdentity,
    pub proxy_url: String,
    pub registration: ProxyRegistration,
    pub agent: ContainerHandle,
}

/// A configured bootstrap run
pub struct Bootstrap {
    identity: IdentityResolver,
    locator: ProxyLocator,
    registrar: Registrar,
    agents: AgentManager,
    publisher: MetadataPublisher,
    agent_settings: AgentSettings,
    labels: LabelSettings,
    reporter: Arc<dyn Reporter>,
}

impl Bootstrap {
    pub fn new(config: &BootstrapConfig, client: reqwest::Client, parts: Collaborators) -> Self {
        Self {
            identity: IdentityResolver::new(parts.metadata, parts.reporter.clone()),
            locator: ProxyLocator::new(
                client.clone(),
                config.region_config_url.clone(),
                parts.reporter.clone(),
            ),
            registrar: Registrar::new(client, parts.tokens, parts.reporter.clone()),
            agents: AgentManager::new(parts.supervisor, &config.agent, parts.reporter.clone()),
            publisher: MetadataPublisher::new(
                parts.writer,
                config.publish_deadline(),
                parts.reporter.clone(),
            ),
            agent_settings: config.agent.clone(),
            labels: config.labels.clone(),
            reporter: parts.reporter,
        }
    }

    /// Execute every step once, in order
    pub async fn run(&self) -> Result<RunOutcome> {
        let identity = self.identity.resolve().await?;

        let mode = self.identity.proxy_mode().await?;
        let mail = self.identity.proxy_mail().await?;
        self.reporter.report(&RunEvent::ModeResolved {
            mode,
            mail: mail.clone(),
        });

        let override_url = self.identity.proxy_override_url().await?;
        let proxy_url = self
            .locator
            .locate(&identity.region, override_url.as_deref())
            .await?;

        // Registration hands back the backend id the new agent subscribes
        // with and the hostname the console will route through.
        let registration = self
            .registrar
            .register(&proxy_url, mode, mail.as_deref())
            .await?;

        let agent_config =
            AgentConfig::new(&registration, &proxy_url, &identity, &self.agent_settings);
        let agent = self.agents.replace(&agent_config).await?;

        let patch = self.metadata_patch(&registration);
        self.publisher
            .publish(&identity.instance_name, &identity.zone, &patch)
            .await?;

        Ok(RunOutcome {
            identity,
            proxy_url,
            registration,
            agent,
        })
    }

    /// `proxy-url` plus the descriptive labels the Workbench UI shows
    pub fn metadata_patch(&self, registration: &ProxyRegistration) -> MetadataPatch {
        let mut patch = MetadataPatch::new();
        patch
            .set(PROXY_URL_KEY, registration.hostname.clone())
            .set("title", self.labels.title.clone())
            .set("framework", self.labels.framework.clone())
            .set("version", self.labels.version.clone());
        patch
    }
}
