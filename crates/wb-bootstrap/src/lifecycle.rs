//! Forwarding agent lifecycle
//!
//! The agent slot is identified by a reserved container name. A run always
//! discards the previous instance (stop, then remove) before starting a
//! new one; a failed stop aborts so two agents never race for the ports.

use std::sync::Arc;

use wb_core::config::AgentSettings;
use wb_core::traits::{Reporter, RunEvent, Supervisor};
use wb_core::{AgentConfig, ContainerHandle, Result, RunSpec};

/// Replaces the forwarding agent container
pub struct AgentManager {
    supervisor: Arc<dyn Supervisor>,
    container_name: String,
    image: String,
    reporter: Arc<dyn Reporter>,
}

impl AgentManager {
    pub fn new(
        supervisor: Arc<dyn Supervisor>,
        settings: &AgentSettings,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            supervisor,
            container_name: settings.container_name.clone(),
            image: settings.image.clone(),
            reporter,
        }
    }

    /// Build the run request for a fresh agent
    pub fn run_spec(&self, config: &AgentConfig) -> RunSpec {
        RunSpec {
            name: self.container_name.clone(),
            image: self.image.clone(),
            env: config.to_env(),
            restart_always: true,
            // The agent proxies to services bound on the VM itself
            host_network: true,
        }
    }

    /// Retire any existing agent and start a new one with `config`
    pub async fn replace(&self, config: &AgentConfig) -> Result<ContainerHandle> {
        if let Some(existing) = self.supervisor.find(&self.container_name).await? {
            self.supervisor.stop(&existing).await?;
            self.reporter.report(&RunEvent::AgentStopped {
                handle: existing.clone(),
            });

            self.supervisor.remove(&existing).await?;
            self.reporter
                .report(&RunEvent::AgentRemoved { handle: existing });
        }

        let spec = self.run_spec(config);
        let handle = self.supervisor.run(&spec).await?;
        self.reporter.report(&RunEvent::AgentStarted {
            handle: handle.clone(),
            env: spec.env,
        });
        Ok(handle)
    }
}
