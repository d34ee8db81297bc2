//! In-memory collaborators for unit tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use wb_core::traits::{MetadataSource, MetadataWriter, Reporter, RunEvent, Supervisor, TokenIssuer};
use wb_core::{BootstrapError, ContainerHandle, MetadataPatch, RunSpec};

/// Metadata server backed by a map
#[derive(Default)]
pub struct FakeMetadata {
    values: HashMap<String, String>,
    pub reads: Mutex<Vec<String>>,
}

impl FakeMetadata {
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.with(&format!("instance/attributes/{}", name), value)
    }

    /// Identity of `vm1` in `us-central1-a`
    pub fn vm1() -> Self {
        Self::default()
            .with("instance/id", "123")
            .with("instance/name", "vm1")
            .with("instance/zone", "projects/42/zones/us-central1-a")
            .with("project/project-id", "proj")
    }
}

#[async_trait]
impl MetadataSource for FakeMetadata {
    async fn get(&self, key: &str) -> Result<Option<String>, BootstrapError> {
        self.reads.lock().unwrap().push(key.to_string());
        Ok(self.values.get(key).cloned())
    }
}

/// Token issuer returning fixed tokens and recording audiences
#[derive(Default)]
pub struct FakeTokens {
    pub audiences: Mutex<Vec<String>>,
}

#[async_trait]
impl TokenIssuer for FakeTokens {
    async fn identity_token(&self, audience: &str) -> Result<String, BootstrapError> {
        self.audiences.lock().unwrap().push(audience.to_string());
        Ok("identity-doc".to_string())
    }

    async fn access_token(&self) -> Result<String, BootstrapError> {
        Ok("access-token".to_string())
    }
}

/// Supervisor recording every call in order
#[derive(Default)]
pub struct RecordingSupervisor {
    existing: Option<ContainerHandle>,
    fail_stop: bool,
    fail_remove: bool,
    pub calls: Mutex<Vec<String>>,
    pub runs: Mutex<Vec<RunSpec>>,
}

impl RecordingSupervisor {
    pub fn with_existing(id: &str) -> Self {
        Self {
            existing: Some(ContainerHandle::new(id)),
            ..Self::default()
        }
    }

    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    pub fn failing_remove(mut self) -> Self {
        self.fail_remove = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Supervisor for RecordingSupervisor {
    async fn find(&self, name: &str) -> Result<Option<ContainerHandle>, BootstrapError> {
        self.calls.lock().unwrap().push(format!("find {}", name));
        Ok(self.existing.clone())
    }

    async fn stop(&self, handle: &ContainerHandle) -> Result<(), BootstrapError> {
        self.calls.lock().unwrap().push(format!("stop {}", handle));
        if self.fail_stop {
            return Err(BootstrapError::lifecycle(
                format!("docker stop {}", handle),
                "exit status 1",
            ));
        }
        Ok(())
    }

    async fn remove(&self, handle: &ContainerHandle) -> Result<(), BootstrapError> {
        self.calls.lock().unwrap().push(format!("remove {}", handle));
        if self.fail_remove {
            return Err(BootstrapError::lifecycle(
                format!("docker rm {}", handle),
                "exit status 1",
            ));
        }
        Ok(())
    }

    async fn run(&self, spec: &RunSpec) -> Result<ContainerHandle, BootstrapError> {
        self.calls.lock().unwrap().push(format!("run {}", spec.name));
        self.runs.lock().unwrap().push(spec.clone());
        Ok(ContainerHandle::new("new-container"))
    }
}

/// Metadata writer that merges patches into a map
#[derive(Default)]
pub struct FakeWriter {
    delay: Option<Duration>,
    failure: Option<String>,
    pub state: Mutex<HashMap<String, String>>,
    pub writes: Mutex<Vec<(String, String, String)>>,
}

impl FakeWriter {
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Writer whose every call fails with a credentials error
    pub fn rejecting(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl MetadataWriter for FakeWriter {
    async fn add_metadata(
        &self,
        instance: &str,
        zone: &str,
        patch: &MetadataPatch,
    ) -> Result<(), BootstrapError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = &self.failure {
            return Err(BootstrapError::Credentials(reason.clone()));
        }
        self.writes.lock().unwrap().push((
            instance.to_string(),
            zone.to_string(),
            patch.to_flag_value(),
        ));
        let mut state = self.state.lock().unwrap();
        for (key, value) in patch.entries() {
            state.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}

/// Reporter keeping every event
#[derive(Default)]
pub struct RecordingReporter {
    pub events: Mutex<Vec<RunEvent>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, event: &RunEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
