//! Concrete collaborators for a GCE VM
//!
//! HTTP metadata server, `gcloud` for credentials and metadata writes, and
//! the `docker` CLI as container supervisor.

mod command;
mod docker;
mod gcloud;
mod metadata_server;
mod tokens;

pub use command::{run_command, CommandError};
pub use docker::DockerSupervisor;
pub use gcloud::GcloudMetadataWriter;
pub use metadata_server::MetadataServer;
pub use tokens::GceTokenIssuer;

use std::sync::Arc;

use wb_core::config::BootstrapConfig;
use wb_core::traits::Reporter;

use crate::orchestrator::Collaborators;

/// Wire the production collaborators for `config`
pub fn production(
    config: &BootstrapConfig,
    client: reqwest::Client,
    reporter: Arc<dyn Reporter>,
) -> Collaborators {
    let metadata = Arc::new(MetadataServer::new(client, config.metadata_url.clone()));

    Collaborators {
        metadata: metadata.clone(),
        tokens: Arc::new(GceTokenIssuer::new(
            metadata,
            config.access_token_source,
            config.gcloud_bin.clone(),
        )),
        supervisor: Arc::new(DockerSupervisor::new(config.docker_bin.clone())),
        writer: Arc::new(GcloudMetadataWriter::new(config.gcloud_bin.clone())),
        reporter,
    }
}
