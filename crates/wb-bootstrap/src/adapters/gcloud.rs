//! `gcloud` backed metadata writer

use async_trait::async_trait;

use wb_core::traits::MetadataWriter;
use wb_core::{BootstrapError, MetadataPatch};

use super::command::run_command;

/// Writes instance metadata with `gcloud compute instances add-metadata`
pub struct GcloudMetadataWriter {
    gcloud_bin: String,
}

impl GcloudMetadataWriter {
    pub fn new(gcloud_bin: impl Into<String>) -> Self {
        Self {
            gcloud_bin: gcloud_bin.into(),
        }
    }
}

/// Arguments of the `add-metadata` call
pub fn add_metadata_args(instance: &str, zone: &str, patch: &MetadataPatch) -> Vec<String> {
    vec![
        "compute".to_string(),
        "instances".to_string(),
        "add-metadata".to_string(),
        instance.to_string(),
        "--metadata".to_string(),
        patch.to_flag_value(),
        "--zone".to_string(),
        zone.to_string(),
    ]
}

#[async_trait]
impl MetadataWriter for GcloudMetadataWriter {
    async fn add_metadata(
        &self,
        instance: &str,
        zone: &str,
        patch: &MetadataPatch,
    ) -> Result<(), BootstrapError> {
        run_command(&self.gcloud_bin, &add_metadata_args(instance, zone, patch))
            .await
            .map(|_| ())
            .map_err(|e| BootstrapError::MetadataPublishFailure {
                instance: instance.to_string(),
                zone: zone.to_string(),
                reason: e.to_string(),
            })
    }
}
