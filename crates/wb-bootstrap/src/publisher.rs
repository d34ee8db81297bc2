//! Publishing the routing hostname on the instance metadata

use std::sync::Arc;
use std::time::Duration;

use wb_core::traits::{MetadataWriter, Reporter, RunEvent};
use wb_core::{BootstrapError, MetadataPatch, Result};

/// Writes a metadata patch onto the instance within a fixed timeout
pub struct MetadataPublisher {
    writer: Arc<dyn MetadataWriter>,
    timeout: Duration,
    reporter: Arc<dyn Reporter>,
}

impl MetadataPublisher {
    pub fn new(
        writer: Arc<dyn MetadataWriter>,
        timeout: Duration,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            writer,
            timeout,
            reporter,
        }
    }

    pub async fn publish(&self, instance: &str, zone: &str, patch: &MetadataPatch) -> Result<()> {
        let entries = patch.to_flag_value();
        tracing::debug!(
            "Setting metadata {} on instance '{}' in zone '{}'",
            entries,
            instance,
            zone
        );

        let failure = |reason: String| BootstrapError::MetadataPublishFailure {
            instance: instance.to_string(),
            zone: zone.to_string(),
            reason,
        };

        match tokio::time::timeout(self.timeout, self.writer.add_metadata(instance, zone, patch))
            .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e @ BootstrapError::MetadataPublishFailure { .. })) => return Err(e),
            Ok(Err(e)) => return Err(failure(e.to_string())),
            Err(_) => {
                return Err(failure(format!(
                    "timed out after {}s",
                    self.timeout.as_secs()
                )))
            }
        }

        self.reporter.report(&RunEvent::MetadataPublished {
            instance: instance.to_string(),
            zone: zone.to_string(),
            entries,
        });
        Ok(())
    }
}
