//! Control plane used when no gateway endpoint is configured: logs what it
//! would have done and reports success.

use async_trait::async_trait;
use log::Level;

use crate::cloud::{CapabilityError, ComputeControl, CredentialControl};
use crate::pipeline_log;

#[derive(Debug, Clone)]
pub struct DryRunControlPlane {
    region: String,
}

impl DryRunControlPlane {
    pub fn new(region: impl Into<String>) -> Self {
        Self { region: region.into() }
    }
}

#[async_trait]
impl ComputeControl for DryRunControlPlane {
    async fn stop_instance(&self, instance_id: &str) -> Result<(), CapabilityError> {
        pipeline_log!(Level::Warn, "cloud", "[dry-run][{}] would stop instance {}", self.region, instance_id);
        Ok(())
    }
}

#[async_trait]
impl CredentialControl for DryRunControlPlane {
    async fn deactivate_access_key(
        &self,
        user_name: &str,
        access_key_id: &str,
    ) -> Result<(), CapabilityError> {
        pipeline_log!(
            Level::Warn,
            "cloud",
            "[dry-run][{}] would deactivate access key {} for {}",
            self.region,
            access_key_id,
            user_name
        );
        Ok(())
    }
}
