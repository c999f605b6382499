//! Remediation capabilities offered by the cloud control plane.
//!
//! Both capabilities are assumed idempotent downstream: stopping a stopped
//! instance or deactivating an inactive key is a no-op, so duplicate alerts
//! are harmless.

pub mod dry_run;
pub mod gateway;

use async_trait::async_trait;
use thiserror::Error;

pub use dry_run::DryRunControlPlane;
pub use gateway::ControlPlaneClient;

#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("invalid control-plane endpoint '{0}'")]
    InvalidEndpoint(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("control plane returned {status}: {body}")]
    Status { status: u16, body: String },
}

#[async_trait]
pub trait ComputeControl: Send + Sync {
    async fn stop_instance(&self, instance_id: &str) -> Result<(), CapabilityError>;
}

#[async_trait]
pub trait CredentialControl: Send + Sync {
    /// Set the access key's status to inactive.
    async fn deactivate_access_key(
        &self,
        user_name: &str,
        access_key_id: &str,
    ) -> Result<(), CapabilityError>;
}
