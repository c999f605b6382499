//! HTTP client for the control-plane gateway.
//!
//! stop:       `POST {endpoint}/instances/{id}/stop`
//! deactivate: `POST {endpoint}/users/{user}/access-keys/{key}` `{"status":"Inactive"}`
//!
//! The region travels in the `X-Region` header. Path segments are
//! percent-encoded, IAM user names may contain `+`, `=`, `@` and `,`.

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde_json::json;

use crate::cloud::{CapabilityError, ComputeControl, CredentialControl};
use crate::config::model::CloudConfig;

const REGION_HEADER: &str = "X-Region";

pub struct ControlPlaneClient {
    client: Client,
    base:   Url,
    region: String,
}

impl ControlPlaneClient {
    pub fn new(endpoint: &str, cfg: &CloudConfig) -> Result<Self, CapabilityError> {
        let base = Url::parse(endpoint)
            .ok()
            .filter(|u| !u.cannot_be_a_base())
            .ok_or_else(|| CapabilityError::InvalidEndpoint(endpoint.to_owned()))?;
        let client = Client::builder().timeout(cfg.timeout).build()?;
        Ok(Self { client, base, region: cfg.region.clone() })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn check(response: Response) -> Result<(), CapabilityError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable>".to_string());
        Err(CapabilityError::Status { status: status.as_u16(), body })
    }
}

#[async_trait]
impl ComputeControl for ControlPlaneClient {
    async fn stop_instance(&self, instance_id: &str) -> Result<(), CapabilityError> {
        let response = self
            .client
            .post(self.url(&["instances", instance_id, "stop"]))
            .header(REGION_HEADER, &self.region)
            .send()
            .await?;
        Self::check(response).await
    }
}

#[async_trait]
impl CredentialControl for ControlPlaneClient {
    async fn deactivate_access_key(
        &self,
        user_name: &str,
        access_key_id: &str,
    ) -> Result<(), CapabilityError> {
        let response = self
            .client
            .post(self.url(&["users", user_name, "access-keys", access_key_id]))
            .header(REGION_HEADER, &self.region)
            .json(&json!({ "status": "Inactive" }))
            .send()
            .await?;
        Self::check(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn cfg() -> CloudConfig {
        CloudConfig { region: "us-east-1".into(), endpoint: None, timeout: Duration::from_secs(1) }
    }

    #[test]
    fn segments_are_appended_and_escaped() {
        let client = ControlPlaneClient::new("http://gw.internal/api/", &cfg()).unwrap();
        assert_eq!(
            client.url(&["users", "ops+deploy@corp", "access-keys", "AKIA1"]).as_str(),
            "http://gw.internal/api/users/ops+deploy@corp/access-keys/AKIA1"
        );
        assert_eq!(
            client.url(&["instances", "i-1/../x", "stop"]).as_str(),
            "http://gw.internal/api/instances/i-1%2F..%2Fx/stop"
        );
    }

    #[test]
    fn unusable_endpoints_are_rejected() {
        assert!(matches!(
            ControlPlaneClient::new("not a url", &cfg()),
            Err(CapabilityError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            ControlPlaneClient::new("mailto:ops@corp", &cfg()),
            Err(CapabilityError::InvalidEndpoint(_))
        ));
    }
}
