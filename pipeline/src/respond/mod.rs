// src/respond/mod.rs

//! Responder: one remediation request in, at most one remediation action out.
//!
//! The decision is made by [`Evidence::classify`]; this module only maps each
//! variant to its capability call. A failed call is logged and reduced to
//! `false`, never raised, and the outcome still names what was attempted.
//! The responder keeps no memory between requests.

pub mod evidence;

use log::Level;
use metrics::counter;
use shared::remediation::{RemediationOutcome, RemediationRequest};
use std::sync::Arc;

use crate::cloud::{ComputeControl, CredentialControl};
use crate::pipeline_log;
use evidence::Evidence;

pub struct Responder {
    compute:     Arc<dyn ComputeControl>,
    credentials: Arc<dyn CredentialControl>,
}

impl Responder {
    pub fn new(compute: Arc<dyn ComputeControl>, credentials: Arc<dyn CredentialControl>) -> Self {
        Self { compute, credentials }
    }

    pub async fn handle(&self, request: &RemediationRequest) -> RemediationOutcome {
        pipeline_log!(
            Level::Info,
            "respond",
            "Playbook triggered: action={:?} source={} user={}",
            request.action,
            request.source_ip,
            request.user.as_deref().unwrap_or("-")
        );

        let outcome = match Evidence::classify(request) {
            Evidence::Instance { instance_id } => {
                self.stop_instance(&instance_id).await;
                RemediationOutcome::InstanceStopped { instance_id }
            }
            Evidence::Credential { access_key_id, user_name } => {
                self.revoke_access_key(&user_name, &access_key_id).await;
                RemediationOutcome::CredentialRevoked { access_key_id, user_name }
            }
            Evidence::Unrecognized => {
                pipeline_log!(Level::Info, "respond", "No actionable artifact in evidence");
                RemediationOutcome::NoAction
            }
        };

        counter!("responder_outcomes_total", "outcome" => outcome.label()).increment(1);
        outcome
    }

    async fn stop_instance(&self, instance_id: &str) -> bool {
        match self.compute.stop_instance(instance_id).await {
            Ok(()) => {
                pipeline_log!(Level::Info, "respond", "Stopped instance: {}", instance_id);
                true
            }
            Err(e) => {
                pipeline_log!(Level::Error, "respond", "Failed to stop instance {}: {}", instance_id, e);
                counter!("responder_capability_failures_total").increment(1);
                false
            }
        }
    }

    async fn revoke_access_key(&self, user_name: &str, access_key_id: &str) -> bool {
        match self.credentials.deactivate_access_key(user_name, access_key_id).await {
            Ok(()) => {
                pipeline_log!(
                    Level::Info,
                    "respond",
                    "Revoked access key {} for {}",
                    access_key_id,
                    user_name
                );
                true
            }
            Err(e) => {
                pipeline_log!(
                    Level::Error,
                    "respond",
                    "Failed to revoke access key {} for {}: {}",
                    access_key_id,
                    user_name,
                    e
                );
                counter!("responder_capability_failures_total").increment(1);
                false
            }
        }
    }
}
