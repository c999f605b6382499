//! Remediation messages passed from the detector to the responder.
//!
//! A [`RemediationRequest`] is a command: receiving one is the trigger for a
//! side-effecting action. The wire shape is
//! `{"action":"isolate","source_ip":..,"user":..|null,"evidence":{..}}`.
//! Requests built by hand may also carry `instance_id` or `accessKeyId`
//! directly instead of inside the evidence.
//!
//! A [`RemediationOutcome`] is terminal and never fed back into the pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// What the detector asks the responder to do.
///
/// The responder decides from the evidence alone, so an action name it does
/// not know is carried as [`ActionKind::Unknown`] rather than rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    #[default]
    Isolate,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationRequest {
    #[serde(default)]
    pub action: ActionKind,
    #[serde(default)]
    pub source_ip: String,
    /// Actor identity reference (an ARN for IAM principals).
    #[serde(default)]
    pub user: Option<String>,
    /// The full matched document.
    #[serde(default)]
    pub evidence: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(default, rename = "accessKeyId", skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
}

impl RemediationRequest {
    /// Build the request the detector emits for one suspicious match.
    pub fn isolate(source_ip: impl Into<String>, user: Option<String>, evidence: Value) -> Self {
        Self {
            action: ActionKind::Isolate,
            source_ip: source_ip.into(),
            user,
            evidence,
            instance_id: None,
            access_key_id: None,
        }
    }
}

/// Result of one responder invocation.
///
/// The shape describes what was *attempted*; whether the capability call
/// succeeded is only visible in the logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RemediationOutcome {
    InstanceStopped { instance_id: String },
    CredentialRevoked { access_key_id: String, user_name: String },
    NoAction,
}

impl RemediationOutcome {
    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            RemediationOutcome::InstanceStopped { .. } => "instance_stopped",
            RemediationOutcome::CredentialRevoked { .. } => "credential_revoked",
            RemediationOutcome::NoAction => "no_action",
        }
    }
}

impl fmt::Display for RemediationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemediationOutcome::InstanceStopped { instance_id } => {
                write!(f, "stopped instance {instance_id}")
            }
            RemediationOutcome::CredentialRevoked { access_key_id, user_name } => {
                write!(f, "revoked access key {access_key_id} for {user_name}")
            }
            RemediationOutcome::NoAction => write!(f, "no action"),
        }
    }
}
