//! Evidence classification.
//!
//! A request is classified exactly once into the first applicable
//! [`Evidence`] variant, in priority order:
//! 1. an instance id (`evidence.instanceId`, `evidence.instance_id`, or the
//!    request's own `instance_id`)
//! 2. an access key (`evidence.requestParameters.accessKeyId` or the
//!    request's `accessKeyId`) together with an identity reference taken
//!    from the evidence only (`evidence.userIdentity.arn`)
//! 3. nothing actionable

use serde_json::Value;
use shared::constants::{
    ACCESS_KEY_FIELD, ARN_FIELD, INSTANCE_ID_FIELDS, REQUEST_PARAMETERS_FIELD, USER_IDENTITY_FIELD,
};
use shared::remediation::RemediationRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evidence {
    Instance { instance_id: String },
    Credential { access_key_id: String, user_name: String },
    Unrecognized,
}

fn non_empty(v: Option<&Value>) -> Option<&str> {
    v.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn owned_non_empty(v: Option<&String>) -> Option<&str> {
    v.map(String::as_str).filter(|s| !s.is_empty())
}

impl Evidence {
    pub fn classify(request: &RemediationRequest) -> Self {
        let evidence = &request.evidence;

        let instance_id = INSTANCE_ID_FIELDS
            .iter()
            .find_map(|field| non_empty(evidence.get(field)))
            .or_else(|| owned_non_empty(request.instance_id.as_ref()));
        if let Some(id) = instance_id {
            return Evidence::Instance { instance_id: id.to_owned() };
        }

        let access_key = non_empty(
            evidence
                .get(REQUEST_PARAMETERS_FIELD)
                .and_then(|params| params.get(ACCESS_KEY_FIELD)),
        )
        .or_else(|| owned_non_empty(request.access_key_id.as_ref()));
        let identity = non_empty(
            evidence
                .get(USER_IDENTITY_FIELD)
                .and_then(|identity| identity.get(ARN_FIELD)),
        );

        match (access_key, identity.and_then(account_name)) {
            (Some(key), Some(user)) => Evidence::Credential {
                access_key_id: key.to_owned(),
                user_name: user.to_owned(),
            },
            _ => Evidence::Unrecognized,
        }
    }
}

/// Short account name from an identity reference: the segment after the last
/// `/` of an ARN, otherwise the reference itself. An ARN ending in `/` names
/// no account.
pub fn account_name(identity: &str) -> Option<&str> {
    if !identity.contains(':') {
        return Some(identity);
    }
    identity.rsplit('/').next().filter(|name| !name.is_empty())
}
