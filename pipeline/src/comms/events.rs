//! Event model shared by the ingest and detection stages.
//!
//! A [`LogRecord`] is one decoded line of an ingested batch. It is either a
//! structured audit document or, when the line does not parse as a JSON
//! object, a fallback wrapper holding the raw text under
//! [`RAW_MESSAGE_FIELD`]. Every line maps to exactly one record; nothing is
//! dropped on parse failure.
//!
//! A [`MatchedEvent`] is one search hit returned to the detector, with the
//! fields the allowlist and the responder care about pulled out of it.

use serde_json::{Map, Value};
use shared::constants::{ARN_FIELD, RAW_MESSAGE_FIELD, SOURCE_IP_FIELD, USER_IDENTITY_FIELD};

#[derive(Debug, Clone, PartialEq)]
pub enum LogRecord {
    Structured(Map<String, Value>),
    Fallback { raw: Option<String> },
}

impl LogRecord {
    /// Normalise one log message. A missing message is kept as a fallback
    /// record with a null payload.
    pub fn from_message(message: Option<&str>) -> Self {
        match message.map(serde_json::from_str::<Value>) {
            Some(Ok(Value::Object(doc))) => LogRecord::Structured(doc),
            _ => LogRecord::Fallback { raw: message.map(str::to_owned) },
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, LogRecord::Fallback { .. })
    }

    /// Document body as written to the index store.
    pub fn into_document(self) -> Value {
        match self {
            LogRecord::Structured(doc) => Value::Object(doc),
            LogRecord::Fallback { raw } => {
                let mut doc = Map::new();
                doc.insert(RAW_MESSAGE_FIELD.into(), raw.map_or(Value::Null, Value::String));
                Value::Object(doc)
            }
        }
    }
}

/// One search hit with its extracted evidence fields.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedEvent {
    pub source_ip: Option<String>,
    /// Identity reference of the actor (`userIdentity.arn`).
    pub user:      Option<String>,
    /// The full original document.
    pub evidence:  Value,
}

impl MatchedEvent {
    pub fn from_source(source: Value) -> Self {
        let source_ip = source
            .get(SOURCE_IP_FIELD)
            .and_then(Value::as_str)
            .filter(|ip| !ip.is_empty())
            .map(str::to_owned);
        let user = source
            .get(USER_IDENTITY_FIELD)
            .and_then(|identity| identity.get(ARN_FIELD))
            .and_then(Value::as_str)
            .map(str::to_owned);
        MatchedEvent { source_ip, user, evidence: source }
    }
}
