//! Test doubles shared by the integration suites.
#![allow(dead_code)]

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use flate2::{Compression, write::GzEncoder};
use serde_json::{Value, json};
use shared::remediation::RemediationRequest;
use std::io::Write;
use std::sync::Mutex;

use trailguard::cloud::{CapabilityError, ComputeControl, CredentialControl};
use trailguard::comms::dispatch::{DispatchError, Dispatcher};
use trailguard::store::{DetectionQuery, IndexStore, StoreError};

/// Build a subscription trigger payload around `messages`.
pub fn trigger_payload(messages: &[&str]) -> Value {
    let events: Vec<Value> = messages
        .iter()
        .enumerate()
        .map(|(i, m)| json!({ "id": i.to_string(), "timestamp": 1_700_000_000_000i64, "message": m }))
        .collect();
    let batch = json!({ "messageType": "DATA_MESSAGE", "logGroup": "trail", "logEvents": events });

    let mut gz = GzEncoder::new(Vec::new(), Compression::default());
    gz.write_all(batch.to_string().as_bytes()).unwrap();
    json!({ "awslogs": { "data": STANDARD.encode(gz.finish().unwrap()) } })
}

fn store_down() -> StoreError {
    StoreError::Status { status: 503, body: "unavailable".into() }
}

/// In-memory index store.
#[derive(Default)]
pub struct MemoryStore {
    pub docs:        Mutex<Vec<Value>>,
    /// Writes whose document contains this text are rejected.
    pub reject_when: Option<String>,
    pub hits:        Vec<Value>,
    pub search_down: bool,
    pub queries:     Mutex<Vec<Value>>,
}

impl MemoryStore {
    pub fn with_hits(hits: Vec<Value>) -> Self {
        Self { hits, ..Default::default() }
    }

    pub fn docs(&self) -> Vec<Value> {
        self.docs.lock().unwrap().clone()
    }
}

#[async_trait]
impl IndexStore for MemoryStore {
    async fn index_document(&self, doc: &Value) -> Result<(), StoreError> {
        if let Some(needle) = &self.reject_when {
            if doc.to_string().contains(needle.as_str()) {
                return Err(store_down());
            }
        }
        self.docs.lock().unwrap().push(doc.clone());
        Ok(())
    }

    async fn search(&self, query: &DetectionQuery) -> Result<Vec<Value>, StoreError> {
        self.queries.lock().unwrap().push(serde_json::to_value(query).unwrap());
        if self.search_down {
            return Err(store_down());
        }
        Ok(self.hits.iter().take(query.size()).cloned().collect())
    }
}

/// Dispatcher that keeps every request; optionally refuses one source.
#[derive(Default)]
pub struct RecordingDispatcher {
    pub sent:        Mutex<Vec<RemediationRequest>>,
    pub refuse_from: Option<String>,
}

impl RecordingDispatcher {
    pub fn sent(&self) -> Vec<RemediationRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Dispatcher for RecordingDispatcher {
    fn name(&self) -> &str {
        "recording"
    }

    async fn dispatch(&self, request: RemediationRequest) -> Result<(), DispatchError> {
        if self.refuse_from.as_deref() == Some(request.source_ip.as_str()) {
            return Err(DispatchError::QueueFull);
        }
        self.sent.lock().unwrap().push(request);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Stop(String),
    Deactivate { user: String, key: String },
}

/// Control plane that records calls and can be told to fail them all.
#[derive(Default)]
pub struct RecordingControlPlane {
    pub calls: Mutex<Vec<Call>>,
    pub fail:  bool,
}

impl RecordingControlPlane {
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn result(&self) -> Result<(), CapabilityError> {
        if self.fail {
            Err(CapabilityError::Status { status: 500, body: "boom".into() })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ComputeControl for RecordingControlPlane {
    async fn stop_instance(&self, instance_id: &str) -> Result<(), CapabilityError> {
        self.calls.lock().unwrap().push(Call::Stop(instance_id.into()));
        self.result()
    }
}

#[async_trait]
impl CredentialControl for RecordingControlPlane {
    async fn deactivate_access_key(
        &self,
        user_name: &str,
        access_key_id: &str,
    ) -> Result<(), CapabilityError> {
        self.calls.lock().unwrap().push(Call::Deactivate {
            user: user_name.into(),
            key:  access_key_id.into(),
        });
        self.result()
    }
}

/// A successful console login hit as returned by the store.
pub fn console_login(ip: &str, arn: &str) -> Value {
    json!({
        "eventName": "ConsoleLogin",
        "responseElements": { "ConsoleLogin": "Success" },
        "sourceIPAddress": ip,
        "userIdentity": { "arn": arn }
    })
}
