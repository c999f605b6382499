// src/ingest/decode.rs

//! # Batch Decoding
//!
//! Undoes the subscription envelope: base64 → gzip → JSON batch.
//! Any failure here rejects the whole batch; a corrupt envelope cannot be
//! split into salvageable records.

use base64::{Engine, engine::general_purpose::STANDARD};
use flate2::read::MultiGzDecoder;
use serde::Deserialize;
use serde_json::Value;
use std::io::Read;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("gzip decompress failed: {0}")]
    Gzip(#[source] std::io::Error),

    #[error("batch is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decoded subscription batch. Only the provenance and the events are kept;
/// other envelope fields are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogBatch {
    #[serde(default)]
    pub log_group:  Option<String>,
    #[serde(default)]
    pub log_stream: Option<String>,
    #[serde(default)]
    pub log_events: Vec<LogEvent>,
}

impl LogBatch {
    /// `group/stream` the batch was read from, for log lines.
    pub fn origin(&self) -> String {
        format!(
            "{}/{}",
            self.log_group.as_deref().unwrap_or("<unknown group>"),
            self.log_stream.as_deref().unwrap_or("<unknown stream>")
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct LogEvent {
    #[serde(default)]
    pub id:        Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub message:   Value,
}

impl LogEvent {
    /// The message as text. Non-string messages keep their JSON rendering.
    pub fn message_text(&self) -> Option<String> {
        match &self.message {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

pub fn decode_batch(data: &str) -> Result<LogBatch, DecodeError> {
    let compressed = STANDARD.decode(data.trim())?;
    let mut json = Vec::new();
    MultiGzDecoder::new(compressed.as_slice())
        .read_to_end(&mut json)
        .map_err(DecodeError::Gzip)?;
    Ok(serde_json::from_slice(&json)?)
}
