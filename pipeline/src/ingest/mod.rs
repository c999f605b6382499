// src/ingest/mod.rs

//! Ingestor: one subscription payload in, one indexed document per log line.
//!
//! Flow per invocation:
//! 1. Pull `awslogs.data` out of the trigger payload (missing → bad event)
//! 2. Decode the envelope (fatal on failure)
//! 3. Normalise every log line into a `LogRecord` (never fails)
//! 4. Write each document individually; a failed write is logged and the
//!    rest of the batch still goes out. Redelivery of the payload upstream is
//!    the only retry.

pub mod decode;

use log::Level;
use metrics::counter;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::comms::events::LogRecord;
use crate::pipeline_log;
use crate::store::IndexStore;
use decode::{DecodeError, decode_batch};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("bad event: payload has no awslogs.data field")]
    BadEvent,

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub status:   &'static str,
    /// Log lines found in the batch.
    pub records:  usize,
    /// Lines that did not parse and were stored as raw text.
    pub fallback: usize,
    pub indexed:  usize,
    pub failed:   usize,
}

pub struct Ingestor {
    store: Arc<dyn IndexStore>,
}

impl Ingestor {
    pub fn new(store: Arc<dyn IndexStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, event: &Value) -> Result<IngestSummary, IngestError> {
        let Some(data) = event
            .get("awslogs")
            .and_then(|logs| logs.get("data"))
            .and_then(Value::as_str)
        else {
            pipeline_log!(Level::Error, "ingest", "Unexpected event format");
            return Err(IngestError::BadEvent);
        };

        let batch = decode_batch(data).inspect_err(|e| {
            pipeline_log!(Level::Error, "ingest", "Rejecting batch: {}", e);
        })?;
        pipeline_log!(
            Level::Debug,
            "ingest",
            "Decoded {} record(s) from {}",
            batch.log_events.len(),
            batch.origin()
        );

        let mut summary = IngestSummary {
            status:   "ok",
            records:  batch.log_events.len(),
            fallback: 0,
            indexed:  0,
            failed:   0,
        };

        for event in &batch.log_events {
            let record = LogRecord::from_message(event.message_text().as_deref());
            if record.is_fallback() {
                summary.fallback += 1;
                pipeline_log!(
                    Level::Debug,
                    "ingest",
                    "Record {} is not a JSON object, storing raw text",
                    event.id.as_deref().unwrap_or("-")
                );
            }

            match self.store.index_document(&record.into_document()).await {
                Ok(()) => summary.indexed += 1,
                Err(e) => {
                    summary.failed += 1;
                    pipeline_log!(Level::Error, "ingest", "Failed to index doc: {}", e);
                }
            }
        }

        counter!("ingest_records_total").increment(summary.records as u64);
        counter!("ingest_write_failures_total").increment(summary.failed as u64);
        pipeline_log!(
            Level::Info,
            "ingest",
            "Indexed {}/{} record(s) ({} fallback, {} failed)",
            summary.indexed,
            summary.records,
            summary.fallback,
            summary.failed
        );
        Ok(summary)
    }
}
