// src/store/mod.rs
//! Index store façade: the trait every stage talks to, plus the HTTP client.

pub mod http;
pub mod query;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use http::EsClient;
pub use query::DetectionQuery;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed search response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Document store scoped to one index.
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Insert one document. No uniqueness is enforced.
    async fn index_document(&self, doc: &Value) -> Result<(), StoreError>;

    /// Run `query` and return the `_source` of every hit, in store order.
    async fn search(&self, query: &DetectionQuery) -> Result<Vec<Value>, StoreError>;
}
