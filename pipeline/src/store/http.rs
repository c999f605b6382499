//! Elasticsearch-compatible HTTP client.
//!
//! write: `POST {endpoint}/{index}/_doc`
//! query: `GET  {endpoint}/{index}/_search` with the query as JSON body.
//! Every request carries the configured timeout; a timeout surfaces as an
//! ordinary [`StoreError::Http`].

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;

use crate::config::model::StoreConfig;
use crate::store::{DetectionQuery, IndexStore, StoreError};

pub struct EsClient {
    client:   Client,
    endpoint: String,
    index:    String,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: HitsEnvelope,
}

#[derive(Debug, Default, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source", default)]
    source: Value,
}

impl EsClient {
    pub fn new(cfg: &StoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(cfg.timeout).build()?;
        Ok(Self {
            client,
            endpoint: cfg.endpoint.trim_end_matches('/').to_owned(),
            index:    cfg.index.clone(),
        })
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    fn url(&self, op: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.index, op)
    }
}

async fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable>".to_string());
    Err(StoreError::Status { status: status.as_u16(), body })
}

#[async_trait]
impl IndexStore for EsClient {
    async fn index_document(&self, doc: &Value) -> Result<(), StoreError> {
        let response = self.client.post(self.url("_doc")).json(doc).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn search(&self, query: &DetectionQuery) -> Result<Vec<Value>, StoreError> {
        let response = self.client.get(self.url("_search")).json(query).send().await?;
        let body = check_status(response).await?.bytes().await?;
        let parsed: SearchResponse = serde_json::from_slice(&body)?;
        Ok(parsed.hits.hits.into_iter().map(|h| h.source).collect())
    }
}
