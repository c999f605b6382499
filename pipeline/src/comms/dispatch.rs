//! Detector → responder hand-off.
//!
//! Dispatch is fire-and-forget: a [`Dispatcher`] hands one
//! [`RemediationRequest`] to the transport and returns. There is no return
//! channel and no correlation with what the responder eventually does.
//!
//! Two transports:
//!   • [`QueueDispatcher`] pushes onto a bounded in-process queue drained by
//!     [`ResponderListener`](crate::comms::listeners::ResponderListener).
//!     It never waits; a full queue is a dispatch failure.
//!   • [`HttpDispatcher`] POSTs the request to a remote responder that is
//!     expected to accept it asynchronously (any 2xx).

use async_trait::async_trait;
use reqwest::Client;
use shared::remediation::RemediationRequest;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("responder queue is full")]
    QueueFull,

    #[error("responder queue is closed")]
    QueueClosed,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("responder returned {0}")]
    Status(u16),
}

#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Display name for logs.
    fn name(&self) -> &str;

    async fn dispatch(&self, request: RemediationRequest) -> Result<(), DispatchError>;
}

/// Sender half of the in-process responder queue.
#[derive(Clone)]
pub struct QueueDispatcher {
    name: String,
    tx:   mpsc::Sender<RemediationRequest>,
}

impl QueueDispatcher {
    /// Build the queue; hand the receiver to a `ResponderListener`.
    pub fn channel(
        name: impl Into<String>,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<RemediationRequest>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { name: name.into(), tx }, rx)
    }
}

#[async_trait]
impl Dispatcher for QueueDispatcher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn dispatch(&self, request: RemediationRequest) -> Result<(), DispatchError> {
        self.tx.try_send(request).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DispatchError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => DispatchError::QueueClosed,
        })
    }
}

/// Remote responder reached over HTTP.
pub struct HttpDispatcher {
    client: Client,
    url:    String,
}

impl HttpDispatcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DispatchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url: url.into() })
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    fn name(&self) -> &str {
        &self.url
    }

    async fn dispatch(&self, request: RemediationRequest) -> Result<(), DispatchError> {
        let response = self.client.post(&self.url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Status(status.as_u16()));
        }
        Ok(())
    }
}
