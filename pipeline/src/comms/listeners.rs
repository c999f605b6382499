//! Responder side of the in-process dispatch queue.
//! -----------------------------------------------------------------------------
//! The listener drains the queue fed by
//! [`QueueDispatcher`](crate::comms::dispatch::QueueDispatcher) and runs every
//! request as its own task, so remediation requests are handled concurrently
//! and independently. Nothing flows back to the detector.
//!
//! When every sender is dropped the listener waits for in-flight requests and
//! exits, returning how many it handled.

use log::Level;
use shared::remediation::RemediationRequest;
use std::sync::Arc;
use tokio::{sync::mpsc, task::{JoinHandle, JoinSet}};

use crate::pipeline_log;
use crate::respond::Responder;

pub struct ResponderListener {
    name:      &'static str,
    responder: Arc<Responder>,
}

impl ResponderListener {
    pub fn new(name: &'static str, responder: Arc<Responder>) -> Self {
        Self { name, responder }
    }

    pub fn spawn(self, mut rx: mpsc::Receiver<RemediationRequest>) -> JoinHandle<usize> {
        let Self { name, responder } = self;

        tokio::spawn(async move {
            pipeline_log!(Level::Info, "listener", "listener '{}' started", name);
            let mut inflight = JoinSet::new();
            let mut handled = 0usize;

            while let Some(request) = rx.recv().await {
                let responder = Arc::clone(&responder);
                inflight.spawn(async move { responder.handle(&request).await });
                handled += 1;
                while let Some(res) = inflight.try_join_next() {
                    report(res);
                }
            }

            while let Some(res) = inflight.join_next().await {
                report(res);
            }
            pipeline_log!(Level::Info, "listener", "listener '{}' exited after {} request(s)", name, handled);
            handled
        })
    }
}

fn report<T>(res: Result<T, tokio::task::JoinError>) {
    if let Err(e) = res {
        pipeline_log!(Level::Error, "listener", "responder task failed: {}", e);
    }
}
