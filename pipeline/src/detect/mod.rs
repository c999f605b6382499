// src/detect/mod.rs

//! Detector: scans the store for successful console logins and asks the
//! responder to isolate every non-allowlisted source.
//!
//! The query layer fails open: an unreachable store or an unreadable answer
//! is logged as a search failure and treated as zero hits, so a broken store
//! never turns into a crash loop. The allowlist is applied before dispatch;
//! a dispatch failure only affects its own match.

pub mod allowlist;

use log::Level;
use metrics::counter;
use serde::Serialize;
use shared::remediation::RemediationRequest;
use std::sync::Arc;

use crate::comms::dispatch::Dispatcher;
use crate::comms::events::MatchedEvent;
use crate::pipeline_log;
use crate::store::{DetectionQuery, IndexStore};
use allowlist::SourcePredicate;

/// Result of one scan: how many hits were examined, not how many were
/// remediated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DetectionSummary {
    pub checked: usize,
}

pub struct Detector {
    store:      Arc<dyn IndexStore>,
    dispatcher: Arc<dyn Dispatcher>,
    allowlist:  Arc<dyn SourcePredicate>,
    result_cap: usize,
}

impl Detector {
    pub fn new(
        store: Arc<dyn IndexStore>,
        dispatcher: Arc<dyn Dispatcher>,
        allowlist: Arc<dyn SourcePredicate>,
        result_cap: usize,
    ) -> Self {
        Self { store, dispatcher, allowlist, result_cap }
    }

    pub async fn run(&self) -> DetectionSummary {
        let query = DetectionQuery::console_login_success(self.result_cap);

        let hits = match self.store.search(&query).await {
            Ok(hits) => hits,
            Err(e) => {
                pipeline_log!(Level::Error, "detect", "Search failed, treating as no hits: {}", e);
                counter!("detector_search_failures_total").increment(1);
                return DetectionSummary { checked: 0 };
            }
        };
        pipeline_log!(Level::Info, "detect", "Found {} hits", hits.len());
        counter!("detector_hits_total").increment(hits.len() as u64);

        let checked = hits.len();
        let (mut dispatched, mut suppressed) = (0usize, 0usize);

        for hit in hits {
            let event = MatchedEvent::from_source(hit);
            let Some(source_ip) = event.source_ip else {
                pipeline_log!(Level::Debug, "detect", "Hit without source address skipped");
                continue;
            };
            if self.allowlist.is_trusted(&source_ip) {
                suppressed += 1;
                pipeline_log!(Level::Debug, "detect", "Source {} is allowlisted", source_ip);
                continue;
            }

            let request =
                RemediationRequest::isolate(source_ip.clone(), event.user, event.evidence);
            let target = self.dispatcher.name();
            match self.dispatcher.dispatch(request).await {
                Ok(()) => {
                    dispatched += 1;
                    pipeline_log!(Level::Info, "detect", "Dispatched isolate {} to {}", source_ip, target);
                }
                Err(e) => {
                    pipeline_log!(
                        Level::Error,
                        "detect",
                        "Failed to dispatch isolate {} to {}: {}",
                        source_ip,
                        target,
                        e
                    );
                }
            }
        }

        counter!("detector_dispatched_total").increment(dispatched as u64);
        pipeline_log!(
            Level::Info,
            "detect",
            "Checked {} hit(s): {} dispatched, {} allowlisted",
            checked,
            dispatched,
            suppressed
        );
        DetectionSummary { checked }
    }
}
