//! Detector behaviour: query shape, allowlist before dispatch, fail-open
//! search, per-match dispatch isolation.

mod common;

use common::{MemoryStore, RecordingDispatcher, console_login};
use serde_json::json;
use shared::remediation::ActionKind;
use std::sync::Arc;
use trailguard::detect::{Detector, allowlist::Allowlist};

fn detector(store: Arc<MemoryStore>, dispatcher: Arc<RecordingDispatcher>, cap: usize) -> Detector {
    let allowlist = Allowlist::parse(["203.0.113.0/24"]).unwrap();
    Detector::new(store, dispatcher, Arc::new(allowlist), cap)
}

#[tokio::test]
async fn allowlisted_source_is_never_dispatched() {
    let store = Arc::new(MemoryStore::with_hits(vec![
        console_login("203.0.113.10", "arn:aws:iam::111:user/ops"),
        console_login("198.51.100.7", "arn:aws:iam::111:user/alice"),
    ]));
    let dispatcher = Arc::new(RecordingDispatcher::default());

    let summary = detector(store, dispatcher.clone(), 50).run().await;

    assert_eq!(summary.checked, 2, "checked counts examined hits, not dispatches");
    let sent = dispatcher.sent();
    assert_eq!(sent.len(), 1);
    let req = &sent[0];
    assert_eq!(req.action, ActionKind::Isolate);
    assert_eq!(req.source_ip, "198.51.100.7");
    assert_eq!(req.user.as_deref(), Some("arn:aws:iam::111:user/alice"));
    assert_eq!(req.evidence["userIdentity"]["arn"], "arn:aws:iam::111:user/alice");
}

#[tokio::test]
async fn issues_the_fixed_query_with_configured_cap() {
    let store = Arc::new(MemoryStore::default());
    detector(store.clone(), Arc::new(RecordingDispatcher::default()), 7).run().await;

    let queries = store.queries.lock().unwrap().clone();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0]["size"], 7);
    assert_eq!(queries[0]["sort"], json!([{ "@timestamp": { "order": "desc" } }]));
    assert_eq!(
        queries[0]["query"]["bool"]["must"][0],
        json!({ "match": { "eventName": "ConsoleLogin" } })
    );
}

#[tokio::test]
async fn search_failure_fails_open_with_zero_checked() {
    let store = Arc::new(MemoryStore { search_down: true, ..Default::default() });
    let dispatcher = Arc::new(RecordingDispatcher::default());

    let summary = detector(store, dispatcher.clone(), 50).run().await;

    assert_eq!(summary.checked, 0);
    assert!(dispatcher.sent().is_empty());
}

#[tokio::test]
async fn dispatch_failure_does_not_stop_remaining_matches() {
    let store = Arc::new(MemoryStore::with_hits(vec![
        console_login("198.51.100.1", "arn:aws:iam::111:user/a"),
        console_login("198.51.100.2", "arn:aws:iam::111:user/b"),
        console_login("198.51.100.3", "arn:aws:iam::111:user/c"),
    ]));
    let dispatcher = Arc::new(RecordingDispatcher {
        refuse_from: Some("198.51.100.2".into()),
        ..Default::default()
    });

    let summary = detector(store, dispatcher.clone(), 50).run().await;

    assert_eq!(summary.checked, 3);
    let ips: Vec<_> = dispatcher.sent().into_iter().map(|r| r.source_ip).collect();
    assert_eq!(ips, vec!["198.51.100.1", "198.51.100.3"]);
}

#[tokio::test]
async fn hits_without_source_or_identity() {
    let store = Arc::new(MemoryStore::with_hits(vec![
        json!({ "eventName": "ConsoleLogin" }),
        json!({ "eventName": "ConsoleLogin", "sourceIPAddress": "198.51.100.9" }),
    ]));
    let dispatcher = Arc::new(RecordingDispatcher::default());

    let summary = detector(store, dispatcher.clone(), 50).run().await;

    assert_eq!(summary.checked, 2);
    let sent = dispatcher.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].user, None);
}
