//! # Event Model Tests
//!
//! Normalisation of decoded log lines into index documents, and extraction
//! of evidence fields from search hits.
//!
//! ## Covered Scenarios:
//!
//! - structured CloudTrail messages are indexed as-is
//! - unparsable, non-object and missing messages fall back to `raw_message`
//! - hits without identity or source address keep the evidence intact

use serde_json::json;
use trailguard::comms::events::{LogRecord, MatchedEvent};

#[test]
fn cloudtrail_message_becomes_structured_document() {
    let msg = r#"{"eventName":"ConsoleLogin","sourceIPAddress":"198.51.100.4"}"#;
    let rec = LogRecord::from_message(Some(msg));

    assert!(!rec.is_fallback());
    assert_eq!(
        rec.into_document(),
        json!({ "eventName": "ConsoleLogin", "sourceIPAddress": "198.51.100.4" })
    );
}

#[test]
fn malformed_message_is_wrapped_not_dropped() {
    let rec = LogRecord::from_message(Some("{not json"));
    assert!(rec.is_fallback());
    assert_eq!(rec.into_document(), json!({ "raw_message": "{not json" }));
}

#[test]
fn scalar_json_is_wrapped_because_documents_are_objects() {
    let rec = LogRecord::from_message(Some("42"));
    assert_eq!(rec.into_document(), json!({ "raw_message": "42" }));
}

#[test]
fn missing_message_is_wrapped_as_null() {
    let rec = LogRecord::from_message(None);
    assert_eq!(rec.into_document(), json!({ "raw_message": null }));
}

#[test]
fn matched_event_extracts_source_and_identity() {
    let source = json!({
        "eventName": "ConsoleLogin",
        "sourceIPAddress": "198.51.100.4",
        "userIdentity": { "arn": "arn:aws:iam::111:user/alice" }
    });
    let ev = MatchedEvent::from_source(source.clone());

    assert_eq!(ev.source_ip.as_deref(), Some("198.51.100.4"));
    assert_eq!(ev.user.as_deref(), Some("arn:aws:iam::111:user/alice"));
    assert_eq!(ev.evidence, source);
}

#[test]
fn matched_event_tolerates_sparse_documents() {
    let ev = MatchedEvent::from_source(json!({ "sourceIPAddress": "", "userIdentity": "root" }));
    assert_eq!(ev.source_ip, None);
    assert_eq!(ev.user, None);
}
