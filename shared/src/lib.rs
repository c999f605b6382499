//! Types exchanged between the ingest, detection and response stages.

pub mod constants;
pub mod remediation;
