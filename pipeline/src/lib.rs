// src/lib.rs
// ────────────────────────────────────────────────────────────────────────────
// Public library entry point.  Re-export everything for both `main.rs` and
// integration tests.

mod macros;

pub mod cloud;
pub mod comms;
pub mod config;
pub mod detect;
pub mod ingest;
pub mod respond;
pub mod store;
