// src/lib.rs
//
// Library entry point for imap-triage.
// Re-exports modules needed by the binary and integration tests.

pub mod batch;
pub mod cfg;
pub mod decode;
pub mod error;
pub mod evaluator;
pub mod imap_store;
pub mod index;
pub mod matcher;
pub mod message;
pub mod rule_store;
pub mod store;
pub mod triage;

pub use error::TriageError;
