// src/error.rs

use thiserror::Error;

/// Errors surfaced at the rule-management and storage boundaries.
///
/// The evaluation pass itself never produces one of these for a decode or
/// match problem; those degrade to "no match".
#[derive(Error, Debug)]
pub enum TriageError {
    /// Rejected user input; nothing was persisted.
    #[error("invalid rule: {0}")]
    Validation(String),

    /// Delete key does not name a stored rule.
    #[error("no stored rule at index {0}")]
    NoSuchRule(usize),

    /// The persisted rule list could not be read or written.
    #[error("failed to persist rules: {0}")]
    Persistence(String),

    /// A mail-store call the caller depends on failed (select, fetch, list).
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

pub type Result<T> = std::result::Result<T, TriageError>;
