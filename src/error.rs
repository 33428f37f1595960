// Crate-wide error type
//
// Malformed call signs are never errors: they travel inside BatchOutcome.
// Only infrastructure failures and misconfigured sessions end up here.

use std::collections::BTreeSet;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("no stored profile for user '{0}'")]
    ProfileNotFound(String),

    #[error("invalid session defaults: {0}")]
    InvalidDefaults(String),

    /// The batch still has rejected call signs and cannot be committed.
    #[error("batch blocked: invalid {invalid:?}, incomplete {incomplete:?}")]
    BatchBlocked {
        invalid: BTreeSet<String>,
        incomplete: BTreeSet<String>,
    },

    #[error("row {0} is not part of the current batch")]
    UnknownRow(usize),

    #[error("nothing to commit")]
    NothingToCommit,

    #[error("failed to persist report: {0}")]
    Persist(String),
}

pub type Result<T> = std::result::Result<T, IntakeError>;
