//! Row store error types

use ops_domain::{DomainError, EntityKind};
use thiserror::Error;

/// Row store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached; never retried within a request
    #[error("Store unreachable: {0}")]
    Connectivity(String),

    #[error(
        "Write conflict on {kind} '{id}': expected version {expected}, store has {actual}"
    )]
    Conflict {
        kind: EntityKind,
        id: String,
        expected: u64,
        actual: u64,
    },

    #[error("Row not found: {kind} with id '{id}'")]
    NotFound { kind: EntityKind, id: String },

    #[error("Invalid row in sheet '{sheet}' (row '{row}'): {reason}")]
    Validation {
        sheet: String,
        row: String,
        reason: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Connectivity(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
