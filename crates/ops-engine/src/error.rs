//! Rule engine error types.

use thiserror::Error;

/// Rule engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input data cannot be used for a calculation
    #[error("Validation failed for mission '{mission_id}' (pilot '{pilot_id}'): {reason}")]
    Validation {
        mission_id: String,
        pilot_id: String,
        reason: String,
    },
}

/// Result type for rule engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
