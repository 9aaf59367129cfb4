//! # Agent Error Types
//!
//! Unified error handling for the request router and the HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ops_domain::DomainError;
use ops_engine::EngineError;
use ops_store::StoreError;
use thiserror::Error;

/// Agent-level errors
#[derive(Debug, Error)]
pub enum AgentError {
    /// Free text could not be turned into a structured request
    #[error("Could not parse request: {0}")]
    Parse(String),

    #[error("Unknown request kind '{0}'")]
    RequestKind(String),

    #[error("Request '{kind}' needs {field}")]
    MissingField { kind: &'static str, field: &'static str },

    /// A request or a mission names an id the roster does not have
    #[error("Unknown {entity_type} '{id}'")]
    Reference { entity_type: String, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Roster store unavailable: {0}")]
    Connectivity(String),

    /// The roster changed between reading the snapshot and writing back
    #[error("Write conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgentError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Parse(_) | Self::RequestKind(_) | Self::MissingField { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Reference { .. } => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Connectivity(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error code for clients
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "PARSE_ERROR",
            Self::RequestKind(_) => "UNKNOWN_REQUEST_KIND",
            Self::MissingField { .. } => "MISSING_FIELD",
            Self::Reference { .. } => "REFERENCE_NOT_FOUND",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::Connectivity(_) => "STORE_UNAVAILABLE",
            Self::Conflict(_) => "WRITE_CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DomainError> for AgentError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => Self::Reference { entity_type, id },
            other => Self::Validation(other.to_string()),
        }
    }
}

impl From<EngineError> for AgentError {
    fn from(err: EngineError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<StoreError> for AgentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Connectivity(msg) => Self::Connectivity(msg),
            err @ StoreError::Conflict { .. } => Self::Conflict(err.to_string()),
            StoreError::NotFound { kind, id } => Self::Reference {
                entity_type: kind.to_string(),
                id,
            },
            err @ StoreError::Validation { .. } => Self::Validation(err.to_string()),
            StoreError::Serialization(msg) => Self::Internal(msg),
            StoreError::Domain(err) => err.into(),
        }
    }
}

impl IntoResponse for AgentError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut error = serde_json::json!({
            "message": self.to_string(),
            "code": self.error_code(),
        });

        match &self {
            Self::Reference { entity_type, id } => {
                error["entityType"] = entity_type.as_str().into();
                error["entityId"] = id.as_str().into();
            }
            Self::MissingField { field, .. } => {
                error["field"] = (*field).into();
            }
            _ => {}
        }

        (status, axum::Json(serde_json::json!({ "error": error }))).into_response()
    }
}

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;
    use ops_domain::EntityKind;

    #[test]
    fn test_store_errors_keep_their_category() {
        let conflict: AgentError = StoreError::Conflict {
            kind: EntityKind::Mission,
            id: "PRJ001".to_string(),
            expected: 1,
            actual: 2,
        }
        .into();
        assert_eq!(conflict.status_code(), StatusCode::CONFLICT);
        assert!(conflict.to_string().contains("PRJ001"));

        let offline: AgentError = StoreError::Connectivity("timeout".to_string()).into();
        assert_eq!(offline.error_code(), "STORE_UNAVAILABLE");

        let missing: AgentError = StoreError::Domain(DomainError::NotFound {
            entity_type: "pilot".to_string(),
            id: "P9".to_string(),
        })
        .into();
        assert!(matches!(missing, AgentError::Reference { ref id, .. } if id == "P9"));
    }

    #[test]
    fn test_engine_errors_are_validation() {
        let err: AgentError = EngineError::Validation {
            mission_id: "PRJ001".to_string(),
            pilot_id: "P001".to_string(),
            reason: "pilot has no hourly rate".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.to_string().contains("P001"));
    }
}
