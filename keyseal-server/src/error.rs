//! Server error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use keyseal_core::{KeySealError, StoreError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

// ============================================================================
// Startup errors
// ============================================================================

/// Result type for server setup.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that prevent the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("no master key configured: pass --key-file or --key-string")]
    MissingMasterKey,

    #[error("master key initialization failed: {0}")]
    MasterKey(#[source] KeySealError),

    #[error("storage initialization failed: {0}")]
    Storage(#[from] StoreError),

    #[error("refusing to overwrite existing file {0}")]
    WouldOverwrite(std::path::PathBuf),

    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Request errors
// ============================================================================

/// Errors answered to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}: {source}")]
    KeySeal {
        message: &'static str,
        #[source]
        source: KeySealError,
    },

    #[error("key name must be at least {min} bytes, got {actual}")]
    KeyNameTooShort { min: usize, actual: usize },

    #[error("Unable to get content from request: {0}")]
    UnreadableBody(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Wraps a core error with a client-facing summary.
    pub fn keyseal(message: &'static str, source: KeySealError) -> Self {
        ApiError::KeySeal { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::KeySeal { source, .. } => match source {
                KeySealError::KeyNotFound(_) => StatusCode::NOT_FOUND,
                KeySealError::Persistence {
                    source: StoreError::InvalidName(_),
                    ..
                } => StatusCode::BAD_REQUEST,
                KeySealError::KeyAlreadyExists(_) => StatusCode::CONFLICT,
                KeySealError::AuthenticationFailure { .. }
                | KeySealError::InvalidEncoding { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::KeyNameTooShort { .. } => StatusCode::PRECONDITION_FAILED,
            ApiError::UnreadableBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error_message: String,
    pub error_details: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, details) = match &self {
            ApiError::KeySeal { message, source } => (message.to_string(), source.to_string()),
            ApiError::KeyNameTooShort { .. } => ("Key name too short".to_string(), self.to_string()),
            ApiError::UnreadableBody(details) => (
                "Unable to get content from request".to_string(),
                details.clone(),
            ),
            ApiError::BadRequest(details) => ("Bad request".to_string(), details.clone()),
            ApiError::Internal(details) => ("Internal error".to_string(), details.clone()),
        };

        if status.is_server_error() {
            error!("request failed: {self}");
        }

        let body = ErrorResponse {
            error_message: message,
            error_details: details,
        };

        (status, Json(body)).into_response()
    }
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use keyseal_core::Operation;

    #[test]
    fn core_errors_map_to_statuses() {
        let cases = [
            (KeySealError::KeyNotFound("k".into()), StatusCode::NOT_FOUND),
            (KeySealError::KeyAlreadyExists("k".into()), StatusCode::CONFLICT),
            (
                KeySealError::AuthenticationFailure {
                    op: Operation::Decrypt,
                    name: "k".into(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                KeySealError::InvalidEncoding {
                    op: Operation::Decrypt,
                    name: "k".into(),
                    reason: "bad".into(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                KeySealError::Persistence {
                    op: Operation::Create,
                    name: "k".into(),
                    source: StoreError::Backend("down".into()),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::keyseal("op failed", err).status(), expected);
        }
    }

    #[test]
    fn unstorable_name_is_bad_request() {
        let err = ApiError::keyseal(
            "Unable to check key",
            KeySealError::Persistence {
                op: Operation::Exists,
                name: "caf\u{e9}s".into(),
                source: StoreError::InvalidName("caf\u{e9}s".into()),
            },
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(!err.status().is_server_error());
    }

    #[test]
    fn short_name_is_precondition_failed() {
        let err = ApiError::KeyNameTooShort { min: 5, actual: 3 };
        assert_eq!(err.status(), StatusCode::PRECONDITION_FAILED);
        assert_eq!(err.to_string(), "key name must be at least 5 bytes, got 3");
    }
}
