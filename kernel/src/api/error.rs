//! API error type shared by every endpoint.

use axum::{
    extract::Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::transfer::{PolicyError, TransferError};

/// Errors returned by the REST handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No live session has this composite key.
    #[error("Session not found: {0}")]
    SessionNotFound(String),
    /// The request is well-formed JSON but cannot be served.
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// The copy engine refused to start.
    #[error(transparent)]
    Transfer(#[from] TransferError),
    /// A blocking worker panicked or was cancelled.
    #[error("Worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::Transfer(TransferError::PolicyViolation(
                PolicyError::SecurityViolation { .. } | PolicyError::Traversal { .. },
            )) => StatusCode::FORBIDDEN,
            Self::Transfer(TransferError::PolicyViolation(_)) => StatusCode::BAD_REQUEST,
            Self::Transfer(TransferError::DestinationSetup { .. }) | Self::Worker(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            Self::SessionNotFound(_) => "session_not_found",
            Self::ValidationError(_) => "validation_error",
            Self::Transfer(TransferError::PolicyViolation(_)) => "policy_violation",
            Self::Transfer(TransferError::DestinationSetup { .. }) => "destination_setup",
            Self::Worker(_) => "worker_failed",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": self.to_string(),
            "error_type": self.error_type(),
        }));

        (status, body).into_response()
    }
}
