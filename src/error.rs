// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.

use crate::models::RequestStatus;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Action not permitted")]
    Forbidden,

    #[error("{field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Request is already {from} and cannot be changed")]
    IllegalTransition { from: RequestStatus },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Store error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Shorthand for a field-level validation failure.
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            // No detail here: the actor learns only that the action is not
            // permitted, never whose data blocked it.
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", None),
            AppError::Validation { .. } => (
                StatusCode::BAD_REQUEST,
                "validation_failed",
                Some(self.to_string()),
            ),
            AppError::IllegalTransition { .. } => (
                StatusCode::CONFLICT,
                "illegal_transition",
                Some(self.to_string()),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            // Store failures surface their diagnostic text so end users can
            // escalate with something actionable. No retry is attempted here;
            // the caller may re-invoke the operation.
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "store_error",
                    Some(msg.clone()),
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
