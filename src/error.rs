//! Error types for the API layer.
//!
//! Every gate stage rejects with a terminal `ApiError`; no stage after a
//! rejection runs, and the write step either fully succeeds or never
//! executes. Callers map each variant to exactly one HTTP status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// API error produced by the request gate and the handlers behind it.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Rate limit exceeded for this action/identity pair.
    #[error("too many requests")]
    TooManyRequests,

    /// Request payload failed schema validation.
    #[error("invalid {field}: {message}")]
    InvalidInput {
        field: &'static str,
        message: String,
    },

    /// Bot verification rejected the request. Upstream verifier failures
    /// land here too: fail closed.
    #[error("bot check failed")]
    BotCheckFailed,

    /// Resource already exists (duplicate email, slug probe exhausted).
    #[error("{0}")]
    Conflict(String),

    /// Missing, unknown, or expired session token.
    #[error("unauthorized")]
    Unauthorized,

    /// Authenticated, but the role does not permit this action.
    #[error("forbidden")]
    Forbidden,

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Field-level validation failure.
    pub fn invalid_input(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// JSON body returned for every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    /// Error code (e.g. "too_many_requests", "invalid_input", "conflict").
    pub(crate) error: String,
    /// Human-readable error detail, if available.
    pub(crate) detail: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, detail) = match &self {
            ApiError::TooManyRequests => {
                (StatusCode::TOO_MANY_REQUESTS, "too_many_requests", None)
            }
            ApiError::InvalidInput { field, message } => (
                StatusCode::BAD_REQUEST,
                "invalid_input",
                Some(format!("{field}: {message}")),
            ),
            ApiError::BotCheckFailed => (StatusCode::BAD_REQUEST, "bot_check_failed", None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", Some(msg.clone())),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            ApiError::Internal(msg) => {
                tracing::error!(%msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    Some(msg.clone()),
                )
            }
        };

        let body = ErrorBody {
            error: error.to_string(),
            detail,
        };

        (status, axum::Json(body)).into_response()
    }
}
