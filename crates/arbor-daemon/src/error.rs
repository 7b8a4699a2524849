//! Daemon and API error types

use arbor_registry::RegistryError;
use arbor_resolver::ResolveError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Fatal daemon startup/shutdown errors
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;

/// Per-request API errors
///
/// Lifecycle and resolution failures surface here as structured responses;
/// none of them takes the serving process down.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Wire shape of an error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Conflict(_)
            | RegistryError::HashConflict { .. }
            | RegistryError::InvalidState { .. } => ApiError::Conflict(err.to_string()),
            RegistryError::NotFound(_) | RegistryError::TargetNotFound { .. } => {
                ApiError::NotFound(err.to_string())
            }
            RegistryError::InvalidInput(_) => ApiError::BadRequest(err.to_string()),
            RegistryError::Storage(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound | ResolveError::Disabled => {
                ApiError::NotFound(err.to_string())
            }
            ResolveError::Unavailable { .. } => ApiError::Unavailable(err.to_string()),
            ResolveError::InvalidReference(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}
