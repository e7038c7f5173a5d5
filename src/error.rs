//! Error types for the storefront edge
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Edge Error Enum ==
/// Unified error type for the storefront edge.
#[derive(Error, Debug)]
pub enum EdgeError {
    /// Resource not found (locally or upstream)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Upstream backend failed or answered with garbage
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Network unavailable and nothing stored to fall back on
    #[error("Offline: {0}")]
    Offline(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for EdgeError {
    fn from(err: reqwest::Error) -> Self {
        if err.status() == Some(StatusCode::NOT_FOUND) {
            EdgeError::NotFound(err.to_string())
        } else {
            EdgeError::Upstream(err.to_string())
        }
    }
}

impl From<serde_json::Error> for EdgeError {
    fn from(err: serde_json::Error) -> Self {
        EdgeError::Upstream(format!("invalid JSON: {}", err))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for EdgeError {
    fn into_response(self) -> Response {
        let status = match &self {
            EdgeError::NotFound(_) => StatusCode::NOT_FOUND,
            EdgeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            EdgeError::Upstream(_) => StatusCode::BAD_GATEWAY,
            EdgeError::Offline(_) => StatusCode::GATEWAY_TIMEOUT,
            EdgeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the storefront edge.
pub type Result<T> = std::result::Result<T, EdgeError>;
