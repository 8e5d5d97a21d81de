//! Error types for the cache service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Store Error ==
/// Failure reported by a persistent store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying filesystem failure
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Write rejected because it would exceed the configured quota
    #[error("Quota exceeded: {used} of {quota} bytes in use, write needs {requested}")]
    QuotaExceeded {
        quota: usize,
        used: usize,
        requested: usize,
    },

    /// Backend is not reachable or refused the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Record exists but its bytes are not a readable record
    #[error("Corrupted record: {0}")]
    Corrupt(String),
}

// == Fetch Error ==
/// Failure produced while fetching fresh data from upstream.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream answered with a non-success status
    #[error("Upstream returned status {status} for {path}")]
    Status { status: u16, path: String },

    /// Upstream body could not be decoded as JSON
    #[error("Invalid upstream payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

// == Api Error Enum ==
/// Error type surfaced by the HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Refresh could not obtain fresh data
    #[error("Refresh failed: {0}")]
    Upstream(#[from] FetchError),

    /// Store refused a caller-level cleanup operation
    #[error("Store operation failed: {0}")]
    Store(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
