//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror.
//!
//! Cache failures and store failures are kept apart: the cache is an
//! optimization, so `CacheError` is swallowed on the read/write paths,
//! while `StoreError` always reaches the caller.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Failures of the key-value cache store.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The cache store could not be reached or rejected the command
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// The call did not complete within the configured timeout
    #[error("Cache operation timed out")]
    Timeout,

    /// Expiry must be at least one second
    #[error("Invalid TTL value: {0}")]
    InvalidTtl(u64),

    /// A payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Unavailable(err.to_string())
    }
}

// == Store Error Enum ==
/// Failures of the authoritative document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The document store could not serve the request
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The call did not complete within the configured timeout
    #[error("Store operation timed out")]
    Timeout,
}

// == Application Error Enum ==
/// Unified error type surfaced at the HTTP boundary.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Requested entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Bodies that are not a JSON object of fields are client errors.
impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::Store(_) | Error::Cache(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "success": false,
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP layer.
pub type Result<T> = std::result::Result<T, Error>;
