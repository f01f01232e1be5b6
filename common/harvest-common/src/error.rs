//! Error handling utilities for the HTTP boundary
//!
//! Every failing handler answers with a JSON body of the form
//! `{"error": "..."}` and a matching status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// JSON error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

/// An error that renders as an HTTP response
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

/// Type alias for handler results
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.status)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse::new(self.message))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        tracing::error!("Request failed: {:#}", e);
        internal_error(format!("{:#}", e))
    }
}

/// Extension trait for Result types to convert to API errors
///
/// Any displayable error becomes a logged 500 response.
///
/// ```rust,ignore
/// use harvest_common::ResultExt;
///
/// let jobs = state.store.list_jobs().to_api_err()?;
/// ```
pub trait ResultExt<T> {
    /// Convert the error to an internal server error
    fn to_api_err(self) -> Result<T, ApiError>;
}

impl<T, E: fmt::Display> ResultExt<T> for Result<T, E> {
    fn to_api_err(self) -> Result<T, ApiError> {
        self.map_err(|e| {
            tracing::error!("Request failed: {}", e);
            internal_error(e.to_string())
        })
    }
}

/// Create a 500 error with a message
pub fn internal_error(message: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, message)
}

/// Create a 400 error with a message
///
/// Use this when the request body or query is invalid.
pub fn bad_request(message: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, message)
}

/// Create a 404 error with a message
pub fn not_found(message: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_error() {
        let err = internal_error("boom");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message.contains("boom"));
    }

    #[test]
    fn test_bad_request_and_not_found() {
        assert_eq!(bad_request("bad").status, StatusCode::BAD_REQUEST);
        assert_eq!(not_found("gone").status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_result_ext() {
        let result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "not found"));
        let api_result = result.to_api_err();
        let err = api_result.unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message.contains("not found"));
    }

    #[tokio::test]
    async fn test_into_response_status() {
        let response = not_found("Job not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
