//! Error types for image source requests

use thiserror::Error;

/// Errors that can occur while querying an image search API
#[derive(Error, Debug)]
pub enum SourceError {
    /// The request could not be sent or the body could not be read
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("API returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// The response body was not the expected JSON shape
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Result type alias for source operations
pub type SourceResult<T> = Result<T, SourceError>;
