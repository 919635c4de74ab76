//! Error types for SoundCloud API calls.

use thiserror::Error;

/// Errors from API client operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network request failed.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API rejected the request's credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// API returned a non-success status.
    #[error("API error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The request path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Failed to decode the response body.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for API client operations.
pub type ApiResult<T> = Result<T, ApiError>;
