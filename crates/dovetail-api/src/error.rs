//! Error types for dovetail-api

use dovetail_core::retry::HttpStatusError;
use thiserror::Error;

/// Result type alias using dovetail-api's error type
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors raised while calling the Dovetail API
#[derive(Error, Debug)]
pub enum ApiError {
    /// The API answered with a non-success status
    #[error("Dovetail API error: {status} {reason}")]
    Status {
        status: u16,
        reason: String,
        endpoint: String,
    },

    /// The request never produced a complete response
    #[error("Dovetail API request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response body was not valid JSON
    #[error("Invalid JSON in Dovetail API response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The configured base URL or a computed endpoint URL is invalid
    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A tool parameter failed validation before any request was made
    #[error("Invalid parameter '{field}': {message}")]
    InvalidParameter { field: String, message: String },
}

impl ApiError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a status error from a response status
    pub fn status(status: reqwest::StatusCode, endpoint: impl Into<String>) -> Self {
        Self::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            endpoint: endpoint.into(),
        }
    }
}

impl HttpStatusError for ApiError {
    fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}
