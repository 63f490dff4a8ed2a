//! Media adapter error types.

use thiserror::Error;

/// Result type for media CDN operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors from the media CDN vendor.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Media CDN configuration error: {0}")]
    Config(String),

    #[error("Media CDN returned {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Invalid media CDN response: {0}")]
    InvalidResponse(String),

    #[error("Unsupported media payload: {0}")]
    Unsupported(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MediaError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Retry transient failures only: network errors, throttling, 5xx.
    pub fn is_retryable(&self) -> bool {
        match self {
            MediaError::Network(_) => true,
            MediaError::RequestFailed { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
