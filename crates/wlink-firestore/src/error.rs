//! Document store error types.

use thiserror::Error;

/// Result type for document store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while talking to the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document already exists: {0}")]
    AlreadyExists(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Server error {0}: {1}")]
    ServerError(u16, String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Rate limited, retry after {0}ms")]
    RateLimited(u64),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn auth_error(msg: impl Into<String>) -> Self {
        Self::AuthError(msg.into())
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Map an HTTP status from the Firestore REST API to an error.
    pub fn from_http_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => Self::PermissionDenied(message),
            404 => Self::NotFound(message),
            409 => Self::AlreadyExists(message),
            429 => Self::RateLimited(1000),
            s if s >= 500 => Self::ServerError(s, message),
            _ => Self::RequestFailed(message),
        }
    }

    /// HTTP status this error corresponds to, for metrics labels.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            StoreError::AuthError(_) | StoreError::PermissionDenied(_) => Some(403),
            StoreError::NotFound(_) => Some(404),
            StoreError::AlreadyExists(_) => Some(409),
            StoreError::RateLimited(_) => Some(429),
            StoreError::ServerError(status, _) => Some(*status),
            StoreError::RequestFailed(_) => Some(500),
            _ => None,
        }
    }

    /// Check if the operation should be retried: network failures,
    /// throttling and server-side errors only.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::Network(_) | StoreError::RateLimited(_) | StoreError::ServerError(_, _)
        )
    }

    /// Retry-After hint in milliseconds, when the store sent one.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            StoreError::RateLimited(ms) => Some(*ms),
            _ => None,
        }
    }
}
