//! Payment adapter error types.

use thiserror::Error;

/// Result type for payment gateway operations.
pub type PaymentResult<T> = Result<T, PaymentError>;

/// Errors from the payment gateway vendor.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment gateway configuration error: {0}")]
    Config(String),

    #[error("Invalid payment request: {0}")]
    Invalid(String),

    #[error("Payment gateway returned {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Invalid gateway response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl PaymentError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    /// Retry transient failures only: network errors, throttling, 5xx.
    pub fn is_retryable(&self) -> bool {
        match self {
            PaymentError::Network(_) => true,
            PaymentError::RequestFailed { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
