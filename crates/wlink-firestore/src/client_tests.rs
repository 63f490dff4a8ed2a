//! Tests for document store client behavior.

use std::time::Duration;

use serial_test::serial;

use crate::client::StoreConfig;
use crate::error::StoreError;

// =============================================================================
// Error mapping
// =============================================================================

#[test]
fn test_error_from_http_status_429() {
    let err = StoreError::from_http_status(429, "rate limited".into());
    assert!(matches!(err, StoreError::RateLimited(_)));
    assert!(err.is_retryable());
}

#[test]
fn test_error_from_http_status_5xx() {
    for status in [500, 502, 503] {
        let err = StoreError::from_http_status(status, "server error".into());
        assert!(matches!(err, StoreError::ServerError(s, _) if s == status));
        assert!(err.is_retryable(), "{} should be retryable", status);
    }
}

#[test]
fn test_error_from_http_status_400() {
    let err = StoreError::from_http_status(400, "bad request".into());
    assert!(matches!(err, StoreError::RequestFailed(_)));
    assert!(!err.is_retryable());
}

#[test]
fn test_error_from_http_status_404() {
    let err = StoreError::from_http_status(404, "not found".into());
    assert!(matches!(err, StoreError::NotFound(_)));
    assert!(!err.is_retryable());
}

#[test]
fn test_error_from_http_status_409() {
    let err = StoreError::from_http_status(409, "conflict".into());
    assert!(matches!(err, StoreError::AlreadyExists(_)));
    assert!(!err.is_retryable());
}

#[test]
fn test_error_http_status_getter() {
    assert_eq!(StoreError::RateLimited(1000).http_status(), Some(429));
    assert_eq!(
        StoreError::ServerError(502, "bad gateway".into()).http_status(),
        Some(502)
    );
    assert_eq!(StoreError::not_found("doc").http_status(), Some(404));
}

#[test]
fn test_error_retry_after_ms() {
    assert_eq!(StoreError::RateLimited(5000).retry_after_ms(), Some(5000));
    assert_eq!(
        StoreError::ServerError(500, "error".into()).retry_after_ms(),
        None
    );
}

// =============================================================================
// Config
// =============================================================================

#[test]
#[serial]
fn test_config_validates_empty_project_id() {
    std::env::set_var("GCP_PROJECT_ID", "");
    let result = StoreConfig::from_env();
    assert!(result.is_err());
    std::env::remove_var("GCP_PROJECT_ID");
}

#[test]
#[serial]
fn test_config_parses_timeout_env_vars() {
    std::env::set_var("GCP_PROJECT_ID", "test");
    std::env::set_var("FIRESTORE_CONNECT_TIMEOUT_SECS", "15");
    let config = StoreConfig::from_env().unwrap();
    assert_eq!(config.connect_timeout, Duration::from_secs(15));
    std::env::remove_var("FIRESTORE_CONNECT_TIMEOUT_SECS");
    std::env::remove_var("GCP_PROJECT_ID");
}

#[test]
#[serial]
fn test_config_parses_retry_env_vars() {
    std::env::set_var("GCP_PROJECT_ID", "test");
    std::env::set_var("FIRESTORE_RETRY_BASE_MS", "50");
    std::env::set_var("FIRESTORE_RETRY_MAX_MS", "2000");
    let config = StoreConfig::from_env().unwrap();
    assert_eq!(config.retry.base_delay_ms, 50);
    assert_eq!(config.retry.max_delay_ms, 2000);
    std::env::remove_var("FIRESTORE_RETRY_BASE_MS");
    std::env::remove_var("FIRESTORE_RETRY_MAX_MS");
    std::env::remove_var("GCP_PROJECT_ID");
}

#[test]
#[serial]
fn test_config_handles_invalid_env_values() {
    std::env::set_var("GCP_PROJECT_ID", "test");
    std::env::set_var("FIRESTORE_CONNECT_TIMEOUT_SECS", "not-a-number");
    let config = StoreConfig::from_env().unwrap();
    assert_eq!(config.connect_timeout, Duration::from_secs(5));
    std::env::remove_var("FIRESTORE_CONNECT_TIMEOUT_SECS");
    std::env::remove_var("GCP_PROJECT_ID");
}
