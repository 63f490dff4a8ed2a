//! Firestore REST API client.
//!
//! Production behavior carried by this client:
//! - Token caching with refresh margin, plus one re-auth on a rejected token
//! - HTTP client tuning (pooling, timeouts)
//! - Bounded exponential backoff with jitter (shared vendor policy)
//! - Observability (tracing spans, metrics)

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value as JsonValue;
use tracing::{debug, info_span, warn, Instrument};

use wlink_models::RetryPolicy;

use crate::error::{StoreError, StoreResult};
use crate::metrics::{record_request, record_retry};
use crate::types::{
    BatchWriteRequest, BatchWriteResponse, Document, ListDocumentsResponse, RunQueryRequest,
    RunQueryResponse, StructuredQuery, Value, Write,
};

/// Document store client configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// GCP project ID
    pub project_id: String,
    /// Database ID (usually "(default)")
    pub database_id: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Retry configuration (shared vendor policy)
    pub retry: RetryPolicy,
}

impl StoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        let project_id = std::env::var("GCP_PROJECT_ID")
            .map_err(|_| StoreError::auth_error("GCP_PROJECT_ID must be set"))?;

        if project_id.is_empty() {
            return Err(StoreError::auth_error("GCP_PROJECT_ID cannot be empty"));
        }

        let connect_timeout_secs: u64 = std::env::var("FIRESTORE_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            project_id,
            database_id: std::env::var("FIRESTORE_DATABASE_ID")
                .unwrap_or_else(|_| "(default)".to_string()),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            retry: RetryPolicy::from_env("FIRESTORE"),
        })
    }
}

/// Firestore REST API client.
pub struct StoreClient {
    http: Client,
    config: StoreConfig,
    base_url: String,
    token_cache: Arc<crate::token_cache::TokenCache>,
}

impl Clone for StoreClient {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            config: self.config.clone(),
            base_url: self.base_url.clone(),
            token_cache: Arc::clone(&self.token_cache),
        }
    }
}

impl StoreClient {
    /// Create a new client.
    pub async fn new(config: StoreConfig) -> StoreResult<Self> {
        let auth = Self::create_auth_provider()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("wlink-firestore/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(StoreError::Network)?;

        let base_url = format!(
            "https://firestore.googleapis.com/v1/projects/{}/databases/{}/documents",
            config.project_id, config.database_id
        );

        Ok(Self {
            http,
            config,
            base_url,
            token_cache: Arc::new(crate::token_cache::TokenCache::new(auth)),
        })
    }

    fn create_auth_provider() -> StoreResult<Arc<dyn TokenProvider>> {
        let service_account = CustomServiceAccount::from_env()
            .map_err(|e| StoreError::auth_error(format!("Failed to load service account: {}", e)))?;

        match service_account {
            Some(sa) => Ok(Arc::new(sa)),
            None => Err(StoreError::auth_error(
                "GOOGLE_APPLICATION_CREDENTIALS not set. \
                 Set it to the path of your service account JSON file.",
            )),
        }
    }

    /// Create from environment variables.
    pub async fn from_env() -> StoreResult<Self> {
        let config = StoreConfig::from_env()?;
        Self::new(config).await
    }

    /// Retry policy shared with all repositories built on this client.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.config.retry
    }

    fn document_path(&self, collection: &str, doc_id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection, doc_id)
    }

    /// Build full document name for batch operations.
    pub fn full_document_name(&self, collection: &str, doc_id: &str) -> String {
        format!(
            "projects/{}/databases/{}/documents/{}/{}",
            self.config.project_id, self.config.database_id, collection, doc_id
        )
    }

    fn is_access_token_expired(body: &str) -> bool {
        body.contains("ACCESS_TOKEN_EXPIRED") || body.contains("\"UNAUTHENTICATED\"")
    }

    /// Send a request with a cached token, re-authenticating once if the
    /// store reports the token as expired.
    async fn send_authorized(
        &self,
        method: Method,
        url: &str,
        body: Option<&JsonValue>,
    ) -> StoreResult<reqwest::Response> {
        let mut token = self.token_cache.get_token().await?;

        for attempt in 0..2 {
            let mut request = self.http.request(method.clone(), url).bearer_auth(&token);
            if let Some(json) = body {
                request = request.json(json);
            }
            let response = request.send().await?;

            if response.status() != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }

            let text = response.text().await.unwrap_or_default();
            if attempt == 0 && Self::is_access_token_expired(&text) {
                self.token_cache.invalidate().await;
                token = self.token_cache.get_token().await?;
                continue;
            }
            return Err(StoreError::from_http_status(
                StatusCode::UNAUTHORIZED.as_u16(),
                format!("{} failed: {}", url, text),
            ));
        }
        unreachable!("send_authorized retries at most once")
    }

    // =========================================================================
    // CRUD operations
    // =========================================================================

    /// Get a document.
    pub async fn get_document(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> StoreResult<Option<Document>> {
        let url = self.document_path(collection, doc_id);

        self.execute_request("get_document", collection, Some(doc_id), async {
            let response = self.send_authorized(Method::GET, &url, None).await?;
            match response.status() {
                StatusCode::OK => Ok(Some(response.json().await?)),
                StatusCode::NOT_FOUND => Ok(None),
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Create a document. Fails with `AlreadyExists` if the id is taken.
    pub async fn create_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: HashMap<String, Value>,
    ) -> StoreResult<Document> {
        let url = format!("{}/{}?documentId={}", self.base_url, collection, doc_id);
        let body = serde_json::to_value(Document::new(fields))?;

        self.execute_request("create_document", collection, Some(doc_id), async {
            let response = self.send_authorized(Method::POST, &url, Some(&body)).await?;
            match response.status() {
                StatusCode::OK | StatusCode::CREATED => Ok(response.json().await?),
                StatusCode::CONFLICT => Err(StoreError::AlreadyExists(format!(
                    "{}/{}",
                    collection, doc_id
                ))),
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Update a document. With a mask, only the named fields are merged;
    /// without one the whole document is replaced.
    pub async fn update_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: HashMap<String, Value>,
        update_mask: Option<Vec<String>>,
    ) -> StoreResult<Document> {
        let mut url = self.document_path(collection, doc_id);
        if let Some(mask) = update_mask {
            let params: Vec<String> = mask
                .iter()
                .map(|f| format!("updateMask.fieldPaths={}", f))
                .collect();
            url = format!("{}?{}", url, params.join("&"));
        }

        let body = serde_json::to_value(Document::new(fields))?;

        self.execute_request("update_document", collection, Some(doc_id), async {
            let response = self.send_authorized(Method::PATCH, &url, Some(&body)).await?;
            match response.status() {
                StatusCode::OK => Ok(response.json().await?),
                StatusCode::NOT_FOUND => {
                    Err(StoreError::not_found(format!("{}/{}", collection, doc_id)))
                }
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Delete a document. Deleting an absent document is a no-op.
    pub async fn delete_document(&self, collection: &str, doc_id: &str) -> StoreResult<()> {
        let url = self.document_path(collection, doc_id);
        let coll = collection.to_string();
        let id = doc_id.to_string();

        self.execute_request("delete_document", collection, Some(doc_id), async {
            let response = self.send_authorized(Method::DELETE, &url, None).await?;
            match response.status() {
                StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
                StatusCode::NOT_FOUND => {
                    debug!("Document {}/{} already deleted (idempotent)", coll, id);
                    Ok(())
                }
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// List documents in a collection.
    pub async fn list_documents(
        &self,
        collection: &str,
        page_size: Option<u32>,
        page_token: Option<&str>,
    ) -> StoreResult<ListDocumentsResponse> {
        let mut url = format!("{}/{}", self.base_url, collection);
        let mut params = Vec::new();
        if let Some(size) = page_size {
            params.push(format!("pageSize={}", size));
        }
        if let Some(token) = page_token {
            params.push(format!("pageToken={}", urlencoding::encode(token)));
        }
        if !params.is_empty() {
            url = format!("{}?{}", url, params.join("&"));
        }

        self.execute_request("list_documents", collection, None, async {
            let response = self.send_authorized(Method::GET, &url, None).await?;
            match response.status() {
                StatusCode::OK => Ok(response.json().await?),
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Run a structured query against a top-level collection.
    pub async fn run_query(&self, query: StructuredQuery) -> StoreResult<Vec<Document>> {
        let url = format!("{}:runQuery", self.base_url);
        let collection = query
            .from
            .first()
            .map(|c| c.collection_id.clone())
            .unwrap_or_default();
        let body = serde_json::to_value(RunQueryRequest {
            structured_query: query,
        })?;

        self.execute_request("run_query", &collection, None, async {
            let response = self.send_authorized(Method::POST, &url, Some(&body)).await?;
            match response.status() {
                StatusCode::OK => {
                    let text = response.text().await.unwrap_or_default();
                    // runQuery returns a JSON array of response objects
                    let responses: Vec<RunQueryResponse> =
                        serde_json::from_str(&text).map_err(|e| {
                            StoreError::request_failed(format!(
                                "Failed to parse runQuery response: {} (body prefix: {})",
                                e,
                                &text[..text.len().min(200)]
                            ))
                        })?;
                    Ok(responses.into_iter().filter_map(|r| r.document).collect())
                }
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Execute a batch write (atomic multi-document commit).
    pub async fn batch_write(&self, writes: Vec<Write>) -> StoreResult<BatchWriteResponse> {
        if writes.is_empty() {
            return Ok(BatchWriteResponse::empty());
        }
        if writes.len() > 500 {
            return Err(StoreError::request_failed(
                "Batch write exceeds 500 document limit",
            ));
        }

        let url = format!("{}:batchWrite", self.base_url);
        let body = serde_json::to_value(BatchWriteRequest { writes })?;

        self.execute_request("batch_write", "batch", None, async {
            let response = self.send_authorized(Method::POST, &url, Some(&body)).await?;
            match response.status() {
                StatusCode::OK => {
                    let batch_response: BatchWriteResponse = response.json().await?;
                    batch_response.check_for_errors()?;
                    Ok(batch_response)
                }
                StatusCode::CONFLICT => {
                    Err(StoreError::AlreadyExists("Batch write conflict".to_string()))
                }
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Execute an operation under the shared retry policy.
    pub async fn with_retry<T, F, Fut>(&self, operation: &str, op: F) -> StoreResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = StoreResult<T>>,
    {
        let policy = &self.config.retry;
        let mut last_error = None;

        for attempt in 0..=policy.max_retries {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                    let delay = policy.delay_for(attempt, e.retry_after_ms());
                    warn!(
                        operation = %operation,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Document store operation failed, retrying: {}",
                        e
                    );
                    record_retry(operation);
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| StoreError::request_failed("Unknown error")))
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    /// Execute a request with tracing and metrics.
    async fn execute_request<T, F>(
        &self,
        operation: &str,
        collection: &str,
        doc_id: Option<&str>,
        fut: F,
    ) -> StoreResult<T>
    where
        F: std::future::Future<Output = StoreResult<T>>,
    {
        let span = if let Some(id) = doc_id {
            info_span!("docstore_request", operation = %operation, collection = %collection, doc_id = %id)
        } else {
            info_span!("docstore_request", operation = %operation, collection = %collection)
        };

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, latency_ms);

        result
    }

    async fn handle_error_response(
        status: StatusCode,
        url: &str,
        response: reqwest::Response,
    ) -> StoreError {
        let body = response.text().await.unwrap_or_default();
        StoreError::from_http_status(status.as_u16(), format!("{} failed: {}", url, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_requires_project_id() {
        std::env::remove_var("GCP_PROJECT_ID");
        assert!(StoreConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn test_config_default_values() {
        std::env::set_var("GCP_PROJECT_ID", "test-project");
        std::env::remove_var("FIRESTORE_CONNECT_TIMEOUT_SECS");
        let config = StoreConfig::from_env().unwrap();
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.database_id, "(default)");
        std::env::remove_var("GCP_PROJECT_ID");
    }

    #[test]
    fn test_expired_token_detection() {
        assert!(StoreClient::is_access_token_expired("ACCESS_TOKEN_EXPIRED"));
        assert!(StoreClient::is_access_token_expired("\"UNAUTHENTICATED\""));
        assert!(!StoreClient::is_access_token_expired("PERMISSION_DENIED"));
    }
}
