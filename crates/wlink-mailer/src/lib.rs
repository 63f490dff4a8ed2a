//! Transactional mail API vendor adapter.
//!
//! Template rendering happens on the vendor side; this adapter names a
//! template and ships its variables. Sends run under the shared retry
//! policy. Callers treat notification failures as non-fatal.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use wlink_models::RetryPolicy;

/// Result type for mail operations.
pub type MailResult<T> = Result<T, MailError>;

/// Errors from the mail API vendor.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail API configuration error: {0}")]
    Config(String),

    #[error("Mail API returned {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MailError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Retry transient failures only: network errors, throttling, 5xx.
    pub fn is_retryable(&self) -> bool {
        match self {
            MailError::Network(_) => true,
            MailError::RequestFailed { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Templates registered with the mail vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailTemplate {
    EmailOtp,
    Welcome,
    ApplicantNotification,
    ApplicantStatusChanged,
}

impl MailTemplate {
    /// Vendor-side template identifier.
    pub fn template_id(&self) -> &'static str {
        match self {
            MailTemplate::EmailOtp => "email-otp",
            MailTemplate::Welcome => "welcome",
            MailTemplate::ApplicantNotification => "applicant-notification",
            MailTemplate::ApplicantStatusChanged => "applicant-status-changed",
        }
    }
}

/// Configuration for the mail API client.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// Base URL of the mail API
    pub base_url: String,
    /// Bearer token
    pub api_token: String,
    /// Sender address
    pub sender: String,
    /// Request timeout
    pub timeout: Duration,
    /// Retry configuration (shared vendor policy)
    pub retry: RetryPolicy,
}

impl MailerConfig {
    /// Create config from environment variables. URL and token are
    /// required; startup aborts without them.
    pub fn from_env() -> MailResult<Self> {
        Ok(Self {
            base_url: std::env::var("MAIL_API_URL")
                .map_err(|_| MailError::config("MAIL_API_URL not set"))?,
            api_token: std::env::var("MAIL_API_TOKEN")
                .map_err(|_| MailError::config("MAIL_API_TOKEN not set"))?,
            sender: std::env::var("MAIL_SENDER")
                .unwrap_or_else(|_| "no-reply@worklink.io".to_string()),
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::from_env("MAIL"),
        })
    }
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    template: &'a str,
    variables: &'a HashMap<String, String>,
}

/// Client for the mail API vendor.
pub struct MailerClient {
    http: Client,
    config: MailerConfig,
}

impl MailerClient {
    /// Create a new client.
    pub fn new(config: MailerConfig) -> MailResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("wlink-mailer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(MailError::Network)?;
        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> MailResult<Self> {
        Self::new(MailerConfig::from_env()?)
    }

    /// Send one templated mail.
    pub async fn send(
        &self,
        template: MailTemplate,
        to: &str,
        variables: HashMap<String, String>,
    ) -> MailResult<()> {
        let url = format!("{}/v1/send", self.config.base_url);
        debug!(template = template.template_id(), to, "Sending mail");

        self.with_retry("send", || async {
            let body = SendRequest {
                from: &self.config.sender,
                to,
                template: template.template_id(),
                variables: &variables,
            };
            let response = self
                .http
                .post(&url)
                .bearer_auth(&self.config.api_token)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                Ok(())
            } else {
                let text = response.text().await.unwrap_or_default();
                Err(MailError::RequestFailed {
                    status: status.as_u16(),
                    body: text,
                })
            }
        })
        .await?;

        info!(template = template.template_id(), to, "Mail sent");
        Ok(())
    }

    /// Execute under the shared vendor retry policy.
    async fn with_retry<T, F, Fut>(&self, operation: &str, op: F) -> MailResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = MailResult<T>>,
    {
        let policy = &self.config.retry;
        let mut last_error = None;

        for attempt in 0..=policy.max_retries {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                    let delay = policy.delay_for(attempt, None);
                    warn!(
                        operation,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Mail API call failed, retrying: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| MailError::RequestFailed {
            status: 0,
            body: "retry loop exhausted".to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> MailerConfig {
        MailerConfig {
            base_url,
            api_token: "token".to_string(),
            sender: "no-reply@worklink.io".to_string(),
            timeout: Duration::from_secs(5),
            retry: RetryPolicy {
                max_retries: 2,
                base_delay_ms: 1,
                max_delay_ms: 5,
            },
        }
    }

    #[test]
    fn test_template_ids_are_stable() {
        assert_eq!(MailTemplate::EmailOtp.template_id(), "email-otp");
        assert_eq!(
            MailTemplate::ApplicantNotification.template_id(),
            "applicant-notification"
        );
    }

    #[tokio::test]
    async fn test_send_posts_template_and_variables() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/send"))
            .and(header("authorization", "Bearer token"))
            .and(body_partial_json(serde_json::json!({
                "to": "dev@example.com",
                "template": "email-otp"
            })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let client = MailerClient::new(test_config(server.uri())).unwrap();
        let mut vars = HashMap::new();
        vars.insert("code".to_string(), "123456".to_string());
        client
            .send(MailTemplate::EmailOtp, "dev@example.com", vars)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_send_retries_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/send"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/send"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let client = MailerClient::new(test_config(server.uri())).unwrap();
        client
            .send(MailTemplate::Welcome, "dev@example.com", HashMap::new())
            .await
            .unwrap();
    }
}
