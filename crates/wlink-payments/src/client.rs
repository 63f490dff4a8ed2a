//! Payment gateway HTTP client.
//!
//! Thin adapter over the gateway's REST API: order and subscription
//! creation plus HMAC-SHA256 verification of callback signatures. The
//! gateway signs `"{order_id}|{payment_id}"` with the shared key
//! secret and sends the hex digest alongside the callback payload.

use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{info, warn};

use wlink_models::RetryPolicy;

use crate::error::{PaymentError, PaymentResult};

type HmacSha256 = Hmac<Sha256>;

/// Configuration for the payment gateway client.
#[derive(Debug, Clone)]
pub struct PaymentGatewayConfig {
    /// Base URL of the gateway API
    pub base_url: String,
    /// API key id (basic auth username)
    pub key_id: String,
    /// API key secret (basic auth password, HMAC key)
    pub key_secret: String,
    /// Retry configuration (shared vendor policy)
    pub retry: RetryPolicy,
}

impl PaymentGatewayConfig {
    /// Create config from environment variables. The key pair is
    /// required; startup aborts without it.
    pub fn from_env() -> PaymentResult<Self> {
        Ok(Self {
            base_url: std::env::var("PAYMENT_GATEWAY_URL")
                .map_err(|_| PaymentError::config("PAYMENT_GATEWAY_URL not set"))?,
            key_id: std::env::var("PAYMENT_KEY_ID")
                .map_err(|_| PaymentError::config("PAYMENT_KEY_ID not set"))?,
            key_secret: std::env::var("PAYMENT_KEY_SECRET")
                .map_err(|_| PaymentError::config("PAYMENT_KEY_SECRET not set"))?,
            retry: RetryPolicy::from_env("PAYMENT"),
        })
    }
}

/// Request body for order creation.
#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

/// A gateway order.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
}

/// Request body for subscription creation.
#[derive(Debug, Serialize)]
struct CreateSubscriptionRequest<'a> {
    plan_id: &'a str,
    customer_email: &'a str,
    total_count: u32,
}

/// A gateway subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySubscription {
    pub id: String,
    pub plan_id: String,
    pub status: String,
}

/// Client for the payment gateway vendor.
pub struct PaymentGatewayClient {
    http: Client,
    config: PaymentGatewayConfig,
}

impl PaymentGatewayClient {
    /// Create a new client.
    pub fn new(config: PaymentGatewayConfig) -> PaymentResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("wlink-payments/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(PaymentError::Network)?;
        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> PaymentResult<Self> {
        Self::new(PaymentGatewayConfig::from_env()?)
    }

    /// Create an order for a one-off payment. Amounts are minor units
    /// and must be positive.
    pub async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> PaymentResult<GatewayOrder> {
        if amount_minor <= 0 {
            return Err(PaymentError::invalid("amount must be positive"));
        }

        let url = format!("{}/v1/orders", self.config.base_url);
        let body = serde_json::to_value(CreateOrderRequest {
            amount: amount_minor,
            currency,
            receipt,
        })
        .map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;

        let order: GatewayOrder = self.post_json("create_order", &url, &body).await?;
        info!(order_id = %order.id, amount = amount_minor, "Created gateway order");
        Ok(order)
    }

    /// Create a recurring subscription on a gateway plan.
    pub async fn create_subscription(
        &self,
        plan_id: &str,
        customer_email: &str,
        total_count: u32,
    ) -> PaymentResult<GatewaySubscription> {
        let url = format!("{}/v1/subscriptions", self.config.base_url);
        let body = serde_json::to_value(CreateSubscriptionRequest {
            plan_id,
            customer_email,
            total_count,
        })
        .map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;

        let sub: GatewaySubscription = self.post_json("create_subscription", &url, &body).await?;
        info!(subscription_id = %sub.id, plan_id, "Created gateway subscription");
        Ok(sub)
    }

    /// Hex HMAC-SHA256 signature over `"{order_id}|{payment_id}"`.
    pub fn sign(&self, order_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.config.key_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
        let digest = mac.finalize().into_bytes();
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Verify a callback signature in constant time. Malformed hex or a
    /// digest of the wrong length verifies as false, never as an error.
    pub fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        let Some(expected) = decode_hex(signature) else {
            return false;
        };
        let mut mac = HmacSha256::new_from_slice(self.config.key_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
        mac.verify_slice(&expected).is_ok()
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        url: &str,
        body: &serde_json::Value,
    ) -> PaymentResult<T> {
        let response = self
            .with_retry(operation, || async {
                let response = self
                    .http
                    .post(url)
                    .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
                    .json(body)
                    .send()
                    .await?;

                let status = response.status();
                if status.is_success() {
                    Ok(response)
                } else {
                    let text = response.text().await.unwrap_or_default();
                    Err(PaymentError::RequestFailed {
                        status: status.as_u16(),
                        body: text,
                    })
                }
            })
            .await?;

        response
            .json()
            .await
            .map_err(|e| PaymentError::InvalidResponse(e.to_string()))
    }

    /// Execute under the shared vendor retry policy.
    async fn with_retry<T, F, Fut>(&self, operation: &str, op: F) -> PaymentResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = PaymentResult<T>>,
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
                        "Payment gateway call failed, retrying: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| PaymentError::InvalidResponse("retry loop exhausted".to_string())))
    }
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> PaymentGatewayConfig {
        PaymentGatewayConfig {
            base_url,
            key_id: "key".to_string(),
            key_secret: "topsecret".to_string(),
            retry: RetryPolicy {
                max_retries: 2,
                base_delay_ms: 1,
                max_delay_ms: 5,
            },
        }
    }

    fn offline_client() -> PaymentGatewayClient {
        PaymentGatewayClient::new(test_config("http://localhost:1".to_string())).unwrap()
    }

    #[test]
    fn test_signature_round_trip() {
        let client = offline_client();
        let signature = client.sign("order_1", "pay_1");
        assert!(client.verify_signature("order_1", "pay_1", &signature));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let client = offline_client();
        let signature = client.sign("order_1", "pay_1");
        assert!(!client.verify_signature("order_1", "pay_2", &signature));
        assert!(!client.verify_signature("order_2", "pay_1", &signature));
    }

    #[test]
    fn test_malformed_signature_is_false_not_error() {
        let client = offline_client();
        assert!(!client.verify_signature("order_1", "pay_1", "zz-not-hex"));
        assert!(!client.verify_signature("order_1", "pay_1", "abc"));
        assert!(!client.verify_signature("order_1", "pay_1", ""));
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let client = offline_client();
        let result = tokio_test::block_on(client.create_order(0, "USD", "r1"));
        assert!(matches!(result, Err(PaymentError::Invalid(_))));
        let result = tokio_test::block_on(client.create_order(-5, "USD", "r1"));
        assert!(matches!(result, Err(PaymentError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_create_order_parses_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "order_42",
                "amount": 9900,
                "currency": "USD",
                "status": "created"
            })))
            .mount(&server)
            .await;

        let client = PaymentGatewayClient::new(test_config(server.uri())).unwrap();
        let order = client.create_order(9900, "USD", "receipt-1").await.unwrap();
        assert_eq!(order.id, "order_42");
        assert_eq!(order.amount, 9900);
    }

    #[tokio::test]
    async fn test_create_order_retries_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "order_43",
                "amount": 100,
                "currency": "USD",
                "status": "created"
            })))
            .mount(&server)
            .await;

        let client = PaymentGatewayClient::new(test_config(server.uri())).unwrap();
        let order = client.create_order(100, "USD", "receipt-2").await.unwrap();
        assert_eq!(order.id, "order_43");
    }

    #[tokio::test]
    async fn test_create_order_does_not_retry_bad_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;

        let client = PaymentGatewayClient::new(test_config(server.uri())).unwrap();
        let result = client.create_order(100, "USD", "receipt-3").await;
        assert!(matches!(
            result,
            Err(PaymentError::RequestFailed { status: 400, .. })
        ));
    }
}
