//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "wlink_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "wlink_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "wlink_http_requests_in_flight";

    pub const APPLICATIONS_TOTAL: &str = "wlink_applications_total";
    pub const NOTIFICATIONS_SENT_TOTAL: &str = "wlink_notifications_sent_total";
    pub const RATE_LIMIT_HITS_TOTAL: &str = "wlink_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a job-application workflow operation (apply, withdraw, ...).
pub fn record_application_event(operation: &str) {
    let labels = [("operation", operation.to_string())];
    counter!(names::APPLICATIONS_TOTAL, &labels).increment(1);
}

/// Record a transactional mail handed to the vendor.
pub fn record_notification_sent(template: &str) {
    let labels = [("template", template.to_string())];
    counter!(names::NOTIFICATIONS_SENT_TOTAL, &labels).increment(1);
}

/// Record a rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Sanitize path for metrics labels (collapse ids into placeholders).
fn sanitize_path(path: &str) -> String {
    let path = regex_lite::Regex::new(
        r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
    )
    .unwrap()
    .replace_all(path, ":id");
    let path = regex_lite::Regex::new(r"/[0-9]+(/|$)")
        .unwrap()
        .replace_all(&path, "/:id$1");
    path.to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
    let response = next.run(request).await;
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();
    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path_collapses_uuids() {
        assert_eq!(
            sanitize_path("/individualUser/v1/jobs/550e8400-e29b-41d4-a716-446655440000/apply"),
            "/individualUser/v1/jobs/:id/apply"
        );
        assert_eq!(sanitize_path("/organization/v1/team/42"), "/organization/v1/team/:id");
    }
}
