//! Health check handlers.

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub document_store: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// Readiness check endpoint. Probes the document store with a cheap
/// read so a broken credential shows up here instead of on traffic.
pub async fn ready(State(state): State<AppState>) -> Json<ReadinessResponse> {
    let start = Instant::now();
    let store_check = match state.store.list_documents("plans", Some(1), None).await {
        Ok(_) => CheckStatus {
            status: "ok".to_string(),
            error: None,
            latency_ms: Some(start.elapsed().as_millis() as u64),
        },
        Err(e) => CheckStatus {
            status: "error".to_string(),
            error: Some(e.to_string()),
            latency_ms: None,
        },
    };

    let status = if store_check.status == "ok" {
        "ready"
    } else {
        "degraded"
    };

    Json(ReadinessResponse {
        status: status.to_string(),
        checks: ReadinessChecks {
            document_store: store_check,
        },
    })
}
