//! Axum HTTP API server for the WorkLink job marketplace.
//!
//! This crate provides:
//! - REST surface for accounts, profiles, job ads and applications
//! - HS256 bearer token issuance and verification
//! - Data-driven OAuth provider registry
//! - Rate limiting, security headers, Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod oauth;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{AccountService, ApplicationService, MediaLibrary, ProfileService};
pub use state::AppState;
