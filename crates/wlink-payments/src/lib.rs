//! Payment gateway vendor adapter.
//!
//! This crate provides:
//! - Order and subscription creation
//! - HMAC-SHA256 callback signature verification
//! - The shared bounded-backoff retry policy on every call

pub mod client;
pub mod error;

pub use client::{GatewayOrder, GatewaySubscription, PaymentGatewayClient, PaymentGatewayConfig};
pub use error::{PaymentError, PaymentResult};
