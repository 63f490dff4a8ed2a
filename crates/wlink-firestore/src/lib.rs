//! Firestore REST document store for the WorkLink backend.
//!
//! This crate provides:
//! - An authenticated REST client with token caching and retry
//! - Wire types plus a serde bridge for whole-document conversion
//! - Typed repositories per collection
//! - Atomic multi-document commits via `batchWrite`

pub mod client;
#[cfg(test)]
mod client_tests;
pub mod error;
pub mod metrics;
pub mod repos;
pub mod token_cache;
pub mod types;

pub use client::{StoreClient, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use repos::{
    IndividualRepository, JobAdRepository, JobAlertRepository, MediaRepository, OtpRecord,
    OtpRepository, OrganizationRepository, PlanRepository, RecommendationRepository,
    SubscriptionRepository, TransactionRepository, UserRepository,
};
pub use types::{from_document, to_field, to_fields, Document, Value, Write};
