//! Media CDN vendor adapter.
//!
//! This crate provides:
//! - Multipart upload with per-kind transcoding profiles
//! - Deletion by CDN public id
//! - The shared bounded-backoff retry policy on every call

pub mod client;
pub mod error;

pub use client::{extract_public_id, CdnRendition, CdnUpload, MediaCdnClient, MediaCdnConfig};
pub use error::{MediaError, MediaResult};
