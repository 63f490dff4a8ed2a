//! Request handlers.

pub mod auth;
pub mod health;
pub mod individual;
pub mod jobs;
pub mod media;
pub mod organization;
pub mod payments;

pub use health::{health, ready};
