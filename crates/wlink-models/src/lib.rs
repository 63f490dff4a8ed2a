//! Shared data models for the WorkLink backend.
//!
//! This crate provides Serde-serializable types for:
//! - Account identity and profile pointers
//! - Individual and organization profile documents
//! - Job ads with embedded applicant records
//! - Media assets, payment mirrors, plans, alerts
//! - The shared vendor retry policy

pub mod alert;
pub mod individual;
pub mod job_ad;
pub mod media;
pub mod organization;
pub mod payment;
pub mod retry;
pub mod user;

// Re-export common types
pub use alert::{JobAlert, Recommendation};
pub use individual::{
    Certification, Education, Experience, IndividualProfile, JobActivity, Position, Project, Skill,
};
pub use job_ad::{
    Applicant, ApplicantRef, ApplicantStatus, ApplicantView, ApplicationEvent, EvaluationRound,
    JobAd, JobAdId, JobAdStatus,
};
pub use media::{MediaAsset, MediaId, MediaKind, Rendition};
pub use organization::{OrgProject, OrganizationProfile, SocialLink, TeamMember};
pub use payment::{
    Plan, PlanPeriod, SubscriptionStatus, SubscriptionTransaction, Transaction, TransactionStatus,
};
pub use retry::RetryPolicy;
pub use user::{ProfileRef, ProfileType, SocialLogin, SocialProvider, User, UserId};

/// Generate a stable identifier for an embedded sub-entity.
pub fn new_entity_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
