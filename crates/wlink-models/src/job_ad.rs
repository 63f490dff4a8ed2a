//! Job ad documents and embedded applicant records.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use crate::media::MediaId;
use crate::user::UserId;

/// Unique identifier for a job ad.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobAdId(pub String);

impl JobAdId {
    /// Generate a new random job ad ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobAdId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobAdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobAdId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobAdId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Whether a job ad is accepting applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobAdStatus {
    #[default]
    Open,
    Closed,
}

impl JobAdStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobAdStatus::Open => "open",
            JobAdStatus::Closed => "closed",
        }
    }
}

/// Status of a single application.
///
/// Every applicant starts at `Pending`. The status-update endpoint only
/// validates membership in this set; there is no transition matrix, so
/// `Rejected` and `Selected` can still be overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApplicantStatus {
    #[default]
    Pending,
    Shortlisted,
    Selected,
    Rejected,
}

impl ApplicantStatus {
    /// All statuses, in pipeline order.
    pub const ALL: [ApplicantStatus; 4] = [
        ApplicantStatus::Pending,
        ApplicantStatus::Shortlisted,
        ApplicantStatus::Selected,
        ApplicantStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicantStatus::Pending => "pending",
            ApplicantStatus::Shortlisted => "shortlisted",
            ApplicantStatus::Selected => "selected",
            ApplicantStatus::Rejected => "rejected",
        }
    }

    /// Parse from the stored string form; `None` for anything outside
    /// the allowed set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ApplicantStatus::Pending),
            "shortlisted" => Some(ApplicantStatus::Shortlisted),
            "selected" => Some(ApplicantStatus::Selected),
            "rejected" => Some(ApplicantStatus::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for ApplicantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Append-only audit entry on an application.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ApplicationEvent {
    /// What happened ("applied", "status:shortlisted", ...)
    pub event: String,
    pub at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ApplicationEvent {
    pub fn now(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            at: Utc::now(),
            note: None,
        }
    }
}

/// An interview/evaluation round attached to an application.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EvaluationRound {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

/// One user's submission on a job ad.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Applicant {
    /// Generated applicant ID (external reference)
    pub id: String,

    /// Applying user
    pub user: UserId,

    /// Resume media reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<MediaId>,

    pub cover_letter: String,

    #[serde(default)]
    pub status: ApplicantStatus,

    /// Append-only audit log
    #[serde(default)]
    pub history: Vec<ApplicationEvent>,

    #[serde(default)]
    pub evaluation_rounds: Vec<EvaluationRound>,

    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Applicant {
    /// Create a new pending application with its initial audit entry.
    pub fn new(user: UserId, cover_letter: impl Into<String>, resume: Option<MediaId>) -> Self {
        let now = Utc::now();
        Self {
            id: crate::new_entity_id(),
            user,
            resume,
            cover_letter: cover_letter.into(),
            status: ApplicantStatus::Pending,
            history: vec![ApplicationEvent::now("applied")],
            evaluation_rounds: Vec::new(),
            applied_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the status and append the audit entry.
    pub fn set_status(&mut self, status: ApplicantStatus) {
        self.status = status;
        self.history
            .push(ApplicationEvent::now(format!("status:{}", status)));
        self.updated_at = Utc::now();
    }

    /// The bare reference shown to callers who may not see this entry.
    pub fn as_ref_only(&self) -> ApplicantRef {
        ApplicantRef {
            user: self.user.clone(),
        }
    }
}

/// Bare applicant reference: everything except the user id is withheld.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ApplicantRef {
    pub user: UserId,
}

/// What a given caller is allowed to see of an applicant entry.
///
/// The job owner sees `Full` for everyone; any other caller sees `Full`
/// only for their own entry and `Redacted` for the rest.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum ApplicantView {
    Full(Applicant),
    Redacted(ApplicantRef),
}

/// A job posting owned by exactly one organization.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JobAd {
    pub id: JobAdId,

    /// Owning organization profile ID
    pub organization: String,

    pub title: String,
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_max: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(default)]
    pub status: JobAdStatus,

    /// Embedded applicants keyed by the applying user's id, which makes
    /// the one-application-per-user invariant a map property and the
    /// existence check O(1).
    #[serde(default)]
    pub applicants: HashMap<String, Applicant>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobAd {
    /// Create a new open job ad with no applicants.
    pub fn new(
        organization: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: JobAdId::new(),
            organization: organization.into(),
            title: title.into(),
            description: description.into(),
            location: None,
            employment_type: None,
            salary_min: None,
            salary_max: None,
            currency: None,
            status: JobAdStatus::Open,
            applicants: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the given user already has an application on this ad.
    pub fn has_applicant(&self, user: &UserId) -> bool {
        self.applicants.contains_key(user.as_str())
    }

    /// The given user's own application, if any.
    pub fn applicant_for(&self, user: &UserId) -> Option<&Applicant> {
        self.applicants.get(user.as_str())
    }

    /// Applicant entries as seen by `caller`. The owning organization
    /// passes `is_owner = true` and sees everything; everyone else sees
    /// only their own entry in full.
    pub fn applicant_views(&self, caller: &UserId, is_owner: bool) -> Vec<ApplicantView> {
        let mut views: Vec<ApplicantView> = self
            .applicants
            .values()
            .map(|a| {
                if is_owner || &a.user == caller {
                    ApplicantView::Full(a.clone())
                } else {
                    ApplicantView::Redacted(a.as_ref_only())
                }
            })
            .collect();
        // Deterministic order for API responses
        views.sort_by(|a, b| view_key(a).cmp(view_key(b)));
        views
    }

    /// Applicants currently at `status`, oldest application first.
    pub fn applicants_with_status(&self, status: ApplicantStatus) -> Vec<&Applicant> {
        let mut matching: Vec<&Applicant> = self
            .applicants
            .values()
            .filter(|a| a.status == status)
            .collect();
        matching.sort_by_key(|a| a.applied_at);
        matching
    }
}

fn view_key(view: &ApplicantView) -> &str {
    match view {
        ApplicantView::Full(a) => a.user.as_str(),
        ApplicantView::Redacted(r) => r.user.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_with_applicants() -> (JobAd, UserId, UserId) {
        let mut job = JobAd::new("org-1", "Backend Engineer", "Rust services");
        let alice = UserId::from_string("alice");
        let bob = UserId::from_string("bob");
        job.applicants.insert(
            alice.as_str().to_string(),
            Applicant::new(alice.clone(), "Hi", None),
        );
        job.applicants.insert(
            bob.as_str().to_string(),
            Applicant::new(bob.clone(), "Hello", None),
        );
        (job, alice, bob)
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        assert_eq!(ApplicantStatus::parse("shortlisted"), Some(ApplicantStatus::Shortlisted));
        assert_eq!(ApplicantStatus::parse("hired"), None);
        assert_eq!(ApplicantStatus::parse("Pending"), None);
    }

    #[test]
    fn test_one_application_per_user() {
        let (job, alice, _) = job_with_applicants();
        // The existence check that turns a second apply into a conflict
        assert!(job.has_applicant(&alice));
        assert!(!job.has_applicant(&UserId::from_string("carol")));
        assert_eq!(job.applicant_for(&alice).unwrap().user, alice);
        assert!(job.applicant_for(&UserId::from_string("carol")).is_none());
    }

    #[test]
    fn test_applicant_starts_pending_with_audit_entry() {
        let a = Applicant::new(UserId::from_string("u1"), "Hi", None);
        assert_eq!(a.status, ApplicantStatus::Pending);
        assert_eq!(a.history.len(), 1);
        assert_eq!(a.history[0].event, "applied");
    }

    #[test]
    fn test_set_status_appends_history() {
        let mut a = Applicant::new(UserId::from_string("u1"), "Hi", None);
        a.set_status(ApplicantStatus::Shortlisted);
        assert_eq!(a.status, ApplicantStatus::Shortlisted);
        assert_eq!(a.history.last().unwrap().event, "status:shortlisted");
    }

    #[test]
    fn test_owner_sees_all_applicants_in_full() {
        let (job, _, _) = job_with_applicants();
        let owner_caller = UserId::from_string("org-owner");
        let views = job.applicant_views(&owner_caller, true);
        assert!(views.iter().all(|v| matches!(v, ApplicantView::Full(_))));
    }

    #[test]
    fn test_non_owner_sees_only_own_entry_in_full() {
        let (job, alice, bob) = job_with_applicants();
        let views = job.applicant_views(&alice, false);
        for view in views {
            match view {
                ApplicantView::Full(a) => assert_eq!(a.user, alice),
                ApplicantView::Redacted(r) => assert_eq!(r.user, bob),
            }
        }
    }

    #[test]
    fn test_redacted_serialization_is_bare() {
        let a = Applicant::new(UserId::from_string("u1"), "secret letter", None);
        let json = serde_json::to_value(ApplicantView::Redacted(a.as_ref_only())).unwrap();
        assert_eq!(json, serde_json::json!({"user": "u1"}));
    }

    #[test]
    fn test_applicants_with_status_filters() {
        let (mut job, alice, _) = job_with_applicants();
        job.applicants
            .get_mut(alice.as_str())
            .unwrap()
            .set_status(ApplicantStatus::Selected);
        let selected = job.applicants_with_status(ApplicantStatus::Selected);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].user, alice);
        assert_eq!(job.applicants_with_status(ApplicantStatus::Pending).len(), 1);
    }
}
