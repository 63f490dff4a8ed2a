//! Organization (employer) profile document.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::job_ad::JobAdId;
use crate::new_entity_id;
use crate::user::UserId;

/// A member of the organization's hiring team. The wrapped account has
/// profile type OrganizationMember.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TeamMember {
    pub id: String,
    pub user: UserId,
    pub role: String,
    pub added_at: DateTime<Utc>,
}

/// A showcase project on the organization page.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OrgProject {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A labelled external link (careers page, social account, ...).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SocialLink {
    pub id: String,
    pub label: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Per-employer profile document, one-to-one with an OrganizationalUser
/// account.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OrganizationProfile {
    pub id: String,

    /// Owning user account
    pub user: UserId,

    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,

    /// Owned job ad references
    #[serde(default)]
    pub posted_job_ads: Vec<JobAdId>,

    #[serde(default)]
    pub team_members: HashMap<String, TeamMember>,
    #[serde(default)]
    pub projects: HashMap<String, OrgProject>,
    #[serde(default)]
    pub social_links: HashMap<String, SocialLink>,

    #[serde(default)]
    pub saved_candidates: Vec<UserId>,
    #[serde(default)]
    pub candidate_followers: Vec<UserId>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrganizationProfile {
    pub fn new(user: UserId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_entity_id(),
            user,
            name: name.into(),
            about: None,
            website: None,
            industry: None,
            posted_job_ads: Vec::new(),
            team_members: HashMap::new(),
            projects: HashMap::new(),
            social_links: HashMap::new(),
            saved_candidates: Vec::new(),
            candidate_followers: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Record ownership of a newly posted job ad.
    pub fn add_posted_job(&mut self, job: JobAdId) {
        if !self.posted_job_ads.contains(&job) {
            self.posted_job_ads.push(job);
        }
    }

    /// Save a candidate for later. Returns false if already saved.
    pub fn save_candidate(&mut self, candidate: UserId) -> bool {
        if self.saved_candidates.contains(&candidate) {
            return false;
        }
        self.saved_candidates.push(candidate);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_posted_job_dedupes() {
        let mut org = OrganizationProfile::new(UserId::from_string("u1"), "Acme");
        let job = JobAdId::from_string("j1");
        org.add_posted_job(job.clone());
        org.add_posted_job(job);
        assert_eq!(org.posted_job_ads.len(), 1);
    }

    #[test]
    fn test_save_candidate_reports_duplicates() {
        let mut org = OrganizationProfile::new(UserId::from_string("u1"), "Acme");
        let candidate = UserId::from_string("c1");
        assert!(org.save_candidate(candidate.clone()));
        assert!(!org.save_candidate(candidate));
    }
}
