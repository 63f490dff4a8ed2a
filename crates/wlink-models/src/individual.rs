//! Individual (candidate) profile document and its sub-entities.
//!
//! Every embedded family is a map keyed by a generated id, so lookups
//! during update/delete are O(1). List responses order by `created_at`.

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::job_ad::JobAdId;
use crate::media::MediaId;
use crate::new_entity_id;
use crate::user::UserId;

/// An education entry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Education {
    pub id: String,
    pub school: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_of_study: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A position held within an experience entry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Position {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An employment entry, nesting its positions one level deeper with the
/// same keyed-map pattern.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Experience {
    pub id: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub positions: HashMap<String, Position>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Skill {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proficiency: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Certification {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// A portfolio project. Link URLs are syntax-checked at the API edge.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Project {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Job ads the candidate has applied to or saved.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct JobActivity {
    #[serde(default)]
    pub applied: Vec<JobAdId>,
    #[serde(default)]
    pub saved: Vec<JobAdId>,
}

impl JobActivity {
    /// Record an application. Returns false if the job was already listed.
    pub fn add_applied(&mut self, job: JobAdId) -> bool {
        if self.applied.contains(&job) {
            return false;
        }
        self.applied.push(job);
        true
    }

    /// Drop a job from the applied list. Returns false if it wasn't there.
    pub fn remove_applied(&mut self, job: &JobAdId) -> bool {
        let before = self.applied.len();
        self.applied.retain(|j| j != job);
        self.applied.len() != before
    }

    /// Flip saved-membership for the job. Returns true if it is saved
    /// after the call.
    pub fn toggle_saved(&mut self, job: JobAdId) -> bool {
        if let Some(pos) = self.saved.iter().position(|j| j == &job) {
            self.saved.remove(pos);
            false
        } else {
            self.saved.push(job);
            true
        }
    }
}

/// Per-candidate profile document, one-to-one with an IndividualUser account.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IndividualProfile {
    /// Profile document ID
    pub id: String,

    /// Owning user account
    pub user: UserId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default)]
    pub education: HashMap<String, Education>,
    #[serde(default)]
    pub experience: HashMap<String, Experience>,
    #[serde(default)]
    pub skills: HashMap<String, Skill>,
    #[serde(default)]
    pub certifications: HashMap<String, Certification>,
    #[serde(default)]
    pub projects: HashMap<String, Project>,

    #[serde(default)]
    pub job_activity: JobActivity,

    #[serde(default)]
    pub resumes: Vec<MediaId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub intro_video: Option<MediaId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_resume: Option<MediaId>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IndividualProfile {
    /// Create an empty profile for a user.
    pub fn new(user: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: new_entity_id(),
            user,
            headline: None,
            summary: None,
            education: HashMap::new(),
            experience: HashMap::new(),
            skills: HashMap::new(),
            certifications: HashMap::new(),
            projects: HashMap::new(),
            job_activity: JobActivity::default(),
            resumes: Vec::new(),
            intro_video: None,
            video_resume: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Order a sub-entity map into the list form returned by the API.
pub fn ordered_by_creation<'a, T, F>(map: &'a HashMap<String, T>, created_at: F) -> Vec<&'a T>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    let mut items: Vec<&T> = map.values().collect();
    items.sort_by_key(|item| created_at(item));
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_applied_enforces_uniqueness() {
        let mut activity = JobActivity::default();
        let job = JobAdId::from_string("j1");
        assert!(activity.add_applied(job.clone()));
        assert!(!activity.add_applied(job.clone()));
        assert_eq!(activity.applied.len(), 1);
    }

    #[test]
    fn test_remove_applied_reports_absence() {
        let mut activity = JobActivity::default();
        let job = JobAdId::from_string("j1");
        assert!(!activity.remove_applied(&job));
        activity.add_applied(job.clone());
        assert!(activity.remove_applied(&job));
        assert!(activity.applied.is_empty());
    }

    #[test]
    fn test_toggle_saved_is_idempotent_over_two_calls() {
        let mut activity = JobActivity::default();
        let job = JobAdId::from_string("j1");
        let original = activity.saved.clone();
        assert!(activity.toggle_saved(job.clone()));
        assert!(!activity.toggle_saved(job.clone()));
        assert_eq!(activity.saved, original);
    }

    #[test]
    fn test_ordered_by_creation_sorts_map_values() {
        let mut skills = HashMap::new();
        for (i, name) in ["rust", "sql", "go"].iter().enumerate() {
            let skill = Skill {
                id: format!("s{}", i),
                name: name.to_string(),
                proficiency: None,
                created_at: Utc::now() + chrono::Duration::seconds(i as i64),
            };
            skills.insert(skill.id.clone(), skill);
        }
        let ordered = ordered_by_creation(&skills, |s| s.created_at);
        let names: Vec<&str> = ordered.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["rust", "sql", "go"]);
    }
}
