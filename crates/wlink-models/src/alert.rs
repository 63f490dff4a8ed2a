//! Auxiliary linking records: job alerts and recommendations.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::new_entity_id;
use crate::user::UserId;

/// A saved search that triggers notification mails for matching ads.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JobAlert {
    pub id: String,
    pub owner: UserId,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl JobAlert {
    pub fn new(owner: UserId, keywords: Vec<String>, locations: Vec<String>) -> Self {
        Self {
            id: new_entity_id(),
            owner,
            keywords,
            locations,
            created_at: Utc::now(),
        }
    }
}

/// A recommendation written by one user for a candidate.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Recommendation {
    pub id: String,
    pub candidate: UserId,
    pub recommender: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Recommendation {
    pub fn new(candidate: UserId, recommender: UserId, note: Option<String>) -> Self {
        Self {
            id: new_entity_id(),
            candidate,
            recommender,
            note,
            created_at: Utc::now(),
        }
    }
}
