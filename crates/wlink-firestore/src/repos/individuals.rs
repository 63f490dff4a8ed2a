//! Repository for individual (candidate) profile documents.

use std::collections::HashMap;

use chrono::Utc;
use tracing::info;

use wlink_models::{IndividualProfile, UserId};

use crate::client::StoreClient;
use crate::error::StoreResult;
use crate::types::{
    equals_filter, from_document, to_field, CollectionSelector, StructuredQuery, Value, Write,
};

pub(crate) const COLLECTION: &str = "individual_profiles";

/// Repository for the `individual_profiles` collection.
pub struct IndividualRepository {
    client: StoreClient,
}

impl IndividualRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &str) -> StoreResult<Option<IndividualProfile>> {
        super::fetch(&self.client, COLLECTION, id).await
    }

    /// Get the profile owned by a user account.
    pub async fn get_by_user(&self, user: &UserId) -> StoreResult<Option<IndividualProfile>> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: COLLECTION.to_string(),
                all_descendants: None,
            }],
            r#where: Some(equals_filter(
                "user",
                Value::StringValue(user.as_str().to_string()),
            )),
            order_by: None,
            limit: Some(1),
        };

        let docs = self.client.run_query(query).await?;
        match docs.first() {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, profile: &IndividualProfile) -> StoreResult<()> {
        super::insert(&self.client, COLLECTION, &profile.id, profile).await?;
        info!("Created individual profile {} for {}", profile.id, profile.user);
        Ok(())
    }

    /// Replace the whole profile document (sub-entity CRUD saves the
    /// parent document, last write wins).
    pub async fn update(&self, profile: &IndividualProfile) -> StoreResult<()> {
        super::replace(&self.client, COLLECTION, &profile.id, profile).await
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        self.client.delete_document(COLLECTION, id).await
    }

    /// Masked write touching only the job activity lists and the resume
    /// library, for use inside an atomic batch together with a job ad
    /// write.
    pub fn activity_write(&self, profile: &IndividualProfile) -> StoreResult<Write> {
        let mut fields = HashMap::new();
        fields.insert(
            "job_activity".to_string(),
            to_field(&profile.job_activity)?,
        );
        fields.insert("resumes".to_string(), to_field(&profile.resumes)?);
        fields.insert("updated_at".to_string(), to_field(&Utc::now())?);

        Ok(Write::masked_update(
            self.client.full_document_name(COLLECTION, &profile.id),
            fields,
            vec![
                "job_activity".to_string(),
                "resumes".to_string(),
                "updated_at".to_string(),
            ],
        ))
    }
}
