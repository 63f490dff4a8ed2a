//! Repository for job ad documents.
//!
//! Apply and withdraw touch two documents (the job ad and the
//! candidate's profile); both go through `commit_with_activity` so the
//! writes land in one atomic batch.

use std::collections::HashMap;

use chrono::Utc;
use tracing::info;

use wlink_models::{IndividualProfile, JobAd, JobAdId};

use crate::client::StoreClient;
use crate::error::StoreResult;
use crate::repos::individuals::IndividualRepository;
use crate::types::{to_field, Write};

const COLLECTION: &str = "job_ads";

/// Repository for the `job_ads` collection.
pub struct JobAdRepository {
    client: StoreClient,
}

impl JobAdRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &JobAdId) -> StoreResult<Option<JobAd>> {
        super::fetch(&self.client, COLLECTION, id.as_str()).await
    }

    /// Fetch several job ads; absent ids are skipped.
    pub async fn get_many(&self, ids: &[JobAdId]) -> StoreResult<Vec<JobAd>> {
        let mut ads = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(ad) = self.get(id).await? {
                ads.push(ad);
            }
        }
        Ok(ads)
    }

    pub async fn create(&self, job: &JobAd) -> StoreResult<()> {
        super::insert(&self.client, COLLECTION, job.id.as_str(), job).await?;
        info!("Created job ad {} for org {}", job.id, job.organization);
        Ok(())
    }

    pub async fn update(&self, job: &JobAd) -> StoreResult<()> {
        super::replace(&self.client, COLLECTION, job.id.as_str(), job).await
    }

    pub async fn delete(&self, id: &JobAdId) -> StoreResult<()> {
        self.client.delete_document(COLLECTION, id.as_str()).await
    }

    /// Masked write touching only the embedded applicant map.
    pub fn applicants_write(&self, job: &JobAd) -> StoreResult<Write> {
        let mut fields = HashMap::new();
        fields.insert("applicants".to_string(), to_field(&job.applicants)?);
        fields.insert("updated_at".to_string(), to_field(&Utc::now())?);

        Ok(Write::masked_update(
            self.client.full_document_name(COLLECTION, job.id.as_str()),
            fields,
            vec!["applicants".to_string(), "updated_at".to_string()],
        ))
    }

    /// Atomically commit a mutated applicant map together with the
    /// candidate's job activity lists. Either both documents change or
    /// neither does.
    pub async fn commit_with_activity(
        &self,
        job: &JobAd,
        profile: &IndividualProfile,
    ) -> StoreResult<()> {
        let individuals = IndividualRepository::new(self.client.clone());
        let writes = vec![
            self.applicants_write(job)?,
            individuals.activity_write(profile)?,
        ];
        self.client.batch_write(writes).await?;
        Ok(())
    }
}
