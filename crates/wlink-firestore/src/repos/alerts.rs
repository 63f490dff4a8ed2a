//! Repositories for job alerts and recommendations.

use wlink_models::{JobAlert, Recommendation, UserId};

use crate::client::StoreClient;
use crate::error::StoreResult;
use crate::types::{equals_filter, from_document, CollectionSelector, StructuredQuery, Value};

const ALERTS: &str = "job_alerts";
const RECOMMENDATIONS: &str = "recommendations";

fn owner_query(collection: &str, field: &str, user: &UserId) -> StructuredQuery {
    StructuredQuery {
        from: vec![CollectionSelector {
            collection_id: collection.to_string(),
            all_descendants: None,
        }],
        r#where: Some(equals_filter(
            field,
            Value::StringValue(user.as_str().to_string()),
        )),
        order_by: None,
        limit: Some(100),
    }
}

/// Repository for the `job_alerts` collection.
pub struct JobAlertRepository {
    client: StoreClient,
}

impl JobAlertRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &str) -> StoreResult<Option<JobAlert>> {
        super::fetch(&self.client, ALERTS, id).await
    }

    pub async fn create(&self, alert: &JobAlert) -> StoreResult<()> {
        super::insert(&self.client, ALERTS, &alert.id, alert).await
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        self.client.delete_document(ALERTS, id).await
    }

    pub async fn list_for_owner(&self, owner: &UserId) -> StoreResult<Vec<JobAlert>> {
        let docs = self.client.run_query(owner_query(ALERTS, "owner", owner)).await?;
        docs.iter().map(from_document).collect()
    }
}

/// Repository for the `recommendations` collection.
pub struct RecommendationRepository {
    client: StoreClient,
}

impl RecommendationRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, rec: &Recommendation) -> StoreResult<()> {
        super::insert(&self.client, RECOMMENDATIONS, &rec.id, rec).await
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        self.client.delete_document(RECOMMENDATIONS, id).await
    }

    pub async fn list_for_candidate(&self, candidate: &UserId) -> StoreResult<Vec<Recommendation>> {
        let docs = self
            .client
            .run_query(owner_query(RECOMMENDATIONS, "candidate", candidate))
            .await?;
        docs.iter().map(from_document).collect()
    }
}
