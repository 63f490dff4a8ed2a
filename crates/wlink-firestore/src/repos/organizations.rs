//! Repository for organization profile documents.

use tracing::info;

use wlink_models::{OrganizationProfile, UserId};

use crate::client::StoreClient;
use crate::error::StoreResult;
use crate::types::{equals_filter, from_document, CollectionSelector, StructuredQuery, Value};

const COLLECTION: &str = "organization_profiles";

/// Repository for the `organization_profiles` collection.
pub struct OrganizationRepository {
    client: StoreClient,
}

impl OrganizationRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &str) -> StoreResult<Option<OrganizationProfile>> {
        super::fetch(&self.client, COLLECTION, id).await
    }

    /// Get the profile owned by a user account.
    pub async fn get_by_user(&self, user: &UserId) -> StoreResult<Option<OrganizationProfile>> {
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

    pub async fn create(&self, profile: &OrganizationProfile) -> StoreResult<()> {
        super::insert(&self.client, COLLECTION, &profile.id, profile).await?;
        info!("Created organization profile {} ({})", profile.id, profile.name);
        Ok(())
    }

    pub async fn update(&self, profile: &OrganizationProfile) -> StoreResult<()> {
        super::replace(&self.client, COLLECTION, &profile.id, profile).await
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        self.client.delete_document(COLLECTION, id).await
    }
}
