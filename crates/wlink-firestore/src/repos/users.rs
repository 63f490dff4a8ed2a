//! Repository for account identity documents.

use tracing::info;

use wlink_models::{User, UserId};

use crate::client::StoreClient;
use crate::error::StoreResult;
use crate::types::{equals_filter, from_document, CollectionSelector, StructuredQuery, Value};

const COLLECTION: &str = "users";

/// Repository for the `users` collection.
pub struct UserRepository {
    client: StoreClient,
}

impl UserRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Get a user by id.
    pub async fn get(&self, id: &UserId) -> StoreResult<Option<User>> {
        super::fetch(&self.client, COLLECTION, id.as_str()).await
    }

    /// Look up a user by email. Emails are unique, so the first match wins.
    pub async fn get_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: COLLECTION.to_string(),
                all_descendants: None,
            }],
            r#where: Some(equals_filter("email", Value::StringValue(email.to_string()))),
            order_by: None,
            limit: Some(1),
        };

        let docs = self.client.run_query(query).await?;
        match docs.first() {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }

    /// Create a new account record.
    pub async fn create(&self, user: &User) -> StoreResult<()> {
        super::insert(&self.client, COLLECTION, user.id.as_str(), user).await?;
        info!("Created user record: {}", user.id);
        Ok(())
    }

    /// Replace an account record.
    pub async fn update(&self, user: &User) -> StoreResult<()> {
        super::replace(&self.client, COLLECTION, user.id.as_str(), user).await
    }

    /// Delete an account record.
    pub async fn delete(&self, id: &UserId) -> StoreResult<()> {
        self.client.delete_document(COLLECTION, id.as_str()).await
    }
}
