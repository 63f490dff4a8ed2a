//! Repositories for payment mirror records and plans.

use tracing::info;

use wlink_models::{Plan, SubscriptionTransaction, Transaction, UserId};

use crate::client::StoreClient;
use crate::error::StoreResult;
use crate::types::{
    equals_filter, from_document, CollectionSelector, FieldReference, Order, StructuredQuery,
    Value,
};

const TRANSACTIONS: &str = "transactions";
const SUBSCRIPTIONS: &str = "subscription_transactions";
const PLANS: &str = "plans";

/// Repository for the `transactions` collection.
///
/// Documents are keyed by the gateway payment id, so a replayed webhook
/// finds its existing mirror record instead of inserting a second one.
pub struct TransactionRepository {
    client: StoreClient,
}

impl TransactionRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, payment_id: &str) -> StoreResult<Option<Transaction>> {
        super::fetch(&self.client, TRANSACTIONS, payment_id).await
    }

    pub async fn create(&self, tx: &Transaction) -> StoreResult<()> {
        super::insert(&self.client, TRANSACTIONS, &tx.payment_id, tx).await?;
        info!(
            "Mirrored transaction {} (order {}) for {}",
            tx.payment_id, tx.order_id, tx.user
        );
        Ok(())
    }

    /// Transactions of one user, newest first.
    pub async fn list_for_user(&self, user: &UserId) -> StoreResult<Vec<Transaction>> {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: TRANSACTIONS.to_string(),
                all_descendants: None,
            }],
            r#where: Some(equals_filter(
                "user",
                Value::StringValue(user.as_str().to_string()),
            )),
            order_by: Some(vec![Order {
                field: FieldReference {
                    field_path: "created_at".to_string(),
                },
                direction: "DESCENDING".to_string(),
            }]),
            limit: Some(100),
        };

        let docs = self.client.run_query(query).await?;
        docs.iter().map(from_document).collect()
    }
}

/// Repository for the `subscription_transactions` collection.
pub struct SubscriptionRepository {
    client: StoreClient,
}

impl SubscriptionRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, subscription_id: &str) -> StoreResult<Option<SubscriptionTransaction>> {
        super::fetch(&self.client, SUBSCRIPTIONS, subscription_id).await
    }

    pub async fn create(&self, sub: &SubscriptionTransaction) -> StoreResult<()> {
        super::insert(&self.client, SUBSCRIPTIONS, &sub.subscription_id, sub).await
    }

    pub async fn update(&self, sub: &SubscriptionTransaction) -> StoreResult<()> {
        super::replace(&self.client, SUBSCRIPTIONS, &sub.subscription_id, sub).await
    }
}

/// Repository for the `plans` collection.
pub struct PlanRepository {
    client: StoreClient,
}

impl PlanRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &str) -> StoreResult<Option<Plan>> {
        super::fetch(&self.client, PLANS, id).await
    }

    pub async fn list(&self) -> StoreResult<Vec<Plan>> {
        let response = self.client.list_documents(PLANS, Some(100), None).await?;
        response
            .documents
            .unwrap_or_default()
            .iter()
            .map(from_document)
            .collect()
    }
}
