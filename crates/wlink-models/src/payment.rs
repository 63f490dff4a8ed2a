//! Payment gateway mirror records and subscription plans.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::user::UserId;

/// Lifecycle of a one-off payment as mirrored from the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Created,
    Captured,
    Failed,
    Refunded,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Created => "created",
            TransactionStatus::Captured => "captured",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(TransactionStatus::Created),
            "captured" => Some(TransactionStatus::Captured),
            "failed" => Some(TransactionStatus::Failed),
            "refunded" => Some(TransactionStatus::Refunded),
            _ => None,
        }
    }
}

/// Local mirror of one gateway payment.
///
/// The document id is the gateway payment id, which is what makes a
/// replayed callback an upsert instead of a duplicate row.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Transaction {
    /// Gateway payment id (doubles as the idempotency key)
    pub payment_id: String,
    pub order_id: String,
    pub user: UserId,
    /// Amount in minor currency units
    pub amount_minor: i64,
    pub currency: String,
    #[serde(default)]
    pub status: TransactionStatus,
    /// Whether the callback signature checked out
    #[serde(default)]
    pub signature_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle of a gateway subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Created,
    Active,
    Halted,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Created => "created",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Halted => "halted",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(SubscriptionStatus::Created),
            "active" => Some(SubscriptionStatus::Active),
            "halted" => Some(SubscriptionStatus::Halted),
            "cancelled" => Some(SubscriptionStatus::Cancelled),
            _ => None,
        }
    }
}

/// Local mirror of one gateway subscription.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SubscriptionTransaction {
    /// Gateway subscription id
    pub subscription_id: String,
    pub user: UserId,
    pub plan_id: String,
    #[serde(default)]
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Billing period for a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlanPeriod {
    Monthly,
    Yearly,
}

impl PlanPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanPeriod::Monthly => "monthly",
            PlanPeriod::Yearly => "yearly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monthly" => Some(PlanPeriod::Monthly),
            "yearly" => Some(PlanPeriod::Yearly),
            _ => None,
        }
    }
}

/// A purchasable subscription plan.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Plan {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Price in minor currency units
    pub price_minor: i64,
    pub currency: String,
    pub period: PlanPeriod,
    #[serde(default)]
    pub features: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_status_round_trip() {
        for status in [
            TransactionStatus::Created,
            TransactionStatus::Captured,
            TransactionStatus::Failed,
            TransactionStatus::Refunded,
        ] {
            assert_eq!(TransactionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TransactionStatus::parse("settled"), None);
    }

    #[test]
    fn test_subscription_status_parse() {
        assert_eq!(SubscriptionStatus::parse("active"), Some(SubscriptionStatus::Active));
        assert_eq!(SubscriptionStatus::parse("paused"), None);
    }
}
