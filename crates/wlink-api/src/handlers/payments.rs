//! Payment handlers: orders, callbacks, subscriptions, plans.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use wlink_firestore::{PlanRepository, SubscriptionRepository, TransactionRepository};
use wlink_models::{
    Plan, SubscriptionStatus, SubscriptionTransaction, Transaction, TransactionStatus,
};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::auth::validate_payload;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(range(min = 1, message = "amount must be positive"))]
    pub amount_minor: i64,
    #[validate(length(equal = 3))]
    pub currency: String,
    pub plan_id: Option<String>,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub order_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
}

/// Create a gateway order for a one-off payment.
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateOrderRequest>,
) -> ApiResult<Json<OrderResponse>> {
    validate_payload(&request)?;

    if let Some(plan_id) = &request.plan_id {
        // Fail before the gateway call if the plan is bogus
        PlanRepository::new((*state.store).clone())
            .get(plan_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Plan"))?;
    }

    let receipt = format!("rcpt-{}", user.id.as_str());
    let order = state
        .payments
        .create_order(request.amount_minor, &request.currency, &receipt)
        .await?;

    Ok(Json(OrderResponse {
        order_id: order.id,
        amount_minor: order.amount,
        currency: order.currency,
        status: order.status,
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PaymentCallbackRequest {
    #[validate(length(min = 1))]
    pub order_id: String,
    #[validate(length(min = 1))]
    pub payment_id: String,
    #[validate(length(min = 1))]
    pub signature: String,
    #[validate(range(min = 1))]
    pub amount_minor: i64,
    #[validate(length(equal = 3))]
    pub currency: String,
    pub plan_id: Option<String>,
}

#[derive(Serialize)]
pub struct PaymentCallbackResponse {
    pub transaction: Transaction,
    /// True when this callback had already been mirrored
    pub duplicate: bool,
}

/// Gateway payment callback. The signature is HMAC-SHA256 over
/// `"{order_id}|{payment_id}"`; a mismatch rejects the callback. The
/// mirror record is keyed by payment id, so redelivery is a no-op.
pub async fn payment_callback(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<PaymentCallbackRequest>,
) -> ApiResult<Json<PaymentCallbackResponse>> {
    validate_payload(&request)?;

    if !state
        .payments
        .verify_signature(&request.order_id, &request.payment_id, &request.signature)
    {
        warn!(order_id = %request.order_id, "Payment callback signature mismatch");
        return Err(ApiError::validation("Payment signature mismatch"));
    }

    let transactions = TransactionRepository::new((*state.store).clone());

    if let Some(existing) = transactions.get(&request.payment_id).await? {
        info!(payment_id = %request.payment_id, "Duplicate payment callback ignored");
        return Ok(Json(PaymentCallbackResponse {
            transaction: existing,
            duplicate: true,
        }));
    }

    let transaction = Transaction {
        payment_id: request.payment_id,
        order_id: request.order_id,
        user: user.id.clone(),
        amount_minor: request.amount_minor,
        currency: request.currency,
        status: TransactionStatus::Captured,
        signature_verified: true,
        plan_id: request.plan_id,
        created_at: Utc::now(),
    };
    transactions.create(&transaction).await?;

    Ok(Json(PaymentCallbackResponse {
        transaction,
        duplicate: false,
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubscriptionRequest {
    #[validate(length(min = 1))]
    pub plan_id: String,
}

#[derive(Serialize)]
pub struct SubscriptionResponse {
    pub subscription: SubscriptionTransaction,
}

/// Create a gateway subscription on a plan and mirror it locally.
pub async fn create_subscription(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateSubscriptionRequest>,
) -> ApiResult<Json<SubscriptionResponse>> {
    validate_payload(&request)?;

    let plan = PlanRepository::new((*state.store).clone())
        .get(&request.plan_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Plan"))?;

    let gateway_sub = state
        .payments
        .create_subscription(&plan.id, &user.email, 12)
        .await?;

    let now = Utc::now();
    let subscription = SubscriptionTransaction {
        subscription_id: gateway_sub.id,
        user: user.id.clone(),
        plan_id: plan.id,
        status: SubscriptionStatus::parse(&gateway_sub.status)
            .unwrap_or(SubscriptionStatus::Created),
        created_at: now,
        updated_at: now,
    };
    SubscriptionRepository::new((*state.store).clone())
        .create(&subscription)
        .await?;

    Ok(Json(SubscriptionResponse { subscription }))
}

#[derive(Serialize)]
pub struct PlansResponse {
    pub plans: Vec<Plan>,
}

/// List purchasable plans.
pub async fn list_plans(State(state): State<AppState>) -> ApiResult<Json<PlansResponse>> {
    let plans = PlanRepository::new((*state.store).clone()).list().await?;
    Ok(Json(PlansResponse { plans }))
}

#[derive(Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
}

/// The caller's mirrored transactions, newest first.
pub async fn list_transactions(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<TransactionsResponse>> {
    let transactions = TransactionRepository::new((*state.store).clone())
        .list_for_user(&user.id)
        .await?;
    Ok(Json(TransactionsResponse { transactions }))
}
