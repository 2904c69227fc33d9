//! Subscription model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use vurp_core::billing::{Plan, SubscriptionStatus};
use vurp_core::types::{DbId, Timestamp};

/// A row from the `subscriptions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: DbId,
    pub agency_id: DbId,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub plan: String,
    pub status: String,
    pub current_period_end: Option<Timestamp>,
    pub cancel_at_period_end: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Upsert DTO built from payment-processor webhook payloads.
///
/// `None` fields keep the stored value.
#[derive(Debug, Clone)]
pub struct UpsertSubscription {
    pub agency_id: DbId,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub plan: Option<Plan>,
    pub status: SubscriptionStatus,
    pub current_period_end: Option<Timestamp>,
    pub cancel_at_period_end: Option<bool>,
}
