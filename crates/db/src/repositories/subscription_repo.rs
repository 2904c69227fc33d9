//! Repository for the `subscriptions` and `stripe_webhook_events` tables.

use sqlx::{PgPool, Postgres, Transaction};
use vurp_core::billing::SubscriptionStatus;
use vurp_core::types::DbId;

use crate::models::subscription::{Subscription, UpsertSubscription};

const COLUMNS: &str = "id, agency_id, stripe_customer_id, stripe_subscription_id, plan, status, \
                       current_period_end, cancel_at_period_end, created_at, updated_at";

pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// Every agency starts on the free plan.
    pub async fn create_free_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        agency_id: DbId,
    ) -> Result<Subscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscriptions (agency_id) VALUES ($1) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(agency_id)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn find_by_agency(
        pool: &PgPool,
        agency_id: DbId,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions WHERE agency_id = $1");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(agency_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_customer(
        pool: &PgPool,
        stripe_customer_id: &str,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions WHERE stripe_customer_id = $1");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(stripe_customer_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or update the agency's subscription. `None` fields keep the
    /// stored value.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertSubscription,
    ) -> Result<Subscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscriptions AS s
                (agency_id, stripe_customer_id, stripe_subscription_id, plan, status,
                 current_period_end, cancel_at_period_end)
             VALUES ($1, $2, $3, COALESCE($4, 'free'), $5, $6, COALESCE($7, FALSE))
             ON CONFLICT ON CONSTRAINT uq_subscriptions_agency_id DO UPDATE SET
                stripe_customer_id = COALESCE(EXCLUDED.stripe_customer_id, s.stripe_customer_id),
                stripe_subscription_id =
                    COALESCE(EXCLUDED.stripe_subscription_id, s.stripe_subscription_id),
                plan = COALESCE($4, s.plan),
                status = EXCLUDED.status,
                current_period_end = COALESCE(EXCLUDED.current_period_end, s.current_period_end),
                cancel_at_period_end = COALESCE($7, s.cancel_at_period_end)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(input.agency_id)
            .bind(&input.stripe_customer_id)
            .bind(&input.stripe_subscription_id)
            .bind(input.plan.map(|p| p.as_str()))
            .bind(input.status.as_str())
            .bind(input.current_period_end)
            .bind(input.cancel_at_period_end)
            .fetch_one(pool)
            .await
    }

    /// Processor deleted the subscription: fall back to the free plan.
    pub async fn cancel_by_stripe_id(
        pool: &PgPool,
        stripe_subscription_id: &str,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!(
            "UPDATE subscriptions SET
                plan = 'free',
                status = $2,
                cancel_at_period_end = FALSE,
                stripe_subscription_id = NULL
             WHERE stripe_subscription_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(stripe_subscription_id)
            .bind(SubscriptionStatus::Canceled.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Set the status of the subscription with this processor id.
    pub async fn set_status_by_stripe_id(
        pool: &PgPool,
        stripe_subscription_id: &str,
        status: SubscriptionStatus,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!(
            "UPDATE subscriptions SET status = $2
             WHERE stripe_subscription_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(stripe_subscription_id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Record a webhook event id. Returns `false` when it was already seen.
    pub async fn record_webhook_event(
        pool: &PgPool,
        event_id: &str,
        event_type: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO stripe_webhook_events (event_id, event_type)
             VALUES ($1, $2)
             ON CONFLICT (event_id) DO NOTHING",
        )
        .bind(event_id)
        .bind(event_type)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Forget a webhook event so the processor's retry is handled again.
    pub async fn forget_webhook_event(pool: &PgPool, event_id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM stripe_webhook_events WHERE event_id = $1")
            .bind(event_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
