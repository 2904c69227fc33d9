//! Repository for the `referrals` table.
//!
//! A referral moves `invited` → `signed_up` when the invited address
//! registers with the referrer's code, and `signed_up` → `converted` when
//! that user's agency starts a paid subscription.

use sqlx::{PgPool, Postgres, Transaction};
use vurp_core::types::DbId;

use crate::models::referral::{Referral, ReferralCounts};

const COLUMNS: &str = "id, referrer_user_id, referred_email, referred_user_id, status, \
                       created_at, converted_at";

pub struct ReferralRepo;

impl ReferralRepo {
    pub async fn list_for_referrer(
        pool: &PgPool,
        referrer_user_id: DbId,
    ) -> Result<Vec<Referral>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM referrals
             WHERE referrer_user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Referral>(&query)
            .bind(referrer_user_id)
            .fetch_all(pool)
            .await
    }

    /// Invite an email address. A repeat invite for the same address
    /// violates `uq_referrals_referrer_email`.
    pub async fn create(
        pool: &PgPool,
        referrer_user_id: DbId,
        email: &str,
    ) -> Result<Referral, sqlx::Error> {
        let query = format!(
            "INSERT INTO referrals (referrer_user_id, referred_email)
             VALUES ($1, lower(btrim($2)))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Referral>(&query)
            .bind(referrer_user_id)
            .bind(email)
            .fetch_one(pool)
            .await
    }

    pub async fn counts(
        pool: &PgPool,
        referrer_user_id: DbId,
    ) -> Result<ReferralCounts, sqlx::Error> {
        sqlx::query_as::<_, ReferralCounts>(
            "SELECT COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE status = 'signed_up') AS signed_up,
                    COUNT(*) FILTER (WHERE status = 'converted') AS converted
             FROM referrals
             WHERE referrer_user_id = $1",
        )
        .bind(referrer_user_id)
        .fetch_one(pool)
        .await
    }

    /// Link a freshly registered user to the referrer's invite, creating the
    /// invite row when the user arrived through a shared link instead.
    pub async fn record_signup_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        referrer_user_id: DbId,
        email: &str,
        referred_user_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO referrals (referrer_user_id, referred_email, referred_user_id, status)
             VALUES ($1, lower(btrim($2)), $3, 'signed_up')
             ON CONFLICT ON CONSTRAINT uq_referrals_referrer_email DO UPDATE SET
                referred_user_id = EXCLUDED.referred_user_id,
                status = 'signed_up'
             WHERE referrals.status = 'invited'",
        )
        .bind(referrer_user_id)
        .bind(email)
        .bind(referred_user_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Convert every signed-up referral pointing at a user of `agency_id`.
    pub async fn convert_for_agency(pool: &PgPool, agency_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE referrals SET status = 'converted', converted_at = NOW()
             WHERE status = 'signed_up'
               AND referred_user_id IN (SELECT id FROM users WHERE agency_id = $1)",
        )
        .bind(agency_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
