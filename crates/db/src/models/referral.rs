//! Referral model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use vurp_core::referral::RewardProgress;
use vurp_core::types::{DbId, Timestamp};

/// A row from the `referrals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Referral {
    pub id: DbId,
    pub referrer_user_id: DbId,
    pub referred_email: String,
    pub referred_user_id: Option<DbId>,
    pub status: String,
    pub created_at: Timestamp,
    pub converted_at: Option<Timestamp>,
}

/// Body of `POST /referrals`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReferral {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
}

/// Per-status counts for one referrer.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct ReferralCounts {
    pub total: i64,
    pub signed_up: i64,
    pub converted: i64,
}

/// Response of `GET /referrals/summary`.
#[derive(Debug, Clone, Serialize)]
pub struct ReferralSummary {
    pub referral_code: String,
    pub total: i64,
    pub signed_up: i64,
    pub converted: i64,
    #[serde(flatten)]
    pub rewards: RewardProgress,
}
