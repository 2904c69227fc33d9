//! Unlocked achievement rows.

use serde::Serialize;
use sqlx::FromRow;
use vurp_core::types::{DbId, Timestamp};

/// A row from the `user_achievements` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserAchievement {
    pub id: DbId,
    pub user_id: DbId,
    pub achievement_key: String,
    pub unlocked_at: Timestamp,
}
