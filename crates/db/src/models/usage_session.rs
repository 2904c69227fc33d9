//! Usage session model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vurp_core::types::{DbId, Timestamp};

/// A row from the `usage_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UsageSession {
    pub id: DbId,
    pub user_id: DbId,
    pub started_at: Timestamp,
    pub last_seen_at: Timestamp,
    pub duration_secs: i64,
    pub ended_at: Option<Timestamp>,
    pub user_agent: Option<String>,
}

/// Body of `PATCH /usage-sessions/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DurationUpdate {
    pub duration_secs: i64,
}

/// Aggregate usage for one user.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UsageStats {
    pub total_secs: i64,
    pub session_count: i64,
}
