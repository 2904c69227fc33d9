//! Repository for the `usage_sessions` table.
//!
//! Duration updates are monotonic: a late or replayed heartbeat can never
//! shrink a session, and no session grows past
//! [`MAX_SESSION_SECS`](vurp_core::usage_tracking::MAX_SESSION_SECS).

use sqlx::PgPool;
use vurp_core::types::DbId;
use vurp_core::usage_tracking::MAX_SESSION_SECS;

use crate::models::usage_session::{UsageSession, UsageStats};

const COLUMNS: &str = "id, user_id, started_at, last_seen_at, duration_secs, ended_at, user_agent";

pub struct UsageSessionRepo;

impl UsageSessionRepo {
    pub async fn start(
        pool: &PgPool,
        user_id: DbId,
        user_agent: Option<&str>,
    ) -> Result<UsageSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO usage_sessions (user_id, user_agent)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UsageSession>(&query)
            .bind(user_id)
            .bind(user_agent)
            .fetch_one(pool)
            .await
    }

    /// Raise the duration of an open session owned by `user_id`.
    ///
    /// Returns `None` when the session does not exist, belongs to someone
    /// else, or has already ended.
    pub async fn update_duration(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
        duration_secs: i64,
    ) -> Result<Option<UsageSession>, sqlx::Error> {
        let query = format!(
            "UPDATE usage_sessions SET
                duration_secs = LEAST(GREATEST(duration_secs, $3), $4),
                last_seen_at = NOW()
             WHERE id = $1 AND user_id = $2 AND ended_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UsageSession>(&query)
            .bind(id)
            .bind(user_id)
            .bind(duration_secs)
            .bind(MAX_SESSION_SECS)
            .fetch_optional(pool)
            .await
    }

    /// Final duration update that also closes the session.
    pub async fn end(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
        duration_secs: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE usage_sessions SET
                duration_secs = LEAST(GREATEST(duration_secs, $3), $4),
                last_seen_at = NOW(),
                ended_at = NOW()
             WHERE id = $1 AND user_id = $2 AND ended_at IS NULL",
        )
        .bind(id)
        .bind(user_id)
        .bind(duration_secs)
        .bind(MAX_SESSION_SECS)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// End every open session not heard from in `stale_mins` minutes.
    /// `ended_at` is set to the last heartbeat, not the reap time.
    pub async fn close_stale(pool: &PgPool, stale_mins: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE usage_sessions SET ended_at = last_seen_at
             WHERE ended_at IS NULL
               AND last_seen_at < NOW() - make_interval(mins => $1::INT)",
        )
        .bind(stale_mins)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Totals for a user, optionally limited to the last `days` days.
    pub async fn stats(
        pool: &PgPool,
        user_id: DbId,
        days: Option<i64>,
    ) -> Result<UsageStats, sqlx::Error> {
        sqlx::query_as::<_, UsageStats>(
            "SELECT COALESCE(SUM(duration_secs), 0)::BIGINT AS total_secs,
                    COUNT(*) AS session_count
             FROM usage_sessions
             WHERE user_id = $1
               AND ($2::BIGINT IS NULL OR started_at >= NOW() - make_interval(days => $2::INT))",
        )
        .bind(user_id)
        .bind(days)
        .fetch_one(pool)
        .await
    }
}
