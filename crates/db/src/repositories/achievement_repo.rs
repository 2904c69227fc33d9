//! Repository for the `user_achievements` table and the counters that feed it.

use sqlx::PgPool;
use vurp_core::achievements::AchievementCounters;
use vurp_core::types::DbId;

use crate::models::achievement::UserAchievement;

const COLUMNS: &str = "id, user_id, achievement_key, unlocked_at";

/// Row shape of [`AchievementRepo::counters`].
#[derive(sqlx::FromRow)]
struct CounterRow {
    clients_managed: i64,
    reports_authored: i64,
    checklist_items_done: i64,
    usage_seconds: i64,
    converted_referrals: i64,
}

pub struct AchievementRepo;

impl AchievementRepo {
    /// Achievements the user has unlocked, oldest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<UserAchievement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_achievements
             WHERE user_id = $1
             ORDER BY unlocked_at ASC, id ASC"
        );
        sqlx::query_as::<_, UserAchievement>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Record an unlock. A concurrent duplicate surfaces as a unique
    /// violation on `uq_user_achievements_user_key`.
    pub async fn insert(
        pool: &PgPool,
        user_id: DbId,
        key: &str,
    ) -> Result<UserAchievement, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_achievements (user_id, achievement_key)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserAchievement>(&query)
            .bind(user_id)
            .bind(key)
            .fetch_one(pool)
            .await
    }

    /// Snapshot every counter the catalog is measured against.
    pub async fn counters(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<AchievementCounters, sqlx::Error> {
        let row = sqlx::query_as::<_, CounterRow>(
            "SELECT
                (SELECT COUNT(*) FROM clients
                  WHERE manager_id = $1 AND deleted_at IS NULL) AS clients_managed,
                (SELECT COUNT(*) FROM reports WHERE author_id = $1) AS reports_authored,
                (SELECT COUNT(*) FROM checklist_items
                  WHERE done_by = $1 AND is_done) AS checklist_items_done,
                (SELECT COALESCE(SUM(duration_secs), 0)::BIGINT FROM usage_sessions
                  WHERE user_id = $1) AS usage_seconds,
                (SELECT COUNT(*) FROM referrals
                  WHERE referrer_user_id = $1 AND status = 'converted') AS converted_referrals",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(AchievementCounters {
            clients_managed: row.clients_managed,
            reports_authored: row.reports_authored,
            checklist_items_done: row.checklist_items_done,
            usage_seconds: row.usage_seconds,
            converted_referrals: row.converted_referrals,
        })
    }
}
