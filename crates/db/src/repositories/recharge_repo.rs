//! Repository for the `recharges` table.

use sqlx::PgPool;
use vurp_core::types::{Date, DbId};

use crate::models::recharge::{CreateRecharge, Recharge, RechargeListParams, UpdateRecharge};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, agency_id, client_id, platform, amount, due_date, status, \
                       completed_at, notes, created_at, updated_at";

/// Provides CRUD operations for scheduled ad-account recharges.
pub struct RechargeRepo;

impl RechargeRepo {
    pub async fn create(
        pool: &PgPool,
        agency_id: DbId,
        input: &CreateRecharge,
    ) -> Result<Recharge, sqlx::Error> {
        let query = format!(
            "INSERT INTO recharges (agency_id, client_id, platform, amount, due_date, notes)
             VALUES ($1, $2, COALESCE($3, 'meta'), $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Recharge>(&query)
            .bind(agency_id)
            .bind(input.client_id)
            .bind(&input.platform)
            .bind(input.amount)
            .bind(input.due_date)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        agency_id: DbId,
        id: DbId,
    ) -> Result<Option<Recharge>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM recharges WHERE id = $1 AND agency_id = $2");
        sqlx::query_as::<_, Recharge>(&query)
            .bind(id)
            .bind(agency_id)
            .fetch_optional(pool)
            .await
    }

    /// Calendar listing: recharges due in `[from, to]`, soonest first.
    pub async fn list(
        pool: &PgPool,
        agency_id: DbId,
        params: &RechargeListParams,
    ) -> Result<Vec<Recharge>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM recharges
             WHERE agency_id = $1
               AND ($2::DATE IS NULL OR due_date >= $2)
               AND ($3::DATE IS NULL OR due_date <= $3)
               AND ($4::TEXT IS NULL OR status = $4)
               AND ($5::BIGINT IS NULL OR client_id = $5)
             ORDER BY due_date ASC, id ASC"
        );
        sqlx::query_as::<_, Recharge>(&query)
            .bind(agency_id)
            .bind(params.from)
            .bind(params.to)
            .bind(&params.status)
            .bind(params.client_id)
            .fetch_all(pool)
            .await
    }

    /// Scheduled recharges due on or before `until`.
    pub async fn count_due(
        pool: &PgPool,
        agency_id: DbId,
        until: Date,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM recharges
             WHERE agency_id = $1 AND status = 'scheduled' AND due_date <= $2",
        )
        .bind(agency_id)
        .bind(until)
        .fetch_one(pool)
        .await
    }

    /// Update a recharge. Moving to `done` stamps `completed_at`; any other
    /// status clears it.
    pub async fn update(
        pool: &PgPool,
        agency_id: DbId,
        id: DbId,
        input: &UpdateRecharge,
    ) -> Result<Option<Recharge>, sqlx::Error> {
        let query = format!(
            "UPDATE recharges SET
                platform = COALESCE($3, platform),
                amount = COALESCE($4, amount),
                due_date = COALESCE($5, due_date),
                notes = COALESCE($7, notes),
                completed_at = CASE
                    WHEN $6::TEXT IS NULL THEN completed_at
                    WHEN $6 = 'done' THEN COALESCE(completed_at, NOW())
                    ELSE NULL END,
                status = COALESCE($6, status)
             WHERE id = $1 AND agency_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Recharge>(&query)
            .bind(id)
            .bind(agency_id)
            .bind(&input.platform)
            .bind(input.amount)
            .bind(input.due_date)
            .bind(&input.status)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Mark a recharge as done.
    pub async fn complete(
        pool: &PgPool,
        agency_id: DbId,
        id: DbId,
    ) -> Result<Option<Recharge>, sqlx::Error> {
        let query = format!(
            "UPDATE recharges SET
                status = 'done',
                completed_at = COALESCE(completed_at, NOW())
             WHERE id = $1 AND agency_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Recharge>(&query)
            .bind(id)
            .bind(agency_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, agency_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM recharges WHERE id = $1 AND agency_id = $2")
            .bind(id)
            .bind(agency_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
