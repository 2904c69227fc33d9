//! Repository for the `reports` table.

use sqlx::PgPool;
use vurp_core::types::DbId;

use crate::models::report::{CreateReport, Report, ReportListParams, UpdateReport};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, agency_id, client_id, author_id, title, period_start, period_end, \
                       investment, revenue, impressions, clicks, leads, conversions, notes, \
                       created_at, updated_at";

/// Provides CRUD operations for reports.
pub struct ReportRepo;

impl ReportRepo {
    /// Insert a new report, returning the created row.
    pub async fn create(
        pool: &PgPool,
        agency_id: DbId,
        author_id: DbId,
        input: &CreateReport,
    ) -> Result<Report, sqlx::Error> {
        let query = format!(
            "INSERT INTO reports
                (agency_id, client_id, author_id, title, period_start, period_end,
                 investment, revenue, impressions, clicks, leads, conversions, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(agency_id)
            .bind(input.client_id)
            .bind(author_id)
            .bind(&input.title)
            .bind(input.period_start)
            .bind(input.period_end)
            .bind(input.investment)
            .bind(input.revenue)
            .bind(input.impressions)
            .bind(input.clicks)
            .bind(input.leads)
            .bind(input.conversions)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    /// Find a report by ID within an agency.
    pub async fn find_by_id(
        pool: &PgPool,
        agency_id: DbId,
        id: DbId,
    ) -> Result<Option<Report>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reports WHERE id = $1 AND agency_id = $2");
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .bind(agency_id)
            .fetch_optional(pool)
            .await
    }

    /// Name of the report's client, including soft-deleted clients.
    pub async fn client_name(
        pool: &PgPool,
        agency_id: DbId,
        client_id: DbId,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT name FROM clients WHERE id = $1 AND agency_id = $2")
            .bind(client_id)
            .bind(agency_id)
            .fetch_optional(pool)
            .await
    }

    /// List reports newest period first, optionally for a single client.
    pub async fn list(
        pool: &PgPool,
        agency_id: DbId,
        params: &ReportListParams,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Report>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reports
             WHERE agency_id = $1 AND ($2::BIGINT IS NULL OR client_id = $2)
             ORDER BY period_end DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(agency_id)
            .bind(params.client_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update a report. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        agency_id: DbId,
        id: DbId,
        input: &UpdateReport,
    ) -> Result<Option<Report>, sqlx::Error> {
        let query = format!(
            "UPDATE reports SET
                title = COALESCE($3, title),
                period_start = COALESCE($4, period_start),
                period_end = COALESCE($5, period_end),
                investment = COALESCE($6, investment),
                revenue = COALESCE($7, revenue),
                impressions = COALESCE($8, impressions),
                clicks = COALESCE($9, clicks),
                leads = COALESCE($10, leads),
                conversions = COALESCE($11, conversions),
                notes = COALESCE($12, notes)
             WHERE id = $1 AND agency_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .bind(agency_id)
            .bind(&input.title)
            .bind(input.period_start)
            .bind(input.period_end)
            .bind(input.investment)
            .bind(input.revenue)
            .bind(input.impressions)
            .bind(input.clicks)
            .bind(input.leads)
            .bind(input.conversions)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a report. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, agency_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1 AND agency_id = $2")
            .bind(id)
            .bind(agency_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
