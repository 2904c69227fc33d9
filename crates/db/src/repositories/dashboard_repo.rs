//! Aggregate queries behind the agency dashboard.

use sqlx::PgPool;
use vurp_core::types::{Date, DbId};

use crate::models::dashboard::{ClientCounts, ReportTotals};

pub struct DashboardRepo;

impl DashboardRepo {
    pub async fn client_counts(pool: &PgPool, agency_id: DbId) -> Result<ClientCounts, sqlx::Error> {
        sqlx::query_as::<_, ClientCounts>(
            "SELECT COUNT(*) FILTER (WHERE status = 'active') AS active,
                    COUNT(*) FILTER (WHERE status = 'paused') AS paused,
                    COUNT(*) FILTER (WHERE status = 'churned') AS churned
             FROM clients
             WHERE agency_id = $1 AND deleted_at IS NULL",
        )
        .bind(agency_id)
        .fetch_one(pool)
        .await
    }

    /// Report count and summed money figures for periods ending on or after
    /// `since`.
    pub async fn report_totals(
        pool: &PgPool,
        agency_id: DbId,
        since: Date,
    ) -> Result<ReportTotals, sqlx::Error> {
        sqlx::query_as::<_, ReportTotals>(
            "SELECT COUNT(*) AS report_count,
                    COALESCE(SUM(investment), 0)::DOUBLE PRECISION AS investment,
                    COALESCE(SUM(revenue), 0)::DOUBLE PRECISION AS revenue
             FROM reports
             WHERE agency_id = $1 AND period_end >= $2",
        )
        .bind(agency_id)
        .bind(since)
        .fetch_one(pool)
        .await
    }

    /// Open checklist items across the agency.
    pub async fn open_checklist_items(pool: &PgPool, agency_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM checklist_items i
             JOIN checklists c ON c.id = i.checklist_id
             WHERE c.agency_id = $1 AND NOT i.is_done",
        )
        .bind(agency_id)
        .fetch_one(pool)
        .await
    }
}
