//! Repository for the `error_reports` table.

use sqlx::PgPool;

use crate::models::error_report::{CreateErrorReport, ErrorGroup, ErrorReport};

const COLUMNS: &str = "id, user_id, fingerprint, kind, message, source, line, col, stack, url, \
                       user_agent, created_at";

pub struct ErrorReportRepo;

impl ErrorReportRepo {
    pub async fn insert(
        pool: &PgPool,
        input: &CreateErrorReport,
    ) -> Result<ErrorReport, sqlx::Error> {
        let query = format!(
            "INSERT INTO error_reports
                (user_id, fingerprint, kind, message, source, line, col, stack, url, user_agent)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ErrorReport>(&query)
            .bind(input.user_id)
            .bind(&input.fingerprint)
            .bind(&input.kind)
            .bind(&input.message)
            .bind(&input.source)
            .bind(input.line)
            .bind(input.col)
            .bind(&input.stack)
            .bind(&input.url)
            .bind(&input.user_agent)
            .fetch_one(pool)
            .await
    }

    /// Reports grouped by fingerprint, most recent group first.
    pub async fn list_groups(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ErrorGroup>, sqlx::Error> {
        sqlx::query_as::<_, ErrorGroup>(
            "SELECT fingerprint,
                    (ARRAY_AGG(message ORDER BY created_at DESC))[1] AS message,
                    COUNT(*) AS occurrences,
                    COUNT(DISTINCT user_id) AS affected_users,
                    MIN(created_at) AS first_seen,
                    MAX(created_at) AS last_seen
             FROM error_reports
             GROUP BY fingerprint
             ORDER BY last_seen DESC
             LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Individual reports for one fingerprint, newest first.
    pub async fn list_by_fingerprint(
        pool: &PgPool,
        fingerprint: &str,
        limit: i64,
    ) -> Result<Vec<ErrorReport>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM error_reports
             WHERE fingerprint = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, ErrorReport>(&query)
            .bind(fingerprint)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
