//! Repository for the `clients` table.

use sqlx::{PgPool, Postgres, Transaction};
use vurp_core::types::DbId;

use crate::models::client::{Client, ClientListParams, CreateClient, UpdateClient};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, agency_id, manager_id, name, company, email, phone, platform, \
                       status, monthly_budget, notes, created_at, updated_at";

/// Provides CRUD operations for clients. Soft-deleted rows are invisible.
pub struct ClientRepo;

impl ClientRepo {
    /// Insert a new client, returning the created row.
    pub async fn create(
        pool: &PgPool,
        agency_id: DbId,
        input: &CreateClient,
    ) -> Result<Client, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let client = Self::create_in_tx(&mut tx, agency_id, input).await?;
        tx.commit().await?;
        Ok(client)
    }

    /// Insert a new client inside an open transaction.
    pub async fn create_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        agency_id: DbId,
        input: &CreateClient,
    ) -> Result<Client, sqlx::Error> {
        let query = format!(
            "INSERT INTO clients
                (agency_id, manager_id, name, company, email, phone, platform, status,
                 monthly_budget, notes)
             VALUES ($1, $2, btrim($3), $4, $5, $6, COALESCE($7, 'meta'),
                     COALESCE($8, 'active'), COALESCE($9, 0), $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(agency_id)
            .bind(input.manager_id)
            .bind(&input.name)
            .bind(&input.company)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.platform)
            .bind(&input.status)
            .bind(input.monthly_budget)
            .bind(&input.notes)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a client by ID within an agency.
    pub async fn find_by_id(
        pool: &PgPool,
        agency_id: DbId,
        id: DbId,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM clients
             WHERE id = $1 AND agency_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .bind(agency_id)
            .fetch_optional(pool)
            .await
    }

    /// List clients with optional status, manager, and name/company search filters.
    pub async fn list(
        pool: &PgPool,
        agency_id: DbId,
        params: &ClientListParams,
        pattern: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Client>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM clients
             WHERE agency_id = $1
               AND deleted_at IS NULL
               AND ($2::TEXT IS NULL OR status = $2)
               AND ($3::BIGINT IS NULL OR manager_id = $3)
               AND ($4::TEXT IS NULL OR name ILIKE $4 OR company ILIKE $4)
             ORDER BY name ASC, id ASC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(agency_id)
            .bind(&params.status)
            .bind(params.manager_id)
            .bind(pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count active clients while holding the agency row lock.
    ///
    /// Concurrent callers for the same agency queue on the lock until the
    /// holder's transaction ends, so a count-then-insert cannot overshoot.
    pub async fn count_active_locked(
        tx: &mut Transaction<'_, Postgres>,
        agency_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query("SELECT id FROM agencies WHERE id = $1 FOR UPDATE")
            .bind(agency_id)
            .execute(&mut **tx)
            .await?;
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM clients
             WHERE agency_id = $1 AND deleted_at IS NULL AND status = 'active'",
        )
        .bind(agency_id)
        .fetch_one(&mut **tx)
        .await
    }

    /// Update a client. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        agency_id: DbId,
        id: DbId,
        input: &UpdateClient,
    ) -> Result<Option<Client>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let client = Self::update_in_tx(&mut tx, agency_id, id, input).await?;
        tx.commit().await?;
        Ok(client)
    }

    /// [`update`](Self::update) inside an open transaction.
    pub async fn update_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        agency_id: DbId,
        id: DbId,
        input: &UpdateClient,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!(
            "UPDATE clients SET
                name = COALESCE(btrim($3), name),
                manager_id = COALESCE($4, manager_id),
                company = COALESCE($5, company),
                email = COALESCE($6, email),
                phone = COALESCE($7, phone),
                platform = COALESCE($8, platform),
                status = COALESCE($9, status),
                monthly_budget = COALESCE($10, monthly_budget),
                notes = COALESCE($11, notes)
             WHERE id = $1 AND agency_id = $2 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .bind(agency_id)
            .bind(&input.name)
            .bind(input.manager_id)
            .bind(&input.company)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.platform)
            .bind(&input.status)
            .bind(input.monthly_budget)
            .bind(&input.notes)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Soft-delete a client. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, agency_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE clients SET deleted_at = NOW()
             WHERE id = $1 AND agency_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(agency_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
