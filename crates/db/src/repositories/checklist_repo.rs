//! Repository for the `checklists` and `checklist_items` tables.
//!
//! Items carry no agency column; every item query joins through its parent
//! checklist so tenancy is enforced in SQL.

use sqlx::PgPool;
use vurp_core::types::DbId;

use crate::models::checklist::{
    Checklist, ChecklistItem, ChecklistListParams, ChecklistOverview, CreateChecklist,
    CreateChecklistItem, UpdateChecklist, UpdateChecklistItem,
};

/// Column list shared across checklist queries.
const COLUMNS: &str = "id, agency_id, client_id, title, created_by, created_at, updated_at";

/// Column list shared across item queries, qualified for joins.
const ITEM_COLUMNS: &str = "i.id, i.checklist_id, i.label, i.is_done, i.done_at, i.done_by, \
                            i.sort_order, i.created_at, i.updated_at";

pub struct ChecklistRepo;

impl ChecklistRepo {
    /// Create a checklist and seed it with `items` in one transaction.
    pub async fn create_with_items(
        pool: &PgPool,
        agency_id: DbId,
        created_by: DbId,
        input: &CreateChecklist,
        items: &[&str],
    ) -> Result<Checklist, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO checklists (agency_id, client_id, title, created_by)
             VALUES ($1, $2, btrim($3), $4)
             RETURNING {COLUMNS}"
        );
        let checklist = sqlx::query_as::<_, Checklist>(&query)
            .bind(agency_id)
            .bind(input.client_id)
            .bind(&input.title)
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await?;

        for (position, label) in items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO checklist_items (checklist_id, label, sort_order)
                 VALUES ($1, $2, $3)",
            )
            .bind(checklist.id)
            .bind(*label)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(checklist)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        agency_id: DbId,
        id: DbId,
    ) -> Result<Option<Checklist>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM checklists WHERE id = $1 AND agency_id = $2");
        sqlx::query_as::<_, Checklist>(&query)
            .bind(id)
            .bind(agency_id)
            .fetch_optional(pool)
            .await
    }

    /// List checklists with their item counts.
    pub async fn list_overview(
        pool: &PgPool,
        agency_id: DbId,
        params: &ChecklistListParams,
    ) -> Result<Vec<ChecklistOverview>, sqlx::Error> {
        sqlx::query_as::<_, ChecklistOverview>(
            "SELECT c.id, c.client_id, c.title, c.created_at,
                    COUNT(i.id) AS items_total,
                    COUNT(i.id) FILTER (WHERE i.is_done) AS items_done
             FROM checklists c
             LEFT JOIN checklist_items i ON i.checklist_id = c.id
             WHERE c.agency_id = $1 AND ($2::BIGINT IS NULL OR c.client_id = $2)
             GROUP BY c.id
             ORDER BY c.created_at DESC, c.id DESC",
        )
        .bind(agency_id)
        .bind(params.client_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        agency_id: DbId,
        id: DbId,
        input: &UpdateChecklist,
    ) -> Result<Option<Checklist>, sqlx::Error> {
        let query = format!(
            "UPDATE checklists SET
                title = COALESCE(btrim($3), title),
                client_id = COALESCE($4, client_id)
             WHERE id = $1 AND agency_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Checklist>(&query)
            .bind(id)
            .bind(agency_id)
            .bind(&input.title)
            .bind(input.client_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a checklist and, by cascade, its items.
    pub async fn delete(pool: &PgPool, agency_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM checklists WHERE id = $1 AND agency_id = $2")
            .bind(id)
            .bind(agency_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    /// Items of a checklist in display order.
    pub async fn list_items(
        pool: &PgPool,
        agency_id: DbId,
        checklist_id: DbId,
    ) -> Result<Vec<ChecklistItem>, sqlx::Error> {
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM checklist_items i
             JOIN checklists c ON c.id = i.checklist_id
             WHERE i.checklist_id = $1 AND c.agency_id = $2
             ORDER BY i.sort_order ASC, i.id ASC"
        );
        sqlx::query_as::<_, ChecklistItem>(&query)
            .bind(checklist_id)
            .bind(agency_id)
            .fetch_all(pool)
            .await
    }

    /// Append an item. When no sort order is given it goes after the last item.
    pub async fn add_item(
        pool: &PgPool,
        checklist_id: DbId,
        input: &CreateChecklistItem,
    ) -> Result<ChecklistItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO checklist_items AS i (checklist_id, label, sort_order)
             VALUES ($1, btrim($2), COALESCE($3,
                 (SELECT COALESCE(MAX(sort_order) + 1, 0)
                  FROM checklist_items WHERE checklist_id = $1)))
             RETURNING {ITEM_COLUMNS}"
        );
        sqlx::query_as::<_, ChecklistItem>(&query)
            .bind(checklist_id)
            .bind(&input.label)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    /// Update an item. Marking it done stamps `done_at`/`done_by`; marking it
    /// undone clears both.
    pub async fn update_item(
        pool: &PgPool,
        agency_id: DbId,
        checklist_id: DbId,
        item_id: DbId,
        user_id: DbId,
        input: &UpdateChecklistItem,
    ) -> Result<Option<ChecklistItem>, sqlx::Error> {
        let query = format!(
            "UPDATE checklist_items AS i SET
                label = COALESCE(btrim($4), i.label),
                sort_order = COALESCE($5, i.sort_order),
                is_done = COALESCE($6, i.is_done),
                done_at = CASE
                    WHEN $6 IS NULL THEN i.done_at
                    WHEN $6 AND NOT i.is_done THEN NOW()
                    WHEN $6 THEN i.done_at
                    ELSE NULL END,
                done_by = CASE
                    WHEN $6 IS NULL THEN i.done_by
                    WHEN $6 AND NOT i.is_done THEN $7
                    WHEN $6 THEN i.done_by
                    ELSE NULL END
             FROM checklists c
             WHERE i.id = $1 AND i.checklist_id = $2
               AND c.id = i.checklist_id AND c.agency_id = $3
             RETURNING {ITEM_COLUMNS}"
        );
        sqlx::query_as::<_, ChecklistItem>(&query)
            .bind(item_id)
            .bind(checklist_id)
            .bind(agency_id)
            .bind(&input.label)
            .bind(input.sort_order)
            .bind(input.is_done)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete_item(
        pool: &PgPool,
        agency_id: DbId,
        checklist_id: DbId,
        item_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM checklist_items i
             USING checklists c
             WHERE i.id = $1 AND i.checklist_id = $2
               AND c.id = i.checklist_id AND c.agency_id = $3",
        )
        .bind(item_id)
        .bind(checklist_id)
        .bind(agency_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
