//! Checklist and checklist item models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vurp_core::checklist::ChecklistProgress;
use vurp_core::types::{DbId, Timestamp};

/// A checklist row from the `checklists` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Checklist {
    pub id: DbId,
    pub agency_id: DbId,
    pub client_id: Option<DbId>,
    pub title: String,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `checklist_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChecklistItem {
    pub id: DbId,
    pub checklist_id: DbId,
    pub label: String,
    pub is_done: bool,
    pub done_at: Option<Timestamp>,
    pub done_by: Option<DbId>,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Checklist list entry with item counts.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChecklistOverview {
    pub id: DbId,
    pub client_id: Option<DbId>,
    pub title: String,
    pub created_at: Timestamp,
    pub items_total: i64,
    pub items_done: i64,
}

/// Checklist with its items and progress.
#[derive(Debug, Clone, Serialize)]
pub struct ChecklistDetail {
    pub checklist: Checklist,
    pub items: Vec<ChecklistItem>,
    pub progress: ChecklistProgress,
}

/// DTO for creating a new checklist.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateChecklist {
    pub title: String,
    pub client_id: Option<DbId>,
    /// Seed items from a built-in template.
    pub template: Option<String>,
}

/// DTO for updating a checklist.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateChecklist {
    pub title: Option<String>,
    pub client_id: Option<DbId>,
}

/// DTO for adding an item.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateChecklistItem {
    pub label: String,
    pub sort_order: Option<i32>,
}

/// DTO for updating an item. `is_done` toggles completion.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateChecklistItem {
    pub label: Option<String>,
    pub is_done: Option<bool>,
    pub sort_order: Option<i32>,
}

/// Query parameters for `GET /checklists`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChecklistListParams {
    pub client_id: Option<DbId>,
}
