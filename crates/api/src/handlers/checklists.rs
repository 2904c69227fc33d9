//! Handlers for `/checklists` and their items.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use vurp_core::checklist::{progress, template_items};
use vurp_core::error::CoreError;
use vurp_core::types::DbId;
use vurp_db::models::checklist::{
    Checklist, ChecklistDetail, ChecklistItem, ChecklistListParams, ChecklistOverview,
    CreateChecklist, CreateChecklistItem, UpdateChecklist, UpdateChecklistItem,
};
use vurp_db::repositories::{ChecklistRepo, ClientRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{Created, DataResponse};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Checklist",
        id,
    })
}

fn require_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "{field} must not be empty"
        ))));
    }
    Ok(())
}

async fn ensure_client(state: &AppState, agency_id: DbId, client_id: Option<DbId>) -> AppResult<()> {
    if let Some(client_id) = client_id {
        if ClientRepo::find_by_id(&state.pool, agency_id, client_id)
            .await?
            .is_none()
        {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Client",
                id: client_id,
            }));
        }
    }
    Ok(())
}

async fn load_detail(state: &AppState, agency_id: DbId, id: DbId) -> AppResult<ChecklistDetail> {
    let checklist = ChecklistRepo::find_by_id(&state.pool, agency_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let items = ChecklistRepo::list_items(&state.pool, agency_id, id).await?;
    let done = items.iter().filter(|i| i.is_done).count() as i64;
    let progress = progress(done, items.len() as i64);
    Ok(ChecklistDetail {
        checklist,
        items,
        progress,
    })
}

/// POST /api/v1/checklists
///
/// Optionally seeds items from a named template.
pub async fn create_checklist(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateChecklist>,
) -> AppResult<Created<ChecklistDetail>> {
    require_text("title", &input.title)?;
    let items: &[&str] = match input.template.as_deref() {
        Some(name) => template_items(name)?,
        None => &[],
    };
    ensure_client(&state, auth.agency_id, input.client_id).await?;

    let checklist =
        ChecklistRepo::create_with_items(&state.pool, auth.agency_id, auth.user_id, &input, items)
            .await?;
    let detail = load_detail(&state, auth.agency_id, checklist.id).await?;
    Ok(Created(detail))
}

/// GET /api/v1/checklists
pub async fn list_checklists(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ChecklistListParams>,
) -> AppResult<Json<DataResponse<Vec<ChecklistOverview>>>> {
    let checklists = ChecklistRepo::list_overview(&state.pool, auth.agency_id, &params).await?;
    Ok(Json(DataResponse { data: checklists }))
}

/// GET /api/v1/checklists/{id}
pub async fn get_checklist(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ChecklistDetail>>> {
    let detail = load_detail(&state, auth.agency_id, id).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// PUT /api/v1/checklists/{id}
pub async fn update_checklist(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateChecklist>,
) -> AppResult<Json<DataResponse<Checklist>>> {
    if let Some(title) = input.title.as_deref() {
        require_text("title", title)?;
    }
    ensure_client(&state, auth.agency_id, input.client_id).await?;
    let checklist = ChecklistRepo::update(&state.pool, auth.agency_id, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: checklist }))
}

/// DELETE /api/v1/checklists/{id}
pub async fn delete_checklist(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ChecklistRepo::delete(&state.pool, auth.agency_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// POST /api/v1/checklists/{id}/items
pub async fn add_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<CreateChecklistItem>,
) -> AppResult<Created<ChecklistItem>> {
    require_text("label", &input.label)?;
    ChecklistRepo::find_by_id(&state.pool, auth.agency_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let item = ChecklistRepo::add_item(&state.pool, id, &input).await?;
    Ok(Created(item))
}

/// PUT /api/v1/checklists/{id}/items/{item_id}
///
/// Rename, reorder, or toggle an item.
pub async fn update_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, item_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateChecklistItem>,
) -> AppResult<Json<DataResponse<ChecklistItem>>> {
    if let Some(label) = input.label.as_deref() {
        require_text("label", label)?;
    }
    let item = ChecklistRepo::update_item(
        &state.pool,
        auth.agency_id,
        id,
        item_id,
        auth.user_id,
        &input,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "ChecklistItem",
        id: item_id,
    }))?;
    Ok(Json(DataResponse { data: item }))
}

/// DELETE /api/v1/checklists/{id}/items/{item_id}
pub async fn delete_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, item_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if ChecklistRepo::delete_item(&state.pool, auth.agency_id, id, item_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "ChecklistItem",
            id: item_id,
        }))
    }
}
