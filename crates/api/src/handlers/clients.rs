//! Handlers for the `/clients` resource (CRM).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use sqlx::{Postgres, Transaction};
use validator::Validate;
use vurp_core::billing::Plan;
use vurp_core::client::{
    check_client_limit, validate_budget, validate_name, validate_platform, validate_status,
    STATUS_ACTIVE,
};
use vurp_core::error::CoreError;
use vurp_core::pagination::{clamp_limit, clamp_offset, ilike_pattern, DEFAULT_LIMIT, MAX_LIMIT};
use vurp_core::types::DbId;
use vurp_db::models::client::{Client, ClientListParams, CreateClient, UpdateClient};
use vurp_db::repositories::{ClientRepo, SubscriptionRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{Created, DataResponse};
use crate::state::AppState;

/// Reject a `manager_id` that is not a member of the caller's agency.
async fn ensure_manager_in_agency(
    state: &AppState,
    agency_id: DbId,
    manager_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(manager_id) = manager_id {
        if UserRepo::find_in_agency(&state.pool, agency_id, manager_id)
            .await?
            .is_none()
        {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Manager {manager_id} does not belong to this agency"
            ))));
        }
    }
    Ok(())
}

/// Reject one more active client when the agency's plan is full.
///
/// Locks the agency row for the rest of `tx`; the caller writes the client in
/// the same transaction.
async fn ensure_client_capacity(
    state: &AppState,
    tx: &mut Transaction<'_, Postgres>,
    agency_id: DbId,
) -> AppResult<()> {
    let plan = SubscriptionRepo::find_by_agency(&state.pool, agency_id)
        .await?
        .map(|s| Plan::effective(&s.plan, &s.status))
        .unwrap_or(Plan::Free);
    let active = ClientRepo::count_active_locked(tx, agency_id).await?;
    check_client_limit(active, plan.client_limit())?;
    Ok(())
}

/// POST /api/v1/clients
pub async fn create_client(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateClient>,
) -> AppResult<Created<Client>> {
    validate_name(&input.name)?;
    input.validate()?;
    if let Some(status) = input.status.as_deref() {
        validate_status(status)?;
    }
    if let Some(platform) = input.platform.as_deref() {
        validate_platform(platform)?;
    }
    if let Some(budget) = input.monthly_budget {
        validate_budget(budget)?;
    }
    ensure_manager_in_agency(&state, auth.agency_id, input.manager_id).await?;

    let mut tx = state.pool.begin().await?;
    if input.status.as_deref().unwrap_or(STATUS_ACTIVE) == STATUS_ACTIVE {
        ensure_client_capacity(&state, &mut tx, auth.agency_id).await?;
    }
    let client = ClientRepo::create_in_tx(&mut tx, auth.agency_id, &input).await?;
    tx.commit().await?;
    tracing::info!(
        client_id = client.id,
        agency_id = auth.agency_id,
        user_id = auth.user_id,
        "Client created"
    );
    Ok(Created(client))
}

/// GET /api/v1/clients
pub async fn list_clients(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ClientListParams>,
) -> AppResult<Json<DataResponse<Vec<Client>>>> {
    if let Some(status) = params.status.as_deref() {
        validate_status(status)?;
    }
    let pattern = params
        .search
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(ilike_pattern);
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);

    let clients = ClientRepo::list(
        &state.pool,
        auth.agency_id,
        &params,
        pattern.as_deref(),
        limit,
        offset,
    )
    .await?;
    Ok(Json(DataResponse { data: clients }))
}

/// GET /api/v1/clients/{id}
pub async fn get_client(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Client>>> {
    let client = ClientRepo::find_by_id(&state.pool, auth.agency_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Client",
            id,
        }))?;
    Ok(Json(DataResponse { data: client }))
}

/// PUT /api/v1/clients/{id}
pub async fn update_client(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateClient>,
) -> AppResult<Json<DataResponse<Client>>> {
    if let Some(name) = input.name.as_deref() {
        validate_name(name)?;
    }
    input.validate()?;
    if let Some(status) = input.status.as_deref() {
        validate_status(status)?;
    }
    if let Some(platform) = input.platform.as_deref() {
        validate_platform(platform)?;
    }
    if let Some(budget) = input.monthly_budget {
        validate_budget(budget)?;
    }
    ensure_manager_in_agency(&state, auth.agency_id, input.manager_id).await?;

    let current = ClientRepo::find_by_id(&state.pool, auth.agency_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Client",
            id,
        }))?;
    let mut tx = state.pool.begin().await?;
    if input.status.as_deref() == Some(STATUS_ACTIVE) && current.status != STATUS_ACTIVE {
        ensure_client_capacity(&state, &mut tx, auth.agency_id).await?;
    }
    let client = ClientRepo::update_in_tx(&mut tx, auth.agency_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Client",
            id,
        }))?;
    tx.commit().await?;
    Ok(Json(DataResponse { data: client }))
}

/// DELETE /api/v1/clients/{id}
///
/// Soft delete: the row stays for reports that reference it.
pub async fn delete_client(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ClientRepo::soft_delete(&state.pool, auth.agency_id, id).await? {
        tracing::info!(client_id = id, user_id = auth.user_id, "Client deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Client",
            id,
        }))
    }
}
