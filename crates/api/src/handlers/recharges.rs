//! Handlers for the `/recharges` calendar.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use vurp_core::error::CoreError;
use vurp_core::recharge::{forecast, validate_amount, validate_status, Forecast};
use vurp_core::types::{Date, DbId};
use vurp_db::models::recharge::{CreateRecharge, Recharge, RechargeListParams, UpdateRecharge};
use vurp_db::repositories::{ClientRepo, RechargeRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{Created, DataResponse};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Recharge",
        id,
    })
}

/// Body of `POST /recharges/forecast`.
#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    pub balance: f64,
    pub daily_spend: f64,
    /// Defaults to today (UTC).
    pub from: Option<Date>,
}

/// POST /api/v1/recharges
pub async fn create_recharge(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateRecharge>,
) -> AppResult<Created<Recharge>> {
    validate_amount(input.amount)?;
    if let Some(platform) = input.platform.as_deref() {
        vurp_core::client::validate_platform(platform)?;
    }
    if ClientRepo::find_by_id(&state.pool, auth.agency_id, input.client_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Client",
            id: input.client_id,
        }));
    }

    let recharge = RechargeRepo::create(&state.pool, auth.agency_id, &input).await?;
    Ok(Created(recharge))
}

/// GET /api/v1/recharges
///
/// Calendar window ordered by due date.
pub async fn list_recharges(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<RechargeListParams>,
) -> AppResult<Json<DataResponse<Vec<Recharge>>>> {
    if let Some(status) = params.status.as_deref() {
        validate_status(status)?;
    }
    if let (Some(from), Some(to)) = (params.from, params.to) {
        if to < from {
            return Err(AppError::BadRequest("'to' must not be before 'from'".into()));
        }
    }
    let recharges = RechargeRepo::list(&state.pool, auth.agency_id, &params).await?;
    Ok(Json(DataResponse { data: recharges }))
}

/// GET /api/v1/recharges/{id}
pub async fn get_recharge(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Recharge>>> {
    let recharge = RechargeRepo::find_by_id(&state.pool, auth.agency_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: recharge }))
}

/// PUT /api/v1/recharges/{id}
pub async fn update_recharge(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRecharge>,
) -> AppResult<Json<DataResponse<Recharge>>> {
    if let Some(amount) = input.amount {
        validate_amount(amount)?;
    }
    if let Some(status) = input.status.as_deref() {
        validate_status(status)?;
    }
    if let Some(platform) = input.platform.as_deref() {
        vurp_core::client::validate_platform(platform)?;
    }
    let recharge = RechargeRepo::update(&state.pool, auth.agency_id, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: recharge }))
}

/// POST /api/v1/recharges/{id}/complete
pub async fn complete_recharge(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Recharge>>> {
    let recharge = RechargeRepo::complete(&state.pool, auth.agency_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(recharge_id = id, user_id = auth.user_id, "Recharge completed");
    Ok(Json(DataResponse { data: recharge }))
}

/// DELETE /api/v1/recharges/{id}
pub async fn delete_recharge(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if RechargeRepo::delete(&state.pool, auth.agency_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// POST /api/v1/recharges/forecast
pub async fn forecast_recharge(
    _auth: AuthUser,
    Json(input): Json<ForecastRequest>,
) -> AppResult<Json<DataResponse<Forecast>>> {
    let from = input.from.unwrap_or_else(|| Utc::now().date_naive());
    let result = forecast(input.balance, input.daily_spend, from)?;
    Ok(Json(DataResponse { data: result }))
}
