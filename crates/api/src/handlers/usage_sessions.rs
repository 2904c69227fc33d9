//! Handlers for usage-session tracking.
//!
//! The browser starts a session on load, autosaves the elapsed time with
//! `PATCH`, and closes it with `navigator.sendBeacon` when the tab goes away.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use vurp_core::error::CoreError;
use vurp_core::types::DbId;
use vurp_core::usage_tracking::{average_secs, clamp_duration, stats_window};
use vurp_db::models::usage_session::{DurationUpdate, UsageSession};
use vurp_db::repositories::UsageSessionRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::auth::user_agent;
use crate::middleware::auth::{bearer_token, user_from_token, AuthUser};
use crate::response::{Created, DataResponse};
use crate::state::AppState;

/// `text/plain` JSON sent by `navigator.sendBeacon`, which cannot set headers.
#[derive(Debug, Deserialize)]
pub struct BeaconPayload {
    pub duration_secs: i64,
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatsParams {
    /// Only count sessions started in the last `days` days.
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UsageStatsResponse {
    pub total_secs: i64,
    pub session_count: i64,
    pub average_secs: i64,
}

/// POST /api/v1/usage-sessions
pub async fn start_session(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
) -> AppResult<Created<UsageSession>> {
    let ua = user_agent(&headers);
    let session = UsageSessionRepo::start(&state.pool, auth.user_id, ua.as_deref()).await?;
    Ok(Created(session))
}

/// PATCH /api/v1/usage-sessions/{id}
///
/// Autosave. The stored duration never moves backwards.
pub async fn update_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<DurationUpdate>,
) -> AppResult<Json<DataResponse<UsageSession>>> {
    let secs = clamp_duration(input.duration_secs)?;
    let session = UsageSessionRepo::update_duration(&state.pool, auth.user_id, id, secs)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "UsageSession",
            id,
        }))?;
    Ok(Json(DataResponse { data: session }))
}

/// POST /api/v1/usage-sessions/{id}/beacon
///
/// Always 204. Nothing is reported back to a page that is already unloading.
pub async fn beacon(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let payload: BeaconPayload = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(e) => {
            tracing::debug!(session_id = id, error = %e, "Malformed beacon body dropped");
            return StatusCode::NO_CONTENT;
        }
    };

    let token = payload.token.as_deref().or_else(|| bearer_token(&headers));
    let Some(user) = token.and_then(|t| user_from_token(t, &state.config.jwt)) else {
        tracing::debug!(session_id = id, "Unauthenticated beacon dropped");
        return StatusCode::NO_CONTENT;
    };

    let secs = payload.duration_secs.max(0);
    match UsageSessionRepo::end(&state.pool, user.user_id, id, secs).await {
        Ok(true) => {
            tracing::debug!(session_id = id, user_id = user.user_id, secs, "Session ended");
        }
        Ok(false) => {
            tracing::debug!(session_id = id, user_id = user.user_id, "Beacon for closed session");
        }
        Err(e) => {
            tracing::warn!(session_id = id, error = %e, "Failed to end session from beacon");
        }
    }
    StatusCode::NO_CONTENT
}

/// GET /api/v1/usage-sessions/stats
pub async fn get_stats(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<StatsParams>,
) -> AppResult<Json<DataResponse<UsageStatsResponse>>> {
    let days = stats_window(params.days)?;
    let stats = UsageSessionRepo::stats(&state.pool, auth.user_id, days).await?;
    Ok(Json(DataResponse {
        data: UsageStatsResponse {
            total_secs: stats.total_secs,
            session_count: stats.session_count,
            average_secs: average_secs(stats.total_secs, stats.session_count),
        },
    }))
}
