//! Browser error telemetry.

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use vurp_core::telemetry::{fingerprint, truncate_chars, MAX_STACK_LEN};
use vurp_db::models::error_report::{CreateErrorReport, ErrorGroup, ErrorReport, ErrorReportInput};
use vurp_db::repositories::ErrorReportRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::auth::user_agent;
use crate::middleware::auth::MaybeAuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Longest message persisted.
const MAX_MESSAGE_LEN: usize = 2_000;

/// Longest url or source persisted.
const MAX_URL_LEN: usize = 2_000;

#[derive(Debug, Serialize)]
pub struct Accepted {
    pub accepted: bool,
}

#[derive(Debug, Deserialize)]
pub struct OccurrenceParams {
    pub fingerprint: String,
    pub limit: Option<i64>,
}

fn accepted(accepted: bool) -> (StatusCode, Json<Accepted>) {
    (StatusCode::ACCEPTED, Json(Accepted { accepted }))
}

fn clip(value: Option<String>, max: usize) -> Option<String> {
    value.map(|v| truncate_chars(&v, max).to_string())
}

/// POST /api/v1/telemetry/errors
///
/// Always 202. `accepted` is `false` for malformed, duplicate, or unsaved
/// reports.
pub async fn report_error(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Accepted>) {
    let input: ErrorReportInput = match serde_json::from_slice(&body) {
        Ok(input) => input,
        Err(e) => {
            tracing::debug!(error = %e, "Malformed error report dropped");
            return accepted(false);
        }
    };
    if input.message.trim().is_empty() {
        return accepted(false);
    }

    let fp = fingerprint(
        input.kind,
        &input.message,
        input.source.as_deref(),
        input.line,
        input.column,
    );
    let fresh = state
        .error_dedupe
        .lock()
        .await
        .try_acquire(fp.clone(), Instant::now());
    if !fresh {
        return accepted(false);
    }

    let report = CreateErrorReport {
        user_id: user.map(|u| u.user_id),
        fingerprint: fp,
        kind: input.kind.as_str().to_string(),
        message: truncate_chars(input.message.trim(), MAX_MESSAGE_LEN).to_string(),
        source: clip(input.source, MAX_URL_LEN),
        line: input.line,
        col: input.column,
        stack: clip(input.stack, MAX_STACK_LEN),
        url: clip(input.url, MAX_URL_LEN),
        user_agent: user_agent(&headers),
    };

    match ErrorReportRepo::insert(&state.pool, &report).await {
        Ok(saved) => {
            tracing::info!(
                error_report_id = saved.id,
                fingerprint = %saved.fingerprint,
                "Browser error reported"
            );
            accepted(true)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to store error report");
            accepted(false)
        }
    }
}

/// GET /api/v1/telemetry/errors
pub async fn list_error_groups(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<ErrorGroup>>>> {
    let (limit, offset) = params.resolve();
    let groups = ErrorReportRepo::list_groups(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: groups }))
}

/// GET /api/v1/telemetry/errors/occurrences?fingerprint=
pub async fn list_occurrences(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<OccurrenceParams>,
) -> AppResult<Json<DataResponse<Vec<ErrorReport>>>> {
    if params.fingerprint.is_empty() {
        return Err(AppError::BadRequest("fingerprint is required".into()));
    }
    let (limit, _) = PaginationParams {
        limit: params.limit,
        offset: None,
    }
    .resolve();
    let reports = ErrorReportRepo::list_by_fingerprint(&state.pool, &params.fingerprint, limit)
        .await?;
    Ok(Json(DataResponse { data: reports }))
}
