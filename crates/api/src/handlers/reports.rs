//! Handlers for the `/reports` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use vurp_core::calculators::campaign_metrics;
use vurp_core::error::CoreError;
use vurp_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use vurp_core::report::{validate_numbers, validate_period, validate_title};
use vurp_core::types::DbId;
use vurp_db::models::report::{
    CreateReport, Report, ReportListParams, ReportSummary, UpdateReport,
};
use vurp_db::repositories::{ClientRepo, ReportRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{Created, DataResponse};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Report",
        id,
    })
}

/// POST /api/v1/reports
pub async fn create_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateReport>,
) -> AppResult<Created<Report>> {
    validate_title(&input.title)?;
    validate_period(input.period_start, input.period_end)?;
    validate_numbers(&input.numbers())?;

    if ClientRepo::find_by_id(&state.pool, auth.agency_id, input.client_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Client",
            id: input.client_id,
        }));
    }

    let report = ReportRepo::create(&state.pool, auth.agency_id, auth.user_id, &input).await?;
    tracing::info!(
        report_id = report.id,
        client_id = report.client_id,
        user_id = auth.user_id,
        "Report created"
    );
    Ok(Created(report))
}

/// GET /api/v1/reports
pub async fn list_reports(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ReportListParams>,
) -> AppResult<Json<DataResponse<Vec<Report>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);
    let reports = ReportRepo::list(&state.pool, auth.agency_id, &params, limit, offset).await?;
    Ok(Json(DataResponse { data: reports }))
}

/// GET /api/v1/reports/{id}
pub async fn get_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Report>>> {
    let report = ReportRepo::find_by_id(&state.pool, auth.agency_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: report }))
}

/// GET /api/v1/reports/{id}/summary
///
/// The report plus every computable campaign metric, formatted and rated.
/// This is the payload the browser renders into a PDF.
pub async fn get_report_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ReportSummary>>> {
    let report = ReportRepo::find_by_id(&state.pool, auth.agency_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let client_name = ReportRepo::client_name(&state.pool, auth.agency_id, report.client_id)
        .await?
        .unwrap_or_default();
    let metrics = campaign_metrics(&report.numbers());

    Ok(Json(DataResponse {
        data: ReportSummary {
            report,
            client_name,
            metrics,
        },
    }))
}

/// PUT /api/v1/reports/{id}
pub async fn update_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateReport>,
) -> AppResult<Json<DataResponse<Report>>> {
    if let Some(title) = input.title.as_deref() {
        validate_title(title)?;
    }

    let current = ReportRepo::find_by_id(&state.pool, auth.agency_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    // Validate the merged row, not the patch in isolation.
    validate_period(
        input.period_start.unwrap_or(current.period_start),
        input.period_end.unwrap_or(current.period_end),
    )?;
    let mut numbers = current.numbers();
    numbers.investment = input.investment.unwrap_or(numbers.investment);
    numbers.revenue = input.revenue.unwrap_or(numbers.revenue);
    numbers.impressions = input.impressions.unwrap_or(numbers.impressions);
    numbers.clicks = input.clicks.unwrap_or(numbers.clicks);
    numbers.leads = input.leads.unwrap_or(numbers.leads);
    numbers.conversions = input.conversions.unwrap_or(numbers.conversions);
    validate_numbers(&numbers)?;

    let report = ReportRepo::update(&state.pool, auth.agency_id, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: report }))
}

/// DELETE /api/v1/reports/{id}
pub async fn delete_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ReportRepo::delete(&state.pool, auth.agency_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
