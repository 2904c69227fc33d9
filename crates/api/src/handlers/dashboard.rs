//! Agency dashboard summary.

use axum::extract::State;
use axum::Json;
use chrono::{Datelike, Duration, Utc};
use serde::Serialize;
use vurp_core::calculators::roas;
use vurp_core::recharge::UPCOMING_WINDOW_DAYS;
use vurp_db::models::dashboard::ClientCounts;
use vurp_db::repositories::{DashboardRepo, RechargeRepo};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Days of reports aggregated into the spend figures.
const SPEND_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub clients: ClientCounts,
    pub reports_this_month: i64,
    pub investment_30d: f64,
    pub revenue_30d: f64,
    /// `None` when nothing was invested in the window.
    pub roas_30d: Option<f64>,
    pub recharges_due: i64,
    pub open_checklist_items: i64,
}

/// GET /api/v1/dashboard/summary
pub async fn get_summary(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<DashboardSummary>>> {
    let today = Utc::now().date_naive();
    let month_start = today.with_day(1).unwrap_or(today);

    let clients = DashboardRepo::client_counts(&state.pool, auth.agency_id).await?;
    let this_month = DashboardRepo::report_totals(&state.pool, auth.agency_id, month_start).await?;
    let spend = DashboardRepo::report_totals(
        &state.pool,
        auth.agency_id,
        today - Duration::days(SPEND_WINDOW_DAYS),
    )
    .await?;
    let recharges_due = RechargeRepo::count_due(
        &state.pool,
        auth.agency_id,
        today + Duration::days(UPCOMING_WINDOW_DAYS),
    )
    .await?;
    let open_checklist_items =
        DashboardRepo::open_checklist_items(&state.pool, auth.agency_id).await?;

    Ok(Json(DataResponse {
        data: DashboardSummary {
            clients,
            reports_this_month: this_month.report_count,
            investment_30d: spend.investment,
            revenue_30d: spend.revenue,
            roas_30d: roas(spend.investment, spend.revenue).ok(),
            recharges_due,
            open_checklist_items,
        },
    }))
}
