//! Dashboard aggregate rows.

use serde::Serialize;
use sqlx::FromRow;

/// Client counts per status.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct ClientCounts {
    pub active: i64,
    pub paused: i64,
    pub churned: i64,
}

/// Report totals over a window.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct ReportTotals {
    pub report_count: i64,
    pub investment: f64,
    pub revenue: f64,
}
