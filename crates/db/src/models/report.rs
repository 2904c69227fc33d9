//! Campaign report model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vurp_core::calculators::{CampaignNumbers, MetricResult};
use vurp_core::types::{Date, DbId, Timestamp};

/// A report row from the `reports` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Report {
    pub id: DbId,
    pub agency_id: DbId,
    pub client_id: DbId,
    pub author_id: Option<DbId>,
    pub title: String,
    pub period_start: Date,
    pub period_end: Date,
    pub investment: f64,
    pub revenue: f64,
    pub impressions: i64,
    pub clicks: i64,
    pub leads: i64,
    pub conversions: i64,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Report {
    pub fn numbers(&self) -> CampaignNumbers {
        CampaignNumbers {
            investment: self.investment,
            revenue: self.revenue,
            impressions: self.impressions,
            clicks: self.clicks,
            leads: self.leads,
            conversions: self.conversions,
        }
    }
}

/// DTO for creating a new report.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReport {
    pub client_id: DbId,
    pub title: String,
    pub period_start: Date,
    pub period_end: Date,
    #[serde(default)]
    pub investment: f64,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub impressions: i64,
    #[serde(default)]
    pub clicks: i64,
    #[serde(default)]
    pub leads: i64,
    #[serde(default)]
    pub conversions: i64,
    pub notes: Option<String>,
}

impl CreateReport {
    pub fn numbers(&self) -> CampaignNumbers {
        CampaignNumbers {
            investment: self.investment,
            revenue: self.revenue,
            impressions: self.impressions,
            clicks: self.clicks,
            leads: self.leads,
            conversions: self.conversions,
        }
    }
}

/// DTO for updating an existing report. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateReport {
    pub title: Option<String>,
    pub period_start: Option<Date>,
    pub period_end: Option<Date>,
    pub investment: Option<f64>,
    pub revenue: Option<f64>,
    pub impressions: Option<i64>,
    pub clicks: Option<i64>,
    pub leads: Option<i64>,
    pub conversions: Option<i64>,
    pub notes: Option<String>,
}

/// Query parameters for `GET /reports`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportListParams {
    pub client_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Report plus computed metrics, the payload rendered to PDF by the browser.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub report: Report,
    pub client_name: String,
    pub metrics: Vec<MetricResult>,
}
