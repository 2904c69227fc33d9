//! Client error telemetry model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vurp_core::telemetry::ErrorKind;
use vurp_core::types::{DbId, Timestamp};

/// A row from the `error_reports` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ErrorReport {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub fingerprint: String,
    pub kind: String,
    pub message: String,
    pub source: Option<String>,
    pub line: Option<i32>,
    #[serde(rename = "column")]
    pub col: Option<i32>,
    pub stack: Option<String>,
    pub url: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
}

/// Body of `POST /telemetry/errors`, as sent by the browser listeners.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorReportInput {
    #[serde(default)]
    pub kind: ErrorKind,
    pub message: String,
    pub source: Option<String>,
    pub line: Option<i32>,
    pub column: Option<i32>,
    pub stack: Option<String>,
    pub url: Option<String>,
}

/// Insert DTO, built by the handler once the fingerprint is known.
#[derive(Debug, Clone)]
pub struct CreateErrorReport {
    pub user_id: Option<DbId>,
    pub fingerprint: String,
    pub kind: String,
    pub message: String,
    pub source: Option<String>,
    pub line: Option<i32>,
    pub col: Option<i32>,
    pub stack: Option<String>,
    pub url: Option<String>,
    pub user_agent: Option<String>,
}

/// Reports grouped by fingerprint for the admin view.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ErrorGroup {
    pub fingerprint: String,
    pub message: String,
    pub occurrences: i64,
    pub affected_users: i64,
    pub first_seen: Timestamp,
    pub last_seen: Timestamp,
}
