//! Recharge calendar model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vurp_core::types::{Date, DbId, Timestamp};

/// A recharge row from the `recharges` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Recharge {
    pub id: DbId,
    pub agency_id: DbId,
    pub client_id: DbId,
    pub platform: String,
    pub amount: f64,
    pub due_date: Date,
    pub status: String,
    pub completed_at: Option<Timestamp>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for scheduling a recharge.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecharge {
    pub client_id: DbId,
    /// Defaults to the client's platform if omitted.
    pub platform: Option<String>,
    pub amount: f64,
    pub due_date: Date,
    pub notes: Option<String>,
}

/// DTO for updating a recharge. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRecharge {
    pub platform: Option<String>,
    pub amount: Option<f64>,
    pub due_date: Option<Date>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Calendar window query for `GET /recharges`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RechargeListParams {
    pub from: Option<Date>,
    pub to: Option<Date>,
    pub status: Option<String>,
    pub client_id: Option<DbId>,
}
