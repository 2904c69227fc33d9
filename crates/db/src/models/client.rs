//! Client (CRM) model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use vurp_core::types::{DbId, Timestamp};

/// A client row from the `clients` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Client {
    pub id: DbId,
    pub agency_id: DbId,
    pub manager_id: Option<DbId>,
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub platform: String,
    pub status: String,
    pub monthly_budget: f64,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new client.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClient {
    pub name: String,
    pub manager_id: Option<DbId>,
    pub company: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Defaults to `meta` if omitted.
    pub platform: Option<String>,
    /// Defaults to `active` if omitted.
    pub status: Option<String>,
    pub monthly_budget: Option<f64>,
    pub notes: Option<String>,
}

/// DTO for updating an existing client. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateClient {
    pub name: Option<String>,
    pub manager_id: Option<DbId>,
    pub company: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub platform: Option<String>,
    pub status: Option<String>,
    pub monthly_budget: Option<f64>,
    pub notes: Option<String>,
}

/// Query parameters for `GET /clients`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientListParams {
    pub status: Option<String>,
    pub manager_id: Option<DbId>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
