//! Route definitions for the caller's agency and its managers.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::agency;
use crate::state::AppState;

/// Routes mounted at `/agency`.
///
/// ```text
/// GET  /               -> get_agency
/// PUT  /               -> update_agency (owner)
/// GET  /managers       -> list_managers
/// POST /managers       -> create_manager (owner)
/// PUT  /managers/{id}  -> update_manager (owner)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(agency::get_agency).put(agency::update_agency))
        .route(
            "/managers",
            get(agency::list_managers).post(agency::create_manager),
        )
        .route("/managers/{id}", put(agency::update_manager))
}
