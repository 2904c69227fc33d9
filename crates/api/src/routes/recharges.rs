//! Route definitions for the `/recharges` calendar.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::recharges;
use crate::state::AppState;

/// Routes mounted at `/recharges`.
///
/// ```text
/// GET    /               -> list_recharges (?from, to, status, client_id)
/// POST   /               -> create_recharge
/// POST   /forecast       -> forecast_recharge
/// GET    /{id}           -> get_recharge
/// PUT    /{id}           -> update_recharge
/// DELETE /{id}           -> delete_recharge
/// POST   /{id}/complete  -> complete_recharge
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(recharges::list_recharges).post(recharges::create_recharge),
        )
        .route("/forecast", post(recharges::forecast_recharge))
        .route(
            "/{id}",
            get(recharges::get_recharge)
                .put(recharges::update_recharge)
                .delete(recharges::delete_recharge),
        )
        .route("/{id}/complete", post(recharges::complete_recharge))
}
