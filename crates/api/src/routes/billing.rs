//! Route definitions for `/billing`.
//!
//! The webhook is unauthenticated; it is verified by its signature header.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::billing;
use crate::state::AppState;

/// Routes mounted at `/billing`.
///
/// ```text
/// POST /checkout      -> create_checkout (owner)
/// POST /portal        -> create_portal (owner)
/// POST /webhook       -> webhook (signed)
/// GET  /subscription  -> get_subscription
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(billing::create_checkout))
        .route("/portal", post(billing::create_portal))
        .route("/webhook", post(billing::webhook))
        .route("/subscription", get(billing::get_subscription))
}
