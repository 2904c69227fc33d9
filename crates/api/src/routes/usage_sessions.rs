//! Route definitions for usage-session tracking.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::usage_sessions;
use crate::state::AppState;

/// Routes mounted at `/usage-sessions`.
///
/// ```text
/// POST  /              -> start_session
/// GET   /stats         -> get_stats (?days)
/// PATCH /{id}          -> update_session
/// POST  /{id}/beacon   -> beacon (token in body, always 204)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(usage_sessions::start_session))
        .route("/stats", get(usage_sessions::get_stats))
        .route("/{id}", patch(usage_sessions::update_session))
        .route("/{id}/beacon", post(usage_sessions::beacon))
}
