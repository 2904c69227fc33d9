use axum::routing::{get, post};
use axum::Router;

use crate::handlers::achievements;
use crate::state::AppState;

/// Routes mounted at `/achievements`.
///
/// ```text
/// GET  /       -> list_achievements
/// POST /check  -> check_achievements
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(achievements::list_achievements))
        .route("/check", post(achievements::check_achievements))
}
