use axum::routing::{get, post};
use axum::Router;

use crate::handlers::calculators;
use crate::state::AppState;

/// Public routes mounted at `/calculators`.
///
/// ```text
/// GET  /        -> list_calculators
/// POST /{kind}  -> run_calculator
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(calculators::list_calculators))
        .route("/{kind}", post(calculators::run_calculator))
}
