use axum::routing::get;
use axum::Router;

use crate::handlers::telemetry;
use crate::state::AppState;

/// Routes mounted at `/telemetry`.
///
/// ```text
/// POST /errors              -> report_error (auth optional, always 202)
/// GET  /errors              -> list_error_groups (admin)
/// GET  /errors/occurrences  -> list_occurrences (admin, ?fingerprint)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/errors",
            get(telemetry::list_error_groups).post(telemetry::report_error),
        )
        .route("/errors/occurrences", get(telemetry::list_occurrences))
}
