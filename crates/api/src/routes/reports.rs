//! Route definitions for the `/reports` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::reports;
use crate::state::AppState;

/// Routes mounted at `/reports`.
///
/// ```text
/// GET    /              -> list_reports (?client_id, limit, offset)
/// POST   /              -> create_report
/// GET    /{id}          -> get_report
/// PUT    /{id}          -> update_report
/// DELETE /{id}          -> delete_report
/// GET    /{id}/summary  -> get_report_summary
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(reports::list_reports).post(reports::create_report))
        .route(
            "/{id}",
            get(reports::get_report)
                .put(reports::update_report)
                .delete(reports::delete_report),
        )
        .route("/{id}/summary", get(reports::get_report_summary))
}
