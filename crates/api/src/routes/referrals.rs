use axum::routing::get;
use axum::Router;

use crate::handlers::referrals;
use crate::state::AppState;

/// Routes mounted at `/referrals`.
///
/// ```text
/// GET  /         -> list_referrals
/// POST /         -> create_referral
/// GET  /summary  -> get_summary
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(referrals::list_referrals).post(referrals::create_referral),
        )
        .route("/summary", get(referrals::get_summary))
}
