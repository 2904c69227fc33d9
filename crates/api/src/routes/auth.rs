use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// `/auth`. The first three routes are how a token is obtained and so take
/// none; `logout` and `me` need one.
pub fn router() -> Router<AppState> {
    let obtain = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh));

    obtain
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}
