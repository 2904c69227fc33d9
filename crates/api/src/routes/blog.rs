//! Route definitions for the blog.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::blog;
use crate::state::AppState;

/// Routes mounted at `/blog`.
///
/// ```text
/// GET    /posts               -> list_posts (public)
/// GET    /posts/{slug}        -> get_post (public)
/// POST   /posts/{slug}/view   -> record_view (public)
/// POST   /posts/{slug}/like   -> toggle_like (public)
///
/// GET    /admin/posts         -> admin_list_posts (admin)
/// POST   /admin/posts         -> create_post (admin)
/// PUT    /admin/posts/{id}    -> update_post (admin)
/// DELETE /admin/posts/{id}    -> delete_post (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", get(blog::list_posts))
        .route("/posts/{slug}", get(blog::get_post))
        .route("/posts/{slug}/view", post(blog::record_view))
        .route("/posts/{slug}/like", post(blog::toggle_like))
        .route(
            "/admin/posts",
            get(blog::admin_list_posts).post(blog::create_post),
        )
        .route(
            "/admin/posts/{id}",
            put(blog::update_post).delete(blog::delete_post),
        )
}
