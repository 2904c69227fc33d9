//! Route definitions for `/checklists` and their items.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::checklists;
use crate::state::AppState;

/// Routes mounted at `/checklists`.
///
/// ```text
/// GET    /                      -> list_checklists (?client_id)
/// POST   /                      -> create_checklist
/// GET    /{id}                  -> get_checklist
/// PUT    /{id}                  -> update_checklist
/// DELETE /{id}                  -> delete_checklist
/// POST   /{id}/items            -> add_item
/// PUT    /{id}/items/{item_id}  -> update_item
/// DELETE /{id}/items/{item_id}  -> delete_item
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(checklists::list_checklists).post(checklists::create_checklist),
        )
        .route(
            "/{id}",
            get(checklists::get_checklist)
                .put(checklists::update_checklist)
                .delete(checklists::delete_checklist),
        )
        .route("/{id}/items", post(checklists::add_item))
        .route(
            "/{id}/items/{item_id}",
            put(checklists::update_item).delete(checklists::delete_item),
        )
}
