use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::menu_items;
use crate::state::AppState;

/// Catalog menu item routes mounted at `/menu-items`.
///
/// ```text
/// GET   /              -> list_menu
/// GET   /overrides     -> list_overrides
/// PATCH /{item_id}     -> patch_menu_item
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(menu_items::list_menu))
        .route("/overrides", get(menu_items::list_overrides))
        .route("/{item_id}", patch(menu_items::patch_menu_item))
}
