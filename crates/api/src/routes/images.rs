use axum::routing::{get, post};
use axum::Router;

use crate::handlers::images;
use crate::state::AppState;

/// Image override routes mounted at `/images`.
///
/// ```text
/// POST   /menu-items/batch        -> save_menu_item_images_batch
/// GET    /menu-items/{item_id}    -> get_menu_item_image
/// POST   /menu-items/{item_id}    -> save_menu_item_image
/// DELETE /menu-items/{item_id}    -> delete_menu_item_image
/// GET    /site/{slot}             -> get_site_image
/// POST   /site/{slot}             -> save_site_image
/// DELETE /site/{slot}             -> delete_site_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/menu-items/batch",
            post(images::save_menu_item_images_batch),
        )
        .route(
            "/menu-items/{item_id}",
            get(images::get_menu_item_image)
                .post(images::save_menu_item_image)
                .delete(images::delete_menu_item_image),
        )
        .route(
            "/site/{slot}",
            get(images::get_site_image)
                .post(images::save_site_image)
                .delete(images::delete_site_image),
        )
}
