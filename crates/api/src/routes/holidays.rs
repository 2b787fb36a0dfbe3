use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::holidays;
use crate::state::AppState;

/// Holiday menu routes mounted at `/holidays`.
///
/// ```text
/// GET    /                                         -> list_holidays
/// POST   /                                         -> upsert_holiday
/// GET    /slug/{name}                              -> get_holiday_by_slug
/// DELETE /{id}                                     -> delete_holiday
/// POST   /{id}/items                               -> create_item
/// PUT    /{id}/items/{item_id}                     -> update_item
/// DELETE /{id}/items/{item_id}                     -> delete_item
/// POST   /{id}/variants                            -> create_variant
/// PUT    /{id}/variants/{variant_id}               -> update_variant
/// DELETE /{id}/variants/{variant_id}               -> delete_variant
/// POST   /{id}/variants/{variant_id}/items         -> create_variant_item
/// PUT    /{id}/variants/{variant_id}/items/{item_id} -> update_variant_item
/// DELETE /{id}/variants/{variant_id}/items/{item_id} -> delete_variant_item
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(holidays::list_holidays).post(holidays::upsert_holiday),
        )
        .route("/slug/{name}", get(holidays::get_holiday_by_slug))
        .route("/{id}", delete(holidays::delete_holiday))
        .route("/{id}/items", post(holidays::create_item))
        .route(
            "/{id}/items/{item_id}",
            put(holidays::update_item).delete(holidays::delete_item),
        )
        .route("/{id}/variants", post(holidays::create_variant))
        .route(
            "/{id}/variants/{variant_id}",
            put(holidays::update_variant).delete(holidays::delete_variant),
        )
        .route(
            "/{id}/variants/{variant_id}/items",
            post(holidays::create_variant_item),
        )
        .route(
            "/{id}/variants/{variant_id}/items/{item_id}",
            put(holidays::update_variant_item).delete(holidays::delete_variant_item),
        )
}
