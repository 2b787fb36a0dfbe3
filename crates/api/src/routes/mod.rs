pub mod client;
pub mod db;
pub mod health;
pub mod holidays;
pub mod images;
pub mod menu_items;
pub mod posts;
pub mod staff;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /holidays                                        list (GET), upsert by name (POST)
/// /holidays/slug/{name}                            resolved public view (GET)
/// /holidays/{id}                                   delete
/// /holidays/{id}/items                             create dish
/// /holidays/{id}/items/{itemId}                    update, delete dish
/// /holidays/{id}/variants                          create variant
/// /holidays/{id}/variants/{variantId}              update, delete variant
/// /holidays/{id}/variants/{variantId}/items        create variant dish
/// /holidays/{id}/variants/{variantId}/items/{itemId}  update, delete variant dish
///
/// /images/menu-items/batch                         atomic multi-image save (POST)
/// /images/menu-items/{itemId}                      get, save, delete dish image
/// /images/site/{slot}                              get, save, delete site image
///
/// /menu-items                                      resolved menu (GET)
/// /menu-items/overrides                            override map (GET)
/// /menu-items/{itemId}                             partial override (PATCH)
///
/// /posts                                           list, create, delete (?id=)
/// /posts/migrate                                   bulk import (POST)
///
/// /staff/owner                                     get, save owner profile
///
/// /db/init                                         create missing tables (POST)
///
/// /client/capabilities                             image delivery flags (GET)
/// ```
///
/// Reads are public; every mutation requires the admin key.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/holidays", holidays::router())
        .nest("/images", images::router())
        .nest("/menu-items", menu_items::router())
        .nest("/posts", posts::router())
        .nest("/staff", staff::router())
        .nest("/db", db::router())
        .nest("/client", client::router())
}
