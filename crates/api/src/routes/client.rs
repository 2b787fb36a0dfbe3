use axum::routing::get;
use axum::Router;

use crate::handlers::client;
use crate::state::AppState;

/// Client capability routes mounted at `/client`.
///
/// ```text
/// GET /capabilities  -> get_capabilities
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/capabilities", get(client::get_capabilities))
}
