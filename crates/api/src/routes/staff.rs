use axum::routing::get;
use axum::Router;

use crate::handlers::staff;
use crate::state::AppState;

/// Staff profile routes mounted at `/staff`.
///
/// ```text
/// GET  /owner  -> get_owner
/// POST /owner  -> save_owner
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/owner", get(staff::get_owner).post(staff::save_owner))
}
