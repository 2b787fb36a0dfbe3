use axum::routing::post;
use axum::Router;

use crate::handlers::schema;
use crate::state::AppState;

/// Schema maintenance routes mounted at `/db`.
///
/// ```text
/// POST /init  -> init_schema
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/init", post(schema::init_schema))
}
