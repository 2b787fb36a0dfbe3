use axum::routing::{get, post};
use axum::Router;

use crate::handlers::posts;
use crate::state::AppState;

/// Post routes mounted at `/posts`.
///
/// ```text
/// GET    /          -> list_posts
/// POST   /          -> create_post
/// DELETE /?id=      -> delete_post
/// POST   /migrate   -> migrate_posts
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(posts::list_posts)
                .post(posts::create_post)
                .delete(posts::delete_post),
        )
        .route("/migrate", post(posts::migrate_posts))
}
