//! Handlers for promotional posts.
//!
//! Posts are created and deleted, never edited in place.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use trattoria_core::error::{BatchFailure, CoreError};
use trattoria_core::types::DbId;
use trattoria_db::models::post::{CreatePost, MigratePosts};
use trattoria_db::repositories::PostRepo;
use trattoria_db::with_schema_repair;

use super::{ensure_store_reachable, storable_image};
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::admin::RequireAdmin;
use crate::query::PostIdParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Validate a post and normalize its image and text.
fn prepare_post(mut post: CreatePost) -> Result<CreatePost, CoreError> {
    post.description = post.description.trim().to_string();
    if post.description.is_empty() {
        return Err(CoreError::Validation("Post description must not be empty".into()));
    }
    post.title = post
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    post.image = storable_image(&post.image)?;
    Ok(post)
}

fn parse_post_id(params: &PostIdParams) -> Result<DbId, CoreError> {
    let raw = params
        .id
        .as_deref()
        .ok_or_else(|| CoreError::Validation("Query parameter 'id' is required".into()))?;
    raw.trim()
        .parse::<DbId>()
        .map_err(|_| CoreError::Validation(format!("Invalid post id '{raw}'")))
}

/// GET /api/v1/posts
///
/// All posts, newest first.
pub async fn list_posts(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let posts = with_schema_repair(&state.pool, || PostRepo::list(&state.pool)).await?;

    Ok(Json(DataResponse { data: posts }))
}

/// POST /api/v1/posts
pub async fn create_post(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreatePost>,
) -> AppResult<impl IntoResponse> {
    let input = prepare_post(input)?;
    ensure_store_reachable(&state).await?;

    let post = PostRepo::create(&state.pool, &input).await?;

    tracing::info!(post_id = post.id, "Post created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: post })))
}

/// DELETE /api/v1/posts?id=
pub async fn delete_post(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PostIdParams>,
) -> AppResult<impl IntoResponse> {
    let post_id = parse_post_id(&params)?;
    ensure_store_reachable(&state).await?;

    if !PostRepo::delete(&state.pool, post_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Post",
            id: post_id,
        }));
    }

    tracing::info!(post_id, "Post deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/posts/migrate
///
/// Import posts held in a client cache. Re-running the same import skips
/// every post already stored (same image and description).
pub async fn migrate_posts(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<MigratePosts>,
) -> AppResult<impl IntoResponse> {
    let mut posts = Vec::with_capacity(input.posts.len());
    let mut failures = Vec::new();
    for (index, post) in input.posts.into_iter().enumerate() {
        match prepare_post(post) {
            Ok(post) => posts.push(post),
            Err(e) => failures.push(BatchFailure {
                index,
                item_id: None,
                reason: e.to_string(),
            }),
        }
    }
    if !failures.is_empty() {
        return Err(AppError::Core(CoreError::BatchRejected(failures)));
    }

    ensure_store_reachable(&state).await?;

    let report = PostRepo::migrate(&state.pool, &posts).await?;

    tracing::info!(
        migrated = report.migrated,
        skipped = report.skipped,
        "Posts migrated"
    );

    Ok(Json(DataResponse { data: report }))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

    fn post(description: &str, title: Option<&str>) -> CreatePost {
        CreatePost {
            image: PNG.to_string(),
            description: description.to_string(),
            title: title.map(str::to_string),
            created_at: None,
        }
    }

    #[test]
    fn blank_description_is_rejected() {
        assert_matches!(prepare_post(post("  ", None)), Err(CoreError::Validation(_)));
    }

    #[test]
    fn blank_title_becomes_none() {
        let prepared = prepare_post(post("Serata jazz", Some("  "))).unwrap();
        assert_eq!(prepared.title, None);
        assert_eq!(prepared.description, "Serata jazz");
    }

    #[test]
    fn post_id_must_be_numeric() {
        assert_matches!(
            parse_post_id(&PostIdParams { id: Some("abc".into()) }),
            Err(CoreError::Validation(_))
        );
        assert_matches!(parse_post_id(&PostIdParams { id: None }), Err(CoreError::Validation(_)));
        assert_eq!(parse_post_id(&PostIdParams { id: Some("42".into()) }).unwrap(), 42);
    }
}
