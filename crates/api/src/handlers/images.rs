//! Handlers for image overrides: per-dish images, the atomic batch upload
//! and the fixed site image slots.
//!
//! Image reads degrade instead of failing: when the store cannot be read the
//! response is `{ "imageUrl": null }` with status 200, so a public page never
//! breaks over an image. Writes treat an unreachable store as an error.
//!
//! The `owner` slot is shared with `/staff/owner`: it reads, writes and
//! clears the staff photo together with its override key.

use std::collections::HashSet;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use trattoria_core::error::{BatchFailure, CoreError};
use trattoria_core::image_codec::{
    normalize_for_storage, prepare_for_transport, InlineImage, TRANSPORT_GATE_BYTES,
};
use trattoria_core::override_keys::{MENU_ITEM_KIND, SITE_IMAGE_SLOTS};
use trattoria_core::types::{DbId, Timestamp};
use trattoria_db::resolution::{ContentResolver, MirrorOutcome, OverrideWrite};

use super::ensure_store_reachable;
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::admin::RequireAdmin;
use crate::response::{DataResponse, ImageResponse};
use crate::state::AppState;

/// Body of a single image upload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveImageRequest {
    pub image_url: String,
}

/// One entry of `POST /images/menu-items/batch`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchImageEntry {
    pub item_id: DbId,
    pub image_url: String,
}

/// Body of `POST /images/menu-items/batch`.
///
/// Entries are kept as raw JSON so a malformed one can be reported by
/// position instead of failing the whole body.
#[derive(Debug, Deserialize)]
pub struct BatchImageRequest {
    pub images: Vec<serde_json::Value>,
}

/// Confirmation of a stored image.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedImage {
    pub key: String,
    pub bytes: usize,
    pub updated_at: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct BatchSaved {
    pub saved: usize,
}

/// The legacy mirror outcome is logged by the resolver and not part of
/// the response.
fn saved_image(write: OverrideWrite) -> SavedImage {
    SavedImage {
        bytes: write.record.value.len(),
        key: write.record.key,
        updated_at: write.record.updated_at,
    }
}

fn site_slot(slot: &str) -> AppResult<&'static str> {
    SITE_IMAGE_SLOTS
        .iter()
        .copied()
        .find(|s| *s == slot)
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Unknown image slot '{slot}', expected one of: {}",
                SITE_IMAGE_SLOTS.join(", ")
            )))
        })
}

/// Read an image, turning any store failure into "no image".
async fn read_image_or_none(state: &AppState, scope: &str, id: Option<DbId>) -> ImageResponse {
    let image_url = match ContentResolver::get_image(&state.pool, scope, id).await {
        Ok(Some(image)) if image.len() > TRANSPORT_GATE_BYTES => fit_for_transport(image).await,
        Ok(image) => image,
        Err(e) => {
            tracing::warn!(scope, id, error = %e, "Image read failed, serving no image");
            None
        }
    };
    ImageResponse { image_url }
}

/// Re-encode a stored image that is too large to send back in one response.
async fn fit_for_transport(image: String) -> Option<String> {
    let stored = image.len();
    match tokio::task::spawn_blocking(move || prepare_for_transport(&image)).await {
        Ok(Ok(fitted)) => {
            tracing::debug!(stored, served = fitted.len(), "Image re-encoded for transport");
            Some(fitted.into_string())
        }
        Ok(Err(e)) => {
            tracing::warn!(stored, error = %e, "Image does not fit the transport gate, serving no image");
            None
        }
        Err(e) => {
            tracing::error!(error = %e, "Image re-encode task failed");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Menu item images
// ---------------------------------------------------------------------------

/// GET /api/v1/images/menu-items/{itemId}
pub async fn get_menu_item_image(
    State(state): State<AppState>,
    ApiPath(item_id): ApiPath<DbId>,
) -> impl IntoResponse {
    Json(read_image_or_none(&state, MENU_ITEM_KIND, Some(item_id)).await)
}

/// POST /api/v1/images/menu-items/{itemId}
pub async fn save_menu_item_image(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(item_id): ApiPath<DbId>,
    ApiJson(input): ApiJson<SaveImageRequest>,
) -> AppResult<impl IntoResponse> {
    state.catalog.require(item_id)?;
    let image = normalize_for_storage(&input.image_url)?;
    ensure_store_reachable(&state).await?;

    let write = ContentResolver::set_image(&state.pool, MENU_ITEM_KIND, Some(item_id), &image).await?;

    tracing::info!(
        item_id,
        bytes = image.len(),
        mirror = ?write.mirror,
        "Menu item image saved"
    );

    Ok(Json(DataResponse {
        data: saved_image(write),
    }))
}

/// DELETE /api/v1/images/menu-items/{itemId}
///
/// Removes the override and the legacy copy; later reads return no image.
pub async fn delete_menu_item_image(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(item_id): ApiPath<DbId>,
) -> AppResult<impl IntoResponse> {
    state.catalog.require(item_id)?;
    ensure_store_reachable(&state).await?;

    let removed = ContentResolver::delete_image(&state.pool, MENU_ITEM_KIND, Some(item_id)).await?;

    tracing::info!(item_id, removed, "Menu item image deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Validate every batch entry, collecting all failures.
fn validate_batch(
    state: &AppState,
    entries: Vec<serde_json::Value>,
) -> Result<Vec<(DbId, InlineImage)>, CoreError> {
    if entries.is_empty() {
        return Err(CoreError::Validation("Batch contains no images".into()));
    }

    let mut failures = Vec::new();
    let mut images = Vec::with_capacity(entries.len());
    let mut seen = HashSet::new();

    for (index, raw) in entries.into_iter().enumerate() {
        let raw_id = raw.get("itemId").and_then(serde_json::Value::as_i64);
        let mut fail = |reason: String| {
            failures.push(BatchFailure {
                index,
                item_id: raw_id,
                reason,
            });
        };

        let entry: BatchImageEntry = match serde_json::from_value(raw) {
            Ok(entry) => entry,
            Err(e) => {
                fail(format!("Malformed entry: {e}"));
                continue;
            }
        };
        if !state.catalog.contains(entry.item_id) {
            fail(format!("Unknown menu item {}", entry.item_id));
            continue;
        }
        if !seen.insert(entry.item_id) {
            fail(format!("Menu item {} appears more than once", entry.item_id));
            continue;
        }
        match normalize_for_storage(&entry.image_url) {
            Ok(image) => images.push((entry.item_id, image)),
            Err(e) => fail(e.to_string()),
        }
    }

    if failures.is_empty() {
        Ok(images)
    } else {
        Err(CoreError::BatchRejected(failures))
    }
}

/// POST /api/v1/images/menu-items/batch
///
/// All images are stored or none are. Validation failures are reported per
/// entry; a failed or timed-out transaction is reported as a whole. Only the
/// transaction is timed: legacy mirrors run afterwards in the background and
/// cannot change the response.
pub async fn save_menu_item_images_batch(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<BatchImageRequest>,
) -> AppResult<impl IntoResponse> {
    let images = validate_batch(&state, input.images)?;
    ensure_store_reachable(&state).await?;

    let timeout = state.config.batch_timeout();
    let saved = tokio::time::timeout(
        timeout,
        ContentResolver::save_menu_item_images(&state.pool, &images, timeout),
    )
    .await
    .map_err(|_| {
        tracing::error!(
            count = images.len(),
            timeout_secs = timeout.as_secs(),
            "Batch image transaction timed out, rolled back"
        );
        AppError::Core(CoreError::StoreUnavailable(format!(
            "batch transaction exceeded {}s",
            timeout.as_secs()
        )))
    })??;

    tracing::info!(count = saved, "Menu item image batch saved");

    let pool = state.pool.clone();
    tokio::spawn(async move {
        let outcomes = ContentResolver::mirror_menu_item_images(&pool, &images).await;
        let failed = outcomes
            .iter()
            .filter(|outcome| **outcome == MirrorOutcome::Failed)
            .count();
        tracing::debug!(count = outcomes.len(), failed, "Batch legacy mirror finished");
    });

    Ok(Json(DataResponse {
        data: BatchSaved { saved },
    }))
}

// ---------------------------------------------------------------------------
// Site images
// ---------------------------------------------------------------------------

/// GET /api/v1/images/site/{slot}
pub async fn get_site_image(
    State(state): State<AppState>,
    ApiPath(slot): ApiPath<String>,
) -> AppResult<impl IntoResponse> {
    let slot = site_slot(&slot)?;
    Ok(Json(read_image_or_none(&state, slot, None).await))
}

/// POST /api/v1/images/site/{slot}
pub async fn save_site_image(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(slot): ApiPath<String>,
    ApiJson(input): ApiJson<SaveImageRequest>,
) -> AppResult<impl IntoResponse> {
    let slot = site_slot(&slot)?;
    let image = normalize_for_storage(&input.image_url)?;
    ensure_store_reachable(&state).await?;

    let write = ContentResolver::set_image(&state.pool, slot, None, &image).await?;

    tracing::info!(slot, bytes = image.len(), "Site image saved");

    Ok(Json(DataResponse {
        data: saved_image(write),
    }))
}

/// DELETE /api/v1/images/site/{slot}
pub async fn delete_site_image(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(slot): ApiPath<String>,
) -> AppResult<impl IntoResponse> {
    let slot = site_slot(&slot)?;
    ensure_store_reachable(&state).await?;

    let removed = ContentResolver::delete_image(&state.pool, slot, None).await?;

    tracing::info!(slot, removed, "Site image deleted");

    Ok(StatusCode::NO_CONTENT)
}
