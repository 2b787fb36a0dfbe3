//! Handlers for the owner profile.
//!
//! The owner photo is read through a fallback chain: the structured `staff`
//! row first, then the `owner_image` override key. The `owner` site image
//! slot shares that chain. Responses are never cached.

use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, EXPIRES, PRAGMA};
use axum::response::IntoResponse;
use axum::Json;
use trattoria_core::catalog::validate_name;
use trattoria_db::models::staff::{OwnerImageSource, OwnerProfile, UpsertOwner};
use trattoria_db::repositories::StaffRepo;
use trattoria_db::resolution::ContentResolver;

use super::{ensure_store_reachable, storable_image};
use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::middleware::admin::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Headers that keep browsers and proxies from caching a response.
const NO_STORE: [(axum::http::HeaderName, &str); 3] = [
    (CACHE_CONTROL, "no-store, no-cache, must-revalidate, max-age=0"),
    (PRAGMA, "no-cache"),
    (EXPIRES, "0"),
];

/// GET /api/v1/staff/owner
///
/// Degrades to an empty profile when the store cannot be read.
pub async fn get_owner(State(state): State<AppState>) -> impl IntoResponse {
    let profile = ContentResolver::owner_profile(&state.pool).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Owner profile read failed, serving empty profile");
        OwnerProfile::empty()
    });

    (NO_STORE, Json(DataResponse { data: profile }))
}

/// POST /api/v1/staff/owner
///
/// Writes the staff row and the `owner_image` key in one transaction.
pub async fn save_owner(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<UpsertOwner>,
) -> AppResult<impl IntoResponse> {
    let name = match input.name.as_deref() {
        Some(name) => {
            validate_name(name)?;
            Some(name.trim())
        }
        None => None,
    };
    let image = storable_image(&input.image_url)?;
    ensure_store_reachable(&state).await?;

    let (owner, _) = StaffRepo::upsert_owner(&state.pool, name, &image).await?;

    tracing::info!(staff_id = owner.id, bytes = image.len(), "Owner profile saved");

    Ok((
        NO_STORE,
        Json(DataResponse {
            data: OwnerProfile {
                name: owner.name,
                image_url: owner.image,
                source: OwnerImageSource::Staff,
            },
        }),
    ))
}
