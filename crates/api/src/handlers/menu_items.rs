//! Handlers for catalog menu items: the resolved menu, the raw override map
//! and partial overrides.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use trattoria_core::catalog::{validate_name, validate_price};
use trattoria_core::error::CoreError;
use trattoria_core::override_keys::{MenuItemField, MenuItemOverrides};
use trattoria_core::types::DbId;
use trattoria_db::models::menu_item::PatchMenuItem;
use trattoria_db::resolution::ContentResolver;
use trattoria_db::with_schema_repair;

use super::ensure_store_reachable;
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::admin::RequireAdmin;
use crate::query::IncludeHiddenParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response of `PATCH /menu-items/{id}`: the overrides now stored for the item.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchedMenuItem {
    pub id: DbId,
    pub overrides: MenuItemOverrides,
}

/// One field change derived from a patch: `Some` sets, `None` clears.
type FieldChange = (MenuItemField, Option<String>);

/// Validate a patch against the catalog and flatten it into field changes.
fn plan_patch(state: &AppState, patch: PatchMenuItem) -> AppResult<Vec<FieldChange>> {
    if patch.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Patch must contain at least one of: name, price, hidden, categoryId".into(),
        )));
    }

    let mut changes = Vec::new();

    if let Some(name) = patch.name {
        if let Some(name) = &name {
            validate_name(name)?;
        }
        changes.push((MenuItemField::Name, name.map(|n| n.trim().to_string())));
    }
    if let Some(price) = patch.price {
        if let Some(price) = price {
            validate_price(price)?;
        }
        changes.push((MenuItemField::Price, price.map(|p| p.to_string())));
    }
    if let Some(hidden) = patch.hidden {
        changes.push((MenuItemField::Hidden, hidden.map(|h| h.to_string())));
    }
    if let Some(category_id) = patch.category_id {
        if let Some(category_id) = category_id {
            if !state.catalog.has_category(category_id) {
                return Err(AppError::Core(CoreError::Validation(format!(
                    "Unknown category {category_id}"
                ))));
            }
        }
        changes.push((MenuItemField::Category, category_id.map(|c| c.to_string())));
    }

    Ok(changes)
}

/// GET /api/v1/menu-items
///
/// The catalog merged with overrides and images. Hidden items are left out
/// unless `?include_hidden=true`.
pub async fn list_menu(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<IncludeHiddenParams>,
) -> AppResult<impl IntoResponse> {
    let menu = with_schema_repair(&state.pool, || {
        ContentResolver::resolved_menu(&state.pool, &state.catalog, params.include_hidden)
    })
    .await?;

    Ok(Json(DataResponse { data: menu }))
}

/// GET /api/v1/menu-items/overrides
///
/// Text overrides for every catalog item, keyed by item id. Keys that do not
/// parse are skipped.
pub async fn list_overrides(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let overrides =
        with_schema_repair(&state.pool, || ContentResolver::menu_item_overrides(&state.pool))
            .await?;

    Ok(Json(DataResponse { data: overrides }))
}

/// PATCH /api/v1/menu-items/{itemId}
///
/// Absent fields are untouched, `null` reverts a field to the catalog value.
/// All fields of one patch are stored together or not at all.
pub async fn patch_menu_item(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(item_id): ApiPath<DbId>,
    ApiJson(patch): ApiJson<PatchMenuItem>,
) -> AppResult<impl IntoResponse> {
    state.catalog.require(item_id)?;
    let changes = plan_patch(&state, patch)?;
    ensure_store_reachable(&state).await?;

    let mirrors = ContentResolver::patch_menu_item(&state.pool, item_id, &changes).await?;
    tracing::debug!(item_id, ?mirrors, "Legacy mirror outcomes");

    let overrides = ContentResolver::menu_item_overrides(&state.pool)
        .await?
        .remove(&item_id)
        .unwrap_or_default();

    tracing::info!(item_id, fields = changes.len(), "Menu item overrides updated");

    Ok(Json(DataResponse {
        data: PatchedMenuItem {
            id: item_id,
            overrides,
        },
    }))
}
