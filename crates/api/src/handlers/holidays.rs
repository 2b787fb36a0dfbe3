//! Handlers for holiday menus, their flat dishes, variants and variant
//! dishes.
//!
//! Reads return the full tree with the resolved presentation state; writes
//! are admin-only and validate before touching the store.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use trattoria_core::catalog::{validate_name, validate_price};
use trattoria_core::error::CoreError;
use trattoria_core::holiday::{normalize_ingredients, validate_dish, validate_slug};
use trattoria_core::types::DbId;
use trattoria_db::models::holiday::{
    CreateHolidayDish, CreateHolidayVariant, UpdateHolidayDish, UpdateHolidayVariant,
    UpsertHolidayMenu,
};
use trattoria_db::repositories::{HolidayItemRepo, HolidayRepo, HolidayVariantRepo};
use trattoria_db::with_schema_repair;

use super::{ensure_store_reachable, storable_image, storable_images};
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::admin::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(entity: &'static str, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity, id })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn prepare_upsert(mut input: UpsertHolidayMenu) -> AppResult<UpsertHolidayMenu> {
    input.name = input.name.trim().to_string();
    validate_slug(&input.name)?;

    if let Some(display_name) = input.display_name.as_mut() {
        validate_name(display_name)?;
        *display_name = display_name.trim().to_string();
    }
    if let Some(Some(price)) = input.menu_price {
        validate_price(price)?;
    }
    if let Some(text) = input.menu_text.as_mut() {
        // Blank text is stored as NULL.
        if text.as_deref().is_some_and(|t| t.trim().is_empty()) {
            *text = None;
        }
    }
    if let Some(Some(image)) = input.preview_image.as_mut() {
        *image = storable_image(image)?;
    }
    if let Some(Some(images)) = input.menu_images.as_mut() {
        *images = storable_images(images)?;
    }

    Ok(input)
}

fn prepare_new_dish(mut input: CreateHolidayDish) -> AppResult<CreateHolidayDish> {
    validate_dish(&input.name, input.price)?;
    input.name = input.name.trim().to_string();
    input.ingredients = normalize_ingredients(input.ingredients);
    if let Some(image) = input.image.as_mut() {
        *image = storable_image(image)?;
    }
    Ok(input)
}

fn prepare_dish_update(mut input: UpdateHolidayDish) -> AppResult<UpdateHolidayDish> {
    if let Some(name) = input.name.as_mut() {
        validate_name(name)?;
        *name = name.trim().to_string();
    }
    if let Some(price) = input.price {
        validate_price(price)?;
    }
    input.ingredients = input.ingredients.map(normalize_ingredients);
    if let Some(Some(image)) = input.image.as_mut() {
        *image = storable_image(image)?;
    }
    Ok(input)
}

fn prepare_new_variant(mut input: CreateHolidayVariant) -> AppResult<CreateHolidayVariant> {
    validate_name(&input.title)?;
    input.title = input.title.trim().to_string();
    if let Some(price) = input.price {
        validate_price(price)?;
    }
    input.images = storable_images(&input.images)?;
    Ok(input)
}

fn prepare_variant_update(mut input: UpdateHolidayVariant) -> AppResult<UpdateHolidayVariant> {
    if let Some(title) = input.title.as_mut() {
        validate_name(title)?;
        *title = title.trim().to_string();
    }
    if let Some(Some(price)) = input.price {
        validate_price(price)?;
    }
    if let Some(images) = input.images.as_mut() {
        *images = storable_images(images)?;
    }
    Ok(input)
}

// ---------------------------------------------------------------------------
// Holidays
// ---------------------------------------------------------------------------

/// GET /api/v1/holidays
///
/// Every holiday with dishes and variants, ordered by id.
pub async fn list_holidays(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let holidays = with_schema_repair(&state.pool, || HolidayRepo::list_tree(&state.pool)).await?;

    Ok(Json(DataResponse { data: holidays }))
}

/// GET /api/v1/holidays/slug/{name}
///
/// One holiday as the public page renders it: header plus a single
/// presentation state.
pub async fn get_holiday_by_slug(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
) -> AppResult<impl IntoResponse> {
    let tree = with_schema_repair(&state.pool, || HolidayRepo::find_tree_by_name(&state.pool, &name))
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundByName {
                entity: "HolidayMenu",
                name: name.clone(),
            })
        })?;

    Ok(Json(DataResponse {
        data: tree.into_view(),
    }))
}

/// POST /api/v1/holidays
///
/// Create a holiday or update the one with the same `name`.
pub async fn upsert_holiday(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<UpsertHolidayMenu>,
) -> AppResult<impl IntoResponse> {
    let input = prepare_upsert(input)?;
    ensure_store_reachable(&state).await?;

    let holiday = HolidayRepo::upsert_by_name(&state.pool, &input).await?;

    tracing::info!(holiday_id = holiday.id, name = %holiday.name, "Holiday menu upserted");

    Ok(Json(DataResponse { data: holiday }))
}

/// DELETE /api/v1/holidays/{id}
///
/// Deletes the holiday with all of its dishes and variants.
pub async fn delete_holiday(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(holiday_id): ApiPath<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_store_reachable(&state).await?;

    if !HolidayRepo::delete(&state.pool, holiday_id).await? {
        return Err(not_found("HolidayMenu", holiday_id));
    }

    tracing::info!(holiday_id, "Holiday menu deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Flat dishes
// ---------------------------------------------------------------------------

/// POST /api/v1/holidays/{id}/items
pub async fn create_item(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(holiday_id): ApiPath<DbId>,
    ApiJson(input): ApiJson<CreateHolidayDish>,
) -> AppResult<impl IntoResponse> {
    let input = prepare_new_dish(input)?;
    ensure_store_reachable(&state).await?;

    let item = HolidayItemRepo::create(&state.pool, holiday_id, &input)
        .await?
        .ok_or_else(|| not_found("HolidayMenu", holiday_id))?;

    tracing::info!(holiday_id, item_id = item.id, "Holiday dish created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// PUT /api/v1/holidays/{id}/items/{itemId}
pub async fn update_item(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath((holiday_id, item_id)): ApiPath<(DbId, DbId)>,
    ApiJson(input): ApiJson<UpdateHolidayDish>,
) -> AppResult<impl IntoResponse> {
    let input = prepare_dish_update(input)?;
    ensure_store_reachable(&state).await?;

    let item = HolidayItemRepo::update(&state.pool, holiday_id, item_id, &input)
        .await?
        .ok_or_else(|| not_found("HolidayMenuItem", item_id))?;

    tracing::info!(holiday_id, item_id, "Holiday dish updated");

    Ok(Json(DataResponse { data: item }))
}

/// DELETE /api/v1/holidays/{id}/items/{itemId}
pub async fn delete_item(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath((holiday_id, item_id)): ApiPath<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    ensure_store_reachable(&state).await?;

    if !HolidayItemRepo::delete(&state.pool, holiday_id, item_id).await? {
        return Err(not_found("HolidayMenuItem", item_id));
    }

    tracing::info!(holiday_id, item_id, "Holiday dish deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

/// POST /api/v1/holidays/{id}/variants
///
/// Without `order` the variant is placed after the last one.
pub async fn create_variant(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(holiday_id): ApiPath<DbId>,
    ApiJson(input): ApiJson<CreateHolidayVariant>,
) -> AppResult<impl IntoResponse> {
    let input = prepare_new_variant(input)?;
    ensure_store_reachable(&state).await?;

    let variant = HolidayVariantRepo::create(&state.pool, holiday_id, &input)
        .await?
        .ok_or_else(|| not_found("HolidayMenu", holiday_id))?;

    tracing::info!(
        holiday_id,
        variant_id = variant.id,
        order = variant.sort_order,
        "Holiday variant created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: variant })))
}

/// PUT /api/v1/holidays/{id}/variants/{variantId}
pub async fn update_variant(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath((holiday_id, variant_id)): ApiPath<(DbId, DbId)>,
    ApiJson(input): ApiJson<UpdateHolidayVariant>,
) -> AppResult<impl IntoResponse> {
    let input = prepare_variant_update(input)?;
    ensure_store_reachable(&state).await?;

    let variant = HolidayVariantRepo::update(&state.pool, holiday_id, variant_id, &input)
        .await?
        .ok_or_else(|| not_found("HolidayMenuVariant", variant_id))?;

    tracing::info!(holiday_id, variant_id, "Holiday variant updated");

    Ok(Json(DataResponse { data: variant }))
}

/// DELETE /api/v1/holidays/{id}/variants/{variantId}
///
/// Deleting the last variant brings the flat menu back into view.
pub async fn delete_variant(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath((holiday_id, variant_id)): ApiPath<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    ensure_store_reachable(&state).await?;

    if !HolidayVariantRepo::delete(&state.pool, holiday_id, variant_id).await? {
        return Err(not_found("HolidayMenuVariant", variant_id));
    }

    tracing::info!(holiday_id, variant_id, "Holiday variant deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Variant dishes
// ---------------------------------------------------------------------------

/// POST /api/v1/holidays/{id}/variants/{variantId}/items
pub async fn create_variant_item(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath((holiday_id, variant_id)): ApiPath<(DbId, DbId)>,
    ApiJson(input): ApiJson<CreateHolidayDish>,
) -> AppResult<impl IntoResponse> {
    let input = prepare_new_dish(input)?;
    ensure_store_reachable(&state).await?;

    let item = HolidayVariantRepo::create_item(&state.pool, holiday_id, variant_id, &input)
        .await?
        .ok_or_else(|| not_found("HolidayMenuVariant", variant_id))?;

    tracing::info!(holiday_id, variant_id, item_id = item.id, "Variant dish created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// PUT /api/v1/holidays/{id}/variants/{variantId}/items/{itemId}
pub async fn update_variant_item(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath((holiday_id, variant_id, item_id)): ApiPath<(DbId, DbId, DbId)>,
    ApiJson(input): ApiJson<UpdateHolidayDish>,
) -> AppResult<impl IntoResponse> {
    let input = prepare_dish_update(input)?;
    ensure_store_reachable(&state).await?;

    let item =
        HolidayVariantRepo::update_item(&state.pool, holiday_id, variant_id, item_id, &input)
            .await?
            .ok_or_else(|| not_found("HolidayMenuItemVariant", item_id))?;

    tracing::info!(holiday_id, variant_id, item_id, "Variant dish updated");

    Ok(Json(DataResponse { data: item }))
}

/// DELETE /api/v1/holidays/{id}/variants/{variantId}/items/{itemId}
pub async fn delete_variant_item(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath((holiday_id, variant_id, item_id)): ApiPath<(DbId, DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    ensure_store_reachable(&state).await?;

    if !HolidayVariantRepo::delete_item(&state.pool, holiday_id, variant_id, item_id).await? {
        return Err(not_found("HolidayMenuItemVariant", item_id));
    }

    tracing::info!(holiday_id, variant_id, item_id, "Variant dish deleted");

    Ok(StatusCode::NO_CONTENT)
}
