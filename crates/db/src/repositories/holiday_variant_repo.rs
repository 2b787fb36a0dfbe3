//! Repository for holiday variants and their dish lists.

use sqlx::PgPool;
use trattoria_core::types::DbId;

use crate::models::holiday::{
    CreateHolidayDish, CreateHolidayVariant, HolidayMenuItemVariant, HolidayMenuVariant,
    UpdateHolidayDish, UpdateHolidayVariant,
};

/// Column list for the `holiday_menu_variants` table.
const COLUMNS: &str =
    "id, holiday_id, title, menu_text, menu_price, menu_images, sort_order, created_at";

/// Column list for the `holiday_menu_item_variants` table.
const ITEM_COLUMNS: &str = "id, variant_id, name, ingredients, price, image, created_at";

/// Restricts a variant-dish statement to variants of holiday `$1`.
const OWNED_VARIANT: &str =
    "variant_id IN (SELECT id FROM holiday_menu_variants WHERE id = $2 AND holiday_id = $1)";

/// Provides data access for holiday variants.
pub struct HolidayVariantRepo;

impl HolidayVariantRepo {
    /// Add a variant. Without an explicit `order` it goes after the last one.
    ///
    /// Returns `None` when the holiday does not exist.
    pub async fn create(
        pool: &PgPool,
        holiday_id: DbId,
        input: &CreateHolidayVariant,
    ) -> Result<Option<HolidayMenuVariant>, sqlx::Error> {
        let query = format!(
            "INSERT INTO holiday_menu_variants \
                 (holiday_id, title, menu_text, menu_price, menu_images, sort_order) \
             SELECT $1, $2, $3, $4, $5, COALESCE($6, ( \
                 SELECT COALESCE(MAX(sort_order), -1) + 1 \
                 FROM holiday_menu_variants WHERE holiday_id = $1)) \
             WHERE EXISTS (SELECT 1 FROM holiday_menus WHERE id = $1) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, HolidayMenuVariant>(&query)
            .bind(holiday_id)
            .bind(&input.title)
            .bind(&input.text)
            .bind(input.price)
            .bind(&input.images)
            .bind(input.order)
            .fetch_optional(pool)
            .await
    }

    /// Update a variant. Absent fields keep their values; explicit `null`
    /// clears `text` and `price`.
    pub async fn update(
        pool: &PgPool,
        holiday_id: DbId,
        variant_id: DbId,
        input: &UpdateHolidayVariant,
    ) -> Result<Option<HolidayMenuVariant>, sqlx::Error> {
        let query = format!(
            "UPDATE holiday_menu_variants SET \
                 title = COALESCE($3, title), \
                 menu_text = CASE WHEN $4 THEN $5 ELSE menu_text END, \
                 menu_price = CASE WHEN $6 THEN $7 ELSE menu_price END, \
                 menu_images = COALESCE($8, menu_images), \
                 sort_order = COALESCE($9, sort_order) \
             WHERE id = $2 AND holiday_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, HolidayMenuVariant>(&query)
            .bind(holiday_id)
            .bind(variant_id)
            .bind(&input.title)
            .bind(input.text.is_some())
            .bind(input.text.clone().flatten())
            .bind(input.price.is_some())
            .bind(input.price.flatten())
            .bind(&input.images)
            .bind(input.order)
            .fetch_optional(pool)
            .await
    }

    /// Delete a variant and its dishes. Returns `true` if a row was removed.
    pub async fn delete(
        pool: &PgPool,
        holiday_id: DbId,
        variant_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM holiday_menu_variants WHERE id = $2 AND holiday_id = $1")
                .bind(holiday_id)
                .bind(variant_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    // -- Variant dishes -----------------------------------------------------

    /// Add a dish to a variant. Returns `None` when the variant does not
    /// exist under `holiday_id`.
    pub async fn create_item(
        pool: &PgPool,
        holiday_id: DbId,
        variant_id: DbId,
        input: &CreateHolidayDish,
    ) -> Result<Option<HolidayMenuItemVariant>, sqlx::Error> {
        let query = format!(
            "INSERT INTO holiday_menu_item_variants (variant_id, name, ingredients, price, image) \
             SELECT $2, $3, $4, $5, $6 \
             WHERE EXISTS ( \
                 SELECT 1 FROM holiday_menu_variants WHERE id = $2 AND holiday_id = $1) \
             RETURNING {ITEM_COLUMNS}"
        );
        sqlx::query_as::<_, HolidayMenuItemVariant>(&query)
            .bind(holiday_id)
            .bind(variant_id)
            .bind(&input.name)
            .bind(&input.ingredients)
            .bind(input.price)
            .bind(&input.image)
            .fetch_optional(pool)
            .await
    }

    /// Update a variant dish; same field semantics as flat dishes.
    pub async fn update_item(
        pool: &PgPool,
        holiday_id: DbId,
        variant_id: DbId,
        item_id: DbId,
        input: &UpdateHolidayDish,
    ) -> Result<Option<HolidayMenuItemVariant>, sqlx::Error> {
        let query = format!(
            "UPDATE holiday_menu_item_variants SET \
                 name = COALESCE($4, name), \
                 price = COALESCE($5, price), \
                 ingredients = COALESCE($6, ingredients), \
                 image = CASE WHEN $7 THEN $8 ELSE image END \
             WHERE id = $3 AND {OWNED_VARIANT} \
             RETURNING {ITEM_COLUMNS}"
        );
        sqlx::query_as::<_, HolidayMenuItemVariant>(&query)
            .bind(holiday_id)
            .bind(variant_id)
            .bind(item_id)
            .bind(&input.name)
            .bind(input.price)
            .bind(&input.ingredients)
            .bind(input.image.is_some())
            .bind(input.image.clone().flatten())
            .fetch_optional(pool)
            .await
    }

    /// Remove a variant dish. Returns `true` if a row was removed.
    pub async fn delete_item(
        pool: &PgPool,
        holiday_id: DbId,
        variant_id: DbId,
        item_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let query =
            format!("DELETE FROM holiday_menu_item_variants WHERE id = $3 AND {OWNED_VARIANT}");
        let result = sqlx::query(&query)
            .bind(holiday_id)
            .bind(variant_id)
            .bind(item_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
