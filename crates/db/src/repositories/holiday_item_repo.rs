//! Repository for the flat dish list of a holiday (`holiday_menu_items`).
//!
//! Every statement is scoped by `holiday_id`, so a dish id that belongs to a
//! different holiday behaves as not found.

use sqlx::PgPool;
use trattoria_core::types::DbId;

use crate::models::holiday::{CreateHolidayDish, HolidayMenuItem, UpdateHolidayDish};

/// Column list for the `holiday_menu_items` table.
const COLUMNS: &str = "id, holiday_id, name, ingredients, price, image, created_at";

/// Provides data access for flat holiday dishes.
pub struct HolidayItemRepo;

impl HolidayItemRepo {
    /// Add a dish. Returns `None` when the holiday does not exist.
    pub async fn create(
        pool: &PgPool,
        holiday_id: DbId,
        input: &CreateHolidayDish,
    ) -> Result<Option<HolidayMenuItem>, sqlx::Error> {
        let query = format!(
            "INSERT INTO holiday_menu_items (holiday_id, name, ingredients, price, image) \
             SELECT $1, $2, $3, $4, $5 \
             WHERE EXISTS (SELECT 1 FROM holiday_menus WHERE id = $1) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, HolidayMenuItem>(&query)
            .bind(holiday_id)
            .bind(&input.name)
            .bind(&input.ingredients)
            .bind(input.price)
            .bind(&input.image)
            .fetch_optional(pool)
            .await
    }

    /// Update a dish. Absent fields keep their values; `image: null` clears
    /// the image.
    pub async fn update(
        pool: &PgPool,
        holiday_id: DbId,
        item_id: DbId,
        input: &UpdateHolidayDish,
    ) -> Result<Option<HolidayMenuItem>, sqlx::Error> {
        let query = format!(
            "UPDATE holiday_menu_items SET \
                 name = COALESCE($3, name), \
                 price = COALESCE($4, price), \
                 ingredients = COALESCE($5, ingredients), \
                 image = CASE WHEN $6 THEN $7 ELSE image END \
             WHERE id = $2 AND holiday_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, HolidayMenuItem>(&query)
            .bind(holiday_id)
            .bind(item_id)
            .bind(&input.name)
            .bind(input.price)
            .bind(&input.ingredients)
            .bind(input.image.is_some())
            .bind(input.image.clone().flatten())
            .fetch_optional(pool)
            .await
    }

    /// Remove a dish. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, holiday_id: DbId, item_id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM holiday_menu_items WHERE id = $2 AND holiday_id = $1")
                .bind(holiday_id)
                .bind(item_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
