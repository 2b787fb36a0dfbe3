//! Repository for `holiday_menus` and tree-shaped reads over its children.

use std::collections::HashMap;

use sqlx::PgPool;
use trattoria_core::types::DbId;

use crate::models::holiday::{
    HolidayMenu, HolidayMenuItem, HolidayMenuItemVariant, HolidayMenuTree, HolidayMenuVariant,
    HolidayVariantTree, UpsertHolidayMenu,
};

/// Column list for the `holiday_menus` table.
const COLUMNS: &str = "id, name, display_name, preview_image, menu_text, menu_price, \
     menu_images, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, holiday_id, name, ingredients, price, image, created_at";

const VARIANT_COLUMNS: &str =
    "id, holiday_id, title, menu_text, menu_price, menu_images, sort_order, created_at";

/// Provides data access for holiday menus.
pub struct HolidayRepo;

impl HolidayRepo {
    /// Find a holiday row by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<HolidayMenu>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM holiday_menus WHERE id = $1");
        sqlx::query_as::<_, HolidayMenu>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a holiday row by its slug.
    pub async fn find_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<HolidayMenu>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM holiday_menus WHERE name = $1");
        sqlx::query_as::<_, HolidayMenu>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Every holiday with its dishes and variants, ordered by id.
    pub async fn list_tree(pool: &PgPool) -> Result<Vec<HolidayMenuTree>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM holiday_menus ORDER BY id");
        let holidays = sqlx::query_as::<_, HolidayMenu>(&query)
            .fetch_all(pool)
            .await?;
        Self::attach_children(pool, holidays).await
    }

    /// One holiday tree, looked up by slug.
    pub async fn find_tree_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<HolidayMenuTree>, sqlx::Error> {
        let Some(holiday) = Self::find_by_name(pool, name).await? else {
            return Ok(None);
        };
        Ok(Self::attach_children(pool, vec![holiday]).await?.pop())
    }

    /// Create a holiday or update the one with the same `name`.
    ///
    /// The id is stable across upserts. On update, fields absent from the
    /// payload keep their stored values; `display_name` falls back to `name`
    /// only when the row is first inserted.
    pub async fn upsert_by_name(
        pool: &PgPool,
        input: &UpsertHolidayMenu,
    ) -> Result<HolidayMenu, sqlx::Error> {
        let query = format!(
            "INSERT INTO holiday_menus \
                 (name, display_name, preview_image, menu_text, menu_price, menu_images) \
             VALUES ($1, COALESCE($2, $1), $4, $6, $8, COALESCE($10, '{{}}')) \
             ON CONFLICT (name) DO UPDATE SET \
                 display_name = COALESCE($2, holiday_menus.display_name), \
                 preview_image = CASE WHEN $3 THEN EXCLUDED.preview_image \
                     ELSE holiday_menus.preview_image END, \
                 menu_text = CASE WHEN $5 THEN EXCLUDED.menu_text \
                     ELSE holiday_menus.menu_text END, \
                 menu_price = CASE WHEN $7 THEN EXCLUDED.menu_price \
                     ELSE holiday_menus.menu_price END, \
                 menu_images = CASE WHEN $9 THEN EXCLUDED.menu_images \
                     ELSE holiday_menus.menu_images END, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, HolidayMenu>(&query)
            .bind(&input.name)
            .bind(&input.display_name)
            .bind(input.preview_image.is_some())
            .bind(input.preview_image.clone().flatten())
            .bind(input.menu_text.is_some())
            .bind(input.menu_text.clone().flatten())
            .bind(input.menu_price.is_some())
            .bind(input.menu_price.flatten())
            .bind(input.menu_images.is_some())
            .bind(input.menu_images.clone().flatten())
            .fetch_one(pool)
            .await
    }

    /// Delete a holiday; its dishes and variants go with it.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM holiday_menus WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Load dishes, variants and variant dishes for `holidays` in three
    /// queries and assemble the trees in input order.
    async fn attach_children(
        pool: &PgPool,
        holidays: Vec<HolidayMenu>,
    ) -> Result<Vec<HolidayMenuTree>, sqlx::Error> {
        if holidays.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<DbId> = holidays.iter().map(|h| h.id).collect();

        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM holiday_menu_items \
             WHERE holiday_id = ANY($1) ORDER BY id"
        );
        let items = sqlx::query_as::<_, HolidayMenuItem>(&query)
            .bind(&ids)
            .fetch_all(pool)
            .await?;

        let query = format!(
            "SELECT {VARIANT_COLUMNS} FROM holiday_menu_variants \
             WHERE holiday_id = ANY($1) ORDER BY sort_order, id"
        );
        let variants = sqlx::query_as::<_, HolidayMenuVariant>(&query)
            .bind(&ids)
            .fetch_all(pool)
            .await?;

        let variant_items = sqlx::query_as::<_, HolidayMenuItemVariant>(
            "SELECT iv.id, iv.variant_id, iv.name, iv.ingredients, iv.price, iv.image, iv.created_at \
             FROM holiday_menu_item_variants iv \
             JOIN holiday_menu_variants v ON v.id = iv.variant_id \
             WHERE v.holiday_id = ANY($1) \
             ORDER BY iv.id",
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;

        let mut items_by_variant: HashMap<DbId, Vec<HolidayMenuItemVariant>> = HashMap::new();
        for item in variant_items {
            items_by_variant.entry(item.variant_id).or_default().push(item);
        }

        let mut variants_by_holiday: HashMap<DbId, Vec<HolidayVariantTree>> = HashMap::new();
        for variant in variants {
            let items = items_by_variant.remove(&variant.id).unwrap_or_default();
            variants_by_holiday
                .entry(variant.holiday_id)
                .or_default()
                .push(HolidayVariantTree { variant, items });
        }

        let mut items_by_holiday: HashMap<DbId, Vec<HolidayMenuItem>> = HashMap::new();
        for item in items {
            items_by_holiday.entry(item.holiday_id).or_default().push(item);
        }

        Ok(holidays
            .into_iter()
            .map(|holiday| {
                let items = items_by_holiday.remove(&holiday.id).unwrap_or_default();
                let variants = variants_by_holiday.remove(&holiday.id).unwrap_or_default();
                HolidayMenuTree::new(holiday, items, variants)
            })
            .collect())
    }
}
