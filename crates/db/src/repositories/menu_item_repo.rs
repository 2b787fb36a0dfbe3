//! Repository for the legacy `menu_items` table.
//!
//! Only reads and column updates: rows are never created here, and an
//! update that matches no row is not an error.

use sqlx::PgPool;
use trattoria_core::types::DbId;

use crate::models::menu_item::MenuItem;

/// Column list for the `menu_items` table.
const COLUMNS: &str = "id, name, price, category_id, image, updated_at";

/// Provides data access for legacy menu item rows.
pub struct MenuItemRepo;

impl MenuItemRepo {
    /// Find a legacy row by catalog id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<MenuItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM menu_items WHERE id = $1");
        sqlx::query_as::<_, MenuItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The legacy image column for `id`, if the row exists and has one.
    pub async fn find_image(pool: &PgPool, id: DbId) -> Result<Option<String>, sqlx::Error> {
        let image = sqlx::query_scalar::<_, Option<String>>("SELECT image FROM menu_items WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(image.flatten())
    }

    /// Every legacy row that carries an image.
    pub async fn list_images(pool: &PgPool) -> Result<Vec<(DbId, String)>, sqlx::Error> {
        sqlx::query_as::<_, (DbId, String)>(
            "SELECT id, image FROM menu_items WHERE image IS NOT NULL ORDER BY id",
        )
        .fetch_all(pool)
        .await
    }

    /// Set or clear the image column. Returns the number of rows touched.
    pub async fn update_image(
        pool: &PgPool,
        id: DbId,
        image: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE menu_items SET image = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(image)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// Overwrite name and/or price. `None` leaves a column as it is.
    pub async fn update_fields(
        pool: &PgPool,
        id: DbId,
        name: Option<&str>,
        price: Option<f64>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE menu_items SET \
                 name = COALESCE($2, name), \
                 price = COALESCE($3, price), \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(name)
        .bind(price)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
