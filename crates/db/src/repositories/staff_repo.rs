//! Repository for the `staff` table.

use sqlx::PgPool;
use trattoria_core::override_keys::ValueType;

use crate::models::content_override::ContentOverride;
use crate::models::staff::{StaffMember, OWNER_ROLE};

/// Column list for the `staff` table.
const COLUMNS: &str = "id, role, name, image, updated_at";

/// Override key that mirrors the owner photo.
pub const OWNER_IMAGE_KEY: &str = "owner_image";

/// Provides data access for staff profile rows.
pub struct StaffRepo;

impl StaffRepo {
    /// Find the row for a role.
    pub async fn find_by_role(pool: &PgPool, role: &str) -> Result<Option<StaffMember>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM staff WHERE role = $1");
        sqlx::query_as::<_, StaffMember>(&query)
            .bind(role)
            .fetch_optional(pool)
            .await
    }

    /// Write the owner profile row and its override key together.
    ///
    /// A missing `name` keeps the stored one. Returns both written rows.
    pub async fn upsert_owner(
        pool: &PgPool,
        name: Option<&str>,
        image: &str,
    ) -> Result<(StaffMember, ContentOverride), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO staff (role, name, image) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (role) DO UPDATE SET \
                 name = COALESCE(EXCLUDED.name, staff.name), \
                 image = EXCLUDED.image, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        let owner = sqlx::query_as::<_, StaffMember>(&query)
            .bind(OWNER_ROLE)
            .bind(name)
            .bind(image)
            .fetch_one(&mut *tx)
            .await?;

        let record = sqlx::query_as::<_, ContentOverride>(
            "INSERT INTO content_overrides (key, value, value_type) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (key) DO UPDATE SET \
                 value = EXCLUDED.value, \
                 value_type = EXCLUDED.value_type, \
                 updated_at = NOW() \
             RETURNING key, value, value_type, updated_at",
        )
        .bind(OWNER_IMAGE_KEY)
        .bind(image)
        .bind(ValueType::Image.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((owner, record))
    }

    /// Remove the owner photo from the staff row and its override key
    /// together. The name is kept.
    ///
    /// Returns `true` if either copy existed.
    pub async fn clear_owner_image(pool: &PgPool) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let staff = sqlx::query(
            "UPDATE staff SET image = NULL, updated_at = NOW() \
             WHERE role = $1 AND image IS NOT NULL",
        )
        .bind(OWNER_ROLE)
        .execute(&mut *tx)
        .await?;

        let key = sqlx::query("DELETE FROM content_overrides WHERE key = $1")
            .bind(OWNER_IMAGE_KEY)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(staff.rows_affected() + key.rows_affected() > 0)
    }
}
