//! Repository for the `content_overrides` table.
//!
//! One row per key; writes are upserts, so concurrent writers to the same
//! key resolve as last-write-wins inside PostgreSQL.

use std::time::Duration;

use sqlx::PgPool;
use trattoria_core::override_keys::ValueType;

use crate::models::content_override::ContentOverride;

/// Column list for the `content_overrides` table.
const COLUMNS: &str = "key, value, value_type, updated_at";

/// Upsert statement shared by single and bulk writes.
const UPSERT: &str = "INSERT INTO content_overrides (key, value, value_type) \
     VALUES ($1, $2, $3) \
     ON CONFLICT (key) DO UPDATE SET \
         value = EXCLUDED.value, \
         value_type = EXCLUDED.value_type, \
         updated_at = NOW() \
     RETURNING key, value, value_type, updated_at";

/// Provides data access for content overrides.
pub struct OverrideRepo;

impl OverrideRepo {
    /// Find an override row by key.
    pub async fn find(pool: &PgPool, key: &str) -> Result<Option<ContentOverride>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM content_overrides WHERE key = $1");
        sqlx::query_as::<_, ContentOverride>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Fetch just the value stored under `key`.
    pub async fn get_value(pool: &PgPool, key: &str) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT value FROM content_overrides WHERE key = $1")
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Insert or replace the value stored under `key`.
    pub async fn upsert(
        pool: &PgPool,
        key: &str,
        value: &str,
        value_type: ValueType,
    ) -> Result<ContentOverride, sqlx::Error> {
        sqlx::query_as::<_, ContentOverride>(UPSERT)
            .bind(key)
            .bind(value)
            .bind(value_type.as_str())
            .fetch_one(pool)
            .await
    }

    /// Upsert many values of one type in a single transaction.
    ///
    /// `statement_timeout` bounds each statement inside the transaction; any
    /// failure rolls the whole batch back.
    pub async fn bulk_upsert(
        pool: &PgPool,
        entries: &[(String, String)],
        value_type: ValueType,
        statement_timeout: Duration,
    ) -> Result<usize, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // SET does not take bind parameters.
        let timeout_ms = statement_timeout.as_millis();
        sqlx::query(&format!("SET LOCAL statement_timeout = {timeout_ms}"))
            .execute(&mut *tx)
            .await?;

        for (key, value) in entries {
            sqlx::query(UPSERT)
                .bind(key)
                .bind(value)
                .bind(value_type.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(entries.len())
    }

    /// Upsert (`Some`) or delete (`None`) several keys of one type in a
    /// single transaction.
    pub async fn apply_changes(
        pool: &PgPool,
        changes: &[(String, Option<String>)],
        value_type: ValueType,
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        for (key, value) in changes {
            match value {
                Some(value) => {
                    sqlx::query(UPSERT)
                        .bind(key)
                        .bind(value)
                        .bind(value_type.as_str())
                        .execute(&mut *tx)
                        .await?;
                }
                None => {
                    sqlx::query("DELETE FROM content_overrides WHERE key = $1")
                        .bind(key)
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete the row stored under `key`.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, key: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM content_overrides WHERE key = $1")
            .bind(key)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List `(key, value)` pairs of one type whose key starts with `prefix`.
    pub async fn list_by_prefix(
        pool: &PgPool,
        prefix: &str,
        value_type: ValueType,
    ) -> Result<Vec<(String, String)>, sqlx::Error> {
        sqlx::query_as::<_, (String, String)>(
            "SELECT key, value FROM content_overrides \
             WHERE starts_with(key, $1) AND value_type = $2 \
             ORDER BY key",
        )
        .bind(prefix)
        .bind(value_type.as_str())
        .fetch_all(pool)
        .await
    }
}
