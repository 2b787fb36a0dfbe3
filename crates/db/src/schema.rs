//! Idempotent schema creation.
//!
//! Every statement is `IF NOT EXISTS`, so [`ensure_schema`] is safe to run on
//! every startup, from `POST /db/init`, and as a repair step when a read hits
//! a missing table. Concurrent callers serialize on an advisory lock.

use crate::DbPool;

/// Advisory lock key held while the schema is being created.
const SCHEMA_LOCK_KEY: i64 = 0x7472_6174_746f;

/// Tables created by [`ensure_schema`], in creation order.
pub const TABLES: &[&str] = &[
    "content_overrides",
    "menu_items",
    "holiday_menus",
    "holiday_menu_items",
    "holiday_menu_variants",
    "holiday_menu_item_variants",
    "posts",
    "staff",
];

const STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS content_overrides (
        key         TEXT PRIMARY KEY,
        value       TEXT NOT NULL,
        value_type  TEXT NOT NULL DEFAULT 'text'
                    CONSTRAINT ck_content_overrides_value_type CHECK (value_type IN ('text', 'image')),
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE TABLE IF NOT EXISTS menu_items (
        id           BIGINT PRIMARY KEY,
        name         TEXT NOT NULL,
        price        DOUBLE PRECISION NOT NULL,
        category_id  BIGINT NOT NULL,
        image        TEXT,
        updated_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE TABLE IF NOT EXISTS holiday_menus (
        id             BIGSERIAL PRIMARY KEY,
        name           TEXT NOT NULL,
        display_name   TEXT NOT NULL,
        preview_image  TEXT,
        menu_text      TEXT,
        menu_price     DOUBLE PRECISION,
        menu_images    TEXT[] NOT NULL DEFAULT '{}',
        created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT uq_holiday_menus_name UNIQUE (name)
    )",
    "CREATE TABLE IF NOT EXISTS holiday_menu_items (
        id           BIGSERIAL PRIMARY KEY,
        holiday_id   BIGINT NOT NULL REFERENCES holiday_menus(id) ON DELETE CASCADE,
        name         TEXT NOT NULL,
        ingredients  TEXT[] NOT NULL DEFAULT '{}',
        price        DOUBLE PRECISION NOT NULL,
        image        TEXT,
        created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE INDEX IF NOT EXISTS idx_holiday_menu_items_holiday_id
        ON holiday_menu_items (holiday_id)",
    "CREATE TABLE IF NOT EXISTS holiday_menu_variants (
        id           BIGSERIAL PRIMARY KEY,
        holiday_id   BIGINT NOT NULL REFERENCES holiday_menus(id) ON DELETE CASCADE,
        title        TEXT NOT NULL,
        menu_text    TEXT,
        menu_price   DOUBLE PRECISION,
        menu_images  TEXT[] NOT NULL DEFAULT '{}',
        sort_order   INTEGER NOT NULL DEFAULT 0,
        created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE INDEX IF NOT EXISTS idx_holiday_menu_variants_holiday_id
        ON holiday_menu_variants (holiday_id, sort_order)",
    "CREATE TABLE IF NOT EXISTS holiday_menu_item_variants (
        id           BIGSERIAL PRIMARY KEY,
        variant_id   BIGINT NOT NULL REFERENCES holiday_menu_variants(id) ON DELETE CASCADE,
        name         TEXT NOT NULL,
        ingredients  TEXT[] NOT NULL DEFAULT '{}',
        price        DOUBLE PRECISION NOT NULL,
        image        TEXT,
        created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE INDEX IF NOT EXISTS idx_holiday_menu_item_variants_variant_id
        ON holiday_menu_item_variants (variant_id)",
    "CREATE TABLE IF NOT EXISTS posts (
        id           BIGSERIAL PRIMARY KEY,
        image        TEXT NOT NULL,
        description  TEXT NOT NULL,
        title        TEXT,
        created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE TABLE IF NOT EXISTS staff (
        id          BIGSERIAL PRIMARY KEY,
        role        TEXT NOT NULL,
        name        TEXT,
        image       TEXT,
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT uq_staff_role UNIQUE (role)
    )",
];

/// Create every table and index the service depends on.
///
/// Returns the table names, for reporting.
pub async fn ensure_schema(pool: &DbPool) -> Result<&'static [&'static str], sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *tx)
        .await?;

    for statement in STATEMENTS {
        sqlx::query(statement).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    tracing::debug!(tables = TABLES.len(), "Schema ensured");
    Ok(TABLES)
}
