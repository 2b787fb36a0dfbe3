//! Relational backend for the restaurant content service.
//!
//! Owns the connection pool, the idempotent schema, the row models and the
//! repositories. [`resolution`] composes the override store with the legacy
//! `menu_items` columns.

use std::future::Future;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;
pub mod resolution;
pub mod schema;

pub use schema::{ensure_schema, TABLES};

pub type DbPool = sqlx::PgPool;

/// Pool settings used by the binary and by every test pool.
///
/// `acquire_timeout` bounds how long a query waits for a connection,
/// including reconnect attempts against an unreachable server. It must stay
/// well below the HTTP request timeout so degraded reads can still answer.
pub fn pool_options(max_connections: u32, acquire_timeout: Duration) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
}

/// Create a connection pool from a database URL.
pub async fn create_pool(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<DbPool, sqlx::Error> {
    pool_options(max_connections, acquire_timeout)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the backend is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// PostgreSQL `undefined_table`.
const UNDEFINED_TABLE: &str = "42P01";

/// Whether `err` reports a table that does not exist yet.
pub fn is_missing_table(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNDEFINED_TABLE))
}

/// Run `op`; if it fails because a table is missing, create the schema and
/// run it once more.
pub async fn with_schema_repair<T, F, Fut>(pool: &DbPool, mut op: F) -> Result<T, sqlx::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    match op().await {
        Err(err) if is_missing_table(&err) => {
            tracing::warn!(error = %err, "Missing table detected, creating schema and retrying");
            ensure_schema(pool).await?;
            op().await
        }
        other => other,
    }
}
