//! Integration tests for idempotent schema creation and self-healing reads.

use sqlx::PgPool;
use trattoria_db::repositories::PostRepo;
use trattoria_db::{ensure_schema, health_check, is_missing_table, with_schema_repair, TABLES};

async fn table_exists(pool: &PgPool, table: &str) -> bool {
    let found: (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
         WHERE table_schema = current_schema() AND table_name = $1)",
    )
    .bind(table)
    .fetch_one(pool)
    .await
    .unwrap();
    found.0
}

#[sqlx::test(migrations = false)]
async fn test_ensure_schema_creates_every_table(pool: PgPool) {
    health_check(&pool).await.unwrap();

    let created = ensure_schema(&pool).await.unwrap();
    assert_eq!(created, TABLES);

    for table in TABLES {
        assert!(table_exists(&pool, table).await, "{table} should exist");
    }
}

#[sqlx::test(migrations = false)]
async fn test_ensure_schema_is_idempotent(pool: PgPool) {
    ensure_schema(&pool).await.unwrap();
    sqlx::query("INSERT INTO posts (image, description) VALUES ('data:image/png;base64,AA==', 'kept')")
        .execute(&pool)
        .await
        .unwrap();

    ensure_schema(&pool).await.unwrap();
    ensure_schema(&pool).await.unwrap();

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 1, "re-running the schema must not drop data");
}

#[sqlx::test(migrations = false)]
async fn test_missing_table_is_detected(pool: PgPool) {
    let err = PostRepo::list(&pool).await.unwrap_err();
    assert!(is_missing_table(&err));
}

#[sqlx::test(migrations = false)]
async fn test_read_repairs_missing_schema(pool: PgPool) {
    let posts = with_schema_repair(&pool, || PostRepo::list(&pool))
        .await
        .unwrap();
    assert!(posts.is_empty());
    assert!(table_exists(&pool, "holiday_menu_item_variants").await);
}
