//! Integration tests for the admin key gate on mutating routes.

mod common;

use axum::http::StatusCode;
use common::{expect_json, get, post_json, post_json_auth, ADMIN_KEY};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = false)]
async fn write_without_key_is_unauthorized(pool: PgPool) {
    common::init_schema(&pool).await;
    let app = common::build_gated_app(pool);

    let response = post_json(app, "/api/v1/holidays", json!({"name": "natale"})).await;
    let json = expect_json(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = false)]
async fn write_with_wrong_key_is_unauthorized(pool: PgPool) {
    common::init_schema(&pool).await;
    let app = common::build_gated_app(pool.clone());

    let response = post_json_auth(app, "/api/v1/holidays", json!({"name": "natale"}), "wrong").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM holiday_menus")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(row.0, 0);
}

#[sqlx::test(migrations = false)]
async fn write_with_admin_key_succeeds(pool: PgPool) {
    common::init_schema(&pool).await;
    let app = common::build_gated_app(pool);

    let response =
        post_json_auth(app, "/api/v1/holidays", json!({"name": "natale"}), ADMIN_KEY).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = false)]
async fn reads_stay_public(pool: PgPool) {
    common::init_schema(&pool).await;
    let app = common::build_gated_app(pool);

    let response = get(app, "/api/v1/holidays").await;
    assert_eq!(response.status(), StatusCode::OK);
}
