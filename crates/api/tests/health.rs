//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::http::StatusCode;
use common::{body_json, get};
use sqlx::PgPool;

#[sqlx::test(migrations = false)]
async fn health_check_returns_ok_with_json(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["dbHealthy"], true);
    assert!(json["catalogItems"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn health_check_reports_degraded_without_database() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["dbHealthy"], false);
}

#[sqlx::test(migrations = false)]
async fn unknown_route_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = false)]
async fn response_contains_x_request_id_header(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

#[sqlx::test(migrations = false)]
async fn schema_init_is_idempotent(pool: PgPool) {
    for _ in 0..2 {
        let app = common::build_test_app(pool.clone());
        let response = common::post_json(app, "/api/v1/db/init", serde_json::json!({})).await;
        let json = common::expect_json(response, StatusCode::OK).await;
        assert!(json["data"]["tables"]
            .as_array()
            .unwrap()
            .iter()
            .any(|t| t == "content_overrides"));
    }
}

#[sqlx::test(migrations = false)]
async fn list_reads_create_missing_tables(pool: PgPool) {
    // No schema yet: the read repairs it instead of failing.
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/posts").await;

    let json = common::expect_json(response, StatusCode::OK).await;
    assert_eq!(json["data"], serde_json::json!([]));
}
