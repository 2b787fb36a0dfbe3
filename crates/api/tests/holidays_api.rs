//! HTTP-level integration tests for holiday menus.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, expect_json, get, post_json, put_json};
use serde_json::json;
use sqlx::PgPool;

async fn create_holiday(pool: &PgPool, body: serde_json::Value) -> i64 {
    let app = common::build_test_app(pool.clone());
    let json = expect_json(post_json(app, "/api/v1/holidays", body).await, StatusCode::OK).await;
    json["data"]["id"].as_i64().unwrap()
}

async fn create_variant(pool: &PgPool, holiday_id: i64, body: serde_json::Value) -> i64 {
    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/holidays/{holiday_id}/variants");
    let json = expect_json(post_json(app, &uri, body).await, StatusCode::CREATED).await;
    json["data"]["id"].as_i64().unwrap()
}

async fn list(pool: &PgPool) -> Vec<serde_json::Value> {
    let app = common::build_test_app(pool.clone());
    let json = expect_json(get(app, "/api/v1/holidays").await, StatusCode::OK).await;
    json["data"].as_array().unwrap().clone()
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap();
    row.0
}

// ---------------------------------------------------------------------------
// Upsert by name
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = false)]
async fn upsert_by_name_updates_the_same_row(pool: PgPool) {
    common::init_schema(&pool).await;

    let first = create_holiday(&pool, json!({"name": "natale", "displayName": "Natale"})).await;
    let second = create_holiday(
        &pool,
        json!({"name": "natale", "displayName": "Natale", "menuPrice": 45.5}),
    )
    .await;
    assert_eq!(first, second);

    let holidays = list(&pool).await;
    let natale: Vec<_> = holidays.iter().filter(|h| h["name"] == "natale").collect();
    assert_eq!(natale.len(), 1);
    assert_eq!(natale[0]["menuPrice"], 45.5);
    assert_eq!(natale[0]["displayName"], "Natale");
}

#[sqlx::test(migrations = false)]
async fn upsert_leaves_absent_fields_and_clears_null_ones(pool: PgPool) {
    common::init_schema(&pool).await;

    create_holiday(
        &pool,
        json!({"name": "pasqua", "menuText": "Colomba e uova", "menuPrice": 30.0}),
    )
    .await;
    create_holiday(&pool, json!({"name": "pasqua", "menuPrice": null})).await;

    let holidays = list(&pool).await;
    let pasqua = &holidays[0];
    assert_eq!(pasqua["menuText"], "Colomba e uova");
    assert!(pasqua["menuPrice"].is_null());
    // display name defaults to the slug on first insert.
    assert_eq!(pasqua["displayName"], "pasqua");
}

#[sqlx::test(migrations = false)]
async fn upsert_rejects_invalid_slug(pool: PgPool) {
    common::init_schema(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json(app, "/api/v1/holidays", json!({"name": "San Valentino"})).await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = false)]
async fn holidays_are_listed_by_id(pool: PgPool) {
    common::init_schema(&pool).await;
    let a = create_holiday(&pool, json!({"name": "capodanno"})).await;
    let b = create_holiday(&pool, json!({"name": "ferragosto"})).await;

    let ids: Vec<i64> = list(&pool)
        .await
        .iter()
        .map(|h| h["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, [a, b]);
}

// ---------------------------------------------------------------------------
// Dishes and variants
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = false)]
async fn dish_crud_round_trip(pool: PgPool) {
    common::init_schema(&pool).await;
    let holiday_id = create_holiday(&pool, json!({"name": "natale"})).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/holidays/{holiday_id}/items"),
        json!({"name": "Tortellini in brodo", "price": 16.0}),
    )
    .await;
    let created = expect_json(response, StatusCode::CREATED).await;
    let item_id = created["data"]["id"].as_i64().unwrap();
    assert_eq!(created["data"]["ingredients"], json!([]));

    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/holidays/{holiday_id}/items/{item_id}"),
        json!({"price": 18.0, "ingredients": ["brodo di cappone"]}),
    )
    .await;
    let updated = expect_json(response, StatusCode::OK).await;
    assert_eq!(updated["data"]["price"], 18.0);
    assert_eq!(updated["data"]["name"], "Tortellini in brodo");

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/holidays/{holiday_id}/items/{item_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(count(&pool, "holiday_menu_items").await, 0);
}

#[sqlx::test(migrations = false)]
async fn dish_requires_name_and_positive_price(pool: PgPool) {
    common::init_schema(&pool).await;
    let holiday_id = create_holiday(&pool, json!({"name": "natale"})).await;
    let uri = format!("/api/v1/holidays/{holiday_id}/items");

    let app = common::build_test_app(pool.clone());
    let response = post_json(app, &uri, json!({"name": "Panettone"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    let response = post_json(app, &uri, json!({"name": "Panettone", "price": -1})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(count(&pool, "holiday_menu_items").await, 0);
}

#[sqlx::test(migrations = false)]
async fn dish_on_missing_holiday_is_not_found(pool: PgPool) {
    common::init_schema(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/holidays/999/items",
        json!({"name": "Panettone", "price": 9.0}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = false)]
async fn non_numeric_holiday_id_is_bad_request(pool: PgPool) {
    common::init_schema(&pool).await;
    let app = common::build_test_app(pool);

    let response = delete(app, "/api/v1/holidays/abc").await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = false)]
async fn variant_order_defaults_to_max_plus_one(pool: PgPool) {
    common::init_schema(&pool).await;
    let holiday_id = create_holiday(&pool, json!({"name": "natale"})).await;

    create_variant(&pool, holiday_id, json!({"title": "Cena", "order": 5})).await;
    create_variant(&pool, holiday_id, json!({"title": "Pranzo", "order": 1})).await;
    create_variant(&pool, holiday_id, json!({"title": "Asporto"})).await;

    let holidays = list(&pool).await;
    let variants = holidays[0]["variants"].as_array().unwrap();
    let titles: Vec<&str> = variants.iter().map(|v| v["title"].as_str().unwrap()).collect();
    let orders: Vec<i64> = variants.iter().map(|v| v["order"].as_i64().unwrap()).collect();
    assert_eq!(titles, ["Pranzo", "Cena", "Asporto"]);
    assert_eq!(orders, [1, 5, 6]);
}

// ---------------------------------------------------------------------------
// Presentation state
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = false)]
async fn variants_take_precedence_and_flat_text_returns_after_delete(pool: PgPool) {
    common::init_schema(&pool).await;
    let holiday_id = create_holiday(
        &pool,
        json!({"name": "natale", "displayName": "Natale", "menuText": "Menu fisso", "menuPrice": 45.5}),
    )
    .await;

    let app = common::build_test_app(pool.clone());
    let view = expect_json(get(app, "/api/v1/holidays/slug/natale").await, StatusCode::OK).await;
    assert_eq!(view["data"]["presentation"]["state"], "flat_text");
    assert_eq!(view["data"]["presentation"]["text"], "Menu fisso");

    let variant_id = create_variant(&pool, holiday_id, json!({"title": "Pranzo"})).await;

    let app = common::build_test_app(pool.clone());
    let view = expect_json(get(app, "/api/v1/holidays/slug/natale").await, StatusCode::OK).await;
    let presentation = &view["data"]["presentation"];
    assert_eq!(presentation["state"], "variants");
    assert!(presentation.get("text").is_none());
    assert_eq!(presentation["variants"][0]["title"], "Pranzo");
    assert_eq!(list(&pool).await[0]["presentation"], "variants");

    let app = common::build_test_app(pool.clone());
    let response = delete(
        app,
        &format!("/api/v1/holidays/{holiday_id}/variants/{variant_id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let view = expect_json(get(app, "/api/v1/holidays/slug/natale").await, StatusCode::OK).await;
    assert_eq!(view["data"]["presentation"]["state"], "flat_text");
}

#[sqlx::test(migrations = false)]
async fn empty_holiday_resolves_to_empty_state(pool: PgPool) {
    common::init_schema(&pool).await;
    create_holiday(&pool, json!({"name": "ferragosto"})).await;

    let app = common::build_test_app(pool);
    let view = expect_json(get(app, "/api/v1/holidays/slug/ferragosto").await, StatusCode::OK).await;
    assert_eq!(view["data"]["presentation"], json!({"state": "empty"}));
    assert_eq!(view["data"]["holiday"]["name"], "ferragosto");
}

#[sqlx::test(migrations = false)]
async fn unknown_slug_is_not_found(pool: PgPool) {
    common::init_schema(&pool).await;
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/holidays/slug/missing").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Cascade
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = false)]
async fn deleting_holiday_removes_all_variants_and_dishes(pool: PgPool) {
    common::init_schema(&pool).await;
    let holiday_id = create_holiday(&pool, json!({"name": "natale"})).await;

    const VARIANTS: usize = 3;
    const DISHES: usize = 2;
    for v in 0..VARIANTS {
        let variant_id = create_variant(&pool, holiday_id, json!({"title": format!("V{v}")})).await;
        for d in 0..DISHES {
            let app = common::build_test_app(pool.clone());
            let response = post_json(
                app,
                &format!("/api/v1/holidays/{holiday_id}/variants/{variant_id}/items"),
                json!({"name": format!("Piatto {d}"), "price": 10.0}),
            )
            .await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }
    }
    assert_eq!(count(&pool, "holiday_menu_variants").await, VARIANTS as i64);
    assert_eq!(count(&pool, "holiday_menu_item_variants").await, (VARIANTS * DISHES) as i64);

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/holidays/{holiday_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(count(&pool, "holiday_menus").await, 0);
    assert_eq!(count(&pool, "holiday_menu_variants").await, 0);
    assert_eq!(count(&pool, "holiday_menu_item_variants").await, 0);
}

#[sqlx::test(migrations = false)]
async fn variant_dish_under_wrong_holiday_is_not_found(pool: PgPool) {
    common::init_schema(&pool).await;
    let natale = create_holiday(&pool, json!({"name": "natale"})).await;
    let pasqua = create_holiday(&pool, json!({"name": "pasqua"})).await;
    let variant_id = create_variant(&pool, natale, json!({"title": "Cena"})).await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/holidays/{pasqua}/variants/{variant_id}/items"),
        json!({"name": "Colomba", "price": 12.0}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
