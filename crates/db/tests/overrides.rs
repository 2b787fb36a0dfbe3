//! Integration tests for the override store and the resolution layer.

use std::time::Duration;

use sqlx::PgPool;
use trattoria_core::catalog::MenuCatalog;
use trattoria_core::image_codec::normalize_for_storage;
use trattoria_core::override_keys::{
    menu_item_image_key, MenuItemField, ValueType, MENU_ITEM_KIND, OWNER_SLOT,
};
use trattoria_core::shadow::ValueSource;
use trattoria_db::ensure_schema;
use trattoria_db::models::staff::OwnerImageSource;
use trattoria_db::repositories::{MenuItemRepo, OverrideRepo, StaffRepo};
use trattoria_db::resolution::{ContentResolver, MirrorOutcome};

const PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";
const LEGACY_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

async fn setup(pool: &PgPool) {
    ensure_schema(pool).await.unwrap();
}

async fn insert_legacy_row(pool: &PgPool, id: i64, image: Option<&str>) {
    sqlx::query(
        "INSERT INTO menu_items (id, name, price, category_id, image) \
         VALUES ($1, 'Legacy', 9.0, 1, $2)",
    )
    .bind(id)
    .bind(image)
    .execute(pool)
    .await
    .unwrap();
}

// ---------------------------------------------------------------------------
// Text overrides
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = false)]
async fn test_set_then_get_returns_written_value(pool: PgPool) {
    setup(&pool).await;

    for value in ["Pizza Speciale", "Pizza Speciale 2", ""] {
        ContentResolver::set_override(&pool, MENU_ITEM_KIND, 7, "name", value)
            .await
            .unwrap();
        let read = ContentResolver::get_override(&pool, MENU_ITEM_KIND, 7, "name")
            .await
            .unwrap();
        assert_eq!(read.as_deref(), Some(value));
    }
}

#[sqlx::test(migrations = false)]
async fn test_upsert_keeps_one_row_per_key(pool: PgPool) {
    setup(&pool).await;

    OverrideRepo::upsert(&pool, "menu_item_3_price", "8.5", ValueType::Text)
        .await
        .unwrap();
    let second = OverrideRepo::upsert(&pool, "menu_item_3_price", "9", ValueType::Text)
        .await
        .unwrap();
    assert_eq!(second.value, "9");
    assert_eq!(second.value_type(), Some(ValueType::Text));

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM content_overrides WHERE key = $1")
        .bind("menu_item_3_price")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 1);
}

#[sqlx::test(migrations = false)]
async fn test_mirror_without_legacy_row_does_not_fail(pool: PgPool) {
    setup(&pool).await;

    let write = ContentResolver::set_override(&pool, MENU_ITEM_KIND, 12, "price", "11.5")
        .await
        .unwrap();
    assert_eq!(write.mirror, MirrorOutcome::NoLegacyRow);
    assert_eq!(write.record.value, "11.5");
}

#[sqlx::test(migrations = false)]
async fn test_name_override_is_mirrored_to_legacy_row(pool: PgPool) {
    setup(&pool).await;
    insert_legacy_row(&pool, 4, None).await;

    let write = ContentResolver::set_override(&pool, MENU_ITEM_KIND, 4, "name", "Capricciosa")
        .await
        .unwrap();
    assert_eq!(write.mirror, MirrorOutcome::Applied);

    let name: (String,) = sqlx::query_as("SELECT name FROM menu_items WHERE id = 4")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(name.0, "Capricciosa");
}

#[sqlx::test(migrations = false)]
async fn test_override_listing_skips_malformed_keys(pool: PgPool) {
    setup(&pool).await;

    for (key, value) in [
        ("menu_item_7_name", "Pizza Speciale"),
        ("menu_item_7_hidden", "true"),
        ("menu_item_x_name", "bad id"),
        ("menu_item_8_colour", "unknown field"),
        ("menu_item_9_price", "not a number"),
    ] {
        OverrideRepo::upsert(&pool, key, value, ValueType::Text)
            .await
            .unwrap();
    }

    let overrides = ContentResolver::menu_item_overrides(&pool).await.unwrap();
    assert_eq!(overrides.len(), 1);
    let seven = &overrides[&7];
    assert_eq!(seven.name.as_deref(), Some("Pizza Speciale"));
    assert_eq!(seven.hidden, Some(true));
    assert_eq!(seven.price, None);
}

#[sqlx::test(migrations = false)]
async fn test_clear_override_reverts_to_catalog(pool: PgPool) {
    setup(&pool).await;
    let catalog = MenuCatalog::builtin();

    ContentResolver::set_override(&pool, MENU_ITEM_KIND, 7, MenuItemField::Name.as_str(), "Speciale")
        .await
        .unwrap();
    let removed = ContentResolver::clear_override(&pool, MENU_ITEM_KIND, 7, "name")
        .await
        .unwrap();
    assert!(removed);

    let menu = ContentResolver::resolved_menu(&pool, &catalog, true)
        .await
        .unwrap();
    let seven = menu.iter().find(|item| item.id == 7).unwrap();
    assert_eq!(seven.name, catalog.find(7).unwrap().name);
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = false)]
async fn test_image_read_falls_back_to_legacy_column(pool: PgPool) {
    setup(&pool).await;
    insert_legacy_row(&pool, 5, Some(LEGACY_PNG)).await;

    let image = ContentResolver::get_image(&pool, MENU_ITEM_KIND, Some(5))
        .await
        .unwrap();
    assert_eq!(image.as_deref(), Some(LEGACY_PNG));
}

#[sqlx::test(migrations = false)]
async fn test_image_override_wins_over_legacy_column(pool: PgPool) {
    setup(&pool).await;
    insert_legacy_row(&pool, 5, Some(LEGACY_PNG)).await;
    OverrideRepo::upsert(&pool, &menu_item_image_key(5), PNG, ValueType::Image)
        .await
        .unwrap();

    let image = ContentResolver::get_image(&pool, MENU_ITEM_KIND, Some(5))
        .await
        .unwrap();
    assert_eq!(image.as_deref(), Some(PNG));
}

#[sqlx::test(migrations = false)]
async fn test_deleted_image_reads_as_absent(pool: PgPool) {
    setup(&pool).await;
    insert_legacy_row(&pool, 6, None).await;
    let image = normalize_for_storage(PNG).unwrap();

    let write = ContentResolver::set_image(&pool, MENU_ITEM_KIND, Some(6), &image)
        .await
        .unwrap();
    assert_eq!(write.mirror, MirrorOutcome::Applied);

    assert!(ContentResolver::delete_image(&pool, MENU_ITEM_KIND, Some(6))
        .await
        .unwrap());
    let read = ContentResolver::get_image(&pool, MENU_ITEM_KIND, Some(6))
        .await
        .unwrap();
    assert_eq!(read, None);
}

#[sqlx::test(migrations = false)]
async fn test_site_image_has_no_legacy_mirror(pool: PgPool) {
    setup(&pool).await;
    let image = normalize_for_storage(PNG).unwrap();

    let write = ContentResolver::set_image(&pool, "cover", None, &image)
        .await
        .unwrap();
    assert_eq!(write.record.key, "cover_image");
    assert_eq!(write.mirror, MirrorOutcome::NotMirrored);
    assert_eq!(
        ContentResolver::get_image(&pool, "cover", None).await.unwrap().as_deref(),
        Some(PNG)
    );
}

#[sqlx::test(migrations = false)]
async fn test_batch_save_writes_every_image(pool: PgPool) {
    setup(&pool).await;
    let image = normalize_for_storage(PNG).unwrap();
    let batch = vec![(1, image.clone()), (2, image.clone()), (3, image)];

    let saved = ContentResolver::save_menu_item_images(&pool, &batch, Duration::from_secs(30))
        .await
        .unwrap();
    assert_eq!(saved, 3);

    let count: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM content_overrides WHERE value_type = 'image'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count.0, 3);
}

#[sqlx::test(migrations = false)]
async fn test_batch_save_leaves_legacy_column_to_the_mirror(pool: PgPool) {
    setup(&pool).await;
    insert_legacy_row(&pool, 1, None).await;
    let image = normalize_for_storage(PNG).unwrap();
    let batch = vec![(1, image.clone()), (2, image)];

    ContentResolver::save_menu_item_images(&pool, &batch, Duration::from_secs(30))
        .await
        .unwrap();
    assert_eq!(MenuItemRepo::find_image(&pool, 1).await.unwrap(), None);

    let outcomes = ContentResolver::mirror_menu_item_images(&pool, &batch).await;
    assert_eq!(outcomes, [MirrorOutcome::Applied, MirrorOutcome::NoLegacyRow]);
    assert_eq!(
        MenuItemRepo::find_image(&pool, 1).await.unwrap().as_deref(),
        Some(PNG)
    );
}

#[sqlx::test(migrations = false)]
async fn test_bulk_upsert_rolls_back_on_failure(pool: PgPool) {
    setup(&pool).await;
    // A NUL byte is rejected by PostgreSQL text columns mid-transaction.
    let entries = vec![
        ("menu_item_image_1".to_string(), PNG.to_string()),
        ("menu_item_image_2".to_string(), "bad\0value".to_string()),
        ("menu_item_image_3".to_string(), PNG.to_string()),
    ];

    let result =
        OverrideRepo::bulk_upsert(&pool, &entries, ValueType::Image, Duration::from_secs(30)).await;
    assert!(result.is_err());

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM content_overrides")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 0, "no image from a failed batch may persist");
}

// ---------------------------------------------------------------------------
// Multi-field patches
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = false)]
async fn test_menu_item_patch_sets_and_clears_together(pool: PgPool) {
    setup(&pool).await;
    insert_legacy_row(&pool, 7, None).await;
    OverrideRepo::upsert(&pool, "menu_item_7_hidden", "true", ValueType::Text)
        .await
        .unwrap();

    let changes = vec![
        (MenuItemField::Name, Some("Nuovo".to_string())),
        (MenuItemField::Price, Some("12.5".to_string())),
        (MenuItemField::Hidden, None),
    ];
    let mirrors = ContentResolver::patch_menu_item(&pool, 7, &changes)
        .await
        .unwrap();
    assert_eq!(
        mirrors,
        [
            MirrorOutcome::Applied,
            MirrorOutcome::Applied,
            MirrorOutcome::NotMirrored
        ]
    );

    let overrides = ContentResolver::menu_item_overrides(&pool).await.unwrap();
    let seven = &overrides[&7];
    assert_eq!(seven.name.as_deref(), Some("Nuovo"));
    assert_eq!(seven.price, Some(12.5));
    assert_eq!(seven.hidden, None);
}

#[sqlx::test(migrations = false)]
async fn test_menu_item_patch_is_all_or_nothing(pool: PgPool) {
    setup(&pool).await;
    OverrideRepo::upsert(&pool, "menu_item_7_hidden", "true", ValueType::Text)
        .await
        .unwrap();

    // The NUL byte makes the second write fail inside the transaction.
    let changes = vec![
        (MenuItemField::Name, Some("Nuovo".to_string())),
        (MenuItemField::Category, Some("3\0".to_string())),
        (MenuItemField::Hidden, None),
    ];
    let result = ContentResolver::patch_menu_item(&pool, 7, &changes).await;
    assert!(result.is_err());

    let name = ContentResolver::get_override(&pool, MENU_ITEM_KIND, 7, "name")
        .await
        .unwrap();
    assert_eq!(name, None);
    let hidden = ContentResolver::get_override(&pool, MENU_ITEM_KIND, 7, "hidden")
        .await
        .unwrap();
    assert_eq!(hidden.as_deref(), Some("true"));
}

// ---------------------------------------------------------------------------
// Owner photo
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = false)]
async fn test_owner_slot_writes_staff_row_and_key(pool: PgPool) {
    setup(&pool).await;
    StaffRepo::upsert_owner(&pool, Some("Giulia"), LEGACY_PNG)
        .await
        .unwrap();

    let image = normalize_for_storage(PNG).unwrap();
    let write = ContentResolver::set_image(&pool, OWNER_SLOT, None, &image)
        .await
        .unwrap();
    assert_eq!(write.record.key, "owner_image");

    let profile = ContentResolver::owner_profile(&pool).await.unwrap();
    assert_eq!(profile.image_url.as_deref(), Some(PNG));
    assert_eq!(profile.source, OwnerImageSource::Staff);
    assert_eq!(profile.name.as_deref(), Some("Giulia"));
    assert_eq!(
        ContentResolver::get_image(&pool, OWNER_SLOT, None).await.unwrap().as_deref(),
        Some(PNG)
    );
}

#[sqlx::test(migrations = false)]
async fn test_owner_slot_delete_clears_both_copies(pool: PgPool) {
    setup(&pool).await;
    StaffRepo::upsert_owner(&pool, Some("Giulia"), PNG).await.unwrap();

    assert!(ContentResolver::delete_image(&pool, OWNER_SLOT, None).await.unwrap());

    let profile = ContentResolver::owner_profile(&pool).await.unwrap();
    assert_eq!(profile.image_url, None);
    assert_eq!(profile.source, OwnerImageSource::None);
    assert_eq!(profile.name.as_deref(), Some("Giulia"));
    assert_eq!(OverrideRepo::get_value(&pool, "owner_image").await.unwrap(), None);

    assert!(!ContentResolver::delete_image(&pool, OWNER_SLOT, None).await.unwrap());
}

#[sqlx::test(migrations = false)]
async fn test_resolved_menu_merges_tiers(pool: PgPool) {
    setup(&pool).await;
    let catalog = MenuCatalog::builtin();
    insert_legacy_row(&pool, 2, Some(LEGACY_PNG)).await;
    OverrideRepo::upsert(&pool, &menu_item_image_key(3), PNG, ValueType::Image)
        .await
        .unwrap();
    OverrideRepo::upsert(&pool, "menu_item_1_hidden", "true", ValueType::Text)
        .await
        .unwrap();
    OverrideRepo::upsert(&pool, "menu_item_3_price", "12.5", ValueType::Text)
        .await
        .unwrap();

    let visible = ContentResolver::resolved_menu(&pool, &catalog, false)
        .await
        .unwrap();
    assert_eq!(visible.len(), catalog.items().len() - 1);
    assert!(visible.iter().all(|item| item.id != 1));

    let two = visible.iter().find(|item| item.id == 2).unwrap();
    assert_eq!(two.image_source, Some(ValueSource::Legacy));

    let three = visible.iter().find(|item| item.id == 3).unwrap();
    assert_eq!(three.price, 12.5);
    assert_eq!(three.image_source, Some(ValueSource::Override));

    let all = ContentResolver::resolved_menu(&pool, &catalog, true)
        .await
        .unwrap();
    assert_eq!(all.len(), catalog.items().len());
}
