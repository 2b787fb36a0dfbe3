//! Resolution layer: the override store composed with the legacy
//! `menu_items` columns.
//!
//! Writes go to the override row first. That write is the durability
//! contract and its error is the caller's error. The legacy column is then
//! mirrored best-effort; the outcome of the mirror is reported separately as
//! a [`MirrorOutcome`] and never as an `Err`.
//!
//! Reads apply [`trattoria_core::shadow::resolve`]: the override wins, and
//! only images fall back to the legacy column.
//!
//! The owner photo is the exception: the `staff` row and the `owner_image`
//! key are written and cleared together, so every reader of the `owner` slot
//! goes through [`ContentResolver::owner_profile`].

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use trattoria_core::catalog::MenuCatalog;
use trattoria_core::image_codec::InlineImage;
use trattoria_core::override_keys::{
    collect_menu_item_overrides, field_key, image_key, parse_image_key, MenuItemField,
    MenuItemOverrides, ValueType, MENU_ITEM_KIND, OWNER_SLOT,
};
use trattoria_core::shadow::{resolve, resolve_menu_item, ResolvedMenuItem, ShadowInputs};
use trattoria_core::types::DbId;

use crate::models::content_override::ContentOverride;
use crate::models::staff::{OwnerImageSource, OwnerProfile, OWNER_ROLE};
use crate::repositories::staff_repo::OWNER_IMAGE_KEY;
use crate::repositories::{MenuItemRepo, OverrideRepo, StaffRepo};
use crate::DbPool;

/// What happened to the legacy copy of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorOutcome {
    /// The legacy column was updated.
    Applied,
    /// No legacy row exists for this id; nothing to mirror.
    NoLegacyRow,
    /// The value has no legacy column.
    NotMirrored,
    /// The legacy update failed and was logged.
    Failed,
}

/// Result of a canonical override write plus its legacy mirror.
#[derive(Debug, Clone)]
pub struct OverrideWrite {
    pub record: ContentOverride,
    pub mirror: MirrorOutcome,
}

/// Run a legacy update and fold its result into a [`MirrorOutcome`].
async fn mirror<F>(key: &str, update: F) -> MirrorOutcome
where
    F: Future<Output = Result<u64, sqlx::Error>>,
{
    match update.await {
        Ok(0) => MirrorOutcome::NoLegacyRow,
        Ok(_) => MirrorOutcome::Applied,
        Err(err) => {
            tracing::warn!(key, error = %err, "Legacy mirror write failed, override kept");
            MirrorOutcome::Failed
        }
    }
}

/// Mirror a menu item text field into its legacy column, if it has one.
async fn mirror_menu_item_field(
    pool: &DbPool,
    key: &str,
    id: DbId,
    field: MenuItemField,
    value: &str,
) -> MirrorOutcome {
    match field {
        MenuItemField::Name => {
            mirror(key, MenuItemRepo::update_fields(pool, id, Some(value), None)).await
        }
        MenuItemField::Price => match value.parse::<f64>() {
            Ok(price) => mirror(key, MenuItemRepo::update_fields(pool, id, None, Some(price))).await,
            Err(_) => MirrorOutcome::NotMirrored,
        },
        _ => MirrorOutcome::NotMirrored,
    }
}

/// Whether `scope`/`id` addresses the owner photo slot.
fn is_owner_slot(scope: &str, id: Option<DbId>) -> bool {
    scope == OWNER_SLOT && id.is_none()
}

/// Entry point for override-aware reads and writes.
pub struct ContentResolver;

impl ContentResolver {
    // -- Text fields --------------------------------------------------------

    /// The override stored for `<kind>_<id>_<field>`, if any.
    pub async fn get_override(
        pool: &DbPool,
        entity_kind: &str,
        id: DbId,
        field: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        OverrideRepo::get_value(pool, &field_key(entity_kind, id, field)).await
    }

    /// Store a text override and mirror it into the legacy row when the
    /// field has a legacy column (menu item name and price).
    pub async fn set_override(
        pool: &DbPool,
        entity_kind: &str,
        id: DbId,
        field: &str,
        value: &str,
    ) -> Result<OverrideWrite, sqlx::Error> {
        let key = field_key(entity_kind, id, field);
        let record = OverrideRepo::upsert(pool, &key, value, ValueType::Text).await?;

        let legacy_field = (entity_kind == MENU_ITEM_KIND)
            .then(|| MenuItemField::parse(field))
            .flatten();
        let mirror = match legacy_field {
            Some(field) => mirror_menu_item_field(pool, &key, id, field, value).await,
            None => MirrorOutcome::NotMirrored,
        };

        Ok(OverrideWrite { record, mirror })
    }

    /// Remove a text override. Returns `true` if one existed.
    pub async fn clear_override(
        pool: &DbPool,
        entity_kind: &str,
        id: DbId,
        field: &str,
    ) -> Result<bool, sqlx::Error> {
        OverrideRepo::delete(pool, &field_key(entity_kind, id, field)).await
    }

    /// Apply several field changes to one menu item: `Some` sets, `None`
    /// clears.
    ///
    /// Every override row changes in one transaction or none does. Name and
    /// price are mirrored after the commit; the outcomes are returned in the
    /// order of `changes` and never turn into an error.
    pub async fn patch_menu_item(
        pool: &DbPool,
        id: DbId,
        changes: &[(MenuItemField, Option<String>)],
    ) -> Result<Vec<MirrorOutcome>, sqlx::Error> {
        let keyed: Vec<(String, Option<String>)> = changes
            .iter()
            .map(|(field, value)| (field_key(MENU_ITEM_KIND, id, field.as_str()), value.clone()))
            .collect();

        OverrideRepo::apply_changes(pool, &keyed, ValueType::Text).await?;

        let mut outcomes = Vec::with_capacity(keyed.len());
        for ((field, _), (key, value)) in changes.iter().zip(&keyed) {
            let outcome = match value {
                Some(value) => mirror_menu_item_field(pool, key, id, *field, value).await,
                None => MirrorOutcome::NotMirrored,
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Every menu item text override, keyed by item id. Malformed keys and
    /// unparsable values are skipped.
    pub async fn menu_item_overrides(
        pool: &DbPool,
    ) -> Result<BTreeMap<DbId, MenuItemOverrides>, sqlx::Error> {
        let prefix = format!("{MENU_ITEM_KIND}_");
        let rows = OverrideRepo::list_by_prefix(pool, &prefix, ValueType::Text).await?;
        Ok(collect_menu_item_overrides(
            rows.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        ))
    }

    // -- Images -------------------------------------------------------------

    /// The image a reader should see for `scope`/`id`.
    ///
    /// Only the menu item scope has a legacy column to fall back to. The
    /// owner slot reads through [`Self::owner_profile`].
    pub async fn get_image(
        pool: &DbPool,
        scope: &str,
        id: Option<DbId>,
    ) -> Result<Option<String>, sqlx::Error> {
        if is_owner_slot(scope, id) {
            return Ok(Self::owner_profile(pool).await?.image_url);
        }

        let override_value = OverrideRepo::get_value(pool, &image_key(scope, id)).await?;
        let legacy = match (override_value.is_none(), scope, id) {
            (true, MENU_ITEM_KIND, Some(id)) => MenuItemRepo::find_image(pool, id).await?,
            _ => None,
        };

        Ok(resolve(
            ValueType::Image,
            ShadowInputs {
                override_value,
                legacy,
                base: None,
            },
        )
        .into_value())
    }

    /// Store an image override, then mirror it into the legacy column.
    ///
    /// The owner slot writes the `staff` row and its key in one transaction.
    pub async fn set_image(
        pool: &DbPool,
        scope: &str,
        id: Option<DbId>,
        image: &InlineImage,
    ) -> Result<OverrideWrite, sqlx::Error> {
        if is_owner_slot(scope, id) {
            let (_, record) = StaffRepo::upsert_owner(pool, None, image.as_str()).await?;
            return Ok(OverrideWrite {
                record,
                mirror: MirrorOutcome::Applied,
            });
        }

        let key = image_key(scope, id);
        let record = OverrideRepo::upsert(pool, &key, image.as_str(), ValueType::Image).await?;

        let mirror = match (scope, id) {
            (MENU_ITEM_KIND, Some(id)) => {
                mirror(&key, MenuItemRepo::update_image(pool, id, Some(image.as_str()))).await
            }
            _ => MirrorOutcome::NotMirrored,
        };

        Ok(OverrideWrite { record, mirror })
    }

    /// Remove an image override and clear the legacy column, so the read
    /// fallback does not bring the image back.
    ///
    /// Returns `true` if an override row was removed. For the owner slot,
    /// `true` if either the staff photo or the key was removed.
    pub async fn delete_image(
        pool: &DbPool,
        scope: &str,
        id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        if is_owner_slot(scope, id) {
            return StaffRepo::clear_owner_image(pool).await;
        }

        let key = image_key(scope, id);
        let removed = OverrideRepo::delete(pool, &key).await?;

        if let (MENU_ITEM_KIND, Some(id)) = (scope, id) {
            mirror(&key, MenuItemRepo::update_image(pool, id, None)).await;
        }

        Ok(removed)
    }

    /// Store several menu item images in one transaction.
    ///
    /// Either every override row is written or none is. The legacy columns
    /// are left alone; callers run [`Self::mirror_menu_item_images`] once the
    /// result is settled.
    pub async fn save_menu_item_images(
        pool: &DbPool,
        images: &[(DbId, InlineImage)],
        statement_timeout: Duration,
    ) -> Result<usize, sqlx::Error> {
        let entries: Vec<(String, String)> = images
            .iter()
            .map(|(id, image)| {
                (
                    image_key(MENU_ITEM_KIND, Some(*id)),
                    image.as_str().to_string(),
                )
            })
            .collect();

        OverrideRepo::bulk_upsert(pool, &entries, ValueType::Image, statement_timeout).await
    }

    /// Copy committed batch images into the legacy columns, one update per
    /// item. Outcomes are returned in input order.
    pub async fn mirror_menu_item_images(
        pool: &DbPool,
        images: &[(DbId, InlineImage)],
    ) -> Vec<MirrorOutcome> {
        let mut outcomes = Vec::with_capacity(images.len());
        for (id, image) in images {
            let key = image_key(MENU_ITEM_KIND, Some(*id));
            let update = MenuItemRepo::update_image(pool, *id, Some(image.as_str()));
            outcomes.push(mirror(&key, update).await);
        }
        outcomes
    }

    // -- Owner photo --------------------------------------------------------

    /// The owner profile: the `staff` photo first, then the `owner_image`
    /// key.
    pub async fn owner_profile(pool: &DbPool) -> Result<OwnerProfile, sqlx::Error> {
        let staff = StaffRepo::find_by_role(pool, OWNER_ROLE).await?;
        let name = staff.as_ref().and_then(|s| s.name.clone());

        if let Some(image) = staff.and_then(|s| s.image) {
            return Ok(OwnerProfile {
                name,
                image_url: Some(image),
                source: OwnerImageSource::Staff,
            });
        }

        let profile = match OverrideRepo::get_value(pool, OWNER_IMAGE_KEY).await? {
            Some(image) => OwnerProfile {
                name,
                image_url: Some(image),
                source: OwnerImageSource::Override,
            },
            None => OwnerProfile {
                name,
                ..OwnerProfile::empty()
            },
        };
        Ok(profile)
    }

    // -- Whole-menu view ----------------------------------------------------

    /// Every catalog item merged with its overrides and image.
    ///
    /// Hidden items are left out unless `include_hidden` is set.
    pub async fn resolved_menu(
        pool: &DbPool,
        catalog: &MenuCatalog,
        include_hidden: bool,
    ) -> Result<Vec<ResolvedMenuItem>, sqlx::Error> {
        let overrides = Self::menu_item_overrides(pool).await?;

        let image_prefix = image_key(MENU_ITEM_KIND, None);
        let mut image_overrides: HashMap<DbId, String> =
            OverrideRepo::list_by_prefix(pool, &image_prefix, ValueType::Image)
                .await?
                .into_iter()
                .filter_map(|(key, value)| {
                    parse_image_key(MENU_ITEM_KIND, &key).map(|id| (id, value))
                })
                .collect();
        let mut legacy_images: HashMap<DbId, String> =
            MenuItemRepo::list_images(pool).await?.into_iter().collect();

        Ok(catalog
            .items()
            .iter()
            .map(|item| {
                resolve_menu_item(
                    item,
                    overrides.get(&item.id),
                    image_overrides.remove(&item.id),
                    legacy_images.remove(&item.id),
                )
            })
            .filter(|item| include_hidden || !item.hidden)
            .collect())
    }
}
