//! Holiday menu models and DTOs.
//!
//! A holiday owns a flat dish list and a set of variants; each variant owns
//! its own dish list. Children are deleted with their parent (`ON DELETE
//! CASCADE`).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use trattoria_core::holiday::{
    select_state, DisplayOrder, FlatMenu, MenuPresentation, PresentationKind,
};
use trattoria_core::types::{DbId, Timestamp};

use super::nullable;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `holiday_menus` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayMenu {
    pub id: DbId,
    pub name: String,
    pub display_name: String,
    pub preview_image: Option<String>,
    pub menu_text: Option<String>,
    pub menu_price: Option<f64>,
    pub menu_images: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `holiday_menu_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayMenuItem {
    pub id: DbId,
    pub holiday_id: DbId,
    pub name: String,
    pub ingredients: Vec<String>,
    pub price: f64,
    pub image: Option<String>,
    pub created_at: Timestamp,
}

/// A row from the `holiday_menu_variants` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayMenuVariant {
    pub id: DbId,
    pub holiday_id: DbId,
    pub title: String,
    #[serde(rename = "text")]
    pub menu_text: Option<String>,
    #[serde(rename = "price")]
    pub menu_price: Option<f64>,
    #[serde(rename = "images")]
    pub menu_images: Vec<String>,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub created_at: Timestamp,
}

/// A row from the `holiday_menu_item_variants` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayMenuItemVariant {
    pub id: DbId,
    pub variant_id: DbId,
    pub name: String,
    pub ingredients: Vec<String>,
    pub price: f64,
    pub image: Option<String>,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Read models
// ---------------------------------------------------------------------------

/// A variant with its dishes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayVariantTree {
    #[serde(flatten)]
    pub variant: HolidayMenuVariant,
    pub items: Vec<HolidayMenuItemVariant>,
}

impl DisplayOrder for HolidayVariantTree {
    fn display_order(&self) -> i32 {
        self.variant.sort_order
    }
}

/// A holiday with its flat dishes and variants, as returned by `GET /holidays`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayMenuTree {
    #[serde(flatten)]
    pub holiday: HolidayMenu,
    pub items: Vec<HolidayMenuItem>,
    pub variants: Vec<HolidayVariantTree>,
    /// Which display state this holiday currently resolves to.
    pub presentation: PresentationKind,
}

impl HolidayMenuTree {
    pub fn new(
        holiday: HolidayMenu,
        items: Vec<HolidayMenuItem>,
        variants: Vec<HolidayVariantTree>,
    ) -> Self {
        let presentation = select_state(variants.len(), holiday.menu_text.as_deref(), items.len());
        Self {
            holiday,
            items,
            variants,
            presentation,
        }
    }

    /// Split into the holiday header and its resolved display state.
    pub fn into_view(self) -> HolidayMenuView {
        let HolidayMenuTree {
            mut holiday,
            items,
            variants,
            ..
        } = self;
        let flat = FlatMenu {
            menu_text: holiday.menu_text.take(),
            menu_price: holiday.menu_price.take(),
            menu_images: std::mem::take(&mut holiday.menu_images),
            items,
        };
        HolidayMenuView {
            holiday: HolidayHeader {
                id: holiday.id,
                name: holiday.name,
                display_name: holiday.display_name,
                preview_image: holiday.preview_image,
            },
            presentation: MenuPresentation::resolve(variants, flat),
        }
    }
}

/// Identity fields of a holiday, without the flat menu fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayHeader {
    pub id: DbId,
    pub name: String,
    pub display_name: String,
    pub preview_image: Option<String>,
}

/// Public view of a holiday: header plus exactly one display state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayMenuView {
    pub holiday: HolidayHeader,
    pub presentation: MenuPresentation<HolidayVariantTree, HolidayMenuItem>,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for `POST /holidays` (upsert by `name`).
///
/// Absent fields are left unchanged on update; explicit `null` clears them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertHolidayMenu {
    pub name: String,
    /// Defaults to `name` when a holiday is first created.
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub preview_image: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub menu_text: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub menu_price: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub menu_images: Option<Option<Vec<String>>>,
}

/// DTO for creating a dish (flat or variant).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHolidayDish {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub ingredients: Vec<String>,
    pub image: Option<String>,
}

/// DTO for updating a dish. `image: null` removes the image.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHolidayDish {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub ingredients: Option<Vec<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub image: Option<Option<String>>,
}

/// DTO for creating a variant. `order` defaults to max(existing) + 1.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHolidayVariant {
    pub title: String,
    pub text: Option<String>,
    pub price: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
    pub order: Option<i32>,
}

/// DTO for updating a variant; tri-state on the nullable fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHolidayVariant {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub text: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub price: Option<Option<f64>>,
    pub images: Option<Vec<String>>,
    pub order: Option<i32>,
}
