//! Legacy `menu_items` rows and the menu item override DTO.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use trattoria_core::types::{DbId, Timestamp};

use super::nullable;

/// A row from the legacy `menu_items` table.
///
/// Rows exist only for some catalog ids; they are mirrored into, never
/// created as the canonical source.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: DbId,
    pub name: String,
    pub price: f64,
    pub category_id: DbId,
    pub image: Option<String>,
    pub updated_at: Timestamp,
}

/// DTO for `PATCH /menu-items/{id}`.
///
/// Each field is tri-state: absent leaves the override alone, `null` deletes
/// it (reverting to the catalog value), a value sets it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchMenuItem {
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub price: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub hidden: Option<Option<bool>>,
    #[serde(default, deserialize_with = "nullable")]
    pub category_id: Option<Option<DbId>>,
}

impl PatchMenuItem {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.hidden.is_none()
            && self.category_id.is_none()
    }
}
