//! Key grammar for the content override store.
//!
//! Override rows are addressed by synthetic string keys:
//!
//! ```text
//! <entity-kind>_<id>_<field>     menu_item_7_name, menu_item_7_price
//! <scope>_image_<id>             menu_item_image_7
//! <scope>_image                  owner_image, cover_image
//! ```
//!
//! The list side parses keys back into `{id, field}` pairs and silently skips
//! anything that does not match, so rows written by older or newer builds
//! never break a read.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Entity kind used for catalog-defined menu items.
pub const MENU_ITEM_KIND: &str = "menu_item";

/// Site slot for the owner photo, backed by the `staff` row as well.
pub const OWNER_SLOT: &str = "owner";

/// Fixed site image slots stored under `<slot>_image`.
pub const SITE_IMAGE_SLOTS: &[&str] = &[OWNER_SLOT, "cover", "profile"];

static MENU_ITEM_FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^menu_item_(\d+)_([a-z][a-z_]*)$").expect("valid regex"));

/// Semantic type tag stored next to each override value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Text,
    Image,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Text => "text",
            ValueType::Image => "image",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(ValueType::Text),
            "image" => Some(ValueType::Image),
            _ => None,
        }
    }
}

/// Editable text fields of a catalog menu item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MenuItemField {
    Name,
    Price,
    Hidden,
    Category,
}

impl MenuItemField {
    pub const ALL: [MenuItemField; 4] = [
        MenuItemField::Name,
        MenuItemField::Price,
        MenuItemField::Hidden,
        MenuItemField::Category,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MenuItemField::Name => "name",
            MenuItemField::Price => "price",
            MenuItemField::Hidden => "hidden",
            MenuItemField::Category => "category",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }
}

/// `<entity-kind>_<id>_<field>`
pub fn field_key(entity_kind: &str, id: DbId, field: &str) -> String {
    format!("{entity_kind}_{id}_{field}")
}

/// `<scope>_image_<id>`, or `<scope>_image` for singleton scopes.
pub fn image_key(scope: &str, id: Option<DbId>) -> String {
    match id {
        Some(id) => format!("{scope}_image_{id}"),
        None => format!("{scope}_image"),
    }
}

pub fn menu_item_field_key(id: DbId, field: MenuItemField) -> String {
    field_key(MENU_ITEM_KIND, id, field.as_str())
}

pub fn menu_item_image_key(id: DbId) -> String {
    image_key(MENU_ITEM_KIND, Some(id))
}

/// Parse `menu_item_<id>_<field>` back into its parts.
///
/// Returns `None` for image keys, unknown fields and anything else.
pub fn parse_menu_item_field_key(key: &str) -> Option<(DbId, MenuItemField)> {
    let caps = MENU_ITEM_FIELD_RE.captures(key)?;
    let id = caps[1].parse::<DbId>().ok()?;
    let field = MenuItemField::parse(&caps[2])?;
    Some((id, field))
}

/// Parse `<scope>_image_<id>` back into the id.
pub fn parse_image_key(scope: &str, key: &str) -> Option<DbId> {
    key.strip_prefix(scope)?
        .strip_prefix("_image_")?
        .parse::<DbId>()
        .ok()
}

/// The text overrides recorded for one menu item. Absent fields are omitted
/// from the serialized form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<DbId>,
}

impl MenuItemOverrides {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.hidden.is_none()
            && self.category_id.is_none()
    }

    /// Apply one stored value. Values that do not parse for their field are
    /// ignored, like malformed keys.
    fn apply(&mut self, field: MenuItemField, value: &str) {
        match field {
            MenuItemField::Name => self.name = Some(value.to_string()),
            MenuItemField::Price => self.price = value.trim().parse().ok(),
            MenuItemField::Hidden => self.hidden = value.trim().parse().ok(),
            MenuItemField::Category => self.category_id = value.trim().parse().ok(),
        }
    }
}

/// Fold raw `(key, value)` rows into per-item overrides, keyed by id.
///
/// Keys that are not menu item field keys are skipped.
pub fn collect_menu_item_overrides<'a, I>(rows: I) -> BTreeMap<DbId, MenuItemOverrides>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut map: BTreeMap<DbId, MenuItemOverrides> = BTreeMap::new();
    for (key, value) in rows {
        if let Some((id, field)) = parse_menu_item_field_key(key) {
            map.entry(id).or_default().apply(field, value);
        }
    }
    map.retain(|_, overrides| !overrides.is_empty());
    map
}
