//! Shadow-value resolution.
//!
//! A field of a catalog menu item can have up to three values: the catalog
//! (base) value, a legacy column on the `menu_items` row, and an override row.
//! [`resolve`] is the one place that decides which of them a reader sees:
//!
//! - text fields: override, else the base value; the legacy column is never read;
//! - images: override, else the legacy column, so images written before the
//!   override table existed stay visible.

use serde::Serialize;

use crate::catalog::CatalogItem;
use crate::override_keys::{MenuItemOverrides, ValueType};
use crate::types::DbId;

/// Which tier a resolved value was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Override,
    Legacy,
    Base,
}

/// Result of resolving one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<T> {
    Override(T),
    Legacy(T),
    Base(T),
    Absent,
}

impl<T> Resolved<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Resolved::Override(v) | Resolved::Legacy(v) | Resolved::Base(v) => Some(v),
            Resolved::Absent => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Resolved::Override(v) | Resolved::Legacy(v) | Resolved::Base(v) => Some(v),
            Resolved::Absent => None,
        }
    }

    pub fn source(&self) -> Option<ValueSource> {
        match self {
            Resolved::Override(_) => Some(ValueSource::Override),
            Resolved::Legacy(_) => Some(ValueSource::Legacy),
            Resolved::Base(_) => Some(ValueSource::Base),
            Resolved::Absent => None,
        }
    }
}

/// The candidate values for one field, one per storage tier.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowInputs<T> {
    pub override_value: Option<T>,
    pub legacy: Option<T>,
    pub base: Option<T>,
}

impl<T> Default for ShadowInputs<T> {
    fn default() -> Self {
        Self {
            override_value: None,
            legacy: None,
            base: None,
        }
    }
}

/// Apply the precedence rule for a field of the given value type.
pub fn resolve<T>(value_type: ValueType, inputs: ShadowInputs<T>) -> Resolved<T> {
    if let Some(v) = inputs.override_value {
        return Resolved::Override(v);
    }
    match value_type {
        ValueType::Text => inputs.base.map_or(Resolved::Absent, Resolved::Base),
        ValueType::Image => inputs.legacy.map_or(Resolved::Absent, Resolved::Legacy),
    }
}

/// A catalog item as every reader should see it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMenuItem {
    pub id: DbId,
    pub name: String,
    pub price: f64,
    pub category_id: DbId,
    pub hidden: bool,
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_source: Option<ValueSource>,
}

/// Merge a catalog item with its text overrides and image tiers.
pub fn resolve_menu_item(
    item: &CatalogItem,
    overrides: Option<&MenuItemOverrides>,
    image_override: Option<String>,
    legacy_image: Option<String>,
) -> ResolvedMenuItem {
    let overrides = overrides.cloned().unwrap_or_default();

    let text = |override_value: Option<String>, base: String| {
        resolve(
            ValueType::Text,
            ShadowInputs {
                override_value,
                legacy: None,
                base: Some(base),
            },
        )
    };

    let name = text(overrides.name, item.name.clone());
    let price = resolve(
        ValueType::Text,
        ShadowInputs {
            override_value: overrides.price,
            legacy: None,
            base: Some(item.price),
        },
    );
    let category_id = resolve(
        ValueType::Text,
        ShadowInputs {
            override_value: overrides.category_id,
            legacy: None,
            base: Some(item.category_id),
        },
    );
    let image = resolve(
        ValueType::Image,
        ShadowInputs {
            override_value: image_override,
            legacy: legacy_image,
            base: None,
        },
    );

    let image_source = image.source();
    ResolvedMenuItem {
        id: item.id,
        name: name.into_value().unwrap_or_default(),
        price: price.into_value().unwrap_or(item.price),
        category_id: category_id.into_value().unwrap_or(item.category_id),
        hidden: overrides.hidden.unwrap_or(false),
        image_url: image.into_value(),
        image_source,
    }
}
