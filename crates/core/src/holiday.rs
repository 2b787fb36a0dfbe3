//! Holiday menu presentation and dish validation.
//!
//! A holiday menu is shown in exactly one of four states, chosen by a strict
//! priority chain evaluated once per read:
//!
//! 1. variants (each rendered as its own sub-menu, ordered by `order`)
//! 2. flat menu text (with optional price and images)
//! 3. flat dish list
//! 4. empty placeholder
//!
//! Lower-priority fields stay stored while a higher state is active; deleting
//! every variant brings the flat text back.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::catalog::{validate_name, validate_price};
use crate::error::CoreError;

/// Longest accepted holiday slug.
pub const MAX_SLUG_LEN: usize = 64;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]*$").expect("valid regex"));

/// Anything that carries an explicit display order.
pub trait DisplayOrder {
    fn display_order(&self) -> i32;
}

/// The flat (variant-less) menu fields of a holiday.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatMenu<I> {
    pub menu_text: Option<String>,
    pub menu_price: Option<f64>,
    pub menu_images: Vec<String>,
    pub items: Vec<I>,
}

/// Discriminant of [`MenuPresentation`], for listings that only need the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationKind {
    Variants,
    FlatText,
    FlatItems,
    Empty,
}

/// The single display state of a holiday menu.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MenuPresentation<V, I> {
    Variants {
        variants: Vec<V>,
    },
    FlatText {
        text: String,
        price: Option<f64>,
        images: Vec<String>,
    },
    FlatItems {
        items: Vec<I>,
    },
    Empty,
}

/// The authoritative priority chain, on the cheap inputs only.
pub fn select_state(
    variant_count: usize,
    menu_text: Option<&str>,
    item_count: usize,
) -> PresentationKind {
    if variant_count > 0 {
        PresentationKind::Variants
    } else if menu_text.is_some_and(|t| !t.trim().is_empty()) {
        PresentationKind::FlatText
    } else if item_count > 0 {
        PresentationKind::FlatItems
    } else {
        PresentationKind::Empty
    }
}

impl<V: DisplayOrder, I> MenuPresentation<V, I> {
    /// Build the display state chosen by [`select_state`]. Variants are sorted
    /// by order ascending; the sort is stable, so ties keep the order they
    /// were passed in.
    pub fn resolve(mut variants: Vec<V>, flat: FlatMenu<I>) -> Self {
        match select_state(variants.len(), flat.menu_text.as_deref(), flat.items.len()) {
            PresentationKind::Variants => {
                variants.sort_by_key(|v| v.display_order());
                MenuPresentation::Variants { variants }
            }
            PresentationKind::FlatText => MenuPresentation::FlatText {
                text: flat.menu_text.unwrap_or_default(),
                price: flat.menu_price,
                images: flat.menu_images,
            },
            PresentationKind::FlatItems => MenuPresentation::FlatItems { items: flat.items },
            PresentationKind::Empty => MenuPresentation::Empty,
        }
    }
}

impl<V, I> MenuPresentation<V, I> {
    pub fn kind(&self) -> PresentationKind {
        match self {
            MenuPresentation::Variants { .. } => PresentationKind::Variants,
            MenuPresentation::FlatText { .. } => PresentationKind::FlatText,
            MenuPresentation::FlatItems { .. } => PresentationKind::FlatItems,
            MenuPresentation::Empty => PresentationKind::Empty,
        }
    }
}

/* --------------------------------------------------------------------------
Validation
-------------------------------------------------------------------------- */

/// Holiday names are stable lowercase slugs such as `natale` or `pasqua-2025`.
pub fn validate_slug(name: &str) -> Result<(), CoreError> {
    if name.len() > MAX_SLUG_LEN || !SLUG_RE.is_match(name) {
        return Err(CoreError::Validation(format!(
            "Holiday name '{name}' must be a lowercase slug (a-z, 0-9, '-', '_'), \
             at most {MAX_SLUG_LEN} characters"
        )));
    }
    Ok(())
}

/// A dish needs a non-blank name and a positive price.
pub fn validate_dish(name: &str, price: f64) -> Result<(), CoreError> {
    validate_name(name)?;
    validate_price(price)
}

/// Trim ingredients and drop blank entries.
pub fn normalize_ingredients(ingredients: Vec<String>) -> Vec<String> {
    ingredients
        .into_iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .collect()
}
