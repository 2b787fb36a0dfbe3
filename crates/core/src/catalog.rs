//! The compiled menu catalog.
//!
//! Catalog items are defined here, not in the database. The catalog decides
//! which menu item ids exist; the override store only patches their fields.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::DbId;

/// Longest accepted display name for a dish.
pub const MAX_NAME_LEN: usize = 120;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: DbId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: DbId,
    pub name: String,
    pub price: f64,
    pub category_id: DbId,
}

/// Read-only item id -> name/price/category dataset.
#[derive(Debug, Clone)]
pub struct MenuCatalog {
    categories: Vec<Category>,
    items: Vec<CatalogItem>,
}

const BUILTIN_CATEGORIES: &[(DbId, &str)] = &[
    (1, "Antipasti"),
    (2, "Primi"),
    (3, "Pizze"),
    (4, "Secondi"),
    (5, "Dolci"),
    (6, "Bevande"),
];

const BUILTIN_ITEMS: &[(DbId, &str, f64, DbId)] = &[
    (1, "Bruschetta al pomodoro", 6.0, 1),
    (2, "Tagliere di salumi", 14.0, 1),
    (3, "Spaghetti alle vongole", 15.0, 2),
    (4, "Lasagna della casa", 12.0, 2),
    (5, "Risotto ai funghi porcini", 14.5, 2),
    (6, "Margherita", 7.5, 3),
    (7, "Diavola", 9.0, 3),
    (8, "Quattro formaggi", 10.0, 3),
    (9, "Capricciosa", 10.5, 3),
    (10, "Tagliata di manzo", 22.0, 4),
    (11, "Frittura di paranza", 18.0, 4),
    (12, "Tiramisù", 6.0, 5),
    (13, "Panna cotta ai frutti di bosco", 5.5, 5),
    (14, "Acqua naturale", 2.0, 6),
    (15, "Vino della casa (calice)", 5.0, 6),
];

impl MenuCatalog {
    pub fn new(categories: Vec<Category>, items: Vec<CatalogItem>) -> Self {
        Self { categories, items }
    }

    /// The catalog compiled into the binary.
    pub fn builtin() -> Self {
        let categories = BUILTIN_CATEGORIES
            .iter()
            .map(|&(id, name)| Category {
                id,
                name: name.to_string(),
            })
            .collect();
        let items = BUILTIN_ITEMS
            .iter()
            .map(|&(id, name, price, category_id)| CatalogItem {
                id,
                name: name.to_string(),
                price,
                category_id,
            })
            .collect();
        Self::new(categories, items)
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn find(&self, id: DbId) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: DbId) -> bool {
        self.find(id).is_some()
    }

    pub fn has_category(&self, id: DbId) -> bool {
        self.categories.iter().any(|c| c.id == id)
    }

    /// Look up an item, failing with `NotFound` for ids outside the catalog.
    pub fn require(&self, id: DbId) -> Result<&CatalogItem, CoreError> {
        self.find(id).ok_or(CoreError::NotFound {
            entity: "MenuItem",
            id,
        })
    }
}

/* --------------------------------------------------------------------------
Field validation shared by catalog overrides and holiday dishes
-------------------------------------------------------------------------- */

/// A display name must be non-blank and at most [`MAX_NAME_LEN`] characters.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Name must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// A price must be a finite number greater than zero.
pub fn validate_price(price: f64) -> Result<(), CoreError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(CoreError::Validation(format!(
            "Price must be greater than 0 (got {price})"
        )));
    }
    Ok(())
}
