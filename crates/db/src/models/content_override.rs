//! Content override rows: the generic key/value patch table.

use serde::Serialize;
use sqlx::FromRow;
use trattoria_core::override_keys::ValueType;
use trattoria_core::types::Timestamp;

/// A row from the `content_overrides` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentOverride {
    pub key: String,
    pub value: String,
    pub value_type: String,
    pub updated_at: Timestamp,
}

impl ContentOverride {
    /// The parsed type tag; `None` for tags written by another build.
    pub fn value_type(&self) -> Option<ValueType> {
        ValueType::parse(&self.value_type)
    }
}
