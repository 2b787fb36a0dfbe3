//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` create / update DTOs for request payloads
//!
//! JSON uses camelCase field names, matching the front-end surfaces.

pub mod content_override;
pub mod holiday;
pub mod menu_item;
pub mod post;
pub mod staff;

use serde::{Deserialize, Deserializer};

/// Deserialize a field that distinguishes "absent" from "explicit null".
///
/// Use with `#[serde(default, deserialize_with = "nullable")]` on an
/// `Option<Option<T>>`: absent -> `None`, `null` -> `Some(None)`,
/// value -> `Some(Some(v))`.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
