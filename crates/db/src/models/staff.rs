//! Staff profile rows (currently only the owner).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use trattoria_core::types::{DbId, Timestamp};

/// Role of the single owner profile row.
pub const OWNER_ROLE: &str = "owner";

/// A row from the `staff` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: DbId,
    pub role: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub updated_at: Timestamp,
}

/// DTO for `POST /staff/owner`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertOwner {
    pub name: Option<String>,
    pub image_url: String,
}

/// Where the owner photo was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerImageSource {
    Staff,
    Override,
    None,
}

/// The owner profile as readers see it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerProfile {
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub source: OwnerImageSource,
}

impl OwnerProfile {
    pub fn empty() -> Self {
        Self {
            name: None,
            image_url: None,
            source: OwnerImageSource::None,
        }
    }
}
