//! Promotional post models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use trattoria_core::types::{DbId, Timestamp};

/// A row from the `posts` table. Posts are never edited in place.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: DbId,
    pub image: String,
    pub description: String,
    pub title: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a post, and for each entry of a migration import.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePost {
    pub image: String,
    pub description: String,
    pub title: Option<String>,
    /// Only honoured by the migration import, to keep the original date.
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

/// DTO for `POST /posts/migrate`.
#[derive(Debug, Clone, Deserialize)]
pub struct MigratePosts {
    pub posts: Vec<CreatePost>,
}

/// Outcome of a migration import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub migrated: usize,
    pub skipped: usize,
}
