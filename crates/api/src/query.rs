//! Shared query parameter types for API handlers.

use serde::Deserialize;
use trattoria_core::types::DbId;

/// `?include_hidden=` on the resolved menu listing.
#[derive(Debug, Deserialize)]
pub struct IncludeHiddenParams {
    #[serde(default)]
    pub include_hidden: bool,
}

/// `?id=` on `DELETE /posts`.
///
/// Kept as a string so a malformed id is reported as a validation error
/// rather than a bare extractor rejection.
#[derive(Debug, Deserialize)]
pub struct PostIdParams {
    pub id: Option<String>,
}
