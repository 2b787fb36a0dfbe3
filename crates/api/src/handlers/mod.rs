//! Request handlers, one module per resource.
//!
//! Every mutating handler follows the same order: path and payload
//! validation, then the reachability probe, then the write. Validation
//! failures therefore never wait on the probe's backoff.

pub mod client;
pub mod holidays;
pub mod images;
pub mod menu_items;
pub mod posts;
pub mod schema;
pub mod staff;

use trattoria_core::image_codec::{normalize_for_storage, CodecError};

use crate::error::AppResult;
use crate::probe::{probe_with_retry, ProbePolicy};
use crate::state::AppState;

/// Probe the store with the configured retry policy.
pub(crate) async fn ensure_store_reachable(state: &AppState) -> AppResult<()> {
    probe_with_retry(&state.pool, ProbePolicy::from_config(&state.config)).await?;
    Ok(())
}

/// Normalize an inline image and apply the storage gate.
pub(crate) fn storable_image(raw: &str) -> Result<String, CodecError> {
    normalize_for_storage(raw).map(|image| image.into_string())
}

/// Normalize every image of a list, failing on the first bad one.
pub(crate) fn storable_images(raw: &[String]) -> Result<Vec<String>, CodecError> {
    raw.iter().map(|r| storable_image(r)).collect()
}
