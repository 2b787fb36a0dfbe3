use serde::Serialize;

use crate::types::DbId;

/// One entry of a batch request that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    /// Position of the entry in the submitted batch.
    pub index: usize,
    /// The menu item the entry targeted, when it could be read.
    pub item_id: Option<DbId>,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Entity not found: {entity} '{name}'")]
    NotFoundByName { entity: &'static str, name: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(
        "Payload too large: {size} bytes exceeds the {limit} byte limit; \
         reduce image quality or dimensions"
    )]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Batch rejected: {} entries failed validation", .0.len())]
    BatchRejected(Vec<BatchFailure>),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
