//! Domain logic for the restaurant content service.
//!
//! Everything in this crate is free of I/O: the database and HTTP layers
//! call into these modules to validate payloads, name override keys,
//! resolve shadowed values and pick a holiday menu's display state.

pub mod catalog;
pub mod delivery;
pub mod error;
pub mod holiday;
pub mod image_codec;
pub mod override_keys;
pub mod shadow;
pub mod types;
