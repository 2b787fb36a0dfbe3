//! Shared response envelope types for API handlers.
//!
//! Most API responses use a `{ "data": ... }` envelope. Image reads return
//! `{ "imageUrl": ... }` instead, which is what the display surfaces consume.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "imageUrl": ... }`; `null` means "no image".
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub image_url: Option<String>,
}
