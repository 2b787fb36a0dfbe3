use axum::http::header::USER_AGENT;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use trattoria_core::delivery::RenderCapabilities;

use crate::extract::ApiQuery;
use crate::response::DataResponse;

/// `?maxTouchPoints=` as reported by `navigator.maxTouchPoints`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityParams {
    pub max_touch_points: Option<u32>,
}

/// GET /api/v1/client/capabilities
///
/// Resolve the image delivery capabilities of the calling browser, once per
/// session. The iPadOS desktop-class user agent is only recognized when the
/// client also sends its touch point count.
pub async fn get_capabilities(
    headers: HeaderMap,
    ApiQuery(params): ApiQuery<CapabilityParams>,
) -> impl IntoResponse {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let capabilities = RenderCapabilities::detect(user_agent, params.max_touch_points);

    tracing::debug!(
        platform = ?capabilities.platform,
        requires_reencoding = capabilities.requires_reencoding,
        "Client capabilities resolved"
    );

    Json(DataResponse { data: capabilities })
}
