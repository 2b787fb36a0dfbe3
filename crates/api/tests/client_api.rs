//! Integration tests for client capability detection.

mod common;

use axum::http::StatusCode;
use common::{expect_json, get_with_header};

const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1";
const MAC_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15";
const ANDROID_UA: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Mobile Safari/537.36";

async fn capabilities(uri: &str, user_agent: &str) -> serde_json::Value {
    let app = common::build_test_app(common::unreachable_pool());
    let response = get_with_header(app, uri, "user-agent", user_agent).await;
    expect_json(response, StatusCode::OK).await["data"].clone()
}

#[tokio::test]
async fn iphone_requires_reencoding() {
    let data = capabilities("/api/v1/client/capabilities", IPHONE_UA).await;
    assert_eq!(data["platform"], "ios_web_kit");
    assert_eq!(data["requiresReencoding"], true);
}

#[tokio::test]
async fn ipad_reporting_desktop_ua_is_detected_by_touch_points() {
    let data = capabilities("/api/v1/client/capabilities?maxTouchPoints=5", MAC_UA).await;
    assert_eq!(data["requiresReencoding"], true);

    let data = capabilities("/api/v1/client/capabilities", MAC_UA).await;
    assert_eq!(data["platform"], "desktop");
    assert_eq!(data["requiresReencoding"], false);
}

#[tokio::test]
async fn android_keeps_original_images() {
    let data = capabilities("/api/v1/client/capabilities", ANDROID_UA).await;
    assert_eq!(data["platform"], "android");
    assert_eq!(data["requiresReencoding"], false);
}
