//! Inline image validation, normalization and re-compression.
//!
//! Images travel as data URIs (`data:image/png;base64,...`). Two size gates
//! apply to the encoded text:
//!
//! - the **storage gate** ([`STORAGE_GATE_BYTES`]) is checked by every
//!   endpoint before a payload is persisted;
//! - the tighter **transport gate** ([`TRANSPORT_GATE_BYTES`]) keeps request
//!   bodies below the hosting platform's payload limit. Payloads above it are
//!   re-encoded as JPEG at decreasing quality and size, never truncated.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use serde::Serialize;

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Named constants
-------------------------------------------------------------------------- */

/// Largest encoded payload accepted for storage (~5 MiB of binary data).
pub const STORAGE_GATE_BYTES: usize = 7 * 1024 * 1024;

/// Largest encoded payload shipped in a single request body.
pub const TRANSPORT_GATE_BYTES: usize = 4 * 1024 * 1024;

/// MIME types accepted in a data URI header.
pub const RECOGNIZED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
];

const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Base64 characters sniffed to detect a headerless payload (decodes to 9 bytes).
const SNIFF_CHARS: usize = 12;

/// JPEG qualities tried, in order, at each re-compression scale.
const QUALITY_STEPS: &[u8] = &[85, 70, 55, 35];

/// Factor applied to both dimensions when every quality step was too large.
const SCALE_STEP: f32 = 0.75;

/// Re-compression stops once the longest edge would drop below this.
const MIN_EDGE_PX: u32 = 64;

/* --------------------------------------------------------------------------
Errors
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("Image payload is empty")]
    Empty,

    #[error("Unsupported image type '{0}'")]
    UnsupportedMime(String),

    #[error("Image payload has no data URI header and no JPEG or PNG signature")]
    MissingHeader,

    #[error("Malformed image payload: {0}")]
    Malformed(String),

    #[error("Image is {size} bytes encoded, limit is {limit}; reduce quality or dimensions")]
    PayloadTooLarge { size: usize, limit: usize },
}

impl From<CodecError> for CoreError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::PayloadTooLarge { size, limit } => {
                CoreError::PayloadTooLarge { size, limit }
            }
            other => CoreError::Validation(other.to_string()),
        }
    }
}

/* --------------------------------------------------------------------------
InlineImage
-------------------------------------------------------------------------- */

/// A normalized data URI: recognized MIME header, base64 body, no whitespace.
///
/// Only constructed through [`normalize`] or [`fit_within`], so holding one
/// means the payload passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InlineImage(String);

impl InlineImage {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Encoded length in bytes (the quantity both gates measure).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The MIME type from the header, e.g. `image/png`.
    pub fn mime(&self) -> &str {
        let header = self.0.split_once(',').map(|(h, _)| h).unwrap_or_default();
        header
            .trim_start_matches("data:")
            .trim_end_matches(";base64")
    }

    /// The base64 body after the header.
    pub fn payload(&self) -> &str {
        self.0.split_once(',').map(|(_, p)| p).unwrap_or_default()
    }

    /// Decode the base64 body into raw image bytes.
    pub fn decode_bytes(&self) -> Result<Vec<u8>, CodecError> {
        STANDARD
            .decode(self.payload())
            .map_err(|e| CodecError::Malformed(format!("invalid base64: {e}")))
    }

    fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        Self(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
    }
}

impl std::fmt::Display for InlineImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/* --------------------------------------------------------------------------
Normalization
-------------------------------------------------------------------------- */

/// Validate and normalize a raw inline image string.
///
/// Strips whitespace and control characters, lowercases the header,
/// canonicalizes `image/jpg` to `image/jpeg`, and injects a header when a
/// headerless payload starts with a JPEG or PNG signature. No size gate is
/// applied here.
pub fn normalize(raw: &str) -> Result<InlineImage, CodecError> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();

    if compact.is_empty() {
        return Err(CodecError::Empty);
    }

    let (mime, payload) = match compact.get(..5) {
        Some(scheme) if scheme.eq_ignore_ascii_case("data:") => split_data_uri(&compact)?,
        _ => (sniff_mime(&compact)?, compact.as_str()),
    };

    validate_base64_body(payload)?;

    Ok(InlineImage(format!("data:{mime};base64,{payload}")))
}

/// Normalize and apply the storage gate. Used before every persist.
pub fn normalize_for_storage(raw: &str) -> Result<InlineImage, CodecError> {
    let image = normalize(raw)?;
    check_gate(&image, STORAGE_GATE_BYTES)?;
    Ok(image)
}

/// Normalize and re-compress until the payload fits the transport gate.
pub fn prepare_for_transport(raw: &str) -> Result<InlineImage, CodecError> {
    fit_within(normalize(raw)?, TRANSPORT_GATE_BYTES)
}

/// Reject an image whose encoded length exceeds `limit`.
pub fn check_gate(image: &InlineImage, limit: usize) -> Result<(), CodecError> {
    if image.len() > limit {
        return Err(CodecError::PayloadTooLarge {
            size: image.len(),
            limit,
        });
    }
    Ok(())
}

/// Return `image` unchanged when it fits `limit`, otherwise re-encode it as
/// JPEG at decreasing quality, then decreasing dimensions, until it fits.
///
/// Never returns a payload above `limit`.
pub fn fit_within(image: InlineImage, limit: usize) -> Result<InlineImage, CodecError> {
    if image.len() <= limit {
        return Ok(image);
    }

    let original_size = image.len();
    let bytes = image.decode_bytes()?;
    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| CodecError::Malformed(format!("undecodable image: {e}")))?;

    let mut current = DynamicImage::ImageRgb8(decoded.to_rgb8());
    loop {
        for &quality in QUALITY_STEPS {
            let candidate = encode_jpeg(&current, quality)?;
            if candidate.len() <= limit {
                return Ok(candidate);
            }
        }

        let (width, height) = current.dimensions();
        let next_width = (width as f32 * SCALE_STEP) as u32;
        let next_height = (height as f32 * SCALE_STEP) as u32;
        if next_width.max(next_height) < MIN_EDGE_PX || next_width == 0 || next_height == 0 {
            break;
        }
        current = current.resize_exact(next_width, next_height, FilterType::Triangle);
    }

    Err(CodecError::PayloadTooLarge {
        size: original_size,
        limit,
    })
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<InlineImage, CodecError> {
    let rgb = image.to_rgb8();
    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode_image(&rgb)
        .map_err(|e| CodecError::Malformed(format!("JPEG re-encode failed: {e}")))?;
    Ok(InlineImage::from_bytes("image/jpeg", buf.get_ref()))
}

fn split_data_uri(compact: &str) -> Result<(String, &str), CodecError> {
    let (header, payload) = compact
        .split_once(',')
        .ok_or_else(|| CodecError::Malformed("data URI has no ',' separator".into()))?;

    let header = header.to_ascii_lowercase();
    let mime = header
        .strip_prefix("data:")
        .and_then(|h| h.strip_suffix(";base64"))
        .ok_or_else(|| CodecError::Malformed("data URI must be base64 encoded".into()))?;

    let mime = match mime {
        "image/jpg" | "image/pjpeg" => "image/jpeg",
        other => other,
    };
    if !RECOGNIZED_MIME_TYPES.contains(&mime) {
        return Err(CodecError::UnsupportedMime(mime.to_string()));
    }

    Ok((mime.to_string(), payload))
}

fn sniff_mime(payload: &str) -> Result<String, CodecError> {
    let prefix = payload.get(..SNIFF_CHARS.min(payload.len() / 4 * 4)).unwrap_or_default();
    let leading = STANDARD
        .decode(prefix)
        .map_err(|_| CodecError::MissingHeader)?;

    if leading.starts_with(JPEG_SIGNATURE) {
        Ok("image/jpeg".to_string())
    } else if leading.starts_with(PNG_SIGNATURE) {
        Ok("image/png".to_string())
    } else {
        Err(CodecError::MissingHeader)
    }
}

fn validate_base64_body(payload: &str) -> Result<(), CodecError> {
    if payload.is_empty() {
        return Err(CodecError::Malformed("image body is empty".into()));
    }
    if payload.len() % 4 != 0 {
        return Err(CodecError::Malformed(
            "base64 body length is not a multiple of 4".into(),
        ));
    }

    let body = payload.trim_end_matches('=');
    if payload.len() - body.len() > 2 {
        return Err(CodecError::Malformed("too much base64 padding".into()));
    }
    if let Some(bad) = body
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '+' || *c == '/'))
    {
        return Err(CodecError::Malformed(format!(
            "invalid base64 character '{bad}'"
        )));
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use image::{ImageFormat, Rgb, RgbImage};

    use super::*;

    fn png_bytes(width: u32, height: u32, noisy: bool) -> Vec<u8> {
        let mut seed: u32 = 0x2545_F491;
        let img = RgbImage::from_fn(width, height, |x, y| {
            if noisy {
                seed ^= seed << 13;
                seed ^= seed >> 17;
                seed ^= seed << 5;
                let [r, g, b, _] = seed.to_le_bytes();
                Rgb([r, g, b])
            } else {
                Rgb([(x % 256) as u8, (y % 256) as u8, 128])
            }
        });
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn png_data_uri(width: u32, height: u32, noisy: bool) -> String {
        format!(
            "data:image/png;base64,{}",
            STANDARD.encode(png_bytes(width, height, noisy))
        )
    }

    // -- normalize --

    #[test]
    fn valid_data_uri_is_accepted() {
        let raw = png_data_uri(4, 4, false);
        let image = normalize(&raw).unwrap();
        assert_eq!(image.as_str(), raw);
        assert_eq!(image.mime(), "image/png");
    }

    #[test]
    fn whitespace_and_control_chars_are_stripped() {
        let raw = png_data_uri(4, 4, false);
        let (head, tail) = raw.split_at(40);
        let messy = format!("  {head}\n\r\t{tail} \u{0007}");
        assert_eq!(normalize(&messy).unwrap().as_str(), raw);
    }

    #[test]
    fn headerless_jpeg_gets_header_injected() {
        let body = STANDARD.encode([0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F']);
        let image = normalize(&body).unwrap();
        assert_eq!(image.mime(), "image/jpeg");
        assert_eq!(image.payload(), body);
    }

    #[test]
    fn headerless_png_gets_header_injected() {
        let body = STANDARD.encode(png_bytes(2, 2, false));
        let image = normalize(&body).unwrap();
        assert!(image.as_str().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn headerless_unknown_bytes_rejected() {
        let body = STANDARD.encode(b"GIF-ish but not really");
        assert_matches!(normalize(&body), Err(CodecError::MissingHeader));
    }

    #[test]
    fn empty_payload_rejected() {
        assert_matches!(normalize("  \n "), Err(CodecError::Empty));
    }

    #[test]
    fn non_image_mime_rejected() {
        let result = normalize("data:text/plain;base64,aGVsbG8=");
        assert_matches!(result, Err(CodecError::UnsupportedMime(m)) if m == "text/plain");
    }

    #[test]
    fn jpg_alias_and_uppercase_header_are_canonicalized() {
        let image = normalize("DATA:IMAGE/JPG;BASE64,/9j/4AAQ").unwrap();
        assert_eq!(image.as_str(), "data:image/jpeg;base64,/9j/4AAQ");
    }

    #[test]
    fn non_base64_body_rejected() {
        assert_matches!(
            normalize("data:image/png;base64,abc$"),
            Err(CodecError::Malformed(_))
        );
        assert_matches!(
            normalize("data:image/png;base64,abcde"),
            Err(CodecError::Malformed(_))
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        let raw = format!(" {}\n", png_data_uri(8, 8, true).replace("data:image/png", "data:IMAGE/PNG"));
        let once = normalize(&raw).unwrap();
        let twice = normalize(once.as_str()).unwrap();
        assert_eq!(once, twice);
    }

    // -- gates --

    #[test]
    fn storage_gate_rejects_oversized_payload() {
        let body = "A".repeat(STORAGE_GATE_BYTES);
        let raw = format!("data:image/png;base64,{body}");
        assert_matches!(
            normalize_for_storage(&raw),
            Err(CodecError::PayloadTooLarge { limit, .. }) if limit == STORAGE_GATE_BYTES
        );
    }

    #[test]
    fn payload_too_large_maps_to_core_error() {
        let err: CoreError = CodecError::PayloadTooLarge { size: 10, limit: 5 }.into();
        assert_matches!(err, CoreError::PayloadTooLarge { size: 10, limit: 5 });

        let err: CoreError = CodecError::MissingHeader.into();
        assert_matches!(err, CoreError::Validation(_));
    }

    // -- fit_within --

    #[test]
    fn image_under_limit_is_returned_unchanged() {
        let image = normalize(&png_data_uri(16, 16, true)).unwrap();
        let fitted = fit_within(image.clone(), image.len()).unwrap();
        assert_eq!(fitted, image);
        assert_eq!(fit_within(fitted.clone(), image.len()).unwrap(), fitted);
    }

    #[test]
    fn oversized_image_is_recompressed_below_limit() {
        let image = normalize(&png_data_uri(256, 256, true)).unwrap();
        let limit = 20_000;
        assert!(image.len() > limit);

        let fitted = fit_within(image, limit).unwrap();
        assert!(fitted.len() <= limit);
        assert_eq!(fitted.mime(), "image/jpeg");
        let bytes = fitted.decode_bytes().unwrap();
        assert!(image::load_from_memory(&bytes).is_ok());
    }

    #[test]
    fn unreachable_limit_fails_with_payload_too_large() {
        let image = normalize(&png_data_uri(128, 128, true)).unwrap();
        let size = image.len();
        assert_matches!(
            fit_within(image, 16),
            Err(CodecError::PayloadTooLarge { size: s, limit: 16 }) if s == size
        );
    }

    #[test]
    fn undecodable_oversized_payload_is_malformed() {
        let image = normalize(&format!("data:image/png;base64,{}", "QUFB".repeat(64))).unwrap();
        assert_matches!(fit_within(image, 10), Err(CodecError::Malformed(_)));
    }
}
