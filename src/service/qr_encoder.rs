//! Renders check-in tokens as QR images.
//!
//! Pure functions: the payload goes in, an SVG document and an inline
//! `data:` URI come out. Nothing here touches player state.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use qrcode::QrCode;
use qrcode::render::svg;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::BookingError;

const MIN_DIMENSION: u32 = 240;

/// A rendered QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct QrImage {
    /// Always `image/svg+xml`.
    pub media_type: String,
    /// Base64 `data:` URI ready for an `<img src>`.
    pub data_uri: String,
}

/// Encodes `payload` into an SVG QR code.
///
/// # Errors
///
/// Returns [`BookingError::Internal`] if the payload exceeds QR capacity.
pub fn render_svg(payload: &str) -> Result<String, BookingError> {
    let code = QrCode::new(payload.as_bytes())
        .map_err(|e| BookingError::Internal(format!("qr encoding failed: {e}")))?;
    Ok(code
        .render::<svg::Color<'_>>()
        .min_dimensions(MIN_DIMENSION, MIN_DIMENSION)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build())
}

/// Encodes `payload` and wraps the SVG as a base64 data URI.
///
/// # Errors
///
/// Returns [`BookingError::Internal`] if the payload exceeds QR capacity.
pub fn render_inline(payload: &str) -> Result<QrImage, BookingError> {
    let svg = render_svg(payload)?;
    Ok(QrImage {
        media_type: "image/svg+xml".to_string(),
        data_uri: format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg)),
    })
}
