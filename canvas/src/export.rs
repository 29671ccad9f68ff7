//! Export encoding: PNG bytes and data URLs of the full surface.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::ImageFormat;

use crate::consts::PNG_DATA_URL_PREFIX;
use crate::error::CanvasError;
use crate::render::Surface;

/// Encode the surface at its full backing resolution as PNG.
///
/// # Errors
///
/// Returns [`CanvasError::Encode`] if the PNG encoder fails.
pub fn encode_png(surface: &Surface) -> Result<Vec<u8>, CanvasError> {
    let mut buf = Vec::new();
    surface
        .pixels()
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| CanvasError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Wrap PNG bytes in a `data:image/png;base64,` URL.
#[must_use]
pub fn png_data_url(png: &[u8]) -> String {
    let mut url = String::with_capacity(PNG_DATA_URL_PREFIX.len() + png.len().div_ceil(3) * 4);
    url.push_str(PNG_DATA_URL_PREFIX);
    BASE64.encode_string(png, &mut url);
    url
}
