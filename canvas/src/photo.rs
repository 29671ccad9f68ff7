//! Bitmaps: the user's photo and the decorative frame.
//!
//! Both are decoded once into straight-alpha RGBA8 and never mutated
//! afterwards. A new upload replaces the [`Photo`] wholesale; the
//! [`Frame`] lives for the whole session.

#[cfg(test)]
#[path = "photo_test.rs"]
mod photo_test;

use image::RgbaImage;

use crate::error::CanvasError;

/// The decoded photo uploaded by the user.
#[derive(Debug, Clone)]
pub struct Photo {
    pixels: RgbaImage,
}

impl Photo {
    /// Wrap an already decoded bitmap.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::EmptyImage`] if either dimension is zero.
    pub fn from_rgba(pixels: RgbaImage) -> Result<Self, CanvasError> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(CanvasError::EmptyImage { width, height });
        }
        Ok(Self { pixels })
    }

    /// Decode an uploaded file. The format is sniffed from the bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Decode`] for corrupt or unsupported data and
    /// [`CanvasError::EmptyImage`] for images without pixels.
    pub fn decode(bytes: &[u8]) -> Result<Self, CanvasError> {
        Self::from_rgba(decode_rgba(bytes)?)
    }

    /// Natural width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Natural height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// The decorative overlay drawn above the photo.
#[derive(Debug, Clone)]
pub struct Frame {
    pixels: RgbaImage,
}

impl Frame {
    /// # Errors
    ///
    /// Returns [`CanvasError::EmptyImage`] if either dimension is zero.
    pub fn from_rgba(pixels: RgbaImage) -> Result<Self, CanvasError> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(CanvasError::EmptyImage { width, height });
        }
        Ok(Self { pixels })
    }

    /// # Errors
    ///
    /// Same failure modes as [`Photo::decode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, CanvasError> {
        Self::from_rgba(decode_rgba(bytes)?)
    }

    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage, CanvasError> {
    let decoded = image::load_from_memory(bytes)?;
    Ok(decoded.to_rgba8())
}
