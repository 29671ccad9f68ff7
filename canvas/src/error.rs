//! Error type shared by the canvas crate.

/// Errors produced by decoding, encoding, and host presentation.
///
/// Pointer and zoom handlers never fail: requests that cannot apply (no
/// photo loaded, degenerate geometry) are ignored instead.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    /// The uploaded bytes could not be decoded as an image.
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
    /// The image decoded but has no pixels.
    #[error("image has zero size: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },
    /// The surface could not be encoded for export.
    #[error("image encode failed: {0}")]
    Encode(String),
    /// A new upload was started while a previous decode is still pending.
    #[error("an upload is already being decoded")]
    UploadInProgress,
    /// The browser rejected a canvas call.
    #[error("canvas host error: {0}")]
    Host(String),
}
