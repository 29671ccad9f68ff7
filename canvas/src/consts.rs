//! Shared numeric and string constants for the canvas crate.

// ── Surface ─────────────────────────────────────────────────────

/// Side length of the square backing raster, in device pixels.
pub const SURFACE_SIDE_PX: u32 = 1080;

// ── Zoom ────────────────────────────────────────────────────────

/// Zoom multiplier that reproduces the cover-fit scale exactly.
pub const ZOOM_COVER: f64 = 1.0;

// ── Cursors ─────────────────────────────────────────────────────

/// Cursor shown over the surface while no drag is active.
pub const CURSOR_IDLE: &str = "move";

/// Cursor shown while the photo is being dragged.
pub const CURSOR_DRAGGING: &str = "grabbing";

// ── Export ──────────────────────────────────────────────────────

/// File name offered for client-side downloads.
pub const EXPORT_FILE_NAME: &str = "twibbon.png";

/// Prefix of a PNG data URL.
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";
