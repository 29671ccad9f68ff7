//! Transform store: the loaded photo and its placement on the surface.
//!
//! The placement is a translation of the photo center away from the surface
//! center plus a uniform scale over the photo's natural pixel size. The
//! store exposes plain mutations; the engine decides when they run and
//! triggers the redraw.
//!
//! Offsets are never clamped, so a photo may be dragged partially or fully
//! off the surface. Zoom is only guarded against values that would break
//! `scale > 0`.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use serde::{Deserialize, Serialize};

use crate::consts::ZOOM_COVER;
use crate::photo::Photo;
use crate::viewport::SurfaceSize;

/// Placement of the photo relative to the surface center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Horizontal displacement of the photo center, in surface pixels.
    pub offset_x: f64,
    /// Vertical displacement of the photo center, in surface pixels.
    pub offset_y: f64,
    /// Uniform magnification over the photo's natural size. Always > 0.
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self { offset_x: 0.0, offset_y: 0.0, scale: 1.0 }
    }
}

/// Minimal uniform scale at which a `photo_w` x `photo_h` bitmap covers the
/// surface on both axes (cropping the overflow, never letterboxing).
#[must_use]
pub fn cover_scale(photo_w: u32, photo_h: u32, surface: SurfaceSize) -> f64 {
    let scale_x = f64::from(surface.width) / f64::from(photo_w);
    let scale_y = f64::from(surface.height) / f64::from(photo_h);
    scale_x.max(scale_y)
}

/// Owns the photo and its transform.
#[derive(Debug, Clone)]
pub struct TransformStore {
    photo: Option<Photo>,
    transform: Transform,
    zoom: f64,
    surface: SurfaceSize,
}

impl Default for TransformStore {
    fn default() -> Self {
        Self::new(SurfaceSize::default())
    }
}

impl TransformStore {
    #[must_use]
    pub fn new(surface: SurfaceSize) -> Self {
        Self { photo: None, transform: Transform::default(), zoom: ZOOM_COVER, surface }
    }

    /// Install a new photo, discarding the previous one and any drag or
    /// zoom state. The photo starts centered at its cover-fit scale.
    pub fn load_photo(&mut self, photo: Photo) -> Transform {
        let scale = cover_scale(photo.width(), photo.height(), self.surface);
        self.photo = Some(photo);
        self.zoom = ZOOM_COVER;
        self.transform = Transform { offset_x: 0.0, offset_y: 0.0, scale };
        self.transform
    }

    /// Set the scale to `multiplier` times the cover-fit scale.
    ///
    /// The base scale is recomputed from the current photo and surface on
    /// every call. No-op without a photo or for a non-finite / non-positive
    /// multiplier. Returns whether the transform changed.
    pub fn set_scale(&mut self, multiplier: f64) -> bool {
        let Some(photo) = &self.photo else {
            return false;
        };
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return false;
        }
        let base = cover_scale(photo.width(), photo.height(), self.surface);
        self.zoom = multiplier;
        self.transform.scale = base * multiplier;
        true
    }

    /// Assign the offset directly.
    pub fn set_offset(&mut self, x: f64, y: f64) {
        self.transform.offset_x = x;
        self.transform.offset_y = y;
    }

    /// Change the surface size used by subsequent cover-fit computations.
    ///
    /// A size with a zero dimension is ignored, since the cover-fit scale
    /// over it would be zero. Returns whether the size was taken.
    pub fn set_surface(&mut self, surface: SurfaceSize) -> bool {
        if surface.width == 0 || surface.height == 0 {
            return false;
        }
        self.surface = surface;
        true
    }

    #[must_use]
    pub fn transform(&self) -> Transform {
        self.transform
    }

    #[must_use]
    pub fn photo(&self) -> Option<&Photo> {
        self.photo.as_ref()
    }

    #[must_use]
    pub fn has_photo(&self) -> bool {
        self.photo.is_some()
    }

    /// The last zoom multiplier applied (1.0 right after a load).
    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    #[must_use]
    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }
}
