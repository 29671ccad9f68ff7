#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use crate::consts::SURFACE_SIDE_PX;

/// A point in either client (CSS) or surface space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pixel dimensions of the backing raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl Default for SurfaceSize {
    fn default() -> Self {
        Self::square(SURFACE_SIDE_PX)
    }
}

impl SurfaceSize {
    #[must_use]
    pub fn square(side: u32) -> Self {
        Self { width: side, height: side }
    }

    /// Center of the surface in surface pixels.
    #[must_use]
    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) * 0.5, f64::from(self.height) * 0.5)
    }
}

/// On-screen bounding box of the surface element, in CSS pixels.
///
/// The element may be displayed at any CSS size; the backing raster keeps
/// its fixed resolution, so client coordinates are rescaled per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for DisplayRect {
    fn default() -> Self {
        let side = f64::from(SURFACE_SIDE_PX);
        Self { left: 0.0, top: 0.0, width: side, height: side }
    }
}

impl DisplayRect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// Whether the rect can be inverted (finite, non-zero extent).
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Convert a client-space point into surface space.
    ///
    /// Returns `None` when the rect has no usable extent.
    #[must_use]
    pub fn to_surface(&self, client: Point, surface: SurfaceSize) -> Option<Point> {
        if !self.is_usable() {
            return None;
        }
        let ratio_x = f64::from(surface.width) / self.width;
        let ratio_y = f64::from(surface.height) / self.height;
        Some(Point {
            x: (client.x - self.left) * ratio_x,
            y: (client.y - self.top) * ratio_y,
        })
    }
}
