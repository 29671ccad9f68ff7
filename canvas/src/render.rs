//! Rendering: composites the photo and the frame onto the surface.
//!
//! This module is the only place that writes surface pixels. It receives a
//! read-only view of the [`TransformStore`] and produces pixels; it does not
//! mutate any application state.
//!
//! Drawing goes through a small [`Painter`] that mirrors a 2D context: a
//! current affine transform plus a save/restore stack. Scoped state is
//! handed out as a guard that restores on drop, so a transform applied for
//! the photo can never leak into the frame pass.
//!
//! Pixels are straight-alpha RGBA8. Every pass is a pure function of its
//! inputs, so redrawing unchanged state is pixel-identical.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::ops::{Deref, DerefMut};

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use kurbo::{Affine, Rect};
use tracing::debug;

use crate::photo::Frame;
use crate::store::TransformStore;
use crate::viewport::SurfaceSize;

/// The fixed-resolution backing raster.
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    #[must_use]
    pub fn new(size: SurfaceSize) -> Self {
        Self { pixels: RgbaImage::new(size.width, size.height) }
    }

    #[must_use]
    pub fn size(&self) -> SurfaceSize {
        SurfaceSize { width: self.pixels.width(), height: self.pixels.height() }
    }

    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Row-major RGBA8 bytes, tightly packed.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.pixels.as_raw()
    }
}

/// Owns the surface and the stretched frame; redraws on demand.
#[derive(Debug, Clone)]
pub struct Compositor {
    surface: Surface,
    source_frame: Frame,
    frame: RgbaImage,
}

impl Compositor {
    /// Create a compositor for a surface of `size`, stretching the frame to
    /// cover it exactly regardless of the frame's aspect ratio.
    #[must_use]
    pub fn new(frame: Frame, size: SurfaceSize) -> Self {
        let stretched = stretch_to(frame.pixels(), size);
        debug!(
            frame_w = frame.pixels().width(),
            frame_h = frame.pixels().height(),
            surface_w = size.width,
            surface_h = size.height,
            "compositor ready"
        );
        Self { surface: Surface::new(size), source_frame: frame, frame: stretched }
    }

    /// Reallocate the surface at a new size and re-stretch the frame.
    ///
    /// The surface is left cleared; callers redraw afterwards.
    pub fn resize(&mut self, size: SurfaceSize) {
        self.frame = stretch_to(self.source_frame.pixels(), size);
        self.surface = Surface::new(size);
    }

    /// Clear the surface, draw the photo (if any) at its transform, then the
    /// frame over the full bounds.
    pub fn redraw(&mut self, store: &TransformStore) {
        let size = self.surface.size();
        let mut painter = Painter::new(&mut self.surface.pixels);
        painter.clear();

        if let Some(photo) = store.photo() {
            let t = store.transform();
            let center = size.center();
            let mut scoped = painter.save();
            scoped.translate(center.x + t.offset_x, center.y + t.offset_y);
            scoped.scale(t.scale);
            scoped.draw_image(
                photo.pixels(),
                -f64::from(photo.width()) / 2.0,
                -f64::from(photo.height()) / 2.0,
            );
        }

        painter.fill_over(&self.frame);
    }

    #[must_use]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }
}

fn stretch_to(src: &RgbaImage, size: SurfaceSize) -> RgbaImage {
    if src.dimensions() == (size.width, size.height) {
        return src.clone();
    }
    imageops::resize(src, size.width, size.height, FilterType::Triangle)
}

// =============================================================
// Painter
// =============================================================

/// Immediate-mode drawing over an RGBA8 target with a transform stack.
pub struct Painter<'a> {
    target: &'a mut RgbaImage,
    transform: Affine,
    saved: Vec<Affine>,
}

impl<'a> Painter<'a> {
    #[must_use]
    pub fn new(target: &'a mut RgbaImage) -> Self {
        Self { target, transform: Affine::IDENTITY, saved: Vec::new() }
    }

    /// Push the current state. The returned guard pops it when dropped.
    pub fn save(&mut self) -> Scoped<'_, 'a> {
        self.saved.push(self.transform);
        Scoped { painter: self }
    }

    fn restore(&mut self) {
        if let Some(prev) = self.saved.pop() {
            self.transform = prev;
        }
    }

    #[must_use]
    pub fn transform(&self) -> Affine {
        self.transform
    }

    pub fn translate(&mut self, x: f64, y: f64) {
        self.transform = self.transform * Affine::translate((x, y));
    }

    pub fn scale(&mut self, s: f64) {
        self.transform = self.transform * Affine::scale(s);
    }

    /// Reset every pixel to transparent black. Ignores the transform.
    pub fn clear(&mut self) {
        for px in self.target.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }
    }

    /// Draw `img` at its natural size with its top-left corner at `(x, y)`
    /// in the current coordinate space, bilinearly sampled and blended
    /// source-over.
    pub fn draw_image(&mut self, img: &RgbaImage, x: f64, y: f64) {
        let (img_w, img_h) = img.dimensions();
        let det = self.transform.determinant();
        if !det.is_finite() || det.abs() < f64::MIN_POSITIVE {
            return;
        }
        let inverse = self.transform.inverse();

        let local = Rect::new(x, y, x + f64::from(img_w), y + f64::from(img_h));
        let bbox = self.transform.transform_rect_bbox(local);
        let (target_w, target_h) = self.target.dimensions();
        let x0 = clamp_px(bbox.x0.floor(), target_w);
        let x1 = clamp_px(bbox.x1.ceil(), target_w);
        let y0 = clamp_px(bbox.y0.floor(), target_h);
        let y1 = clamp_px(bbox.y1.ceil(), target_h);

        for py in y0..y1 {
            for px in x0..x1 {
                let p = inverse * kurbo::Point::new(f64::from(px) + 0.5, f64::from(py) + 0.5);
                let sx = p.x - x;
                let sy = p.y - y;
                if sx < 0.0 || sy < 0.0 || sx >= f64::from(img_w) || sy >= f64::from(img_h) {
                    continue;
                }
                let src = sample_bilinear(img, sx - 0.5, sy - 0.5);
                let dst = self.target.get_pixel_mut(px, py);
                *dst = over(*dst, src);
            }
        }
    }

    /// Blend a same-sized layer over the whole target, ignoring the
    /// transform.
    pub fn fill_over(&mut self, layer: &RgbaImage) {
        for (dst, src) in self.target.pixels_mut().zip(layer.pixels()) {
            match src[3] {
                0 => {}
                255 => *dst = *src,
                _ => *dst = over(*dst, channels_f32(*src)),
            }
        }
    }
}

/// Scoped painter state returned by [`Painter::save`].
pub struct Scoped<'p, 'a> {
    painter: &'p mut Painter<'a>,
}

impl<'a> Deref for Scoped<'_, 'a> {
    type Target = Painter<'a>;

    fn deref(&self) -> &Self::Target {
        self.painter
    }
}

impl<'a> DerefMut for Scoped<'_, 'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.painter
    }
}

impl Drop for Scoped<'_, '_> {
    fn drop(&mut self) {
        self.painter.restore();
    }
}

// =============================================================
// Pixel math
// =============================================================

fn clamp_px(v: f64, max: u32) -> u32 {
    if v.is_nan() || v <= 0.0 {
        return 0;
    }
    if v >= f64::from(max) {
        return max;
    }
    v as u32
}

fn channels_f32(px: Rgba<u8>) -> [f32; 4] {
    [f32::from(px[0]), f32::from(px[1]), f32::from(px[2]), f32::from(px[3])]
}

/// Bilinear sample at continuous pixel coordinates (pixel centers at
/// integer positions), clamped to the edge. Interpolates in premultiplied
/// space and returns straight alpha.
fn sample_bilinear(img: &RgbaImage, x: f64, y: f64) -> [f32; 4] {
    let max_x = img.width() - 1;
    let max_y = img.height() - 1;
    let fx = x.floor();
    let fy = y.floor();
    let tx = (x - fx) as f32;
    let ty = (y - fy) as f32;
    let x0 = clamp_index(fx, max_x);
    let y0 = clamp_index(fy, max_y);
    let x1 = clamp_index(fx + 1.0, max_x);
    let y1 = clamp_index(fy + 1.0, max_y);

    let taps = [
        (img.get_pixel(x0, y0), (1.0 - tx) * (1.0 - ty)),
        (img.get_pixel(x1, y0), tx * (1.0 - ty)),
        (img.get_pixel(x0, y1), (1.0 - tx) * ty),
        (img.get_pixel(x1, y1), tx * ty),
    ];

    let mut acc = [0.0_f32; 4];
    for (px, w) in taps {
        let a = f32::from(px[3]) / 255.0;
        acc[0] += f32::from(px[0]) * a * w;
        acc[1] += f32::from(px[1]) * a * w;
        acc[2] += f32::from(px[2]) * a * w;
        acc[3] += f32::from(px[3]) * w;
    }
    let alpha = acc[3] / 255.0;
    if alpha <= 0.0 {
        return [0.0; 4];
    }
    [acc[0] / alpha, acc[1] / alpha, acc[2] / alpha, acc[3]]
}

fn clamp_index(v: f64, max: u32) -> u32 {
    if v <= 0.0 {
        return 0;
    }
    let max_f = f64::from(max);
    if v >= max_f {
        return max;
    }
    v as u32
}

/// Source-over for straight-alpha pixels; `src` channels are 0..=255.
fn over(dst: Rgba<u8>, src: [f32; 4]) -> Rgba<u8> {
    let sa = src[3] / 255.0;
    if sa <= 0.0 {
        return dst;
    }
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let mut out = [0_u8; 4];
    for i in 0..3 {
        let c = (src[i] * sa + f32::from(dst[i]) * da * (1.0 - sa)) / out_a;
        out[i] = to_u8(c);
    }
    out[3] = to_u8(out_a * 255.0);
    Rgba(out)
}

fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
