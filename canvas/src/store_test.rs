#![allow(clippy::float_cmp)]

use image::RgbaImage;

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn photo(w: u32, h: u32) -> Photo {
    Photo::from_rgba(RgbaImage::new(w, h)).unwrap()
}

fn store() -> TransformStore {
    TransformStore::new(SurfaceSize::square(1080))
}

// =============================================================
// cover_scale
// =============================================================

#[test]
fn cover_scale_landscape_uses_height() {
    assert!(approx_eq(cover_scale(800, 600, SurfaceSize::square(1080)), 1.8));
}

#[test]
fn cover_scale_portrait_uses_width() {
    assert!(approx_eq(cover_scale(600, 1200, SurfaceSize::square(1080)), 1.8));
}

#[test]
fn cover_scale_portrait_800_by_1080() {
    // 1080/800 = 1.35 vs 1080/1080 = 1.0
    assert!(approx_eq(cover_scale(800, 1080, SurfaceSize::square(1080)), 1.35));
}

#[test]
fn cover_scale_downscales_large_photos() {
    assert!(approx_eq(cover_scale(4320, 2160, SurfaceSize::square(1080)), 0.5));
}

#[test]
fn cover_scale_always_covers_surface() {
    let surface = SurfaceSize::square(1080);
    for (w, h) in [(1, 1), (3, 7), (800, 600), (1080, 1080), (4000, 30), (17, 9001), (1079, 1081)] {
        let s = cover_scale(w, h, surface);
        assert!(f64::from(w) * s >= 1080.0 - EPSILON, "{w}x{h} width short");
        assert!(f64::from(h) * s >= 1080.0 - EPSILON, "{w}x{h} height short");
        // Minimal: at least one axis fits exactly.
        let fits_w = approx_eq(f64::from(w) * s, 1080.0);
        let fits_h = approx_eq(f64::from(h) * s, 1080.0);
        assert!(fits_w || fits_h, "{w}x{h} not minimal");
    }
}

#[test]
fn cover_scale_non_square_surface() {
    let surface = SurfaceSize { width: 1000, height: 500 };
    assert!(approx_eq(cover_scale(100, 100, surface), 10.0));
}

// =============================================================
// load_photo
// =============================================================

#[test]
fn new_store_is_empty() {
    let s = store();
    assert!(!s.has_photo());
    assert!(s.photo().is_none());
    assert_eq!(s.transform(), Transform::default());
    assert_eq!(s.zoom(), 1.0);
}

#[test]
fn default_store_starts_at_cover_zoom() {
    let s = TransformStore::default();
    assert_eq!(s.zoom(), 1.0);
    assert_eq!(s.surface(), SurfaceSize::default());
    assert!(!s.has_photo());
}

#[test]
fn load_photo_resets_to_cover_fit() {
    let mut s = store();
    let t = s.load_photo(photo(800, 600));
    assert_eq!(t.offset_x, 0.0);
    assert_eq!(t.offset_y, 0.0);
    assert!(approx_eq(t.scale, 1.8));
    assert_eq!(s.transform(), t);
    assert!(s.has_photo());
}

#[test]
fn replacing_photo_discards_drag_and_zoom() {
    let mut s = store();
    s.load_photo(photo(800, 600));
    s.set_offset(120.0, -45.0);
    assert!(s.set_scale(2.5));

    let t = s.load_photo(photo(540, 2160));
    assert_eq!(t.offset_x, 0.0);
    assert_eq!(t.offset_y, 0.0);
    assert!(approx_eq(t.scale, 2.0));
    assert_eq!(s.zoom(), 1.0);
    assert_eq!(s.photo().map(Photo::width), Some(540));
}

// =============================================================
// set_scale
// =============================================================

#[test]
fn set_scale_without_photo_is_noop() {
    let mut s = store();
    assert!(!s.set_scale(2.0));
    assert_eq!(s.transform(), Transform::default());
}

#[test]
fn set_scale_multiplier_one_is_cover_fit() {
    let mut s = store();
    s.load_photo(photo(800, 600));
    assert!(s.set_scale(3.0));
    assert!(s.set_scale(1.0));
    assert!(approx_eq(s.transform().scale, 1.8));
}

#[test]
fn set_scale_is_monotonic_in_multiplier() {
    let mut s = store();
    s.load_photo(photo(800, 600));
    let mut last = 0.0;
    for m in [0.25, 0.5, 1.0, 1.01, 1.5, 2.0, 3.0] {
        s.set_scale(m);
        let scale = s.transform().scale;
        assert!(scale > last, "multiplier {m} did not increase scale");
        last = scale;
    }
}

#[test]
fn set_scale_keeps_offsets() {
    let mut s = store();
    s.load_photo(photo(800, 600));
    s.set_offset(10.0, 20.0);
    s.set_scale(1.5);
    assert_eq!(s.transform().offset_x, 10.0);
    assert_eq!(s.transform().offset_y, 20.0);
}

#[test]
fn set_scale_rejects_non_positive_and_non_finite() {
    let mut s = store();
    s.load_photo(photo(800, 600));
    s.set_scale(1.5);
    let before = s.transform();
    for m in [0.0, -1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert!(!s.set_scale(m));
        assert_eq!(s.transform(), before);
    }
    assert_eq!(s.zoom(), 1.5);
}

#[test]
fn set_scale_tracks_surface_changes() {
    let mut s = store();
    s.load_photo(photo(800, 600));
    assert!(s.set_surface(SurfaceSize::square(540)));
    s.set_scale(1.0);
    assert!(approx_eq(s.transform().scale, 0.9));
}

#[test]
fn zero_sized_surface_is_rejected() {
    let mut s = store();
    s.load_photo(photo(800, 600));

    assert!(!s.set_surface(SurfaceSize::square(0)));
    assert!(!s.set_surface(SurfaceSize { width: 540, height: 0 }));
    assert_eq!(s.surface(), SurfaceSize::square(1080));

    s.set_scale(1.0);
    assert!(approx_eq(s.transform().scale, 1.8));
}

// =============================================================
// set_offset
// =============================================================

#[test]
fn set_offset_is_unclamped() {
    let mut s = store();
    s.load_photo(photo(800, 600));
    s.set_offset(-50_000.0, 99_999.5);
    assert_eq!(s.transform().offset_x, -50_000.0);
    assert_eq!(s.transform().offset_y, 99_999.5);
}

// =============================================================
// Transform serde
// =============================================================

#[test]
fn transform_serializes_as_placement_object() {
    let t = Transform { offset_x: 100.0, offset_y: 60.0, scale: 2.025 };
    let json = serde_json::to_value(t).unwrap();
    assert_eq!(json, serde_json::json!({ "offset_x": 100.0, "offset_y": 60.0, "scale": 2.025 }));

    let back: Transform = serde_json::from_value(json).unwrap();
    assert_eq!(back, t);
}
