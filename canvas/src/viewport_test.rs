#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

// --- Point ---

#[test]
fn point_new() {
    let p = Point::new(3.0, 4.0);
    assert_eq!(p.x, 3.0);
    assert_eq!(p.y, 4.0);
}

// --- SurfaceSize ---

#[test]
fn surface_default_is_fixed_square() {
    let s = SurfaceSize::default();
    assert_eq!(s.width, SURFACE_SIDE_PX);
    assert_eq!(s.height, SURFACE_SIDE_PX);
}

#[test]
fn surface_center_is_half_extent() {
    let s = SurfaceSize { width: 1080, height: 600 };
    assert_eq!(s.center(), Point::new(540.0, 300.0));
}

// --- DisplayRect ---

#[test]
fn default_rect_is_identity_mapping() {
    let rect = DisplayRect::default();
    let p = rect.to_surface(Point::new(12.5, 700.0), SurfaceSize::default()).unwrap();
    assert!(point_approx_eq(p, Point::new(12.5, 700.0)));
}

#[test]
fn half_size_display_doubles_coordinates() {
    let rect = DisplayRect::new(0.0, 0.0, 540.0, 540.0);
    let p = rect.to_surface(Point::new(100.0, 130.0), SurfaceSize::default()).unwrap();
    assert!(point_approx_eq(p, Point::new(200.0, 260.0)));
}

#[test]
fn origin_offset_is_subtracted_before_scaling() {
    let rect = DisplayRect::new(20.0, 40.0, 540.0, 540.0);
    let p = rect.to_surface(Point::new(20.0, 40.0), SurfaceSize::default()).unwrap();
    assert!(point_approx_eq(p, Point::new(0.0, 0.0)));

    let q = rect.to_surface(Point::new(30.0, 45.0), SurfaceSize::default()).unwrap();
    assert!(point_approx_eq(q, Point::new(20.0, 10.0)));
}

#[test]
fn non_integer_ratio_is_inverted() {
    // 1080 / 500 = 2.16
    let rect = DisplayRect::new(0.0, 0.0, 500.0, 500.0);
    let p = rect.to_surface(Point::new(250.0, 125.0), SurfaceSize::default()).unwrap();
    assert!(point_approx_eq(p, Point::new(540.0, 270.0)));
}

#[test]
fn axes_are_scaled_independently() {
    let rect = DisplayRect::new(0.0, 0.0, 540.0, 270.0);
    let p = rect.to_surface(Point::new(10.0, 10.0), SurfaceSize::default()).unwrap();
    assert!(point_approx_eq(p, Point::new(20.0, 40.0)));
}

#[test]
fn zero_width_rect_maps_nothing() {
    let rect = DisplayRect::new(0.0, 0.0, 0.0, 540.0);
    assert!(!rect.is_usable());
    assert!(rect.to_surface(Point::new(1.0, 1.0), SurfaceSize::default()).is_none());
}

#[test]
fn non_finite_rect_maps_nothing() {
    let rect = DisplayRect::new(0.0, 0.0, f64::NAN, 540.0);
    assert!(rect.to_surface(Point::new(1.0, 1.0), SurfaceSize::default()).is_none());

    let rect = DisplayRect::new(0.0, 0.0, 540.0, f64::INFINITY);
    assert!(rect.to_surface(Point::new(1.0, 1.0), SurfaceSize::default()).is_none());
}
