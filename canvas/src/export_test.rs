use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{Rgba, RgbaImage};

use super::*;
use crate::photo::{Frame, Photo};
use crate::render::Compositor;
use crate::store::TransformStore;
use crate::viewport::SurfaceSize;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn rendered(side: u32) -> Compositor {
    let frame = Frame::from_rgba(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]))).unwrap();
    let mut store = TransformStore::new(SurfaceSize::square(side));
    store.load_photo(Photo::from_rgba(RgbaImage::from_pixel(3, 2, Rgba([9, 99, 199, 255]))).unwrap());
    let mut c = Compositor::new(frame, SurfaceSize::square(side));
    c.redraw(&store);
    c
}

#[test]
fn encode_png_has_signature_and_full_resolution() {
    let c = rendered(64);
    let png = encode_png(c.surface()).unwrap();
    assert_eq!(&png[..8], &PNG_SIGNATURE);

    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (64, 64));
    assert_eq!(decoded.as_raw(), c.surface().as_bytes());
}

#[test]
fn encode_default_surface_is_1080_square() {
    let c = rendered(SurfaceSize::default().width);
    let png = encode_png(c.surface()).unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1080, 1080));
}

#[test]
fn data_url_prefix_and_payload() {
    let url = png_data_url(&[1, 2, 3, 4]);
    assert!(url.starts_with("data:image/png;base64,"));
    let payload = url.trim_start_matches("data:image/png;base64,");
    assert_eq!(BASE64.decode(payload).unwrap(), vec![1, 2, 3, 4]);
}

#[test]
fn data_url_of_empty_bytes_is_bare_prefix() {
    assert_eq!(png_data_url(&[]), "data:image/png;base64,");
}
