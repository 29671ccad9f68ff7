use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use super::*;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_png_keeps_natural_dimensions() {
    let photo = Photo::decode(&png_bytes(8, 6)).unwrap();
    assert_eq!(photo.width(), 8);
    assert_eq!(photo.height(), 6);
    assert_eq!(photo.pixels().get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
}

#[test]
fn decode_garbage_is_decode_error() {
    let err = Photo::decode(b"definitely not an image").unwrap_err();
    assert!(matches!(err, CanvasError::Decode(_)));
}

#[test]
fn decode_truncated_png_is_error() {
    let bytes = png_bytes(4, 4);
    assert!(Photo::decode(&bytes[..bytes.len() / 2]).is_err());
}

#[test]
fn decode_empty_input_is_error() {
    assert!(Photo::decode(&[]).is_err());
}

#[test]
fn zero_sized_bitmap_is_rejected() {
    let err = Photo::from_rgba(RgbaImage::new(0, 5)).unwrap_err();
    assert!(matches!(err, CanvasError::EmptyImage { width: 0, height: 5 }));

    let err = Frame::from_rgba(RgbaImage::new(5, 0)).unwrap_err();
    assert!(matches!(err, CanvasError::EmptyImage { width: 5, height: 0 }));
}

#[test]
fn frame_decode_png() {
    let frame = Frame::decode(&png_bytes(3, 3)).unwrap();
    assert_eq!(frame.pixels().dimensions(), (3, 3));
}
