use std::io::Cursor;

use super::*;

fn encode_png(img: image::DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let src_rgba = vec![100u8, 50u8, 200u8, 128u8];
    let img = image::RgbaImage::from_raw(1, 1, src_rgba).unwrap();
    let buf = encode_png(image::DynamicImage::ImageRgba8(img));

    let decoded = decode_image(&buf).unwrap();
    assert!(decoded.source_has_alpha);
    assert_eq!(decoded.frame.width(), 1);
    assert_eq!(decoded.frame.height(), 1);
    assert_eq!(
        decoded.frame.data(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_image_rgb_source_reports_no_alpha() {
    let img = image::RgbImage::from_pixel(2, 3, image::Rgb([10, 20, 30]));
    let buf = encode_png(image::DynamicImage::ImageRgb8(img));

    let decoded = decode_image(&buf).unwrap();
    assert!(!decoded.source_has_alpha);
    assert_eq!(decoded.frame.width(), 2);
    assert_eq!(decoded.frame.height(), 3);
    assert!(!decoded.frame.has_transparency());
    assert_eq!(decoded.frame.pixel(0, 0).unwrap().a, 255);
}

#[test]
fn decode_image_fully_transparent_pixel_zeroes_color() {
    let src_rgba = vec![200u8, 200u8, 200u8, 0u8];
    let img = image::RgbaImage::from_raw(1, 1, src_rgba).unwrap();
    let buf = encode_png(image::DynamicImage::ImageRgba8(img));

    let decoded = decode_image(&buf).unwrap();
    assert_eq!(decoded.frame.data(), &[0, 0, 0, 0]);
}

#[test]
fn decode_image_garbage_bytes_is_err() {
    assert!(decode_image(b"not an image").is_err());
}
