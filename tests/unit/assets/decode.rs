use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let prepared = decode_image(&png_bytes(1, 1, [100, 50, 200, 128])).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_reports_natural_size() {
    let prepared = decode_image(&png_bytes(7, 3, [0, 0, 0, 255])).unwrap();
    assert_eq!(
        prepared.canvas(),
        Canvas {
            width: 7,
            height: 3
        }
    );
    assert_eq!(prepared.rgba8_premul.len(), 7 * 3 * 4);
}

#[test]
fn decode_rejects_garbage() {
    assert!(decode_image(b"not an image").is_err());
}

#[test]
fn unpremultiply_restores_straight_alpha() {
    let premul = [50u8, 25, 100, 128, 10, 20, 30, 255, 9, 9, 9, 0];
    let straight = unpremultiply_rgba8(&premul);
    assert_eq!(&straight[0..4], &[100, 50, 199, 128]);
    assert_eq!(&straight[4..8], &[10, 20, 30, 255]);
    assert_eq!(&straight[8..12], &[0, 0, 0, 0]);
}
