use std::io::Cursor;

use super::*;

#[test]
fn decode_image_png_drops_alpha() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100u8, 50, 200, 128]).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let rgb = decode_image(&buf).unwrap();
    assert_eq!(rgb.dimensions(), (1, 1));
    assert_eq!(rgb.get_pixel(0, 0).0, [100, 50, 200]);
}

#[test]
fn decode_garbage_is_format_error() {
    assert!(matches!(
        decode_image(b"not an image"),
        Err(TracemarkError::Format(_))
    ));
}

#[test]
fn mp4_extension_is_required() {
    assert!(ensure_mp4(Path::new("clip.mp4")).is_ok());
    assert!(ensure_mp4(Path::new("CLIP.MP4")).is_ok());
    assert!(matches!(
        ensure_mp4(Path::new("clip.avi")),
        Err(TracemarkError::Format(_))
    ));
    assert!(ensure_mp4(Path::new("clip")).is_err());
}
