use super::*;
use image::{RgbImage, RgbaImage};

#[test]
fn block_renderer_fills_square_per_character() {
    let mask = BlockTextRenderer.rasterize("a b", 3).unwrap();
    assert_eq!((mask.width(), mask.height()), (9, 3));
    assert_eq!(mask.coverage_at(0, 0), 255);
    assert_eq!(mask.coverage_at(4, 1), 0);
    assert_eq!(mask.coverage_at(8, 2), 255);
    assert_eq!(mask.coverage_at(9, 0), 0);
    assert!(BlockTextRenderer.rasterize("x", 0).is_err());
}

#[test]
fn trimmed_keeps_origin_and_drops_empty_tail() {
    let mask = GlyphMask::new(3, 2, vec![0, 9, 0, 0, 0, 0]).unwrap().trimmed();
    assert_eq!((mask.width(), mask.height()), (2, 1));
    assert_eq!(mask.coverage_at(1, 0), 9);
    assert!(GlyphMask::new(2, 2, vec![0; 3]).is_err());
    assert!(GlyphMask::empty().is_blank());
}

#[test]
fn draw_text_blends_and_clips() {
    let mut canvas = RgbImage::from_pixel(4, 4, image::Rgb([0, 0, 0]));
    let mask = BlockTextRenderer.rasterize("x", 2).unwrap();
    draw_text(&mut canvas, &mask, (3, -1), [255, 255, 255, 255]);
    assert_eq!(canvas.get_pixel(3, 0).0, [255, 255, 255]);
    assert_eq!(canvas.get_pixel(2, 0).0, [0, 0, 0]);
    assert_eq!(canvas.get_pixel(3, 1).0, [0, 0, 0]);
}

#[test]
fn draw_text_on_opaque_rgba_keeps_alpha() {
    let mut canvas = RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 0, 255]));
    let mask = BlockTextRenderer.rasterize("x", 1).unwrap();
    draw_text(&mut canvas, &mask, (0, 0), [255, 0, 0, 128]);
    let px = canvas.get_pixel(0, 0).0;
    assert!((127..=129).contains(&px[0]));
    assert_eq!(px[3], 255);
    assert_eq!(canvas.get_pixel(1, 1).0, [0, 0, 0, 255]);
}

#[test]
fn draw_text_over_transparent_takes_source_color() {
    let mut canvas = RgbaImage::new(1, 1);
    let mask = BlockTextRenderer.rasterize("x", 1).unwrap();
    draw_text(&mut canvas, &mask, (0, 0), [10, 20, 30, 120]);
    assert_eq!(canvas.get_pixel(0, 0).0, [10, 20, 30, 120]);
}

#[test]
fn cached_renderer_memoizes_by_text_and_size() {
    let mut r = CachedRenderer::new(BlockTextRenderer);
    r.rasterize("a", 2).unwrap();
    r.rasterize("a", 2).unwrap();
    r.rasterize("a", 3).unwrap();
    assert_eq!(r.cached(), 2);
}

#[test]
fn text_layer_overlap_keeps_single_glyph_alpha() {
    let mask = BlockTextRenderer.rasterize("x", 3).unwrap();
    let color = [200, 100, 50, 120];
    let mut layer = TextLayer::new(6, 6);
    layer.stamp(&mask, (0, 0), color);
    layer.stamp(&mask, (1, 1), color);
    layer.stamp(&mask, (-2, 5), color);

    let mut once = RgbaImage::from_pixel(6, 6, image::Rgba([0, 0, 0, 255]));
    draw_text(&mut once, &mask, (0, 0), color);

    let mut canvas = RgbaImage::from_pixel(6, 6, image::Rgba([0, 0, 0, 255]));
    layer.composite_onto(&mut canvas);
    // (1,1) and (2,2) are covered by both stamps.
    assert_eq!(canvas.get_pixel(1, 1), once.get_pixel(1, 1));
    assert_eq!(canvas.get_pixel(2, 2), once.get_pixel(0, 0));
    assert_eq!(canvas.get_pixel(3, 3), once.get_pixel(0, 0));
    assert_eq!(canvas.get_pixel(5, 0).0, [0, 0, 0, 255]);
    assert_eq!(canvas.get_pixel(0, 5), once.get_pixel(0, 0));
}
