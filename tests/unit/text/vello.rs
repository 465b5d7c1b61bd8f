use super::*;

#[test]
fn garbage_font_bytes_are_rejected() {
    let err = VelloTextRenderer::from_bytes(b"definitely not a font".to_vec())
        .err()
        .unwrap();
    assert!(matches!(err, TracemarkError::Format(_)));
}

#[test]
fn missing_font_file_is_format_error() {
    let err = VelloTextRenderer::from_path("no/such/font.ttf").err().unwrap();
    assert!(matches!(err, TracemarkError::Format(_)));
}

fn fixture_renderer() -> VelloTextRenderer {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/fonts/DejaVuSansMono.ttf");
    VelloTextRenderer::from_path(path).unwrap()
}

fn covered_pixels(mask: &GlyphMask) -> usize {
    (0..mask.height())
        .flat_map(|y| (0..mask.width()).map(move |x| (x, y)))
        .filter(|&(x, y)| mask.coverage_at(x, y) > 0)
        .count()
}

#[test]
fn digit_rasterizes_to_a_bounded_mask() {
    let mut r = fixture_renderer();
    let mask = r.rasterize("7", 12).unwrap();
    assert!(!mask.is_blank());
    assert!(mask.width() > 0 && mask.width() <= 24);
    assert!(mask.height() > 0 && mask.height() <= 24);
    assert!(covered_pixels(&mask) < (mask.width() * mask.height()) as usize);

    let larger = r.rasterize("7", 24).unwrap();
    assert!(larger.height() > mask.height());
}

#[test]
fn descender_makes_a_taller_mask() {
    let mut r = fixture_renderer();
    let a = r.rasterize("a", 16).unwrap();
    let g = r.rasterize("g", 16).unwrap();
    assert!(!a.is_blank() && !g.is_blank());
    assert!(g.height() > a.height());
}

#[test]
fn kana_outside_the_font_still_yields_a_bounded_mask() {
    // The fixture has no kana; shaping falls back to the font's .notdef box.
    let mut r = fixture_renderer();
    let mask = r.rasterize("\u{30a2}", 12).unwrap();
    assert!(!mask.is_blank());
    assert!(mask.width() <= 24 && mask.height() <= 24);
}

#[test]
fn zero_size_is_rejected() {
    let mut r = fixture_renderer();
    assert!(matches!(
        r.rasterize("7", 0),
        Err(TracemarkError::Validation(_))
    ));
}
