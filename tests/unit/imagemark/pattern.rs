use super::*;
use crate::text::renderer::BlockTextRenderer;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn pattern_is_white_canvas_with_glyphs() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let img = secret_pattern(64, 48, 4, &mut BlockTextRenderer, &mut rng).unwrap();
    assert_eq!(img.dimensions(), (64, 48));
    let non_white = img.pixels().filter(|p| p.0 != [255, 255, 255]).count();
    assert!(non_white > 0);
    assert!(non_white < 64 * 48);
}

#[test]
fn pattern_is_deterministic_for_a_seed() {
    let a = secret_pattern(
        32,
        32,
        8,
        &mut BlockTextRenderer,
        &mut ChaCha8Rng::seed_from_u64(1),
    )
    .unwrap();
    let b = secret_pattern(
        32,
        32,
        8,
        &mut BlockTextRenderer,
        &mut ChaCha8Rng::seed_from_u64(1),
    )
    .unwrap();
    assert_eq!(a, b);
}

#[test]
fn zero_glyphs_yield_blank_canvas() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let img = secret_pattern(8, 8, 0, &mut BlockTextRenderer, &mut rng).unwrap();
    assert!(img.pixels().all(|p| p.0 == [255, 255, 255]));
    assert!(secret_pattern(0, 8, 1, &mut BlockTextRenderer, &mut rng).is_err());
}

#[test]
fn marked_copies_differ_and_recover_their_own_pattern() {
    let cover = RgbImage::from_pixel(40, 40, Rgb([0x80, 0x40, 0x20]));
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let copies = mark_copies(&cover, 3, 4, &mut BlockTextRenderer, &mut rng).unwrap();
    assert_eq!(copies.len(), 3);
    assert_ne!(copies[0].marked, copies[1].marked);
    for copy in &copies {
        for (x, y, px) in copy.secret.enumerate_pixels() {
            let m = copy.marked.get_pixel(x, y).0;
            if bitplane::is_blank(px) {
                assert_eq!(m, cover.get_pixel(x, y).0);
            } else {
                assert_eq!(m[0] & 0x0F, px.0[0] >> 4);
            }
        }
    }
}
