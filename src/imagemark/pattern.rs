use image::{Rgb, RgbImage};
use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::foundation::error::{TracemarkError, TracemarkResult};
use crate::imagemark::bitplane;
use crate::text::renderer::{TextRenderer, draw_text};

/// Glyphs drawn into a secret pattern by default.
pub const DEFAULT_PATTERN_CHARS: usize = 16;

/// Synthesize a random glyph pattern of `width x height` on a white canvas.
///
/// Each of the `char_count` glyphs is a random alphanumeric character at a uniformly random
/// position with a uniformly random color, drawn at `width / (2 * char_count)` pixels. Later
/// glyphs paint over earlier ones.
pub fn secret_pattern<R: Rng + ?Sized>(
    width: u32,
    height: u32,
    char_count: usize,
    renderer: &mut dyn TextRenderer,
    rng: &mut R,
) -> TracemarkResult<RgbImage> {
    if width == 0 || height == 0 {
        return Err(TracemarkError::validation(
            "secret pattern dimensions must be non-zero",
        ));
    }
    let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    if char_count == 0 {
        return Ok(canvas);
    }

    let size_px = (width as usize / (2 * char_count)).max(1) as u32;
    for _ in 0..char_count {
        let x = rng.gen_range(0..width);
        let y = rng.gen_range(0..height);
        let ch = rng.sample(Alphanumeric) as char;
        let color = [
            rng.gen_range(0..255u8),
            rng.gen_range(0..255u8),
            rng.gen_range(0..255u8),
            255,
        ];
        let mask = renderer.rasterize(ch.encode_utf8(&mut [0u8; 4]), size_px)?;
        draw_text(&mut canvas, &mask, (i64::from(x), i64::from(y)), color);
    }
    Ok(canvas)
}

/// One watermarked copy of a cover image.
#[derive(Clone, Debug)]
pub struct MarkedCopy {
    /// The hidden pattern, kept for later comparison.
    pub secret: RgbImage,
    /// The cover with `secret` merged into its low bit plane.
    pub marked: RgbImage,
}

/// Produce `copies` independently watermarked versions of `cover`.
#[tracing::instrument(skip(cover, renderer, rng))]
pub fn mark_copies<R: Rng + ?Sized>(
    cover: &RgbImage,
    copies: usize,
    char_count: usize,
    renderer: &mut dyn TextRenderer,
    rng: &mut R,
) -> TracemarkResult<Vec<MarkedCopy>> {
    let (w, h) = cover.dimensions();
    let mut out = Vec::with_capacity(copies);
    for _ in 0..copies {
        let secret = secret_pattern(w, h, char_count, renderer, rng)?;
        let marked = bitplane::merge(cover, &secret)?;
        out.push(MarkedCopy { secret, marked });
    }
    tracing::info!(copies, width = w, height = h, "marked image copies");
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/imagemark/pattern.rs"]
mod tests;
