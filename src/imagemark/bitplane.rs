//! Bit-plane codec.
//!
//! `merge` keeps the cover's high nibble and stores the secret's high nibble in the low nibble;
//! `extract` shifts the low nibble back up, so a recovered secret is quantized to 4 bits per
//! channel.
//!
//! Secret pixels that are pure black or pure white are treated as "no payload" and leave the
//! cover untouched. Such pixels cannot be carried at all: a secret that needs them is altered
//! there by construction.

use image::{Rgb, RgbImage};
use rayon::prelude::*;

use crate::foundation::error::{TracemarkError, TracemarkResult};

const HIGH_NIBBLE: u8 = 0xF0;
const LOW_NIBBLE: u8 = 0x0F;

/// `true` for pure black or pure white, which carry no payload.
pub fn is_blank(px: &Rgb<u8>) -> bool {
    px.0 == [0, 0, 0] || px.0 == [255, 255, 255]
}

pub(crate) fn merge_channel(cover: u8, secret: u8) -> u8 {
    (cover & HIGH_NIBBLE) | (secret >> 4)
}

pub(crate) fn extract_channel(marked: u8) -> u8 {
    (marked & LOW_NIBBLE) << 4
}

/// Hide `secret` in the low bit plane of `cover`.
///
/// Each channel becomes `high_nibble(cover) | high_nibble(secret) >> 4`. Storing the secret's
/// most significant bits is what lets [`extract`] return the secret quantized to 4 bits; storing
/// its low nibble would make the recovered image unrelated to the secret's visible content.
///
/// The output has the cover's dimensions. Fails with [`TracemarkError::Size`] before touching
/// any pixel when the secret is wider or taller than the cover.
pub fn merge(cover: &RgbImage, secret: &RgbImage) -> TracemarkResult<RgbImage> {
    let (cw, ch) = cover.dimensions();
    let (sw, sh) = secret.dimensions();
    if sw > cw || sh > ch {
        return Err(TracemarkError::Size {
            secret: (sw, sh),
            cover: (cw, ch),
        });
    }

    let mut out = cover.clone();
    let row_bytes = cw as usize * 3;
    if row_bytes == 0 {
        return Ok(out);
    }
    let buf: &mut [u8] = &mut out;
    buf.par_chunks_mut(row_bytes)
        .enumerate()
        .filter(|(y, _)| (*y as u32) < sh)
        .for_each(|(y, row)| {
            for (x, px) in row.chunks_exact_mut(3).enumerate().take(sw as usize) {
                let s = secret.get_pixel(x as u32, y as u32);
                if is_blank(s) {
                    continue;
                }
                for (c, v) in px.iter_mut().enumerate() {
                    *v = merge_channel(*v, s.0[c]);
                }
            }
        });
    Ok(out)
}

/// Recover the hidden secret from a marked image.
///
/// The result is cropped to the origin-anchored rectangle that contains every pixel whose
/// reconstruction is not pure black, so a secret whose last row or column is sparse is still
/// recovered whole. When every pixel reconstructs to black the full-size image is returned.
pub fn extract(marked: &RgbImage) -> RgbImage {
    let (w, h) = marked.dimensions();
    let mut out = RgbImage::new(w, h);
    {
        let buf: &mut [u8] = &mut out;
        buf.par_iter_mut()
            .zip(marked.as_raw().par_iter())
            .for_each(|(d, s)| *d = extract_channel(*s));
    }

    let mut extent: Option<(u32, u32)> = None;
    for (x, y, px) in out.enumerate_pixels() {
        if px.0 != [0, 0, 0] {
            let (ex, ey) = extent.unwrap_or((0, 0));
            extent = Some((ex.max(x + 1), ey.max(y + 1)));
        }
    }
    match extent {
        Some((ew, eh)) if (ew, eh) != (w, h) => {
            image::imageops::crop_imm(&out, 0, 0, ew, eh).to_image()
        }
        _ => out,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/imagemark/bitplane.rs"]
mod tests;
