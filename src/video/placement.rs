use rand::Rng;
use rand::seq::SliceRandom;

use crate::foundation::error::{TracemarkError, TracemarkResult};
use crate::manifest::model::Location;

/// Per-copy cipher strings of `strength` characters each.
///
/// The alphabet is repeated until it holds at least `strength` characters; every copy then takes
/// the first `strength` characters of its own shuffle of that pool.
pub fn assign_ciphers<R: Rng + ?Sized>(
    alphabet: &[char],
    strength: usize,
    copies: usize,
    rng: &mut R,
) -> TracemarkResult<Vec<String>> {
    if alphabet.is_empty() {
        return Err(TracemarkError::validation("cipher alphabet must be non-empty"));
    }
    let mut pool = alphabet.to_vec();
    while pool.len() < strength {
        pool.extend_from_slice(alphabet);
    }
    Ok((0..copies)
        .map(|_| {
            let mut c = pool.clone();
            c.shuffle(rng);
            let cipher: String = c.into_iter().take(strength).collect();
            cipher
        })
        .collect())
}

/// `strength` distinct frame indices out of `[0, frame_count)`, ascending.
pub fn select_positions<R: Rng + ?Sized>(
    frame_count: u64,
    strength: usize,
    rng: &mut R,
) -> TracemarkResult<Vec<u64>> {
    if strength as u64 > frame_count {
        return Err(TracemarkError::validation(format!(
            "strength {strength} exceeds frame count {frame_count}"
        )));
    }
    let len = usize::try_from(frame_count)
        .map_err(|_| TracemarkError::validation("frame count does not fit in memory"))?;
    let mut positions: Vec<u64> = rand::seq::index::sample(rng, len, strength)
        .into_iter()
        .map(|i| i as u64)
        .collect();
    positions.sort_unstable();
    Ok(positions)
}

/// `duplicates` glyph locations for each of `count` positions.
///
/// Coordinates are uniform over `[2 * font_size, dim - 2 * font_size]` (inclusive) on both axes
/// so the decode window around every glyph stays inside the frame.
pub fn select_locations<R: Rng + ?Sized>(
    width: u32,
    height: u32,
    font_size: u32,
    count: usize,
    duplicates: usize,
    rng: &mut R,
) -> TracemarkResult<Vec<Vec<Location>>> {
    let margin = font_size.saturating_mul(2);
    if width < margin.saturating_mul(2) || height < margin.saturating_mul(2) {
        return Err(TracemarkError::validation(format!(
            "frame {width}x{height} is too small for font size {font_size} \
             (needs at least {}x{})",
            margin * 2,
            margin * 2
        )));
    }
    if duplicates == 0 {
        return Err(TracemarkError::validation("duplicates must be > 0"));
    }
    Ok((0..count)
        .map(|_| {
            (0..duplicates)
                .map(|_| {
                    (
                        rng.gen_range(margin..=width - margin),
                        rng.gen_range(margin..=height - margin),
                    )
                })
                .collect()
        })
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/video/placement.rs"]
mod tests;
