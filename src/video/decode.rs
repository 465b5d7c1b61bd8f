use image::{DynamicImage, Rgb, RgbImage, RgbaImage};

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{TracemarkError, TracemarkResult};
use crate::foundation::math::luma_u8;
use crate::manifest::model::{Location, Manifest};
use crate::media::source::FrameSource;
use crate::video::problem::{Problem, report_problems};

/// Contrast factor applied to inverted crops.
const CONTRAST: f32 = 2.0;

/// Decode options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DecodeOpts {
    /// Index of the source's first frame within the video the manifest describes. Set this when
    /// decoding a single shard against an assembled manifest.
    pub frame_start: u64,
    /// Convert the composite to greyscale.
    pub greyscale: bool,
}

/// Result of [`decode`].
#[derive(Clone, Debug)]
pub struct DecodeOutcome {
    /// Grid of enhanced crops: column `k` is position `k`, row `j` its `j`-th location.
    pub composite: DynamicImage,
    /// Payload frames that were decoded.
    pub frames: u64,
    /// Non-fatal problems met while streaming.
    pub problems: Vec<Problem>,
}

/// Size of one composite cell for frames of `current` size.
///
/// The window is twice the font size in the manifest's coordinate space, scaled per axis.
pub fn cell_size(manifest: &Manifest, current: (u32, u32)) -> (u32, u32) {
    let span = u64::from(manifest.font.size) * 2;
    let scale = |cur: u32, orig: u32| -> u32 {
        if orig == 0 {
            0
        } else {
            (span * u64::from(cur) / u64::from(orig)) as u32
        }
    };
    (
        scale(current.0, manifest.resolution.width),
        scale(current.1, manifest.resolution.height),
    )
}

/// Recover a legible image of every embedded character.
///
/// Frames may have been rescaled since encoding; locations are mapped by the ratio of the current
/// frame size to the manifest resolution. Unreadable frames leave their cells transparent.
#[tracing::instrument(skip(source, manifest))]
pub fn decode(
    source: &mut dyn FrameSource,
    manifest: &Manifest,
    opts: &DecodeOpts,
) -> TracemarkResult<DecodeOutcome> {
    manifest.validate()?;
    let info = source.info();
    let (cell_w, cell_h) = cell_size(manifest, (info.width, info.height));
    if cell_w == 0 || cell_h == 0 {
        return Err(TracemarkError::validation(format!(
            "frames of {}x{} are too small to decode font size {} at {}",
            info.width, info.height, manifest.font.size, manifest.resolution
        )));
    }
    let cols = manifest.positions.len() as u32;
    let rows = manifest.max_duplicates() as u32;
    tracing::info!(
        frames = info.frame_count,
        original = %manifest.resolution,
        current = %info.resolution(),
        frame_start = opts.frame_start,
        "decoding"
    );

    let mut composite = RgbaImage::new(cols * cell_w, rows * cell_h);
    let scale = (
        f64::from(info.width) / f64::from(manifest.resolution.width),
        f64::from(info.height) / f64::from(manifest.resolution.height),
    );
    let mut problems = Vec::new();
    let mut decoded = 0u64;
    for i in 0..info.frame_count {
        let Some(k) = manifest.position_rank(opts.frame_start + i) else {
            continue;
        };
        let frame = match source.read_frame(FrameIndex(i)) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(frame = i, error = %e, "skipping unreadable frame");
                problems.push(Problem::UnreadableFrame {
                    shard: None,
                    frame: i,
                });
                continue;
            }
        };
        for (j, &loc) in manifest.locations[k].iter().enumerate() {
            let crop = enhance(&crop_window(
                &frame,
                loc,
                manifest.font.size,
                scale,
                (cell_w, cell_h),
            ));
            image::imageops::replace(
                &mut composite,
                &DynamicImage::ImageRgb8(crop).into_rgba8(),
                i64::from(k as u32 * cell_w),
                i64::from(j as u32 * cell_h),
            );
        }
        decoded += 1;
    }

    report_problems(&problems);
    tracing::info!(decoded, problems = problems.len(), "decode finished");
    let composite = if opts.greyscale {
        DynamicImage::ImageLumaA8(DynamicImage::ImageRgba8(composite).into_luma_alpha8())
    } else {
        DynamicImage::ImageRgba8(composite)
    };
    Ok(DecodeOutcome {
        composite,
        frames: decoded,
        problems,
    })
}

/// Window of `size` starting half a font size above and left of the scaled location. Pixels
/// outside the frame are black.
fn crop_window(
    frame: &RgbImage,
    loc: Location,
    font_size: u32,
    scale: (f64, f64),
    size: (u32, u32),
) -> RgbImage {
    let half = f64::from(font_size / 2);
    let x0 = (f64::from(loc.0) * scale.0 - half * scale.0).round() as i64;
    let y0 = (f64::from(loc.1) * scale.1 - half * scale.1).round() as i64;
    let (fw, fh) = frame.dimensions();
    RgbImage::from_fn(size.0, size.1, |x, y| {
        let sx = x0 + i64::from(x);
        let sy = y0 + i64::from(y);
        if sx < 0 || sy < 0 || sx >= i64::from(fw) || sy >= i64::from(fh) {
            Rgb([0, 0, 0])
        } else {
            *frame.get_pixel(sx as u32, sy as u32)
        }
    })
}

/// Invert, then stretch every channel away from the mean luma by [`CONTRAST`].
fn enhance(crop: &RgbImage) -> RgbImage {
    let mut out = crop.clone();
    image::imageops::invert(&mut out);
    let n = u64::from(out.width()) * u64::from(out.height());
    if n == 0 {
        return out;
    }
    let sum: u64 = out
        .pixels()
        .map(|p| u64::from(luma_u8(p.0[0], p.0[1], p.0[2])))
        .sum();
    let mean = (sum as f32 / n as f32).round();
    for px in out.pixels_mut() {
        for c in px.0.iter_mut() {
            *c = (mean + CONTRAST * (f32::from(*c) - mean)).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/video/decode.rs"]
mod tests;
