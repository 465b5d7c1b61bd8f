use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;

use chrono::Utc;
use image::{DynamicImage, RgbaImage};
use rand::Rng;
use rayon::prelude::*;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{TracemarkError, TracemarkResult};
use crate::manifest::model::{FontSpec, HANDLER, Location, Manifest, SourceRef};
use crate::media::sink::{FrameSink, SinkConfig};
use crate::media::source::{FrameSource, VideoInfo};
use crate::text::renderer::{GlyphMask, TextLayer, TextRenderer};
use crate::video::alphabet::Alphabet;
use crate::video::placement::{assign_ciphers, select_locations, select_positions};
use crate::video::problem::{Problem, report_problems};

/// Parameters of one encode run.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncodeParams {
    /// Number of payload frames, and characters per cipher.
    pub strength: usize,
    /// Glyph locations per payload frame.
    pub duplicates: usize,
    /// Independently watermarked outputs.
    pub copies: usize,
    /// Glyph size in pixels.
    pub font_size: u32,
    /// Glyph opacity.
    pub alpha: u8,
    /// Characters ciphers are drawn from.
    pub alphabet: Alphabet,
}

impl Default for EncodeParams {
    fn default() -> Self {
        Self {
            strength: 32,
            duplicates: 1,
            copies: 1,
            font_size: 12,
            alpha: 120,
            alphabet: Alphabet::Digits,
        }
    }
}

impl EncodeParams {
    /// Check the parameters against the source they will be applied to.
    pub fn validate(&self, info: &VideoInfo) -> TracemarkResult<()> {
        if self.strength == 0 {
            return Err(TracemarkError::validation("strength must be > 0"));
        }
        if self.strength as u64 > info.frame_count {
            return Err(TracemarkError::validation(format!(
                "strength {} exceeds frame count {}",
                self.strength, info.frame_count
            )));
        }
        if self.copies == 0 {
            return Err(TracemarkError::validation("copies must be > 0"));
        }
        if self.duplicates == 0 {
            return Err(TracemarkError::validation("duplicates must be > 0"));
        }
        if self.font_size == 0 {
            return Err(TracemarkError::validation("font_size must be > 0"));
        }
        if self.alphabet.chars().is_empty() {
            return Err(TracemarkError::validation("cipher alphabet must be non-empty"));
        }
        let min = self.font_size.saturating_mul(4);
        if info.width < min || info.height < min {
            return Err(TracemarkError::validation(format!(
                "frame {}x{} is too small for font size {} (needs at least {min}x{min})",
                info.width, info.height, self.font_size
            )));
        }
        Ok(())
    }
}

/// Result of [`encode`].
#[derive(Clone, Debug)]
pub struct EncodeOutcome {
    /// Manifest describing every copy.
    pub manifest: Manifest,
    /// Frames pushed to each sink.
    pub frames: u64,
    /// Non-fatal problems met while streaming.
    pub problems: Vec<Problem>,
}

/// Draw ciphers, positions, and locations for a source described by `info`.
pub fn plan_encode<R: Rng + ?Sized>(
    info: &VideoInfo,
    params: &EncodeParams,
    input: SourceRef,
    rng: &mut R,
) -> TracemarkResult<Manifest> {
    params.validate(info)?;
    let ciphers = assign_ciphers(
        &params.alphabet.chars(),
        params.strength,
        params.copies,
        rng,
    )?;
    let positions = select_positions(info.frame_count, params.strength, rng)?;
    let locations = select_locations(
        info.width,
        info.height,
        params.font_size,
        positions.len(),
        params.duplicates,
        rng,
    )?;
    Ok(Manifest {
        created_at: Utc::now(),
        handler: HANDLER.to_string(),
        input: vec![input],
        length: info.frame_count,
        resolution: info.resolution(),
        font: FontSpec {
            size: params.font_size,
        },
        alpha: params.alpha,
        ciphers,
        positions,
        locations,
    })
}

/// Plan a run, persist its manifest, then stream every frame into one sink per copy.
///
/// When `manifest_path` is given the manifest is written before the first frame is read, so an
/// interrupted run still leaves a usable manifest for its partial output.
#[tracing::instrument(skip(source, renderer, rng, sinks))]
pub fn encode<S, R>(
    source: &mut dyn FrameSource,
    params: &EncodeParams,
    input: SourceRef,
    manifest_path: Option<&Path>,
    renderer: &mut dyn TextRenderer,
    rng: &mut R,
    sinks: &mut [S],
) -> TracemarkResult<EncodeOutcome>
where
    S: FrameSink,
    R: Rng + ?Sized,
{
    if sinks.len() != params.copies {
        return Err(TracemarkError::validation(format!(
            "expected {} sinks (one per copy), got {}",
            params.copies,
            sinks.len()
        )));
    }
    let info = source.info();
    tracing::info!(
        frames = info.frame_count,
        width = info.width,
        height = info.height,
        copies = params.copies,
        strength = params.strength,
        duplicates = params.duplicates,
        "encoding"
    );
    let manifest = plan_encode(&info, params, input, rng)?;
    if let Some(path) = manifest_path {
        manifest.write_path(path)?;
        tracing::info!(path = %path.display(), "wrote manifest");
    }
    let (frames, problems) = embed(source, &manifest, renderer, sinks)?;
    Ok(EncodeOutcome {
        manifest,
        frames,
        problems,
    })
}

/// Stream `source` into `sinks`, drawing copy `c`'s cipher on the frames listed in `manifest`.
///
/// Returns the number of frames pushed to each sink and the problems met. Unreadable frames are
/// replaced by a zero-filled frame so positions stay aligned.
///
/// All glyphs of one frame are stamped onto a single [`TextLayer`] and composited once, so
/// overlapping duplicate locations do not stack their alpha.
pub fn embed<S: FrameSink>(
    source: &mut dyn FrameSource,
    manifest: &Manifest,
    renderer: &mut dyn TextRenderer,
    sinks: &mut [S],
) -> TracemarkResult<(u64, Vec<Problem>)> {
    manifest.validate()?;
    let info = source.info();
    if sinks.len() != manifest.ciphers.len() {
        return Err(TracemarkError::validation(format!(
            "manifest has {} ciphers but {} sinks were given",
            manifest.ciphers.len(),
            sinks.len()
        )));
    }
    if manifest.length != info.frame_count
        || (manifest.resolution.width, manifest.resolution.height) != (info.width, info.height)
    {
        return Err(TracemarkError::validation(format!(
            "manifest describes {} frames at {}, source has {} frames at {}",
            manifest.length,
            manifest.resolution,
            info.frame_count,
            info.resolution()
        )));
    }

    let ciphers: Vec<Vec<char>> = manifest.ciphers.iter().map(|c| c.chars().collect()).collect();
    let mut glyphs: HashMap<char, GlyphMask> = HashMap::new();
    for &ch in ciphers.iter().flatten() {
        if let Entry::Vacant(slot) = glyphs.entry(ch) {
            slot.insert(renderer.rasterize(ch.encode_utf8(&mut [0u8; 4]), manifest.font.size)?);
        }
    }

    let cfg = SinkConfig {
        width: info.width,
        height: info.height,
        fps: info.fps,
    };
    for sink in sinks.iter_mut() {
        sink.begin(cfg)?;
    }

    let mut problems = Vec::new();
    for f in 0..info.frame_count {
        let idx = FrameIndex(f);
        let frame = match source.read_frame(idx) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(frame = f, error = %e, "substituting blank frame");
                problems.push(Problem::UnreadableFrame {
                    shard: None,
                    frame: f,
                });
                info.blank_frame()
            }
        };
        let base = DynamicImage::ImageRgb8(frame).into_rgba8();

        match manifest.position_rank(f) {
            None => sinks
                .par_iter_mut()
                .try_for_each(|sink| sink.push_frame(idx, &base))?,
            Some(k) => {
                let marks = glyph_marks(&base, &manifest.locations[k], manifest.alpha);
                tracing::debug!(frame = f, rank = k, locations = marks.len(), "embedding");
                sinks
                    .par_iter_mut()
                    .zip(ciphers.par_iter())
                    .try_for_each(|(sink, cipher)| {
                        let mut out = base.clone();
                        if let Some(mask) = cipher.get(k).and_then(|ch| glyphs.get(ch)) {
                            let mut layer = TextLayer::new(info.width, info.height);
                            for &(origin, color) in &marks {
                                layer.stamp(mask, origin, color);
                            }
                            layer.composite_onto(&mut out);
                        }
                        sink.push_frame(idx, &out)
                    })?
            }
        }
    }

    for sink in sinks.iter_mut() {
        sink.end()?;
    }
    report_problems(&problems);
    tracing::info!(
        frames = info.frame_count,
        problems = problems.len(),
        "encode finished"
    );
    Ok((info.frame_count, problems))
}

/// Origin and complementary color of every glyph, sampled from the unmarked frame.
fn glyph_marks(base: &RgbaImage, locations: &[Location], alpha: u8) -> Vec<((i64, i64), [u8; 4])> {
    locations
        .iter()
        .filter_map(|&(x, y)| {
            let px = base.get_pixel_checked(x, y)?.0;
            Some((
                (i64::from(x), i64::from(y)),
                [255 - px[0], 255 - px[1], 255 - px[2], alpha],
            ))
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/video/encode.rs"]
mod tests;
