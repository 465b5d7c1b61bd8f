use chrono::Utc;
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{TracemarkError, TracemarkResult};
use crate::manifest::model::{HANDLER, Manifest, SourceRef};
use crate::media::sink::{FrameSink, SinkConfig};
use crate::media::source::FrameSource;
use crate::video::problem::{Problem, report_problems};

/// One independently encoded shard.
#[derive(Debug)]
pub struct Shard<S> {
    /// Frames of the shard, usually one encoded copy.
    pub source: S,
    /// Manifest produced when the shard was encoded.
    pub manifest: Manifest,
    /// Which of the manifest's ciphers `source` carries.
    pub copy: usize,
    /// Where the shard came from; recorded in the merged manifest.
    pub origin: SourceRef,
}

/// Result of [`assemble`].
#[derive(Clone, Debug)]
pub struct AssembleOutcome {
    /// Merged manifest describing the assembled video.
    pub manifest: Manifest,
    /// Frames written to the sink.
    pub frames: u64,
    /// Non-fatal problems met while merging and streaming.
    pub problems: Vec<Problem>,
}

/// Merge shard manifests into one, in shard order.
///
/// The first shard's resolution and font size are canonical; disagreeing shards are reported,
/// not rejected. Positions are offset by the total length of the shards before them. A copy
/// index that names no cipher is a [`TracemarkError::Validation`].
pub fn merge_manifests<S>(shards: &[Shard<S>]) -> TracemarkResult<(Manifest, Vec<Problem>)> {
    let first = shards
        .first()
        .ok_or_else(|| TracemarkError::validation("no shards to assemble"))?;
    for (k, shard) in shards.iter().enumerate() {
        shard
            .manifest
            .validate()
            .map_err(|e| TracemarkError::validation(format!("shard {k}: {e}")))?;
        shard
            .manifest
            .cipher(shard.copy)
            .map_err(|e| TracemarkError::validation(format!("shard {k}: {e}")))?;
    }

    let resolution = first.manifest.resolution;
    let font = first.manifest.font;
    let mut problems = Vec::new();
    let mut cipher = String::new();
    let mut merged = Manifest {
        created_at: Utc::now(),
        handler: HANDLER.to_string(),
        input: Vec::with_capacity(shards.len()),
        length: 0,
        resolution,
        font,
        alpha: first.manifest.alpha,
        ciphers: Vec::new(),
        positions: Vec::new(),
        locations: Vec::new(),
    };

    for (k, shard) in shards.iter().enumerate() {
        let m = &shard.manifest;
        if m.resolution != resolution {
            problems.push(Problem::ResolutionMismatch {
                shard: k,
                found: m.resolution,
                expected: resolution,
            });
        }
        if m.font.size != font.size {
            problems.push(Problem::FontSizeMismatch {
                shard: k,
                found: m.font.size,
                expected: font.size,
            });
        }
        merged.input.push(SourceRef {
            copy: Some(shard.copy),
            ..shard.origin.clone()
        });
        cipher.push_str(m.cipher(shard.copy)?);
        let offset = merged.length;
        merged.positions.extend(m.positions.iter().map(|p| p + offset));
        merged.locations.extend(m.locations.iter().cloned());
        merged.length += m.length;
    }
    merged.ciphers.push(cipher);
    Ok((merged, problems))
}

/// Concatenate shard frames into `sink` and merge their manifests.
///
/// Manifests are merged before any frame is written, so a bad copy index fails the call up front.
/// Unreadable frames are replaced by blank frames and frames whose size differs from the first
/// shard's are resized; both are reported.
#[tracing::instrument(skip(shards, sink), fields(shards = shards.len()))]
pub fn assemble<S, K>(shards: &mut [Shard<S>], sink: &mut K) -> TracemarkResult<AssembleOutcome>
where
    S: FrameSource,
    K: FrameSink + ?Sized,
{
    let (manifest, mut problems) = merge_manifests(shards)?;
    let canon = shards[0].source.info();
    let expected = (canon.width, canon.height);
    sink.begin(SinkConfig {
        width: canon.width,
        height: canon.height,
        fps: canon.fps,
    })?;

    let mut written = 0u64;
    for (k, shard) in shards.iter_mut().enumerate() {
        let info = shard.source.info();
        tracing::debug!(shard = k, frames = info.frame_count, copy = shard.copy, "appending shard");
        let mut size_reported = false;
        for f in 0..info.frame_count {
            let frame = match shard.source.read_frame(FrameIndex(f)) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::debug!(shard = k, frame = f, error = %e, "substituting blank frame");
                    problems.push(Problem::UnreadableFrame {
                        shard: Some(k),
                        frame: f,
                    });
                    RgbImage::new(expected.0, expected.1)
                }
            };
            let mut rgba = DynamicImage::ImageRgb8(frame).into_rgba8();
            if rgba.dimensions() != expected {
                if !size_reported {
                    problems.push(Problem::FrameSizeMismatch {
                        shard: k,
                        frame: f,
                        found: rgba.dimensions(),
                        expected,
                    });
                    size_reported = true;
                }
                rgba = image::imageops::resize(&rgba, expected.0, expected.1, FilterType::Triangle);
            }
            sink.push_frame(FrameIndex(written), &rgba)?;
            written += 1;
        }
    }
    sink.end()?;

    report_problems(&problems);
    tracing::info!(
        frames = written,
        length = manifest.length,
        problems = problems.len(),
        "assemble finished"
    );
    Ok(AssembleOutcome {
        manifest,
        frames: written,
        problems,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/video/assemble.rs"]
mod tests;
