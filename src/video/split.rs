use image::DynamicImage;

use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{TracemarkError, TracemarkResult};
use crate::media::sink::{FrameSink, SinkConfig};
use crate::media::source::FrameSource;
use crate::video::problem::{Problem, report_problems};

/// Contiguous ranges of at most `shard_size` frames covering `[0, frame_count)`.
pub fn shard_ranges(frame_count: u64, shard_size: u64) -> TracemarkResult<Vec<FrameRange>> {
    if shard_size == 0 {
        return Err(TracemarkError::validation("shard size must be > 0"));
    }
    let mut out = Vec::with_capacity(frame_count.div_ceil(shard_size) as usize);
    let mut start = 0;
    while start < frame_count {
        let end = (start + shard_size).min(frame_count);
        out.push(FrameRange::new(FrameIndex(start), FrameIndex(end))?);
        start = end;
    }
    Ok(out)
}

/// What one shard received.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShardReport {
    /// Source frames assigned to the shard.
    pub range: FrameRange,
    /// Frames actually written (unreadable frames are omitted).
    pub frames: u64,
}

/// Result of [`split`].
#[derive(Clone, Debug, Default)]
pub struct SplitOutcome {
    /// One report per shard, in order.
    pub shards: Vec<ShardReport>,
    /// Non-fatal problems met while streaming.
    pub problems: Vec<Problem>,
}

/// Partition `source` into shards of `shard_size` frames.
///
/// `open_sink` is called once per shard with its index and source range. Frames are renumbered
/// from zero within each shard. An unreadable frame is reported and left out, so its shard comes
/// out one frame shorter.
#[tracing::instrument(skip(source, open_sink))]
pub fn split<S, F>(
    source: &mut dyn FrameSource,
    shard_size: u64,
    mut open_sink: F,
) -> TracemarkResult<SplitOutcome>
where
    S: FrameSink,
    F: FnMut(usize, FrameRange) -> TracemarkResult<S>,
{
    let info = source.info();
    let ranges = shard_ranges(info.frame_count, shard_size)?;
    tracing::info!(
        frames = info.frame_count,
        shard_size,
        shards = ranges.len(),
        "splitting"
    );
    let cfg = SinkConfig {
        width: info.width,
        height: info.height,
        fps: info.fps,
    };

    let mut outcome = SplitOutcome::default();
    for (k, range) in ranges.into_iter().enumerate() {
        tracing::debug!(shard = k, start = range.start.0, frames = range.len_frames(), "opening shard");
        let mut sink = open_sink(k, range)?;
        sink.begin(cfg)?;
        let mut written = 0u64;
        for idx in range.iter() {
            match source.read_frame(idx) {
                Ok(frame) => {
                    sink.push_frame(FrameIndex(written), &DynamicImage::ImageRgb8(frame).into_rgba8())?;
                    written += 1;
                }
                Err(e) => {
                    tracing::debug!(frame = idx.0, error = %e, "dropping unreadable frame");
                    outcome.problems.push(Problem::UnreadableFrame {
                        shard: Some(k),
                        frame: idx.0,
                    });
                }
            }
        }
        sink.end()?;
        tracing::debug!(shard = k, frames = written, "closed shard");
        outcome.shards.push(ShardReport {
            range,
            frames: written,
        });
    }

    report_problems(&outcome.problems);
    tracing::info!(
        shards = outcome.shards.len(),
        problems = outcome.problems.len(),
        "split finished"
    );
    Ok(outcome)
}

#[cfg(test)]
#[path = "../../tests/unit/video/split.rs"]
mod tests;
