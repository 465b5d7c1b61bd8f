use image::RgbImage;

use crate::foundation::core::{FrameIndex, Fps, Resolution};
use crate::foundation::error::{TracemarkError, TracemarkResult};

/// Basic metadata about a frame sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VideoInfo {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Number of frames in the sequence.
    pub frame_count: u64,
    /// Frames-per-second of the sequence.
    pub fps: Fps,
}

impl VideoInfo {
    /// Manifest resolution of the (RGB) source frames.
    pub fn resolution(&self) -> Resolution {
        Resolution::rgb(self.width, self.height)
    }

    /// Zero-filled frame of the expected shape, substituted for unreadable frames.
    pub fn blank_frame(&self) -> RgbImage {
        RgbImage::new(self.width, self.height)
    }
}

/// Source contract for reading decoded RGB frames.
///
/// Ordering contract: callers issue `read_frame` in strictly increasing index order. An `Err`
/// for one frame does not poison the source; pipelines record it and carry on with the next
/// index.
pub trait FrameSource {
    /// Metadata of the sequence. Must be stable for the lifetime of the source.
    fn info(&self) -> VideoInfo;
    /// Read one frame.
    fn read_frame(&mut self, idx: FrameIndex) -> TracemarkResult<RgbImage>;
}

/// In-memory source for tests and small clips.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    info: VideoInfo,
    frames: Vec<Option<RgbImage>>,
}

impl InMemorySource {
    /// Build a source from equally-sized frames.
    pub fn new(frames: Vec<RgbImage>, fps: Fps) -> TracemarkResult<Self> {
        let (width, height) = frames
            .first()
            .map(|f| f.dimensions())
            .ok_or_else(|| TracemarkError::format("frame sequence is empty"))?;
        if frames.iter().any(|f| f.dimensions() != (width, height)) {
            return Err(TracemarkError::validation(
                "in-memory frames must share one size",
            ));
        }
        Ok(Self {
            info: VideoInfo {
                width,
                height,
                frame_count: frames.len() as u64,
                fps,
            },
            frames: frames.into_iter().map(Some).collect(),
        })
    }

    /// Build a source from RGBA frames (e.g. the output of a sink), dropping alpha.
    pub fn from_rgba(frames: &[image::RgbaImage], fps: Fps) -> TracemarkResult<Self> {
        let rgb = frames
            .iter()
            .map(|f| image::DynamicImage::ImageRgba8(f.clone()).to_rgb8())
            .collect();
        Self::new(rgb, fps)
    }

    /// Mark frame `idx` as unreadable; reading it returns an error.
    pub fn with_unreadable(mut self, idx: u64) -> Self {
        if let Some(slot) = self.frames.get_mut(idx as usize) {
            *slot = None;
        }
        self
    }
}

impl FrameSource for InMemorySource {
    fn info(&self) -> VideoInfo {
        self.info
    }

    fn read_frame(&mut self, idx: FrameIndex) -> TracemarkResult<RgbImage> {
        match self.frames.get(idx.0 as usize) {
            Some(Some(f)) => Ok(f.clone()),
            Some(None) => Err(TracemarkError::codec(format!(
                "could not read frame {}",
                idx.0
            ))),
            None => Err(TracemarkError::validation(format!(
                "frame {} is out of bounds ({} frames)",
                idx.0, self.info.frame_count
            ))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/source.rs"]
mod tests;
