//! Tracemark hides per-copy watermarks in images and videos.
//!
//! Two independent schemes are provided:
//!
//! - Images: a random glyph pattern is hidden in the low four bits of every channel of the cover
//!   ([`merge`] / [`extract`]).
//! - Videos: each copy gets its own cipher string, drawn one character per chosen frame at chosen
//!   locations. A [`Manifest`] records where, so the characters can be cropped back out later
//!   ([`encode`] / [`decode`]). Long videos can be [`split`] into shards, encoded independently,
//!   and [`assemble`]d back into one video with one merged manifest.
//!
//! Frame I/O goes through [`FrameSource`] / [`FrameSink`]; glyph drawing goes through
//! [`TextRenderer`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Still-image watermarking.
pub mod imagemark;
/// Persisted embedding records.
pub mod manifest;
/// Frame sources and sinks.
pub mod media;
/// File-level pipelines.
pub mod pipeline;
/// Text rendering capability.
pub mod text;
/// Video watermarking.
pub mod video;

pub use crate::foundation::core::{FrameIndex, FrameRange, Fps, Resolution};
pub use crate::foundation::error::{TracemarkError, TracemarkResult};

pub use crate::imagemark::bitplane::{extract, merge};
pub use crate::imagemark::identify::{Match, ScoreOrder, Similarity, identify};
pub use crate::imagemark::pattern::{
    DEFAULT_PATTERN_CHARS, MarkedCopy, mark_copies, secret_pattern,
};
pub use crate::manifest::model::{FontSpec, Location, Manifest, SourceRef};
pub use crate::media::decode::load_image;
pub use crate::media::ffmpeg::{FfmpegSink, FfmpegSinkOpts, FfmpegSource};
pub use crate::media::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::media::source::{FrameSource, InMemorySource, VideoInfo};
pub use crate::text::renderer::{
    BlockTextRenderer, CachedRenderer, GlyphMask, TextLayer, TextRenderer, draw_text,
};
pub use crate::text::vello::VelloTextRenderer;
pub use crate::video::alphabet::Alphabet;
pub use crate::video::assemble::{AssembleOutcome, Shard, assemble, merge_manifests};
pub use crate::video::decode::{DecodeOpts, DecodeOutcome, decode};
pub use crate::video::encode::{EncodeOutcome, EncodeParams, embed, encode, plan_encode};
pub use crate::video::problem::Problem;
pub use crate::video::split::{SplitOutcome, shard_ranges, split};
