//! Frame I/O boundary.
//!
//! Pipelines only see [`source::FrameSource`] and [`sink::FrameSink`]; the `ffmpeg` module backs
//! both with the system `ffmpeg`/`ffprobe` binaries.

/// Still image decoding.
pub mod decode;
/// `ffmpeg`-based frame source and sink (MP4 in/out).
pub mod ffmpeg;
/// Generic frame sink trait and the in-memory sink.
pub mod sink;
/// Generic frame source trait and the in-memory source.
pub mod source;
