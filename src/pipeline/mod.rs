//! File-level entry points used by the `tracemark` binary.
//!
//! These wire the in-memory operations to `ffmpeg`-backed sources and sinks and to image files on
//! disk. Directory layout of an encode (or a shard) run:
//!
//! ```text
//! <dir>/conf.json   manifest, written before any frame
//! <dir>/0.mp4       copy 0
//! <dir>/1.mp4       copy 1
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::{DynamicImage, ImageFormat};

use crate::foundation::error::TracemarkResult;
use crate::media::ffmpeg::ensure_parent_dir;

/// Still-image marking and extraction.
pub mod image_files;
/// MP4 encode, decode, split, and assemble.
pub mod video_files;

/// File name of the manifest inside an output directory.
pub const MANIFEST_FILE: &str = "conf.json";

/// `<dir>/<index>.mp4`, the layout used for copies and shards.
pub fn indexed_video_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("{index}.mp4"))
}

/// Lossless PNG output, whatever the extension of `path`.
pub(crate) fn save_png(img: &DynamicImage, path: &Path) -> TracemarkResult<()> {
    ensure_parent_dir(path)?;
    img.save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}
