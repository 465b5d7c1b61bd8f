use std::path::Path;

use image::RgbImage;

use crate::foundation::error::{TracemarkError, TracemarkResult};

/// Decode encoded image bytes into RGB8, dropping any alpha channel.
pub fn decode_image(bytes: &[u8]) -> TracemarkResult<RgbImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| TracemarkError::format(format!("decode image from memory: {e}")))?;
    Ok(dyn_img.to_rgb8())
}

/// Read and decode an image file into RGB8.
pub fn load_image(path: impl AsRef<Path>) -> TracemarkResult<RgbImage> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| {
        TracemarkError::format(format!("read image '{}': {e}", path.display()))
    })?;
    decode_image(&bytes)
}

/// Require an `.mp4` extension on video inputs.
pub fn ensure_mp4(path: &Path) -> TracemarkResult<()> {
    let is_mp4 = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("mp4"));
    if !is_mp4 {
        return Err(TracemarkError::format(format!(
            "input file '{}' must be MP4 format",
            path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/media/decode.rs"]
mod tests;
