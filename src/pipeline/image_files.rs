use std::path::{Path, PathBuf};

use image::DynamicImage;
use rand::Rng;

use crate::foundation::error::TracemarkResult;
use crate::imagemark::bitplane;
use crate::imagemark::pattern::mark_copies;
use crate::media::decode::load_image;
use crate::pipeline::save_png;
use crate::text::renderer::TextRenderer;

/// Files written for one watermarked copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkedImageFiles {
    /// The generated secret pattern.
    pub secret: PathBuf,
    /// The cover with the pattern hidden in it.
    pub marked: PathBuf,
}

/// Write `copies` watermarked versions of `cover` into `out_dir` as
/// `secret_<i>.png` and `marked_<i>.png`.
#[tracing::instrument(skip(renderer, rng))]
pub fn mark_image_file<R: Rng + ?Sized>(
    cover: &Path,
    out_dir: &Path,
    copies: usize,
    char_count: usize,
    renderer: &mut dyn TextRenderer,
    rng: &mut R,
) -> TracemarkResult<Vec<MarkedImageFiles>> {
    let cover_img = load_image(cover)?;
    let marked = mark_copies(&cover_img, copies, char_count, renderer, rng)?;
    let mut out = Vec::with_capacity(marked.len());
    for (i, copy) in marked.into_iter().enumerate() {
        let files = MarkedImageFiles {
            secret: out_dir.join(format!("secret_{i}.png")),
            marked: out_dir.join(format!("marked_{i}.png")),
        };
        save_png(&DynamicImage::ImageRgb8(copy.secret), &files.secret)?;
        save_png(&DynamicImage::ImageRgb8(copy.marked), &files.marked)?;
        tracing::debug!(marked = %files.marked.display(), "wrote copy");
        out.push(files);
    }
    Ok(out)
}

/// Hide the image at `secret` inside `cover` and write the result to `output`.
#[tracing::instrument]
pub fn merge_image_files(cover: &Path, secret: &Path, output: &Path) -> TracemarkResult<()> {
    let marked = bitplane::merge(&load_image(cover)?, &load_image(secret)?)?;
    save_png(&DynamicImage::ImageRgb8(marked), output)
}

/// Recover the hidden image of `marked` into `output`. Returns the recovered size.
#[tracing::instrument]
pub fn extract_image_file(marked: &Path, output: &Path) -> TracemarkResult<(u32, u32)> {
    let secret = bitplane::extract(&load_image(marked)?);
    let dims = secret.dimensions();
    save_png(&DynamicImage::ImageRgb8(secret), output)?;
    tracing::info!(width = dims.0, height = dims.1, "extracted");
    Ok(dims)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/image_files.rs"]
mod tests;
