use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rand::Rng;

use crate::foundation::error::{TracemarkError, TracemarkResult};
use crate::manifest::model::{Manifest, SourceRef};
use crate::media::ffmpeg::{FfmpegSink, FfmpegSinkOpts, FfmpegSource, ensure_parent_dir};
use crate::pipeline::{MANIFEST_FILE, indexed_video_path, save_png};
use crate::text::renderer::TextRenderer;
use crate::video::assemble::{AssembleOutcome, Shard, assemble};
use crate::video::decode::{DecodeOpts, DecodeOutcome, decode};
use crate::video::encode::{EncodeOutcome, EncodeParams, encode};
use crate::video::split::{SplitOutcome, split};

/// Encode `input` into `out_dir/conf.json` plus one `out_dir/<copy>.mp4` per copy.
#[tracing::instrument(skip(renderer, rng))]
pub fn encode_video_file<R: Rng + ?Sized>(
    input: &Path,
    out_dir: &Path,
    params: &EncodeParams,
    renderer: &mut dyn TextRenderer,
    rng: &mut R,
) -> TracemarkResult<EncodeOutcome> {
    let mut source = FfmpegSource::open(input)?;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir '{}'", out_dir.display()))?;
    let mut sinks: Vec<FfmpegSink> = (0..params.copies)
        .map(|c| FfmpegSink::new(FfmpegSinkOpts::new(indexed_video_path(out_dir, c))))
        .collect();
    encode(
        &mut source,
        params,
        SourceRef::video(input),
        Some(&out_dir.join(MANIFEST_FILE)),
        renderer,
        rng,
        &mut sinks,
    )
}

/// Decode `input` against the manifest at `manifest_path` and write the composite as PNG.
#[tracing::instrument]
pub fn decode_video_file(
    input: &Path,
    manifest_path: &Path,
    output: &Path,
    opts: &DecodeOpts,
) -> TracemarkResult<DecodeOutcome> {
    let manifest = Manifest::from_path(manifest_path)?;
    let mut source = FfmpegSource::open(input)?;
    let out = decode(&mut source, &manifest, opts)?;
    save_png(&out.composite, output)?;
    Ok(out)
}

/// Split `input` into `out_dir/<k>.mp4` shards of `shard_size` frames.
#[tracing::instrument]
pub fn split_video_file(
    input: &Path,
    out_dir: &Path,
    shard_size: u64,
) -> TracemarkResult<SplitOutcome> {
    let mut source = FfmpegSource::open(input)?;
    split(&mut source, shard_size, |k, _| {
        Ok(FfmpegSink::new(FfmpegSinkOpts::new(indexed_video_path(
            out_dir, k,
        ))))
    })
}

/// An encoded shard directory and the copy to take from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShardDir {
    /// Directory holding `conf.json` and `<copy>.mp4`.
    pub dir: PathBuf,
    /// Copy index within the shard.
    pub copy: usize,
}

/// Concatenate shard copies into `output` and write the merged manifest to `manifest_out`.
#[tracing::instrument]
pub fn assemble_video_files(
    shards: &[ShardDir],
    output: &Path,
    manifest_out: &Path,
) -> TracemarkResult<AssembleOutcome> {
    let mut inputs = Vec::with_capacity(shards.len());
    for (k, s) in shards.iter().enumerate() {
        let manifest_path = s.dir.join(MANIFEST_FILE);
        let manifest = Manifest::from_path(&manifest_path)?;
        manifest
            .cipher(s.copy)
            .map_err(|e| TracemarkError::validation(format!("shard {k}: {e}")))?;
        let video = indexed_video_path(&s.dir, s.copy);
        inputs.push(Shard {
            source: FfmpegSource::open(&video)?,
            manifest,
            copy: s.copy,
            origin: SourceRef {
                video,
                manifest: Some(manifest_path),
                copy: None,
            },
        });
    }
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(output));
    let out = assemble(&mut inputs, &mut sink)?;
    ensure_parent_dir(manifest_out)?;
    out.manifest.write_path(manifest_out)?;
    tracing::info!(manifest = %manifest_out.display(), "wrote merged manifest");
    Ok(out)
}
