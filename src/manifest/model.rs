use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};

use crate::foundation::core::Resolution;
use crate::foundation::error::{TracemarkError, TracemarkResult};

/// Handler name written into manifests produced by this crate.
pub const HANDLER: &str = concat!("tracemark/", env!("CARGO_PKG_VERSION"));

/// Pixel coordinate `(x, y)` of one embedded glyph, serialized as `[x, y]`.
pub type Location = (u32, u32);

/// Reference to the media a manifest was built from.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SourceRef {
    /// Source video path.
    pub video: PathBuf,
    /// Manifest of the source, for merged manifests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,
    /// Copy selected from the source, for merged manifests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy: Option<usize>,
}

impl SourceRef {
    /// Reference to a plain source video.
    pub fn video(path: impl Into<PathBuf>) -> Self {
        Self {
            video: path.into(),
            manifest: None,
            copy: None,
        }
    }
}

/// Glyph settings shared by every embedded character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FontSpec {
    /// Font size in pixels.
    pub size: u32,
}

/// Authoritative description of where and what was embedded into a video.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Manifest {
    /// Creation time (UTC).
    pub created_at: DateTime<Utc>,
    /// Origin identifier, diagnostic only.
    pub handler: String,
    /// Source video(s), one per shard for merged manifests.
    pub input: Vec<SourceRef>,
    /// Total frame count covered by this manifest.
    pub length: u64,
    /// Frame geometry at encode time.
    pub resolution: Resolution,
    /// Glyph settings.
    pub font: FontSpec,
    /// Opacity used for embedded glyphs.
    pub alpha: u8,
    /// One string per copy, one character per position.
    pub ciphers: Vec<String>,
    /// Frames carrying a payload, strictly ascending.
    pub positions: Vec<u64>,
    /// Glyph locations, aligned 1:1 with `positions`.
    pub locations: Vec<Vec<Location>>,
}

impl Manifest {
    /// Check every structural invariant.
    pub fn validate(&self) -> TracemarkResult<()> {
        if self.font.size == 0 {
            return Err(TracemarkError::validation("font.size must be > 0"));
        }
        if self.positions.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TracemarkError::validation(
                "positions must be strictly ascending and duplicate-free",
            ));
        }
        if let Some(&last) = self.positions.last()
            && last >= self.length
        {
            return Err(TracemarkError::validation(format!(
                "position {last} is out of range for length {}",
                self.length
            )));
        }
        if self.locations.len() != self.positions.len() {
            return Err(TracemarkError::validation(format!(
                "locations has {} entries but positions has {}",
                self.locations.len(),
                self.positions.len()
            )));
        }
        if let Some(k) = self.locations.iter().position(Vec::is_empty) {
            return Err(TracemarkError::validation(format!(
                "locations[{k}] must be non-empty"
            )));
        }
        for (i, cipher) in self.ciphers.iter().enumerate() {
            let n = cipher.chars().count();
            if n != self.positions.len() {
                return Err(TracemarkError::validation(format!(
                    "ciphers[{i}] has {n} characters but there are {} positions",
                    self.positions.len()
                )));
            }
        }
        Ok(())
    }

    /// Rank of `frame` within `positions`, if it carries a payload.
    pub fn position_rank(&self, frame: u64) -> Option<usize> {
        self.positions.binary_search(&frame).ok()
    }

    /// Largest number of locations at any position.
    pub fn max_duplicates(&self) -> usize {
        self.locations.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Cipher of copy `copy`.
    pub fn cipher(&self, copy: usize) -> TracemarkResult<&str> {
        self.ciphers.get(copy).map(String::as_str).ok_or_else(|| {
            TracemarkError::validation(format!(
                "copy index {copy} is out of range ({} ciphers)",
                self.ciphers.len()
            ))
        })
    }

    /// Parse a JSON manifest.
    pub fn from_reader<R: Read>(reader: R) -> TracemarkResult<Self> {
        serde_json::from_reader(reader).map_err(|e| TracemarkError::serde(e.to_string()))
    }

    /// Read a JSON manifest from disk.
    pub fn from_path(path: impl AsRef<Path>) -> TracemarkResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("open manifest '{}'", path.display()))?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Pretty-printed JSON; non-ASCII cipher characters are written verbatim.
    pub fn to_writer<W: Write>(&self, writer: W) -> TracemarkResult<()> {
        serde_json::to_writer_pretty(writer, self).map_err(|e| TracemarkError::serde(e.to_string()))
    }

    /// Write the manifest to `path`, replacing any existing file.
    pub fn write_path(&self, path: impl AsRef<Path>) -> TracemarkResult<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)
            .with_context(|| format!("create manifest '{}'", path.display()))?;
        let mut w = std::io::BufWriter::new(file);
        self.to_writer(&mut w)?;
        w.flush()
            .with_context(|| format!("flush manifest '{}'", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/manifest/model.rs"]
mod tests;
