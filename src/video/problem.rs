use crate::foundation::core::Resolution;

/// A recoverable condition met while streaming frames or merging manifests.
///
/// Problems never abort a run. They are collected, logged at `error` level when the run ends,
/// and returned to the caller.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum Problem {
    /// A source frame could not be decoded.
    #[error("could not read frame {frame}{}", shard_suffix(.shard))]
    UnreadableFrame {
        /// Shard the frame belongs to, when the run is shard-aware.
        shard: Option<usize>,
        /// Frame index within its source.
        frame: u64,
    },

    /// A shard manifest disagrees with the canonical resolution.
    #[error("resolution does not match: shard {shard} ({found}) => {expected}")]
    ResolutionMismatch {
        /// Offending shard.
        shard: usize,
        /// Resolution found in the shard manifest.
        found: Resolution,
        /// Canonical resolution (first shard).
        expected: Resolution,
    },

    /// A shard manifest disagrees with the canonical font size.
    #[error("font size does not match: shard {shard} ({found}) => {expected}")]
    FontSizeMismatch {
        /// Offending shard.
        shard: usize,
        /// Font size found in the shard manifest.
        found: u32,
        /// Canonical font size (first shard).
        expected: u32,
    },

    /// Shard frames differ in size from the first shard's frames; they are resized.
    #[error(
        "frame size does not match: shard {shard} frame {frame} is {}x{}, expected {}x{}",
        found.0, found.1, expected.0, expected.1
    )]
    FrameSizeMismatch {
        /// Offending shard.
        shard: usize,
        /// First mismatching frame within the shard.
        frame: u64,
        /// Frame `(width, height)`.
        found: (u32, u32),
        /// Canonical `(width, height)`.
        expected: (u32, u32),
    },
}

fn shard_suffix(shard: &Option<usize>) -> String {
    shard.map(|s| format!(" (shard {s})")).unwrap_or_default()
}

/// Log every problem at `error` level.
pub fn report_problems(problems: &[Problem]) {
    for p in problems {
        tracing::error!("{p}");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/video/problem.rs"]
mod tests;
