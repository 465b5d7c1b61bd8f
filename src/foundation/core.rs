use crate::foundation::error::{TracemarkError, TracemarkResult};

/// Absolute 0-based frame index in source video space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex, // exclusive
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> TracemarkResult<Self> {
        if start.0 > end.0 {
            return Err(TracemarkError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Number of frames contained in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Iterate the frame indices of the range in increasing order.
    pub fn iter(self) -> impl Iterator<Item = FrameIndex> {
        (self.start.0..self.end.0).map(FrameIndex)
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32, // must be > 0
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> TracemarkResult<Self> {
        if den == 0 {
            return Err(TracemarkError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(TracemarkError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Parse `ffprobe`-style rates such as `"30000/1001"` or `"25"`.
    pub fn parse(s: &str) -> TracemarkResult<Self> {
        let s = s.trim();
        let (num, den) = match s.split_once('/') {
            Some((n, d)) => (n.trim(), d.trim()),
            None => (s, "1"),
        };
        let num = num
            .parse::<u32>()
            .map_err(|e| TracemarkError::validation(format!("invalid fps numerator '{num}': {e}")))?;
        let den = den.parse::<u32>().map_err(|e| {
            TracemarkError::validation(format!("invalid fps denominator '{den}': {e}"))
        })?;
        Self::new(num, den)
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

/// Frame geometry recorded in a manifest, serialized as `[height, width, channels]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "[u32; 3]", into = "[u32; 3]")]
pub struct Resolution {
    /// Height in pixels.
    pub height: u32,
    /// Width in pixels.
    pub width: u32,
    /// Channels per pixel of the source frames.
    pub channels: u32,
}

impl Resolution {
    /// RGB resolution of `width x height`.
    pub fn rgb(width: u32, height: u32) -> Self {
        Self {
            height,
            width,
            channels: 3,
        }
    }
}

impl From<[u32; 3]> for Resolution {
    fn from(v: [u32; 3]) -> Self {
        Self {
            height: v[0],
            width: v[1],
            channels: v[2],
        }
    }
}

impl From<Resolution> for [u32; 3] {
    fn from(r: Resolution) -> Self {
        [r.height, r.width, r.channels]
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.height, self.width, self.channels)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
