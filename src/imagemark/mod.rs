//! Still-image watermarking: a secret glyph pattern hidden in the cover's low bit plane.

/// Nibble-level merge and extraction.
pub mod bitplane;
/// Identify which watermarked copy a candidate came from.
pub mod identify;
/// Random glyph patterns used as the hidden payload.
pub mod pattern;
