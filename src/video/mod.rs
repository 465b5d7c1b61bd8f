//! Video watermarking: per-copy frame ciphers and the shard split/assemble machinery.
//!
//! Every operation here streams frames from a [`crate::FrameSource`] into one or more
//! [`crate::FrameSink`]s in strictly increasing index order. Recoverable conditions are returned
//! as [`problem::Problem`] values alongside the result rather than aborting the run.

/// Cipher alphabets.
pub mod alphabet;
/// Shard concatenation and manifest merge.
pub mod assemble;
/// Crop-and-enhance recovery of embedded characters.
pub mod decode;
/// Cipher embedding into frames.
pub mod encode;
/// Random cipher, position, and location selection.
pub mod placement;
/// Non-fatal problems reported by the pipelines.
pub mod problem;
/// Contiguous shard partitioning.
pub mod split;
