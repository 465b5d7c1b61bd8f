//! Persisted record of a video embedding run.

/// Manifest record, its invariants and JSON persistence.
pub mod model;
