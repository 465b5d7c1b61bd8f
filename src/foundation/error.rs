/// Convenience result type used across tracemark.
pub type TracemarkResult<T> = Result<T, TracemarkError>;

/// Top-level error taxonomy used by the watermarking APIs.
///
/// These are fail-fast conditions. Recoverable conditions met while streaming frames are
/// reported as [`crate::Problem`] values instead.
#[derive(thiserror::Error, Debug)]
pub enum TracemarkError {
    /// Input is not a supported image or media stream.
    #[error("format error: {0}")]
    Format(String),

    /// Secret image does not fit inside the cover image.
    #[error(
        "size error: secret {}x{} is larger than cover {}x{}",
        secret.0, secret.1, cover.0, cover.1
    )]
    Size {
        /// Secret `(width, height)`.
        secret: (u32, u32),
        /// Cover `(width, height)`.
        cover: (u32, u32),
    },

    /// Invalid parameters or manifest data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Failures of the external frame codec (ffmpeg/ffprobe).
    #[error("codec error: {0}")]
    Codec(String),

    /// Errors when serializing or deserializing manifests.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TracemarkError {
    /// Build a [`TracemarkError::Format`] value.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Build a [`TracemarkError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TracemarkError::Codec`] value.
    pub fn codec(msg: impl Into<String>) -> Self {
        Self::Codec(msg.into())
    }

    /// Build a [`TracemarkError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
