/// Convenience result type used across reelsync.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Only whole-operation failures (export setup, mixdown, invalid project data) reach callers.
/// Per-asset failures (`MissingMedia`, `Decode`) are constructed at the asset boundary, logged,
/// and turned into a placeholder frame or a silent track.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid project, configuration, or caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A scene, overlay, or track has no resolvable media.
    #[error("missing media: {0}")]
    MissingMedia(String),

    /// An image or audio payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The export cannot start (no usable container/codec, recorder could not be created).
    #[error("export setup error: {0}")]
    ExportSetup(String),

    /// A running export failed while writing or finalizing.
    #[error("export error: {0}")]
    Export(String),

    /// The offline mixdown failed as a whole.
    #[error("mixdown error: {0}")]
    Mixdown(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::MissingMedia`] value.
    pub fn missing_media(msg: impl Into<String>) -> Self {
        Self::MissingMedia(msg.into())
    }

    /// Build a [`ReelError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`ReelError::ExportSetup`] value.
    pub fn export_setup(msg: impl Into<String>) -> Self {
        Self::ExportSetup(msg.into())
    }

    /// Build a [`ReelError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`ReelError::Mixdown`] value.
    pub fn mixdown(msg: impl Into<String>) -> Self {
        Self::Mixdown(msg.into())
    }

    /// Build a [`ReelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// True for failures that only degrade a single frame or track.
    pub fn is_per_asset(&self) -> bool {
        matches!(self, Self::MissingMedia(_) | Self::Decode(_))
    }
}

impl From<serde_json::Error> for ReelError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
