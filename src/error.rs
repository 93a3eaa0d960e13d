//! Error types for synthesis, loading, and audio I/O.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value or cleaner name was rejected.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The weights checkpoint was missing or could not be restored.
    #[error("failed to load weights from {path:?}: {reason}")]
    Load { path: PathBuf, reason: String },

    /// A model forward pass or tensor operation failed.
    #[error("inference error: {0}")]
    Inference(#[from] candle_core::Error),

    /// Caller input violated a documented call contract.
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// Reading or writing a waveform file failed.
    #[error("audio file error: {0}")]
    AudioFile(#[from] hound::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build an [`Error::Load`] from any displayable cause.
    pub fn load(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Error::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
