use std::path::{Path, PathBuf};

/// Crate-wide result type for registry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed registry errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Channel identifier is empty or otherwise unusable.
    #[error("invalid channel id: {message}")]
    InvalidInput { message: String },

    /// Registry file exists but could not be read or written.
    #[error("channel registry io failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Registry file content is not a valid registry document.
    #[error("corrupt channel registry {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The backing store refused the write.
    #[error("channel registry unavailable: {message}")]
    Unavailable { message: String },

    /// JSON (de)serialization failed.
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl Error {
    #[must_use]
    pub fn invalid_input(message: impl std::fmt::Display) -> Self {
        Self::InvalidInput {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn unavailable(message: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    #[must_use]
    pub fn corrupt(path: &Path, source: serde_json::Error) -> Self {
        Self::Corrupt {
            path: path.to_path_buf(),
            source,
        }
    }
}
