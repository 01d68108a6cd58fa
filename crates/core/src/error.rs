use std::io;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, ManifestError>;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// A `.in` template was found but its generated counterpart is absent.
    #[error("missing file: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("invalid metadata in {}: {reason}", path.display())]
    InvalidMetadata { path: PathBuf, reason: String },

    #[error("invalid project layout: {0}")]
    InvalidConfig(String),

    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ManifestError {
    pub fn metadata(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidMetadata {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The absent generated file, when this is a `MissingFile` error.
    pub fn missing_file(&self) -> Option<&Path> {
        match self {
            Self::MissingFile { path } => Some(path),
            _ => None,
        }
    }
}
