use std::path::PathBuf;

use collage_common::CollageError;

/// Errors raised while reading or writing persisted state.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {key}: {source}")]
    Parse {
        key: String,
        source: serde_json::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Parse {
            key: key.into(),
            source,
        }
    }
}

impl From<StorageError> for CollageError {
    fn from(err: StorageError) -> Self {
        CollageError::storage(err.to_string())
    }
}
