//! Error types shared across Collage crates.

use std::path::PathBuf;

/// Top-level error type for Collage operations.
///
/// Domain crates keep their own precise error enums and convert into this
/// one at the editor/CLI boundary.
#[derive(Debug, thiserror::Error)]
pub enum CollageError {
    #[error("Layout error: {message}")]
    Layout { message: String },

    #[error("Composition error: {message}")]
    Composition { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Export failed: {message}")]
    Export { message: String },

    #[error("An export is already in progress")]
    ExportInProgress,

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using CollageError.
pub type CollageResult<T> = Result<T, CollageError>;

impl CollageError {
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout {
            message: msg.into(),
        }
    }

    pub fn composition(msg: impl Into<String>) -> Self {
        Self::Composition {
            message: msg.into(),
        }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Whether this error belongs to the export path.
    ///
    /// Export failures are terminal for one attempt only and never touch
    /// editor state.
    pub fn is_export_failure(&self) -> bool {
        matches!(
            self,
            Self::Export { .. } | Self::Render { .. } | Self::ExportInProgress
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_constructors_format_messages() {
        let err = CollageError::layout("Rows have different lengths");
        assert_eq!(err.to_string(), "Layout error: Rows have different lengths");

        let err = CollageError::export("encoder crashed");
        assert_eq!(err.to_string(), "Export failed: encoder crashed");
    }

    #[test]
    fn test_export_failure_classification() {
        assert!(CollageError::export("x").is_export_failure());
        assert!(CollageError::render("x").is_export_failure());
        assert!(CollageError::ExportInProgress.is_export_failure());
        assert!(!CollageError::layout("x").is_export_failure());
    }
}
