//! Layout validation errors.

use collage_common::CollageError;

/// Errors raised while parsing or editing layouts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("Layout areas are empty")]
    EmptyInput,

    #[error("Row {} has {found} cells but the first row has {expected}", .row + 1)]
    RaggedRows {
        /// Zero-based index of the first row whose width differs.
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Layout name is required")]
    MissingName,

    #[error("Unknown layout: {id}")]
    UnknownLayout { id: String },

    #[error("Layout '{id}' is built in and cannot be modified")]
    NotCustom { id: String },
}

impl From<LayoutError> for CollageError {
    fn from(err: LayoutError) -> Self {
        CollageError::layout(err.to_string())
    }
}
