//! Collage Editor
//!
//! The controller that owns a collage session:
//! - **Layouts:** built-ins plus persisted custom layouts, with selection
//!   and last-known-good recovery from grammar errors
//! - **Composition:** cell selection and every per-cell edit
//! - **Import:** concurrent file reads appended as they complete
//! - **Export:** guarded single-flight PNG/WEBM export
//! - **Persistence:** save/restore through a key-value store

pub mod editor;
pub mod import;
pub mod settings;

pub use editor::{Editor, MAX_VIEW_ZOOM, MIN_VIEW_ZOOM};
pub use import::read_media_files;
pub use settings::EditorSettings;
