//! Collage Layout Engine
//!
//! Everything needed to turn a layout's textual area grammar into pixels:
//! - **Grammar:** Parse quoted rows of cell names into a rectangular grid
//! - **Registry:** Derive the ordered set of unique cell ids
//! - **Geometry:** Resolve a cell's pixel rectangle on a canvas with gaps
//! - **Layouts:** The named layout record and the built-in presets
//!
//! This crate is pure computation with no I/O.

pub mod error;
pub mod geometry;
pub mod grammar;
pub mod layout;
pub mod presets;

pub use error::LayoutError;
pub use geometry::{resolve_cell_rect, Rect};
pub use grammar::{AreaGrid, CellSpan};
pub use layout::{CellRef, Layout, DEFAULT_GAP};
pub use presets::{default_layouts, is_builtin};
