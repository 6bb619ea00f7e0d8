//! Collage Project Model
//!
//! Defines the core data contracts for a collage:
//! - **Media:** Image and video references (data URIs or file paths)
//! - **Cell properties:** Per-cell transforms and free-flow percentages
//! - **Composition:** The state tying media, transforms, colors, and
//!   stacking order to cell ids
//!
//! Every per-cell property falls back to a documented default when the
//! cell has no entry, so reading never fails.

pub mod cell;
pub mod composition;
pub mod media;

pub use cell::*;
pub use composition::*;
pub use media::*;
