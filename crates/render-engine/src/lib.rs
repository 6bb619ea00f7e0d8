//! Collage Render Engine
//!
//! Turns a layout and its composition state into an exported file.
//!
//! # Pipeline Architecture
//!
//! ```text
//! layout ─────┐
//!             ├── compose (grid or free-flow placements)
//! state ──────┘         │
//!                       ├── rasterize stills (cover fit, transform, clip)
//!                       │
//!            ┌──────────┴───────────┐
//!            ▼                      ▼
//!       encode PNG          backdrop + video overlays
//!            │                      │ (ffmpeg, VP9)
//!            ▼                      ▼
//!   collage-<ms>.png        collage-<ms>.webm
//! ```

pub mod color;
pub mod compositor;
pub mod export;
pub mod raster;

pub use compositor::{compose, Canvas, CellPlacement, PlacementMode};
pub use export::*;
