//! Collage Common Utilities
//!
//! Shared infrastructure for all Collage crates:
//! - Error types and result aliases
//! - Tracing/logging initialization
//! - Configuration loading
//! - Wall-clock helpers for generated ids and export filenames

pub mod config;
pub mod error;
pub mod logging;
pub mod time;

pub use config::*;
pub use error::*;
pub use time::*;
