//! Collage Storage
//!
//! Persistence for the editor:
//! - **Key-value store:** JSON documents under string keys
//!   (`customLayouts`, `collageState`), file-backed or in memory
//! - **Media blobs:** one record per media item, keyed by index
//! - **Persisted state:** typed load/save of custom layouts and
//!   composition state on top of any key-value store

pub mod blob;
pub mod error;
pub mod kv;
pub mod persisted;

pub use blob::{BlobRecord, MediaBlobStore};
pub use error::StorageError;
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use persisted::*;
