//! String-keyed JSON document stores.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// A key-value store holding one JSON document per key.
pub trait KeyValueStore {
    /// Read the document under `key`, `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the document under `key`.
    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the document under `key`. Missing keys are not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Keys currently stored, sorted.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// File-backed store: `<root>/<key>.json` per key.
///
/// Writes land in a temporary sibling first and are renamed into place,
/// so a crash never leaves a half-written document behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| StorageError::io(&root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        write_atomic(&self.path_for(key), value.as_bytes())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| StorageError::io(&self.root, e))?;
        let mut keys: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                name.strip_suffix(".json").map(str::to_string)
            })
            .collect();
        keys.sort();
        Ok(keys)
    }
}

/// In-memory store, mainly for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// Write `bytes` to `path` via a temporary file and rename.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, bytes).map_err(|e| StorageError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| StorageError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_file_store_put_get_remove() {
        let dir = fresh_dir("collage_test_file_store");
        let mut store = FileStore::open(&dir).unwrap();

        assert_eq!(store.get("customLayouts").unwrap(), None);
        store.put("customLayouts", "[]").unwrap();
        store.put("collageState", "{}").unwrap();
        assert_eq!(store.get("customLayouts").unwrap().as_deref(), Some("[]"));
        assert_eq!(store.keys().unwrap(), vec!["collageState", "customLayouts"]);
        assert!(!dir.join("customLayouts.json.tmp").exists());

        store.remove("customLayouts").unwrap();
        store.remove("customLayouts").unwrap();
        assert_eq!(store.get("customLayouts").unwrap(), None);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_file_store_overwrites() {
        let dir = fresh_dir("collage_test_file_store_overwrite");
        let mut store = FileStore::open(&dir).unwrap();
        store.put("k", "1").unwrap();
        store.put("k", "2").unwrap();

        let reopened = FileStore::open(&dir).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("2"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        store.put("a", "x").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("x"));
        store.remove("a").unwrap();
        assert!(store.keys().unwrap().is_empty());
    }
}
