//! Media blob store: one JSON record per media item, keyed by index.

use std::path::{Path, PathBuf};

use collage_project_model::{MediaItem, MediaKind};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::kv::write_atomic;

/// A stored media record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobRecord {
    pub id: usize,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub data_url: String,
}

impl BlobRecord {
    pub fn from_item(id: usize, item: &MediaItem) -> Self {
        Self {
            id,
            kind: item.kind(),
            data_url: item.url().to_string(),
        }
    }

    pub fn into_item(self) -> MediaItem {
        MediaItem::new(self.kind, self.data_url)
    }
}

/// Directory of `<index>.json` media records.
#[derive(Debug, Clone)]
pub struct MediaBlobStore {
    dir: PathBuf,
}

impl MediaBlobStore {
    /// Open the store at `<data_dir>/media`, creating it if needed.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = data_dir.as_ref().join("media");
        std::fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;
        Ok(Self { dir })
    }

    /// Replace every record with `items`, indexed by position.
    pub fn put_all(&self, items: &[MediaItem]) -> Result<(), StorageError> {
        self.clear()?;
        for (id, item) in items.iter().enumerate() {
            let record = BlobRecord::from_item(id, item);
            let json = serde_json::to_string(&record)
                .map_err(|e| StorageError::parse(format!("media/{id}"), e))?;
            write_atomic(&self.dir.join(format!("{id}.json")), json.as_bytes())?;
        }
        tracing::debug!(count = items.len(), dir = %self.dir.display(), "Stored media blobs");
        Ok(())
    }

    /// All stored items in index order. Unreadable records are skipped.
    pub fn get_all(&self) -> Result<Vec<MediaItem>, StorageError> {
        let mut records = Vec::new();
        for path in self.record_paths()? {
            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable media record");
                    continue;
                }
            };
            match serde_json::from_str::<BlobRecord>(&content) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping corrupt media record");
                }
            }
        }
        records.sort_by_key(|r| r.id);
        Ok(records.into_iter().map(BlobRecord::into_item).collect())
    }

    /// Remove every record.
    pub fn clear(&self) -> Result<(), StorageError> {
        for path in self.record_paths()? {
            std::fs::remove_file(&path).map_err(|e| StorageError::io(&path, e))?;
        }
        Ok(())
    }

    fn record_paths(&self) -> Result<Vec<PathBuf>, StorageError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;
        Ok(entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_wire_format() {
        let record = BlobRecord::from_item(3, &MediaItem::video("data:video/webm;base64,AA=="));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["type"], "video");
        assert_eq!(json["dataUrl"], "data:video/webm;base64,AA==");
    }

    #[test]
    fn test_put_all_replaces_and_get_all_orders() {
        let dir = std::env::temp_dir().join("collage_test_blob_store");
        let _ = std::fs::remove_dir_all(&dir);
        let store = MediaBlobStore::open(&dir).unwrap();

        let first: Vec<MediaItem> = (0..12).map(|i| MediaItem::image(format!("img-{i}"))).collect();
        store.put_all(&first).unwrap();
        // Numeric order, not lexical ("10" after "9").
        assert_eq!(store.get_all().unwrap(), first);

        let second = vec![MediaItem::video("clip"), MediaItem::image("still")];
        store.put_all(&second).unwrap();
        assert_eq!(store.get_all().unwrap(), second);

        store.clear().unwrap();
        assert!(store.get_all().unwrap().is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_corrupt_record_is_skipped() {
        let dir = std::env::temp_dir().join("collage_test_blob_corrupt");
        let _ = std::fs::remove_dir_all(&dir);
        let store = MediaBlobStore::open(&dir).unwrap();
        store.put_all(&[MediaItem::image("a")]).unwrap();
        std::fs::write(dir.join("media").join("1.json"), "not json").unwrap();

        assert_eq!(store.get_all().unwrap(), vec![MediaItem::image("a")]);

        std::fs::remove_dir_all(&dir).ok();
    }
}
