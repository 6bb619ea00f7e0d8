//! Concurrent media import.

use std::path::{Path, PathBuf};

use collage_common::{CollageError, CollageResult};
use collage_project_model::{encode_data_url, MediaItem, MediaKind};
use tokio::task::JoinSet;

/// Read every file concurrently into a `data:` URI media item.
///
/// Items are returned in the order the reads complete, not the order of
/// `paths`. Unsupported or unreadable files are logged and skipped.
pub async fn read_media_files(paths: Vec<PathBuf>) -> Vec<MediaItem> {
    let mut set = JoinSet::new();
    for path in paths {
        set.spawn(async move {
            let result = read_media_file(&path).await;
            (path, result)
        });
    }

    let mut items = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((path, Ok(item))) => {
                tracing::debug!(path = %path.display(), kind = ?item.kind(), "Media read");
                items.push(item);
            }
            Ok((path, Err(e))) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping media file");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Media read task failed");
            }
        }
    }
    items
}

async fn read_media_file(path: &Path) -> CollageResult<MediaItem> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let (kind, mime) = MediaKind::from_extension(ext).ok_or_else(|| {
        CollageError::unsupported(format!("Unsupported media type: {}", path.display()))
    })?;
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CollageError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => CollageError::Io(e),
    })?;
    Ok(MediaItem::new(kind, encode_data_url(mime, &bytes)))
}
