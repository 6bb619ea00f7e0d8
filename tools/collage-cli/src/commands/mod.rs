pub mod cell;
pub mod export;
pub mod geometry;
pub mod info;
pub mod layout;
pub mod layouts;
pub mod media;
pub mod validate;

use collage_common::AppConfig;
use collage_editor::{Editor, EditorSettings};
use collage_storage::{FileStore, MediaBlobStore};

/// Open the session saved under the configured data directory, optionally
/// switching to `layout`.
pub fn open_editor(config: &AppConfig, layout: Option<&str>) -> anyhow::Result<Editor<FileStore>> {
    let store = FileStore::open(config.data_dir.clone())
        .map_err(|e| anyhow::anyhow!("Failed to open data directory: {e}"))?;
    let blobs = MediaBlobStore::open(&config.data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to open media store: {e}"))?;

    let mut editor =
        Editor::open(store, EditorSettings::from_config(config)).with_media_store(blobs);
    if let Some(id) = layout {
        editor.select_layout(id)?;
    }
    Ok(editor)
}

/// Join area rows given on the command line into grammar text. Rows may
/// be given with or without their surrounding quotes.
pub fn areas_from_rows(rows: &[String]) -> String {
    rows.iter()
        .map(|row| {
            let row = row.trim();
            if row.starts_with('"') {
                row.to_string()
            } else {
                format!("\"{row}\"")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
