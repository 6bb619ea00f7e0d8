//! Media list management.

use std::path::PathBuf;

use collage_common::AppConfig;
use collage_project_model::MediaItem;

/// Longest URL prefix shown in listings; data URIs run to megabytes.
const URL_PREVIEW_CHARS: usize = 60;

pub async fn import(config: &AppConfig, paths: Vec<PathBuf>) -> anyhow::Result<()> {
    let mut editor = super::open_editor(config, None)?;
    println!("Importing {} file(s)...", paths.len());

    let indices = editor.import_media(paths).await;
    editor.save()?;

    for index in &indices {
        if let Some(item) = editor.state().media().get(*index) {
            println!("  #{index} {}", describe(item));
        }
    }
    println!("\nImported {} item(s).", indices.len());
    Ok(())
}

pub fn list(config: &AppConfig) -> anyhow::Result<()> {
    let editor = super::open_editor(config, None)?;
    let media = editor.state().media();

    if media.is_empty() {
        println!("No media.");
        return Ok(());
    }

    println!("Media ({}):", media.len());
    for (index, item) in media.iter().enumerate() {
        let cells: Vec<&str> = editor
            .state()
            .mappings()
            .filter(|(_, i)| *i == index)
            .map(|(cell, _)| cell)
            .collect();
        if cells.is_empty() {
            println!("  #{index} {}", describe(item));
        } else {
            println!("  #{index} {} -> {}", describe(item), cells.join(", "));
        }
    }
    Ok(())
}

pub fn remove(config: &AppConfig, index: usize) -> anyhow::Result<()> {
    let mut editor = super::open_editor(config, None)?;
    let removed = editor.delete_media(index)?;
    editor.save()?;

    println!("Removed #{index} {}", describe(&removed));
    Ok(())
}

fn describe(item: &MediaItem) -> String {
    let url = item.url();
    let preview: String = url.chars().take(URL_PREVIEW_CHARS).collect();
    let ellipsis = if preview.len() < url.len() { "..." } else { "" };
    format!("[{:?}] {preview}{ellipsis}", item.kind())
}
