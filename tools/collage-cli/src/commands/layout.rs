//! Layout management.

use collage_common::AppConfig;

pub fn add(config: &AppConfig, name: String, rows: Vec<String>, gap: u32) -> anyhow::Result<()> {
    let mut editor = super::open_editor(config, None)?;
    let id = editor.add_custom_layout(&name, &super::areas_from_rows(&rows), gap)?;
    editor.save()?;

    println!("Added layout: {id}");
    if let Some(layout) = editor.layout(&id) {
        let cells: Vec<&str> = layout.cell_ids().collect();
        println!("  Cells: {}", cells.join(", "));
    }
    Ok(())
}

pub fn update(
    config: &AppConfig,
    id: String,
    rows: Vec<String>,
    name: Option<String>,
    gap: Option<u32>,
) -> anyhow::Result<()> {
    let mut editor = super::open_editor(config, None)?;
    let current = editor
        .layout(&id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Unknown layout: {id}"))?;

    let areas = if rows.is_empty() {
        current.areas
    } else {
        super::areas_from_rows(&rows)
    };
    editor.update_custom_layout(
        &id,
        name.as_deref().unwrap_or(&current.name),
        &areas,
        gap.unwrap_or(current.gap),
    )?;
    editor.save()?;

    println!("Updated layout: {id}");
    Ok(())
}

pub fn delete(config: &AppConfig, id: String) -> anyhow::Result<()> {
    let mut editor = super::open_editor(config, None)?;
    editor.delete_custom_layout(&id)?;
    editor.save()?;

    println!("Deleted layout: {id}");
    Ok(())
}

pub fn areas(config: &AppConfig, layout: Option<&str>, rows: Vec<String>) -> anyhow::Result<()> {
    let mut editor = super::open_editor(config, layout)?;
    let id = editor.selected_layout().id.clone();

    if let Err(e) = editor.edit_layout_areas(&super::areas_from_rows(&rows)) {
        println!("Layout {id} unchanged.");
        return Err(anyhow::anyhow!("Invalid areas: {e}"));
    }
    if !editor.selected_layout().is_custom {
        println!("Note: built-in layouts are not saved; the change applies to this run only.");
    }
    editor.save()?;

    let cells: Vec<&str> = editor.selected_layout().cell_ids().collect();
    println!("Layout {id} cells: {}", cells.join(", "));
    Ok(())
}

pub fn gap(config: &AppConfig, layout: Option<&str>, gap: u32) -> anyhow::Result<()> {
    let mut editor = super::open_editor(config, layout)?;
    editor.set_gap(gap)?;
    editor.save()?;

    println!("Layout {} gap: {gap}px", editor.selected_layout().id);
    Ok(())
}
