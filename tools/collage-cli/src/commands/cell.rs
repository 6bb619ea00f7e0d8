//! Per-cell property changes.

use collage_common::AppConfig;
use collage_project_model::{GridPercentagePatch, TransformPatch};

pub fn assign(
    config: &AppConfig,
    layout: Option<&str>,
    cell: String,
    index: usize,
) -> anyhow::Result<()> {
    let mut editor = super::open_editor(config, layout)?;
    editor.select_cell(Some(&cell))?;
    editor.assign_media(index)?;
    editor.save()?;

    println!("Cell {cell} shows media #{index}");
    Ok(())
}

pub fn clear(config: &AppConfig, cell: String) -> anyhow::Result<()> {
    let mut editor = super::open_editor(config, None)?;
    match editor.clear_media(&cell) {
        Some(index) => println!("Cell {cell} no longer shows media #{index}"),
        None => println!("Cell {cell} had no media"),
    }
    editor.save()?;
    Ok(())
}

pub fn transform(config: &AppConfig, cell: String, patch: TransformPatch) -> anyhow::Result<()> {
    let mut editor = super::open_editor(config, None)?;
    let t = editor.update_transform(&cell, &patch);
    editor.save()?;

    println!("Cell {cell} transform:");
    println!("  Zoom: {}", t.zoom);
    println!("  Offset: ({}, {})", t.offset_x, t.offset_y);
    println!("  Rotation: {}deg", t.rotation);
    println!("  Scale: {}", t.scale);
    println!("  Border radius: {}px", t.border_radius);
    Ok(())
}

pub fn color(config: &AppConfig, cell: String, color: String) -> anyhow::Result<()> {
    let mut editor = super::open_editor(config, None)?;
    editor.update_background_color(&cell, color.clone());
    editor.save()?;

    println!("Cell {cell} background: {color}");
    Ok(())
}

pub fn grid(config: &AppConfig, cell: String, patch: GridPercentagePatch) -> anyhow::Result<()> {
    let mut editor = super::open_editor(config, None)?;
    let g = editor.update_grid_percentage(&cell, &patch);
    editor.save()?;

    println!(
        "Cell {cell} free-flow rect: {}% x {}% at ({}%, {}%)",
        g.width, g.height, g.offset_x, g.offset_y
    );
    Ok(())
}

pub fn z_index(config: &AppConfig, cell: String, z: u32) -> anyhow::Result<()> {
    let mut editor = super::open_editor(config, None)?;
    editor.update_z_index(&cell, z);
    editor.save()?;

    println!("Cell {cell} z-index: {z}");
    Ok(())
}
