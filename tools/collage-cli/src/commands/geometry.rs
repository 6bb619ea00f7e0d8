//! Print resolved cell rectangles.

use collage_common::AppConfig;
use collage_render_engine::compose;

pub fn run(
    config: &AppConfig,
    layout: Option<&str>,
    free_flow: bool,
    width: Option<f64>,
    height: Option<f64>,
) -> anyhow::Result<()> {
    let mut editor = super::open_editor(config, layout)?;
    editor.set_free_flow(free_flow);

    let mut canvas = editor.settings().canvas.clone();
    if let Some(width) = width {
        canvas.width = width;
    }
    if let Some(height) = height {
        canvas.height = height;
    }

    let layout = editor.selected_layout();
    println!(
        "Layout {} on a {}x{} canvas ({:?} placement, gap {}px):",
        layout.id,
        canvas.width,
        canvas.height,
        editor.placement_mode(),
        layout.gap
    );

    let placements = compose(layout, editor.state(), &canvas, editor.placement_mode())?;
    for placement in &placements {
        let rect = placement.rect;
        let media = match editor.state().media_index(&placement.cell_id) {
            Some(index) => format!("media #{index}"),
            None => "empty".to_string(),
        };
        println!(
            "  {:<10} x={:.1} y={:.1} w={:.1} h={:.1} z={} ({media})",
            placement.cell_id, rect.x, rect.y, rect.width, rect.height, placement.z_index
        );
    }

    Ok(())
}
