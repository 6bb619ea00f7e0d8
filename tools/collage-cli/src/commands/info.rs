//! Show the saved session.

use collage_common::AppConfig;
use collage_render_engine::ExportFormat;

pub fn run(config: &AppConfig, layout: Option<&str>, json: bool) -> anyhow::Result<()> {
    let editor = super::open_editor(config, layout)?;
    let state = editor.state();

    if json {
        println!("{}", state.to_json()?);
        return Ok(());
    }

    let layout = editor.selected_layout();
    let canvas = &editor.settings().canvas;
    println!("Collage Session");
    println!("================");
    println!("  Data dir: {}", config.data_dir.display());
    println!(
        "  Canvas: {}x{} @ {}x, background {}",
        canvas.width,
        canvas.height,
        editor.settings().pixel_ratio,
        canvas.background
    );
    println!("  Layout: {} ({})", layout.id, layout.name);
    println!("  Layouts available: {}", editor.layouts().len());

    let videos = state.media().iter().filter(|m| m.is_video()).count();
    println!(
        "\n  Media: {} ({} image(s), {} video(s))",
        state.media().len(),
        state.media().len() - videos,
        videos
    );

    println!("\n  Cells:");
    for cell in layout.cell_ids() {
        let media = state
            .media_index(cell)
            .map_or_else(|| "empty".to_string(), |i| format!("media #{i}"));
        let background = state.background_color(cell).unwrap_or("-");
        println!(
            "    {cell:<10} {media:<10} background {background:<9} z {}",
            state.z_index(cell)
        );
    }

    let format = ExportFormat::for_layout(layout, state);
    println!("\n  Export format: {}", format.extension());
    if format == ExportFormat::Webm {
        println!(
            "  Video: {}s at {} fps",
            editor.settings().video.duration_secs,
            editor.settings().video.fps
        );
    }

    Ok(())
}
