//! Export the collage.

use std::path::PathBuf;

use collage_common::AppConfig;
use collage_render_engine::{ExportProgress, ProgressCallback};

pub async fn run(
    config: &AppConfig,
    layout: Option<&str>,
    output: Option<PathBuf>,
    free_flow: bool,
    pixel_ratio: Option<f64>,
    background: Option<String>,
) -> anyhow::Result<()> {
    let mut config = config.clone();
    if let Some(ratio) = pixel_ratio {
        config.canvas.pixel_ratio = ratio;
    }

    let mut editor = super::open_editor(&config, layout)?;
    editor.set_free_flow(free_flow);
    if let Some(color) = background {
        editor.set_background_color(color);
    }

    let output_dir = output.unwrap_or_else(|| config.export.output_dir.clone());
    let job = editor.export_job(&output_dir);
    println!("Exporting layout: {} ({})", job.layout.id, job.layout.name);
    println!("  Output dir: {}", output_dir.display());
    println!("  Format: {:?}", job.format);
    println!(
        "  Canvas: {}x{} @ {}x",
        job.canvas.width, job.canvas.height, job.pixel_ratio
    );

    let progress_cb: ProgressCallback = Box::new(|p: ExportProgress| {
        print!(
            "\r  Progress: {:.1}% ({}/{} frames, {:?})  ",
            p.progress * 100.0,
            p.frames_rendered,
            p.total_frames,
            p.stage,
        );
    });

    let result = editor
        .export_with_progress(&output_dir, Some(progress_cb))
        .await;
    println!();
    for note in editor.take_notifications() {
        println!("  ! {note}");
    }

    let path = result.map_err(|e| anyhow::anyhow!("Export failed: {e}"))?;
    println!("Export complete: {}", path.display());
    Ok(())
}
