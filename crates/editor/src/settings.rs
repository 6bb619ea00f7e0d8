//! Session settings derived from the application config.

use std::path::PathBuf;

use collage_common::AppConfig;
use collage_render_engine::{Canvas, VideoSettings};

/// Canvas and export parameters for one editor session.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSettings {
    pub canvas: Canvas,
    pub pixel_ratio: f64,
    pub video: VideoSettings,
    /// Scratch space for video exports.
    pub cache_dir: PathBuf,
}

impl EditorSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            canvas: Canvas::new(
                config.canvas.width as f64,
                config.canvas.height as f64,
                config.canvas.background.clone(),
            ),
            pixel_ratio: config.canvas.pixel_ratio,
            video: VideoSettings {
                duration_secs: config.export.video_duration_secs,
                fps: config.export.video_fps,
            },
            cache_dir: config.data_dir.join("cache"),
        }
    }
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}
