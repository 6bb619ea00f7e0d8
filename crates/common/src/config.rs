//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the key-value store and media blobs.
    pub data_dir: PathBuf,

    /// Canvas defaults used for editing and export.
    pub canvas: CanvasDefaults,

    /// Export settings.
    pub export: ExportDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default canvas parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasDefaults {
    /// Logical canvas width in pixels.
    pub width: u32,

    /// Logical canvas height in pixels.
    pub height: u32,

    /// Canvas background color (hex string).
    pub background: String,

    /// Output pixels per logical pixel when rasterizing.
    pub pixel_ratio: f64,
}

/// Default export parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportDefaults {
    /// Directory exports are written to.
    pub output_dir: PathBuf,

    /// Length of exported video clips in seconds.
    pub video_duration_secs: f64,

    /// Frame rate of exported video clips.
    pub video_fps: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "collage=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs_default_data(),
            canvas: CanvasDefaults::default(),
            export: ExportDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CanvasDefaults {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1000,
            background: "#ffffff".to_string(),
            pixel_ratio: 2.0,
        }
    }
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            video_duration_secs: 5.0,
            video_fps: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("collage").join("config.json")
}

/// Default data directory.
fn dirs_default_data() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("collage")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_defaults_match_editor_surface() {
        let config = AppConfig::default();
        assert_eq!(config.canvas.width, 1000);
        assert_eq!(config.canvas.height, 1000);
        assert_eq!(config.canvas.background, "#ffffff");
        assert!((config.canvas.pixel_ratio - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"canvas":{"width":640},"logging":{"json":true}}"#).unwrap();
        assert_eq!(config.canvas.width, 640);
        assert_eq!(config.canvas.height, 1000);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.export.video_fps, 30);
    }
}
