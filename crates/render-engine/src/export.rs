//! Export configuration and job management.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use collage_common::error::{CollageError, CollageResult};
use collage_common::unix_millis;
use collage_layout::{Layout, Rect};
use collage_project_model::{
    extension_for_mime, CompositionState, MediaItem, MediaSource, Transform,
};
use serde::{Deserialize, Serialize};

use crate::compositor::{compose, Canvas, CellPlacement, PlacementMode};
use crate::raster::{encode_png, media_bytes, rasterize};

/// Output container of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Webm,
}

impl ExportFormat {
    /// PNG unless a video is shown in one of `layout`'s cells.
    ///
    /// Media mapped to cells the layout does not have is never rendered
    /// and does not count.
    pub fn for_layout(layout: &Layout, state: &CompositionState) -> Self {
        let shows_video = layout
            .cell_ids()
            .any(|cell| state.media_for(cell).is_some_and(MediaItem::is_video));
        if shows_video {
            Self::Webm
        } else {
            Self::Png
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Webm => "webm",
        }
    }
}

/// `collage-<unix-ms>.<ext>`
pub fn export_filename(format: ExportFormat, unix_ms: i64) -> String {
    format!("collage-{unix_ms}.{}", format.extension())
}

/// `path` if nothing exists there yet, otherwise the first free
/// `<stem>-<n>.<ext>` next to it.
pub fn unused_output_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (2..)
        .map(|n| path.with_file_name(format!("{stem}-{n}{ext}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Clip length and frame rate for video exports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoSettings {
    pub duration_secs: f64,
    pub fps: u32,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            duration_secs: 5.0,
            fps: 30,
        }
    }
}

impl VideoSettings {
    pub fn total_frames(&self) -> u64 {
        (self.duration_secs.max(0.0) * self.fps as f64).ceil() as u64
    }
}

/// An export job ready to be rendered.
#[derive(Debug, Clone)]
pub struct ExportJob {
    /// Layout snapshot to render.
    pub layout: Layout,

    /// Composition snapshot to render.
    pub state: CompositionState,

    pub mode: PlacementMode,

    /// Logical canvas.
    pub canvas: Canvas,

    /// Output pixels per logical pixel.
    pub pixel_ratio: f64,

    pub video: VideoSettings,

    pub format: ExportFormat,

    /// Output file path.
    pub output_path: PathBuf,

    /// Scratch directory for backdrops and materialized video sources.
    pub cache_dir: PathBuf,
}

impl ExportJob {
    /// Build a job writing `collage-<unix-ms>.<ext>` into `output_dir`.
    ///
    /// The format follows what the layout shows: WEBM when any of its cells
    /// holds a video, PNG otherwise.
    pub fn new(
        layout: Layout,
        state: CompositionState,
        mode: PlacementMode,
        canvas: Canvas,
        output_dir: impl AsRef<Path>,
    ) -> Self {
        let format = ExportFormat::for_layout(&layout, &state);
        let output_path = output_dir
            .as_ref()
            .join(export_filename(format, unix_millis()));
        Self {
            layout,
            state,
            mode,
            canvas,
            pixel_ratio: 2.0,
            video: VideoSettings::default(),
            format,
            output_path,
            cache_dir: std::env::temp_dir().join("collage-export"),
        }
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: f64) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    pub fn with_video(mut self, video: VideoSettings) -> Self {
        self.video = video;
        self
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }
}

/// Progress callback for export rendering.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send>;

/// Export progress report.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Frames rendered so far.
    pub frames_rendered: u64,

    /// Total frames to render (1 for still images).
    pub total_frames: u64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    /// Current stage.
    pub stage: ExportStage,
}

impl ExportProgress {
    fn at(stage: ExportStage, progress: f64, total_frames: u64) -> Self {
        Self {
            progress,
            frames_rendered: (progress * total_frames as f64).round() as u64,
            total_frames,
            eta_secs: 0.0,
            stage,
        }
    }
}

/// Stages of the export process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Preparing,
    Rendering,
    Encoding,
    Finalizing,
    Complete,
    Failed,
}

/// Trait for render backends (raster PNG, FFmpeg video).
pub trait RenderBackend: Send {
    /// Execute the export job.
    fn render(&mut self, job: &ExportJob, progress: Option<ProgressCallback>) -> CollageResult<()>;

    /// Check if this backend is available on the system.
    fn is_available(&self) -> bool;

    /// Backend name.
    fn name(&self) -> &str;
}

/// Allows at most one export at a time.
#[derive(Debug, Clone, Default)]
pub struct ExportGate {
    busy: Arc<AtomicBool>,
}

/// Held for the duration of one export; releases the gate on drop.
#[derive(Debug)]
pub struct ExportPermit {
    busy: Arc<AtomicBool>,
}

impl ExportGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate, failing with `ExportInProgress` if it is taken.
    pub fn try_acquire(&self) -> CollageResult<ExportPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| CollageError::ExportInProgress)?;
        Ok(ExportPermit {
            busy: Arc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for ExportPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Render the collage to its output file.
///
/// This is the main entry point for exporting. Rendering runs on the
/// blocking pool; the returned path is the file that was written.
pub async fn export_collage(
    mut job: ExportJob,
    progress: Option<ProgressCallback>,
) -> CollageResult<PathBuf> {
    // Millisecond names can repeat; never overwrite an earlier export.
    job.output_path = unused_output_path(&job.output_path);
    tracing::info!(
        output = %job.output_path.display(),
        format = ?job.format,
        layout = %job.layout.id,
        "Starting export"
    );

    if let Some(parent) = job.output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if let Some(cb) = &progress {
        cb(ExportProgress::at(ExportStage::Preparing, 0.0, 0));
    }

    let mut backend: Box<dyn RenderBackend> = match job.format {
        ExportFormat::Png => Box::new(PngBackend),
        ExportFormat::Webm => Box::new(FfmpegBackend::new()),
    };
    if !backend.is_available() {
        return Err(CollageError::unsupported(format!(
            "Render backend '{}' is not available (expected ffmpeg in PATH)",
            backend.name()
        )));
    }

    tracing::info!(backend = backend.name(), "Using render backend");
    tokio::task::spawn_blocking(move || -> CollageResult<PathBuf> {
        backend.render(&job, progress)?;
        Ok(job.output_path)
    })
    .await
    .map_err(|e| CollageError::export(format!("Export task failed: {e}")))?
}

/// Still-image backend: rasterize and write a PNG.
pub struct PngBackend;

impl RenderBackend for PngBackend {
    fn render(&mut self, job: &ExportJob, progress: Option<ProgressCallback>) -> CollageResult<()> {
        let started = std::time::Instant::now();
        let placements = compose(&job.layout, &job.state, &job.canvas, job.mode)?;

        if let Some(cb) = &progress {
            cb(ExportProgress::at(ExportStage::Rendering, 0.0, 1));
        }
        let image = rasterize(&placements, &job.canvas, job.pixel_ratio)?;

        if let Some(cb) = &progress {
            cb(ExportProgress::at(ExportStage::Encoding, 0.5, 1));
        }
        let png = encode_png(&image)?;
        std::fs::write(&job.output_path, png)?;

        if let Some(cb) = &progress {
            cb(ExportProgress::at(ExportStage::Complete, 1.0, 1));
        }
        tracing::info!(
            width = image.width(),
            height = image.height(),
            elapsed_ms = started.elapsed().as_millis(),
            "PNG export finished"
        );
        Ok(())
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "raster"
    }
}

/// A video cell to overlay onto the still backdrop.
#[derive(Debug, Clone)]
struct VideoOverlay {
    cell_id: String,
    source: PathBuf,
    /// Cell rectangle in output pixels.
    rect: Rect,
    transform: Transform,
}

#[derive(Debug, Clone)]
struct ExportPlan {
    ffmpeg_args: Vec<String>,
    total_frames: u64,
    expected_duration_secs: f64,
}

/// Video backend: still content is rasterized into a backdrop and every
/// video cell is overlaid by ffmpeg, encoded as VP9 WEBM without audio.
pub struct FfmpegBackend;

impl FfmpegBackend {
    pub fn new() -> Self {
        Self
    }

    fn prepare_overlays(
        &self,
        job: &ExportJob,
        placements: &[CellPlacement],
    ) -> CollageResult<Vec<VideoOverlay>> {
        let stamp = unix_millis();
        let mut overlays = Vec::new();
        for (index, placement) in placements.iter().enumerate() {
            let Some(item) = placement.media.as_ref().filter(|m| m.is_video()) else {
                continue;
            };
            let source = match item.source() {
                MediaSource::DataUrl { mime, .. } => {
                    let ext = extension_for_mime(mime).unwrap_or("bin");
                    let path = job
                        .cache_dir
                        .join(format!("video-{stamp}-{index}.{ext}"));
                    std::fs::write(&path, media_bytes(item)?)?;
                    path
                }
                MediaSource::Path(path) => {
                    let path = PathBuf::from(path);
                    if !path.exists() {
                        return Err(CollageError::FileNotFound { path });
                    }
                    path
                }
            };
            overlays.push(VideoOverlay {
                cell_id: placement.cell_id.clone(),
                source,
                rect: placement.rect.scaled(job.pixel_ratio),
                transform: placement.transform,
            });
        }
        Ok(overlays)
    }

    fn build_plan(
        &self,
        job: &ExportJob,
        backdrop: &Path,
        overlays: &[VideoOverlay],
    ) -> ExportPlan {
        let fps = job.video.fps.max(1);
        let duration = format!("{:.3}", job.video.duration_secs.max(0.0));

        let mut args: Vec<String> = [
            "-y",
            "-hide_banner",
            "-loglevel",
            "error",
            "-nostats",
            "-progress",
            "pipe:1",
            "-loop",
            "1",
            "-framerate",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(fps.to_string());
        args.extend(["-t".to_string(), duration.clone(), "-i".to_string()]);
        args.push(backdrop.display().to_string());

        for overlay in overlays {
            args.extend(
                ["-stream_loop", "-1", "-t"]
                    .iter()
                    .map(|s| s.to_string()),
            );
            args.push(duration.clone());
            args.push("-i".to_string());
            args.push(overlay.source.display().to_string());
        }

        args.push("-filter_complex".to_string());
        args.push(build_filter_graph(overlays, job.pixel_ratio));
        args.extend(
            [
                "-map", "[out]", "-an", "-c:v", "libvpx-vp9", "-b:v", "0", "-crf", "32", "-r",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        args.push(fps.to_string());
        args.push("-t".to_string());
        args.push(duration);
        args.push(job.output_path.display().to_string());

        ExportPlan {
            ffmpeg_args: args,
            total_frames: job.video.total_frames(),
            expected_duration_secs: job.video.duration_secs,
        }
    }

    fn run_ffmpeg(
        &self,
        plan: &ExportPlan,
        progress: Option<ProgressCallback>,
    ) -> CollageResult<()> {
        tracing::debug!(args = ?plan.ffmpeg_args, "Running ffmpeg");
        let mut cmd = Command::new("ffmpeg");
        cmd.args(&plan.ffmpeg_args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let start = std::time::Instant::now();
        let mut child = cmd
            .spawn()
            .map_err(|e| CollageError::render(format!("Failed to start ffmpeg: {e}")))?;

        tracing::info!(
            pid = child.id(),
            total_frames = plan.total_frames,
            "ffmpeg process started"
        );

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CollageError::render("Failed to capture ffmpeg stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| CollageError::render("Failed to capture ffmpeg stderr"))?;

        // Drain stderr concurrently so ffmpeg never blocks on a full pipe.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        let mut reader = BufReader::new(stdout);
        let mut line = String::new();
        let mut latest = ProgressState::default();
        loop {
            line.clear();
            let bytes = reader
                .read_line(&mut line)
                .map_err(|e| CollageError::render(format!("Failed reading ffmpeg progress: {e}")))?;
            if bytes == 0 {
                break;
            }
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            latest.update(key, value);
            if key == "progress" {
                if let Some(cb) = &progress {
                    cb(progress_report(
                        &latest,
                        plan.total_frames,
                        plan.expected_duration_secs,
                        start.elapsed().as_secs_f64(),
                    ));
                }
            }
        }

        let status = child
            .wait()
            .map_err(|e| CollageError::render(format!("Failed to wait on ffmpeg: {e}")))?;
        let stderr_output = stderr_task
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if !status.success() {
            return Err(CollageError::export(format!(
                "ffmpeg exited with {}: {}",
                status,
                stderr_output.trim()
            )));
        }

        if let Some(cb) = &progress {
            cb(ExportProgress::at(ExportStage::Complete, 1.0, plan.total_frames));
        }
        Ok(())
    }
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for FfmpegBackend {
    fn render(&mut self, job: &ExportJob, progress: Option<ProgressCallback>) -> CollageResult<()> {
        let started = std::time::Instant::now();
        let placements = compose(&job.layout, &job.state, &job.canvas, job.mode)?;

        std::fs::create_dir_all(&job.cache_dir)?;
        let backdrop = rasterize(&placements, &job.canvas, job.pixel_ratio)?;
        let backdrop_path = job
            .cache_dir
            .join(format!("backdrop-{}.png", unix_millis()));
        std::fs::write(&backdrop_path, encode_png(&backdrop)?)?;

        let overlays = self.prepare_overlays(job, &placements)?;
        tracing::info!(
            videos = overlays.len(),
            cells = ?overlays.iter().map(|o| o.cell_id.as_str()).collect::<Vec<_>>(),
            "Export inputs prepared"
        );

        if let Some(cb) = &progress {
            cb(ExportProgress::at(
                ExportStage::Preparing,
                0.0,
                job.video.total_frames(),
            ));
        }

        let plan = self.build_plan(job, &backdrop_path, &overlays);
        let result = self.run_ffmpeg(&plan, progress);

        // Scratch files are only useful for one run.
        std::fs::remove_file(&backdrop_path).ok();
        for overlay in &overlays {
            if overlay.source.starts_with(&job.cache_dir) {
                std::fs::remove_file(&overlay.source).ok();
            }
        }

        result?;
        tracing::info!(
            elapsed_secs = started.elapsed().as_secs_f64(),
            "Video export finished"
        );
        Ok(())
    }

    fn is_available(&self) -> bool {
        command_exists("ffmpeg")
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Chain every overlay onto the backdrop (input 0).
///
/// Each video is scaled to cover its cell times zoom×scale, rotated,
/// padded with transparency so panning never runs off the frame, then
/// cropped to the cell and placed at the cell's origin.
fn build_filter_graph(overlays: &[VideoOverlay], pixel_ratio: f64) -> String {
    let mut chains = vec!["[0:v]format=rgba[bg0]".to_string()];

    for (i, overlay) in overlays.iter().enumerate() {
        let input = i + 1;
        let rect = overlay.rect;
        let cell_w = rect.width.round().max(2.0) as i64;
        let cell_h = rect.height.round().max(2.0) as i64;
        let magnification = overlay.transform.magnification();
        let target_w = (cell_w as f64 * magnification).ceil().max(2.0) as i64;
        let target_h = (cell_h as f64 * magnification).ceil().max(2.0) as i64;
        let offset_x = overlay.transform.offset_x * pixel_ratio;
        let offset_y = overlay.transform.offset_y * pixel_ratio;

        let mut filters = vec![
            format!("scale=w={target_w}:h={target_h}:force_original_aspect_ratio=increase"),
            "setsar=1".to_string(),
            "format=rgba".to_string(),
        ];
        let rotation = overlay.transform.display_rotation();
        if rotation.abs() > f64::EPSILON {
            let radians = rotation.to_radians();
            filters.push(format!(
                "rotate={radians:.6}:c=none:ow=rotw({radians:.6}):oh=roth({radians:.6})"
            ));
        }
        filters.push(format!(
            "pad=w=iw+{pw}:h=ih+{ph}:x={cell_w}:y={cell_h}:color=black@0",
            pw = 2 * cell_w,
            ph = 2 * cell_h
        ));
        filters.push(format!(
            "crop=w={cell_w}:h={cell_h}:x=(iw/2)-({offset_x:.2})-{half_w}:y=(ih/2)-({offset_y:.2})-{half_h}",
            half_w = cell_w as f64 / 2.0,
            half_h = cell_h as f64 / 2.0,
        ));

        chains.push(format!("[{input}:v]{}[ov{input}]", filters.join(",")));
        chains.push(format!(
            "[bg{i}][ov{input}]overlay=x={x}:y={y}:eof_action=repeat[bg{input}]",
            x = rect.x.round() as i64,
            y = rect.y.round() as i64,
        ));
    }

    chains.push(format!(
        "[bg{}]scale=trunc(iw/2)*2:trunc(ih/2)*2,format=yuv420p[out]",
        overlays.len()
    ));
    chains.join(";")
}

fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[derive(Debug, Default)]
struct ProgressState {
    out_time_secs: f64,
    complete: bool,
}

impl ProgressState {
    fn update(&mut self, key: &str, value: &str) {
        match key {
            // ffmpeg reports microseconds under both names.
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }
}

fn progress_report(
    state: &ProgressState,
    total_frames: u64,
    expected_duration_secs: f64,
    elapsed_secs: f64,
) -> ExportProgress {
    let progress = if expected_duration_secs <= 0.0 {
        0.0
    } else {
        (state.out_time_secs / expected_duration_secs).clamp(0.0, 1.0)
    };

    let eta_secs = if progress > 0.0 {
        (elapsed_secs / progress) - elapsed_secs
    } else {
        0.0
    }
    .max(0.0);

    ExportProgress {
        progress: if state.complete { 1.0 } else { progress },
        frames_rendered: (progress * total_frames as f64).round() as u64,
        total_frames,
        eta_secs,
        stage: if state.complete {
            ExportStage::Finalizing
        } else {
            ExportStage::Rendering
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collage_layout::default_layouts;

    use crate::raster::output_size;

    fn job_for(state: CompositionState, dir: &Path) -> ExportJob {
        let layout = default_layouts().remove(0);
        ExportJob::new(
            layout,
            state,
            PlacementMode::Grid,
            Canvas::new(100.0, 100.0, "#ffffff"),
            dir,
        )
    }

    #[test]
    fn test_format_follows_mapped_media() {
        let mut state = CompositionState::new();
        let video = state.append_media(MediaItem::video("clip.webm"));
        let layout = default_layouts().remove(0);
        assert_eq!(ExportFormat::for_layout(&layout, &state), ExportFormat::Png);
        state.set_media("cell1", video).unwrap();
        assert_eq!(ExportFormat::for_layout(&layout, &state), ExportFormat::Webm);
    }

    #[test]
    fn test_video_outside_layout_keeps_png() {
        let mut state = CompositionState::new();
        let video = state.append_media(MediaItem::video("clip.webm"));
        state.set_media("cell5", video).unwrap();
        assert!(state.has_video());

        let two_by_two = default_layouts().remove(0);
        assert!(!two_by_two.has_cell("cell5"));
        assert_eq!(ExportFormat::for_layout(&two_by_two, &state), ExportFormat::Png);

        let job = job_for(state, Path::new("/out"));
        assert_eq!(job.format, ExportFormat::Png);
        assert!(job.output_path.to_string_lossy().ends_with(".png"));
    }

    #[test]
    fn test_unused_output_path_adds_suffix_on_collision() {
        let dir = std::env::temp_dir().join("collage_test_unused_output_path");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let path = dir.join("collage-42.png");
        assert_eq!(unused_output_path(&path), path);

        std::fs::write(&path, b"first").unwrap();
        assert_eq!(unused_output_path(&path), dir.join("collage-42-2.png"));

        std::fs::write(dir.join("collage-42-2.png"), b"second").unwrap();
        assert_eq!(unused_output_path(&path), dir.join("collage-42-3.png"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_export_filename_pattern() {
        assert_eq!(
            export_filename(ExportFormat::Png, 1_700_000_000_123),
            "collage-1700000000123.png"
        );
        assert_eq!(export_filename(ExportFormat::Webm, 5), "collage-5.webm");

        let job = job_for(CompositionState::new(), Path::new("/out"));
        let name = job.output_path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("collage-") && name.ends_with(".png"));
        let stamp = &name["collage-".len()..name.len() - ".png".len()];
        assert!(stamp.parse::<i64>().is_ok());
    }

    #[test]
    fn test_gate_rejects_second_export_until_released() {
        let gate = ExportGate::new();
        let permit = gate.try_acquire().unwrap();
        assert!(gate.is_busy());
        assert!(matches!(
            gate.clone().try_acquire(),
            Err(CollageError::ExportInProgress)
        ));
        drop(permit);
        assert!(!gate.is_busy());
        assert!(gate.try_acquire().is_ok());
    }

    #[test]
    fn test_progress_report_clamps() {
        let state = ProgressState {
            out_time_secs: 10.0,
            complete: false,
        };
        let report = progress_report(&state, 150, 5.0, 2.0);
        assert_eq!(report.progress, 1.0);
        assert_eq!(report.frames_rendered, 150);
        assert_eq!(report.stage, ExportStage::Rendering);
    }

    #[test]
    fn test_filter_graph_overlays_each_video() {
        let overlays = vec![
            VideoOverlay {
                cell_id: "cell1".into(),
                source: PathBuf::from("/a.webm"),
                rect: Rect::new(0.0, 0.0, 200.0, 100.0),
                transform: Transform::default(),
            },
            VideoOverlay {
                cell_id: "cell2".into(),
                source: PathBuf::from("/b.mp4"),
                rect: Rect::new(210.0, 0.0, 200.0, 100.0),
                transform: Transform {
                    rotation: 90.0,
                    offset_x: -5.0,
                    ..Transform::default()
                },
            },
        ];
        let graph = build_filter_graph(&overlays, 2.0);
        assert!(graph.starts_with("[0:v]format=rgba[bg0]"));
        assert!(graph.contains("[1:v]scale=w=200:h=100:force_original_aspect_ratio=increase"));
        assert!(graph.contains("[bg0][ov1]overlay=x=0:y=0"));
        assert!(graph.contains("[bg1][ov2]overlay=x=210:y=0"));
        assert!(graph.contains("rotate=1.570796"));
        assert!(graph.contains("x=(iw/2)-(-10.00)-100"));
        assert!(graph.ends_with("[bg2]scale=trunc(iw/2)*2:trunc(ih/2)*2,format=yuv420p[out]"));
        assert_eq!(graph.matches("rotate=").count(), 1);
    }

    #[test]
    fn test_plan_uses_vp9_without_audio() {
        let mut state = CompositionState::new();
        let video = state.append_media(MediaItem::video("/clips/a.webm"));
        state.set_media("cell1", video).unwrap();
        let job = job_for(state, Path::new("/out")).with_video(VideoSettings {
            duration_secs: 2.0,
            fps: 24,
        });
        let overlays = vec![VideoOverlay {
            cell_id: "cell1".into(),
            source: PathBuf::from("/clips/a.webm"),
            rect: Rect::new(0.0, 0.0, 92.0, 92.0),
            transform: Transform::default(),
        }];

        let plan = FfmpegBackend::new().build_plan(&job, Path::new("/tmp/bg.png"), &overlays);
        let args = plan.ffmpeg_args.join(" ");
        assert!(args.contains("-loop 1 -framerate 24 -t 2.000 -i /tmp/bg.png"));
        assert!(args.contains("-stream_loop -1 -t 2.000 -i /clips/a.webm"));
        assert!(args.contains("-an -c:v libvpx-vp9"));
        assert!(args.ends_with(&job.output_path.display().to_string()));
        assert_eq!(plan.total_frames, 48);
    }

    #[tokio::test]
    async fn test_png_export_writes_scaled_image() {
        let dir = std::env::temp_dir().join("collage_test_png_export");
        let _ = std::fs::remove_dir_all(&dir);

        let mut state = CompositionState::new();
        state.update_background_color("cell1", "#ff0000");
        let job = job_for(state, &dir);
        assert_eq!(job.format, ExportFormat::Png);
        assert_eq!(output_size(&job.canvas, job.pixel_ratio), (200, 200));

        let path = export_collage(job, None).await.unwrap();
        assert!(path.starts_with(&dir));
        let written = image::open(&path).unwrap().to_rgba8();
        assert_eq!(written.dimensions(), (200, 200));
        assert_eq!(written.get_pixel(10, 10).0, [255, 0, 0, 255]);

        std::fs::remove_dir_all(&dir).ok();
    }
}
