//! The editor controller.
//!
//! Owns the layout list, the composition state and the store they persist
//! to. Every mutation goes through a method here so the cell registry,
//! the media index map and the persisted copy stay consistent.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use collage_common::{unix_millis, CollageError, CollageResult};
use collage_layout::{default_layouts, Layout, LayoutError};
use collage_project_model::{
    CompositionState, GridPercentage, GridPercentagePatch, MediaItem, Transform, TransformPatch,
};
use collage_render_engine::{
    export_collage, ExportGate, ExportJob, PlacementMode, ProgressCallback,
};
use collage_storage::{
    load_composition, load_custom_layouts, save_composition, save_custom_layouts, KeyValueStore,
    MediaBlobStore,
};

use crate::import::read_media_files;
use crate::settings::EditorSettings;

/// Smallest view zoom, in percent.
pub const MIN_VIEW_ZOOM: u32 = 10;

/// Largest view zoom, in percent.
pub const MAX_VIEW_ZOOM: u32 = 200;

/// A collage editing session.
pub struct Editor<S: KeyValueStore> {
    store: S,
    blobs: Option<MediaBlobStore>,
    settings: EditorSettings,

    layouts: Vec<Layout>,
    selected_layout: String,
    layout_error: Option<String>,

    state: CompositionState,
    selected_cell: Option<String>,
    free_flow: bool,
    view_zoom: u32,

    export_gate: ExportGate,
    notifications: Mutex<Vec<String>>,
}

impl<S: KeyValueStore> Editor<S> {
    /// Open a session: built-in layouts first, then persisted custom
    /// layouts, then the persisted composition.
    ///
    /// Unreadable persisted state is logged and replaced by an empty
    /// default; opening never fails because of it.
    pub fn open(store: S, settings: EditorSettings) -> Self {
        let mut layouts = default_layouts();
        match load_custom_layouts(&store) {
            Ok(custom) => {
                for layout in custom {
                    if layouts.iter().any(|l| l.id == layout.id) {
                        tracing::warn!(layout = %layout.id, "Skipping custom layout with duplicate id");
                        continue;
                    }
                    layouts.push(layout);
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to load custom layouts; using built-ins"),
        }

        let state = match load_composition(&store) {
            Ok(Some(state)) => state,
            Ok(None) => CompositionState::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load composition state; starting empty");
                CompositionState::new()
            }
        };

        let selected_layout = layouts.first().map(|l| l.id.clone()).unwrap_or_default();
        tracing::info!(
            layouts = layouts.len(),
            media = state.media().len(),
            "Editor opened"
        );

        Self {
            store,
            blobs: None,
            settings,
            layouts,
            selected_layout,
            layout_error: None,
            state,
            selected_cell: None,
            free_flow: false,
            view_zoom: 100,
            export_gate: ExportGate::new(),
            notifications: Mutex::new(Vec::new()),
        }
    }

    /// Attach a media blob store. When the composition has no media of its
    /// own, the stored media is restored from it.
    pub fn with_media_store(mut self, blobs: MediaBlobStore) -> Self {
        if self.state.media().is_empty() {
            match blobs.get_all() {
                Ok(items) => {
                    for item in items {
                        self.state.append_media(item);
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Failed to restore media blobs"),
            }
        }
        self.blobs = Some(blobs);
        self
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn state(&self) -> &CompositionState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Layouts ─────────────────────────────────────────────────────────

    /// Built-ins followed by custom layouts.
    pub fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    pub fn layout(&self, id: &str) -> Option<&Layout> {
        self.layouts.iter().find(|l| l.id == id)
    }

    pub fn selected_layout(&self) -> &Layout {
        &self.layouts[self.selected_index()]
    }

    /// Make `id` the current layout.
    pub fn select_layout(&mut self, id: &str) -> Result<(), LayoutError> {
        if self.layout(id).is_none() {
            return Err(LayoutError::UnknownLayout { id: id.to_string() });
        }
        self.selected_layout = id.to_string();
        self.layout_error = None;
        self.drop_stale_selection();
        tracing::debug!(layout = id, "Layout selected");
        Ok(())
    }

    /// Replace the current layout's areas.
    ///
    /// On a grammar error the last known-good layout stays in effect and
    /// the message is kept in [`Editor::layout_error`].
    pub fn edit_layout_areas(&mut self, areas: &str) -> CollageResult<()> {
        let index = self.selected_index();
        let result = self.layouts[index].set_areas(areas);
        match result {
            Ok(()) => {
                self.layout_error = None;
                self.drop_stale_selection();
                if self.layouts[index].is_custom {
                    self.persist_layouts()?;
                }
                Ok(())
            }
            Err(e) => {
                tracing::debug!(error = %e, "Rejected layout areas; keeping last good layout");
                self.layout_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// The message of the last rejected areas edit, if any.
    pub fn layout_error(&self) -> Option<&str> {
        self.layout_error.as_deref()
    }

    /// Add and persist a user-defined layout; returns its generated id.
    pub fn add_custom_layout(&mut self, name: &str, areas: &str, gap: u32) -> CollageResult<String> {
        let id = self.fresh_layout_id();
        let layout = Layout::custom(id.clone(), name, areas, gap)?;
        self.layouts.push(layout);
        self.persist_layouts()?;
        tracing::info!(layout = %id, "Custom layout added");
        Ok(id)
    }

    /// Replace a custom layout's name, areas and gap. Built-ins are
    /// read-only.
    pub fn update_custom_layout(
        &mut self,
        id: &str,
        name: &str,
        areas: &str,
        gap: u32,
    ) -> CollageResult<()> {
        let index = self.custom_index(id)?;
        self.layouts[index] = Layout::custom(id, name, areas, gap)?;
        if self.selected_layout == id {
            self.layout_error = None;
            self.drop_stale_selection();
        }
        self.persist_layouts()?;
        tracing::info!(layout = id, "Custom layout updated");
        Ok(())
    }

    /// Delete a custom layout. Deleting the current layout selects the
    /// first one.
    pub fn delete_custom_layout(&mut self, id: &str) -> CollageResult<()> {
        let index = self.custom_index(id)?;
        self.layouts.remove(index);
        if self.selected_layout == id {
            let first = self.layouts[0].id.clone();
            self.select_layout(&first)?;
        }
        self.persist_layouts()?;
        tracing::info!(layout = id, "Custom layout deleted");
        Ok(())
    }

    /// Set the current layout's gap in pixels.
    pub fn set_gap(&mut self, gap: u32) -> CollageResult<()> {
        let index = self.selected_index();
        self.layouts[index].gap = gap;
        if self.layouts[index].is_custom {
            self.persist_layouts()?;
        }
        Ok(())
    }

    // ── View ────────────────────────────────────────────────────────────

    pub fn is_free_flow(&self) -> bool {
        self.free_flow
    }

    pub fn set_free_flow(&mut self, free_flow: bool) {
        self.free_flow = free_flow;
    }

    pub fn placement_mode(&self) -> PlacementMode {
        if self.free_flow {
            PlacementMode::FreeFlow
        } else {
            PlacementMode::Grid
        }
    }

    /// Canvas background color.
    pub fn background_color(&self) -> &str {
        &self.settings.canvas.background
    }

    pub fn set_background_color(&mut self, color: impl Into<String>) {
        self.settings.canvas.background = color.into();
    }

    /// View zoom in percent.
    pub fn view_zoom(&self) -> u32 {
        self.view_zoom
    }

    /// Set the view zoom, clamped to 10–200 percent. Returns the value set.
    pub fn set_view_zoom(&mut self, percent: u32) -> u32 {
        self.view_zoom = percent.clamp(MIN_VIEW_ZOOM, MAX_VIEW_ZOOM);
        self.view_zoom
    }

    // ── Cells ───────────────────────────────────────────────────────────

    pub fn selected_cell(&self) -> Option<&str> {
        self.selected_cell.as_deref()
    }

    /// Select a cell of the current layout, or clear the selection.
    pub fn select_cell(&mut self, cell_id: Option<&str>) -> CollageResult<()> {
        if let Some(id) = cell_id {
            self.require_cell(id)?;
        }
        self.selected_cell = cell_id.map(str::to_string);
        Ok(())
    }

    /// Show media `index` in the selected cell. Returns `false` when no
    /// cell is selected.
    pub fn assign_media(&mut self, index: usize) -> CollageResult<bool> {
        let Some(cell) = self.selected_cell.clone() else {
            return Ok(false);
        };
        self.state.set_media(&cell, index)?;
        Ok(true)
    }

    /// Show media `index` in `cell_id`.
    pub fn set_media(&mut self, cell_id: &str, index: usize) -> CollageResult<()> {
        self.require_cell(cell_id)?;
        self.state.set_media(cell_id, index)?;
        Ok(())
    }

    pub fn clear_media(&mut self, cell_id: &str) -> Option<usize> {
        self.state.clear_media(cell_id)
    }

    pub fn update_transform(&mut self, cell_id: &str, patch: &TransformPatch) -> Transform {
        self.state.update_transform(cell_id, patch)
    }

    pub fn update_background_color(&mut self, cell_id: &str, color: impl Into<String>) {
        self.state.update_background_color(cell_id, color);
    }

    pub fn update_grid_percentage(
        &mut self,
        cell_id: &str,
        patch: &GridPercentagePatch,
    ) -> GridPercentage {
        self.state.update_grid_percentage(cell_id, patch)
    }

    pub fn update_z_index(&mut self, cell_id: &str, z: u32) {
        self.state.update_z_index(cell_id, z);
    }

    // ── Media ───────────────────────────────────────────────────────────

    /// Read `paths` concurrently and append each item as its read
    /// completes. Returns the new indices in append order.
    pub async fn import_media(&mut self, paths: Vec<PathBuf>) -> Vec<usize> {
        let requested = paths.len();
        let indices: Vec<usize> = read_media_files(paths)
            .await
            .into_iter()
            .map(|item| self.state.append_media(item))
            .collect();
        tracing::info!(requested, imported = indices.len(), "Media imported");
        indices
    }

    /// Append an already-built media item.
    pub fn append_media(&mut self, item: MediaItem) -> usize {
        self.state.append_media(item)
    }

    /// Delete media `index`, shifting later cell references down.
    pub fn delete_media(&mut self, index: usize) -> CollageResult<MediaItem> {
        Ok(self.state.delete_media_item(index)?)
    }

    // ── Export ──────────────────────────────────────────────────────────

    /// Build the export job for the current session without running it.
    pub fn export_job(&self, output_dir: impl AsRef<Path>) -> ExportJob {
        ExportJob::new(
            self.selected_layout().clone(),
            self.state.clone(),
            self.placement_mode(),
            self.settings.canvas.clone(),
            output_dir,
        )
        .with_pixel_ratio(self.settings.pixel_ratio)
        .with_video(self.settings.video)
        .with_cache_dir(self.settings.cache_dir.clone())
    }

    /// Export the current collage into `output_dir`.
    ///
    /// Only one export runs at a time; a second call while one is in
    /// flight fails with `ExportInProgress`. Failures are logged and
    /// queued as a notification; editor state is never touched.
    pub async fn export(&self, output_dir: impl AsRef<Path>) -> CollageResult<PathBuf> {
        self.export_with_progress(output_dir, None).await
    }

    /// [`Editor::export`], reporting render progress to `progress`.
    pub async fn export_with_progress(
        &self,
        output_dir: impl AsRef<Path>,
        progress: Option<ProgressCallback>,
    ) -> CollageResult<PathBuf> {
        let result = match self.export_gate.try_acquire() {
            Ok(_permit) => export_collage(self.export_job(output_dir), progress).await,
            Err(e) => Err(e),
        };
        match &result {
            Ok(path) => tracing::info!(path = %path.display(), "Export saved"),
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                self.notify(format!("Export failed: {e}"));
            }
        }
        result
    }

    /// Drain queued user-facing notifications.
    pub fn take_notifications(&self) -> Vec<String> {
        self.notifications
            .lock()
            .map(|mut queue| std::mem::take(&mut *queue))
            .unwrap_or_default()
    }

    // ── Persistence ─────────────────────────────────────────────────────

    /// Persist the composition, the custom layouts and (when attached)
    /// the media blobs.
    pub fn save(&mut self) -> CollageResult<()> {
        save_composition(&mut self.store, &self.state)?;
        self.persist_layouts()?;
        if let Some(blobs) = &self.blobs {
            blobs.put_all(self.state.media())?;
        }
        tracing::debug!("Editor state saved");
        Ok(())
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn selected_index(&self) -> usize {
        self.layouts
            .iter()
            .position(|l| l.id == self.selected_layout)
            .unwrap_or(0)
    }

    fn custom_index(&self, id: &str) -> Result<usize, LayoutError> {
        let index = self
            .layouts
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| LayoutError::UnknownLayout { id: id.to_string() })?;
        if !self.layouts[index].is_custom {
            return Err(LayoutError::NotCustom { id: id.to_string() });
        }
        Ok(index)
    }

    fn fresh_layout_id(&self) -> String {
        let base = format!("custom-{}", unix_millis());
        if self.layout(&base).is_none() {
            return base;
        }
        (2..)
            .map(|n| format!("{base}-{n}"))
            .find(|id| self.layout(id).is_none())
            .unwrap_or(base)
    }

    /// Clear the cell selection when the current layout no longer has it.
    fn drop_stale_selection(&mut self) {
        let stale = self
            .selected_cell
            .as_deref()
            .is_some_and(|cell| !self.selected_layout().has_cell(cell));
        if stale {
            tracing::debug!(cell = ?self.selected_cell, "Dropping selection of removed cell");
            self.selected_cell = None;
        }
    }

    fn require_cell(&self, cell_id: &str) -> CollageResult<()> {
        let layout = self.selected_layout();
        if layout.has_cell(cell_id) {
            Ok(())
        } else {
            Err(CollageError::layout(format!(
                "Cell '{cell_id}' is not part of layout '{}'",
                layout.id
            )))
        }
    }

    fn persist_layouts(&mut self) -> CollageResult<()> {
        save_custom_layouts(&mut self.store, &self.layouts)?;
        Ok(())
    }

    fn notify(&self, message: String) {
        if let Ok(mut queue) = self.notifications.lock() {
            queue.push(message);
        }
    }
}
