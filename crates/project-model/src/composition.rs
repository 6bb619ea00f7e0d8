//! Composition state: what each cell shows and how.
//!
//! Cells reference media by position in the media list. Deleting a media
//! item therefore shifts every later reference down by one; that
//! bookkeeping lives here and nowhere else.

use std::collections::BTreeMap;

use collage_common::CollageError;
use serde::{Deserialize, Serialize};

use crate::cell::{GridPercentage, GridPercentagePatch, Transform, TransformPatch};
use crate::media::MediaItem;

/// Everything the editor knows about a collage's content.
///
/// Serialized with the editor's persisted field names; every field is
/// optional on input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompositionState {
    media: Vec<MediaItem>,
    image_transforms: BTreeMap<String, Transform>,
    #[serde(rename = "cellImageMap")]
    cell_media: BTreeMap<String, usize>,
    cell_background_colors: BTreeMap<String, String>,
    grid_percentages: BTreeMap<String, GridPercentage>,
    z_indexes: BTreeMap<String, u32>,
}

/// Errors from composition updates and (de)serialization.
#[derive(Debug, thiserror::Error)]
pub enum CompositionError {
    #[error("Media index {index} is out of range ({len} items)")]
    MediaIndexOutOfRange { index: usize, len: usize },

    #[error("Invalid composition state: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<CompositionError> for CollageError {
    fn from(err: CompositionError) -> Self {
        match err {
            CompositionError::Json(e) => CollageError::Json(e),
            other => CollageError::composition(other.to_string()),
        }
    }
}

impl CompositionState {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Media list ──────────────────────────────────────────────────────

    /// All media items in upload order.
    pub fn media(&self) -> &[MediaItem] {
        &self.media
    }

    /// Append a media item, returning its index.
    pub fn append_media(&mut self, item: MediaItem) -> usize {
        self.media.push(item);
        self.media.len() - 1
    }

    /// Delete the media item at `index`.
    ///
    /// Cells showing it lose their mapping; cells showing a later item are
    /// shifted down by one. Nothing changes if `index` is out of range.
    pub fn delete_media_item(&mut self, index: usize) -> Result<MediaItem, CompositionError> {
        if index >= self.media.len() {
            return Err(CompositionError::MediaIndexOutOfRange {
                index,
                len: self.media.len(),
            });
        }

        let shifted: BTreeMap<String, usize> = self
            .cell_media
            .iter()
            .filter_map(|(cell, &mapped)| match mapped.cmp(&index) {
                std::cmp::Ordering::Less => Some((cell.clone(), mapped)),
                std::cmp::Ordering::Equal => None,
                std::cmp::Ordering::Greater => Some((cell.clone(), mapped - 1)),
            })
            .collect();

        let removed = self.media.remove(index);
        self.cell_media = shifted;
        tracing::debug!(index, remaining = self.media.len(), "Deleted media item");
        Ok(removed)
    }

    // ── Cell → media mapping ────────────────────────────────────────────

    /// Show media item `index` in `cell_id`.
    pub fn set_media(&mut self, cell_id: &str, index: usize) -> Result<(), CompositionError> {
        if index >= self.media.len() {
            return Err(CompositionError::MediaIndexOutOfRange {
                index,
                len: self.media.len(),
            });
        }
        self.cell_media.insert(cell_id.to_string(), index);
        Ok(())
    }

    /// Remove the media from `cell_id`, returning the index it pointed at.
    pub fn clear_media(&mut self, cell_id: &str) -> Option<usize> {
        self.cell_media.remove(cell_id)
    }

    pub fn media_index(&self, cell_id: &str) -> Option<usize> {
        self.cell_media.get(cell_id).copied()
    }

    /// The media item shown in `cell_id`, if any.
    pub fn media_for(&self, cell_id: &str) -> Option<&MediaItem> {
        self.media_index(cell_id).and_then(|i| self.media.get(i))
    }

    /// Cell ids with media assigned, with their indices.
    pub fn mappings(&self) -> impl Iterator<Item = (&str, usize)> {
        self.cell_media.iter().map(|(cell, &i)| (cell.as_str(), i))
    }

    /// Whether any media that is actually shown in a cell is a video.
    pub fn has_video(&self) -> bool {
        self.cell_media
            .values()
            .filter_map(|&i| self.media.get(i))
            .any(MediaItem::is_video)
    }

    // ── Per-cell properties ─────────────────────────────────────────────

    /// The cell's transform, or the default when none was set.
    pub fn transform(&self, cell_id: &str) -> Transform {
        self.image_transforms
            .get(cell_id)
            .copied()
            .unwrap_or_default()
    }

    /// Merge `patch` into the cell's transform and return the result.
    pub fn update_transform(&mut self, cell_id: &str, patch: &TransformPatch) -> Transform {
        let entry = self
            .image_transforms
            .entry(cell_id.to_string())
            .or_default();
        entry.apply(patch);
        *entry
    }

    /// The cell's background color override.
    pub fn background_color(&self, cell_id: &str) -> Option<&str> {
        self.cell_background_colors.get(cell_id).map(String::as_str)
    }

    pub fn update_background_color(&mut self, cell_id: &str, color: impl Into<String>) {
        self.cell_background_colors
            .insert(cell_id.to_string(), color.into());
    }

    /// The cell's free-flow rectangle, or the default when none was set.
    pub fn grid_percentage(&self, cell_id: &str) -> GridPercentage {
        self.grid_percentages
            .get(cell_id)
            .copied()
            .unwrap_or_default()
    }

    /// Merge `patch` into the cell's free-flow rectangle and return the result.
    pub fn update_grid_percentage(
        &mut self,
        cell_id: &str,
        patch: &GridPercentagePatch,
    ) -> GridPercentage {
        let entry = self
            .grid_percentages
            .entry(cell_id.to_string())
            .or_default();
        entry.apply(patch);
        *entry
    }

    /// The cell's stacking order (0 when unset).
    pub fn z_index(&self, cell_id: &str) -> u32 {
        self.z_indexes.get(cell_id).copied().unwrap_or(0)
    }

    pub fn update_z_index(&mut self, cell_id: &str, z: u32) {
        self.z_indexes.insert(cell_id.to_string(), z);
    }

    // ── Persistence ─────────────────────────────────────────────────────

    /// Serialize to a plain JSON value.
    pub fn to_value(&self) -> Result<serde_json::Value, CompositionError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, CompositionError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from a JSON value, filling defaults for missing fields.
    pub fn from_value(value: serde_json::Value) -> Result<Self, CompositionError> {
        let mut state: Self = serde_json::from_value(value)?;
        state.drop_dangling_mappings();
        Ok(state)
    }

    /// Deserialize from a JSON string, filling defaults for missing fields.
    pub fn from_json(json: &str) -> Result<Self, CompositionError> {
        let mut state: Self = serde_json::from_str(json)?;
        state.drop_dangling_mappings();
        Ok(state)
    }

    /// Remove mappings that point past the end of the media list.
    fn drop_dangling_mappings(&mut self) {
        let len = self.media.len();
        let before = self.cell_media.len();
        self.cell_media.retain(|_, index| *index < len);
        let dropped = before - self.cell_media.len();
        if dropped > 0 {
            tracing::warn!(dropped, media = len, "Dropped cell mappings to missing media");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_media(count: usize) -> CompositionState {
        let mut state = CompositionState::new();
        for i in 0..count {
            state.append_media(MediaItem::image(format!("img-{i}.png")));
        }
        state
    }

    #[test]
    fn test_unset_cells_use_defaults() {
        let state = CompositionState::new();
        assert_eq!(state.transform("cell1"), Transform::default());
        assert_eq!(state.grid_percentage("cell1"), GridPercentage::default());
        assert_eq!(state.z_index("cell1"), 0);
        assert!(state.background_color("cell1").is_none());
        assert!(state.media_for("cell1").is_none());
    }

    #[test]
    fn test_partial_updates_merge_over_defaults() {
        let mut state = CompositionState::new();
        let t = state.update_transform(
            "cell1",
            &TransformPatch {
                rotation: Some(30.0),
                ..Default::default()
            },
        );
        assert_eq!(t.rotation, 30.0);
        assert_eq!(t.zoom, 1.0);

        let t = state.update_transform(
            "cell1",
            &TransformPatch {
                zoom: Some(1.5),
                ..Default::default()
            },
        );
        assert_eq!(t.rotation, 30.0);
        assert_eq!(t.zoom, 1.5);

        let g = state.update_grid_percentage(
            "cell2",
            &GridPercentagePatch {
                offset_x: Some(25.0),
                ..Default::default()
            },
        );
        assert_eq!(g.width, 100.0);
        assert_eq!(g.offset_x, 25.0);
    }

    #[test]
    fn test_set_media_rejects_out_of_range() {
        let mut state = state_with_media(2);
        state.set_media("a", 1).unwrap();
        let err = state.set_media("b", 2).unwrap_err();
        assert!(matches!(
            err,
            CompositionError::MediaIndexOutOfRange { index: 2, len: 2 }
        ));
        assert_eq!(state.media_index("b"), None);
    }

    #[test]
    fn test_delete_media_shifts_later_indices() {
        let mut state = state_with_media(5);
        state.set_media("c1", 1).unwrap();
        state.set_media("c2", 2).unwrap();
        state.set_media("c3", 3).unwrap();
        state.set_media("c4", 4).unwrap();

        let removed = state.delete_media_item(2).unwrap();
        assert_eq!(removed, MediaItem::image("img-2.png"));
        assert_eq!(state.media().len(), 4);
        assert_eq!(state.media_index("c1"), Some(1));
        assert_eq!(state.media_index("c2"), None);
        assert_eq!(state.media_index("c3"), Some(2));
        assert_eq!(state.media_index("c4"), Some(3));

        // Shifted mappings still point at the same media.
        assert_eq!(state.media_for("c3").unwrap().url(), "img-3.png");
        assert_eq!(state.media_for("c4").unwrap().url(), "img-4.png");
    }

    #[test]
    fn test_delete_out_of_range_changes_nothing() {
        let mut state = state_with_media(2);
        state.set_media("a", 1).unwrap();
        let before = state.clone();
        assert!(state.delete_media_item(5).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_has_video_only_counts_mapped_media() {
        let mut state = state_with_media(1);
        let video = state.append_media(MediaItem::video("clip.webm"));
        assert!(!state.has_video());

        state.set_media("a", video).unwrap();
        assert!(state.has_video());

        state.clear_media("a");
        assert!(!state.has_video());
    }

    #[test]
    fn test_round_trip() {
        let mut state = state_with_media(2);
        state.set_media("cell1", 1).unwrap();
        state.update_transform(
            "cell1",
            &TransformPatch {
                zoom: Some(1.25),
                border_radius: Some(12.0),
                ..Default::default()
            },
        );
        state.update_background_color("cell2", "#ff0000");
        state.update_grid_percentage(
            "cell2",
            &GridPercentagePatch {
                width: Some(80.0),
                ..Default::default()
            },
        );
        state.update_z_index("cell2", 3);

        let json = state.to_json().unwrap();
        let restored = CompositionState::from_json(&json).unwrap();
        assert_eq!(restored, state);
        assert_eq!(restored.to_json().unwrap(), json);
    }

    #[test]
    fn test_persisted_field_names() {
        let mut state = state_with_media(1);
        state.set_media("cell1", 0).unwrap();
        state.update_z_index("cell1", 2);
        let value = state.to_value().unwrap();
        assert_eq!(value["cellImageMap"]["cell1"], 0);
        assert_eq!(value["zIndexes"]["cell1"], 2);
        assert_eq!(value["media"][0]["type"], "image");
        assert!(value.get("imageTransforms").is_some());
        assert!(value.get("cellBackgroundColors").is_some());
        assert!(value.get("gridPercentages").is_some());
    }

    #[test]
    fn test_missing_fields_behave_like_explicit_defaults() {
        let sparse = CompositionState::from_json(
            r#"{"media":[{"type":"image","url":"a.png"}],"cellImageMap":{"cell1":0},
                "imageTransforms":{"cell1":{"zoom":2}}}"#,
        )
        .unwrap();
        let explicit = CompositionState::from_json(
            r#"{"media":[{"type":"image","url":"a.png"}],"cellImageMap":{"cell1":0},
                "imageTransforms":{"cell1":{"zoom":2,"offsetX":0,"offsetY":0,
                    "rotation":0,"scale":1,"borderRadius":0}},
                "cellBackgroundColors":{},"gridPercentages":{},"zIndexes":{}}"#,
        )
        .unwrap();
        assert_eq!(sparse, explicit);
        assert_eq!(sparse.transform("cell1").zoom, 2.0);
        assert_eq!(CompositionState::from_json("{}").unwrap(), CompositionState::new());
    }

    #[test]
    fn test_dangling_mappings_are_dropped_on_load() {
        let state = CompositionState::from_json(
            r#"{"media":[{"type":"image","url":"a.png"}],"cellImageMap":{"a":0,"b":7}}"#,
        )
        .unwrap();
        assert_eq!(state.media_index("a"), Some(0));
        assert_eq!(state.media_index("b"), None);
    }
}
