//! Cell compositor: turns a layout plus composition state into an ordered
//! list of placements ready for painting.

use collage_layout::geometry::resolve_all;
use collage_layout::{Layout, LayoutError, Rect};
use collage_project_model::{CompositionState, MediaItem, Transform};
use serde::{Deserialize, Serialize};

/// How cells are positioned on the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementMode {
    /// Each cell fills its grid area; stacking follows registry order.
    #[default]
    Grid,
    /// Each cell uses its percentage rectangle inside its grid area and
    /// is stacked by z-index.
    FreeFlow,
}

/// Logical canvas the placements are resolved against.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    /// Hex color behind every cell without its own override.
    pub background: String,
}

impl Canvas {
    pub fn new(width: f64, height: f64, background: impl Into<String>) -> Self {
        Self {
            width,
            height,
            background: background.into(),
        }
    }
}

/// A single cell's paint instructions.
#[derive(Debug, Clone, PartialEq)]
pub struct CellPlacement {
    pub cell_id: String,

    /// Rectangle in logical canvas pixels.
    pub rect: Rect,

    /// Hex background color (cell override or canvas background).
    pub background: String,

    /// Media shown in the cell.
    pub media: Option<MediaItem>,

    pub transform: Transform,

    pub z_index: u32,
}

impl CellPlacement {
    pub fn has_video(&self) -> bool {
        self.media.as_ref().is_some_and(MediaItem::is_video)
    }
}

/// Compute placements for every cell in `layout`, in paint order.
pub fn compose(
    layout: &Layout,
    state: &CompositionState,
    canvas: &Canvas,
    mode: PlacementMode,
) -> Result<Vec<CellPlacement>, LayoutError> {
    let grid = layout.grid()?;
    let mut placements: Vec<CellPlacement> =
        resolve_all(&grid, canvas.width, canvas.height, layout.gap as f64)
            .into_iter()
            .map(|(cell_id, grid_rect)| {
                let rect = match mode {
                    PlacementMode::Grid => grid_rect,
                    PlacementMode::FreeFlow => state.grid_percentage(&cell_id).resolve(&grid_rect),
                };
                CellPlacement {
                    rect,
                    background: state
                        .background_color(&cell_id)
                        .unwrap_or(&canvas.background)
                        .to_string(),
                    media: state.media_for(&cell_id).cloned(),
                    transform: state.transform(&cell_id),
                    z_index: state.z_index(&cell_id),
                    cell_id,
                }
            })
            .collect();

    if mode == PlacementMode::FreeFlow {
        // Stable: equal z keeps registry order.
        placements.sort_by_key(|p| p.z_index);
    }

    tracing::debug!(
        layout = %layout.id,
        cells = placements.len(),
        mode = ?mode,
        "Composed placements"
    );
    Ok(placements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use collage_project_model::GridPercentagePatch;

    fn canvas() -> Canvas {
        Canvas::new(900.0, 600.0, "#ffffff")
    }

    fn layout() -> Layout {
        Layout::new("t", "T", "\"a a b\"\n\"a a c\"", 0).unwrap()
    }

    #[test]
    fn test_grid_mode_uses_grid_rects_in_registry_order() {
        let mut state = CompositionState::new();
        state.update_z_index("a", 5);
        let placements = compose(&layout(), &state, &canvas(), PlacementMode::Grid).unwrap();

        let ids: Vec<_> = placements.iter().map(|p| p.cell_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(placements[0].rect, Rect::new(0.0, 0.0, 600.0, 600.0));
        assert_eq!(placements[2].rect, Rect::new(600.0, 300.0, 300.0, 300.0));
    }

    #[test]
    fn test_free_flow_resolves_percentages_and_sorts_by_z() {
        let mut state = CompositionState::new();
        state.update_grid_percentage(
            "b",
            &GridPercentagePatch {
                width: Some(50.0),
                offset_x: Some(-100.0),
                ..Default::default()
            },
        );
        state.update_z_index("a", 2);
        state.update_z_index("c", 1);

        let placements = compose(&layout(), &state, &canvas(), PlacementMode::FreeFlow).unwrap();
        let ids: Vec<_> = placements.iter().map(|p| p.cell_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
        assert_eq!(placements[0].rect, Rect::new(300.0, 0.0, 150.0, 300.0));
    }

    #[test]
    fn test_default_free_flow_equals_grid() {
        let state = CompositionState::new();
        let grid = compose(&layout(), &state, &canvas(), PlacementMode::Grid).unwrap();
        let free = compose(&layout(), &state, &canvas(), PlacementMode::FreeFlow).unwrap();
        assert_eq!(grid, free);
    }

    #[test]
    fn test_background_and_media_resolution() {
        let mut state = CompositionState::new();
        let video = state.append_media(MediaItem::video("clip.webm"));
        state.set_media("b", video).unwrap();
        state.update_background_color("c", "#ff0000");

        let placements = compose(&layout(), &state, &canvas(), PlacementMode::Grid).unwrap();
        assert_eq!(placements[0].background, "#ffffff");
        assert_eq!(placements[2].background, "#ff0000");
        assert!(placements[1].has_video());
        assert!(placements[0].media.is_none());
    }

    #[test]
    fn test_unparseable_layout_is_an_error() {
        let mut broken = layout();
        broken.areas = String::new();
        assert!(compose(&broken, &CompositionState::new(), &canvas(), PlacementMode::Grid).is_err());
    }
}
