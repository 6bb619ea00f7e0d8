//! The named layout record.
//!
//! `areas` is the source of truth; `cells` is derived from it and kept in
//! sync by every mutating method here.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::geometry::{resolve_cell_rect, Rect};
use crate::grammar::AreaGrid;

/// Gap between tracks when a layout does not specify one.
pub const DEFAULT_GAP: u32 = 8;

fn default_gap() -> u32 {
    DEFAULT_GAP
}

/// A named grid template plus its derived cell set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    /// Unique identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Area grammar text.
    pub areas: String,

    /// Cells in first-seen order.
    #[serde(default)]
    pub cells: Vec<CellRef>,

    /// Gap between tracks in pixels.
    #[serde(default = "default_gap")]
    pub gap: u32,

    /// Whether the layout was created by the user.
    #[serde(default)]
    pub is_custom: bool,
}

/// A cell entry in a layout's registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub id: String,
}

impl Layout {
    /// Build a layout from grammar text, deriving its cells.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        areas: impl Into<String>,
        gap: u32,
    ) -> Result<Self, LayoutError> {
        let areas = areas.into();
        let grid = AreaGrid::parse(&areas)?;
        Ok(Self {
            id: id.into(),
            name: name.into(),
            areas,
            cells: cell_refs(&grid),
            gap,
            is_custom: false,
        })
    }

    /// Build a user-defined layout. The name must not be blank.
    pub fn custom(
        id: impl Into<String>,
        name: impl Into<String>,
        areas: impl Into<String>,
        gap: u32,
    ) -> Result<Self, LayoutError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LayoutError::MissingName);
        }
        let mut layout = Self::new(id, name.trim(), areas, gap)?;
        layout.is_custom = true;
        Ok(layout)
    }

    /// Parse this layout's areas.
    pub fn grid(&self) -> Result<AreaGrid, LayoutError> {
        AreaGrid::parse(&self.areas)
    }

    /// Replace the areas text. On error the layout is left untouched.
    pub fn set_areas(&mut self, areas: impl Into<String>) -> Result<(), LayoutError> {
        let areas = areas.into();
        let grid = AreaGrid::parse(&areas)?;
        self.cells = cell_refs(&grid);
        self.areas = areas;
        Ok(())
    }

    /// Re-derive `cells` from `areas`. Returns whether anything changed.
    pub fn refresh_cells(&mut self) -> Result<bool, LayoutError> {
        let derived = cell_refs(&self.grid()?);
        if derived == self.cells {
            return Ok(false);
        }
        tracing::debug!(
            layout = %self.id,
            stored = self.cells.len(),
            derived = derived.len(),
            "Cell registry out of sync with areas; re-derived"
        );
        self.cells = derived;
        Ok(true)
    }

    /// Check that the layout is usable: named and parseable.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.name.trim().is_empty() {
            return Err(LayoutError::MissingName);
        }
        self.grid()?;
        Ok(())
    }

    /// Cell ids in registry order.
    pub fn cell_ids(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|c| c.id.as_str())
    }

    pub fn has_cell(&self, cell_id: &str) -> bool {
        self.cells.iter().any(|c| c.id == cell_id)
    }

    /// Resolve a cell's pixel rectangle using this layout's own gap.
    ///
    /// `None` when the cell is absent or the areas no longer parse.
    pub fn resolve_cell_rect(
        &self,
        cell_id: &str,
        canvas_width: f64,
        canvas_height: f64,
    ) -> Option<Rect> {
        let grid = self.grid().ok()?;
        resolve_cell_rect(
            cell_id,
            &grid,
            canvas_width,
            canvas_height,
            self.gap as f64,
        )
    }
}

fn cell_refs(grid: &AreaGrid) -> Vec<CellRef> {
    grid.cell_ids()
        .into_iter()
        .map(|id| CellRef { id })
        .collect()
}
