//! Pixel geometry for grid cells.
//!
//! All tracks are equal-sized: the canvas minus the gaps is split evenly
//! between columns and between rows. Coordinates are `f64` pixels with the
//! origin at the canvas top-left.

use serde::{Deserialize, Serialize};

use crate::grammar::AreaGrid;

/// An axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Whether a point lies inside (edges inclusive on the top-left only).
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Area shared with another rectangle.
    pub fn overlap_area(&self, other: &Rect) -> f64 {
        let w = (self.right().min(other.right()) - self.x.max(other.x)).max(0.0);
        let h = (self.bottom().min(other.bottom()) - self.y.max(other.y)).max(0.0);
        w * h
    }

    /// Multiply every coordinate by `factor`.
    pub fn scaled(&self, factor: f64) -> Rect {
        Rect::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }

    /// Resolve a percentage rectangle against this one.
    ///
    /// Sizes are percentages of this rectangle's size and offsets move the
    /// origin by a percentage of the same, so `(100, 100, 0, 0)` is identity.
    pub fn percent_rect(
        &self,
        width_pct: f64,
        height_pct: f64,
        offset_x_pct: f64,
        offset_y_pct: f64,
    ) -> Rect {
        Rect {
            x: self.x + self.width * offset_x_pct / 100.0,
            y: self.y + self.height * offset_y_pct / 100.0,
            width: self.width * width_pct / 100.0,
            height: self.height * height_pct / 100.0,
        }
    }
}

/// Size of one uniform track on each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSize {
    pub cell_width: f64,
    pub cell_height: f64,
}

/// Compute the uniform track size for a grid on a canvas.
///
/// Gaps larger than the canvas collapse the tracks to zero instead of going
/// negative.
pub fn track_size(grid: &AreaGrid, canvas_width: f64, canvas_height: f64, gap: f64) -> TrackSize {
    let cols = grid.column_count().max(1) as f64;
    let rows = grid.row_count().max(1) as f64;

    let available_width = (canvas_width - gap * (cols - 1.0)).max(0.0);
    let available_height = (canvas_height - gap * (rows - 1.0)).max(0.0);

    TrackSize {
        cell_width: available_width / cols,
        cell_height: available_height / rows,
    }
}

/// Resolve the pixel rectangle of `cell_id` within `grid`.
///
/// Spanning cells cover the gaps between their tracks. Returns `None` when
/// the cell is not part of the grid; callers treat that as "removed from
/// layout".
pub fn resolve_cell_rect(
    cell_id: &str,
    grid: &AreaGrid,
    canvas_width: f64,
    canvas_height: f64,
    gap: f64,
) -> Option<Rect> {
    let span = grid.span_of(cell_id)?;
    let track = track_size(grid, canvas_width, canvas_height, gap);

    let col_start = span.col_start as f64;
    let row_start = span.row_start as f64;
    let col_gaps = (span.col_end - span.col_start) as f64;
    let row_gaps = (span.row_end - span.row_start) as f64;

    Some(Rect {
        x: col_start * (track.cell_width + gap),
        y: row_start * (track.cell_height + gap),
        width: span.col_span() as f64 * track.cell_width + col_gaps * gap,
        height: span.row_span() as f64 * track.cell_height + row_gaps * gap,
    })
}

/// Resolve every cell of the grid in registry order.
pub fn resolve_all(
    grid: &AreaGrid,
    canvas_width: f64,
    canvas_height: f64,
    gap: f64,
) -> Vec<(String, Rect)> {
    grid.cell_ids()
        .into_iter()
        .filter_map(|id| {
            let rect = resolve_cell_rect(&id, grid, canvas_width, canvas_height, gap)?;
            Some((id, rect))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rect(actual: Rect, expected: (f64, f64, f64, f64)) {
        let (x, y, w, h) = expected;
        assert!(
            (actual.x - x).abs() < 1e-9
                && (actual.y - y).abs() < 1e-9
                && (actual.width - w).abs() < 1e-9
                && (actual.height - h).abs() < 1e-9,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn test_single_cell_fills_canvas() {
        let grid = AreaGrid::parse("\"a\"").unwrap();
        let rect = resolve_cell_rect("a", &grid, 1000.0, 1000.0, 0.0).unwrap();
        assert_rect(rect, (0.0, 0.0, 1000.0, 1000.0));
    }

    #[test]
    fn test_spanning_cells_without_gap() {
        let grid = AreaGrid::parse("\"a a b\"\n\"a a c\"").unwrap();
        assert_rect(
            resolve_cell_rect("a", &grid, 900.0, 600.0, 0.0).unwrap(),
            (0.0, 0.0, 600.0, 600.0),
        );
        assert_rect(
            resolve_cell_rect("b", &grid, 900.0, 600.0, 0.0).unwrap(),
            (600.0, 0.0, 300.0, 300.0),
        );
        assert_rect(
            resolve_cell_rect("c", &grid, 900.0, 600.0, 0.0).unwrap(),
            (600.0, 300.0, 300.0, 300.0),
        );
    }

    #[test]
    fn test_gap_is_covered_by_spans() {
        // 2 columns, gap 8 on 1000px: tracks are 496px.
        let grid = AreaGrid::parse("\"cell1 cell1\"\n\"cell2 cell3\"").unwrap();
        assert_rect(
            resolve_cell_rect("cell1", &grid, 1000.0, 1000.0, 8.0).unwrap(),
            (0.0, 0.0, 1000.0, 496.0),
        );
        assert_rect(
            resolve_cell_rect("cell3", &grid, 1000.0, 1000.0, 8.0).unwrap(),
            (504.0, 504.0, 496.0, 496.0),
        );
    }

    #[test]
    fn test_missing_cell_is_none() {
        let grid = AreaGrid::parse("\"a b\"").unwrap();
        assert!(resolve_cell_rect("z", &grid, 100.0, 100.0, 0.0).is_none());
        assert!(resolve_cell_rect("", &grid, 100.0, 100.0, 0.0).is_none());
    }

    #[test]
    fn test_oversized_gap_collapses_tracks() {
        let grid = AreaGrid::parse("\"a b c\"").unwrap();
        let track = track_size(&grid, 10.0, 10.0, 50.0);
        assert_eq!(track.cell_width, 0.0);
        assert!(track.cell_height > 0.0);
    }

    #[test]
    fn test_resolve_all_in_registry_order() {
        let grid = AreaGrid::parse("\"b a\"\n\"c a\"").unwrap();
        let ids: Vec<_> = resolve_all(&grid, 200.0, 200.0, 0.0)
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_percent_rect_identity_and_offset() {
        let cell = Rect::new(100.0, 50.0, 200.0, 100.0);
        assert_eq!(cell.percent_rect(100.0, 100.0, 0.0, 0.0), cell);

        let moved = cell.percent_rect(50.0, 200.0, -50.0, 10.0);
        assert_rect(moved, (0.0, 60.0, 100.0, 200.0));
    }

    #[test]
    fn test_overlap_area() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let c = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!((a.overlap_area(&b) - 25.0).abs() < 1e-9);
        assert_eq!(a.overlap_area(&c), 0.0);
    }
}
