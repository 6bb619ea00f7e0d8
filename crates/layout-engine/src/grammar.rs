//! Area grammar parsing.
//!
//! A layout's `areas` text is a list of rows, one per line, each optionally
//! wrapped in `"` or `'` quotes:
//!
//! ```text
//! "hero hero side"
//! "hero hero foot"
//! ```
//!
//! Rows are split on whitespace and every row must have the same number of
//! tokens. Within a token, each run of `[A-Za-z0-9_]` names a cell and any
//! other character is ignored: `a-b` places both `a` and `b` in that slot,
//! while a token with no such run (such as `.`) is an anonymous slot that
//! occupies a track but never becomes a cell.

use std::collections::HashSet;

use crate::error::LayoutError;

/// A parsed, rectangular area grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaGrid {
    rows: Vec<Vec<String>>,
}

/// Inclusive bounding box of a cell within an [`AreaGrid`], in tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSpan {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl CellSpan {
    /// Number of rows covered.
    pub fn row_span(&self) -> usize {
        self.row_end - self.row_start + 1
    }

    /// Number of columns covered.
    pub fn col_span(&self) -> usize {
        self.col_end - self.col_start + 1
    }
}

impl AreaGrid {
    /// Parse area grammar text into a grid.
    ///
    /// The whole input is validated before anything is returned.
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        let rows: Vec<Vec<String>> = text
            .lines()
            .map(strip_quotes)
            .filter(|line| !line.is_empty())
            .map(|line| line.split_whitespace().map(str::to_string).collect())
            .collect();

        let Some(first) = rows.first() else {
            return Err(LayoutError::EmptyInput);
        };

        let expected = first.len();
        if let Some((row, found)) = rows
            .iter()
            .enumerate()
            .map(|(i, r)| (i, r.len()))
            .find(|(_, len)| *len != expected)
        {
            return Err(LayoutError::RaggedRows {
                row,
                expected,
                found,
            });
        }

        Ok(Self { rows })
    }

    /// The token matrix, row-major.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of row tracks.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of column tracks.
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Unique cell ids in first-seen, row-major order.
    pub fn cell_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut cells = Vec::new();
        for name in self.rows.iter().flatten().flat_map(|t| cell_names(t)) {
            if seen.insert(name) {
                cells.push(name.to_string());
            }
        }
        cells
    }

    /// Whether `cell_id` names a cell in this grid.
    pub fn contains(&self, cell_id: &str) -> bool {
        is_cell_name(cell_id) && self.rows.iter().flatten().any(|t| names_cell(t, cell_id))
    }

    /// Minimal bounding box of every slot holding `cell_id`.
    ///
    /// Returns `None` when the cell does not appear in the grid.
    pub fn span_of(&self, cell_id: &str) -> Option<CellSpan> {
        if !is_cell_name(cell_id) {
            return None;
        }

        let mut span: Option<CellSpan> = None;
        for (r, row) in self.rows.iter().enumerate() {
            for (c, token) in row.iter().enumerate() {
                if !names_cell(token, cell_id) {
                    continue;
                }
                span = Some(match span {
                    None => CellSpan {
                        row_start: r,
                        row_end: r,
                        col_start: c,
                        col_end: c,
                    },
                    Some(s) => CellSpan {
                        row_start: s.row_start.min(r),
                        row_end: s.row_end.max(r),
                        col_start: s.col_start.min(c),
                        col_end: s.col_end.max(c),
                    },
                });
            }
        }
        span
    }

    /// Render the grid back to canonical grammar text, one quoted row per line.
    pub fn to_areas_string(&self) -> String {
        self.rows
            .iter()
            .map(|row| format!("\"{}\"", row.join(" ")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Whether a token is a valid cell name (`[A-Za-z0-9_]+`).
pub fn is_cell_name(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// The cell names inside one token, in order.
pub fn cell_names(token: &str) -> impl Iterator<Item = &str> {
    token
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|run| !run.is_empty())
}

fn names_cell(token: &str, cell_id: &str) -> bool {
    cell_names(token).any(|name| name == cell_id)
}

/// Trim a line and drop the quote characters around it.
fn strip_quotes(line: &str) -> &str {
    line.trim()
        .trim_start_matches(['"', '\''])
        .trim_end_matches(['"', '\''])
        .trim()
}
