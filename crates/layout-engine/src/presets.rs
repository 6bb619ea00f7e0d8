//! Built-in layouts shipped with the editor.

use crate::layout::{Layout, DEFAULT_GAP};

/// (id, name, areas) of every built-in layout, in display order.
const PRESETS: &[(&str, &str, &str)] = &[
    ("2x2", "2x2 Grid", "\"cell1 cell2\"\n\"cell3 cell4\""),
    ("1x3-2x1", "1x3-2x1", "\"cell1 cell1\"\n\"cell2 cell3\""),
    (
        "2x3",
        "2x3",
        "\"cell1 cell2 cell3\"\n\"cell4 cell5 cell6\"",
    ),
    (
        "2x3-alt",
        "2x3 Alt",
        "\"cell1 cell1 cell2\"\n\"cell3 cell4 cell2\"",
    ),
];

/// The built-in layouts. None of them is custom.
pub fn default_layouts() -> Vec<Layout> {
    PRESETS
        .iter()
        .filter_map(|(id, name, areas)| match Layout::new(*id, *name, *areas, DEFAULT_GAP) {
            Ok(layout) => Some(layout),
            Err(e) => {
                tracing::error!(layout = *id, error = %e, "Built-in layout failed to parse");
                None
            }
        })
        .collect()
}

/// Whether `id` belongs to a built-in layout.
pub fn is_builtin(id: &str) -> bool {
    PRESETS.iter().any(|(preset, _, _)| *preset == id)
}
