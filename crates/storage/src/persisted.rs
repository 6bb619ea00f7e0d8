//! Typed load/save of editor state on top of a [`KeyValueStore`].

use collage_layout::Layout;
use collage_project_model::{CompositionError, CompositionState};

use crate::error::StorageError;
use crate::kv::KeyValueStore;

/// Key holding the JSON array of user-defined layouts.
pub const CUSTOM_LAYOUTS_KEY: &str = "customLayouts";

/// Key holding the serialized composition state.
pub const COMPOSITION_KEY: &str = "collageState";

/// Load persisted custom layouts.
///
/// Entries that fail to deserialize or whose areas no longer parse are
/// skipped with a warning. Stored cell lists are re-derived from areas.
pub fn load_custom_layouts(store: &impl KeyValueStore) -> Result<Vec<Layout>, StorageError> {
    let Some(json) = store.get(CUSTOM_LAYOUTS_KEY)? else {
        return Ok(Vec::new());
    };
    let entries: Vec<serde_json::Value> =
        serde_json::from_str(&json).map_err(|e| StorageError::parse(CUSTOM_LAYOUTS_KEY, e))?;

    let mut layouts = Vec::with_capacity(entries.len());
    for (position, entry) in entries.into_iter().enumerate() {
        let mut layout: Layout = match serde_json::from_value(entry) {
            Ok(layout) => layout,
            Err(e) => {
                tracing::warn!(position, error = %e, "Skipping malformed custom layout");
                continue;
            }
        };
        if let Err(e) = layout.refresh_cells() {
            tracing::warn!(layout = %layout.id, error = %e, "Skipping custom layout with invalid areas");
            continue;
        }
        layout.is_custom = true;
        layouts.push(layout);
    }
    Ok(layouts)
}

/// Persist the custom layouts among `layouts`; built-ins are filtered out.
pub fn save_custom_layouts(
    store: &mut impl KeyValueStore,
    layouts: &[Layout],
) -> Result<(), StorageError> {
    let custom: Vec<&Layout> = layouts.iter().filter(|l| l.is_custom).collect();
    let json = serde_json::to_string(&custom)
        .map_err(|e| StorageError::parse(CUSTOM_LAYOUTS_KEY, e))?;
    store.put(CUSTOM_LAYOUTS_KEY, &json)
}

/// Load the persisted composition state, `None` when nothing was saved.
pub fn load_composition(
    store: &impl KeyValueStore,
) -> Result<Option<CompositionState>, StorageError> {
    let Some(json) = store.get(COMPOSITION_KEY)? else {
        return Ok(None);
    };
    CompositionState::from_json(&json)
        .map(Some)
        .map_err(|e| match e {
            CompositionError::Json(source) => StorageError::parse(COMPOSITION_KEY, source),
            other => StorageError::parse(
                COMPOSITION_KEY,
                <serde_json::Error as serde::de::Error>::custom(other),
            ),
        })
}

pub fn save_composition(
    store: &mut impl KeyValueStore,
    state: &CompositionState,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(state).map_err(|e| StorageError::parse(COMPOSITION_KEY, e))?;
    store.put(COMPOSITION_KEY, &json)
}
