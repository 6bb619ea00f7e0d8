//! Property-based invariants for composition state.
//!
//! 1. Deleting a media item keeps every surviving mapping pointed at the
//!    same media it showed before.
//! 2. Serialization round-trips exactly.
//! 3. Merged values always stay inside their clamped ranges.

use collage_project_model::{
    CompositionState, GridPercentagePatch, MediaItem, TransformPatch, MIN_FACTOR,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

/// A state with `media_len` items and a random subset of cells mapped.
fn state_strategy() -> impl Strategy<Value = CompositionState> {
    (1usize..=8).prop_flat_map(|media_len| {
        (
            Just(media_len),
            prop::collection::vec(prop::option::of(0..media_len), 0..8),
            prop::collection::vec(any::<bool>(), media_len),
        )
            .prop_map(|(media_len, mappings, videos)| {
                let mut state = CompositionState::new();
                for (i, video) in videos.iter().enumerate().take(media_len) {
                    let url = format!("media-{i}");
                    state.append_media(if *video {
                        MediaItem::video(url)
                    } else {
                        MediaItem::image(url)
                    });
                }
                for (cell, index) in mappings.iter().enumerate() {
                    if let Some(index) = index {
                        state
                            .set_media(&format!("cell{cell}"), *index)
                            .expect("index generated in range");
                    }
                }
                state
            })
    })
}

// ═══════════════════════════════════════════════════════════════════════
// Index shift
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn delete_preserves_surviving_references(
        state in state_strategy(),
        pick in any::<prop::sample::Index>(),
    ) {
        let index = pick.index(state.media().len());
        let before: Vec<(String, Option<String>)> = state
            .mappings()
            .map(|(cell, _)| (cell.to_string(), state.media_for(cell).map(|m| m.url().to_string())))
            .collect();

        let mut after = state.clone();
        let removed = after.delete_media_item(index).unwrap();
        prop_assert_eq!(after.media().len(), state.media().len() - 1);

        for (cell, url) in before {
            let was_removed = state.media_index(&cell) == Some(index);
            if was_removed {
                prop_assert_eq!(after.media_index(&cell), None);
            } else {
                prop_assert_eq!(after.media_for(&cell).map(|m| m.url().to_string()), url);
            }
        }
        prop_assert_eq!(removed.url(), format!("media-{index}"));
    }

    #[test]
    fn mappings_stay_in_range_after_delete(
        state in state_strategy(),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut state = state;
        let index = pick.index(state.media().len());
        state.delete_media_item(index).unwrap();
        let len = state.media().len();
        for (_, mapped) in state.mappings() {
            prop_assert!(mapped < len);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Persistence
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn serialization_round_trips(
        state in state_strategy(),
        rotation in -720.0f64..720.0,
        z in 0u32..20,
    ) {
        let mut state = state;
        state.update_transform("cell0", &TransformPatch {
            rotation: Some(rotation),
            ..Default::default()
        });
        state.update_z_index("cell1", z);
        state.update_background_color("cell2", "#123456");

        let json = state.to_json().unwrap();
        let restored = CompositionState::from_json(&json).unwrap();
        prop_assert_eq!(&restored, &state);
        prop_assert_eq!(restored.has_video(), state.has_video());
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Clamping
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn merged_values_stay_in_range(
        zoom in -10.0f64..10.0,
        scale in -10.0f64..10.0,
        radius in -50.0f64..50.0,
        width in -500.0f64..500.0,
        offset in -500.0f64..500.0,
    ) {
        let mut state = CompositionState::new();
        let t = state.update_transform("a", &TransformPatch {
            zoom: Some(zoom),
            scale: Some(scale),
            border_radius: Some(radius),
            ..Default::default()
        });
        prop_assert!(t.zoom >= MIN_FACTOR);
        prop_assert!(t.scale >= MIN_FACTOR);
        prop_assert!(t.border_radius >= 0.0);

        let g = state.update_grid_percentage("a", &GridPercentagePatch {
            width: Some(width),
            offset_y: Some(offset),
            ..Default::default()
        });
        prop_assert!((10.0..=200.0).contains(&g.width));
        prop_assert!((-100.0..=100.0).contains(&g.offset_y));
        prop_assert_eq!(g.height, 100.0);
    }
}
