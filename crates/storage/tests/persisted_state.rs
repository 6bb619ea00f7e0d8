use collage_layout::{default_layouts, Layout, DEFAULT_GAP};
use collage_project_model::{CompositionState, MediaItem, TransformPatch};
use collage_storage::{
    load_composition, load_custom_layouts, save_composition, save_custom_layouts, FileStore,
    KeyValueStore, MemoryStore, COMPOSITION_KEY, CUSTOM_LAYOUTS_KEY,
};

#[test]
fn empty_store_loads_nothing() {
    let store = MemoryStore::new();
    assert!(load_custom_layouts(&store).unwrap().is_empty());
    assert!(load_composition(&store).unwrap().is_none());
}

#[test]
fn only_custom_layouts_are_saved() {
    let mut store = MemoryStore::new();
    let mut layouts = default_layouts();
    layouts.push(Layout::custom("custom-1", "Mine", "\"a b\"\n\"c c\"", 4).unwrap());

    save_custom_layouts(&mut store, &layouts).unwrap();
    let loaded = load_custom_layouts(&store).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, "custom-1");
    assert_eq!(loaded[0].gap, 4);
    assert!(loaded[0].is_custom);
}

#[test]
fn custom_layouts_are_repaired_or_skipped() {
    let mut store = MemoryStore::new();
    store
        .put(
            CUSTOM_LAYOUTS_KEY,
            r#"[
                {"id":"custom-1","name":"Stale","areas":"\"x y\"","cells":[{"id":"old"}]},
                {"id":"custom-2","name":"Broken","areas":"\"a b\"\n\"c\""},
                {"name":"No id"},
                {"id":"custom-3","name":"Legacy","areas":"x"}
            ]"#,
        )
        .unwrap();

    let loaded = load_custom_layouts(&store).unwrap();
    let ids: Vec<_> = loaded.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["custom-1", "custom-3"]);
    assert_eq!(loaded[0].cell_ids().collect::<Vec<_>>(), vec!["x", "y"]);
    assert_eq!(loaded[1].gap, DEFAULT_GAP);
    assert!(loaded.iter().all(|l| l.is_custom));
}

#[test]
fn corrupt_documents_are_parse_errors() {
    let mut store = MemoryStore::new();
    store.put(CUSTOM_LAYOUTS_KEY, "{not json").unwrap();
    store.put(COMPOSITION_KEY, "[1, 2]").unwrap();

    let err = load_custom_layouts(&store).unwrap_err();
    assert!(err.to_string().contains(CUSTOM_LAYOUTS_KEY));
    let err = load_composition(&store).unwrap_err();
    assert!(err.to_string().contains(COMPOSITION_KEY));
}

#[test]
fn composition_survives_a_file_store_round_trip() {
    let dir = std::env::temp_dir().join("collage_test_persisted_state");
    let _ = std::fs::remove_dir_all(&dir);

    let mut state = CompositionState::new();
    let index = state.append_media(MediaItem::image("data:image/png;base64,AA=="));
    state.set_media("cell1", index).unwrap();
    state.update_transform(
        "cell1",
        &TransformPatch {
            rotation: Some(90.0),
            ..Default::default()
        },
    );

    let mut store = FileStore::open(&dir).unwrap();
    save_composition(&mut store, &state).unwrap();
    assert!(dir.join("collageState.json").exists());

    let reopened = FileStore::open(&dir).unwrap();
    assert_eq!(load_composition(&reopened).unwrap(), Some(state));

    std::fs::remove_dir_all(&dir).ok();
}
