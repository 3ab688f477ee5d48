//! Tour file import and export through a session.

use shared::{Camera, IdError};
use tour_editor_lib::fixtures::{three_room_tour, DANGLING_TOUR_JSON, LEGACY_TOUR_JSON};
use tour_editor_lib::harness::TestHarness;
use tour_editor_lib::serialization::{export_tour, import_tour};
use tour_editor_lib::state::TourChange;
use tour_editor_lib::{EditError, ImportError};

#[test]
fn test_legacy_file_is_normalized() {
    let mut h = TestHarness::new();
    let change = h.import_json(LEGACY_TOUR_JSON).unwrap();

    assert_eq!(change, TourChange::DocumentReplaced);
    assert_eq!(h.scene_order(), ["porch", "kitchen"]);
    assert_eq!(h.first_scene(), "porch");
    assert_eq!(h.doc().fade_duration, 800.0);

    let derived = h.hotspot("porch", 0).unwrap();
    assert_eq!(derived.id, "hs_porch_5");
    assert_eq!(derived.label, "Inside");
    assert_eq!(derived.target_camera, Camera { pitch: 3.0, yaw: 270.0, hfov: 90.0 });
    assert_eq!(h.hotspot_ids("kitchen"), ["hs_porch_004"]);

    assert!(h.violations().is_empty());
    assert_eq!(h.active_scene().as_deref(), Some("porch"));
    assert!(h.viewer_in_sync());
}

#[test]
fn test_fallback_counter_keeps_moving_across_imports() {
    let mut h = TestHarness::new();
    h.import_json(LEGACY_TOUR_JSON).unwrap();
    let after_first = h.tour().fallback_counter();

    h.import_json(LEGACY_TOUR_JSON).unwrap();

    assert!(h.tour().fallback_counter() > after_first);
    assert_eq!(h.hotspot("porch", 0).unwrap().id, "hs_porch_6");
}

#[test]
fn test_malformed_file_leaves_tour_untouched() {
    let mut h = TestHarness::new();
    h.add_all(&["A", "B"]).unwrap();
    h.link("A", "B").unwrap();
    let before = h.doc().clone();
    let version = h.tour().version();

    let result = h.import_json(r#"{"default": {"firstScene": "A"}, "scenes": ["#);

    assert!(matches!(result, Err(ImportError::Json(_))));
    assert_eq!(*h.doc(), before);
    assert_eq!(h.tour().version(), version);
    assert!(h.viewer_in_sync());
}

#[test]
fn test_export_import_is_idempotent() {
    let doc = three_room_tour();
    let first = export_tour(&doc).unwrap();

    let reimported = import_tour(&first, &mut Default::default()).unwrap();
    assert_eq!(reimported, doc);
    assert_eq!(export_tour(&reimported).unwrap(), first);
}

#[test]
fn test_import_can_be_undone() {
    let mut h = TestHarness::new();
    h.add_all(&["A", "B"]).unwrap();
    let before = h.doc().clone();

    h.import_json(LEGACY_TOUR_JSON).unwrap();
    assert_eq!(h.scene_order(), ["porch", "kitchen"]);

    h.undo().unwrap();
    assert_eq!(*h.doc(), before);
    assert!(h.viewer_in_sync());
}

#[test]
fn test_dangling_reference_is_kept_and_reported() {
    let mut h = TestHarness::new();
    h.import_json(DANGLING_TOUR_JSON).unwrap();

    let dangling = h.doc().dangling_references();
    assert_eq!(
        dangling,
        vec![("attic".to_string(), "hs_basement_001".to_string(), "basement".to_string())]
    );
    assert_eq!(h.hotspot_count(), 1);
}

#[test]
fn test_deleting_a_scene_never_leaves_dangling_references() {
    let mut h = TestHarness::new();
    h.load_json(&export_tour(&three_room_tour()).unwrap()).unwrap();

    h.delete_scene("lobby").unwrap();

    assert!(h.doc().dangling_references().is_empty());
    assert_eq!(h.hotspot_ids("hall"), ["hs_garden_001"]);
    assert!(h.hotspot_ids("garden").is_empty());
    assert!(h.viewer_in_sync());
}

#[tokio::test]
async fn test_open_and_save_file() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("legacy.json");
    let target = dir.path().join("saved.json");
    tokio::fs::write(&source, LEGACY_TOUR_JSON).await.unwrap();

    let mut h = TestHarness::new();
    h.open_file(&source).await.unwrap();
    h.save_file(&target).await.unwrap();

    let mut reopened = TestHarness::new();
    reopened.open_file(&target).await.unwrap();
    assert_eq!(reopened.doc(), h.doc());
    assert!(reopened.viewer_in_sync());
}

#[tokio::test]
async fn test_open_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");

    let mut h = TestHarness::new();
    let err = h.open_file(&missing).await.unwrap_err();

    assert!(matches!(err, ImportError::Io { .. }));
    assert!(err.to_string().contains("nope.json"));
    assert!(h.doc().is_empty());
}

#[test]
fn test_huge_numeric_suffix_imports_cleanly() {
    let mut h = TestHarness::new();
    h.load_json(
        r#"{"scenes": {"a": {"hotSpots": [
            {"sceneId": "b", "id": "hs_b_18446744073709551615"},
            {"sceneId": "b"}
        ]}, "b": {}}}"#,
    )
    .unwrap();

    assert_eq!(h.hotspot_ids("a"), ["hs_b_18446744073709551615", "hs_a_1"]);
    assert!(h.violations().is_empty());
}

#[test]
fn test_bad_scene_key_rejects_import() {
    let mut h = TestHarness::new();
    h.add("lobby").unwrap();
    let before = h.doc().clone();

    let err = h
        .import_json(r#"{"scenes": {"bad scene/id": {"hotSpots": [{"sceneId": "b"}]}, "b": {}}}"#)
        .unwrap_err();

    assert!(matches!(err, ImportError::InvalidSceneId { reason: IdError::BadCharacters, .. }));
    assert_eq!(*h.doc(), before);
}

#[test]
fn test_bad_hotspot_id_is_replaced() {
    let mut h = TestHarness::new();
    h.load_json(r#"{"scenes": {"a": {"hotSpots": [{"sceneId": "b", "id": "front door!"}]}, "b": {}}}"#)
        .unwrap();

    assert_eq!(h.hotspot_ids("a"), ["hs_a_1"]);
    assert!(h.violations().is_empty());
}

#[test]
fn test_non_finite_camera_never_reaches_export() {
    let mut h = TestHarness::new();
    h.add_all(&["A", "B"]).unwrap();

    let err = h.capture_view("B", Camera { pitch: f64::NAN, yaw: 0.0, hfov: 90.0 }).unwrap_err();
    assert_eq!(err, EditError::NonFinite("camera"));

    let json = export_tour(h.doc()).unwrap();
    assert_eq!(import_tour(&json, &mut Default::default()).unwrap(), *h.doc());
}

#[test]
fn test_restore_autosave_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("autosave.json");
    std::fs::write(&path, export_tour(&three_room_tour()).unwrap()).unwrap();

    let mut h = TestHarness::new();
    let change = h.session.restore_autosave_from(&path);

    assert_eq!(change, Some(TourChange::DocumentReplaced));
    assert_eq!(*h.doc(), three_room_tour());
    assert!(h.viewer_in_sync());
    assert_eq!(h.session.restore_autosave_from(&dir.path().join("none.json")), None);
}
