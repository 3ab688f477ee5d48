//! Renderer mirroring through a session: fine-grained calls, sequencing
//! constraints of the viewer, and recovery by rebuild.

use shared::{Camera, SpherePoint};
use tour_editor_lib::harness::TestHarness;
use tour_editor_lib::state::HotspotDraft;
use tour_editor_lib::viewport::{HeadlessEngine, MirrorOutcome, ViewerCall};

fn linked() -> TestHarness {
    let mut h = TestHarness::new();
    h.add_all(&["A", "B", "C"]).unwrap();
    h.link("A", "B").unwrap();
    h.link("B", "A").unwrap();
    h.link("C", "B").unwrap();
    h
}

#[test]
fn test_edits_are_mirrored_without_rebuild() {
    let mut h = linked();
    let rebuilds = h.rebuild_count();

    h.link("A", "C").unwrap();
    assert_eq!(h.last_outcome(), MirrorOutcome::Mirrored);
    h.set_first_scene("B").unwrap();
    assert_eq!(h.last_outcome(), MirrorOutcome::Skipped);

    assert_eq!(h.rebuild_count(), rebuilds);
    assert!(h.viewer_in_sync());
}

#[test]
fn test_failed_call_triggers_rebuild() {
    let mut h = linked();
    let rebuilds = h.rebuild_count();
    h.viewer_mut().unwrap().fail_next("add_hotspot");

    h.link("A", "C").unwrap();

    assert_eq!(h.last_outcome(), MirrorOutcome::Rebuilt);
    assert_eq!(h.rebuild_count(), rebuilds + 1);
    assert_eq!(h.hotspot_ids("A"), ["hs_B_001", "hs_C_001"]);
    assert!(h.viewer_in_sync());
}

#[test]
fn test_rebuild_keeps_scene_on_screen() {
    let mut h = linked();
    h.select_scene("C").unwrap();
    h.viewer_mut().unwrap().fail_next("add_scene");

    h.add("D").unwrap();

    assert_eq!(h.last_outcome(), MirrorOutcome::Rebuilt);
    assert_eq!(h.active_scene().as_deref(), Some("C"));
    assert!(h.viewer_in_sync());
}

#[test]
fn test_delete_active_scene_sequencing() {
    let mut h = linked();
    h.select_scene("B").unwrap();
    h.viewer_mut().unwrap().clear_calls();
    let rebuilds = h.rebuild_count();

    h.delete_scene("B").unwrap();

    assert_eq!(h.last_outcome(), MirrorOutcome::Mirrored);
    assert_eq!(h.rebuild_count(), rebuilds);
    let calls = h.viewer().unwrap().calls().to_vec();
    assert_eq!(
        calls,
        vec![
            ViewerCall::RemoveHotspot { owner: "B".into(), id: "hs_A_001".into() },
            ViewerCall::LoadScene("A".into()),
            ViewerCall::RemoveHotspot { owner: "A".into(), id: "hs_B_001".into() },
            ViewerCall::LoadScene("C".into()),
            ViewerCall::RemoveHotspot { owner: "C".into(), id: "hs_B_002".into() },
            ViewerCall::LoadScene("A".into()),
            ViewerCall::RemoveScene("B".into()),
        ]
    );
    assert_eq!(h.active_scene().as_deref(), Some("A"));
    assert_eq!(h.selected_scene().map(String::as_str), Some("A"));
    assert!(h.viewer_in_sync());
}

#[test]
fn test_lenient_viewer_removes_without_loading() {
    let mut h = TestHarness::with_engine(HeadlessEngine::lenient());
    h.add_all(&["A", "B", "C"]).unwrap();
    h.link("C", "B").unwrap();
    h.viewer_mut().unwrap().clear_calls();

    h.delete_scene("B").unwrap();

    let calls = h.viewer().unwrap().calls().to_vec();
    assert_eq!(
        calls,
        vec![
            ViewerCall::RemoveHotspot { owner: "C".into(), id: "hs_B_001".into() },
            ViewerCall::RemoveScene("B".into()),
        ]
    );
    assert!(h.viewer_in_sync());
}

#[test]
fn test_create_failure_recovers_on_next_edit() {
    let mut engine = HeadlessEngine::strict();
    engine.fail_next_create = true;
    let mut h = TestHarness::with_engine(engine);

    h.add("A").unwrap();
    assert!(h.viewer().is_none());
    assert_eq!(h.scene_count(), 1);

    h.add("B").unwrap();
    assert!(h.viewer().is_some());
    assert!(h.viewer_in_sync());
}

#[test]
fn test_editing_middle_hotspot_keeps_order() {
    let mut h = TestHarness::new();
    h.add_all(&["A", "B", "C", "D"]).unwrap();
    h.link("A", "B").unwrap();
    h.link("A", "C").unwrap();
    h.link("A", "D").unwrap();

    let draft = HotspotDraft::to("C", SpherePoint { pitch: 4.0, yaw: -20.0 }).with_id("door");
    h.edit_hotspot("A", 1, draft).unwrap();

    assert_eq!(h.hotspot_ids("A"), ["hs_B_001", "door", "hs_D_001"]);
    let viewer = h.viewer().unwrap();
    assert_eq!(viewer.hotspot_ids("A"), ["hs_B_001", "door", "hs_D_001"]);
    assert_eq!(viewer.hotspot("A", "door").unwrap().pitch, 4.0);
    assert!(h.viewer_in_sync());
}

#[test]
fn test_reorder_hotspots_reaches_viewer() {
    let mut h = TestHarness::new();
    h.add_all(&["A", "B", "C"]).unwrap();
    h.link("A", "B").unwrap();
    h.link("A", "C").unwrap();

    h.reorder_hotspots("A", &[1, 0]).unwrap();

    assert_eq!(h.viewer().unwrap().hotspot_ids("A"), ["hs_C_001", "hs_B_001"]);
    assert!(h.viewer_in_sync());
}

#[test]
fn test_capture_live_view_updates_viewer_hotspots() {
    let mut h = linked();
    h.select_scene("B").unwrap();

    h.capture_live_view().unwrap();

    let camera = h.renderer().camera().unwrap();
    assert_eq!(h.doc().scene("B").unwrap().camera, camera);
    let mirrored = h.viewer().unwrap().hotspot("A", "hs_B_001").unwrap();
    assert_eq!(mirrored.target_camera(), Some(camera));
    assert!(h.viewer_in_sync());
}

#[test]
fn test_capture_live_view_without_viewer() {
    let mut h = TestHarness::new();
    assert!(h.capture_live_view().is_err());
}

#[test]
fn test_rename_active_scene_keeps_focus() {
    let mut h = linked();
    h.select_scene("B").unwrap();

    h.rename_scene("B", "Bee").unwrap();

    assert_eq!(h.active_scene().as_deref(), Some("Bee"));
    assert_eq!(h.viewer().unwrap().scene_ids(), ["A", "Bee", "C"]);
    assert!(h.viewer_in_sync());
}

#[test]
fn test_undo_redo_rebuilds_viewer() {
    let mut h = linked();
    h.delete_scene("C").unwrap();
    let rebuilds = h.rebuild_count();

    h.undo().unwrap();
    assert_eq!(h.last_outcome(), MirrorOutcome::Rebuilt);
    assert_eq!(h.rebuild_count(), rebuilds + 1);
    assert!(h.viewer_in_sync());

    h.redo().unwrap();
    assert!(h.viewer_in_sync());
}

#[test]
fn test_edit_scene_camera_on_screen() {
    let mut h = linked();
    let facing = Camera { pitch: 10.0, yaw: 45.0, hfov: 75.0 };

    h.edit_scene("A", None, Some(facing)).unwrap();

    assert!(h.viewer_in_sync());
    assert_eq!(h.active_scene().as_deref(), Some("A"));
}

#[test]
fn test_capture_on_hidden_scene_reaches_viewer() {
    let mut h = TestHarness::new();
    h.add_all(&["A", "B"]).unwrap();
    let camera = Camera { pitch: 12.0, yaw: 77.0, hfov: 60.0 };

    h.capture_view("B", camera).unwrap();
    assert_eq!(h.last_outcome(), MirrorOutcome::Mirrored);
    assert!(h.viewer_in_sync());

    h.select_scene("B").unwrap();
    assert_eq!(h.renderer().camera(), Some(camera));
}

#[test]
fn test_capture_on_scene_on_screen_keeps_it_there() {
    let mut h = linked();
    h.select_scene("C").unwrap();

    h.capture_view("C", Camera { pitch: -5.0, yaw: 10.0, hfov: 90.0 }).unwrap();

    assert_eq!(h.last_outcome(), MirrorOutcome::Rebuilt);
    assert_eq!(h.active_scene().as_deref(), Some("C"));
    assert!(h.viewer_in_sync());
}

#[test]
fn test_transient_scene_visit_keeps_hotspot_selection() {
    let mut h = linked();
    h.select_scene("A").unwrap();
    h.select_hotspot(0).unwrap();
    h.viewer_mut().unwrap().clear_calls();

    h.delete_hotspot("C", 0).unwrap();

    assert!(h.viewer().unwrap().calls().contains(&ViewerCall::LoadScene("C".into())));
    assert_eq!(h.selected_scene().map(String::as_str), Some("A"));
    assert_eq!(h.state.selection.hotspot, Some(0));
    assert!(h.viewer_in_sync());
}
