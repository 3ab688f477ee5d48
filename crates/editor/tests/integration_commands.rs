//! End-to-end tests of the JSON command protocol.

use tour_editor_lib::command::{execute_json, execute_json_batch};
use tour_editor_lib::harness::TestHarness;
use tour_editor_lib::viewport::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

fn run(h: &mut TestHarness, json: &str) -> serde_json::Value {
    let response = execute_json(h, json).unwrap();
    assert!(response.success, "command failed: {json}: {:?}", response.error);
    response.data.unwrap_or(serde_json::Value::Null)
}

fn build_two_rooms(h: &mut TestHarness) {
    let responses = execute_json_batch(
        h,
        r#"[
            {"command": "add_scene", "id": "lobby"},
            {"command": "add_scene", "id": "hall", "camera": {"pitch": 0, "yaw": 90, "hfov": 80}}
        ]"#,
    )
    .unwrap();
    assert!(responses.iter().all(|r| r.success));
}

#[test]
fn test_place_hotspot_at_viewport_center() {
    let mut h = TestHarness::new();
    build_two_rooms(&mut h);

    let json = format!(
        r#"{{"command": "place_hotspot", "x": {}, "y": {}, "target_scene_id": "hall", "label": "Hall"}}"#,
        VIEWPORT_WIDTH / 2.0,
        VIEWPORT_HEIGHT / 2.0
    );
    let data = run(&mut h, &json);

    assert_eq!(data["owner"], "lobby");
    assert_eq!(data["id"], "hs_hall_001");
    let hotspot = h.hotspot("lobby", 0).unwrap();
    assert_eq!(hotspot.position.pitch, 0.0);
    assert_eq!(hotspot.position.yaw, 0.0);
    assert_eq!(hotspot.target_camera.yaw, 90.0);
    assert!(h.viewer_in_sync());
}

#[test]
fn test_place_hotspot_outside_viewport_fails() {
    let mut h = TestHarness::new();
    build_two_rooms(&mut h);

    let response = execute_json(
        &mut h,
        r#"{"command": "place_hotspot", "x": -5, "y": 10, "target_scene_id": "hall"}"#,
    )
    .unwrap();
    assert!(!response.success);
    assert_eq!(h.hotspot_count(), 0);
}

#[test]
fn test_preview_loads_target_with_arrival_camera() {
    let mut h = TestHarness::new();
    build_two_rooms(&mut h);
    run(&mut h, r#"{"command": "add_hotspot", "owner": "lobby", "target_scene_id": "hall"}"#);

    let data = run(&mut h, r#"{"command": "preview_hotspot", "owner": "lobby", "index": 0}"#);

    assert_eq!(data["active"], "hall");
    assert_eq!(h.selected_scene().map(String::as_str), Some("hall"));
    let camera = h.renderer().camera().unwrap();
    assert_eq!(camera.yaw, 90.0);
    assert_eq!(camera.hfov, 80.0);
}

#[test]
fn test_next_and_previous_scene() {
    let mut h = TestHarness::new();
    build_two_rooms(&mut h);
    run(&mut h, r#"{"command": "add_scene", "id": "garden"}"#);

    assert_eq!(run(&mut h, r#"{"command": "next_scene"}"#)["selected"], "hall");
    assert_eq!(run(&mut h, r#"{"command": "next_scene"}"#)["selected"], "garden");
    assert_eq!(run(&mut h, r#"{"command": "next_scene"}"#)["selected"], "lobby");
    assert_eq!(run(&mut h, r#"{"command": "previous_scene"}"#)["selected"], "garden");
    assert_eq!(h.active_scene().as_deref(), Some("garden"));
}

#[test]
fn test_rename_and_delete_through_commands() {
    let mut h = TestHarness::new();
    build_two_rooms(&mut h);
    run(&mut h, r#"{"command": "add_hotspot", "owner": "hall", "target_scene_id": "lobby"}"#);

    let data = run(&mut h, r#"{"command": "rename_scene", "old_id": "lobby", "new_id": "entrance"}"#);
    assert_eq!(data["id"], "entrance");
    assert_eq!(h.hotspot("hall", 0).unwrap().target_scene_id, "entrance");

    let data = run(&mut h, r#"{"command": "delete_scene", "id": "entrance"}"#);
    assert_eq!(data["removed_hotspots"], 1);
    assert_eq!(h.scene_order(), ["hall"]);
    assert_eq!(h.first_scene(), "hall");
    assert!(h.viewer_in_sync());
}

#[test]
fn test_capture_live_view_uses_viewer_camera() {
    let mut h = TestHarness::new();
    build_two_rooms(&mut h);
    run(&mut h, r#"{"command": "add_hotspot", "owner": "hall", "target_scene_id": "lobby"}"#);
    run(&mut h, r#"{"command": "select_scene", "id": "lobby"}"#);

    let data = run(&mut h, r#"{"command": "capture_live_view"}"#);

    assert_eq!(data["scene_id"], "lobby");
    assert_eq!(data["updated_hotspots"], 1);
}

#[test]
fn test_export_import_through_commands() {
    let mut h = TestHarness::new();
    build_two_rooms(&mut h);
    run(&mut h, r#"{"command": "add_hotspot", "owner": "lobby", "target_scene_id": "hall"}"#);
    let exported = run(&mut h, r#"{"command": "export_tour"}"#)["tour_json"]
        .as_str()
        .unwrap()
        .to_string();

    let mut other = TestHarness::new();
    let import = serde_json::json!({ "command": "import_tour", "json": exported }).to_string();
    let data = run(&mut other, &import);

    assert_eq!(data["scene_count"], 2);
    assert_eq!(other.doc(), h.doc());
}

#[test]
fn test_inspect_lists_scenes_in_order() {
    let mut h = TestHarness::new();
    build_two_rooms(&mut h);
    run(&mut h, r#"{"command": "move_scene", "id": "hall", "direction": "up"}"#);

    let data = run(&mut h, r#"{"command": "inspect"}"#);
    assert_eq!(data["scene_count"], 2);
    assert_eq!(data["scenes"][0]["id"], "hall");
    assert_eq!(data["scenes"][1]["id"], "lobby");
    assert_eq!(data["can_undo"], true);
}
