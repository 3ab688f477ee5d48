//! Factory functions for creating test data.
//!
//! Documents built here satisfy every invariant unless the name says
//! otherwise. JSON fixtures are written the way older editors wrote them.

use shared::*;

// ── Scene and hotspot factories ─────────────────────────────────

/// Scene with tiles under `/tiles/<id>` and a default camera.
pub fn scene(id: &str) -> Scene {
    Scene::new(Imagery::at(format!("/tiles/{id}")), Camera::default())
}

/// Scene facing a given direction.
pub fn scene_facing(id: &str, pitch: f64, yaw: f64, hfov: f64) -> Scene {
    Scene::new(Imagery::at(format!("/tiles/{id}")), Camera { pitch, yaw, hfov })
}

/// Hotspot with the target id as label.
pub fn hotspot(id: &str, target: &str) -> Hotspot {
    Hotspot {
        id: id.to_string(),
        position: SpherePoint::default(),
        target_scene_id: target.to_string(),
        target_camera: Camera::default(),
        label: target.to_string(),
    }
}

// ── Document factories ──────────────────────────────────────────

/// Scenes in the given order, first one as start scene, no hotspots.
pub fn tour_of(ids: &[&str]) -> TourDocument {
    let mut doc = TourDocument::default();
    for id in ids {
        doc.scenes.insert(id.to_string(), scene(id));
        doc.scene_order.push(id.to_string());
    }
    doc.first_scene = ids.first().map(|s| s.to_string()).unwrap_or_default();
    doc
}

/// Lobby, hall and garden, linked in a loop with a shortcut back to the lobby.
pub fn three_room_tour() -> TourDocument {
    let mut doc = TourDocument::default();
    doc.scenes.insert("lobby".into(), scene("lobby"));
    doc.scenes.insert("hall".into(), scene_facing("hall", 5.0, 90.0, 80.0));
    doc.scenes.insert("garden".into(), scene_facing("garden", -10.0, 180.0, 110.0));
    doc.scene_order = vec!["lobby".into(), "hall".into(), "garden".into()];
    doc.first_scene = "lobby".into();

    let links = [
        ("lobby", "hs_hall_001", "hall"),
        ("hall", "hs_garden_001", "garden"),
        ("garden", "hs_lobby_001", "lobby"),
        ("hall", "hs_lobby_002", "lobby"),
    ];
    for (owner, id, target) in links {
        let target_camera = doc.scenes[target].camera;
        let mut h = hotspot(id, target);
        h.target_camera = target_camera;
        h.label = format!("To the {target}");
        doc.scenes[owner].hotspots.push(h);
    }
    doc
}

// ── Interchange fixtures ────────────────────────────────────────

/// File without `sceneOrder`, with one hotspot lacking an `id` and one
/// lacking target camera fields.
pub const LEGACY_TOUR_JSON: &str = r#"{
    "default": { "firstScene": "porch", "sceneFadeDuration": 800 },
    "scenes": {
        "porch": {
            "hfov": 100, "pitch": 0, "yaw": 0, "type": "multires",
            "preview": "/tiles/porch/preview.jpg",
            "multiRes": { "basePath": "/tiles/porch", "path": "/%l/%s%y_%x",
                          "fallbackPath": "/fallback/%s", "extension": "jpg",
                          "tileResolution": 512, "maxLevel": 3, "cubeResolution": 1832 },
            "hotSpots": [
                { "pitch": -2, "yaw": 40, "type": "scene", "text": "Inside", "sceneId": "kitchen" }
            ]
        },
        "kitchen": {
            "hfov": 90, "pitch": 3, "yaw": 270, "type": "multires",
            "preview": "/tiles/kitchen/preview.jpg",
            "multiRes": { "basePath": "/tiles/kitchen", "path": "/%l/%s%y_%x",
                          "fallbackPath": "/fallback/%s", "extension": "jpg",
                          "tileResolution": 512, "maxLevel": 3, "cubeResolution": 1832 },
            "hotSpots": [
                { "pitch": 0, "yaw": 180, "type": "scene", "text": "Back outside",
                  "sceneId": "porch", "id": "hs_porch_004" }
            ]
        }
    }
}"#;

/// File whose only hotspot points at a scene that is not in the file.
pub const DANGLING_TOUR_JSON: &str = r#"{
    "default": { "firstScene": "attic", "sceneOrder": ["attic"] },
    "scenes": {
        "attic": { "hotSpots": [ { "sceneId": "basement", "id": "hs_basement_001", "text": "Down" } ] }
    }
}"#;
