//! JSON command protocol for scripted editing.
//!
//! One command per object, tagged by `"command"`. Every command returns a
//! [`CommandResponse`]; a rejected edit is a response with `success: false`
//! and the reason, never a hard error.

use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::{Camera, SpherePoint};

use crate::error::EditResult;
use crate::harness::TestHarness;
use crate::state::tour::{HotspotDraft, MoveDirection, TourChange};
use crate::viewport::PointerEvent;

/// A command the editor can execute.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditorCommand {
    /// Add a scene. Blank id means auto.
    AddScene {
        #[serde(default)]
        id: String,
        /// Tile directory; defaults to `/tiles/<id>`
        #[serde(default)]
        base_path: Option<String>,
        #[serde(default)]
        camera: Option<Camera>,
    },
    EditScene {
        id: String,
        #[serde(default)]
        base_path: Option<String>,
        #[serde(default)]
        camera: Option<Camera>,
    },
    RenameScene {
        old_id: String,
        new_id: String,
    },
    DeleteScene {
        id: String,
    },
    ReorderScenes {
        order: Vec<String>,
    },
    MoveScene {
        id: String,
        direction: MoveDirection,
    },
    MoveSceneTo {
        id: String,
        index: usize,
    },
    SetFirstScene {
        id: String,
    },
    SetTourOptions {
        #[serde(default)]
        fade_duration: Option<f64>,
        #[serde(default)]
        auto_load: Option<bool>,
    },
    AddHotspot {
        owner: String,
        target_scene_id: String,
        #[serde(default)]
        position: SpherePoint,
        #[serde(default)]
        label: String,
        #[serde(default)]
        id: String,
    },
    EditHotspot {
        owner: String,
        index: usize,
        target_scene_id: String,
        #[serde(default)]
        position: SpherePoint,
        #[serde(default)]
        label: String,
        #[serde(default)]
        id: String,
    },
    DeleteHotspot {
        owner: String,
        index: usize,
    },
    ReorderHotspots {
        owner: String,
        order: Vec<usize>,
    },
    /// Store a camera as the scene default and push it into incoming hotspots
    CaptureView {
        scene_id: String,
        camera: Camera,
    },
    /// Capture whatever the viewer is showing
    CaptureLiveView,
    /// Add a hotspot to the scene on screen at a pointer position
    PlaceHotspot {
        x: f64,
        y: f64,
        target_scene_id: String,
        #[serde(default)]
        label: String,
        #[serde(default)]
        id: String,
    },
    PreviewHotspot {
        owner: String,
        index: usize,
    },
    SelectScene {
        id: String,
    },
    NextScene,
    PreviousScene,
    Undo,
    Redo,
    Clear,
    /// List scenes and hotspots
    Inspect,
    /// List hotspots whose target scene is missing
    Lint,
    ExportTour,
    ImportTour {
        json: String,
    },
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

fn change_data(change: &TourChange) -> serde_json::Value {
    match change {
        TourChange::Unchanged => json!({ "changed": false }),
        TourChange::SceneAdded { id } => json!({ "id": id }),
        TourChange::SceneRenamed { new_id, .. } => json!({ "id": new_id }),
        TourChange::SceneDeleted { owned, incoming, .. } => json!({
            "removed_hotspots": owned.len() + incoming.len(),
        }),
        TourChange::HotspotAdded { owner, id } => json!({ "owner": owner, "id": id }),
        TourChange::HotspotEdited { owner, new_id, .. } => json!({ "owner": owner, "id": new_id }),
        TourChange::ViewCaptured { scene_id, updated } => json!({
            "scene_id": scene_id,
            "updated_hotspots": updated.len(),
        }),
        _ => json!({ "changed": true }),
    }
}

fn respond(result: EditResult<TourChange>) -> CommandResponse {
    match result {
        Ok(change) => CommandResponse::ok_with_data(change_data(&change)),
        Err(e) => CommandResponse::err(e.to_string()),
    }
}

fn draft(target_scene_id: String, position: SpherePoint, label: String, id: String) -> HotspotDraft {
    HotspotDraft {
        position,
        target_scene_id,
        label,
        id,
    }
}

fn inspect(harness: &TestHarness) -> serde_json::Value {
    let doc = harness.doc();
    let scenes: Vec<serde_json::Value> = doc
        .scene_order
        .iter()
        .filter_map(|id| doc.scene(id).map(|scene| (id, scene)))
        .map(|(id, scene)| {
            let hotspots: Vec<serde_json::Value> = scene
                .hotspots
                .iter()
                .map(|h| json!({ "id": h.id, "target": h.target_scene_id, "label": h.label }))
                .collect();
            json!({
                "id": id,
                "camera": scene.camera,
                "hotspots": hotspots,
            })
        })
        .collect();
    json!({
        "scene_count": scenes.len(),
        "scenes": scenes,
        "first_scene": doc.first_scene,
        "selected": harness.selected_scene(),
        "active": harness.active_scene(),
        "can_undo": harness.tour().can_undo(),
        "can_redo": harness.tour().can_redo(),
    })
}

/// Execute a single command on the harness.
pub fn execute_command(harness: &mut TestHarness, cmd: EditorCommand) -> CommandResponse {
    match cmd {
        EditorCommand::AddScene { id, base_path, camera } => {
            let base = base_path.unwrap_or_else(|| format!("/tiles/{}", id.trim()));
            let imagery = harness.state.settings.scene.imagery_at(&base);
            let camera = camera.unwrap_or(harness.state.settings.scene.camera);
            respond(harness.add_scene_with_camera(&id, imagery, camera))
        }

        EditorCommand::EditScene { id, base_path, camera } => {
            let imagery = base_path.map(|base| harness.state.settings.scene.imagery_at(&base));
            respond(harness.edit_scene(&id, imagery, camera))
        }

        EditorCommand::RenameScene { old_id, new_id } => respond(harness.rename_scene(&old_id, &new_id)),

        EditorCommand::DeleteScene { id } => respond(harness.delete_scene(&id)),

        EditorCommand::ReorderScenes { order } => respond(harness.reorder_scenes(order)),

        EditorCommand::MoveScene { id, direction } => respond(harness.move_scene(&id, direction)),

        EditorCommand::MoveSceneTo { id, index } => respond(harness.move_scene_to(&id, index)),

        EditorCommand::SetFirstScene { id } => respond(harness.set_first_scene(&id)),

        EditorCommand::SetTourOptions { fade_duration, auto_load } => {
            respond(harness.set_tour_options(fade_duration, auto_load))
        }

        EditorCommand::AddHotspot {
            owner,
            target_scene_id,
            position,
            label,
            id,
        } => respond(harness.add_hotspot(&owner, draft(target_scene_id, position, label, id))),

        EditorCommand::EditHotspot {
            owner,
            index,
            target_scene_id,
            position,
            label,
            id,
        } => respond(harness.edit_hotspot(&owner, index, draft(target_scene_id, position, label, id))),

        EditorCommand::DeleteHotspot { owner, index } => respond(harness.delete_hotspot(&owner, index)),

        EditorCommand::ReorderHotspots { owner, order } => respond(harness.reorder_hotspots(&owner, &order)),

        EditorCommand::CaptureView { scene_id, camera } => respond(harness.capture_view(&scene_id, camera)),

        EditorCommand::CaptureLiveView => respond(harness.capture_live_view()),

        EditorCommand::PlaceHotspot {
            x,
            y,
            target_scene_id,
            label,
            id,
        } => {
            let hotspot = draft(target_scene_id, SpherePoint::default(), label, id);
            respond(harness.place_hotspot_at_pointer(&PointerEvent { x, y }, hotspot))
        }

        EditorCommand::PreviewHotspot { owner, index } => match harness.preview_hotspot_target(&owner, index) {
            Ok(()) => CommandResponse::ok_with_data(json!({ "active": harness.active_scene() })),
            Err(e) => CommandResponse::err(e.to_string()),
        },

        EditorCommand::SelectScene { id } => match harness.select_scene(&id) {
            Ok(()) => CommandResponse::ok_with_data(json!({ "selected": id })),
            Err(e) => CommandResponse::err(e.to_string()),
        },

        EditorCommand::NextScene => match harness.go_next() {
            Ok(id) => CommandResponse::ok_with_data(json!({ "selected": id })),
            Err(e) => CommandResponse::err(e.to_string()),
        },

        EditorCommand::PreviousScene => match harness.go_previous() {
            Ok(id) => CommandResponse::ok_with_data(json!({ "selected": id })),
            Err(e) => CommandResponse::err(e.to_string()),
        },

        EditorCommand::Undo => {
            let undone = harness.undo().is_some();
            CommandResponse::ok_with_data(json!({ "undone": undone }))
        }

        EditorCommand::Redo => {
            let redone = harness.redo().is_some();
            CommandResponse::ok_with_data(json!({ "redone": redone }))
        }

        EditorCommand::Clear => {
            harness.clear();
            CommandResponse::ok()
        }

        EditorCommand::Inspect => CommandResponse::ok_with_data(inspect(harness)),

        EditorCommand::Lint => {
            let dangling: Vec<serde_json::Value> = harness
                .doc()
                .dangling_references()
                .into_iter()
                .map(|(owner, id, target)| json!({ "owner": owner, "id": id, "target": target }))
                .collect();
            CommandResponse::ok_with_data(json!({ "dangling": dangling }))
        }

        EditorCommand::ExportTour => match harness.session.export_json() {
            Ok(json) => CommandResponse::ok_with_data(json!({ "tour_json": json })),
            Err(e) => CommandResponse::err(e.to_string()),
        },

        EditorCommand::ImportTour { json } => match harness.session.import_json(&json) {
            Ok(_) => CommandResponse::ok_with_data(json!({ "scene_count": harness.scene_count() })),
            Err(e) => CommandResponse::err(e.to_string()),
        },
    }
}

/// Parse and execute a single JSON command string.
pub fn execute_json(harness: &mut TestHarness, json: &str) -> Result<CommandResponse, String> {
    let cmd: EditorCommand = serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(harness, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(harness: &mut TestHarness, json: &str) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<EditorCommand> = serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds.into_iter().map(|cmd| execute_command(harness, cmd)).collect())
}
