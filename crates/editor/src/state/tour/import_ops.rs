//! Import normalization
//!
//! Turns a parsed [`TourFile`] of unknown quality into a [`TourDocument`].
//! Order of repairs: navigation order, missing hotspot ids, then the scene
//! map is re-sorted to match the navigation order. Missing, malformed and
//! duplicate hotspot ids all get a fallback id. Hotspots pointing at
//! scenes that do not exist are kept as-is; `dangling_references` reports
//! them.

use std::collections::HashSet;

use indexmap::IndexMap;
use shared::ids::validate_id;
use shared::wire::{SceneEntry, TourFile};
use shared::{FallbackIds, Hotspot, IdRequest, Imagery, Scene, SceneId, SpherePoint, TourDocument};

use super::{TourChange, TourState};

/// Repair a freshly parsed file. `fallback_ids` is moved past every numeric
/// suffix already in the file before any id is handed out.
pub fn normalize_imported_document(file: TourFile, fallback_ids: &mut FallbackIds) -> TourDocument {
    let TourFile { default, scenes } = file;

    let scene_order = normalize_scene_order(default.scene_order, &scenes);

    fallback_ids.bump_past(
        scenes
            .values()
            .flat_map(|s| s.hot_spots.iter())
            .filter_map(|h| h.id.as_deref()),
    );

    let mut used: HashSet<String> = HashSet::new();
    let mut assigned = 0usize;
    let mut converted: IndexMap<SceneId, Scene> = IndexMap::with_capacity(scenes.len());
    for (scene_id, entry) in &scenes {
        let mut scene = scene_from_entry(entry);
        for raw in &entry.hot_spots {
            let id = match raw.id.as_deref().map(validate_id) {
                Some(Ok(IdRequest::Explicit(id))) if !used.contains(id) => id.to_string(),
                other => {
                    if let Some(Err(reason)) = other {
                        tracing::warn!(owner = %scene_id, id = ?raw.id, %reason, "replacing invalid hotspot id");
                    }
                    assigned += 1;
                    fallback_ids.next_id(scene_id, |candidate| {
                        used.contains(candidate) || raw_id_exists(&scenes, candidate)
                    })
                }
            };
            used.insert(id.clone());

            let target_camera = raw
                .target_camera()
                .or_else(|| scenes.get(&raw.scene_id).map(SceneEntry::camera))
                .unwrap_or_default();
            scene.hotspots.push(Hotspot {
                id,
                position: SpherePoint {
                    pitch: raw.pitch,
                    yaw: raw.yaw,
                },
                target_scene_id: raw.scene_id.clone(),
                target_camera,
                label: raw.text.clone(),
            });
        }
        converted.insert(scene_id.clone(), scene);
    }

    // Map iteration order follows navigation order from here on
    let mut ordered: IndexMap<SceneId, Scene> = IndexMap::with_capacity(converted.len());
    for id in &scene_order {
        if let Some(scene) = converted.shift_remove(id) {
            ordered.insert(id.clone(), scene);
        }
    }

    let first_scene = default
        .first_scene
        .filter(|id| ordered.contains_key(id))
        .or_else(|| scene_order.first().cloned())
        .unwrap_or_default();

    let defaults = TourDocument::default();
    let doc = TourDocument {
        scenes: ordered,
        scene_order,
        first_scene,
        fade_duration: default.scene_fade_duration.unwrap_or(defaults.fade_duration),
        auto_load: default.auto_load.unwrap_or(defaults.auto_load),
    };

    let dangling = doc.dangling_references();
    tracing::info!(
        scenes = doc.scenes.len(),
        assigned_ids = assigned,
        dangling = dangling.len(),
        "normalized imported tour"
    );
    for (owner, hotspot, target) in &dangling {
        tracing::warn!(%owner, %hotspot, %target, "hotspot targets a missing scene");
    }
    doc
}

fn raw_id_exists(scenes: &IndexMap<SceneId, SceneEntry>, candidate: &str) -> bool {
    scenes
        .values()
        .flat_map(|s| s.hot_spots.iter())
        .any(|h| h.id.as_deref() == Some(candidate))
}

fn scene_from_entry(entry: &SceneEntry) -> Scene {
    Scene::new(
        Imagery {
            preview: entry.preview.clone(),
            multi_res: entry.multi_res.clone(),
        },
        entry.camera(),
    )
}

/// Missing or empty order falls back to file order. A present order keeps
/// its known ids (first occurrence wins) and gains any scene it forgot.
fn normalize_scene_order(
    order: Option<Vec<SceneId>>,
    scenes: &IndexMap<SceneId, SceneEntry>,
) -> Vec<SceneId> {
    let order = order.unwrap_or_default();
    if order.is_empty() {
        return scenes.keys().cloned().collect();
    }

    let mut seen = HashSet::new();
    let mut result: Vec<SceneId> = order
        .into_iter()
        .filter(|id| scenes.contains_key(id) && seen.insert(id.clone()))
        .collect();
    let missing: Vec<SceneId> = scenes.keys().filter(|id| !seen.contains(*id)).cloned().collect();
    if !missing.is_empty() {
        tracing::warn!(?missing, "scene order was incomplete, appending missing scenes");
        result.extend(missing);
    }
    result
}

impl TourState {
    /// Replace the document with an imported one. Undoable like any edit.
    pub fn load_file(&mut self, file: TourFile) -> TourChange {
        let doc = normalize_imported_document(file, &mut self.fallback_ids);
        self.set_document(doc)
    }

    /// Replace the document wholesale
    pub fn set_document(&mut self, doc: TourDocument) -> TourChange {
        self.fallback_ids
            .bump_past(doc.hotspots().map(|(_, h)| h.id.as_str()));
        self.save_undo();
        self.doc = doc;
        self.commit(TourChange::DocumentReplaced)
    }
}
