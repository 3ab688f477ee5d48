//! Scene CRUD and ordering operations

use shared::ids::{require_id, validate_id};
use shared::{Camera, IdError, IdRequest, Imagery, Scene, SceneId};

use super::{TourChange, TourState};
use crate::error::{EditError, EditResult};

/// Single-step move in navigation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Up,
    Down,
}

impl MoveDirection {
    fn as_str(self) -> &'static str {
        match self {
            MoveDirection::Up => "up",
            MoveDirection::Down => "down",
        }
    }
}

fn invalid_scene_id(id: &str, reason: IdError) -> EditError {
    EditError::InvalidSceneId {
        id: id.to_string(),
        reason,
    }
}

pub(super) fn check_camera(camera: &Camera) -> EditResult<()> {
    if camera.is_finite() {
        Ok(())
    } else {
        Err(EditError::NonFinite("camera"))
    }
}

impl TourState {
    pub(crate) fn require_scene(&self, id: &str) -> EditResult<&Scene> {
        self.doc
            .scene(id)
            .ok_or_else(|| EditError::SceneNotFound(id.to_string()))
    }

    /// Add a scene. A blank id is replaced by the lowest free `scene_N`.
    pub fn add_scene(&mut self, id: &str, imagery: Imagery, camera: Camera) -> EditResult<TourChange> {
        check_camera(&camera)?;
        let id = match validate_id(id).map_err(|reason| invalid_scene_id(id, reason))? {
            IdRequest::Auto => self.doc.next_scene_id(),
            IdRequest::Explicit(explicit) => {
                if self.doc.is_scene_id_taken(explicit) {
                    return Err(invalid_scene_id(explicit, IdError::Duplicate));
                }
                explicit.to_string()
            }
        };

        self.save_undo();
        let was_empty = self.doc.is_empty();
        self.doc.scenes.insert(id.clone(), Scene::new(imagery, camera));
        self.doc.scene_order.push(id.clone());
        if was_empty {
            self.doc.first_scene = id.clone();
        }

        tracing::info!(scene = %id, "added scene");
        Ok(self.commit(TourChange::SceneAdded { id }))
    }

    /// Replace imagery and/or camera defaults. Hotspots targeting the scene
    /// keep their snapshot; use `capture_view` to propagate a camera.
    pub fn edit_scene(
        &mut self,
        id: &str,
        imagery: Option<Imagery>,
        camera: Option<Camera>,
    ) -> EditResult<TourChange> {
        self.require_scene(id)?;
        if let Some(camera) = &camera {
            check_camera(camera)?;
        }
        if imagery.is_none() && camera.is_none() {
            return Ok(TourChange::Unchanged);
        }

        self.save_undo();
        if let Some(scene) = self.doc.scene_mut(id) {
            if let Some(imagery) = imagery {
                scene.imagery = imagery;
            }
            if let Some(camera) = camera {
                scene.camera = camera;
            }
        }
        Ok(self.commit(TourChange::SceneEdited { id: id.to_string() }))
    }

    /// Change a scene's id in place. Map position, navigation position and
    /// every incoming hotspot follow; hotspot labels are left alone.
    pub fn rename_scene(&mut self, old_id: &str, new_id: &str) -> EditResult<TourChange> {
        self.require_scene(old_id)?;
        let new_id = require_id(new_id).map_err(|reason| invalid_scene_id(new_id, reason))?;
        if new_id == old_id {
            return Ok(TourChange::Unchanged);
        }
        if self.doc.is_scene_id_taken(new_id) {
            return Err(invalid_scene_id(new_id, IdError::Duplicate));
        }

        self.save_undo();
        let doc = &mut self.doc;
        if let Some((index, _, scene)) = doc.scenes.shift_remove_full(old_id) {
            doc.scenes.shift_insert(index, new_id.to_string(), scene);
        }
        for entry in doc.scene_order.iter_mut().filter(|s| s.as_str() == old_id) {
            *entry = new_id.to_string();
        }
        for scene in doc.scenes.values_mut() {
            for hotspot in scene.hotspots.iter_mut().filter(|h| h.target_scene_id == old_id) {
                hotspot.target_scene_id = new_id.to_string();
            }
        }
        if doc.first_scene == old_id {
            doc.first_scene = new_id.to_string();
        }

        tracing::info!(from = %old_id, to = %new_id, "renamed scene");
        Ok(self.commit(TourChange::SceneRenamed {
            old_id: old_id.to_string(),
            new_id: new_id.to_string(),
        }))
    }

    /// Delete a scene with its own hotspots and every hotspot linking to it.
    pub fn delete_scene(&mut self, id: &str) -> EditResult<TourChange> {
        let owned = self
            .require_scene(id)?
            .hotspots
            .iter()
            .map(|h| h.id.clone())
            .collect::<Vec<_>>();
        let incoming: Vec<_> = self
            .doc
            .hotspots_targeting(id)
            .into_iter()
            .filter(|(owner, _)| owner != id)
            .collect();

        self.save_undo();
        let doc = &mut self.doc;
        doc.scenes.shift_remove(id);
        for scene in doc.scenes.values_mut() {
            scene.hotspots.retain(|h| h.target_scene_id != id);
        }
        doc.scene_order.retain(|s| s != id);
        if doc.first_scene == id {
            doc.first_scene = doc.scene_order.first().cloned().unwrap_or_default();
        }

        tracing::info!(
            scene = %id,
            owned = owned.len(),
            incoming = incoming.len(),
            "deleted scene"
        );
        Ok(self.commit(TourChange::SceneDeleted {
            id: id.to_string(),
            owned,
            incoming,
        }))
    }

    /// Replace the navigation order. Must be a permutation of the scene ids.
    pub fn reorder_scenes(&mut self, new_order: Vec<SceneId>) -> EditResult<TourChange> {
        if !self.doc.is_scene_permutation(&new_order) {
            return Err(EditError::NotASceneOrder);
        }
        if new_order == self.doc.scene_order {
            return Ok(TourChange::Unchanged);
        }

        self.save_undo();
        self.doc.scene_order = new_order;
        Ok(self.commit(TourChange::SceneOrderChanged))
    }

    /// Swap a scene with its neighbour in navigation order
    pub fn move_scene(&mut self, id: &str, direction: MoveDirection) -> EditResult<TourChange> {
        let pos = self.order_position(id)?;
        let other = match direction {
            MoveDirection::Up => pos.checked_sub(1),
            MoveDirection::Down => Some(pos + 1).filter(|&p| p < self.doc.scene_order.len()),
        }
        .ok_or_else(|| EditError::AtBoundary {
            id: id.to_string(),
            direction: direction.as_str(),
        })?;

        let mut order = self.doc.scene_order.clone();
        order.swap(pos, other);
        self.reorder_scenes(order)
    }

    /// Drag-and-drop reposition; indices past the end clamp to the end
    pub fn move_scene_to(&mut self, id: &str, index: usize) -> EditResult<TourChange> {
        let pos = self.order_position(id)?;
        let mut order = self.doc.scene_order.clone();
        let moved = order.remove(pos);
        order.insert(index.min(order.len()), moved);
        self.reorder_scenes(order)
    }

    fn order_position(&self, id: &str) -> EditResult<usize> {
        self.doc
            .scene_order
            .iter()
            .position(|s| s == id)
            .ok_or_else(|| EditError::SceneNotFound(id.to_string()))
    }

    /// Choose the scene loaded on startup
    pub fn set_first_scene(&mut self, id: &str) -> EditResult<TourChange> {
        self.require_scene(id)?;
        if self.doc.first_scene == id {
            return Ok(TourChange::Unchanged);
        }
        self.save_undo();
        self.doc.first_scene = id.to_string();
        Ok(self.commit(TourChange::FirstSceneChanged { id: id.to_string() }))
    }

    /// Update pass-through presentation settings
    pub fn set_tour_options(
        &mut self,
        fade_duration: Option<f64>,
        auto_load: Option<bool>,
    ) -> EditResult<TourChange> {
        if fade_duration.is_some_and(|fade| !fade.is_finite()) {
            return Err(EditError::NonFinite("fade duration"));
        }
        if fade_duration.is_none() && auto_load.is_none() {
            return Ok(TourChange::Unchanged);
        }
        self.save_undo();
        if let Some(fade) = fade_duration {
            self.doc.fade_duration = fade;
        }
        if let Some(auto_load) = auto_load {
            self.doc.auto_load = auto_load;
        }
        Ok(self.commit(TourChange::TourOptionsChanged))
    }

    /// Replace the document with an empty one
    pub fn clear(&mut self) -> TourChange {
        self.save_undo();
        self.doc = shared::TourDocument {
            fade_duration: self.doc.fade_duration,
            auto_load: self.doc.auto_load,
            ..Default::default()
        };
        self.commit(TourChange::DocumentReplaced)
    }
}

#[cfg(test)]
mod tests {
    use shared::{Hotspot, SpherePoint};

    use super::*;

    fn tour_with(ids: &[&str]) -> TourState {
        let mut tour = TourState::default();
        for id in ids {
            tour.add_scene(id, Imagery::at(format!("/tiles/{id}")), Camera::default())
                .unwrap();
        }
        tour
    }

    fn link(tour: &mut TourState, owner: &str, id: &str, target: &str, label: &str) {
        tour.doc.scenes[owner].hotspots.push(Hotspot {
            id: id.to_string(),
            position: SpherePoint::default(),
            target_scene_id: target.to_string(),
            target_camera: Camera::default(),
            label: label.to_string(),
        });
    }

    #[test]
    fn test_first_scene_set_only_on_empty_document() {
        let mut tour = TourState::default();
        tour.add_scene("lobby", Imagery::default(), Camera::default()).unwrap();
        assert_eq!(tour.doc.first_scene, "lobby");
        assert_eq!(tour.doc.scene_order, ["lobby"]);

        tour.add_scene("hall", Imagery::default(), Camera::default()).unwrap();
        assert_eq!(tour.doc.first_scene, "lobby");
        assert_eq!(tour.doc.scene_order, ["lobby", "hall"]);
    }

    #[test]
    fn test_add_scene_rejects_bad_and_duplicate_ids() {
        let mut tour = tour_with(&["A"]);
        assert_eq!(
            tour.add_scene("A", Imagery::default(), Camera::default()),
            Err(EditError::InvalidSceneId { id: "A".into(), reason: IdError::Duplicate })
        );
        assert!(matches!(
            tour.add_scene("a/b", Imagery::default(), Camera::default()),
            Err(EditError::InvalidSceneId { reason: IdError::BadCharacters, .. })
        ));
        assert_eq!(tour.doc.scenes.len(), 1);
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        let mut tour = tour_with(&["A"]);
        let bad = Camera { pitch: f64::NAN, ..Camera::default() };

        assert_eq!(
            tour.add_scene("B", Imagery::default(), bad),
            Err(EditError::NonFinite("camera"))
        );
        assert_eq!(tour.edit_scene("A", None, Some(bad)), Err(EditError::NonFinite("camera")));
        assert_eq!(
            tour.set_tour_options(Some(f64::INFINITY), Some(false)),
            Err(EditError::NonFinite("fade duration"))
        );
        assert_eq!(tour.doc.scene_order, ["A"]);
        assert!(tour.doc.auto_load);
    }

    #[test]
    fn test_add_scene_blank_id_generates() {
        let mut tour = tour_with(&["scene_1"]);
        let change = tour.add_scene("", Imagery::default(), Camera::default()).unwrap();
        assert_eq!(change, TourChange::SceneAdded { id: "scene_2".into() });
    }

    #[test]
    fn test_rename_preserves_positions_and_labels() {
        let mut tour = tour_with(&["A", "B", "C"]);
        link(&mut tour, "B", "hs_A_001", "A", "Go to A");
        tour.reorder_scenes(vec!["C".into(), "A".into(), "B".into()]).unwrap();

        tour.rename_scene("A", "Alpha").unwrap();

        let keys: Vec<&str> = tour.doc.scenes.keys().map(String::as_str).collect();
        assert_eq!(keys, ["Alpha", "B", "C"]);
        assert_eq!(tour.doc.scene_order, ["C", "Alpha", "B"]);
        assert_eq!(tour.doc.first_scene, "Alpha");
        let hs = &tour.doc.scenes["B"].hotspots[0];
        assert_eq!(hs.target_scene_id, "Alpha");
        assert_eq!(hs.label, "Go to A");
        assert!(tour.doc.check_invariants().is_empty());
    }

    #[test]
    fn test_rename_validation() {
        let mut tour = tour_with(&["A", "B"]);
        assert_eq!(tour.rename_scene("missing", "X"), Err(EditError::SceneNotFound("missing".into())));
        assert!(matches!(
            tour.rename_scene("A", ""),
            Err(EditError::InvalidSceneId { reason: IdError::Empty, .. })
        ));
        assert!(matches!(
            tour.rename_scene("A", "B"),
            Err(EditError::InvalidSceneId { reason: IdError::Duplicate, .. })
        ));
        assert_eq!(tour.rename_scene("A", "A"), Ok(TourChange::Unchanged));
        assert_eq!(tour.version(), 2);
    }

    #[test]
    fn test_delete_cascades_to_owned_and_incoming_hotspots() {
        let mut tour = tour_with(&["A", "B", "C"]);
        link(&mut tour, "A", "a_to_b", "B", "B");
        link(&mut tour, "A", "a_to_c", "C", "C");
        link(&mut tour, "C", "c_to_b", "B", "B");
        link(&mut tour, "B", "b_to_a", "A", "A");
        tour.set_first_scene("B").unwrap();

        let change = tour.delete_scene("B").unwrap();
        assert_eq!(
            change,
            TourChange::SceneDeleted {
                id: "B".into(),
                owned: vec!["b_to_a".into()],
                incoming: vec![("A".into(), "a_to_b".into()), ("C".into(), "c_to_b".into())],
            }
        );

        assert_eq!(tour.doc.scene_order, ["A", "C"]);
        assert_eq!(tour.doc.first_scene, "A");
        let remaining: Vec<&str> = tour.doc.hotspots().map(|(_, h)| h.id.as_str()).collect();
        assert_eq!(remaining, ["a_to_c"]);
        assert!(tour.doc.check_invariants().is_empty());
    }

    #[test]
    fn test_delete_last_scene_clears_first_scene() {
        let mut tour = tour_with(&["A"]);
        tour.delete_scene("A").unwrap();
        assert_eq!(tour.doc.first_scene, "");
        assert!(tour.doc.scene_order.is_empty());
        assert_eq!(tour.delete_scene("A"), Err(EditError::SceneNotFound("A".into())));
    }

    #[test]
    fn test_reorder_requires_permutation() {
        let mut tour = tour_with(&["A", "B", "C"]);
        let before = tour.doc.clone();
        assert_eq!(
            tour.reorder_scenes(vec!["A".into(), "C".into()]),
            Err(EditError::NotASceneOrder)
        );
        assert_eq!(tour.doc, before);
        assert!(tour.reorder_scenes(vec!["B".into(), "C".into(), "A".into()]).is_ok());
        assert_eq!(tour.doc.scene_order, ["B", "C", "A"]);
    }

    #[test]
    fn test_move_scene_up_down_and_to() {
        let mut tour = tour_with(&["A", "B", "C"]);
        tour.move_scene("C", MoveDirection::Up).unwrap();
        assert_eq!(tour.doc.scene_order, ["A", "C", "B"]);
        assert!(matches!(
            tour.move_scene("A", MoveDirection::Up),
            Err(EditError::AtBoundary { .. })
        ));
        assert!(matches!(
            tour.move_scene("B", MoveDirection::Down),
            Err(EditError::AtBoundary { .. })
        ));
        tour.move_scene_to("A", 99).unwrap();
        assert_eq!(tour.doc.scene_order, ["C", "B", "A"]);
        tour.move_scene_to("A", 0).unwrap();
        assert_eq!(tour.doc.scene_order, ["A", "C", "B"]);
    }

    #[test]
    fn test_edit_scene_camera_does_not_touch_hotspots() {
        let mut tour = tour_with(&["A", "B"]);
        link(&mut tour, "A", "a_to_b", "B", "B");
        let camera = Camera { pitch: 10.0, yaw: 20.0, hfov: 70.0 };
        tour.edit_scene("B", None, Some(camera)).unwrap();
        assert_eq!(tour.doc.scenes["B"].camera, camera);
        assert_eq!(tour.doc.scenes["A"].hotspots[0].target_camera, Camera::default());
    }

    #[test]
    fn test_tour_options_and_clear() {
        let mut tour = tour_with(&["A"]);
        tour.set_tour_options(Some(250.0), Some(false)).unwrap();
        tour.clear();
        assert!(tour.doc.is_empty());
        assert_eq!(tour.doc.fade_duration, 250.0);
        assert!(!tour.doc.auto_load);
        assert!(tour.can_undo());
    }
}
