//! Current scene and hotspot selection

use shared::{SceneId, TourDocument};

use super::tour::TourChange;

/// What the editor is currently pointed at
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    /// Scene being edited/viewed
    scene: Option<SceneId>,
    /// Index into the current scene's hotspot list
    pub hotspot: Option<usize>,
}

impl SelectionState {
    /// Currently selected scene
    pub fn scene(&self) -> Option<&SceneId> {
        self.scene.as_ref()
    }

    /// Check if a scene is selected
    pub fn is_selected(&self, id: &str) -> bool {
        self.scene.as_deref() == Some(id)
    }

    /// Select a scene (clears hotspot selection)
    pub fn select(&mut self, id: SceneId) {
        if self.scene.as_ref() != Some(&id) {
            self.hotspot = None;
        }
        self.scene = Some(id);
    }

    /// Select a hotspot of the current scene
    pub fn select_hotspot(&mut self, index: usize) {
        self.hotspot = Some(index);
    }

    /// Clear all selection
    pub fn clear(&mut self) {
        self.scene = None;
        self.hotspot = None;
    }

    /// Follow a completed edit. `doc` is the document after the edit.
    pub fn apply(&mut self, change: &TourChange, doc: &TourDocument) {
        match change {
            TourChange::SceneAdded { id } => {
                if self.scene.is_none() {
                    self.select(id.clone());
                }
            }
            TourChange::SceneRenamed { old_id, new_id } => {
                if self.is_selected(old_id) {
                    self.scene = Some(new_id.clone());
                }
            }
            TourChange::SceneDeleted { id, .. } => {
                if self.is_selected(id) {
                    self.scene = doc.scene_order.first().cloned();
                    self.hotspot = None;
                }
            }
            TourChange::HotspotAdded { owner, id } => {
                if self.is_selected(owner) {
                    self.hotspot = doc.scene(owner).and_then(|s| s.hotspot_index(id));
                }
            }
            TourChange::HotspotDeleted { owner, .. } | TourChange::HotspotsReordered { owner } => {
                if self.is_selected(owner) {
                    self.hotspot = None;
                }
            }
            _ => {}
        }
        self.revalidate(doc);
    }

    /// Drop selections that no longer exist in `doc`
    pub fn revalidate(&mut self, doc: &TourDocument) {
        if let Some(id) = &self.scene {
            if !doc.is_scene_id_taken(id) {
                self.scene = doc.scene_order.first().cloned();
                self.hotspot = None;
            }
        } else if !doc.is_empty() {
            self.scene = doc.scene_order.first().cloned();
        }

        let count = self
            .scene
            .as_deref()
            .and_then(|id| doc.scene(id))
            .map_or(0, |s| s.hotspots.len());
        if self.hotspot.is_some_and(|i| i >= count) {
            self.hotspot = None;
        }
    }
}
