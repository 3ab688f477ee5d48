//! Hotspot CRUD and ordering operations

use serde::{Deserialize, Serialize};
use shared::ids::validate_id;
use shared::{Hotspot, HotspotId, IdError, IdRequest, SceneId, SpherePoint};

use super::{TourChange, TourState};
use crate::error::{EditError, EditResult};

/// User-supplied fields of a hotspot, shared by add and edit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HotspotDraft {
    #[serde(default)]
    pub position: SpherePoint,
    pub target_scene_id: SceneId,
    /// Blank means "use the target scene id"
    #[serde(default)]
    pub label: String,
    /// Blank means "generate" on add and "keep" on edit
    #[serde(default)]
    pub id: String,
}

impl HotspotDraft {
    pub fn to(target_scene_id: impl Into<SceneId>, position: SpherePoint) -> Self {
        Self {
            position,
            target_scene_id: target_scene_id.into(),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    fn label_or_target(&self) -> String {
        if self.label.trim().is_empty() {
            self.target_scene_id.clone()
        } else {
            self.label.clone()
        }
    }
}

fn invalid_hotspot_id(id: &str, reason: IdError) -> EditError {
    EditError::InvalidHotspotId {
        id: id.to_string(),
        reason,
    }
}

fn check_position(position: &SpherePoint) -> EditResult<()> {
    if position.is_finite() {
        Ok(())
    } else {
        Err(EditError::NonFinite("hotspot position"))
    }
}

impl TourState {
    /// Owner and target must exist and differ.
    fn check_link(&self, owner: &str, target: &str) -> EditResult<()> {
        self.require_scene(owner)?;
        self.require_scene(target)?;
        if owner == target {
            return Err(EditError::SelfLink(owner.to_string()));
        }
        Ok(())
    }

    fn check_index(&self, owner: &str, index: usize) -> EditResult<&Hotspot> {
        self.require_scene(owner)?
            .hotspots
            .get(index)
            .ok_or_else(|| EditError::HotspotIndexOutOfRange {
                scene: owner.to_string(),
                index,
            })
    }

    /// Resolve the id for a hotspot. `current` is the id being replaced on
    /// edit, which is allowed to keep itself.
    fn resolve_hotspot_id(&self, draft: &HotspotDraft, current: Option<&str>) -> EditResult<HotspotId> {
        match validate_id(&draft.id).map_err(|reason| invalid_hotspot_id(&draft.id, reason))? {
            IdRequest::Auto => Ok(match current {
                Some(id) => id.to_string(),
                None => self.doc.next_hotspot_id(&draft.target_scene_id),
            }),
            IdRequest::Explicit(id) => {
                if Some(id) != current && self.doc.is_hotspot_id_taken(id) {
                    return Err(invalid_hotspot_id(id, IdError::Duplicate));
                }
                Ok(id.to_string())
            }
        }
    }

    /// Append a hotspot to `owner`, snapshotting the target's current camera
    pub fn add_hotspot(&mut self, owner: &str, draft: HotspotDraft) -> EditResult<TourChange> {
        check_position(&draft.position)?;
        self.check_link(owner, &draft.target_scene_id)?;
        let id = self.resolve_hotspot_id(&draft, None)?;
        let target_camera = self.require_scene(&draft.target_scene_id)?.camera;

        let hotspot = Hotspot {
            id: id.clone(),
            position: draft.position,
            label: draft.label_or_target(),
            target_scene_id: draft.target_scene_id,
            target_camera,
        };

        self.save_undo();
        if let Some(scene) = self.doc.scene_mut(owner) {
            scene.hotspots.push(hotspot);
        }

        tracing::info!(owner = %owner, hotspot = %id, "added hotspot");
        Ok(self.commit(TourChange::HotspotAdded {
            owner: owner.to_string(),
            id,
        }))
    }

    /// Overwrite the hotspot at `index`. A new target re-snapshots the
    /// target camera; an unchanged target keeps the stored one.
    pub fn edit_hotspot(&mut self, owner: &str, index: usize, draft: HotspotDraft) -> EditResult<TourChange> {
        check_position(&draft.position)?;
        let existing = self.check_index(owner, index)?;
        let old_id = existing.id.clone();
        let retargeted = existing.target_scene_id != draft.target_scene_id;
        let mut target_camera = existing.target_camera;

        self.check_link(owner, &draft.target_scene_id)?;
        let new_id = self.resolve_hotspot_id(&draft, Some(&old_id))?;
        if retargeted {
            target_camera = self.require_scene(&draft.target_scene_id)?.camera;
        }

        let label = draft.label_or_target();
        self.save_undo();
        if let Some(hotspot) = self
            .doc
            .scene_mut(owner)
            .and_then(|scene| scene.hotspots.get_mut(index))
        {
            hotspot.id = new_id.clone();
            hotspot.position = draft.position;
            hotspot.target_scene_id = draft.target_scene_id;
            hotspot.target_camera = target_camera;
            hotspot.label = label;
        }

        tracing::info!(owner = %owner, hotspot = %new_id, "edited hotspot");
        Ok(self.commit(TourChange::HotspotEdited {
            owner: owner.to_string(),
            old_id,
            new_id,
        }))
    }

    /// Remove the hotspot at `index`
    pub fn delete_hotspot(&mut self, owner: &str, index: usize) -> EditResult<TourChange> {
        let id = self.check_index(owner, index)?.id.clone();

        self.save_undo();
        if let Some(scene) = self.doc.scene_mut(owner) {
            scene.hotspots.remove(index);
        }

        tracing::info!(owner = %owner, hotspot = %id, "deleted hotspot");
        Ok(self.commit(TourChange::HotspotDeleted {
            owner: owner.to_string(),
            id,
        }))
    }

    /// Permute `owner`'s hotspots: position `i` receives old index `order[i]`
    pub fn reorder_hotspots(&mut self, owner: &str, order: &[usize]) -> EditResult<TourChange> {
        let count = self.require_scene(owner)?.hotspots.len();
        let mut seen = vec![false; count];
        let is_bijection = order.len() == count
            && order
                .iter()
                .all(|&i| i < count && !std::mem::replace(&mut seen[i], true));
        if !is_bijection {
            return Err(EditError::NotAHotspotOrder(owner.to_string()));
        }
        if order.iter().enumerate().all(|(pos, &i)| pos == i) {
            return Ok(TourChange::Unchanged);
        }

        self.save_undo();
        if let Some(scene) = self.doc.scene_mut(owner) {
            let old = std::mem::take(&mut scene.hotspots);
            let mut slots: Vec<Option<Hotspot>> = old.into_iter().map(Some).collect();
            scene.hotspots = order.iter().filter_map(|&i| slots[i].take()).collect();
        }
        Ok(self.commit(TourChange::HotspotsReordered {
            owner: owner.to_string(),
        }))
    }
}
