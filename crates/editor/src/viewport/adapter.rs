//! Mirrors completed tour edits onto a live viewer.
//!
//! The document is the source of truth. Each change is replayed with the
//! narrowest viewer calls that express it; if any call errors or answers
//! `false`, the viewer is thrown away and rebuilt from the document.

use shared::wire::{HotSpotEntry, SceneEntry, TourFile};
use shared::{Camera, HotspotId, SceneId, TourDocument};

use super::{PanoramaEngine, RendererError, Viewer, ViewerEvent};
use crate::state::tour::TourChange;

/// How a change reached the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorOutcome {
    /// Nothing the viewer shows was affected
    Skipped,
    /// Replayed with fine-grained calls
    Mirrored,
    /// Viewer discarded and recreated (or dropped, for an empty tour)
    Rebuilt,
}

/// One viewer call of a scene deletion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteStep {
    RemoveHotspot { owner: SceneId, id: HotspotId },
    LoadScene(SceneId),
    RemoveScene(SceneId),
}

/// Order viewer calls for deleting `deleted`. `doc` is the document after
/// the deletion. `None` means no surviving scene exists and only a rebuild
/// can bring the viewer in line.
///
/// When the deleted scene is on screen its own hotspots go first, then the
/// viewer moves to the first surviving scene, then incoming hotspots are
/// stripped, and the scene itself is removed last.
pub fn plan_scene_deletion(
    deleted: &str,
    owned: &[HotspotId],
    incoming: &[(SceneId, HotspotId)],
    active: Option<&str>,
    doc: &TourDocument,
) -> Option<Vec<DeleteStep>> {
    let mut steps = Vec::new();
    if active == Some(deleted) {
        let survivor = doc.scene_order.first()?;
        steps.extend(owned.iter().map(|id| DeleteStep::RemoveHotspot {
            owner: deleted.to_string(),
            id: id.clone(),
        }));
        steps.push(DeleteStep::LoadScene(survivor.clone()));
    }
    steps.extend(incoming.iter().map(|(owner, id)| DeleteStep::RemoveHotspot {
        owner: owner.clone(),
        id: id.clone(),
    }));
    steps.push(DeleteStep::RemoveScene(deleted.to_string()));
    Some(steps)
}

fn refused(call: &'static str, id: &str) -> RendererError {
    RendererError::Refused {
        call,
        id: id.to_string(),
    }
}

/// Owns the engine and at most one live viewer
pub struct RendererAdapter<E: PanoramaEngine> {
    engine: E,
    viewer: Option<E::Viewer>,
    rebuilds: u64,
}

impl<E: PanoramaEngine> RendererAdapter<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            viewer: None,
            rebuilds: 0,
        }
    }

    pub fn viewer(&self) -> Option<&E::Viewer> {
        self.viewer.as_ref()
    }

    pub fn viewer_mut(&mut self) -> Option<&mut E::Viewer> {
        self.viewer.as_mut()
    }

    pub fn is_live(&self) -> bool {
        self.viewer.is_some()
    }

    /// Number of full rebuilds so far
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    pub fn active_scene(&self) -> Option<SceneId> {
        self.viewer.as_ref()?.active_scene()
    }

    pub fn camera(&self) -> Option<Camera> {
        self.viewer.as_ref().map(Viewer::camera)
    }

    /// Drain viewer notifications
    pub fn poll_events(&mut self) -> Vec<ViewerEvent> {
        self.viewer.as_mut().map(Viewer::poll_events).unwrap_or_default()
    }

    /// Replay `change` on the viewer. `doc` is the document after the change.
    pub fn mirror(&mut self, change: &TourChange, doc: &TourDocument) -> MirrorOutcome {
        if *change == TourChange::Unchanged {
            return MirrorOutcome::Skipped;
        }
        if self.viewer.is_none() {
            return if doc.is_empty() {
                MirrorOutcome::Skipped
            } else {
                self.rebuild(doc)
            };
        }

        match self.try_mirror(change, doc) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, ?change, "renderer out of sync, rebuilding");
                self.rebuild(doc)
            }
        }
    }

    /// Throw the viewer away and recreate it from `doc`, keeping the scene
    /// and camera that were on screen when they still exist.
    pub fn rebuild(&mut self, doc: &TourDocument) -> MirrorOutcome {
        let focus = self.current_focus();
        self.rebuild_with_focus(doc, focus)
    }

    fn current_focus(&self) -> Option<(SceneId, Camera)> {
        let viewer = self.viewer.as_ref()?;
        Some((viewer.active_scene()?, viewer.camera()))
    }

    fn rebuild_with_focus(&mut self, doc: &TourDocument, focus: Option<(SceneId, Camera)>) -> MirrorOutcome {
        self.rebuilds += 1;
        if let Some(viewer) = self.viewer.take() {
            viewer.destroy();
        }
        if doc.is_empty() {
            tracing::debug!("tour is empty, no viewer");
            return MirrorOutcome::Rebuilt;
        }

        let mut viewer = match self.engine.create(&TourFile::from(doc)) {
            Ok(viewer) => viewer,
            Err(e) => {
                tracing::error!(error = %e, "failed to create viewer");
                return MirrorOutcome::Rebuilt;
            }
        };
        if let Some((scene, camera)) = focus.filter(|(scene, _)| doc.is_scene_id_taken(scene)) {
            if viewer.active_scene().as_deref() != Some(scene.as_str()) || viewer.camera() != camera {
                if let Err(e) = viewer.load_scene(&scene, Some(camera)) {
                    tracing::warn!(error = %e, %scene, "could not restore scene after rebuild");
                }
            }
        }
        tracing::debug!(rebuilds = self.rebuilds, "viewer rebuilt");
        self.viewer = Some(viewer);
        MirrorOutcome::Rebuilt
    }

    fn try_mirror(&mut self, change: &TourChange, doc: &TourDocument) -> Result<MirrorOutcome, RendererError> {
        match change {
            TourChange::Unchanged
            | TourChange::SceneOrderChanged
            | TourChange::FirstSceneChanged { .. }
            | TourChange::TourOptionsChanged => Ok(MirrorOutcome::Skipped),

            TourChange::DocumentReplaced => Ok(self.rebuild(doc)),

            TourChange::SceneRenamed { old_id, new_id } => {
                let focus = self
                    .current_focus()
                    .map(|(scene, camera)| if scene == *old_id { (new_id.clone(), camera) } else { (scene, camera) });
                Ok(self.rebuild_with_focus(doc, focus))
            }

            TourChange::SceneAdded { id } => {
                let entry = scene_entry(doc, id)?;
                self.live()?.add_scene(id, &entry)?;
                Ok(MirrorOutcome::Mirrored)
            }

            TourChange::SceneEdited { id } => {
                if self.active_scene().as_deref() == Some(id.as_str()) {
                    return Ok(self.rebuild(doc));
                }
                let entry = scene_entry(doc, id)?;
                let viewer = self.live()?;
                if !viewer.remove_scene(id)? {
                    return Err(refused("remove_scene", id));
                }
                viewer.add_scene(id, &entry)?;
                Ok(MirrorOutcome::Mirrored)
            }

            TourChange::SceneDeleted { id, owned, incoming } => {
                let active = self.active_scene();
                match plan_scene_deletion(id, owned, incoming, active.as_deref(), doc) {
                    Some(steps) => {
                        self.run_delete_plan(id, &steps)?;
                        Ok(MirrorOutcome::Mirrored)
                    }
                    None => Ok(self.rebuild(doc)),
                }
            }

            TourChange::HotspotAdded { owner, id } => {
                let entry = hotspot_entry(doc, owner, id)?;
                self.live()?.add_hotspot(&entry, owner)?;
                Ok(MirrorOutcome::Mirrored)
            }

            TourChange::HotspotEdited { owner, old_id, new_id } => {
                self.resend_hotspots(owner, doc, Some((new_id, old_id)))?;
                Ok(MirrorOutcome::Mirrored)
            }

            TourChange::HotspotDeleted { owner, id } => {
                self.remove_hotspot_anywhere(owner, id)?;
                Ok(MirrorOutcome::Mirrored)
            }

            TourChange::HotspotsReordered { owner } => {
                self.resend_hotspots(owner, doc, None)?;
                Ok(MirrorOutcome::Mirrored)
            }

            TourChange::ViewCaptured { scene_id, updated } => {
                if self.active_scene().as_deref() == Some(scene_id.as_str()) {
                    return Ok(self.rebuild(doc));
                }
                let entry = scene_entry(doc, scene_id)?;
                let viewer = self.live()?;
                if !viewer.remove_scene(scene_id)? {
                    return Err(refused("remove_scene", scene_id));
                }
                viewer.add_scene(scene_id, &entry)?;

                let mut owners: Vec<&str> = updated
                    .iter()
                    .map(|(owner, _)| owner.as_str())
                    .filter(|owner| *owner != scene_id.as_str())
                    .collect();
                owners.dedup();
                for owner in owners {
                    self.resend_hotspots(owner, doc, None)?;
                }
                Ok(MirrorOutcome::Mirrored)
            }
        }
    }

    fn live(&mut self) -> Result<&mut E::Viewer, RendererError> {
        self.viewer
            .as_mut()
            .ok_or_else(|| RendererError::Create("no live viewer".to_string()))
    }

    /// Remove a hotspot, loading its owner scene for the call when the
    /// viewer refuses and returning to the previous scene afterwards.
    fn remove_hotspot_anywhere(&mut self, owner: &str, id: &str) -> Result<(), RendererError> {
        let viewer = self.live()?;
        if viewer.remove_hotspot(id, owner)? {
            return Ok(());
        }
        let Some(back) = viewer.active_scene().filter(|active| active != owner) else {
            return Err(refused("remove_hotspot", id));
        };
        let camera = viewer.camera();
        tracing::debug!(%owner, hotspot = %id, "loading owner scene to remove hotspot");
        viewer.load_scene(owner, None)?;
        let removed = viewer.remove_hotspot(id, owner)?;
        viewer.load_scene(&back, Some(camera))?;
        if removed {
            Ok(())
        } else {
            Err(refused("remove_hotspot", id))
        }
    }

    /// Replace all of `owner`'s hotspots so the viewer holds them in
    /// document order. `renamed` is (new id, id the viewer still knows).
    fn resend_hotspots(
        &mut self,
        owner: &str,
        doc: &TourDocument,
        renamed: Option<(&str, &str)>,
    ) -> Result<(), RendererError> {
        let scene = doc
            .scene(owner)
            .ok_or_else(|| RendererError::UnknownScene(owner.to_string()))?;
        for hotspot in &scene.hotspots {
            let known_as = match renamed {
                Some((new_id, old_id)) if hotspot.id == new_id => old_id,
                _ => hotspot.id.as_str(),
            };
            self.remove_hotspot_anywhere(owner, known_as)?;
        }
        for hotspot in &scene.hotspots {
            self.live()?.add_hotspot(&HotSpotEntry::from(hotspot), owner)?;
        }
        Ok(())
    }

    fn run_delete_plan(&mut self, deleted: &str, steps: &[DeleteStep]) -> Result<(), RendererError> {
        for step in steps {
            tracing::debug!(?step, "scene deletion step");
            match step {
                DeleteStep::RemoveHotspot { owner, id } => self.remove_hotspot_anywhere(owner, id)?,
                DeleteStep::LoadScene(id) => self.live()?.load_scene(id, None)?,
                DeleteStep::RemoveScene(id) => {
                    if !self.live()?.remove_scene(id)? {
                        return Err(refused("remove_scene", id));
                    }
                }
            }
        }
        if self.active_scene().as_deref() == Some(deleted) {
            return Err(refused("load_scene", deleted));
        }
        Ok(())
    }
}

fn scene_entry(doc: &TourDocument, id: &str) -> Result<SceneEntry, RendererError> {
    doc.scene(id)
        .map(SceneEntry::from)
        .ok_or_else(|| RendererError::UnknownScene(id.to_string()))
}

fn hotspot_entry(doc: &TourDocument, owner: &str, id: &str) -> Result<HotSpotEntry, RendererError> {
    doc.scene(owner)
        .and_then(|s| s.hotspots.iter().find(|h| h.id == id))
        .map(HotSpotEntry::from)
        .ok_or_else(|| RendererError::UnknownScene(owner.to_string()))
}
