//! Editor session: the single owner of the tour state and the live viewer.
//!
//! Every edit goes through here. A successful edit updates the selection,
//! is mirrored onto the viewer, and (when enabled) autosaved. A rejected
//! edit is logged and returned unchanged to the caller.

use std::path::Path;

use shared::{Camera, Imagery, SceneId, SpherePoint};

use crate::error::{EditError, EditResult, ExportError, ImportError};
use crate::serialization::{export_tour, load_tour_file, parse_tour, save_tour_file};
use crate::state::tour::{HotspotDraft, MoveDirection, TourChange, TourState};
use crate::state::{AppState, EditorSettings};
use crate::viewport::{MirrorOutcome, PanoramaEngine, PointerEvent, RendererAdapter, Viewer, ViewerEvent};

/// Application state plus the renderer it drives
pub struct EditorSession<E: PanoramaEngine> {
    pub state: AppState,
    renderer: RendererAdapter<E>,
    last_outcome: MirrorOutcome,
    last_saved_version: u64,
}

impl<E: PanoramaEngine> EditorSession<E> {
    pub fn new(engine: E, settings: EditorSettings) -> Self {
        let state = AppState::with_settings(settings);
        let last_saved_version = state.tour.version();
        Self {
            state,
            renderer: RendererAdapter::new(engine),
            last_outcome: MirrorOutcome::Skipped,
            last_saved_version,
        }
    }

    pub fn tour(&self) -> &TourState {
        &self.state.tour
    }

    pub fn renderer(&self) -> &RendererAdapter<E> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut RendererAdapter<E> {
        &mut self.renderer
    }

    /// How the most recent edit reached the viewer
    pub fn last_outcome(&self) -> MirrorOutcome {
        self.last_outcome
    }

    pub fn selected_scene(&self) -> Option<&SceneId> {
        self.state.selection.scene()
    }

    fn apply(&mut self, result: EditResult<TourChange>) -> EditResult<TourChange> {
        let change = match result {
            Ok(change) => change,
            Err(e) => {
                tracing::warn!(error = %e, "edit rejected");
                return Err(e);
            }
        };
        self.after_change(&change);
        Ok(change)
    }

    fn after_change(&mut self, change: &TourChange) {
        let doc = &self.state.tour.doc;
        self.state.selection.apply(change, doc);
        self.last_outcome = self.renderer.mirror(change, doc);
        self.pump_renderer_events();

        let version = self.state.tour.version();
        if self.state.settings.autosave && version != self.last_saved_version {
            self.state.tour.autosave();
            self.last_saved_version = version;
        }
    }

    // ── Scenes ────────────────────────────────────────────────

    /// Add a scene with the configured default camera
    pub fn add_scene(&mut self, id: &str, imagery: Imagery) -> EditResult<TourChange> {
        let camera = self.state.settings.scene.camera;
        self.add_scene_with_camera(id, imagery, camera)
    }

    pub fn add_scene_with_camera(&mut self, id: &str, imagery: Imagery, camera: Camera) -> EditResult<TourChange> {
        let result = self.state.tour.add_scene(id, imagery, camera);
        self.apply(result)
    }

    /// Add a scene whose tiles live under `base_path`, using the configured tiling
    pub fn add_scene_at(&mut self, id: &str, base_path: &str) -> EditResult<TourChange> {
        let imagery = self.state.settings.scene.imagery_at(base_path);
        self.add_scene(id, imagery)
    }

    pub fn edit_scene(&mut self, id: &str, imagery: Option<Imagery>, camera: Option<Camera>) -> EditResult<TourChange> {
        let result = self.state.tour.edit_scene(id, imagery, camera);
        self.apply(result)
    }

    pub fn rename_scene(&mut self, old_id: &str, new_id: &str) -> EditResult<TourChange> {
        let result = self.state.tour.rename_scene(old_id, new_id);
        self.apply(result)
    }

    pub fn delete_scene(&mut self, id: &str) -> EditResult<TourChange> {
        let result = self.state.tour.delete_scene(id);
        self.apply(result)
    }

    pub fn reorder_scenes(&mut self, order: Vec<SceneId>) -> EditResult<TourChange> {
        let result = self.state.tour.reorder_scenes(order);
        self.apply(result)
    }

    pub fn move_scene(&mut self, id: &str, direction: MoveDirection) -> EditResult<TourChange> {
        let result = self.state.tour.move_scene(id, direction);
        self.apply(result)
    }

    pub fn move_scene_to(&mut self, id: &str, index: usize) -> EditResult<TourChange> {
        let result = self.state.tour.move_scene_to(id, index);
        self.apply(result)
    }

    pub fn set_first_scene(&mut self, id: &str) -> EditResult<TourChange> {
        let result = self.state.tour.set_first_scene(id);
        self.apply(result)
    }

    pub fn set_tour_options(&mut self, fade_duration: Option<f64>, auto_load: Option<bool>) -> EditResult<TourChange> {
        let result = self.state.tour.set_tour_options(fade_duration, auto_load);
        self.apply(result)
    }

    /// Start over with an empty tour (undoable)
    pub fn clear(&mut self) -> TourChange {
        let change = self.state.tour.clear();
        self.after_change(&change);
        change
    }

    // ── Hotspots ──────────────────────────────────────────────

    pub fn add_hotspot(&mut self, owner: &str, draft: HotspotDraft) -> EditResult<TourChange> {
        let result = self.state.tour.add_hotspot(owner, draft);
        self.apply(result)
    }

    pub fn edit_hotspot(&mut self, owner: &str, index: usize, draft: HotspotDraft) -> EditResult<TourChange> {
        let result = self.state.tour.edit_hotspot(owner, index, draft);
        self.apply(result)
    }

    pub fn delete_hotspot(&mut self, owner: &str, index: usize) -> EditResult<TourChange> {
        let result = self.state.tour.delete_hotspot(owner, index);
        self.apply(result)
    }

    pub fn reorder_hotspots(&mut self, owner: &str, order: &[usize]) -> EditResult<TourChange> {
        let result = self.state.tour.reorder_hotspots(owner, order);
        self.apply(result)
    }

    // ── Camera ────────────────────────────────────────────────

    pub fn capture_view(&mut self, scene_id: &str, camera: Camera) -> EditResult<TourChange> {
        let result = self.state.tour.capture_view(scene_id, camera);
        self.apply(result)
    }

    /// Capture the viewer's live camera into the scene it is showing
    pub fn capture_live_view(&mut self) -> EditResult<TourChange> {
        let scene = self.renderer.active_scene().ok_or(EditError::NoLiveView)?;
        let camera = self.renderer.camera().ok_or(EditError::NoLiveView)?;
        self.capture_view(&scene, camera)
    }

    // ── Renderer-assisted editing ─────────────────────────────

    /// Sphere point under the pointer in the scene on screen
    pub fn pointer_position(&self, event: &PointerEvent) -> EditResult<(SceneId, SpherePoint)> {
        let viewer = self.renderer.viewer().ok_or(EditError::NoLiveView)?;
        let scene = viewer.active_scene().ok_or(EditError::NoLiveView)?;
        let point = viewer.pointer_to_sphere(event).ok_or(EditError::PointerMissed)?;
        Ok((scene, point))
    }

    /// Drop a hotspot where the user clicked. The owner is the scene on
    /// screen; the position in `draft` is replaced.
    pub fn place_hotspot_at_pointer(&mut self, event: &PointerEvent, draft: HotspotDraft) -> EditResult<TourChange> {
        let (owner, position) = self.pointer_position(event)?;
        self.add_hotspot(&owner, HotspotDraft { position, ..draft })
    }

    /// Show where a hotspot leads: load its target and animate to the
    /// stored arrival camera.
    pub fn preview_hotspot_target(&mut self, owner: &str, index: usize) -> EditResult<()> {
        let hotspot = self
            .state
            .tour
            .doc
            .scene(owner)
            .ok_or_else(|| EditError::SceneNotFound(owner.to_string()))?
            .hotspots
            .get(index)
            .ok_or_else(|| EditError::HotspotIndexOutOfRange {
                scene: owner.to_string(),
                index,
            })?;
        let target = hotspot.target_scene_id.clone();
        let camera = hotspot.target_camera;
        if !self.state.tour.doc.is_scene_id_taken(&target) {
            return Err(EditError::SceneNotFound(target));
        }
        let duration = self.state.settings.preview_animation_ms;

        let viewer = self.renderer.viewer_mut().ok_or(EditError::NoLiveView)?;
        let result = viewer
            .load_scene(&target, None)
            .and_then(|()| viewer.animate_to(camera, duration));
        if let Err(e) = result {
            tracing::warn!(error = %e, "preview failed, rebuilding viewer");
            self.renderer.rebuild(&self.state.tour.doc);
        }
        self.pump_renderer_events();
        Ok(())
    }

    // ── Navigation ────────────────────────────────────────────

    /// Select a scene and show it
    pub fn select_scene(&mut self, id: &str) -> EditResult<()> {
        if !self.state.tour.doc.is_scene_id_taken(id) {
            return Err(EditError::SceneNotFound(id.to_string()));
        }
        self.state.selection.select(id.to_string());
        let failed = self
            .renderer
            .viewer_mut()
            .and_then(|viewer| viewer.load_scene(id, None).err());
        if let Some(e) = failed {
            tracing::warn!(error = %e, scene = %id, "load failed, rebuilding viewer");
            self.renderer.rebuild(&self.state.tour.doc);
        }
        self.pump_renderer_events();
        Ok(())
    }

    pub fn select_hotspot(&mut self, index: usize) -> EditResult<()> {
        let scene = self.selected_scene().ok_or(EditError::NoSelection)?.clone();
        let count = self.state.tour.doc.scene(&scene).map_or(0, |s| s.hotspots.len());
        if index >= count {
            return Err(EditError::HotspotIndexOutOfRange { scene, index });
        }
        self.state.selection.select_hotspot(index);
        Ok(())
    }

    /// Show the scene after the current one in navigation order
    pub fn go_next(&mut self) -> EditResult<SceneId> {
        let current = self.selected_scene().ok_or(EditError::NoSelection)?;
        let next = self
            .state
            .tour
            .doc
            .next_scene(current)
            .cloned()
            .ok_or(EditError::NoSelection)?;
        self.select_scene(&next)?;
        Ok(next)
    }

    /// Show the scene before the current one in navigation order
    pub fn go_previous(&mut self) -> EditResult<SceneId> {
        let current = self.selected_scene().ok_or(EditError::NoSelection)?;
        let previous = self
            .state
            .tour
            .doc
            .previous_scene(current)
            .cloned()
            .ok_or(EditError::NoSelection)?;
        self.select_scene(&previous)?;
        Ok(previous)
    }

    /// Apply viewer notifications to the selection. Only the scene the
    /// viewer ended on counts; transient visits made while mirroring an
    /// edit never reach the selection.
    pub fn pump_renderer_events(&mut self) {
        let doc = &self.state.tour.doc;
        let landed = self
            .renderer
            .poll_events()
            .into_iter()
            .rev()
            .find_map(|event| match event {
                ViewerEvent::SceneChanged(id) => doc.is_scene_id_taken(&id).then_some(id),
            });
        if let Some(id) = landed {
            self.state.selection.select(id);
        }
    }

    // ── History ───────────────────────────────────────────────

    pub fn undo(&mut self) -> Option<TourChange> {
        let change = self.state.tour.undo()?;
        self.after_change(&change);
        Some(change)
    }

    pub fn redo(&mut self) -> Option<TourChange> {
        let change = self.state.tour.redo()?;
        self.after_change(&change);
        Some(change)
    }

    // ── Import / export ───────────────────────────────────────

    /// Replace the tour with parsed JSON. A parse error leaves everything as it was.
    pub fn import_json(&mut self, text: &str) -> Result<TourChange, ImportError> {
        let file = parse_tour(text).inspect_err(|e| tracing::error!(error = %e, "import failed"))?;
        let change = self.state.tour.load_file(file);
        self.after_change(&change);
        Ok(change)
    }

    pub fn export_json(&self) -> Result<String, ExportError> {
        export_tour(&self.state.tour.doc)
    }

    /// Read a tour file and make it the current tour
    pub async fn open_file(&mut self, path: impl AsRef<Path>) -> Result<TourChange, ImportError> {
        let file = load_tour_file(path)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "import failed"))?;
        let change = self.state.tour.load_file(file);
        self.after_change(&change);
        Ok(change)
    }

    pub async fn save_file(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        save_tour_file(path, &self.state.tour.doc).await
    }

    /// Restore the autosaved tour, if there is one
    pub fn restore_autosave(&mut self) -> Option<TourChange> {
        let path = TourState::autosave_path()?;
        self.restore_autosave_from(&path)
    }

    pub fn restore_autosave_from(&mut self, path: &Path) -> Option<TourChange> {
        let file = TourState::load_autosave_from(path)?;
        let change = self.state.tour.load_file(file);
        self.after_change(&change);
        tracing::info!(path = %path.display(), "restored autosave");
        Some(change)
    }
}
