//! In-memory renderer for tests and the command-line runner.
//!
//! Behaves like a real panorama viewer where it matters to the adapter:
//! the active scene cannot be removed, and (optionally) hotspots can only
//! be removed from the scene that is currently loaded.

use std::collections::VecDeque;

use indexmap::IndexMap;
use shared::wire::{HotSpotEntry, SceneEntry, TourFile};
use shared::{Camera, SceneId, SpherePoint, TourDocument};

use super::{PanoramaEngine, PointerEvent, RendererError, Viewer, ViewerEvent};

/// Virtual viewport size used for pointer projection
pub const VIEWPORT_WIDTH: f64 = 1280.0;
pub const VIEWPORT_HEIGHT: f64 = 720.0;

/// A recorded viewer call
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerCall {
    AddScene(SceneId),
    RemoveScene(SceneId),
    AddHotspot { owner: SceneId, id: String },
    RemoveHotspot { owner: SceneId, id: String },
    LoadScene(SceneId),
    AnimateTo(Camera),
}

/// Engine producing [`HeadlessViewer`]s
#[derive(Debug, Default)]
pub struct HeadlessEngine {
    /// Number of viewers created so far
    pub created: usize,
    /// Fail the next `create` call
    pub fail_next_create: bool,
    /// Allow hotspot removal on scenes that are not loaded
    pub inactive_hotspot_edits: bool,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine whose viewers only remove hotspots from the active scene
    pub fn strict() -> Self {
        Self {
            inactive_hotspot_edits: false,
            ..Self::default()
        }
    }

    /// Engine whose viewers remove hotspots from any scene
    pub fn lenient() -> Self {
        Self {
            inactive_hotspot_edits: true,
            ..Self::default()
        }
    }
}

impl PanoramaEngine for HeadlessEngine {
    type Viewer = HeadlessViewer;

    fn create(&mut self, config: &TourFile) -> Result<HeadlessViewer, RendererError> {
        if std::mem::take(&mut self.fail_next_create) {
            return Err(RendererError::Create("injected failure".to_string()));
        }
        let first = config
            .default
            .first_scene
            .clone()
            .filter(|id| config.scenes.contains_key(id))
            .or_else(|| config.scenes.keys().next().cloned())
            .ok_or_else(|| RendererError::Create("tour has no scenes".to_string()))?;

        self.created += 1;
        let mut viewer = HeadlessViewer {
            scenes: config.scenes.clone(),
            active: None,
            camera: Camera::default(),
            events: Vec::new(),
            calls: Vec::new(),
            faults: VecDeque::new(),
            inactive_hotspot_edits: self.inactive_hotspot_edits,
        };
        viewer.load_scene(&first, None)?;
        viewer.calls.clear();
        Ok(viewer)
    }
}

/// Renderer state kept entirely in memory
#[derive(Debug)]
pub struct HeadlessViewer {
    scenes: IndexMap<SceneId, SceneEntry>,
    active: Option<SceneId>,
    camera: Camera,
    events: Vec<ViewerEvent>,
    calls: Vec<ViewerCall>,
    faults: VecDeque<&'static str>,
    inactive_hotspot_edits: bool,
}

impl HeadlessViewer {
    /// Make the next call named `call` fail (e.g. `"remove_hotspot"`)
    pub fn fail_next(&mut self, call: &'static str) {
        self.faults.push_back(call);
    }

    /// Calls made since creation
    pub fn calls(&self) -> &[ViewerCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn scene_ids(&self) -> Vec<&str> {
        self.scenes.keys().map(String::as_str).collect()
    }

    pub fn hotspot_ids(&self, owner: &str) -> Vec<&str> {
        self.scenes
            .get(owner)
            .map(|s| s.hot_spots.iter().filter_map(|h| h.id.as_deref()).collect())
            .unwrap_or_default()
    }

    /// Hotspot as the renderer currently holds it
    pub fn hotspot(&self, owner: &str, id: &str) -> Option<&HotSpotEntry> {
        self.scenes
            .get(owner)?
            .hot_spots
            .iter()
            .find(|h| h.id.as_deref() == Some(id))
    }

    /// Holds exactly the scene configs `doc` exports, hotspots in order.
    /// Scene order is not compared; the viewer has none.
    pub fn mirrors(&self, doc: &TourDocument) -> bool {
        let expected = TourFile::from(doc).scenes;
        self.scenes.len() == expected.len()
            && expected
                .iter()
                .all(|(id, entry)| self.scenes.get(id) == Some(entry))
    }

    fn check_fault(&mut self, call: &'static str) -> Result<(), RendererError> {
        if let Some(pos) = self.faults.iter().position(|f| *f == call) {
            self.faults.remove(pos);
            return Err(RendererError::Call {
                call,
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

impl Viewer for HeadlessViewer {
    fn destroy(self) {
        tracing::debug!(scenes = self.scenes.len(), "headless viewer destroyed");
    }

    fn add_scene(&mut self, id: &str, config: &SceneEntry) -> Result<(), RendererError> {
        self.check_fault("add_scene")?;
        if self.scenes.contains_key(id) {
            return Err(RendererError::Call {
                call: "add_scene",
                reason: format!("scene {id} already exists"),
            });
        }
        self.scenes.insert(id.to_string(), config.clone());
        self.calls.push(ViewerCall::AddScene(id.to_string()));
        Ok(())
    }

    fn remove_scene(&mut self, id: &str) -> Result<bool, RendererError> {
        self.check_fault("remove_scene")?;
        if self.active.as_deref() == Some(id) {
            return Ok(false);
        }
        let removed = self.scenes.shift_remove(id).is_some();
        if removed {
            self.calls.push(ViewerCall::RemoveScene(id.to_string()));
        }
        Ok(removed)
    }

    fn add_hotspot(&mut self, config: &HotSpotEntry, owner: &str) -> Result<(), RendererError> {
        self.check_fault("add_hotspot")?;
        let scene = self
            .scenes
            .get_mut(owner)
            .ok_or_else(|| RendererError::UnknownScene(owner.to_string()))?;
        scene.hot_spots.push(config.clone());
        self.calls.push(ViewerCall::AddHotspot {
            owner: owner.to_string(),
            id: config.id.clone().unwrap_or_default(),
        });
        Ok(())
    }

    fn remove_hotspot(&mut self, id: &str, owner: &str) -> Result<bool, RendererError> {
        self.check_fault("remove_hotspot")?;
        if !self.inactive_hotspot_edits && self.active.as_deref() != Some(owner) {
            return Ok(false);
        }
        let Some(scene) = self.scenes.get_mut(owner) else {
            return Ok(false);
        };
        let Some(pos) = scene.hot_spots.iter().position(|h| h.id.as_deref() == Some(id)) else {
            return Ok(false);
        };
        scene.hot_spots.remove(pos);
        self.calls.push(ViewerCall::RemoveHotspot {
            owner: owner.to_string(),
            id: id.to_string(),
        });
        Ok(true)
    }

    fn load_scene(&mut self, id: &str, camera: Option<Camera>) -> Result<(), RendererError> {
        self.check_fault("load_scene")?;
        let scene = self
            .scenes
            .get(id)
            .ok_or_else(|| RendererError::UnknownScene(id.to_string()))?;
        self.camera = camera.unwrap_or_else(|| scene.camera());
        self.active = Some(id.to_string());
        self.events.push(ViewerEvent::SceneChanged(id.to_string()));
        self.calls.push(ViewerCall::LoadScene(id.to_string()));
        Ok(())
    }

    fn active_scene(&self) -> Option<SceneId> {
        self.active.clone()
    }

    fn camera(&self) -> Camera {
        self.camera
    }

    fn pointer_to_sphere(&self, event: &PointerEvent) -> Option<SpherePoint> {
        self.active.as_ref()?;
        let inside = (0.0..=VIEWPORT_WIDTH).contains(&event.x) && (0.0..=VIEWPORT_HEIGHT).contains(&event.y);
        if !inside {
            return None;
        }
        let vfov = self.camera.hfov * VIEWPORT_HEIGHT / VIEWPORT_WIDTH;
        let yaw = self.camera.yaw + (event.x / VIEWPORT_WIDTH - 0.5) * self.camera.hfov;
        let pitch = self.camera.pitch - (event.y / VIEWPORT_HEIGHT - 0.5) * vfov;
        Some(SpherePoint {
            pitch: pitch.clamp(-90.0, 90.0),
            yaw: (yaw + 180.0).rem_euclid(360.0) - 180.0,
        })
    }

    fn animate_to(&mut self, camera: Camera, _duration_ms: u64) -> Result<(), RendererError> {
        self.check_fault("animate_to")?;
        self.camera = camera;
        self.calls.push(ViewerCall::AnimateTo(camera));
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<ViewerEvent> {
        std::mem::take(&mut self.events)
    }
}
