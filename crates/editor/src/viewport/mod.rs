//! Panorama renderer contract
//!
//! The editor drives an external 360° renderer it does not implement. The
//! renderer is configured with the interchange types from `shared::wire`,
//! so a scene or hotspot is handed over exactly as it would be written to
//! a tour file. Only [`RendererAdapter`] calls into a [`Viewer`].

mod adapter;
mod headless;

pub use adapter::{plan_scene_deletion, DeleteStep, MirrorOutcome, RendererAdapter};
pub use headless::{HeadlessEngine, HeadlessViewer, ViewerCall, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

use serde::{Deserialize, Serialize};
use shared::wire::{HotSpotEntry, SceneEntry, TourFile};
use shared::{Camera, SceneId, SpherePoint};
use thiserror::Error;

/// Failure reported by a renderer implementation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RendererError {
    #[error("renderer could not be created: {0}")]
    Create(String),

    #[error("renderer has no scene {0}")]
    UnknownScene(SceneId),

    #[error("renderer call {call} failed: {reason}")]
    Call { call: &'static str, reason: String },

    /// The renderer answered `false` to a removal
    #[error("renderer refused {call} for {id}")]
    Refused { call: &'static str, id: String },
}

/// Pointer position in viewer pixels, origin top-left
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
}

/// Notifications a viewer queues for the editor
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    /// Fired after any scene switch, user- or API-driven
    SceneChanged(SceneId),
}

/// Factory for live viewers
pub trait PanoramaEngine {
    type Viewer: Viewer;

    /// Start a viewer showing `config.default.first_scene`
    fn create(&mut self, config: &TourFile) -> Result<Self::Viewer, RendererError>;
}

/// A live renderer instance
pub trait Viewer {
    fn destroy(self);

    fn add_scene(&mut self, id: &str, config: &SceneEntry) -> Result<(), RendererError>;

    /// `Ok(false)` when the renderer refuses, e.g. for the active scene
    fn remove_scene(&mut self, id: &str) -> Result<bool, RendererError>;

    fn add_hotspot(&mut self, config: &HotSpotEntry, owner: &str) -> Result<(), RendererError>;

    fn remove_hotspot(&mut self, id: &str, owner: &str) -> Result<bool, RendererError>;

    /// Switch scenes; `None` uses the scene's own default camera
    fn load_scene(&mut self, id: &str, camera: Option<Camera>) -> Result<(), RendererError>;

    fn active_scene(&self) -> Option<SceneId>;

    fn camera(&self) -> Camera;

    /// Sphere coordinates under the pointer, `None` when it misses the panorama
    fn pointer_to_sphere(&self, event: &PointerEvent) -> Option<SpherePoint>;

    fn animate_to(&mut self, camera: Camera, duration_ms: u64) -> Result<(), RendererError>;

    /// Drain queued notifications
    fn poll_events(&mut self) -> Vec<ViewerEvent>;
}
