//! Tour document model shared by the editor and its tooling.
//!
//! A tour is a set of panorama scenes linked by hotspots. The document is
//! plain data; the editor crate is the only place that mutates it and keeps
//! the invariants listed on [`TourDocument`].

pub mod ids;
pub mod wire;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use ids::{FallbackIds, IdError, IdRequest};

/// Unique scene identifier (map key in the document)
pub type SceneId = String;

/// Hotspot identifier, unique across the whole document
pub type HotspotId = String;

/// Default horizontal field of view for new scenes, in degrees
pub const DEFAULT_HFOV: f64 = 100.0;

/// Camera orientation in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub pitch: f64,
    pub yaw: f64,
    pub hfov: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pitch: 0.0,
            yaw: 0.0,
            hfov: DEFAULT_HFOV,
        }
    }
}

impl Camera {
    /// JSON has no NaN or infinity, so only finite cameras survive export.
    pub fn is_finite(&self) -> bool {
        self.pitch.is_finite() && self.yaw.is_finite() && self.hfov.is_finite()
    }
}

/// A point on the panorama sphere
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpherePoint {
    pub pitch: f64,
    pub yaw: f64,
}

impl SpherePoint {
    pub fn is_finite(&self) -> bool {
        self.pitch.is_finite() && self.yaw.is_finite()
    }
}

/// Tiled multi-resolution imagery, passed through to the renderer verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiRes {
    #[serde(default)]
    pub base_path: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub fallback_path: String,
    #[serde(default)]
    pub extension: String,
    #[serde(default)]
    pub tile_resolution: u32,
    #[serde(default)]
    pub max_level: u32,
    #[serde(default)]
    pub cube_resolution: u32,
}

impl Default for MultiRes {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            path: "/%l/%s%y_%x".to_string(),
            fallback_path: "/fallback/%s".to_string(),
            extension: "jpg".to_string(),
            tile_resolution: 512,
            max_level: 3,
            cube_resolution: 1832,
        }
    }
}

/// Everything the renderer needs to draw a scene
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Imagery {
    pub preview: String,
    pub multi_res: MultiRes,
}

impl Imagery {
    /// Imagery rooted at `base_path` with default tiling
    pub fn at(base_path: impl Into<String>) -> Self {
        let base_path = base_path.into();
        Self {
            preview: format!("{base_path}/preview.jpg"),
            multi_res: MultiRes {
                base_path,
                ..MultiRes::default()
            },
        }
    }
}

/// Directional link from its owning scene to another scene
#[derive(Debug, Clone, PartialEq)]
pub struct Hotspot {
    pub id: HotspotId,
    /// Anchor on the owning scene's sphere
    pub position: SpherePoint,
    pub target_scene_id: SceneId,
    /// Arrival orientation, a snapshot of the target camera at authoring time
    pub target_camera: Camera,
    /// Display text, independent of `target_scene_id`
    pub label: String,
}

/// One panorama node
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub camera: Camera,
    pub imagery: Imagery,
    /// Display/iteration order is meaningful
    pub hotspots: Vec<Hotspot>,
}

impl Scene {
    pub fn new(imagery: Imagery, camera: Camera) -> Self {
        Self {
            camera,
            imagery,
            hotspots: Vec::new(),
        }
    }

    pub fn hotspot_index(&self, hotspot_id: &str) -> Option<usize> {
        self.hotspots.iter().position(|h| h.id == hotspot_id)
    }
}

/// A broken invariant found by [`TourDocument::check_invariants`]
#[derive(Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    DuplicateHotspotId(HotspotId),
    DanglingTarget { owner: SceneId, hotspot: HotspotId, target: SceneId },
    SelfLink { owner: SceneId, hotspot: HotspotId },
    SceneOrderMismatch,
    FirstSceneMissing(SceneId),
}

/// Root aggregate of a tour.
///
/// Invariants restored by every completed edit:
/// 1. hotspot ids are unique across all scenes;
/// 2. every hotspot targets an existing scene other than its owner;
/// 3. `scene_order` is a permutation of the keys of `scenes`;
/// 4. `first_scene` is empty or a key of `scenes`.
#[derive(Debug, Clone, PartialEq)]
pub struct TourDocument {
    /// Insertion-ordered scenes
    pub scenes: IndexMap<SceneId, Scene>,
    /// Authoritative navigation order
    pub scene_order: Vec<SceneId>,
    /// Scene loaded on startup, `""` when the tour is empty
    pub first_scene: SceneId,
    /// Cross-fade between scenes in milliseconds
    pub fade_duration: f64,
    pub auto_load: bool,
}

impl Default for TourDocument {
    fn default() -> Self {
        Self {
            scenes: IndexMap::new(),
            scene_order: Vec::new(),
            first_scene: String::new(),
            fade_duration: 1000.0,
            auto_load: true,
        }
    }
}

impl TourDocument {
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn scene(&self, id: &str) -> Option<&Scene> {
        self.scenes.get(id)
    }

    pub fn scene_mut(&mut self, id: &str) -> Option<&mut Scene> {
        self.scenes.get_mut(id)
    }

    pub fn is_scene_id_taken(&self, id: &str) -> bool {
        self.scenes.contains_key(id)
    }

    /// Checks every scene, not just one owner
    pub fn is_hotspot_id_taken(&self, id: &str) -> bool {
        self.hotspots().any(|(_, h)| h.id == id)
    }

    /// All hotspots with their owning scene id, in map then list order
    pub fn hotspots(&self) -> impl Iterator<Item = (&SceneId, &Hotspot)> {
        self.scenes
            .iter()
            .flat_map(|(owner, scene)| scene.hotspots.iter().map(move |h| (owner, h)))
    }

    /// Locate a hotspot by id: (owner, index)
    pub fn find_hotspot(&self, hotspot_id: &str) -> Option<(&SceneId, usize)> {
        self.scenes
            .iter()
            .find_map(|(owner, scene)| scene.hotspot_index(hotspot_id).map(|i| (owner, i)))
    }

    /// Hotspots pointing at `target`, as (owner, hotspot id)
    pub fn hotspots_targeting(&self, target: &str) -> Vec<(SceneId, HotspotId)> {
        self.hotspots()
            .filter(|(_, h)| h.target_scene_id == target)
            .map(|(owner, h)| (owner.clone(), h.id.clone()))
            .collect()
    }

    /// Lowest free `hs_<target>_NNN` id in this document
    pub fn next_hotspot_id(&self, target_scene_id: &str) -> HotspotId {
        ids::generate_hotspot_id(target_scene_id, |id| self.is_hotspot_id_taken(id))
    }

    /// Lowest free `scene_N` id in this document
    pub fn next_scene_id(&self) -> SceneId {
        ids::generate_scene_id(|id| self.is_scene_id_taken(id))
    }

    /// Scene after `id` in navigation order, wrapping around
    pub fn next_scene(&self, id: &str) -> Option<&SceneId> {
        let pos = self.scene_order.iter().position(|s| s == id)?;
        self.scene_order.get((pos + 1) % self.scene_order.len())
    }

    /// Scene before `id` in navigation order, wrapping around
    pub fn previous_scene(&self, id: &str) -> Option<&SceneId> {
        let pos = self.scene_order.iter().position(|s| s == id)?;
        let len = self.scene_order.len();
        self.scene_order.get((pos + len - 1) % len)
    }

    /// True when `order` lists every scene exactly once
    pub fn is_scene_permutation(&self, order: &[SceneId]) -> bool {
        if order.len() != self.scenes.len() {
            return false;
        }
        let mut seen = std::collections::HashSet::with_capacity(order.len());
        order
            .iter()
            .all(|id| self.scenes.contains_key(id) && seen.insert(id.as_str()))
    }

    /// Hotspots whose target scene does not exist (only possible after import)
    pub fn dangling_references(&self) -> Vec<(SceneId, HotspotId, SceneId)> {
        self.hotspots()
            .filter(|(_, h)| !self.scenes.contains_key(&h.target_scene_id))
            .map(|(owner, h)| (owner.clone(), h.id.clone(), h.target_scene_id.clone()))
            .collect()
    }

    /// Report every broken invariant. Empty means the document is consistent.
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        let mut seen = std::collections::HashSet::new();
        for (owner, h) in self.hotspots() {
            if !seen.insert(h.id.as_str()) {
                violations.push(InvariantViolation::DuplicateHotspotId(h.id.clone()));
            }
            if h.target_scene_id == *owner {
                violations.push(InvariantViolation::SelfLink {
                    owner: owner.clone(),
                    hotspot: h.id.clone(),
                });
            } else if !self.scenes.contains_key(&h.target_scene_id) {
                violations.push(InvariantViolation::DanglingTarget {
                    owner: owner.clone(),
                    hotspot: h.id.clone(),
                    target: h.target_scene_id.clone(),
                });
            }
        }

        if !self.is_scene_permutation(&self.scene_order) {
            violations.push(InvariantViolation::SceneOrderMismatch);
        }

        if !self.first_scene.is_empty() && !self.scenes.contains_key(&self.first_scene) {
            violations.push(InvariantViolation::FirstSceneMissing(self.first_scene.clone()));
        }

        violations
    }
}
