//! Interchange format of a tour file.
//!
//! These types mirror the JSON layout byte for byte (field order included)
//! and double as the configuration handed to the panorama renderer. Fields
//! that older files may omit are optional here; the editor's import path
//! turns a [`TourFile`] into a validated [`TourDocument`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Camera, Hotspot, MultiRes, Scene, SceneId, TourDocument};

fn default_scene_type() -> String {
    "multires".to_string()
}

fn default_hotspot_type() -> String {
    "scene".to_string()
}

fn default_hfov() -> f64 {
    crate::DEFAULT_HFOV
}

/// Whole tour file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TourFile {
    #[serde(default)]
    pub default: DefaultSection,
    #[serde(default)]
    pub scenes: IndexMap<SceneId, SceneEntry>,
}

/// The `"default"` block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_scene: Option<SceneId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_order: Option<Vec<SceneId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_fade_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_load: Option<bool>,
}

/// One entry of `"scenes"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneEntry {
    #[serde(default = "default_hfov")]
    pub hfov: f64,
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub yaw: f64,
    #[serde(rename = "type", default = "default_scene_type")]
    pub kind: String,
    #[serde(default)]
    pub preview: String,
    #[serde(default)]
    pub multi_res: MultiRes,
    #[serde(default)]
    pub hot_spots: Vec<HotSpotEntry>,
}

/// One entry of a scene's `"hotSpots"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotSpotEntry {
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub yaw: f64,
    #[serde(rename = "type", default = "default_hotspot_type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub scene_id: SceneId,
    /// Missing in files written by older editors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_pitch: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_yaw: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_hfov: Option<f64>,
}

impl HotSpotEntry {
    /// Target camera if the file carried all three components
    pub fn target_camera(&self) -> Option<Camera> {
        Some(Camera {
            pitch: self.target_pitch?,
            yaw: self.target_yaw?,
            hfov: self.target_hfov?,
        })
    }
}

impl SceneEntry {
    pub fn camera(&self) -> Camera {
        Camera {
            pitch: self.pitch,
            yaw: self.yaw,
            hfov: self.hfov,
        }
    }
}

impl From<&Hotspot> for HotSpotEntry {
    fn from(h: &Hotspot) -> Self {
        Self {
            pitch: h.position.pitch,
            yaw: h.position.yaw,
            kind: default_hotspot_type(),
            text: h.label.clone(),
            scene_id: h.target_scene_id.clone(),
            id: Some(h.id.clone()),
            target_pitch: Some(h.target_camera.pitch),
            target_yaw: Some(h.target_camera.yaw),
            target_hfov: Some(h.target_camera.hfov),
        }
    }
}

impl From<&Scene> for SceneEntry {
    fn from(scene: &Scene) -> Self {
        Self {
            hfov: scene.camera.hfov,
            pitch: scene.camera.pitch,
            yaw: scene.camera.yaw,
            kind: default_scene_type(),
            preview: scene.imagery.preview.clone(),
            multi_res: scene.imagery.multi_res.clone(),
            hot_spots: scene.hotspots.iter().map(HotSpotEntry::from).collect(),
        }
    }
}

impl From<&TourDocument> for TourFile {
    fn from(doc: &TourDocument) -> Self {
        Self {
            default: DefaultSection {
                first_scene: Some(doc.first_scene.clone()),
                scene_order: Some(doc.scene_order.clone()),
                scene_fade_duration: Some(doc.fade_duration),
                auto_load: Some(doc.auto_load),
            },
            scenes: doc
                .scenes
                .iter()
                .map(|(id, scene)| (id.clone(), SceneEntry::from(scene)))
                .collect(),
        }
    }
}
