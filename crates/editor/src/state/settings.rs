//! Editor settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shared::{Camera, Imagery, MultiRes, TourDocument};

use super::tour::DEFAULT_HISTORY_LIMIT;

/// Defaults applied to newly added scenes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDefaults {
    /// Initial camera of a new scene
    pub camera: Camera,
    /// Tiling layout of a new scene; `base_path` is filled per scene
    pub multi_res: MultiRes,
}

impl SceneDefaults {
    /// Imagery for a new scene stored under `base_path`
    pub fn imagery_at(&self, base_path: &str) -> Imagery {
        Imagery {
            preview: format!("{base_path}/preview.jpg"),
            multi_res: MultiRes {
                base_path: base_path.to_string(),
                ..self.multi_res.clone()
            },
        }
    }
}

/// Defaults for a new, empty tour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TourDefaults {
    /// Cross-fade between scenes in milliseconds
    pub fade_duration: f64,
    pub auto_load: bool,
}

impl Default for TourDefaults {
    fn default() -> Self {
        let doc = TourDocument::default();
        Self {
            fade_duration: doc.fade_duration,
            auto_load: doc.auto_load,
        }
    }
}

/// All editor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub scene: SceneDefaults,
    pub tour: TourDefaults,
    /// Number of undo snapshots kept
    pub history_limit: usize,
    /// Write the tour to the data directory after every edit
    pub autosave: bool,
    /// Camera animation when previewing a hotspot target, in milliseconds
    pub preview_animation_ms: u64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            scene: SceneDefaults::default(),
            tour: TourDefaults::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            autosave: false,
            preview_animation_ms: 1000,
        }
    }
}

impl EditorSettings {
    fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tour-editor", "tour-editor")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(json) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&json).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "unreadable settings, using defaults");
            Self::default()
        })
    }

    /// Save settings to file
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            return;
        };
        if let Err(e) = self.save_to(&path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to save settings");
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)
    }

    /// Empty document carrying the configured tour options
    pub fn new_document(&self) -> TourDocument {
        TourDocument {
            fade_duration: self.tour.fade_duration,
            auto_load: self.tour.auto_load,
            ..TourDocument::default()
        }
    }
}
