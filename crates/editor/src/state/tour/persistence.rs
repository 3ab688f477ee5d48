//! Autosave/load functionality

use std::path::{Path, PathBuf};

use shared::wire::TourFile;

use super::TourState;
use crate::serialization::parse_tour;

impl TourState {
    /// Get autosave file path
    pub fn autosave_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tour-editor", "tour-editor")
            .map(|dirs| dirs.data_dir().join("autosave.json"))
    }

    /// Save the tour to the autosave file, logging failures
    pub fn autosave(&self) {
        let Some(path) = Self::autosave_path() else {
            return;
        };
        if let Err(e) = self.autosave_to(&path) {
            tracing::warn!(path = %path.display(), error = %e, "autosave failed");
        }
    }

    /// Save the tour in interchange format to `path`
    pub fn autosave_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&TourFile::from(&self.doc))?;
        std::fs::write(path, json)
    }

    /// Load an autosaved tour file, if any. Not normalized yet.
    pub fn load_autosave_from(path: &Path) -> Option<TourFile> {
        let json = std::fs::read_to_string(path).ok()?;
        match parse_tour(&json) {
            Ok(file) => Some(file),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable autosave");
                None
            }
        }
    }

    /// Check if autosave file exists
    pub fn has_autosave() -> bool {
        Self::autosave_path().map(|p| p.exists()).unwrap_or(false)
    }
}
