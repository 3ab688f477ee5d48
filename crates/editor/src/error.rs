//! Error types for tour edits and imports.
//!
//! Every rejected edit leaves the document untouched; the variants say why.

use std::path::PathBuf;

use shared::{IdError, SceneId};
use thiserror::Error;

/// Reason an edit was rejected before anything was mutated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("invalid scene id '{id}': {reason}")]
    InvalidSceneId { id: String, reason: IdError },

    #[error("invalid hotspot id '{id}': {reason}")]
    InvalidHotspotId { id: String, reason: IdError },

    #[error("scene not found: {0}")]
    SceneNotFound(SceneId),

    #[error("scene {scene} has no hotspot at index {index}")]
    HotspotIndexOutOfRange { scene: SceneId, index: usize },

    #[error("a hotspot in scene {0} cannot link to its own scene")]
    SelfLink(SceneId),

    #[error("scene order must list every scene exactly once")]
    NotASceneOrder,

    #[error("hotspot order for scene {0} must use every index exactly once")]
    NotAHotspotOrder(SceneId),

    #[error("scene {id} cannot move {direction}")]
    AtBoundary { id: SceneId, direction: &'static str },

    #[error("{0} must be a finite number")]
    NonFinite(&'static str),

    #[error("no scene is selected")]
    NoSelection,

    #[error("the renderer has no live view")]
    NoLiveView,

    #[error("pointer is outside the panorama")]
    PointerMissed,
}

pub type EditResult<T> = Result<T, EditError>;

/// Failure to turn a file or text into a tour.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed tour JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid scene id '{id}' in tour file: {reason}")]
    InvalidSceneId { id: String, reason: IdError },
}

/// Failure to write a tour to disk.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize tour: {0}")]
    Json(#[from] serde_json::Error),
}
