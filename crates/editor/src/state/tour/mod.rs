//! Tour state management
//!
//! The tour document plus undo/redo history. Every edit validates its
//! input first and only then snapshots and mutates, so a rejected edit
//! never leaves a trace in the document or the history.

mod camera_ops;
mod history;
mod hotspot_ops;
mod import_ops;
mod persistence;
mod scene_ops;

pub use hotspot_ops::HotspotDraft;
pub use import_ops::normalize_imported_document;
pub use scene_ops::MoveDirection;

use shared::{FallbackIds, HotspotId, SceneId, TourDocument};

/// Default number of snapshots kept for undo
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// What a completed edit changed, consumed by the renderer adapter and
/// the selection tracker.
#[derive(Debug, Clone, PartialEq)]
pub enum TourChange {
    /// Accepted but nothing changed (e.g. renaming a scene to its own id)
    Unchanged,
    SceneAdded {
        id: SceneId,
    },
    /// Imagery and/or camera defaults replaced
    SceneEdited {
        id: SceneId,
    },
    SceneRenamed {
        old_id: SceneId,
        new_id: SceneId,
    },
    SceneDeleted {
        id: SceneId,
        /// Hotspots the deleted scene owned
        owned: Vec<HotspotId>,
        /// Hotspots elsewhere that pointed at it, as (owner, id)
        incoming: Vec<(SceneId, HotspotId)>,
    },
    SceneOrderChanged,
    FirstSceneChanged {
        id: SceneId,
    },
    TourOptionsChanged,
    HotspotAdded {
        owner: SceneId,
        id: HotspotId,
    },
    HotspotEdited {
        owner: SceneId,
        old_id: HotspotId,
        new_id: HotspotId,
    },
    HotspotDeleted {
        owner: SceneId,
        id: HotspotId,
    },
    HotspotsReordered {
        owner: SceneId,
    },
    ViewCaptured {
        scene_id: SceneId,
        /// Hotspots whose target camera was overwritten, as (owner, id)
        updated: Vec<(SceneId, HotspotId)>,
    },
    /// Import, undo, redo or clear swapped the whole document
    DocumentReplaced,
}

/// Tour document with undo/redo history
#[derive(Debug)]
pub struct TourState {
    /// Current document; mutate only through the edit methods
    pub doc: TourDocument,
    pub(crate) undo_stack: Vec<TourDocument>,
    pub(crate) redo_stack: Vec<TourDocument>,
    /// Monotonically increasing version counter
    pub(crate) version: u64,
    /// Counter for ids assigned to legacy hotspots on import
    pub(crate) fallback_ids: FallbackIds,
    pub(crate) history_limit: usize,
}

impl Default for TourState {
    fn default() -> Self {
        Self::new(TourDocument::default())
    }
}

impl TourState {
    pub fn new(doc: TourDocument) -> Self {
        let fallback_ids = FallbackIds::seeded_from(doc.hotspots().map(|(_, h)| h.id.as_str()));
        Self {
            doc,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            version: 0,
            fallback_ids,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Limit the undo stack to `limit` snapshots (at least one)
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    /// Current document version (increments on every mutation)
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Next id the import fallback counter will hand out
    pub fn fallback_counter(&self) -> u64 {
        self.fallback_ids.peek()
    }

    /// Save current state to the undo stack and drop the redo branch
    pub(crate) fn save_undo(&mut self) {
        self.undo_stack.push(self.doc.clone());
        if self.undo_stack.len() > self.history_limit {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    /// Bump the version and hand the change back to the caller
    pub(crate) fn commit(&mut self, change: TourChange) -> TourChange {
        self.version += 1;
        tracing::debug!(version = self.version, ?change, "tour updated");
        change
    }
}
