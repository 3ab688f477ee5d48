//! Headless test harness for programmatic tour editing.
//!
//! Wraps an [`EditorSession`] driving the in-memory viewer, with shortcuts
//! for building tours and inspecting the result.

use std::ops::{Deref, DerefMut};

use shared::{Hotspot, HotspotId, InvariantViolation, SceneId, SpherePoint, TourDocument};

use crate::error::{EditResult, ImportError};
use crate::session::EditorSession;
use crate::state::tour::HotspotDraft;
use crate::state::EditorSettings;
use crate::viewport::{HeadlessEngine, HeadlessViewer};

/// Headless test harness: a session on a [`HeadlessEngine`]
pub struct TestHarness {
    pub session: EditorSession<HeadlessEngine>,
}

impl TestHarness {
    /// Empty tour, default settings, strict viewer
    pub fn new() -> Self {
        Self::with_engine(HeadlessEngine::strict())
    }

    pub fn with_engine(engine: HeadlessEngine) -> Self {
        Self::with_settings(engine, EditorSettings::default())
    }

    pub fn with_settings(engine: HeadlessEngine, settings: EditorSettings) -> Self {
        Self {
            session: EditorSession::new(engine, settings),
        }
    }

    // ── Building ──────────────────────────────────────────────

    /// Add a scene with tiles under `/tiles/<id>` and return its final id
    pub fn add(&mut self, id: &str) -> EditResult<SceneId> {
        let base = match id.trim() {
            "" => "/tiles/untitled".to_string(),
            trimmed => format!("/tiles/{trimmed}"),
        };
        self.session.add_scene_at(id, &base)?;
        Ok(self.doc().scene_order.last().cloned().unwrap_or_default())
    }

    /// Add several scenes in order
    pub fn add_all(&mut self, ids: &[&str]) -> EditResult<()> {
        for id in ids {
            self.add(id)?;
        }
        Ok(())
    }

    /// Link `owner` to `target` with an auto id; returns the hotspot id
    pub fn link(&mut self, owner: &str, target: &str) -> EditResult<HotspotId> {
        self.link_with(owner, HotspotDraft::to(target, SpherePoint::default()))
    }

    pub fn link_labeled(&mut self, owner: &str, target: &str, label: &str) -> EditResult<HotspotId> {
        self.link_with(owner, HotspotDraft::to(target, SpherePoint::default()).with_label(label))
    }

    pub fn link_with(&mut self, owner: &str, draft: HotspotDraft) -> EditResult<HotspotId> {
        self.session.add_hotspot(owner, draft)?;
        Ok(self
            .doc()
            .scene(owner)
            .and_then(|s| s.hotspots.last())
            .map(|h| h.id.clone())
            .unwrap_or_default())
    }

    /// Load a tour from interchange JSON (replaces current)
    pub fn load_json(&mut self, json: &str) -> Result<(), ImportError> {
        self.session.import_json(json).map(|_| ())
    }

    /// Export the current tour as JSON
    pub fn export_json(&self) -> String {
        self.session.export_json().unwrap_or_default()
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn doc(&self) -> &TourDocument {
        &self.session.tour().doc
    }

    pub fn scene_count(&self) -> usize {
        self.doc().scenes.len()
    }

    /// Scene ids in navigation order
    pub fn scene_order(&self) -> Vec<&str> {
        self.doc().scene_order.iter().map(String::as_str).collect()
    }

    pub fn first_scene(&self) -> &str {
        &self.doc().first_scene
    }

    pub fn hotspot_ids(&self, owner: &str) -> Vec<&str> {
        self.doc()
            .scene(owner)
            .map(|s| s.hotspots.iter().map(|h| h.id.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn hotspot(&self, owner: &str, index: usize) -> Option<&Hotspot> {
        self.doc().scene(owner)?.hotspots.get(index)
    }

    /// Total hotspots across all scenes
    pub fn hotspot_count(&self) -> usize {
        self.doc().hotspots().count()
    }

    pub fn violations(&self) -> Vec<InvariantViolation> {
        self.doc().check_invariants()
    }

    pub fn viewer(&self) -> Option<&HeadlessViewer> {
        self.session.renderer().viewer()
    }

    pub fn viewer_mut(&mut self) -> Option<&mut HeadlessViewer> {
        self.session.renderer_mut().viewer_mut()
    }

    /// Scene the viewer is showing
    pub fn active_scene(&self) -> Option<SceneId> {
        self.session.renderer().active_scene()
    }

    pub fn rebuild_count(&self) -> u64 {
        self.session.renderer().rebuild_count()
    }

    /// The viewer shows exactly the document (or there is no viewer and
    /// nothing to show)
    pub fn viewer_in_sync(&self) -> bool {
        match self.viewer() {
            Some(viewer) => viewer.mirrors(self.doc()),
            None => self.doc().is_empty(),
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for TestHarness {
    type Target = EditorSession<HeadlessEngine>;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

impl DerefMut for TestHarness {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.session
    }
}
