pub mod selection;
pub mod settings;
pub mod tour;

pub use selection::SelectionState;
pub use settings::{EditorSettings, SceneDefaults, TourDefaults};
pub use tour::{HotspotDraft, MoveDirection, TourChange, TourState};

/// Combined application state
#[derive(Debug)]
pub struct AppState {
    pub tour: TourState,
    pub selection: SelectionState,
    pub settings: EditorSettings,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_settings(EditorSettings::default())
    }
}

impl AppState {
    /// Fresh state with an empty tour shaped by `settings`
    pub fn with_settings(settings: EditorSettings) -> Self {
        Self {
            tour: TourState::new(settings.new_document()).with_history_limit(settings.history_limit),
            selection: SelectionState::default(),
            settings,
        }
    }
}
