//! Undo/redo functionality

use super::{TourChange, TourState};

impl TourState {
    /// Undo last change
    pub fn undo(&mut self) -> Option<TourChange> {
        let prev = self.undo_stack.pop()?;
        self.redo_stack.push(std::mem::replace(&mut self.doc, prev));
        Some(self.commit(TourChange::DocumentReplaced))
    }

    /// Redo last undone change
    pub fn redo(&mut self) -> Option<TourChange> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(std::mem::replace(&mut self.doc, next));
        Some(self.commit(TourChange::DocumentReplaced))
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}
