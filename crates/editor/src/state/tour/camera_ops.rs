//! Camera capture

use shared::Camera;

use super::scene_ops::check_camera;
use super::{TourChange, TourState};
use crate::error::EditResult;

impl TourState {
    /// Store `camera` as the scene's defaults and push it into every hotspot
    /// that arrives at this scene. Labels and anchor positions are untouched.
    pub fn capture_view(&mut self, scene_id: &str, camera: Camera) -> EditResult<TourChange> {
        self.require_scene(scene_id)?;
        check_camera(&camera)?;
        let updated = self.doc.hotspots_targeting(scene_id);

        self.save_undo();
        if let Some(scene) = self.doc.scene_mut(scene_id) {
            scene.camera = camera;
        }
        for scene in self.doc.scenes.values_mut() {
            for hotspot in scene.hotspots.iter_mut().filter(|h| h.target_scene_id == scene_id) {
                hotspot.target_camera = camera;
            }
        }

        tracing::info!(
            scene = %scene_id,
            pitch = camera.pitch,
            yaw = camera.yaw,
            hfov = camera.hfov,
            hotspots = updated.len(),
            "captured view"
        );
        Ok(self.commit(TourChange::ViewCaptured {
            scene_id: scene_id.to_string(),
            updated,
        }))
    }
}
