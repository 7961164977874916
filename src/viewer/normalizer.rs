//! Content framing
//!
//! Newly installed content is moved so its bounding box is centred on the
//! origin, and the default camera is placed to show all of it.

use glam::Vec3;

use crate::scene::{NodeHandle, Scene};
use crate::utils::OrbitControls;

/// Where the default camera goes for a piece of content of a given size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Framing {
    /// Bounding box centre after normalization (the origin, up to rounding)
    pub center: Vec3,
    /// Length of the bounding box diagonal
    pub size: f32,
    pub camera_position: Vec3,
    pub target: Vec3,
    pub near: f32,
    pub far: f32,
    /// Zoom-out limit for the orbit controls
    pub max_distance: f32,
}

impl Framing {
    #[must_use]
    pub fn new(center: Vec3, size: f32) -> Self {
        Self {
            center,
            size,
            camera_position: center + Vec3::new(size / 2.0, size / 5.0, size / 2.0),
            target: center,
            near: size / 100.0,
            far: size * 100.0,
            max_distance: size * 10.0,
        }
    }
}

pub struct ContentNormalizer;

impl ContentNormalizer {
    /// Recentres `root` on the origin and returns the framing for it.
    ///
    /// Returns `None` and leaves the content alone when the subtree has no
    /// geometry to measure.
    pub fn normalize(scene: &mut Scene, root: NodeHandle) -> Option<Framing> {
        scene.update_subtree(root);
        let bounds = scene.world_bounds(root)?;
        let size = bounds.diagonal();
        if !size.is_finite() {
            log::warn!("Content bounds are not finite, skipping framing");
            return None;
        }

        let center = bounds.center();
        if let Some(node) = scene.get_node_mut(root) {
            node.transform.position -= center;
        }
        scene.update_subtree(root);

        let center = scene.world_bounds(root).map_or(Vec3::ZERO, |b| b.center());
        log::debug!("Content size {size:.3}, recentred by {:?}", -bounds.center());
        Some(Framing::new(center, size))
    }

    /// Moves the default camera and the orbit controls onto `framing` and
    /// saves it as the controls' reset state.
    pub fn apply(framing: &Framing, scene: &mut Scene, default_camera: NodeHandle, controls: &mut OrbitControls) {
        controls.reset();

        if let Some((transform, camera)) = scene.query_camera_bundle(default_camera) {
            transform.position = framing.camera_position;
            transform.look_at(framing.target, Vec3::Y);
            camera.set_clip_planes(framing.near, framing.far);
        }
        scene.update_subtree(default_camera);

        controls.max_distance = framing.max_distance;
        controls.look_from(framing.camera_position, framing.target);
        controls.save_state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framing_scales_with_size() {
        let framing = Framing::new(Vec3::ZERO, 10.0);
        assert_eq!(framing.camera_position, Vec3::new(5.0, 2.0, 5.0));
        assert!((framing.near - 0.1).abs() < 1e-6);
        assert!((framing.far - 1000.0).abs() < 1e-3);
        assert!((framing.max_distance - 100.0).abs() < 1e-4);
    }
}
