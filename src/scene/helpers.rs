//! Debug overlays
//!
//! Helpers are stored in [`Scene::overlays`](crate::scene::Scene), never inside
//! the loaded content subtree, so removing content can never orphan them
//! inside another graph.

use glam::Vec3;

use crate::scene::{NodeHandle, Scene};

#[derive(Debug, Clone)]
pub enum Overlay {
    Skeleton(SkeletonHelper),
    Grid(GridHelper),
    Axes(AxesHelper),
}

// ============================================================================
// Skeleton
// ============================================================================

/// Line rendering of a bone hierarchy.
#[derive(Debug, Clone)]
pub struct SkeletonHelper {
    /// Node the helper was built from (the parent of the topmost bone)
    pub root: NodeHandle,
    /// Bones found below `root`, in traversal order
    pub bones: Vec<NodeHandle>,
    pub line_width: f32,
}

impl SkeletonHelper {
    pub const LINE_WIDTH: f32 = 3.0;

    /// Collects every bone in the subtree of `root` (including `root`).
    #[must_use]
    pub fn new(scene: &Scene, root: NodeHandle) -> Self {
        let bones = scene
            .subtree(root)
            .into_iter()
            .filter(|&handle| scene.get_node(handle).is_some_and(|n| n.is_bone))
            .collect();

        Self {
            root,
            bones,
            line_width: Self::LINE_WIDTH,
        }
    }

    /// World-space segments from each bone to its parent bone.
    #[must_use]
    pub fn segments(&self, scene: &Scene) -> Vec<(Vec3, Vec3)> {
        self.bones
            .iter()
            .filter_map(|&handle| {
                let bone = scene.get_node(handle)?;
                let parent = scene.get_node(bone.parent()?)?;
                if !parent.is_bone {
                    return None;
                }
                Some((
                    parent.world_matrix().translation.into(),
                    bone.world_matrix().translation.into(),
                ))
            })
            .collect()
    }
}

// ============================================================================
// Grid / Axes
// ============================================================================

/// Square grid on the XZ plane centred on the origin.
#[derive(Debug, Clone)]
pub struct GridHelper {
    pub size: f32,
    pub divisions: u32,
    pub center_line_color: u32,
    pub grid_color: u32,
}

impl Default for GridHelper {
    fn default() -> Self {
        Self {
            size: 10.0,
            divisions: 10,
            center_line_color: 0x44_4444,
            grid_color: 0x88_8888,
        }
    }
}

impl GridHelper {
    /// Line segments of the grid, both directions.
    #[must_use]
    pub fn lines(&self) -> Vec<(Vec3, Vec3)> {
        let half = self.size / 2.0;
        let step = self.size / self.divisions.max(1) as f32;
        let mut lines = Vec::with_capacity(2 * (self.divisions as usize + 1));

        for i in 0..=self.divisions {
            let k = -half + i as f32 * step;
            lines.push((Vec3::new(-half, 0.0, k), Vec3::new(half, 0.0, k)));
            lines.push((Vec3::new(k, 0.0, -half), Vec3::new(k, 0.0, half)));
        }
        lines
    }
}

/// RGB axis lines drawn on top of everything else.
#[derive(Debug, Clone)]
pub struct AxesHelper {
    pub size: f32,
    pub render_order: i32,
    /// Depth buffer is cleared before drawing
    pub clear_depth: bool,
}

impl Default for AxesHelper {
    fn default() -> Self {
        Self {
            size: 1.0,
            render_order: 999,
            clear_depth: true,
        }
    }
}
