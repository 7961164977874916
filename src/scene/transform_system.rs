//! Transform System
//!
//! Updates world matrices down the hierarchy. Kept apart from [`Scene`](crate::scene::Scene)
//! so it only borrows the node pool and the camera pool it writes to.

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::camera::Camera;
use crate::scene::node::{Node, NodeKind};
use crate::scene::{CameraKey, NodeHandle};

/// Updates every tree reachable from `roots`.
///
/// Uses an explicit stack so deep hierarchies cannot overflow the call stack.
pub fn update_hierarchy_iterative(
    nodes: &mut SlotMap<NodeHandle, Node>,
    cameras: &mut SlotMap<CameraKey, Camera>,
    roots: &[NodeHandle],
) {
    let mut stack: Vec<(NodeHandle, Affine3A, bool)> = Vec::with_capacity(64);

    for &root_handle in roots.iter().rev() {
        stack.push((root_handle, Affine3A::IDENTITY, false));
    }

    drain_stack(nodes, cameras, &mut stack);
}

/// Updates the subtree below `root_handle`, starting from its parent's
/// current world matrix. The root is always recomputed.
pub fn update_subtree(
    nodes: &mut SlotMap<NodeHandle, Node>,
    cameras: &mut SlotMap<CameraKey, Camera>,
    root_handle: NodeHandle,
) {
    let Some(node) = nodes.get(root_handle) else {
        return;
    };
    let parent_world = node
        .parent
        .and_then(|p| nodes.get(p))
        .map_or(Affine3A::IDENTITY, |p| p.transform.world_matrix);

    let mut stack = vec![(root_handle, parent_world, true)];
    drain_stack(nodes, cameras, &mut stack);
}

fn drain_stack(
    nodes: &mut SlotMap<NodeHandle, Node>,
    cameras: &mut SlotMap<CameraKey, Camera>,
    stack: &mut Vec<(NodeHandle, Affine3A, bool)>,
) {
    while let Some((node_handle, parent_world_matrix, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(node_handle) else {
            continue;
        };

        let local_changed = node.transform.update_local_matrix();
        let world_needs_update = local_changed || parent_changed;

        if world_needs_update {
            let new_world = parent_world_matrix * *node.transform.local_matrix();
            node.transform.set_world_matrix(new_world);

            if let NodeKind::Camera(camera_key) = node.kind
                && let Some(camera) = cameras.get_mut(camera_key)
            {
                camera.update_view_projection(&new_world);
            }
        }

        let current_world = node.transform.world_matrix;

        // Reverse so children pop in declaration order
        for &child_handle in node.children.iter().rev() {
            stack.push((child_handle, current_world, world_needs_update));
        }
    }
}
