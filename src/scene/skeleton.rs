use glam::{Affine3A, Mat4};
use slotmap::SlotMap;
use uuid::Uuid;

use crate::scene::{Node, NodeHandle, SkeletonKey};

/// Attaches a mesh node to a skeleton. Joint matrices are expressed relative
/// to the mesh node's current world matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkinBinding {
    pub skeleton: SkeletonKey,
}

#[derive(Debug, Clone)]
pub struct Skeleton {
    pub id: Uuid,
    pub name: String,

    /// Joint nodes; `bones[i]` is joint `i` of the skinned vertices
    pub bones: Vec<NodeHandle>,

    /// Mesh space to joint space, one per bone
    pub(crate) inverse_bind_matrices: Vec<Affine3A>,
    pub(crate) root_bone_index: usize,

    joint_matrices: Vec<Mat4>,
}

impl Skeleton {
    /// Missing inverse bind matrices default to identity.
    #[must_use]
    pub fn new(name: &str, bones: Vec<NodeHandle>, inverse_bind_matrices: Vec<Affine3A>, root_bone_index: usize) -> Self {
        let count = bones.len();
        let mut inverse_bind_matrices = inverse_bind_matrices;
        inverse_bind_matrices.resize(count, Affine3A::IDENTITY);

        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            bones,
            inverse_bind_matrices,
            root_bone_index,
            joint_matrices: vec![Mat4::IDENTITY; count],
        }
    }

    /// Topmost joint of the hierarchy.
    #[must_use]
    pub fn root_bone(&self) -> Option<NodeHandle> {
        self.bones.get(self.root_bone_index).copied()
    }

    /// Joint matrices from the last [`compute_joint_matrices`](Self::compute_joint_matrices).
    #[must_use]
    pub fn joint_matrices(&self) -> &[Mat4] {
        &self.joint_matrices
    }

    /// `mesh_world_inv` is the inverse world matrix of the skinned mesh node.
    /// Bones that no longer exist keep their previous matrix.
    pub fn compute_joint_matrices(&mut self, nodes: &SlotMap<NodeHandle, Node>, mesh_world_inv: Affine3A) {
        let joints = self.bones.iter().zip(&self.inverse_bind_matrices);
        for (slot, (&bone, ibm)) in self.joint_matrices.iter_mut().zip(joints) {
            if let Some(node) = nodes.get(bone) {
                *slot = (mesh_world_inv * node.transform.world_matrix * *ibm).into();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn joint_matrix_cancels_bind_pose() {
        let mut nodes: SlotMap<NodeHandle, Node> = SlotMap::with_key();
        let mut bone = Node::new("Hip");
        let bind = Affine3A::from_translation(Vec3::new(0.0, 2.0, 0.0));
        bone.transform.world_matrix = bind;
        let bone = nodes.insert(bone);

        let mut skeleton = Skeleton::new("Rig", vec![bone], vec![bind.inverse()], 0);
        assert_eq!(skeleton.root_bone(), Some(bone));

        skeleton.compute_joint_matrices(&nodes, Affine3A::IDENTITY);
        assert!(skeleton.joint_matrices()[0].abs_diff_eq(Mat4::IDENTITY, 1e-6));

        nodes[bone].transform.world_matrix = Affine3A::from_translation(Vec3::new(0.0, 3.0, 0.0));
        skeleton.compute_joint_matrices(&nodes, Affine3A::IDENTITY);
        let moved = skeleton.joint_matrices()[0].transform_point3(Vec3::ZERO);
        assert!((moved - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn missing_bind_matrices_are_identity() {
        let mut nodes: SlotMap<NodeHandle, Node> = SlotMap::with_key();
        let a = nodes.insert(Node::new("a"));
        let b = nodes.insert(Node::new("b"));
        let skeleton = Skeleton::new("Rig", vec![a, b], Vec::new(), 1);
        assert_eq!(skeleton.inverse_bind_matrices.len(), 2);
        assert_eq!(skeleton.root_bone(), Some(b));
    }
}
