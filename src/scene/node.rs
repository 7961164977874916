use glam::Affine3A;
use uuid::Uuid;

use crate::scene::skeleton::SkinBinding;
use crate::scene::transform::Transform;
use crate::scene::{CameraKey, LightKey, MeshKey, NodeHandle};

/// What a node carries besides its transform.
///
/// Consumers match on this exhaustively instead of probing capability flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeKind {
    /// Pure grouping node (also used for bones)
    #[default]
    Group,
    Mesh(MeshKey),
    Camera(CameraKey),
    Light(LightKey),
}

/// A scene node.
///
/// # Hierarchy
///
/// Nodes form a tree structure through parent-child relationships:
/// - `parent`: Optional handle to parent node (None for root nodes)
/// - `children`: List of child node handles
///
/// Use [`Scene::attach`](crate::scene::Scene::attach) to keep both sides in sync.
///
/// # Transform
///
/// Each node has a [`Transform`] component that manages:
/// - Local position, rotation, and scale
/// - Cached local and world matrices
/// - Dirty flag for efficient updates
#[derive(Debug, Clone)]
pub struct Node {
    pub uuid: Uuid,
    pub name: String,

    // === Core Hierarchy ===
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    // === Core Spatial Data ===
    pub transform: Transform,

    // === Components ===
    pub kind: NodeKind,
    /// Present on skinned meshes
    pub skin: Option<SkinBinding>,
    /// Set on nodes referenced as joints by a skin
    pub is_bone: bool,

    pub visible: bool,
}

impl Node {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            kind: NodeKind::Group,
            skin: None,
            is_bone: false,
            visible: true,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn mesh(&self) -> Option<MeshKey> {
        match self.kind {
            NodeKind::Mesh(key) => Some(key),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn camera(&self) -> Option<CameraKey> {
        match self.kind {
            NodeKind::Camera(key) => Some(key),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn light(&self) -> Option<LightKey> {
        match self.kind {
            NodeKind::Light(key) => Some(key),
            _ => None,
        }
    }

    /// Returns a reference to the world transformation matrix.
    ///
    /// Only valid after the transform system ran for this frame.
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("")
    }
}
