//! Scene graph module
//!
//! Manages the scene hierarchy and its components:
//! - Node: scene node with parent/child links and a tagged [`NodeKind`]
//! - Transform: TRS with cached matrices and dirty checking
//! - Scene: node pool plus component and resource pools
//! - Camera / Light / Skeleton: node components
//! - Overlay: debug helpers (skeleton lines, grid, axes) living outside content
//! - TransformSystem: hierarchy matrix update decoupled from `Scene`

pub mod background;
pub mod camera;
pub mod helpers;
pub mod light;
pub mod node;
pub mod scene;
pub mod skeleton;
pub mod transform;
pub mod transform_system;

pub use background::Vignette;
pub use camera::{Camera, ProjectionType};
pub use helpers::{AxesHelper, GridHelper, Overlay, SkeletonHelper};
pub use light::{Light, LightKind};
pub use node::{Node, NodeKind};
pub use scene::Scene;
pub use skeleton::{Skeleton, SkinBinding};
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct MeshKey;
    pub struct CameraKey;
    pub struct LightKey;
    pub struct SkeletonKey;
    pub struct OverlayKey;
}
