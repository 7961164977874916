//! Core resource definitions
//!
//! CPU-side data referenced by the scene graph:
//! - Mesh: geometry + material instance
//! - Material: surface description and display flags
//! - Texture / Image: decoded pixel data and colour space
//! - Geometry: vertex data and bounds

pub mod color;
pub mod geometry;
pub mod image;
pub mod material;
pub mod mesh;
pub mod texture;
pub mod version_tracker;

use slotmap::new_key_type;

new_key_type! {
    pub struct MaterialHandle;
    pub struct TextureHandle;
}

pub use color::{hex_to_rgb, rgb_to_hex};
pub use geometry::{BoundingBox, Geometry};
pub use image::Image;
pub use material::{AlphaMode, Material, MaterialData, MeshBasicMaterial, MeshStandardMaterial};
pub use mesh::{MAX_MORPH_TARGETS, Mesh};
pub use texture::{ColorSpace, CubeMap, Texture};
pub use version_tracker::ChangeTracker;
