pub mod gltf;

pub use gltf::{GltfContent, GltfLoader};
