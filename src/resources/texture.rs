use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::resources::image::Image;
use crate::resources::version_tracker::ChangeTracker;

/// How the renderer should interpret the texel values of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorSpace {
    #[default]
    Linear,
    Srgb,
}

#[derive(Debug, Clone)]
pub struct Texture {
    pub uuid: Uuid,
    pub name: Option<String>,
    /// `None` when the image could not be fetched or decoded
    pub image: Option<Arc<Image>>,
    /// Original reference, kept for diagnostics
    pub source_uri: Option<String>,
    color_space: ColorSpace,
    tracker: ChangeTracker,
}

impl Texture {
    #[must_use]
    pub fn new(name: Option<String>, image: Option<Arc<Image>>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name,
            image,
            source_uri: None,
            color_space: ColorSpace::Linear,
            tracker: ChangeTracker::new(),
        }
    }

    #[must_use]
    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    /// Returns `true` when the color space actually changed.
    pub fn set_color_space(&mut self, color_space: ColorSpace) -> bool {
        if self.color_space == color_space {
            return false;
        }
        self.color_space = color_space;
        self.tracker.changed();
        true
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.tracker.version()
    }
}

/// Cube map faces in `+x -x +y -y +z -z` order.
pub const CUBE_FACE_SUFFIXES: [&str; 6] = ["posx", "negx", "posy", "negy", "posz", "negz"];

/// A six-face environment texture referenced by URL.
///
/// The faces are resolved by the host renderer; the scene only stores the
/// references so content materials and the background can share them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubeMap {
    pub name: String,
    pub faces: [String; 6],
}

impl CubeMap {
    /// Builds the face URLs as `path + suffix + format`.
    #[must_use]
    pub fn from_directory(name: &str, path: &str, format: &str) -> Self {
        Self {
            name: name.to_string(),
            faces: CUBE_FACE_SUFFIXES.map(|suffix| format!("{path}{suffix}{format}")),
        }
    }
}
