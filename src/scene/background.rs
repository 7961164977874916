//! Vignette backdrop
//!
//! A radial gradient drawn behind the content when no environment
//! background is shown from the default camera.

use crate::resources::hex_to_rgb;
use glam::Vec3;

#[derive(Debug, Clone, PartialEq)]
pub struct Vignette {
    pub aspect: f32,
    pub grain_scale: f32,
    /// Inner and outer gradient colours
    pub colors: [u32; 2],
}

impl Vignette {
    #[must_use]
    pub fn new(aspect: f32) -> Self {
        Self {
            aspect,
            grain_scale: 0.001,
            colors: [0xFF_FFFF, 0x35_3535],
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    #[must_use]
    pub fn inner_color(&self) -> Vec3 {
        hex_to_rgb(self.colors[0])
    }

    #[must_use]
    pub fn outer_color(&self) -> Vec3 {
        hex_to_rgb(self.colors[1])
    }
}

impl Default for Vignette {
    fn default() -> Self {
        Self::new(1.0)
    }
}
