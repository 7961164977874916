//! Mutable view state
//!
//! Everything the control panel can change. The session owns one
//! [`ViewState`]; sync components read it whenever a change is applied.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::resources::ColorSpace;

/// Camera selection meaning "the synthetic framing camera".
pub const DEFAULT_CAMERA: &str = "[default]";

/// How colour textures (base colour, emissive) are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextureEncoding {
    Linear,
    #[default]
    #[serde(rename = "sRGB")]
    Srgb,
}

impl TextureEncoding {
    pub const OPTIONS: [TextureEncoding; 2] = [TextureEncoding::Srgb, TextureEncoding::Linear];

    #[must_use]
    pub fn color_space(self) -> ColorSpace {
        match self {
            TextureEncoding::Linear => ColorSpace::Linear,
            TextureEncoding::Srgb => ColorSpace::Srgb,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            TextureEncoding::Linear => "Linear",
            TextureEncoding::Srgb => "sRGB",
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::OPTIONS.into_iter().find(|e| e.label() == label)
    }
}

/// Colours (`0xRRGGBB`) and intensities of the three rig lights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightSettings {
    pub ambient_color: u32,
    pub ambient_intensity: f32,
    pub hemisphere_sky_color: u32,
    pub hemisphere_ground_color: u32,
    pub hemisphere_intensity: f32,
    pub directional_color: u32,
    pub directional_intensity: f32,
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            ambient_color: 0xFF_FFFF,
            ambient_intensity: 0.25,
            hemisphere_sky_color: 0xEE_EEEC,
            hemisphere_ground_color: 0x00_0023,
            hemisphere_intensity: 0.8,
            directional_color: 0xFF_FFFF,
            directional_intensity: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    /// Name of the selected environment catalog entry
    pub environment: String,
    /// Show the environment as scene background
    pub background: bool,
    /// Global animation speed, `0..=1` in the panel
    pub playback_speed: f32,
    /// Clip name -> playing
    pub action_states: BTreeMap<String, bool>,
    /// [`DEFAULT_CAMERA`] or the name of a content camera
    pub camera: String,

    pub wireframe: bool,
    pub skeleton: bool,
    pub grid: bool,
    pub auto_rotate: bool,

    /// `false` when the content brings its own lights
    pub add_lights: bool,
    pub exposure: f32,
    pub texture_encoding: TextureEncoding,
    pub lights: LightSettings,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            environment: "White".to_string(),
            background: false,
            playback_speed: 1.0,
            action_states: BTreeMap::new(),
            camera: DEFAULT_CAMERA.to_string(),

            wireframe: false,
            skeleton: false,
            grid: false,
            auto_rotate: false,

            add_lights: true,
            exposure: 1.0,
            texture_encoding: TextureEncoding::Srgb,
            lights: LightSettings::default(),
        }
    }
}
