//! Viewer configuration
//!
//! Loaded from JSON; every field is optional and falls back to the stock
//! viewer setup.
//!
//! ```json
//! {
//!     "viewport": { "width": 1280, "height": 720 },
//!     "kiosk": true,
//!     "initial_state": { "grid": true, "environment": "Park (Day)" }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assets::environment::{EnvironmentEntry, default_catalog};
use crate::errors::Result;
use crate::utils::OrbitControls;
use crate::viewer::state::ViewState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub viewport: Viewport,
    /// Start with the control panel closed
    pub kiosk: bool,
    pub initial_state: ViewState,
    pub environments: Vec<EnvironmentEntry>,
    pub auto_rotate_speed: f32,
    /// Vertical field of view of the default camera, in degrees
    pub camera_fov: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            kiosk: false,
            initial_state: ViewState::default(),
            environments: default_catalog(),
            auto_rotate_speed: OrbitControls::DEFAULT_AUTO_ROTATE_SPEED,
            camera_fov: 60.0,
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_stock_config() {
        let config = ViewerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.environments.len(), 8);
    }

    #[test]
    fn overrides_apply() {
        let config = ViewerConfig::from_json_str(
            r#"{"kiosk":true,"viewport":{"width":800,"height":400},"initial_state":{"grid":true}}"#,
        )
        .unwrap();
        assert!(config.kiosk);
        assert!((config.viewport.aspect() - 2.0).abs() < f32::EPSILON);
        assert!(config.initial_state.grid);
        assert!(!config.initial_state.wireframe);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            ViewerConfig::from_json_str("{"),
            Err(crate::errors::ViewerError::Json(_))
        ));
    }
}
