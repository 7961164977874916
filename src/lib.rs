#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod assets;
pub mod config;
pub mod errors;
pub mod resources;
pub mod scene;
pub mod utils;
pub mod viewer;

pub use animation::{AnimationAction, AnimationClip, AnimationMixer, Binder};
pub use assets::{AssetLoader, AssetMap, LoadRequest, ObjectUrlRegistry};
pub use config::ViewerConfig;
pub use errors::{Result, ViewerError};
pub use resources::{Geometry, Image, Material, Mesh, Texture};
pub use scene::{Camera, Light, Node, Scene};
pub use utils::OrbitControls;
pub use viewer::{ControlChange, ControlKey, ControlValue, RenderBackend, RenderLoop, ViewState, ViewerSession};
