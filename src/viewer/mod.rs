//! Viewer session
//!
//! - [`session`]: [`ViewerSession`], owner of the scene, content and view state
//! - [`state`]: [`ViewState`], everything the control panel edits
//! - [`normalizer`]: recentring and default-camera framing
//! - [`animation`]: mixer lifecycle and clip toggles
//! - [`cameras`]: default / content camera switching
//! - [`lighting`]: the fixed three-light rig
//! - [`display`]: wireframe, helpers, texture encoding and environment
//! - [`panel`]: control panel schema
//! - [`render_loop`]: per-frame driver and the renderer seam

pub mod animation;
pub mod cameras;
pub mod display;
pub mod lighting;
pub mod normalizer;
pub mod panel;
pub mod render_loop;
pub mod session;
pub mod state;

pub use animation::AnimationController;
pub use cameras::{ActiveCamera, CameraEntry, CameraSwitchboard};
pub use display::DisplayStateSync;
pub use lighting::LightingRig;
pub use normalizer::{ContentNormalizer, Framing};
pub use panel::{ControlChange, ControlKey, ControlKind, ControlPanel, ControlSpec, ControlValue, Folder};
pub use render_loop::{NullBackend, RenderBackend, RenderFrame, RenderLoop};
pub use session::ViewerSession;
pub use state::{DEFAULT_CAMERA, LightSettings, TextureEncoding, ViewState};
