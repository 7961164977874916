//! Utility Module
//!
//! - [`OrbitControls`]: orbit camera controller for the default camera
//! - [`Input`]: pointer state fed by the host
//! - [`FpsCounter`]: frame rate measurement for the stats overlay
//! - [`Timer`]: frame clock driven by host timestamps

pub mod fps_counter;
pub mod input;
pub mod orbit_control;
pub mod time;

pub use fps_counter::FpsCounter;
pub use input::{Input, MouseButton};
pub use orbit_control::OrbitControls;
pub use time::Timer;
