//! Keyframe animation
//!
//! Clips are plain data shared through `Arc`; an [`AnimationMixer`] binds
//! them to one content root and owns the per-clip [`AnimationAction`]s.

pub mod action;
pub mod binder;
pub mod clip;
pub mod mixer;
pub mod tracks;
pub mod values;

pub use action::{AnimationAction, TrackValue};
pub use binder::{Binder, PropertyBinding};
pub use clip::{AnimationClip, TargetPath, Track, TrackData, TrackMeta, TrackTarget};
pub use mixer::AnimationMixer;
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::{Interpolatable, MorphWeightData};
