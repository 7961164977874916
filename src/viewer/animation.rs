//! Clip playback for the current content
//!
//! Clips come with the loaded asset and are bound to its root. The first clip
//! autoplays; the panel toggles the rest. Playback speed scales the mixer,
//! not the individual actions.

use std::sync::Arc;

use crate::animation::{AnimationClip, AnimationMixer};
use crate::scene::{NodeHandle, Scene};
use crate::viewer::state::ViewState;

/// Owns the mixer of the current content and the clip list shown in the
/// panel.
///
/// There is at most one mixer, bound to the current content root. Binding
/// new content always tears the previous mixer down first.
#[derive(Debug, Default)]
pub struct AnimationController {
    mixer: Option<AnimationMixer>,
    clips: Vec<Arc<AnimationClip>>,
}

impl AnimationController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the clip set. A mixer is only created when there is
    /// something to play.
    pub fn bind(&mut self, root: NodeHandle, clips: Vec<Arc<AnimationClip>>, playback_speed: f32) {
        self.clear();
        if clips.is_empty() {
            return;
        }
        let mut mixer = AnimationMixer::new(root);
        mixer.time_scale = playback_speed;
        self.mixer = Some(mixer);
        self.clips = clips;
    }

    /// Stops everything and forgets the current mixer.
    pub fn clear(&mut self) {
        if let Some(mut mixer) = self.mixer.take() {
            mixer.stop_all_action();
            mixer.uncache_root();
        }
        self.clips.clear();
    }

    #[must_use]
    pub fn mixer(&self) -> Option<&AnimationMixer> {
        self.mixer.as_ref()
    }

    #[must_use]
    pub fn clips(&self) -> &[Arc<AnimationClip>] {
        &self.clips
    }

    pub fn clip_names(&self) -> impl Iterator<Item = &str> {
        self.clips.iter().map(|c| c.name.as_str())
    }

    /// Advances the mixer by `dt` seconds of wall time.
    pub fn tick(&mut self, dt: f32, scene: &mut Scene) {
        if let Some(mixer) = &mut self.mixer {
            mixer.update(dt, scene);
        }
    }

    pub fn set_playback_speed(&mut self, speed: f32) {
        if let Some(mixer) = &mut self.mixer {
            mixer.time_scale = speed;
        }
    }

    /// Resets the clip toggles for freshly bound content: the first clip
    /// starts playing, every other clip is off.
    pub fn sync_action_states(&mut self, state: &mut ViewState, scene: &Scene) {
        state.action_states.clear();
        let Some(mixer) = &mut self.mixer else {
            return;
        };
        for (i, clip) in self.clips.iter().enumerate() {
            let playing = i == 0;
            state.action_states.insert(clip.name.clone(), playing);
            if playing {
                mixer.clip_action(clip, scene).play();
            }
        }
    }

    /// Restarts every clip from the beginning.
    pub fn play_all(&mut self, state: &mut ViewState, scene: &Scene) {
        let Some(mixer) = &mut self.mixer else {
            return;
        };
        for clip in &self.clips {
            mixer.clip_action(clip, scene).reset().play();
            state.action_states.insert(clip.name.clone(), true);
        }
    }

    /// Starts or stops the clip called `name`. Returns `false` if there is
    /// no such clip.
    pub fn set_clip_enabled(&mut self, name: &str, enabled: bool, state: &mut ViewState, scene: &Scene) -> bool {
        let Some(mixer) = &mut self.mixer else {
            return false;
        };
        let Some(clip) = self.clips.iter().find(|c| c.name == name) else {
            log::debug!("No animation clip named `{name}`");
            return false;
        };

        let action = mixer.clip_action(clip, scene);
        action.set_effective_time_scale(1.0);
        if enabled {
            action.play();
        } else {
            action.stop();
        }
        state.action_states.insert(clip.name.clone(), enabled);
        true
    }
}
