use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::animation::binder::PropertyBinding;
use crate::animation::clip::{AnimationClip, TrackData};
use crate::animation::tracks::KeyframeCursor;
use crate::animation::values::MorphWeightData;

/// Playback state of one clip on one content root.
///
/// A fresh action is not scheduled; [`play`](Self::play) schedules it and
/// [`stop`](Self::stop) unschedules it and rewinds. Playback always loops.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    pub time: f32,
    pub time_scale: f32,
    pub weight: f32,
    pub paused: bool,
    pub enabled: bool,

    pub bindings: Vec<PropertyBinding>,

    running: bool,
    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            paused: false,
            enabled: true,
            bindings: Vec::new(),
            running: false,
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    // ========================================================================
    // Scheduling
    // ========================================================================

    pub fn play(&mut self) -> &mut Self {
        self.running = true;
        self
    }

    /// Unschedules the action and rewinds it.
    pub fn stop(&mut self) -> &mut Self {
        self.running = false;
        self.rewind();
        self
    }

    /// Rewinds to the start and clears `paused`, keeping the schedule.
    pub fn reset(&mut self) -> &mut Self {
        self.paused = false;
        self.enabled = true;
        self.rewind();
        self
    }

    pub fn set_effective_time_scale(&mut self, time_scale: f32) -> &mut Self {
        self.time_scale = time_scale;
        self
    }

    /// Scheduled, enabled, not paused, and moving.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running && self.enabled && !self.paused && self.time_scale != 0.0
    }

    fn rewind(&mut self) {
        self.time = 0.0;
        for cursor in &mut self.track_cursors {
            cursor.last_index = 0;
        }
    }

    // ========================================================================
    // Time
    // ========================================================================

    /// Advances time by `dt` seconds (already scaled by the mixer).
    pub fn update(&mut self, dt: f32) {
        if !self.is_running() {
            return;
        }

        let duration = self.clip.duration;
        if duration <= 0.0 {
            return;
        }

        self.time = (self.time + dt * self.time_scale).rem_euclid(duration);
    }

    /// Gets the value of the specified track at the current time.
    pub fn sample_track(&mut self, track_index: usize) -> Option<TrackValue> {
        let track = self.clip.tracks.get(track_index)?;
        let cursor = self.track_cursors.get_mut(track_index)?;

        Some(match &track.data {
            TrackData::Vector3(t) => TrackValue::Vector3(t.sample_with_cursor(self.time, cursor)),
            TrackData::Quaternion(t) => TrackValue::Quaternion(t.sample_with_cursor(self.time, cursor)),
            TrackData::MorphWeights(t) => {
                TrackValue::MorphWeights(Box::new(t.sample_with_cursor(self.time, cursor)))
            }
        })
    }
}

#[derive(Debug, Clone)]
pub enum TrackValue {
    Vector3(Vec3),
    Quaternion(Quat),
    MorphWeights(Box<MorphWeightData>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::clip::{TargetPath, Track, TrackMeta, TrackTarget};
    use crate::animation::tracks::{InterpolationMode, KeyframeTrack};

    fn one_second_clip() -> Arc<AnimationClip> {
        Arc::new(AnimationClip::new(
            "Slide".to_string(),
            vec![Track {
                meta: TrackMeta {
                    node: TrackTarget::Name("Box".to_string()),
                    target: TargetPath::Translation,
                },
                data: TrackData::Vector3(KeyframeTrack::new(
                    vec![0.0, 1.0],
                    vec![Vec3::ZERO, Vec3::X],
                    InterpolationMode::Linear,
                )),
            }],
        ))
    }

    #[test]
    fn fresh_action_is_idle() {
        let mut action = AnimationAction::new(one_second_clip());
        assert!(!action.is_running());
        action.update(0.5);
        assert_eq!(action.time, 0.0);
    }

    #[test]
    fn time_wraps_in_both_directions() {
        let mut action = AnimationAction::new(one_second_clip());
        action.play();

        action.update(1.25);
        assert!((action.time - 0.25).abs() < 1e-6);

        action.set_effective_time_scale(-1.0);
        action.update(0.5);
        assert!((action.time - 0.75).abs() < 1e-6);
    }

    #[test]
    fn stop_rewinds_and_unschedules() {
        let mut action = AnimationAction::new(one_second_clip());
        action.play();
        action.update(0.4);
        action.stop();
        assert!(!action.is_running());
        assert_eq!(action.time, 0.0);
        assert!(action.track_cursors.iter().all(|c| c.last_index == 0));
    }
}
