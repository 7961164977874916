use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InterpolationMode {
    Linear,
    Step,
    CubicSpline,
}

const MAX_SCAN_OFFSET: usize = 3;

/// Last keyframe interval a track was sampled in.
///
/// Playback moves forward in small steps, so the next sample is almost always
/// within a few keyframes of the previous one.
#[derive(Debug, Clone, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    /// For CubicSpline, length is `times.len() * 3` (in-tangent, value, out-tangent)
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    /// Samples using and updating `cursor`.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> T {
        let len = self.times.len();
        if len == 0 {
            return T::default();
        }
        if len == 1 {
            return self.value_at(0);
        }

        let i = cursor.last_index.min(len - 1);
        let t_curr = self.times[i];

        let found_index = if time >= t_curr {
            // Forward: playback or fast-forward
            let mut res = None;
            for offset in 0..=MAX_SCAN_OFFSET {
                let idx = i + offset;
                if idx >= len - 1 {
                    if time >= self.times[len - 1] {
                        res = Some(len - 1);
                    }
                    break;
                }
                if time < self.times[idx + 1] {
                    res = Some(idx);
                    break;
                }
            }
            res
        } else {
            // Backward: reverse playback or loop wrap
            let mut res = None;
            for offset in 0..=MAX_SCAN_OFFSET {
                if i < offset {
                    break;
                }
                let idx = i - offset;
                if time >= self.times[idx] {
                    res = Some(idx);
                    break;
                }
            }
            res
        };

        let final_index = found_index.unwrap_or_else(|| {
            // Large jump: binary search
            let next_idx = self.times.partition_point(|&t| t <= time);
            next_idx.saturating_sub(1)
        });
        cursor.last_index = final_index;

        self.sample_at_frame(final_index, time)
    }

    /// For Linear/Step the value sits at `index`; for CubicSpline at `index * 3 + 1`.
    fn value_at(&self, index: usize) -> T {
        let slot = match self.interpolation {
            InterpolationMode::CubicSpline => index * 3 + 1,
            _ => index,
        };
        self.values.get(slot).copied().unwrap_or_default()
    }

    fn sample_at_frame(&self, index: usize, time: f32) -> T {
        let len = self.times.len();

        if index >= len - 1 {
            return self.value_at(len - 1);
        }
        if time <= self.times[0] {
            return self.value_at(0);
        }

        let next_idx = index + 1;
        let t0 = self.times[index];
        let t1 = self.times[next_idx];
        let dt = t1 - t0;

        let t = if dt > 1e-6 { (time - t0) / dt } else { 0.0 };
        let t = t.clamp(0.0, 1.0);

        match self.interpolation {
            InterpolationMode::Step => self.value_at(index),
            InterpolationMode::Linear => {
                T::interpolate_linear(self.value_at(index), self.value_at(next_idx), t)
            }
            InterpolationMode::CubicSpline => {
                let i_prev = index * 3;
                let i_next = next_idx * 3;
                let get = |i: usize| self.values.get(i).copied().unwrap_or_default();

                T::interpolate_cubic(get(i_prev + 1), get(i_prev + 2), get(i_next), get(i_next + 1), t, dt)
            }
        }
    }
}
