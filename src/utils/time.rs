use std::time::Duration;

/// Frame clock driven by host timestamps.
///
/// The first tick only establishes the reference point and reports a zero
/// delta. Timestamps that go backwards also yield a zero delta.
#[derive(Debug, Clone, Default)]
pub struct Timer {
    start_time: Option<Duration>,
    last_update: Option<Duration>,
    /// Time since last tick
    pub delta: Duration,
    /// Total elapsed time since the first tick
    pub elapsed: Duration,
    /// Total number of ticks
    pub frame_count: u64,
}

impl Timer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the clock to `now` (for example `performance.now()` style
    /// milliseconds converted to a [`Duration`]).
    pub fn tick(&mut self, now: Duration) {
        let start = *self.start_time.get_or_insert(now);
        self.delta = self
            .last_update
            .map_or(Duration::ZERO, |last| now.saturating_sub(last));
        self.elapsed = now.saturating_sub(start);
        self.last_update = Some(now);
        self.frame_count += 1;
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_has_zero_delta() {
        let mut timer = Timer::new();
        timer.tick(Duration::from_millis(500));
        assert_eq!(timer.delta, Duration::ZERO);

        timer.tick(Duration::from_millis(516));
        assert_eq!(timer.delta, Duration::from_millis(16));
        assert_eq!(timer.elapsed, Duration::from_millis(16));
        assert_eq!(timer.frame_count, 2);
    }

    #[test]
    fn backwards_timestamps_do_not_underflow() {
        let mut timer = Timer::new();
        timer.tick(Duration::from_millis(100));
        timer.tick(Duration::from_millis(50));
        assert_eq!(timer.delta, Duration::ZERO);
    }
}
