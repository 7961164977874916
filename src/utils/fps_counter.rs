use std::time::Duration;

/// Frame statistics shown by the performance overlay.
///
/// Driven by the frame timestamps the render loop already receives, so it
/// works the same for real and simulated clocks.
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    frame_count: u32,
    accumulated_time: Duration,
    pub current_fps: f32,
    /// Duration of the most recent frame, in milliseconds
    pub last_frame_ms: f32,
    pub total_frames: u64,
}

impl FpsCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one frame of length `delta`. Returns the new average once per
    /// second of accumulated time.
    pub fn update(&mut self, delta: Duration) -> Option<f32> {
        self.frame_count += 1;
        self.total_frames += 1;
        self.accumulated_time += delta;
        self.last_frame_ms = delta.as_secs_f32() * 1000.0;

        // Update statistics every 1 second (1000ms)
        if self.accumulated_time.as_secs_f32() >= 1.0 {
            self.current_fps = self.frame_count as f32 / self.accumulated_time.as_secs_f32();

            self.accumulated_time = Duration::ZERO;
            self.frame_count = 0;

            return Some(self.current_fps);
        }

        None
    }
}
