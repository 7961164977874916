//! Frame driver
//!
//! The host calls [`RenderLoop::frame`] once per display refresh with its
//! frame timestamp. Each frame runs the same fixed sequence: orbit controls,
//! stats, animation, then scene update and draw. There is no fixed timestep
//! and no frame is skipped.

use std::time::Duration;

use crate::scene::{NodeHandle, Scene};
use crate::utils::{FpsCounter, Timer};
use crate::viewer::session::ViewerSession;

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderFrame<'a> {
    /// Scene with up-to-date world matrices
    pub scene: &'a Scene,
    /// Node of the active camera
    pub camera: NodeHandle,
    pub exposure: f32,
}

/// Draws frames. Implemented by the host's GPU layer.
pub trait RenderBackend {
    fn render(&mut self, frame: &RenderFrame<'_>);
}

/// Backend that draws nothing and counts frames.
#[derive(Debug, Default)]
pub struct NullBackend {
    pub frames: u64,
    pub last_camera: Option<NodeHandle>,
}

impl RenderBackend for NullBackend {
    fn render(&mut self, frame: &RenderFrame<'_>) {
        self.frames += 1;
        self.last_camera = Some(frame.camera);
    }
}

#[derive(Debug, Default)]
pub struct RenderLoop {
    timer: Timer,
    stats: FpsCounter,
}

impl RenderLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    #[must_use]
    pub fn stats(&self) -> &FpsCounter {
        &self.stats
    }

    /// Runs one frame at host time `now`.
    ///
    /// The first frame advances animation by zero.
    pub fn frame(&mut self, now: Duration, session: &mut ViewerSession, backend: &mut impl RenderBackend) {
        self.timer.tick(now);
        let dt = self.timer.dt_seconds();

        session.update_controls(dt);
        if let Some(fps) = self.stats.update(self.timer.delta) {
            log::trace!("{fps:.1} fps");
        }
        session.tick_animation(dt);

        session.prepare_frame();
        backend.render(&session.render_frame());
    }
}
