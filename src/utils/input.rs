use glam::Vec2;
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pointer state accumulated by the host between two frames.
#[derive(Default, Debug, Clone)]
pub struct Input {
    /// Cursor position inside the viewport
    pub cursor_position: Vec2,
    /// Cursor movement since the previous frame (dx, dy)
    pub cursor_delta: Vec2,
    /// Wheel movement this frame (x, y), in lines
    pub scroll_delta: Vec2,
    pub screen_size: Vec2,
    pub mouse_buttons: FxHashSet<MouseButton>,
}

impl Input {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears per-frame deltas so the camera does not keep moving.
    pub fn end_frame(&mut self) {
        self.cursor_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    pub fn handle_resize(&mut self, width: u32, height: u32) {
        self.screen_size = Vec2::new(width as f32, height as f32);
    }

    pub fn handle_cursor_move(&mut self, x: f32, y: f32) {
        let new_pos = Vec2::new(x, y);
        // No delta for the very first event
        if self.cursor_position != Vec2::ZERO {
            self.cursor_delta += new_pos - self.cursor_position;
        }
        self.cursor_position = new_pos;
    }

    pub fn handle_mouse_input(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.mouse_buttons.insert(button);
        } else {
            self.mouse_buttons.remove(&button);
        }
    }

    pub fn handle_mouse_wheel(&mut self, lines: Vec2) {
        self.scroll_delta += lines;
    }

    #[must_use]
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_reset_at_frame_end() {
        let mut input = Input::new();
        input.handle_cursor_move(10.0, 10.0);
        input.handle_cursor_move(14.0, 7.0);
        input.handle_mouse_wheel(Vec2::new(0.0, 1.0));
        assert_eq!(input.cursor_delta, Vec2::new(4.0, -3.0));

        input.end_frame();
        assert_eq!(input.cursor_delta, Vec2::ZERO);
        assert_eq!(input.scroll_delta, Vec2::ZERO);
    }
}
