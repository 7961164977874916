use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{Vec2, Vec3};

use crate::scene::transform::Transform;
use crate::utils::input::{Input, MouseButton};

const EPS: f32 = 0.0001;

/// Spherical coordinates the controls can be reset to.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SavedState {
    center: Vec3,
    radius: f32,
    theta: f32,
    phi: f32,
}

/// Orbits the default camera around a target point.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    /// Disabled controls leave the camera alone
    pub enabled: bool,

    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping_factor: f32,
    pub enable_damping: bool,
    pub min_distance: f32,
    pub max_distance: f32,

    pub auto_rotate: bool,
    /// Full turns per minute at 60 fps; negative spins the other way
    pub auto_rotate_speed: f32,

    pub center: Vec3,
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,

    rotate_delta: Vec2,
    saved: SavedState,
}

impl OrbitControls {
    pub const DEFAULT_AUTO_ROTATE_SPEED: f32 = -10.0;

    #[must_use]
    pub fn new(center: Vec3, radius: f32) -> Self {
        let saved = SavedState {
            center,
            radius,
            theta: 0.0,
            phi: FRAC_PI_2,
        };
        Self {
            enabled: true,

            rotate_speed: 1.0,
            zoom_speed: 0.05,
            pan_speed: 1.0,
            damping_factor: 0.05,
            enable_damping: true,
            min_distance: 0.0,
            max_distance: f32::INFINITY,

            auto_rotate: false,
            auto_rotate_speed: Self::DEFAULT_AUTO_ROTATE_SPEED,

            center,
            radius,
            theta: saved.theta,
            phi: saved.phi,

            rotate_delta: Vec2::ZERO,
            saved,
        }
    }

    /// Re-targets the controls so the camera at `position` looks at `target`.
    pub fn look_from(&mut self, position: Vec3, target: Vec3) {
        let offset = position - target;
        self.center = target;
        self.radius = offset.length();
        if self.radius > EPS {
            self.theta = offset.x.atan2(offset.z);
            self.phi = (offset.y / self.radius).clamp(-1.0, 1.0).acos().clamp(EPS, PI - EPS);
        }
        self.rotate_delta = Vec2::ZERO;
    }

    /// Remembers the current orbit for [`reset`](Self::reset).
    pub fn save_state(&mut self) {
        self.saved = SavedState {
            center: self.center,
            radius: self.radius,
            theta: self.theta,
            phi: self.phi,
        };
    }

    pub fn reset(&mut self) {
        self.center = self.saved.center;
        self.radius = self.saved.radius;
        self.theta = self.saved.theta;
        self.phi = self.saved.phi;
        self.rotate_delta = Vec2::ZERO;
    }

    /// Camera position implied by the current orbit.
    #[must_use]
    pub fn eye(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        self.center
            + Vec3::new(
                self.radius * sin_phi * self.theta.sin(),
                self.radius * self.phi.cos(),
                self.radius * sin_phi * self.theta.cos(),
            )
    }

    pub fn update(&mut self, transform: &mut Transform, input: &Input, fov_degrees: f32, dt: f32) {
        if !self.enabled {
            return;
        }
        let screen_height = input.screen_size.y.max(1.0);

        if input.is_button_pressed(MouseButton::Left) {
            let rotate_per_pixel = TAU / screen_height;
            self.rotate_delta.x -= input.cursor_delta.x * rotate_per_pixel * self.rotate_speed;
            self.rotate_delta.y -= input.cursor_delta.y * rotate_per_pixel * self.rotate_speed;
        }

        if self.auto_rotate {
            self.theta -= TAU / 60.0 * self.auto_rotate_speed * dt;
        }

        if self.enable_damping {
            let target_fps = 60.0;
            let retention = (1.0 - self.damping_factor).powf(dt * target_fps);
            let delta_apply = self.rotate_delta * (1.0 - retention);

            self.theta += delta_apply.x;
            self.phi += delta_apply.y;
            self.rotate_delta *= retention;
        } else {
            self.theta += self.rotate_delta.x;
            self.phi += self.rotate_delta.y;
            self.rotate_delta = Vec2::ZERO;
        }

        self.phi = self.phi.clamp(EPS, PI - EPS);

        if input.scroll_delta.y != 0.0 {
            let scale = (1.0 - self.zoom_speed).powf(input.scroll_delta.y.abs());
            if input.scroll_delta.y > 0.0 {
                self.radius *= scale;
            } else {
                self.radius /= scale;
            }
        }
        self.radius = self.radius.clamp(self.min_distance, self.max_distance);

        if input.is_button_pressed(MouseButton::Right) {
            let half_fov = fov_degrees.to_radians() / 2.0;
            let target_world_height = 2.0 * self.radius * half_fov.tan();
            let pixels_to_world_ratio = target_world_height / screen_height;

            let forward = (self.center - self.eye()).normalize_or_zero();
            let right = forward.cross(Vec3::Y).normalize_or_zero();
            let up = right.cross(forward).normalize_or_zero();

            self.center += (right * -input.cursor_delta.x + up * input.cursor_delta.y)
                * pixels_to_world_ratio
                * self.pan_speed;
        }

        transform.position = self.eye();
        transform.look_at(self.center, Vec3::Y);
    }
}
