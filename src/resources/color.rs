//! Packed `0xRRGGBB` colour helpers.
//!
//! Panel colour pickers and config files speak hex; lights and materials
//! store linear `Vec3` channels in `0..=1`.

use glam::Vec3;

#[must_use]
pub fn hex_to_rgb(hex: u32) -> Vec3 {
    let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
    let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
    let b = (hex & 0xFF) as f32 / 255.0;
    Vec3::new(r, g, b)
}

#[must_use]
pub fn rgb_to_hex(rgb: Vec3) -> u32 {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
    (channel(rgb.x) << 16) | (channel(rgb.y) << 8) | channel(rgb.z)
}
