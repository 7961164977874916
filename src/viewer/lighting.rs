//! Fixed three-light rig
//!
//! The rig lights are created once per session and live outside the content,
//! so loading or clearing content never touches them. Panel changes only
//! mutate their colour and intensity.

use glam::Vec3;

use crate::resources::hex_to_rgb;
use crate::scene::light::LightKind;
use crate::scene::{Light, NodeHandle, Scene};
use crate::viewer::state::LightSettings;

pub const HEMISPHERE_POSITION: Vec3 = Vec3::new(0.0, 1000.0, 0.0);
pub const DIRECTIONAL_POSITION: Vec3 = Vec3::new(-2500.0, 3000.0, 2500.0);
pub const DIRECTIONAL_TARGET: Vec3 = Vec3::new(0.0, 200.0, 0.0);

#[derive(Debug, Clone, Copy)]
pub struct LightingRig {
    ambient: NodeHandle,
    hemisphere: NodeHandle,
    directional: NodeHandle,
}

impl LightingRig {
    /// Adds the three rig lights to `scene`, configured from `settings`.
    pub fn new(scene: &mut Scene, settings: &LightSettings) -> Self {
        let ambient = scene.add_light(
            "AmbientLight",
            Light::new_ambient(hex_to_rgb(settings.ambient_color), settings.ambient_intensity),
            None,
        );

        let hemisphere = scene.add_light(
            "HemisphereLight",
            Light::new_hemisphere(
                hex_to_rgb(settings.hemisphere_sky_color),
                hex_to_rgb(settings.hemisphere_ground_color),
                settings.hemisphere_intensity,
            ),
            None,
        );
        if let Some(node) = scene.get_node_mut(hemisphere) {
            node.transform.position = HEMISPHERE_POSITION;
        }

        let mut sun = Light::new_directional(hex_to_rgb(settings.directional_color), settings.directional_intensity);
        sun.cast_shadows = false;
        if let LightKind::Directional(directional) = &mut sun.kind {
            directional.target = DIRECTIONAL_TARGET;
        }
        let directional = scene.add_light("DirectionalLight", sun, None);
        if let Some(node) = scene.get_node_mut(directional) {
            node.transform.position = DIRECTIONAL_POSITION;
            node.transform.look_at(DIRECTIONAL_TARGET, Vec3::Y);
        }

        Self {
            ambient,
            hemisphere,
            directional,
        }
    }

    #[must_use]
    pub fn ambient(&self) -> NodeHandle {
        self.ambient
    }

    #[must_use]
    pub fn hemisphere(&self) -> NodeHandle {
        self.hemisphere
    }

    #[must_use]
    pub fn directional(&self) -> NodeHandle {
        self.directional
    }

    /// Copies colours and intensities from `settings` onto the rig lights.
    pub fn apply(&self, scene: &mut Scene, settings: &LightSettings) {
        if let Some((_, light)) = scene.query_light_bundle(self.ambient) {
            light.color = hex_to_rgb(settings.ambient_color);
            light.intensity = settings.ambient_intensity;
        }
        if let Some((_, light)) = scene.query_light_bundle(self.hemisphere) {
            light.color = hex_to_rgb(settings.hemisphere_sky_color);
            light.intensity = settings.hemisphere_intensity;
            if let LightKind::Hemisphere(hemisphere) = &mut light.kind {
                hemisphere.ground_color = hex_to_rgb(settings.hemisphere_ground_color);
            }
        }
        if let Some((_, light)) = scene.query_light_bundle(self.directional) {
            light.color = hex_to_rgb(settings.directional_color);
            light.intensity = settings.directional_intensity;
        }
    }

    /// Whether the content brings lights of its own.
    #[must_use]
    pub fn detect_content_lights(scene: &Scene, content: NodeHandle) -> bool {
        scene
            .subtree(content)
            .into_iter()
            .any(|h| scene.get_node(h).is_some_and(|n| n.light().is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rig_uses_stock_lights() {
        let mut scene = Scene::new();
        let rig = LightingRig::new(&mut scene, &LightSettings::default());

        let hemisphere = scene.query_light_bundle(rig.hemisphere()).unwrap().1.clone();
        assert!((hemisphere.intensity - 0.8).abs() < 1e-6);
        assert_eq!(hemisphere.ground_color(), Some(hex_to_rgb(0x00_0023)));

        let (transform, sun) = scene.query_light_bundle(rig.directional()).unwrap();
        assert_eq!(transform.position, DIRECTIONAL_POSITION);
        assert!(!sun.cast_shadows);
        assert_eq!(scene.lights.len(), 3);
    }

    #[test]
    fn apply_mutates_in_place() {
        let mut scene = Scene::new();
        let rig = LightingRig::new(&mut scene, &LightSettings::default());
        let settings = LightSettings {
            ambient_intensity: 0.9,
            directional_color: 0xFF_0000,
            ..LightSettings::default()
        };
        rig.apply(&mut scene, &settings);

        assert_eq!(scene.lights.len(), 3);
        let ambient = scene.query_light_bundle(rig.ambient()).unwrap().1.intensity;
        assert!((ambient - 0.9).abs() < 1e-6);
        let sun = scene.query_light_bundle(rig.directional()).unwrap().1.color;
        assert_eq!(sun, Vec3::new(1.0, 0.0, 0.0));
    }
}
