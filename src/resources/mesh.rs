use std::sync::Arc;

use crate::resources::MaterialHandle;
use crate::resources::geometry::Geometry;

/// Maximum number of morph target influences applied per mesh
pub const MAX_MORPH_TARGETS: usize = 8;

#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,

    // === Resource references ===
    pub geometry: Arc<Geometry>,
    pub material: MaterialHandle,

    // === Instance settings ===
    pub visible: bool,
    pub render_order: i32,

    /// One weight per morph target of the geometry
    pub morph_target_influences: Vec<f32>,
}

impl Mesh {
    #[must_use]
    pub fn new(geometry: Arc<Geometry>, material: MaterialHandle) -> Self {
        let morph_count = geometry.morph_target_count;
        Self {
            name: "Mesh".to_string(),
            geometry,
            material,
            visible: true,
            render_order: 0,
            morph_target_influences: vec![0.0; morph_count],
        }
    }

    #[must_use]
    pub fn has_morph_targets(&self) -> bool {
        !self.morph_target_influences.is_empty()
    }

    /// Copies the given weights into the influence slots; extra weights are ignored.
    pub fn set_morph_target_influences(&mut self, weights: &[f32]) {
        for (slot, &weight) in self.morph_target_influences.iter_mut().zip(weights) {
            *slot = weight;
        }
    }

    /// Influences the renderer actually evaluates, capped at [`MAX_MORPH_TARGETS`].
    #[must_use]
    pub fn active_influences(&self) -> &[f32] {
        let len = self.morph_target_influences.len().min(MAX_MORPH_TARGETS);
        &self.morph_target_influences[..len]
    }
}
