use glam::{Vec3, Vec4};
use uuid::Uuid;

use crate::resources::TextureHandle;
use crate::resources::texture::CubeMap;
use crate::resources::version_tracker::ChangeTracker;

// ============================================================================
// Material kinds
// ============================================================================

/// Unlit material (`KHR_materials_unlit`).
#[derive(Debug, Clone)]
pub struct MeshBasicMaterial {
    pub color: Vec4,
    pub map: Option<TextureHandle>,
}

impl MeshBasicMaterial {
    #[must_use]
    pub fn new(color: Vec4) -> Self {
        Self { color, map: None }
    }
}

/// glTF metallic-roughness material.
#[derive(Debug, Clone)]
pub struct MeshStandardMaterial {
    pub color: Vec4,
    pub emissive: Vec3,
    pub metalness: f32,
    pub roughness: f32,

    pub map: Option<TextureHandle>,
    pub normal_map: Option<TextureHandle>,
    pub metallic_roughness_map: Option<TextureHandle>,
    pub emissive_map: Option<TextureHandle>,
    pub ao_map: Option<TextureHandle>,
}

impl MeshStandardMaterial {
    #[must_use]
    pub fn new(color: Vec4) -> Self {
        Self {
            color,
            emissive: Vec3::ZERO,
            metalness: 1.0,
            roughness: 1.0,
            map: None,
            normal_map: None,
            metallic_roughness_map: None,
            emissive_map: None,
            ao_map: None,
        }
    }

    fn texture_slots_mut(&mut self) -> [&mut Option<TextureHandle>; 5] {
        [
            &mut self.map,
            &mut self.normal_map,
            &mut self.metallic_roughness_map,
            &mut self.emissive_map,
            &mut self.ao_map,
        ]
    }
}

impl Default for MeshStandardMaterial {
    fn default() -> Self {
        Self::new(Vec4::ONE)
    }
}

#[derive(Debug, Clone)]
pub enum MaterialData {
    Basic(MeshBasicMaterial),
    Standard(MeshStandardMaterial),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask(f32),
    Blend,
}

// ============================================================================
// Material
// ============================================================================

#[derive(Debug, Clone)]
pub struct Material {
    pub uuid: Uuid,
    pub name: Option<String>,
    pub data: MaterialData,

    pub alpha_mode: AlphaMode,
    pub double_sided: bool,

    wireframe: bool,
    env_map: Option<CubeMap>,
    tracker: ChangeTracker,
}

impl Material {
    #[must_use]
    pub fn new(data: MaterialData) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: None,
            data,
            alpha_mode: AlphaMode::Opaque,
            double_sided: false,
            wireframe: false,
            env_map: None,
            tracker: ChangeTracker::new(),
        }
    }

    #[must_use]
    pub fn new_basic(color: Vec4) -> Self {
        Self::new(MaterialData::Basic(MeshBasicMaterial::new(color)))
    }

    #[must_use]
    pub fn new_standard(color: Vec4) -> Self {
        Self::new(MaterialData::Standard(MeshStandardMaterial::new(color)))
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn as_standard(&self) -> Option<&MeshStandardMaterial> {
        match &self.data {
            MaterialData::Standard(m) => Some(m),
            MaterialData::Basic(_) => None,
        }
    }

    pub fn as_standard_mut(&mut self) -> Option<&mut MeshStandardMaterial> {
        match &mut self.data {
            MaterialData::Standard(m) => Some(m),
            MaterialData::Basic(_) => None,
        }
    }

    /// Base colour map.
    #[must_use]
    pub fn map(&self) -> Option<TextureHandle> {
        match &self.data {
            MaterialData::Basic(m) => m.map,
            MaterialData::Standard(m) => m.map,
        }
    }

    #[must_use]
    pub fn emissive_map(&self) -> Option<TextureHandle> {
        match &self.data {
            MaterialData::Basic(_) => None,
            MaterialData::Standard(m) => m.emissive_map,
        }
    }

    /// Every texture slot that is set, in declaration order.
    #[must_use]
    pub fn textures(&self) -> Vec<TextureHandle> {
        match &self.data {
            MaterialData::Basic(m) => m.map.into_iter().collect(),
            MaterialData::Standard(m) => [
                m.map,
                m.normal_map,
                m.metallic_roughness_map,
                m.emissive_map,
                m.ao_map,
            ]
            .into_iter()
            .flatten()
            .collect(),
        }
    }

    /// Rewrites texture handles, used when a material moves between scenes.
    /// Slots whose handle has no mapping are cleared.
    pub fn remap_textures(&mut self, mut remap: impl FnMut(TextureHandle) -> Option<TextureHandle>) {
        match &mut self.data {
            MaterialData::Basic(m) => m.map = m.map.and_then(&mut remap),
            MaterialData::Standard(m) => {
                for slot in m.texture_slots_mut() {
                    *slot = slot.and_then(&mut remap);
                }
            }
        }
    }

    // ========================================================================
    // Display state
    // ========================================================================

    #[must_use]
    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    /// Returns `true` when the flag actually changed.
    pub fn set_wireframe(&mut self, wireframe: bool) -> bool {
        if self.wireframe == wireframe {
            return false;
        }
        self.wireframe = wireframe;
        self.tracker.changed();
        true
    }

    #[must_use]
    pub fn env_map(&self) -> Option<&CubeMap> {
        self.env_map.as_ref()
    }

    /// Returns `true` when the environment actually changed.
    pub fn set_env_map(&mut self, env_map: Option<CubeMap>) -> bool {
        if self.env_map == env_map {
            return false;
        }
        self.env_map = env_map;
        self.tracker.changed();
        true
    }

    /// Flags the material for a GPU-state refresh.
    pub fn needs_update(&mut self) {
        self.tracker.changed();
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.tracker.version()
    }
}

impl From<MeshStandardMaterial> for Material {
    fn from(data: MeshStandardMaterial) -> Self {
        Material::new(MaterialData::Standard(data))
    }
}

impl From<MeshBasicMaterial> for Material {
    fn from(data: MeshBasicMaterial) -> Self {
        Material::new(MaterialData::Basic(data))
    }
}
