//! Pushes display-related [`ViewState`] into the scene
//!
//! Wireframe, skeleton helpers, the grid/axes pair, texture encoding and the
//! environment. Every update is a full walk of the current content, so
//! applying the same state twice is a no-op.

use rustc_hash::FxHashSet;

use crate::assets::environment::{EnvironmentEntry, find_environment};
use crate::resources::MaterialHandle;
use crate::scene::{AxesHelper, GridHelper, NodeHandle, Overlay, OverlayKey, Scene, SkeletonHelper, Vignette};
use crate::viewer::state::{TextureEncoding, ViewState};

#[derive(Debug)]
pub struct DisplayStateSync {
    skeleton_helpers: Vec<OverlayKey>,
    /// Grid and axes, present while the grid flag is on
    grid: Option<(OverlayKey, OverlayKey)>,
    vignette: Vignette,
}

impl DisplayStateSync {
    #[must_use]
    pub fn new(aspect: f32) -> Self {
        Self {
            skeleton_helpers: Vec::new(),
            grid: None,
            vignette: Vignette::new(aspect),
        }
    }

    #[must_use]
    pub fn skeleton_helpers(&self) -> &[OverlayKey] {
        &self.skeleton_helpers
    }

    #[must_use]
    pub fn has_grid(&self) -> bool {
        self.grid.is_some()
    }

    pub fn update_display(&mut self, scene: &mut Scene, content: Option<NodeHandle>, state: &ViewState) {
        self.remove_skeleton_helpers(scene);

        if let Some(root) = content {
            let mut helper_roots = Vec::new();
            for handle in scene.subtree(root) {
                let Some(material) = scene.mesh_of(handle).map(|m| m.material) else {
                    continue;
                };
                let skeleton = scene
                    .get_node(handle)
                    .and_then(|n| n.skin.as_ref())
                    .map(|skin| skin.skeleton);

                if let Some(material) = scene.materials.get_mut(material) {
                    material.set_wireframe(state.wireframe);
                }

                if state.skeleton
                    && let Some(skeleton) = skeleton.and_then(|k| scene.skins.get(k))
                    && let Some(top) = skeleton.root_bone().or_else(|| skeleton.bones.first().copied())
                {
                    let helper_root = scene.get_node(top).and_then(|b| b.parent()).unwrap_or(top);
                    helper_roots.push(helper_root);
                }
            }

            for helper_root in helper_roots {
                let helper = SkeletonHelper::new(scene, helper_root);
                self.skeleton_helpers.push(scene.add_overlay(Overlay::Skeleton(helper)));
            }
        }

        match (state.grid, self.grid) {
            (true, None) => {
                let grid = scene.add_overlay(Overlay::Grid(GridHelper::default()));
                let axes = scene.add_overlay(Overlay::Axes(AxesHelper::default()));
                self.grid = Some((grid, axes));
            }
            (false, Some((grid, axes))) => {
                scene.remove_overlay(grid);
                scene.remove_overlay(axes);
                self.grid = None;
            }
            _ => {}
        }
    }

    /// Sets the colour space of every colour and emissive map in the
    /// content. Returns the number of materials that changed.
    pub fn update_texture_encoding(&mut self, scene: &mut Scene, content: Option<NodeHandle>, encoding: TextureEncoding) -> usize {
        let Some(root) = content else {
            return 0;
        };
        let color_space = encoding.color_space();
        let mut changed = 0;

        for handle in content_materials(scene, root) {
            let Some(material) = scene.materials.get(handle) else {
                continue;
            };
            let maps = [material.map(), material.emissive_map()];

            let mut any = false;
            for texture in maps.into_iter().flatten() {
                if let Some(texture) = scene.textures.get_mut(texture) {
                    any |= texture.set_color_space(color_space);
                }
            }
            if any && let Some(material) = scene.materials.get_mut(handle) {
                material.needs_update();
                changed += 1;
            }
        }
        changed
    }

    /// Applies the selected environment to content materials, the scene
    /// background and the vignette backdrop.
    pub fn update_environment(
        &mut self,
        scene: &mut Scene,
        content: Option<NodeHandle>,
        state: &ViewState,
        catalog: &[EnvironmentEntry],
        default_camera_active: bool,
    ) {
        let entry = find_environment(catalog, &state.environment);
        if entry.is_none() {
            log::warn!("Unknown environment `{}`", state.environment);
        }
        let env_map = entry.and_then(EnvironmentEntry::cube_map);

        if let Some(root) = content {
            for handle in content_materials(scene, root) {
                if let Some(material) = scene.materials.get_mut(handle) {
                    material.set_env_map(env_map.clone());
                }
            }
        }

        let show_backdrop = (env_map.is_none() || !state.background) && default_camera_active;
        scene.backdrop = show_backdrop.then(|| self.vignette.clone());
        scene.background = if state.background { env_map } else { None };
    }

    pub fn set_aspect(&mut self, scene: &mut Scene, aspect: f32) {
        self.vignette.set_aspect(aspect);
        if let Some(backdrop) = &mut scene.backdrop {
            backdrop.set_aspect(aspect);
        }
    }

    /// Drops the helpers that belong to the current content.
    pub fn clear(&mut self, scene: &mut Scene) {
        self.remove_skeleton_helpers(scene);
    }

    fn remove_skeleton_helpers(&mut self, scene: &mut Scene) {
        for key in self.skeleton_helpers.drain(..) {
            scene.remove_overlay(key);
        }
    }
}

/// Distinct materials used by meshes below `root`, in traversal order.
fn content_materials(scene: &Scene, root: NodeHandle) -> Vec<MaterialHandle> {
    let mut seen = FxHashSet::default();
    scene
        .subtree(root)
        .into_iter()
        .filter_map(|h| scene.mesh_of(h).map(|m| m.material))
        .filter(|&m| seen.insert(m))
        .collect()
}
