use std::fmt::Write as _;
use std::sync::atomic::{AtomicU32, Ordering};

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;

use crate::resources::{BoundingBox, CubeMap, Material, MaterialHandle, Mesh, Texture, TextureHandle};
use crate::scene::background::Vignette;
use crate::scene::camera::{Camera, ProjectionType};
use crate::scene::helpers::Overlay;
use crate::scene::light::Light;
use crate::scene::node::{Node, NodeKind};
use crate::scene::skeleton::Skeleton;
use crate::scene::transform::Transform;
use crate::scene::transform_system;
use crate::scene::{CameraKey, LightKey, MeshKey, NodeHandle, OverlayKey, SkeletonKey};

static NEXT_SCENE_ID: AtomicU32 = AtomicU32::new(1);

/// Scene graph
///
/// Pure data: the node hierarchy plus the component and resource pools the
/// nodes point into. A loader builds a detached `Scene` off-thread; the live
/// scene takes it over in one call with [`Scene::adopt`].
pub struct Scene {
    pub id: u32,

    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    // ==== Components ====
    pub meshes: SlotMap<MeshKey, Mesh>,
    pub cameras: SlotMap<CameraKey, Camera>,
    pub lights: SlotMap<LightKey, Light>,
    pub skins: SlotMap<SkeletonKey, Skeleton>,

    // ==== Resources ====
    pub materials: SlotMap<MaterialHandle, Material>,
    pub textures: SlotMap<TextureHandle, Texture>,

    // ==== Non-content ====
    pub overlays: SlotMap<OverlayKey, Overlay>,
    /// Cube map shown behind everything
    pub background: Option<CubeMap>,
    /// Gradient backdrop, `Some` while it is part of the scene
    pub backdrop: Option<Vignette>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.id)
            .field("nodes", &self.nodes.len())
            .field("meshes", &self.meshes.len())
            .field("cameras", &self.cameras.len())
            .field("lights", &self.lights.len())
            .field("materials", &self.materials.len())
            .field("overlays", &self.overlays.len())
            .finish_non_exhaustive()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed),

            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),

            meshes: SlotMap::with_key(),
            cameras: SlotMap::with_key(),
            lights: SlotMap::with_key(),
            skins: SlotMap::with_key(),

            materials: SlotMap::with_key(),
            textures: SlotMap::with_key(),

            overlays: SlotMap::with_key(),
            background: None,
            backdrop: None,
        }
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Adds a node at the root level.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    pub fn add_to_parent(&mut self, mut child: Node, parent: NodeHandle) -> NodeHandle {
        if !self.nodes.contains_key(parent) {
            log::warn!("Parent node not found, adding `{}` at root level", child.name);
            return self.add_node(child);
        }
        child.parent = Some(parent);
        let handle = self.nodes.insert(child);
        self.nodes[parent].children.push(handle);
        handle
    }

    /// Re-parents `child` under `parent`, keeping both sides in sync.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent {
            log::warn!("Cannot attach node to itself!");
            return;
        }
        if !self.nodes.contains_key(parent) {
            log::error!("Parent node not found during attach!");
            return;
        }
        self.detach(child);

        self.nodes[parent].children.push(child);
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
            c.transform.mark_dirty();
        }
    }

    /// Unlinks `node` from its parent (or the root list) without deleting it.
    pub fn detach(&mut self, node: NodeHandle) {
        let old_parent = self.nodes.get(node).and_then(|n| n.parent);
        if let Some(p) = old_parent {
            if let Some(parent) = self.nodes.get_mut(p)
                && let Some(i) = parent.children.iter().position(|&x| x == node)
            {
                parent.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&x| x == node) {
            self.root_nodes.remove(i);
        }
        if let Some(n) = self.nodes.get_mut(node) {
            n.parent = None;
            n.transform.mark_dirty();
        }
    }

    /// Removes a node and its whole subtree, together with the components
    /// they own. Materials, textures and skeletons nobody references any more
    /// are released as well.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        if !self.nodes.contains_key(handle) {
            return;
        }
        self.detach(handle);

        for h in self.subtree(handle) {
            let Some(node) = self.nodes.remove(h) else {
                continue;
            };
            match node.kind {
                NodeKind::Group => {}
                NodeKind::Mesh(key) => {
                    self.meshes.remove(key);
                }
                NodeKind::Camera(key) => {
                    self.cameras.remove(key);
                }
                NodeKind::Light(key) => {
                    self.lights.remove(key);
                }
            }
        }

        self.release_unused_resources();
    }

    /// Drops materials, textures and skeletons with no remaining user.
    pub fn release_unused_resources(&mut self) {
        let used_materials: FxHashSet<MaterialHandle> =
            self.meshes.values().map(|m| m.material).collect();
        self.materials.retain(|handle, _| used_materials.contains(&handle));

        let used_textures: FxHashSet<TextureHandle> = self
            .materials
            .values()
            .flat_map(Material::textures)
            .collect();
        self.textures.retain(|handle, _| used_textures.contains(&handle));

        let used_skins: FxHashSet<SkeletonKey> = self
            .nodes
            .values()
            .filter_map(|n| n.skin.as_ref().map(|s| s.skeleton))
            .collect();
        self.skins.retain(|key, _| used_skins.contains(&key));
    }

    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    /// Pre-order handles of `root` and all its descendants.
    #[must_use]
    pub fn subtree(&self, root: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            out.push(handle);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    // ========================================================================
    // Component helpers
    // ========================================================================

    pub fn add_mesh(&mut self, name: &str, mesh: Mesh, parent: Option<NodeHandle>) -> NodeHandle {
        let key = self.meshes.insert(mesh);
        self.insert_component_node(name, NodeKind::Mesh(key), parent)
    }

    pub fn add_camera(&mut self, name: &str, camera: Camera, parent: Option<NodeHandle>) -> NodeHandle {
        let key = self.cameras.insert(camera);
        self.insert_component_node(name, NodeKind::Camera(key), parent)
    }

    pub fn add_light(&mut self, name: &str, light: Light, parent: Option<NodeHandle>) -> NodeHandle {
        let key = self.lights.insert(light);
        self.insert_component_node(name, NodeKind::Light(key), parent)
    }

    fn insert_component_node(&mut self, name: &str, kind: NodeKind, parent: Option<NodeHandle>) -> NodeHandle {
        let node = Node::new(name).with_kind(kind);
        match parent {
            Some(p) => self.add_to_parent(node, p),
            None => self.add_node(node),
        }
    }

    pub fn add_material(&mut self, material: Material) -> MaterialHandle {
        self.materials.insert(material)
    }

    pub fn add_texture(&mut self, texture: Texture) -> TextureHandle {
        self.textures.insert(texture)
    }

    pub fn add_skeleton(&mut self, skeleton: Skeleton) -> SkeletonKey {
        self.skins.insert(skeleton)
    }

    pub fn add_overlay(&mut self, overlay: Overlay) -> OverlayKey {
        self.overlays.insert(overlay)
    }

    pub fn remove_overlay(&mut self, key: OverlayKey) -> Option<Overlay> {
        self.overlays.remove(key)
    }

    #[must_use]
    pub fn mesh_of(&self, handle: NodeHandle) -> Option<&Mesh> {
        self.meshes.get(self.nodes.get(handle)?.mesh()?)
    }

    pub fn query_camera_bundle(&mut self, handle: NodeHandle) -> Option<(&mut Transform, &mut Camera)> {
        let camera_key = self.nodes.get(handle)?.camera()?;
        let camera = self.cameras.get_mut(camera_key)?;
        let transform = &mut self.nodes.get_mut(handle)?.transform;
        Some((transform, camera))
    }

    pub fn query_light_bundle(&mut self, handle: NodeHandle) -> Option<(&mut Transform, &mut Light)> {
        let light_key = self.nodes.get(handle)?.light()?;
        let light = self.lights.get_mut(light_key)?;
        let transform = &mut self.nodes.get_mut(handle)?.transform;
        Some((transform, light))
    }

    // ========================================================================
    // Matrix update pipeline
    // ========================================================================

    /// Updates world matrices of the whole scene. Must run before rendering.
    pub fn update_matrix_world(&mut self) {
        transform_system::update_hierarchy_iterative(&mut self.nodes, &mut self.cameras, &self.root_nodes);
    }

    pub fn update_subtree(&mut self, root: NodeHandle) {
        transform_system::update_subtree(&mut self.nodes, &mut self.cameras, root);
    }

    /// Recomputes joint matrices of every skinned mesh.
    pub fn update_skeletons(&mut self) {
        let mut tasks = Vec::new();

        for node in self.nodes.values() {
            if let Some(binding) = &node.skin {
                tasks.push((binding.skeleton, node.transform.world_matrix.inverse()));
            }
        }

        let nodes = &self.nodes;
        for (skeleton_id, root_inv) in tasks {
            if let Some(skeleton) = self.skins.get_mut(skeleton_id) {
                skeleton.compute_joint_matrices(nodes, root_inv);
            }
        }
    }

    /// World-space bounds of every mesh below `root`, using the world
    /// matrices of the last update. `None` when the subtree has no geometry.
    #[must_use]
    pub fn world_bounds(&self, root: NodeHandle) -> Option<BoundingBox> {
        let mut combined: Option<BoundingBox> = None;
        for handle in self.subtree(root) {
            let node = &self.nodes[handle];
            let Some(mesh) = node.mesh().and_then(|k| self.meshes.get(k)) else {
                continue;
            };
            let Some(local) = mesh.geometry.bounding_box() else {
                continue;
            };
            let world = local.transform(&node.transform.world_matrix);
            combined = Some(match combined {
                Some(existing) => existing.union(&world),
                None => world,
            });
        }
        combined
    }

    // ========================================================================
    // Fragment adoption
    // ========================================================================

    /// Moves everything from a detached `fragment` into this scene.
    ///
    /// All handles are remapped. `root` becomes a root node of this scene; any
    /// other roots of the fragment are attached below it so the content stays
    /// one subtree. Returns the new handle of `root`, or `None` (and adopts
    /// nothing) when `root` does not belong to the fragment.
    pub fn adopt(&mut self, mut fragment: Scene, root: NodeHandle) -> Option<NodeHandle> {
        if !fragment.nodes.contains_key(root) {
            return None;
        }

        let texture_map: FxHashMap<TextureHandle, TextureHandle> = fragment
            .textures
            .drain()
            .map(|(old, texture)| (old, self.textures.insert(texture)))
            .collect();

        let material_map: FxHashMap<MaterialHandle, MaterialHandle> = fragment
            .materials
            .drain()
            .map(|(old, mut material)| {
                material.remap_textures(|h| texture_map.get(&h).copied());
                (old, self.materials.insert(material))
            })
            .collect();

        let mut fallback_material = None;
        let mesh_map: FxHashMap<MeshKey, MeshKey> = fragment
            .meshes
            .drain()
            .map(|(old, mut mesh)| {
                mesh.material = match material_map.get(&mesh.material) {
                    Some(&handle) => handle,
                    None => *fallback_material
                        .get_or_insert_with(|| self.materials.insert(Material::new_standard(glam::Vec4::ONE))),
                };
                (old, self.meshes.insert(mesh))
            })
            .collect();

        let camera_map: FxHashMap<CameraKey, CameraKey> = fragment
            .cameras
            .drain()
            .map(|(old, camera)| (old, self.cameras.insert(camera)))
            .collect();

        let light_map: FxHashMap<LightKey, LightKey> = fragment
            .lights
            .drain()
            .map(|(old, light)| (old, self.lights.insert(light)))
            .collect();

        let skin_entries: Vec<(SkeletonKey, Skeleton)> = fragment.skins.drain().collect();

        // Nodes first get new handles, links are rewritten in a second pass
        let node_map: FxHashMap<NodeHandle, NodeHandle> = fragment
            .nodes
            .drain()
            .map(|(old, node)| (old, self.nodes.insert(node)))
            .collect();

        let skin_map: FxHashMap<SkeletonKey, SkeletonKey> = skin_entries
            .into_iter()
            .map(|(old, mut skeleton)| {
                skeleton.bones = skeleton
                    .bones
                    .iter()
                    .filter_map(|b| node_map.get(b).copied())
                    .collect();
                (old, self.skins.insert(skeleton))
            })
            .collect();

        for &new in node_map.values() {
            let node = &mut self.nodes[new];
            node.parent = node.parent.and_then(|p| node_map.get(&p).copied());
            node.children = node
                .children
                .iter()
                .filter_map(|c| node_map.get(c).copied())
                .collect();
            node.kind = match node.kind {
                NodeKind::Group => NodeKind::Group,
                NodeKind::Mesh(k) => mesh_map.get(&k).map_or(NodeKind::Group, |&k| NodeKind::Mesh(k)),
                NodeKind::Camera(k) => camera_map.get(&k).map_or(NodeKind::Group, |&k| NodeKind::Camera(k)),
                NodeKind::Light(k) => light_map.get(&k).map_or(NodeKind::Group, |&k| NodeKind::Light(k)),
            };
            if let Some(skin) = &mut node.skin {
                match skin_map.get(&skin.skeleton) {
                    Some(&key) => skin.skeleton = key,
                    None => node.skin = None,
                }
            }
            node.transform.mark_dirty();
        }

        let new_root = node_map[&root];
        self.nodes[new_root].parent = None;
        self.root_nodes.push(new_root);

        for old_root in fragment.root_nodes {
            if old_root == root {
                continue;
            }
            if let Some(&extra) = node_map.get(&old_root) {
                log::debug!("Attaching extra fragment root `{}` below content root", self.nodes[extra].name);
                self.nodes[extra].parent = Some(new_root);
                self.nodes[new_root].children.push(extra);
            }
        }

        Some(new_root)
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Indented ` <Type> name` outline of the subtree below `root`.
    #[must_use]
    pub fn describe_subtree(&self, root: NodeHandle) -> String {
        let mut out = String::new();
        let mut stack = vec![(root, 0usize)];
        while let Some((handle, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            let _ = writeln!(out, "{:indent$} <{}> {}", "", self.type_label(node), node.name, indent = depth * 2);
            for &child in node.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out
    }

    fn type_label(&self, node: &Node) -> &'static str {
        match node.kind {
            NodeKind::Group if node.is_bone => "Bone",
            NodeKind::Group => "Group",
            NodeKind::Mesh(_) if node.skin.is_some() => "SkinnedMesh",
            NodeKind::Mesh(_) => "Mesh",
            NodeKind::Camera(key) => match self.cameras.get(key).map(|c| c.projection_type) {
                Some(ProjectionType::Orthographic) => "OrthographicCamera",
                _ => "PerspectiveCamera",
            },
            NodeKind::Light(key) => self.lights.get(key).map_or("Light", |l| l.kind.type_name()),
        }
    }
}
