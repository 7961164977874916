use std::sync::Arc;

use glam::{Affine3A, Mat4, Quat, Vec2, Vec3, Vec4};
use gltf::animation::util::ReadOutputs;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::animation::clip::{AnimationClip, TargetPath, Track, TrackData, TrackMeta, TrackTarget};
use crate::animation::tracks::{InterpolationMode, KeyframeTrack};
use crate::animation::values::MorphWeightData;
use crate::assets::blob::Blob;
use crate::assets::io::ResourceFetcher;
use crate::assets::resolver::{VirtualUrlResolver, resolve_relative};
use crate::errors::{Result, ViewerError};
use crate::resources::{
    AlphaMode, ColorSpace, Geometry, Image, Material, MaterialData, MaterialHandle, Mesh,
    MeshBasicMaterial, MeshStandardMaterial, Texture, TextureHandle,
};
use crate::scene::{
    Camera, Light, Node, NodeHandle, NodeKind, Scene, SkeletonKey, Skeleton, SkinBinding,
};

/// Extensions the loader understands beyond the core format.
const SUPPORTED_EXTENSIONS: [&str; 2] = ["KHR_lights_punctual", "KHR_materials_unlit"];

// ============================================================================
// 1. Intermediate data
// ============================================================================

/// Texture cache key
/// The same glTF texture requested with the same colour space reuses one handle
#[derive(Hash, PartialEq, Eq, Clone, Copy)]
struct TextureCacheKey {
    gltf_texture_index: usize,
    is_srgb: bool,
}

/// Decoded image of one glTF `images[]` entry; `None` when it failed.
struct IntermediateImage {
    image: Option<Arc<Image>>,
    source_uri: Option<String>,
}

/// Everything a glTF load produces, still detached from the live scene.
pub struct GltfContent {
    pub scene: Scene,
    pub root: NodeHandle,
    pub clips: Vec<AnimationClip>,
}

// ============================================================================
// 2. Fetch phase (async)
// ============================================================================

/// glTF / GLB loader
///
/// [`load`](Self::load) fetches the entry file and every buffer and image it
/// references through the resolver, then builds the scene synchronously.
pub struct GltfLoader<'a> {
    scene: Scene,
    buffers: &'a [Blob],
    images: Vec<IntermediateImage>,

    // Created engine textures (deduplicated)
    created_textures: FxHashMap<TextureCacheKey, TextureHandle>,
    material_map: Vec<MaterialHandle>,
    // glTF node index -> engine NodeHandle
    node_mapping: Vec<NodeHandle>,
    default_material: Option<MaterialHandle>,
}

impl GltfLoader<'_> {
    /// Loads the asset at `url`.
    ///
    /// Buffers that cannot be fetched fail the load; images that cannot be
    /// fetched or decoded only leave their textures empty.
    pub async fn load(url: &str, resolver: &mut VirtualUrlResolver, fetcher: &ResourceFetcher) -> Result<GltfContent> {
        let entry_url = resolver.resolve(url, None);
        let bytes = fetcher.fetch(&entry_url).await?;
        let gltf = gltf::Gltf::from_slice_without_validation(&bytes)?;
        drop(bytes);

        Self::check_extensions(&gltf);

        let base_url = resolver.base_url().to_string();
        let buffers = Self::load_buffers(&gltf, &base_url, resolver, fetcher).await?;
        let images = Self::load_images(&gltf, &buffers, &base_url, resolver, fetcher).await;

        let loader = GltfLoader {
            scene: Scene::new(),
            buffers: &buffers,
            images,
            created_textures: FxHashMap::default(),
            material_map: Vec::new(),
            node_mapping: Vec::with_capacity(gltf.nodes().count()),
            default_material: None,
        };
        loader.build(&gltf)
    }

    fn check_extensions(gltf: &gltf::Gltf) {
        let required: Vec<_> = gltf
            .extensions_required()
            .filter(|ext| !SUPPORTED_EXTENSIONS.contains(ext))
            .collect();
        if !required.is_empty() {
            log::warn!("glTF file requires unsupported extensions: {required:?}");
        }

        let used: Vec<_> = gltf
            .extensions_used()
            .filter(|ext| !SUPPORTED_EXTENSIONS.contains(ext) && !required.contains(ext))
            .collect();
        if !used.is_empty() {
            log::info!("glTF file uses extensions {used:?} that are ignored, the display may differ");
        }
    }

    async fn fetch_uri(uri: &str, base_url: &str, resolver: &mut VirtualUrlResolver, fetcher: &ResourceFetcher) -> Result<Blob> {
        if uri.starts_with("data:") {
            return fetcher.fetch(uri).await;
        }
        let url = resolver.resolve(&resolve_relative(base_url, uri), None);
        fetcher.fetch(&url).await
    }

    async fn load_buffers(
        gltf: &gltf::Gltf,
        base_url: &str,
        resolver: &mut VirtualUrlResolver,
        fetcher: &ResourceFetcher,
    ) -> Result<Vec<Blob>> {
        let mut buffer_data = Vec::with_capacity(gltf.buffers().count());
        for buffer in gltf.buffers() {
            let data = match buffer.source() {
                gltf::buffer::Source::Bin => {
                    let blob = gltf
                        .blob
                        .as_deref()
                        .ok_or_else(|| ViewerError::Load("Missing GLB binary chunk".to_string()))?;
                    Blob::from(blob)
                }
                gltf::buffer::Source::Uri(uri) => Self::fetch_uri(uri, base_url, resolver, fetcher).await?,
            };
            if data.len() < buffer.length() {
                return Err(ViewerError::Load(format!(
                    "Buffer {} holds {} bytes, {} expected",
                    buffer.index(),
                    data.len(),
                    buffer.length()
                )));
            }
            buffer_data.push(data);
        }
        Ok(buffer_data)
    }

    async fn load_images(
        gltf: &gltf::Gltf,
        buffers: &[Blob],
        base_url: &str,
        resolver: &mut VirtualUrlResolver,
        fetcher: &ResourceFetcher,
    ) -> Vec<IntermediateImage> {
        let mut images = Vec::with_capacity(gltf.images().count());
        for img in gltf.images() {
            let (decoded, source_uri) = match img.source() {
                gltf::image::Source::Uri { uri, mime_type } => {
                    let decoded = match Self::fetch_uri(uri, base_url, resolver, fetcher).await {
                        Ok(bytes) => Image::decode(&bytes, mime_type),
                        Err(err) => Err(err),
                    };
                    let source = (!uri.starts_with("data:")).then(|| uri.to_string());
                    (decoded, source)
                }
                gltf::image::Source::View { view, mime_type } => {
                    let start = view.offset();
                    let end = start + view.length();
                    let decoded = match buffers.get(view.buffer().index()).and_then(|b| b.get(start..end)) {
                        Some(bytes) => Image::decode(bytes, Some(mime_type)),
                        None => Err(ViewerError::AssetIndexOutOfBounds {
                            context: "image buffer view".to_string(),
                            index: view.index(),
                        }),
                    };
                    (decoded, None)
                }
            };

            let image = match decoded {
                Ok(image) => Some(Arc::new(image)),
                Err(err) => {
                    log::warn!("Couldn't load image {}: {err}", img.index());
                    None
                }
            };
            images.push(IntermediateImage { image, source_uri });
        }
        images
    }
}

// ============================================================================
// 3. Build phase (sync)
// ============================================================================

impl GltfLoader<'_> {
    fn build(mut self, gltf: &gltf::Gltf) -> Result<GltfContent> {
        let gltf_scene = gltf
            .default_scene()
            .or_else(|| gltf.scenes().next())
            .ok_or_else(|| ViewerError::Load("glTF file contains no scene".to_string()))?;

        self.load_materials(gltf);

        // Step 1: nodes and transforms
        for node in gltf.nodes() {
            let handle = self.create_node_shallow(&node);
            self.node_mapping.push(handle);
        }

        // Step 2: hierarchy
        let root = self.scene.add_node(Node::new(gltf_scene.name().unwrap_or("")));
        for node in gltf.nodes() {
            let parent = self.node_mapping[node.index()];
            for child in node.children() {
                let child_handle = self.node_mapping[child.index()];
                self.scene.attach(child_handle, parent);
            }
        }
        for node in gltf_scene.nodes() {
            self.scene.attach(self.node_mapping[node.index()], root);
        }

        // Step 3: skins, now that every joint exists
        let skeleton_keys = self.load_skins(gltf);

        // Step 4: components
        for node in gltf.nodes() {
            self.bind_node_components(&node, &skeleton_keys);
        }

        let clips = self.load_animations(gltf);

        // Nodes of other scenes are not part of the content
        let stray: Vec<_> = self.scene.root_nodes.iter().copied().filter(|&h| h != root).collect();
        if !stray.is_empty() {
            log::debug!("Dropping {} node tree(s) outside the selected scene", stray.len());
        }
        for handle in stray {
            self.scene.remove_node(handle);
        }
        self.scene.release_unused_resources();

        Ok(GltfContent {
            scene: self.scene,
            root,
            clips,
        })
    }

    // --- Helpers ---

    fn buffer_data(&self, buffer: &gltf::Buffer) -> Option<&[u8]> {
        self.buffers.get(buffer.index()).map(|b| &b[..])
    }

    fn get_default_material(&mut self) -> MaterialHandle {
        if let Some(mat) = self.default_material {
            mat
        } else {
            let mat = self.scene.add_material(Material::new_standard(Vec4::ONE));
            self.default_material = Some(mat);
            mat
        }
    }

    /// Returns the texture for `gltf_texture_index`, creating it on first use.
    /// - `is_srgb`: colour data (base colour, emissive) vs. linear data
    fn get_or_create_texture(&mut self, texture: &gltf::Texture, is_srgb: bool) -> Option<TextureHandle> {
        let key = TextureCacheKey {
            gltf_texture_index: texture.index(),
            is_srgb,
        };
        if let Some(&handle) = self.created_textures.get(&key) {
            return Some(handle);
        }

        let Some(raw) = self.images.get(texture.source().index()) else {
            log::warn!("Texture {} points at a missing image", texture.index());
            return None;
        };

        let mut engine_tex = Texture::new(texture.name().map(str::to_string), raw.image.clone());
        engine_tex.source_uri.clone_from(&raw.source_uri);
        engine_tex.set_color_space(if is_srgb { ColorSpace::Srgb } else { ColorSpace::Linear });

        let handle = self.scene.add_texture(engine_tex);
        self.created_textures.insert(key, handle);
        Some(handle)
    }

    // --- Loading logic ---

    fn load_materials(&mut self, gltf: &gltf::Gltf) {
        for material in gltf.materials() {
            let pbr = material.pbr_metallic_roughness();
            let color = Vec4::from_array(pbr.base_color_factor());
            let map = pbr
                .base_color_texture()
                .and_then(|info| self.get_or_create_texture(&info.texture(), true));

            let data = if material.unlit() {
                MaterialData::Basic(MeshBasicMaterial { color, map })
            } else {
                let mut mat = MeshStandardMaterial::new(color);
                mat.map = map;
                mat.metalness = pbr.metallic_factor();
                mat.roughness = pbr.roughness_factor();
                mat.emissive = Vec3::from_array(material.emissive_factor());
                mat.metallic_roughness_map = pbr
                    .metallic_roughness_texture()
                    .and_then(|info| self.get_or_create_texture(&info.texture(), false));
                mat.normal_map = material
                    .normal_texture()
                    .and_then(|info| self.get_or_create_texture(&info.texture(), false));
                mat.ao_map = material
                    .occlusion_texture()
                    .and_then(|info| self.get_or_create_texture(&info.texture(), false));
                mat.emissive_map = material
                    .emissive_texture()
                    .and_then(|info| self.get_or_create_texture(&info.texture(), true));
                MaterialData::Standard(mat)
            };

            let mut engine_mat = Material::new(data);
            engine_mat.name = material.name().map(str::to_string);
            engine_mat.double_sided = material.double_sided();
            engine_mat.alpha_mode = match material.alpha_mode() {
                gltf::material::AlphaMode::Opaque => AlphaMode::Opaque,
                gltf::material::AlphaMode::Mask => AlphaMode::Mask(material.alpha_cutoff().unwrap_or(0.5)),
                gltf::material::AlphaMode::Blend => AlphaMode::Blend,
            };

            let handle = self.scene.add_material(engine_mat);
            self.material_map.push(handle);
        }
    }

    /// Creates the node with its name and transform only.
    fn create_node_shallow(&mut self, node: &gltf::Node) -> NodeHandle {
        let mut engine_node = Node::new(node.name().unwrap_or(""));
        let (t, r, s) = node.transform().decomposed();
        engine_node.transform.position = Vec3::from_array(t);
        engine_node.transform.rotation = Quat::from_array(r);
        engine_node.transform.scale = Vec3::from_array(s);
        self.scene.add_node(engine_node)
    }

    fn load_skins(&mut self, gltf: &gltf::Gltf) -> Vec<SkeletonKey> {
        let mut skeleton_keys = Vec::with_capacity(gltf.skins().count());

        for skin in gltf.skins() {
            let joints: Vec<_> = skin.joints().collect();

            // 1. Inverse bind matrices
            let reader = skin.reader(|buffer| self.buffer_data(&buffer));
            let mut ibms: Vec<Affine3A> = match reader.read_inverse_bind_matrices() {
                Some(iter) => iter
                    .map(|m| Affine3A::from_mat4(Mat4::from_cols_array_2d(&m)))
                    .collect(),
                None => Vec::new(),
            };
            ibms.resize(joints.len(), Affine3A::IDENTITY);

            // 2. glTF joints -> engine nodes
            let bones: Vec<NodeHandle> = joints.iter().map(|n| self.node_mapping[n.index()]).collect();
            for &bone in &bones {
                if let Some(node) = self.scene.get_node_mut(bone) {
                    node.is_bone = true;
                }
            }

            // 3. Root bone: the declared skeleton root, else the first joint
            //    that is not a child of another joint
            let joint_indices: FxHashSet<usize> = joints.iter().map(gltf::Node::index).collect();
            let child_joints: FxHashSet<usize> = joints
                .iter()
                .flat_map(gltf::Node::children)
                .map(|c| c.index())
                .filter(|i| joint_indices.contains(i))
                .collect();
            let root_bone_index = skin
                .skeleton()
                .and_then(|root| joints.iter().position(|n| n.index() == root.index()))
                .or_else(|| joints.iter().position(|n| !child_joints.contains(&n.index())))
                .unwrap_or(0);

            let skeleton = Skeleton::new(skin.name().unwrap_or("Skeleton"), bones, ibms, root_bone_index);
            skeleton_keys.push(self.scene.add_skeleton(skeleton));
        }

        skeleton_keys
    }

    fn build_engine_mesh(&mut self, mesh: &gltf::Mesh, primitive: &gltf::Primitive, name: &str) -> Mesh {
        let geometry = self.load_primitive_geometry(primitive);
        let material = match primitive.material().index() {
            Some(idx) => self.material_map[idx],
            None => self.get_default_material(),
        };

        let mut engine_mesh = Mesh::new(Arc::new(geometry), material);
        engine_mesh.name = name.to_string();
        if let Some(weights) = mesh.weights() {
            engine_mesh.set_morph_target_influences(weights);
        }
        engine_mesh
    }

    fn bind_node_components(&mut self, node: &gltf::Node, skeleton_keys: &[SkeletonKey]) {
        let handle = self.node_mapping[node.index()];
        let node_name = node.name().unwrap_or("").to_string();
        let skin_binding = node
            .skin()
            .and_then(|skin| skeleton_keys.get(skin.index()))
            .map(|&skeleton| SkinBinding { skeleton });

        // 1. Mesh
        if let Some(mesh) = node.mesh() {
            let mesh_name = mesh.name().map_or_else(|| node_name.clone(), str::to_string);
            let primitives: Vec<_> = mesh.primitives().collect();
            match primitives.as_slice() {
                [] => {}
                // A single primitive lives on the node itself
                [primitive] => {
                    let engine_mesh = self.build_engine_mesh(&mesh, primitive, &mesh_name);
                    let key = self.scene.meshes.insert(engine_mesh);
                    if let Some(n) = self.scene.get_node_mut(handle) {
                        n.kind = NodeKind::Mesh(key);
                        n.skin.clone_from(&skin_binding);
                    }
                }
                // Several primitives become child meshes of a group
                _ => {
                    for primitive in &primitives {
                        let engine_mesh = self.build_engine_mesh(&mesh, primitive, &mesh_name);
                        let child = self.scene.add_mesh(&mesh_name, engine_mesh, Some(handle));
                        if let Some(n) = self.scene.get_node_mut(child) {
                            n.skin.clone_from(&skin_binding);
                        }
                    }
                }
            }
        }

        // 2. Camera
        if let Some(camera) = node.camera() {
            let engine_camera = match camera.projection() {
                gltf::camera::Projection::Perspective(p) => Camera::new_perspective(
                    p.yfov().to_degrees(),
                    p.aspect_ratio().unwrap_or(1.0),
                    p.znear(),
                    p.zfar().unwrap_or(2e6),
                ),
                gltf::camera::Projection::Orthographic(o) => {
                    let aspect = if o.ymag() > 0.0 { o.xmag() / o.ymag() } else { 1.0 };
                    Camera::new_orthographic(o.ymag(), aspect, o.znear(), o.zfar())
                }
            };
            let key = self.scene.cameras.insert(engine_camera);
            self.set_or_attach(handle, &node_name, NodeKind::Camera(key));
        }

        // 3. KHR_lights_punctual
        if let Some(light) = node.light() {
            let color = Vec3::from_array(light.color());
            let range = light.range().unwrap_or(0.0);
            let engine_light = match light.kind() {
                gltf::khr_lights_punctual::Kind::Directional => Light::new_directional(color, light.intensity()),
                gltf::khr_lights_punctual::Kind::Point => Light::new_point(color, light.intensity(), range),
                gltf::khr_lights_punctual::Kind::Spot {
                    inner_cone_angle,
                    outer_cone_angle,
                } => Light::new_spot(color, light.intensity(), range, inner_cone_angle, outer_cone_angle),
            };
            let key = self.scene.lights.insert(engine_light);
            self.set_or_attach(handle, &node_name, NodeKind::Light(key));
        }
    }

    /// Puts the component on the node when it has none yet, otherwise on a
    /// new child node carrying the same name.
    fn set_or_attach(&mut self, handle: NodeHandle, name: &str, kind: NodeKind) {
        if let Some(node) = self.scene.get_node_mut(handle)
            && matches!(node.kind, NodeKind::Group)
        {
            node.kind = kind;
            return;
        }
        self.scene.add_to_parent(Node::new(name).with_kind(kind), handle);
    }

    fn load_primitive_geometry(&self, primitive: &gltf::Primitive) -> Geometry {
        let reader = primitive.reader(|buffer| self.buffer_data(&buffer));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .map(|iter| iter.map(Vec3::from_array).collect())
            .unwrap_or_default();
        let mut geometry = Geometry::new(positions);

        if let Some(iter) = reader.read_normals() {
            geometry = geometry.with_normals(iter.map(Vec3::from_array).collect());
        }
        if let Some(iter) = reader.read_tex_coords(0) {
            geometry = geometry.with_uvs(iter.into_f32().map(Vec2::from_array).collect());
        }
        if let Some(iter) = reader.read_indices() {
            geometry = geometry.with_indices(iter.into_u32().collect());
        }

        let morph_count = primitive.morph_targets().count();
        if morph_count > 0 {
            geometry = geometry.with_morph_targets(morph_count);
        }
        geometry
    }

    fn track_target(&self, gltf_node: &gltf::Node) -> TrackTarget {
        match gltf_node.name() {
            Some(name) if !name.is_empty() => TrackTarget::Name(name.to_string()),
            _ => {
                let handle = self.node_mapping[gltf_node.index()];
                TrackTarget::Uuid(self.scene.nodes[handle].uuid)
            }
        }
    }

    fn load_animations(&self, gltf: &gltf::Gltf) -> Vec<AnimationClip> {
        let mut animations = Vec::with_capacity(gltf.animations().count());

        for (anim_index, anim) in gltf.animations().enumerate() {
            let mut tracks = Vec::new();

            for channel in anim.channels() {
                let reader = channel.reader(|buffer| self.buffer_data(&buffer));
                let target = channel.target();
                let node = self.track_target(&target.node());

                let (Some(inputs), Some(outputs)) = (reader.read_inputs(), reader.read_outputs()) else {
                    log::warn!("Animation {anim_index}: channel without sampler data skipped");
                    continue;
                };
                let times: Vec<f32> = inputs.collect();

                let interpolation = match channel.sampler().interpolation() {
                    gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
                    gltf::animation::Interpolation::Step => InterpolationMode::Step,
                    gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
                };

                let (target_path, data) = match outputs {
                    ReadOutputs::Translations(iter) => (
                        TargetPath::Translation,
                        TrackData::Vector3(KeyframeTrack::new(times, iter.map(Vec3::from_array).collect(), interpolation)),
                    ),
                    ReadOutputs::Rotations(iter) => (
                        TargetPath::Rotation,
                        TrackData::Quaternion(KeyframeTrack::new(
                            times,
                            iter.into_f32().map(Quat::from_array).collect(),
                            interpolation,
                        )),
                    ),
                    ReadOutputs::Scales(iter) => (
                        TargetPath::Scale,
                        TrackData::Vector3(KeyframeTrack::new(times, iter.map(Vec3::from_array).collect(), interpolation)),
                    ),
                    ReadOutputs::MorphTargetWeights(iter) => {
                        let outputs: Vec<f32> = iter.into_f32().collect();
                        let values_per_key = match interpolation {
                            InterpolationMode::CubicSpline => 3,
                            _ => 1,
                        };
                        let slots = times.len() * values_per_key;
                        if slots == 0 || outputs.is_empty() || outputs.len() % slots != 0 {
                            log::warn!("Animation {anim_index}: malformed morph weight track skipped");
                            continue;
                        }
                        let target_count = outputs.len() / slots;
                        let values = outputs.chunks(target_count).map(MorphWeightData::from_slice).collect();
                        (
                            TargetPath::Weights,
                            TrackData::MorphWeights(KeyframeTrack::new(times, values, interpolation)),
                        )
                    }
                };

                tracks.push(Track {
                    meta: TrackMeta {
                        node,
                        target: target_path,
                    },
                    data,
                });
            }

            let name = anim
                .name()
                .filter(|n| !n.is_empty())
                .map_or_else(|| format!("animation_{anim_index}"), str::to_string);
            animations.push(AnimationClip::new(name, tracks));
        }

        animations
    }
}
