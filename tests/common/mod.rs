//! Shared glTF fixtures
//!
//! Builds a small asset in memory:
//! - `Triangle`: textured, one morph target, at (10, 0, 0)
//! - `cube_cam` and one unnamed perspective camera
//! - `Armature` > `Hip` > `Spine` joints skinning the `Body` mesh
//! - clips `Walk` (Hip translation 0 -> (0, 1, 0) over 1 s) and `Idle`
//!   (Spine rotation), optionally `Blink` (Triangle weight 0 -> 1)
//!
//! Both meshes share a triangle with bounds (0, 0, 0)..(4, 3, 0), so the
//! content spans (0, 0, 0)..(14, 3, 0).

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use myth_viewer::ViewerConfig;
use myth_viewer::assets::{AssetMap, AssetReaderVariant, MemoryAssetReader};
use myth_viewer::scene::{NodeHandle, Scene};
use myth_viewer::viewer::ViewerSession;
use serde_json::{Value, json};

pub const ENTRY: &str = "scene.gltf";
pub const BIN: &str = "scene.bin";
pub const PNG: &str = "tex.png";

pub const EPSILON: f32 = 1e-4;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub struct Fixture {
    pub gltf: Value,
    pub bin: Vec<u8>,
    pub png: Vec<u8>,
}

impl Fixture {
    pub fn gltf_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(&self.gltf).unwrap()
    }

    /// Same asset as a binary `.glb`; the image stays external.
    pub fn glb_bytes(&self) -> Vec<u8> {
        let mut gltf = self.gltf.clone();
        gltf["buffers"] = json!([{ "byteLength": self.bin.len() }]);

        let mut json_chunk = serde_json::to_vec(&gltf).unwrap();
        while json_chunk.len() % 4 != 0 {
            json_chunk.push(b' ');
        }
        let mut bin_chunk = self.bin.clone();
        while bin_chunk.len() % 4 != 0 {
            bin_chunk.push(0);
        }

        let total = 12 + 8 + json_chunk.len() + 8 + bin_chunk.len();
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(b"glTF");
        out.extend_from_slice(&2_u32.to_le_bytes());
        out.extend_from_slice(&(total as u32).to_le_bytes());
        out.extend_from_slice(&(json_chunk.len() as u32).to_le_bytes());
        out.extend_from_slice(b"JSON");
        out.extend_from_slice(&json_chunk);
        out.extend_from_slice(&(bin_chunk.len() as u32).to_le_bytes());
        out.extend_from_slice(b"BIN\0");
        out.extend_from_slice(&bin_chunk);
        out
    }

    /// Entry, buffer and image keyed the way a drag-and-drop bundle is.
    pub fn asset_map(&self) -> AssetMap {
        let mut map = AssetMap::default();
        map.insert(ENTRY.to_string(), Arc::from(self.gltf_bytes()));
        map.insert(BIN.to_string(), Arc::from(self.bin.clone()));
        map.insert(PNG.to_string(), Arc::from(self.png.clone()));
        map
    }
}

pub struct FixtureBuilder {
    cameras: bool,
    clips: bool,
    light: bool,
    embedded: bool,
    morph_clip: bool,
    clip_end: f32,
}

impl Default for FixtureBuilder {
    fn default() -> Self {
        Self {
            cameras: true,
            clips: true,
            light: false,
            embedded: false,
            morph_clip: false,
            clip_end: 1.0,
        }
    }
}

impl FixtureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_cameras(mut self) -> Self {
        self.cameras = false;
        self
    }

    pub fn without_clips(mut self) -> Self {
        self.clips = false;
        self
    }

    pub fn with_light(mut self) -> Self {
        self.light = true;
        self
    }

    /// Adds `Blink`, driving the Triangle's morph weight from 0 to 1.
    pub fn with_morph_clip(mut self) -> Self {
        self.morph_clip = true;
        self
    }

    /// Moves the last keyframe of every clip to `end` seconds.
    pub fn clip_end(mut self, end: f32) -> Self {
        self.clip_end = end;
        self
    }

    /// Buffer inlined as a base64 data URI instead of `scene.bin`.
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    pub fn build(self) -> Fixture {
        let mut bin = binary_chunk();
        bin[48..52].copy_from_slice(&self.clip_end.to_le_bytes());
        let png = png_bytes();

        let buffer_uri = if self.embedded {
            use base64::Engine as _;
            format!(
                "data:application/octet-stream;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(&bin)
            )
        } else {
            BIN.to_string()
        };

        let mut nodes = vec![
            json!({ "name": "Triangle", "mesh": 0, "translation": [10.0, 0.0, 0.0] }),
            json!({ "name": "Armature", "children": [2] }),
            json!({ "name": "Hip", "children": [3] }),
            json!({ "name": "Spine", "translation": [0.0, 1.0, 0.0] }),
            json!({ "name": "Body", "mesh": 1, "skin": 0 }),
        ];
        let mut scene_nodes = vec![0, 1, 4];

        if self.cameras {
            nodes.push(json!({ "name": "cube_cam", "camera": 0, "translation": [0.0, 0.0, 10.0] }));
            nodes.push(json!({ "camera": 0, "translation": [0.0, 5.0, 10.0] }));
            scene_nodes.extend([5, 6]);
        }
        if self.light {
            nodes.push(json!({ "name": "Lamp", "extensions": { "KHR_lights_punctual": { "light": 0 } } }));
            scene_nodes.push(nodes.len() - 1);
        }

        let mut gltf = json!({
            "asset": { "version": "2.0", "generator": "fixture" },
            "scene": 0,
            "scenes": [{ "name": "FixtureScene", "nodes": scene_nodes }],
            "nodes": nodes,
            "meshes": [
                {
                    "name": "Triangle",
                    "primitives": [{
                        "attributes": { "POSITION": 0 },
                        "indices": 1,
                        "material": 0,
                        "targets": [{ "POSITION": 0 }]
                    }],
                    "weights": [0.25]
                },
                {
                    "name": "Body",
                    "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1, "material": 1 }]
                }
            ],
            "materials": [
                {
                    "name": "Painted",
                    "pbrMetallicRoughness": { "baseColorTexture": { "index": 0 } },
                    "emissiveTexture": { "index": 0 }
                },
                { "name": "Skin" }
            ],
            "textures": [{ "source": 0 }],
            "images": [{ "uri": PNG }],
            "skins": [{ "joints": [2, 3] }],
            "cameras": [{ "type": "perspective", "perspective": { "yfov": 0.8, "znear": 0.1, "zfar": 100.0 } }],
            "buffers": [{ "byteLength": bin.len(), "uri": buffer_uri }],
            "bufferViews": [
                { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
                { "buffer": 0, "byteOffset": 36, "byteLength": 6 },
                { "buffer": 0, "byteOffset": 44, "byteLength": 8 },
                { "buffer": 0, "byteOffset": 52, "byteLength": 24 },
                { "buffer": 0, "byteOffset": 76, "byteLength": 32 }
            ],
            "accessors": [
                { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                  "min": [0.0, 0.0, 0.0], "max": [4.0, 3.0, 0.0] },
                { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" },
                { "bufferView": 2, "componentType": 5126, "count": 2, "type": "SCALAR",
                  "min": [0.0], "max": [self.clip_end] },
                { "bufferView": 3, "componentType": 5126, "count": 2, "type": "VEC3" },
                { "bufferView": 4, "componentType": 5126, "count": 2, "type": "VEC4" }
            ]
        });

        if self.clips {
            gltf["animations"] = json!([
                {
                    "name": "Walk",
                    "channels": [{ "sampler": 0, "target": { "node": 2, "path": "translation" } }],
                    "samplers": [{ "input": 2, "output": 3, "interpolation": "LINEAR" }]
                },
                {
                    "name": "Idle",
                    "channels": [{ "sampler": 0, "target": { "node": 3, "path": "rotation" } }],
                    "samplers": [{ "input": 2, "output": 4, "interpolation": "LINEAR" }]
                }
            ]);
            if self.morph_clip {
                gltf["animations"].as_array_mut().unwrap().push(json!({
                    "name": "Blink",
                    "channels": [{ "sampler": 0, "target": { "node": 0, "path": "weights" } }],
                    "samplers": [{ "input": 2, "output": 2, "interpolation": "LINEAR" }]
                }));
            }
        }
        if self.light {
            gltf["extensionsUsed"] = json!(["KHR_lights_punctual"]);
            gltf["extensions"] = json!({
                "KHR_lights_punctual": { "lights": [{ "type": "point", "color": [1.0, 0.9, 0.8], "intensity": 2.0 }] }
            });
        }

        Fixture { gltf, bin, png }
    }
}

fn push_f32s(out: &mut Vec<u8>, values: &[f32]) {
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

/// 108 bytes: positions, indices (+2 padding), times, translations, rotations.
fn binary_chunk() -> Vec<u8> {
    let mut bin = Vec::with_capacity(108);
    push_f32s(&mut bin, &[0.0, 0.0, 0.0, 4.0, 0.0, 0.0, 0.0, 3.0, 0.0]);
    for index in [0_u16, 1, 2, 0] {
        bin.extend_from_slice(&index.to_le_bytes());
    }
    push_f32s(&mut bin, &[0.0, 1.0]);
    push_f32s(&mut bin, &[0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    push_f32s(&mut bin, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.707_106_8, 0.0, 0.707_106_8]);
    assert_eq!(bin.len(), 108);
    bin
}

fn png_bytes() -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 128, 0, 255]));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Session whose fallback reader has no files, so everything must come
/// from the bundle.
pub fn session() -> ViewerSession {
    session_with(ViewerConfig::default())
}

pub fn session_with(config: ViewerConfig) -> ViewerSession {
    ViewerSession::with_reader(config, AssetReaderVariant::memory(MemoryAssetReader::new()))
}

/// Session with the default fixture installed.
pub fn loaded_session() -> ViewerSession {
    let mut session = session();
    load_fixture(&mut session, &FixtureBuilder::new().build());
    session
}

pub fn load_fixture(session: &mut ViewerSession, fixture: &Fixture) {
    let request = myth_viewer::LoadRequest::new(ENTRY).with_bundle("", fixture.asset_map());
    session.load_blocking(request).unwrap();
}

/// First node called `name` below `root`.
pub fn find_node(scene: &Scene, root: NodeHandle, name: &str) -> Option<NodeHandle> {
    scene
        .subtree(root)
        .into_iter()
        .find(|&h| scene.get_node(h).is_some_and(|n| n.name == name))
}
