//! Control panel schema
//!
//! The panel is described as data: a list of [`ControlSpec`]s grouped into
//! folders. A host widget toolkit renders them and reports edits back as
//! [`ControlChange`]s, which [`ViewerSession::apply`](crate::viewer::ViewerSession::apply)
//! routes to the matching update.

use crate::assets::environment::EnvironmentEntry;
use crate::scene::{NodeHandle, Scene};
use crate::viewer::state::{TextureEncoding, ViewState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Folder {
    Display,
    AmbientLighting,
    HemisphereLighting,
    DirectionalLighting,
    Animation,
    MorphTargets,
    Cameras,
    Performance,
}

impl Folder {
    pub const ALL: [Folder; 8] = [
        Folder::Display,
        Folder::AmbientLighting,
        Folder::HemisphereLighting,
        Folder::DirectionalLighting,
        Folder::Animation,
        Folder::MorphTargets,
        Folder::Cameras,
        Folder::Performance,
    ];

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Folder::Display => "Display",
            Folder::AmbientLighting => "Ambient Lighting",
            Folder::HemisphereLighting => "Hemisphere Lighting",
            Folder::DirectionalLighting => "Directional Lighting",
            Folder::Animation => "Animation",
            Folder::MorphTargets => "Morph Targets",
            Folder::Cameras => "Cameras",
            Folder::Performance => "Performance",
        }
    }
}

/// Identifies a control and the piece of state it edits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ControlKey {
    Background,
    Wireframe,
    Skeleton,
    Grid,
    AutoRotate,
    Environment,
    TextureEncoding,
    Exposure,

    AmbientColor,
    AmbientIntensity,
    HemisphereSkyColor,
    HemisphereGroundColor,
    HemisphereIntensity,
    DirectionalColor,
    DirectionalIntensity,

    PlaybackSpeed,
    PlayAll,
    /// Per-clip play toggle
    Clip(String),

    /// Read-only mesh name heading its influence sliders
    MorphMesh(NodeHandle),
    MorphInfluence { node: NodeHandle, index: usize },

    Camera,
    Stats,
}

impl ControlKey {
    #[must_use]
    pub fn folder(&self) -> Folder {
        match self {
            ControlKey::Background
            | ControlKey::Wireframe
            | ControlKey::Skeleton
            | ControlKey::Grid
            | ControlKey::AutoRotate
            | ControlKey::Environment
            | ControlKey::TextureEncoding
            | ControlKey::Exposure => Folder::Display,
            ControlKey::AmbientColor | ControlKey::AmbientIntensity => Folder::AmbientLighting,
            ControlKey::HemisphereSkyColor | ControlKey::HemisphereGroundColor | ControlKey::HemisphereIntensity => {
                Folder::HemisphereLighting
            }
            ControlKey::DirectionalColor | ControlKey::DirectionalIntensity => Folder::DirectionalLighting,
            ControlKey::PlaybackSpeed | ControlKey::PlayAll | ControlKey::Clip(_) => Folder::Animation,
            ControlKey::MorphMesh(_) | ControlKey::MorphInfluence { .. } => Folder::MorphTargets,
            ControlKey::Camera => Folder::Cameras,
            ControlKey::Stats => Folder::Performance,
        }
    }

    /// Controls that only exist while matching content is loaded.
    #[must_use]
    pub fn is_content_control(&self) -> bool {
        matches!(
            self,
            ControlKey::Clip(_) | ControlKey::MorphMesh(_) | ControlKey::MorphInfluence { .. } | ControlKey::Camera
        )
    }
}

impl std::fmt::Display for ControlKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlKey::Clip(name) => write!(f, "clip `{name}`"),
            ControlKey::MorphMesh(node) => write!(f, "morph mesh {node:?}"),
            ControlKey::MorphInfluence { node, index } => write!(f, "morph influence {index} of {node:?}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Widget type plus its current value.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    Toggle(bool),
    Slider { value: f32, min: f32, max: f32 },
    /// `0xRRGGBB`
    Color(u32),
    Select { selected: String, options: Vec<String> },
    Button,
    /// Read-only text
    Label(String),
    /// Frame statistics widget
    Stats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlSpec {
    pub key: ControlKey,
    pub folder: Folder,
    pub label: String,
    pub kind: ControlKind,
}

impl ControlSpec {
    fn new(key: ControlKey, label: impl Into<String>, kind: ControlKind) -> Self {
        Self {
            folder: key.folder(),
            key,
            label: label.into(),
            kind,
        }
    }
}

/// A value reported by a widget.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlValue {
    Bool(bool),
    Number(f32),
    Color(u32),
    Text(String),
    /// Button press
    Trigger,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlChange {
    pub key: ControlKey,
    pub value: ControlValue,
}

impl ControlChange {
    #[must_use]
    pub fn new(key: ControlKey, value: ControlValue) -> Self {
        Self { key, value }
    }
}

#[derive(Debug, Clone)]
pub struct ControlPanel {
    controls: Vec<ControlSpec>,
    open: bool,
}

impl ControlPanel {
    /// Builds the content-independent controls.
    ///
    /// Light controls read their initial values from `state.lights`, so the
    /// rig must have been configured from the same state first.
    #[must_use]
    pub fn build(state: &ViewState, catalog: &[EnvironmentEntry], open: bool) -> Self {
        let lights = &state.lights;
        let intensity = |value: f32| ControlKind::Slider {
            value,
            min: 0.0,
            max: 1.0,
        };

        let controls = vec![
            ControlSpec::new(ControlKey::Background, "background", ControlKind::Toggle(state.background)),
            ControlSpec::new(ControlKey::Wireframe, "wireframe", ControlKind::Toggle(state.wireframe)),
            ControlSpec::new(ControlKey::Skeleton, "skeleton", ControlKind::Toggle(state.skeleton)),
            ControlSpec::new(ControlKey::Grid, "grid", ControlKind::Toggle(state.grid)),
            ControlSpec::new(ControlKey::AutoRotate, "autoRotate", ControlKind::Toggle(state.auto_rotate)),
            ControlSpec::new(
                ControlKey::Environment,
                "environment",
                ControlKind::Select {
                    selected: state.environment.clone(),
                    options: catalog.iter().map(|e| e.name.clone()).collect(),
                },
            ),
            ControlSpec::new(
                ControlKey::TextureEncoding,
                "textureEncoding",
                ControlKind::Select {
                    selected: state.texture_encoding.label().to_string(),
                    options: TextureEncoding::OPTIONS.iter().map(|e| e.label().to_string()).collect(),
                },
            ),
            ControlSpec::new(
                ControlKey::Exposure,
                "exposure",
                ControlKind::Slider {
                    value: state.exposure,
                    min: 0.0,
                    max: 2.0,
                },
            ),
            ControlSpec::new(ControlKey::AmbientColor, "color", ControlKind::Color(lights.ambient_color)),
            ControlSpec::new(ControlKey::AmbientIntensity, "intensity", intensity(lights.ambient_intensity)),
            ControlSpec::new(ControlKey::HemisphereSkyColor, "color", ControlKind::Color(lights.hemisphere_sky_color)),
            ControlSpec::new(
                ControlKey::HemisphereGroundColor,
                "groundColor",
                ControlKind::Color(lights.hemisphere_ground_color),
            ),
            ControlSpec::new(ControlKey::HemisphereIntensity, "intensity", intensity(lights.hemisphere_intensity)),
            ControlSpec::new(ControlKey::DirectionalColor, "color", ControlKind::Color(lights.directional_color)),
            ControlSpec::new(ControlKey::DirectionalIntensity, "intensity", intensity(lights.directional_intensity)),
            ControlSpec::new(ControlKey::PlaybackSpeed, "playbackSpeed", intensity(state.playback_speed)),
            ControlSpec::new(ControlKey::PlayAll, "playAll", ControlKind::Button),
            ControlSpec::new(ControlKey::Stats, "stats", ControlKind::Stats),
        ];

        Self { controls, open }
    }

    /// Replaces the clip, morph target and camera controls with ones for the
    /// current content.
    pub fn refresh_content(&mut self, state: &ViewState, scene: &Scene, content: Option<NodeHandle>, camera_names: &[String], clip_names: &[String]) {
        self.controls.retain(|c| !c.key.is_content_control());

        for name in clip_names {
            let playing = state.action_states.get(name).copied().unwrap_or(false);
            self.controls.push(ControlSpec::new(
                ControlKey::Clip(name.clone()),
                name.clone(),
                ControlKind::Toggle(playing),
            ));
        }

        if let Some(root) = content {
            for node in scene.subtree(root) {
                let Some(mesh) = scene.mesh_of(node).filter(|m| m.has_morph_targets()) else {
                    continue;
                };
                let title = if mesh.name.is_empty() { "Untitled" } else { mesh.name.as_str() };
                self.controls.push(ControlSpec::new(
                    ControlKey::MorphMesh(node),
                    "name",
                    ControlKind::Label(title.to_string()),
                ));
                for (index, &value) in mesh.morph_target_influences.iter().enumerate() {
                    self.controls.push(ControlSpec::new(
                        ControlKey::MorphInfluence { node, index },
                        index.to_string(),
                        ControlKind::Slider {
                            value,
                            min: 0.0,
                            max: 1.0,
                        },
                    ));
                }
            }
        }

        // The default camera alone gives nothing to choose from
        if camera_names.len() > 1 {
            self.controls.push(ControlSpec::new(
                ControlKey::Camera,
                "camera",
                ControlKind::Select {
                    selected: state.camera.clone(),
                    options: camera_names.to_vec(),
                },
            ));
        }
    }

    /// Re-reads every displayed value from `state` and the scene.
    pub fn sync_values(&mut self, state: &ViewState, scene: &Scene) {
        let lights = &state.lights;
        for control in &mut self.controls {
            match (&control.key, &mut control.kind) {
                (ControlKey::Background, ControlKind::Toggle(v)) => *v = state.background,
                (ControlKey::Wireframe, ControlKind::Toggle(v)) => *v = state.wireframe,
                (ControlKey::Skeleton, ControlKind::Toggle(v)) => *v = state.skeleton,
                (ControlKey::Grid, ControlKind::Toggle(v)) => *v = state.grid,
                (ControlKey::AutoRotate, ControlKind::Toggle(v)) => *v = state.auto_rotate,
                (ControlKey::Clip(name), ControlKind::Toggle(v)) => {
                    *v = state.action_states.get(name).copied().unwrap_or(false);
                }

                (ControlKey::Environment, ControlKind::Select { selected, .. }) => {
                    selected.clone_from(&state.environment);
                }
                (ControlKey::TextureEncoding, ControlKind::Select { selected, .. }) => {
                    *selected = state.texture_encoding.label().to_string();
                }
                (ControlKey::Camera, ControlKind::Select { selected, .. }) => selected.clone_from(&state.camera),

                (ControlKey::Exposure, ControlKind::Slider { value, .. }) => *value = state.exposure,
                (ControlKey::PlaybackSpeed, ControlKind::Slider { value, .. }) => *value = state.playback_speed,
                (ControlKey::AmbientIntensity, ControlKind::Slider { value, .. }) => *value = lights.ambient_intensity,
                (ControlKey::HemisphereIntensity, ControlKind::Slider { value, .. }) => {
                    *value = lights.hemisphere_intensity;
                }
                (ControlKey::DirectionalIntensity, ControlKind::Slider { value, .. }) => {
                    *value = lights.directional_intensity;
                }
                (ControlKey::MorphInfluence { node, index }, ControlKind::Slider { value, .. }) => {
                    if let Some(&influence) = scene
                        .mesh_of(*node)
                        .and_then(|m| m.morph_target_influences.get(*index))
                    {
                        *value = influence;
                    }
                }

                (ControlKey::AmbientColor, ControlKind::Color(c)) => *c = lights.ambient_color,
                (ControlKey::HemisphereSkyColor, ControlKind::Color(c)) => *c = lights.hemisphere_sky_color,
                (ControlKey::HemisphereGroundColor, ControlKind::Color(c)) => *c = lights.hemisphere_ground_color,
                (ControlKey::DirectionalColor, ControlKind::Color(c)) => *c = lights.directional_color,
                _ => {}
            }
        }
    }

    #[must_use]
    pub fn controls(&self) -> &[ControlSpec] {
        &self.controls
    }

    pub fn controls_in(&self, folder: Folder) -> impl Iterator<Item = &ControlSpec> {
        self.controls.iter().filter(move |c| c.folder == folder)
    }

    #[must_use]
    pub fn find(&self, key: &ControlKey) -> Option<&ControlSpec> {
        self.controls.iter().find(|c| &c.key == key)
    }

    /// Content-dependent folders are hidden while they have nothing to show.
    #[must_use]
    pub fn folder_visible(&self, folder: Folder) -> bool {
        match folder {
            Folder::Animation => self.controls_in(folder).any(|c| matches!(c.key, ControlKey::Clip(_))),
            Folder::MorphTargets | Folder::Cameras => self.controls_in(folder).next().is_some(),
            _ => true,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }
}
