//! The viewer session
//!
//! [`ViewerSession`] owns the live scene, the current content and the view
//! state, and wires the sync components together. Content enters only
//! through [`load`](ViewerSession::load) (or its background variant) and is
//! installed in one synchronous step between frames.

use std::time::Duration;

use flume::{Receiver, TryRecvError};
use glam::Vec3;

use crate::assets::blob::{AssetMap, ObjectUrlRegistry};
use crate::assets::environment::find_environment;
use crate::assets::io::AssetReaderVariant;
use crate::assets::loader::{AssetLoader, LoadRequest, LoadedAsset, get_asset_runtime};
use crate::config::ViewerConfig;
use crate::errors::{Result, ViewerError};
use crate::scene::{Camera, NodeHandle, Scene};
use crate::utils::{Input, OrbitControls};
use crate::viewer::animation::AnimationController;
use crate::viewer::cameras::{ActiveCamera, CameraSwitchboard};
use crate::viewer::display::DisplayStateSync;
use crate::viewer::lighting::LightingRig;
use crate::viewer::normalizer::ContentNormalizer;
use crate::viewer::panel::{ControlChange, ControlKey, ControlKind, ControlPanel, ControlSpec, ControlValue};
use crate::viewer::render_loop::RenderFrame;
use crate::viewer::state::{DEFAULT_CAMERA, TextureEncoding, ViewState};

const DEFAULT_NEAR: f32 = 0.01;
const DEFAULT_FAR: f32 = 1000.0;

pub struct ViewerSession {
    scene: Scene,
    config: ViewerConfig,
    state: ViewState,
    content: Option<NodeHandle>,

    controls: OrbitControls,
    input: Input,

    animation: AnimationController,
    cameras: CameraSwitchboard,
    lighting: LightingRig,
    display: DisplayStateSync,
    panel: ControlPanel,

    loader: AssetLoader,
    pending: Option<Receiver<Result<LoadedAsset>>>,
}

impl ViewerSession {
    /// Session reading non-bundled resources from the working directory.
    #[must_use]
    pub fn new(config: ViewerConfig) -> Self {
        Self::with_reader(config, AssetReaderVariant::default())
    }

    #[must_use]
    pub fn with_reader(config: ViewerConfig, reader: AssetReaderVariant) -> Self {
        let mut scene = Scene::new();
        let aspect = config.viewport.aspect();

        let default_camera = scene.add_camera(
            "DefaultCamera",
            Camera::new_perspective(config.camera_fov, aspect, DEFAULT_NEAR, DEFAULT_FAR),
            None,
        );

        let state = config.initial_state.clone();
        let lighting = LightingRig::new(&mut scene, &state.lights);
        let panel = ControlPanel::build(&state, &config.environments, !config.kiosk);

        let mut controls = OrbitControls::new(Vec3::ZERO, 1.0);
        controls.auto_rotate = state.auto_rotate;
        controls.auto_rotate_speed = config.auto_rotate_speed;

        let mut input = Input::default();
        input.handle_resize(config.viewport.width, config.viewport.height);

        let mut session = Self {
            scene,
            state,
            content: None,

            controls,
            input,

            animation: AnimationController::new(),
            cameras: CameraSwitchboard::new(default_camera),
            lighting,
            display: DisplayStateSync::new(aspect),
            panel,

            loader: AssetLoader::new(ObjectUrlRegistry::new(), reader),
            pending: None,
            config,
        };
        session.state.camera = DEFAULT_CAMERA.to_string();
        session.update_environment();
        session.update_display();
        session
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Loads an asset and replaces the current content with it.
    ///
    /// `asset_map` holds bundled files keyed by `root_path` + relative path;
    /// anything not in it is read through the session's reader. On failure
    /// the current content stays in place and the error is returned as the
    /// loader produced it.
    pub async fn load(&mut self, url: &str, root_path: &str, asset_map: AssetMap) -> Result<()> {
        if self.pending.is_some() {
            return Err(ViewerError::LoadInFlight);
        }
        let request = LoadRequest::new(url).with_bundle(root_path, asset_map);
        let asset = self.loader.load(request).await?;
        self.set_content(asset)
    }

    /// [`load`](Self::load) for hosts without an async runtime.
    pub fn load_blocking(&mut self, request: LoadRequest) -> Result<()> {
        if self.pending.is_some() {
            return Err(ViewerError::LoadInFlight);
        }
        let asset = get_asset_runtime()?.block_on(self.loader.load(request))?;
        self.set_content(asset)
    }

    /// Starts a load on the asset runtime. The result is picked up by
    /// [`poll_load`](Self::poll_load).
    pub fn request_load(&mut self, request: LoadRequest) -> Result<()> {
        if self.pending.is_some() {
            return Err(ViewerError::LoadInFlight);
        }
        let runtime = get_asset_runtime()?;
        let (tx, rx) = flume::bounded(1);
        let loader = self.loader.clone();

        runtime.spawn(async move {
            let result = loader.load(request).await;
            if tx.send(result).is_err() {
                log::debug!("Load finished after its session went away");
            }
        });
        self.pending = Some(rx);
        Ok(())
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Installs a finished background load.
    ///
    /// Returns `None` while nothing has finished, otherwise the outcome of
    /// the load and installation.
    pub fn poll_load(&mut self) -> Option<Result<()>> {
        let rx = self.pending.as_ref()?;
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                self.pending = None;
                return Some(Err(ViewerError::TaskAborted(
                    "load task dropped its result".to_string(),
                )));
            }
        };
        self.pending = None;
        Some(outcome.and_then(|asset| self.set_content(asset)))
    }

    // ========================================================================
    // Content
    // ========================================================================

    /// Replaces the current content with a loaded asset.
    pub fn set_content(&mut self, asset: LoadedAsset) -> Result<()> {
        let LoadedAsset {
            scene: fragment,
            root,
            clips,
            scope,
            source,
        } = asset;

        if !fragment.nodes.contains_key(root) {
            return Err(ViewerError::Load(format!("{source}: content root missing from the loaded scene")));
        }
        self.clear();

        let root = self
            .scene
            .adopt(fragment, root)
            .ok_or_else(|| ViewerError::Load(format!("{source}: content root missing from the loaded scene")))?;
        self.content = Some(root);

        let default_camera = self.cameras.default_camera();
        match ContentNormalizer::normalize(&mut self.scene, root) {
            Some(framing) => ContentNormalizer::apply(&framing, &mut self.scene, default_camera, &mut self.controls),
            None => log::warn!("{source} has no geometry, camera left in place"),
        }
        self.cameras
            .set_camera(DEFAULT_CAMERA, &self.scene, self.content, &mut self.controls);
        self.state.camera = DEFAULT_CAMERA.to_string();

        self.state.add_lights = !LightingRig::detect_content_lights(&self.scene, root);

        self.animation.bind(root, clips, self.state.playback_speed);
        self.update_gui();

        self.update_environment();
        self.update_texture_encoding();
        self.update_display();

        log::info!("Installed {source}");
        log::debug!("Scene graph of {source}:\n{}", self.scene.describe_subtree(root));

        // The blob handles are only needed until the content is in place
        drop(scope);
        Ok(())
    }

    /// Removes the current content and everything derived from it.
    pub fn clear(&mut self) {
        let Some(root) = self.content.take() else {
            return;
        };
        self.display.clear(&mut self.scene);
        self.animation.clear();
        self.cameras.on_content_cleared(&mut self.controls);
        self.state.camera = DEFAULT_CAMERA.to_string();
        self.state.action_states.clear();

        self.scene.remove_node(root);

        self.update_gui();
        self.update_environment();
    }

    fn update_gui(&mut self) {
        self.cameras.rebuild_registry(&mut self.scene, self.content);
        self.animation.sync_action_states(&mut self.state, &self.scene);

        let camera_names = self.cameras.camera_names();
        let clip_names: Vec<String> = self.animation.clip_names().map(str::to_string).collect();
        self.panel
            .refresh_content(&self.state, &self.scene, self.content, &camera_names, &clip_names);
    }

    fn update_environment(&mut self) {
        let default_active = self.cameras.is_default();
        self.display.update_environment(
            &mut self.scene,
            self.content,
            &self.state,
            &self.config.environments,
            default_active,
        );
    }

    fn update_display(&mut self) {
        self.display.update_display(&mut self.scene, self.content, &self.state);
    }

    fn update_texture_encoding(&mut self) {
        self.display
            .update_texture_encoding(&mut self.scene, self.content, self.state.texture_encoding);
    }

    // ========================================================================
    // Operations behind the panel
    // ========================================================================

    /// Looks through the camera called `name`, or through the default camera
    /// for [`DEFAULT_CAMERA`]. Unknown names change nothing and return `false`.
    pub fn set_camera(&mut self, name: &str) -> bool {
        if !self.cameras.set_camera(name, &self.scene, self.content, &mut self.controls) {
            return false;
        }
        self.state.camera = name.to_string();
        self.update_environment();
        self.panel.sync_values(&self.state, &self.scene);
        true
    }

    pub fn play_all_clips(&mut self) {
        self.animation.play_all(&mut self.state, &self.scene);
        self.panel.sync_values(&self.state, &self.scene);
    }

    pub fn set_clip_enabled(&mut self, name: &str, enabled: bool) -> bool {
        let found = self
            .animation
            .set_clip_enabled(name, enabled, &mut self.state, &self.scene);
        self.panel.sync_values(&self.state, &self.scene);
        found
    }

    /// Applies one panel edit.
    pub fn apply(&mut self, change: ControlChange) -> Result<()> {
        let ControlChange { key, value } = change;
        if let ControlValue::Number(number) = value {
            self.check_slider(&key, number)?;
        }

        match (&key, value) {
            (ControlKey::Background, ControlValue::Bool(on)) => {
                self.state.background = on;
                self.update_environment();
            }
            (ControlKey::Wireframe, ControlValue::Bool(on)) => {
                self.state.wireframe = on;
                self.update_display();
            }
            (ControlKey::Skeleton, ControlValue::Bool(on)) => {
                self.state.skeleton = on;
                self.update_display();
            }
            (ControlKey::Grid, ControlValue::Bool(on)) => {
                self.state.grid = on;
                self.update_display();
            }
            (ControlKey::AutoRotate, ControlValue::Bool(on)) => {
                self.state.auto_rotate = on;
                self.controls.auto_rotate = on;
            }
            (ControlKey::Environment, ControlValue::Text(name)) => {
                if find_environment(&self.config.environments, &name).is_none() {
                    return Err(invalid(&key, format!("unknown environment `{name}`")));
                }
                self.state.environment = name;
                self.update_environment();
            }
            (ControlKey::TextureEncoding, ControlValue::Text(label)) => {
                let encoding = TextureEncoding::from_label(&label)
                    .ok_or_else(|| invalid(&key, format!("unknown encoding `{label}`")))?;
                self.state.texture_encoding = encoding;
                self.update_texture_encoding();
            }
            (ControlKey::Exposure, ControlValue::Number(v)) => self.state.exposure = v,

            (ControlKey::AmbientColor, ControlValue::Color(c)) => self.set_lights(|l| l.ambient_color = c),
            (ControlKey::AmbientIntensity, ControlValue::Number(v)) => self.set_lights(|l| l.ambient_intensity = v),
            (ControlKey::HemisphereSkyColor, ControlValue::Color(c)) => {
                self.set_lights(|l| l.hemisphere_sky_color = c);
            }
            (ControlKey::HemisphereGroundColor, ControlValue::Color(c)) => {
                self.set_lights(|l| l.hemisphere_ground_color = c);
            }
            (ControlKey::HemisphereIntensity, ControlValue::Number(v)) => {
                self.set_lights(|l| l.hemisphere_intensity = v);
            }
            (ControlKey::DirectionalColor, ControlValue::Color(c)) => self.set_lights(|l| l.directional_color = c),
            (ControlKey::DirectionalIntensity, ControlValue::Number(v)) => {
                self.set_lights(|l| l.directional_intensity = v);
            }

            (ControlKey::PlaybackSpeed, ControlValue::Number(v)) => {
                self.state.playback_speed = v;
                self.animation.set_playback_speed(v);
            }
            (ControlKey::PlayAll, ControlValue::Trigger) => self.play_all_clips(),
            (ControlKey::Clip(name), ControlValue::Bool(on)) => {
                if !self.set_clip_enabled(name, on) {
                    return Err(invalid(&key, "no such clip".to_string()));
                }
            }
            (ControlKey::MorphInfluence { node, index }, ControlValue::Number(v)) => {
                let slot = self
                    .scene
                    .nodes
                    .get(*node)
                    .and_then(|n| n.mesh())
                    .and_then(|k| self.scene.meshes.get_mut(k))
                    .and_then(|m| m.morph_target_influences.get_mut(*index))
                    .ok_or_else(|| invalid(&key, "morph target no longer exists".to_string()))?;
                *slot = v;
            }
            (ControlKey::Camera, ControlValue::Text(name)) => {
                if !self.set_camera(&name) {
                    return Err(invalid(&key, format!("no camera named `{name}`")));
                }
            }

            (ControlKey::MorphMesh(_) | ControlKey::Stats, _) => {
                return Err(invalid(&key, "control is read-only".to_string()));
            }
            (_, value) => return Err(invalid(&key, format!("unexpected value {value:?}"))),
        }

        self.panel.sync_values(&self.state, &self.scene);
        Ok(())
    }

    fn set_lights(&mut self, edit: impl FnOnce(&mut crate::viewer::state::LightSettings)) {
        edit(&mut self.state.lights);
        self.lighting.apply(&mut self.scene, &self.state.lights);
    }

    /// Viewport size changed.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.viewport.width = width;
        self.config.viewport.height = height;
        let aspect = self.config.viewport.aspect();

        if let Some((_, camera)) = self.scene.query_camera_bundle(self.cameras.default_camera()) {
            camera.set_aspect(aspect);
        }
        self.display.set_aspect(&mut self.scene, aspect);
        self.input.handle_resize(width, height);
    }

    // ========================================================================
    // Frame steps, driven by the render loop
    // ========================================================================

    pub(crate) fn update_controls(&mut self, dt: f32) {
        if !self.controls.enabled {
            return;
        }
        let default_camera = self.cameras.default_camera();
        if let Some((transform, camera)) = self.scene.query_camera_bundle(default_camera) {
            let fov = camera.fov.to_degrees();
            self.controls.update(transform, &self.input, fov, dt);
        }
    }

    pub(crate) fn tick_animation(&mut self, dt: f32) {
        self.animation.tick(dt, &mut self.scene);
    }

    pub(crate) fn prepare_frame(&mut self) {
        self.scene.update_matrix_world();
        self.scene.update_skeletons();
        self.input.end_frame();
    }

    pub(crate) fn render_frame(&self) -> RenderFrame<'_> {
        RenderFrame {
            scene: &self.scene,
            camera: self.cameras.active_node(),
            exposure: self.state.exposure,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    #[must_use]
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Root of the installed content.
    #[must_use]
    pub fn content(&self) -> Option<NodeHandle> {
        self.content
    }

    #[must_use]
    pub fn default_camera(&self) -> NodeHandle {
        self.cameras.default_camera()
    }

    #[must_use]
    pub fn active_camera(&self) -> &ActiveCamera {
        self.cameras.active()
    }

    #[must_use]
    pub fn active_camera_node(&self) -> NodeHandle {
        self.cameras.active_node()
    }

    #[must_use]
    pub fn camera_names(&self) -> Vec<String> {
        self.cameras.camera_names()
    }

    #[must_use]
    pub fn animation(&self) -> &AnimationController {
        &self.animation
    }

    #[must_use]
    pub fn lighting(&self) -> &LightingRig {
        &self.lighting
    }

    #[must_use]
    pub fn display(&self) -> &DisplayStateSync {
        &self.display
    }

    #[must_use]
    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    pub fn input_mut(&mut self) -> &mut Input {
        &mut self.input
    }

    #[must_use]
    pub fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut ControlPanel {
        &mut self.panel
    }

    #[must_use]
    pub fn registry(&self) -> &ObjectUrlRegistry {
        self.loader.registry()
    }

    /// Numbers must be finite and inside the slider's range when the panel has one.
    fn check_slider(&self, key: &ControlKey, number: f32) -> Result<()> {
        if !number.is_finite() {
            return Err(invalid(key, format!("{number} is not a finite number")));
        }
        if let Some(ControlSpec {
            kind: ControlKind::Slider { min, max, .. },
            ..
        }) = self.panel.find(key)
            && !(*min..=*max).contains(&number)
        {
            return Err(invalid(key, format!("{number} is outside {min}..={max}")));
        }
        Ok(())
    }

    /// Seconds the longest clip takes, handy for headless runs.
    #[must_use]
    pub fn longest_clip(&self) -> Duration {
        let seconds = self
            .animation
            .clips()
            .iter()
            .map(|c| c.duration)
            .filter(|d| d.is_finite())
            .fold(0.0_f32, f32::max);
        Duration::try_from_secs_f32(seconds.max(0.0)).unwrap_or(Duration::MAX)
    }
}

fn invalid(key: &ControlKey, reason: String) -> ViewerError {
    ViewerError::InvalidControl {
        control: key.to_string(),
        reason,
    }
}

impl std::fmt::Debug for ViewerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerSession")
            .field("content", &self.content)
            .field("active_camera", self.cameras.active())
            .field("clips", &self.animation.clips().len())
            .field("loading", &self.pending.is_some())
            .finish_non_exhaustive()
    }
}
