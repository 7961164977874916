//! Camera selection
//!
//! The viewer always owns a default camera driven by the orbit controls.
//! Cameras found in the content can be looked through instead; while one of
//! them is active the controls are switched off.

use rustc_hash::FxHashSet;

use crate::scene::{NodeHandle, Scene};
use crate::utils::OrbitControls;
use crate::viewer::state::DEFAULT_CAMERA;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveCamera {
    Default,
    Named { name: String, node: NodeHandle },
}

/// A content camera as listed in the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraEntry {
    pub name: String,
    pub node: NodeHandle,
}

#[derive(Debug)]
pub struct CameraSwitchboard {
    default_camera: NodeHandle,
    active: ActiveCamera,
    registry: Vec<CameraEntry>,
}

impl CameraSwitchboard {
    #[must_use]
    pub fn new(default_camera: NodeHandle) -> Self {
        Self {
            default_camera,
            active: ActiveCamera::Default,
            registry: Vec::new(),
        }
    }

    #[must_use]
    pub fn active(&self) -> &ActiveCamera {
        &self.active
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        self.active == ActiveCamera::Default
    }

    /// Node of the camera frames are rendered from.
    #[must_use]
    pub fn active_node(&self) -> NodeHandle {
        match &self.active {
            ActiveCamera::Default => self.default_camera,
            ActiveCamera::Named { node, .. } => *node,
        }
    }

    #[must_use]
    pub fn default_camera(&self) -> NodeHandle {
        self.default_camera
    }

    #[must_use]
    pub fn registry(&self) -> &[CameraEntry] {
        &self.registry
    }

    /// Choices for the camera selector, default camera first.
    #[must_use]
    pub fn camera_names(&self) -> Vec<String> {
        std::iter::once(DEFAULT_CAMERA.to_string())
            .chain(self.registry.iter().map(|e| e.name.clone()))
            .collect()
    }

    /// Lists the cameras below `content`.
    ///
    /// Unnamed cameras are called `camera_<n>` and clashing names get a
    /// `_<k>` suffix. The chosen names are written back to the nodes so a
    /// name always selects exactly one camera.
    pub fn rebuild_registry(&mut self, scene: &mut Scene, content: Option<NodeHandle>) -> &[CameraEntry] {
        self.registry.clear();
        let Some(content) = content else {
            return &self.registry;
        };

        let camera_nodes: Vec<NodeHandle> = scene
            .subtree(content)
            .into_iter()
            .filter(|&h| scene.get_node(h).is_some_and(|n| n.camera().is_some()))
            .collect();

        let mut taken: FxHashSet<String> = FxHashSet::default();
        taken.insert(DEFAULT_CAMERA.to_string());

        for (index, handle) in camera_nodes.into_iter().enumerate() {
            let Some(node) = scene.get_node_mut(handle) else {
                continue;
            };
            let base = if node.name.is_empty() {
                format!("camera_{}", index + 1)
            } else {
                node.name.clone()
            };

            let mut name = base.clone();
            let mut k = 1;
            while taken.contains(&name) {
                name = format!("{base}_{k}");
                k += 1;
            }
            if name != node.name {
                log::debug!("Renaming camera `{}` to `{name}`", node.name);
                node.name.clone_from(&name);
            }
            taken.insert(name.clone());
            self.registry.push(CameraEntry { name, node: handle });
        }

        &self.registry
    }

    /// Switches to the camera called `name`.
    ///
    /// [`DEFAULT_CAMERA`] selects the default camera and re-enables the orbit
    /// controls. Any other name selects the first content camera with that
    /// name; if there is none nothing changes and `false` is returned.
    pub fn set_camera(&mut self, name: &str, scene: &Scene, content: Option<NodeHandle>, controls: &mut OrbitControls) -> bool {
        if name == DEFAULT_CAMERA {
            self.active = ActiveCamera::Default;
            controls.enabled = true;
            return true;
        }

        let found = content.and_then(|root| {
            scene
                .subtree(root)
                .into_iter()
                .find(|&h| scene.get_node(h).is_some_and(|n| n.camera().is_some() && n.name == name))
        });

        match found {
            Some(node) => {
                self.active = ActiveCamera::Named {
                    name: name.to_string(),
                    node,
                };
                controls.enabled = false;
                true
            }
            None => {
                log::debug!("No camera named `{name}` in the content");
                false
            }
        }
    }

    /// Falls back to the default camera; content cameras are gone.
    pub fn on_content_cleared(&mut self, controls: &mut OrbitControls) {
        self.active = ActiveCamera::Default;
        self.registry.clear();
        controls.enabled = true;
    }
}
