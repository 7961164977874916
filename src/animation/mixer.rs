use std::sync::Arc;

use crate::animation::action::{AnimationAction, TrackValue};
use crate::animation::binder::Binder;
use crate::animation::clip::{AnimationClip, TargetPath};
use crate::scene::{NodeHandle, NodeKind, Scene};

/// Evaluates the actions of one content root.
///
/// Every action the mixer hands out is bound to nodes below [`root`](Self::root);
/// a mixer never touches nodes outside that subtree.
#[derive(Debug)]
pub struct AnimationMixer {
    root: NodeHandle,
    actions: Vec<AnimationAction>,
    /// Global speed multiplier applied on top of each action's time scale
    pub time_scale: f32,
}

impl AnimationMixer {
    #[must_use]
    pub fn new(root: NodeHandle) -> Self {
        Self {
            root,
            actions: Vec::new(),
            time_scale: 1.0,
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// Returns the action for `clip`, creating and binding it on first use.
    pub fn clip_action(&mut self, clip: &Arc<AnimationClip>, scene: &Scene) -> &mut AnimationAction {
        let index = match self.actions.iter().position(|a| Arc::ptr_eq(a.clip(), clip)) {
            Some(index) => index,
            None => {
                let mut action = AnimationAction::new(Arc::clone(clip));
                action.bindings = Binder::bind(scene, self.root, clip);
                self.actions.push(action);
                self.actions.len() - 1
            }
        };
        &mut self.actions[index]
    }

    /// Looks up a cached action by clip name.
    #[must_use]
    pub fn existing_action(&self, clip_name: &str) -> Option<&AnimationAction> {
        self.actions.iter().find(|a| a.clip().name == clip_name)
    }

    pub fn actions(&self) -> impl Iterator<Item = &AnimationAction> {
        self.actions.iter()
    }

    #[must_use]
    pub fn is_running(&self, clip_name: &str) -> bool {
        self.existing_action(clip_name).is_some_and(AnimationAction::is_running)
    }

    pub fn stop_all_action(&mut self) {
        for action in &mut self.actions {
            action.stop();
        }
    }

    /// Forgets every cached action and binding for the root.
    pub fn uncache_root(&mut self) {
        self.actions.clear();
    }

    /// Advances running actions by `dt` seconds and writes the sampled
    /// values into the scene.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        let dt = dt * self.time_scale;

        for action in &mut self.actions {
            if !action.is_running() {
                continue;
            }
            action.update(dt);

            if action.weight <= 0.0 {
                continue;
            }

            for b in 0..action.bindings.len() {
                let (track_index, node_handle, target) = {
                    let binding = &action.bindings[b];
                    (binding.track_index, binding.node_handle, binding.target)
                };
                let Some(value) = action.sample_track(track_index) else {
                    continue;
                };
                apply_value(scene, node_handle, target, value);
            }
        }
    }
}

fn apply_value(scene: &mut Scene, node_handle: NodeHandle, target: TargetPath, value: TrackValue) {
    match (target, value) {
        (TargetPath::Translation, TrackValue::Vector3(v)) => {
            if let Some(node) = scene.get_node_mut(node_handle) {
                node.transform.position = v;
            }
        }
        (TargetPath::Scale, TrackValue::Vector3(v)) => {
            if let Some(node) = scene.get_node_mut(node_handle) {
                node.transform.scale = v;
            }
        }
        (TargetPath::Rotation, TrackValue::Quaternion(q)) => {
            if let Some(node) = scene.get_node_mut(node_handle) {
                node.transform.rotation = q;
            }
        }
        (TargetPath::Weights, TrackValue::MorphWeights(weights)) => {
            // A multi-primitive mesh is a group whose children carry the primitives
            let Some(node) = scene.get_node(node_handle) else {
                return;
            };
            let targets: Vec<_> = match node.kind {
                NodeKind::Mesh(key) => vec![key],
                NodeKind::Group => node
                    .children()
                    .iter()
                    .filter_map(|&c| scene.get_node(c).and_then(|n| n.mesh()))
                    .collect(),
                NodeKind::Camera(_) | NodeKind::Light(_) => Vec::new(),
            };
            for key in targets {
                if let Some(mesh) = scene.meshes.get_mut(key) {
                    mesh.set_morph_target_influences(&weights.weights);
                }
            }
        }
        (target, _) => {
            log::trace!("Track value does not match target {}", target.as_str());
        }
    }
}
