use crate::animation::clip::{AnimationClip, TargetPath, TrackTarget};
use crate::scene::{NodeHandle, Scene};

/// Binding relationship: maps track `track_index` of a clip to the target
/// property of `node_handle`.
#[derive(Debug, Clone)]
pub struct PropertyBinding {
    pub track_index: usize,
    pub node_handle: NodeHandle,
    pub target: TargetPath,
}

pub struct Binder;

impl Binder {
    /// Resolves the tracks of `clip` against the subtree of `root`.
    ///
    /// Tracks whose node cannot be found are skipped; first match in
    /// traversal order wins.
    #[must_use]
    pub fn bind(scene: &Scene, root: NodeHandle, clip: &AnimationClip) -> Vec<PropertyBinding> {
        let subtree = scene.subtree(root);
        let mut bindings = Vec::with_capacity(clip.tracks.len());

        for (track_index, track) in clip.tracks.iter().enumerate() {
            let found = subtree.iter().copied().find(|&handle| {
                scene.get_node(handle).is_some_and(|node| match &track.meta.node {
                    TrackTarget::Name(name) => &node.name == name,
                    TrackTarget::Uuid(uuid) => &node.uuid == uuid,
                })
            });

            match found {
                Some(node_handle) => bindings.push(PropertyBinding {
                    track_index,
                    node_handle,
                    target: track.meta.target,
                }),
                None => log::debug!(
                    "Clip `{}`: no node for track {track_index} ({})",
                    clip.name,
                    track.meta.target.as_str()
                ),
            }
        }

        bindings
    }
}
