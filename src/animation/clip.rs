use glam::{Quat, Vec3};
use uuid::Uuid;

use crate::animation::tracks::KeyframeTrack;
use crate::animation::values::MorphWeightData;

/// Node property a track drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    /// `transform.position`
    Translation,
    /// `transform.rotation`
    Rotation,
    /// `transform.scale`
    Scale,
    /// Morph target influences of the node's mesh
    Weights,
}

impl TargetPath {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TargetPath::Translation => "position",
            TargetPath::Rotation => "quaternion",
            TargetPath::Scale => "scale",
            TargetPath::Weights => "morphTargetInfluences",
        }
    }
}

/// How a track finds its node when the clip is bound.
///
/// Named nodes are matched by name; unnamed ones by their uuid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackTarget {
    Name(String),
    Uuid(Uuid),
}

#[derive(Debug, Clone)]
pub struct TrackMeta {
    pub node: TrackTarget,
    pub target: TargetPath,
}

#[derive(Debug, Clone)]
pub enum TrackData {
    Vector3(KeyframeTrack<Vec3>),
    Quaternion(KeyframeTrack<Quat>),
    MorphWeights(KeyframeTrack<MorphWeightData>),
}

impl TrackData {
    fn end_time(&self) -> f32 {
        let times = match self {
            TrackData::Vector3(track) => &track.times,
            TrackData::Quaternion(track) => &track.times,
            TrackData::MorphWeights(track) => &track.times,
        };
        times.last().copied().unwrap_or(0.0)
    }
}

/// A track: where it applies plus its keyframes.
#[derive(Debug, Clone)]
pub struct Track {
    pub meta: TrackMeta,
    pub data: TrackData,
}

/// A named, time-parameterized set of tracks.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    /// End of the longest track, in seconds
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    #[must_use]
    pub fn new(name: String, tracks: Vec<Track>) -> Self {
        let duration = tracks
            .iter()
            .map(|t| t.data.end_time())
            .fold(0.0_f32, f32::max);

        Self {
            name,
            duration,
            tracks,
        }
    }
}
