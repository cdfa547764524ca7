//! Common types for the animation system

use std::collections::HashMap;

use glam::{Quat, Vec3, Vec4};

use crate::error::{GlbError, Result};

/// A single keyframe: an absolute target value at a point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyFrame<T> {
    /// Time in seconds
    pub time: f32,
    pub value: T,
}

impl<T> KeyFrame<T> {
    pub const fn new(time: f32, value: T) -> Self {
        Self { time, value }
    }
}

/// Trait for channel values that can be interpolated and made relative to a
/// rest pose
pub trait Interpolate: Copy {
    /// Interpolate between self and other
    fn interpolate(&self, other: &Self, t: f32) -> Self;

    /// Remove the rest pose from an absolute value
    fn relative_to(&self, rest: &Self) -> Self;
}

impl Interpolate for Vec3 {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        self.lerp(*other, t)
    }

    fn relative_to(&self, rest: &Self) -> Self {
        *self - *rest
    }
}

impl Interpolate for Quat {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        // glam takes the shorter arc
        self.slerp(*other, t)
    }

    fn relative_to(&self, rest: &Self) -> Self {
        *self * rest_inverse(*rest)
    }
}

/// Inverse of a rest rotation: conjugate divided by squared length.
///
/// Unlike `Quat::inverse` this does not assume a unit quaternion. A zero
/// quaternion maps to identity.
pub fn rest_inverse(rotation: Quat) -> Quat {
    let length_squared = rotation.length_squared();
    if length_squared <= f32::EPSILON {
        return Quat::IDENTITY;
    }
    Quat::from_vec4(Vec4::from(rotation.conjugate()) / length_squared)
}

/// Keyframe curves for one node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub node_name: String,
    pub translation_keys: Vec<KeyFrame<Vec3>>,
    /// Quaternions stored as (x, y, z, w)
    pub rotation_keys: Vec<KeyFrame<Quat>>,
    pub scale_keys: Vec<KeyFrame<Vec3>>,
}

impl Track {
    /// Create an empty track
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            ..Self::default()
        }
    }

    /// Check if the track has no keys on any channel
    pub fn is_empty(&self) -> bool {
        self.translation_keys.is_empty() && self.rotation_keys.is_empty() && self.scale_keys.is_empty()
    }

    /// Total number of keys over all channels
    pub fn key_count(&self) -> usize {
        self.translation_keys.len() + self.rotation_keys.len() + self.scale_keys.len()
    }

    /// Latest key time over all channels (0 for an empty track)
    pub fn max_time(&self) -> f32 {
        self.translation_keys
            .iter()
            .map(|k| k.time)
            .chain(self.rotation_keys.iter().map(|k| k.time))
            .chain(self.scale_keys.iter().map(|k| k.time))
            .fold(0.0, f32::max)
    }
}

/// A named animation: one track per animated node
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    name: String,
    duration: f32,
    tracks: Vec<Track>,
    track_index: HashMap<String, usize>,
}

impl Animation {
    /// Create an animation with a precomputed duration.
    ///
    /// Negative or NaN durations are stored as 0. Tracks sharing a node name
    /// keep their order; lookups by name find the last one.
    pub fn new(name: impl Into<String>, duration: f32, tracks: Vec<Track>) -> Self {
        let track_index = tracks
            .iter()
            .enumerate()
            .map(|(i, track)| (track.node_name.clone(), i))
            .collect();
        Self {
            name: name.into(),
            duration: duration.max(0.0),
            tracks,
            track_index,
        }
    }

    /// Create an animation whose duration is the latest key time in `tracks`
    pub fn from_tracks(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        let duration = tracks.iter().map(Track::max_time).fold(0.0, f32::max);
        Self::new(name, duration, tracks)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Duration in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Get the track animating a node
    pub fn track(&self, node_name: &str) -> Option<&Track> {
        self.track_index.get(node_name).map(|&i| &self.tracks[i])
    }
}

/// Bind-time transform of a node
#[derive(Debug, Clone, PartialEq)]
pub struct RestPoseNode {
    pub name: String,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl RestPoseNode {
    /// A node at the origin with no rotation and unit scale
    pub fn identity(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Per-node output of the player, relative to the rest pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl NodeTransform {
    /// The transform applied when no animation is playing
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Animations plus the rest pose they animate.
///
/// Read-only after construction; players share it through an `Arc`.
#[derive(Debug, Clone)]
pub struct AnimationSet {
    animations: Vec<Animation>,
    nodes: Vec<RestPoseNode>,
    node_index: HashMap<String, usize>,
    /// bindings[animation][track] => index into `nodes`
    bindings: Vec<Vec<usize>>,
}

impl AnimationSet {
    /// Build a set, resolving every track to its rest-pose node.
    ///
    /// Fails with [`GlbError::MissingRestPose`] if a track names a node that
    /// is not in `nodes`. When node names repeat, the last node wins.
    pub fn new(animations: Vec<Animation>, nodes: Vec<RestPoseNode>) -> Result<Self> {
        let node_index: HashMap<String, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.name.clone(), i))
            .collect();

        let bindings = animations
            .iter()
            .map(|animation| {
                animation
                    .tracks()
                    .iter()
                    .map(|track| {
                        node_index.get(&track.node_name).copied().ok_or_else(|| {
                            GlbError::MissingRestPose {
                                animation: animation.name().to_string(),
                                node: track.node_name.clone(),
                            }
                        })
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            animations,
            nodes,
            node_index,
            bindings,
        })
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    /// Find an animation index by name
    pub fn animation_index(&self, name: &str) -> Option<usize> {
        self.animations.iter().position(|a| a.name() == name)
    }

    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animation_index(name).map(|i| &self.animations[i])
    }

    /// Rest-pose nodes in document order
    pub fn nodes(&self) -> &[RestPoseNode] {
        &self.nodes
    }

    /// Look up a rest-pose node by name
    pub fn node(&self, name: &str) -> Option<&RestPoseNode> {
        self.node_index.get(name).map(|&i| &self.nodes[i])
    }

    /// Unique node names
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.node_index.keys().map(String::as_str)
    }

    /// Rest-pose node indices for each track of an animation
    pub(crate) fn bindings(&self, animation: usize) -> &[usize] {
        &self.bindings[animation]
    }
}
