//! Builds animations and the rest pose from a decoded document

use std::collections::HashMap;

use glam::{Mat4, Quat, Vec3};
use log::{debug, warn};

use crate::accessor::AccessorReader;
use crate::animation::{Animation, KeyFrame, RestPoseNode, Track};
use crate::document::{AnimationDef, Document, Interpolation};
use crate::error::{GlbError, ParseWarning, Result};

/// Collects non-fatal warnings during a parse, or fails on the first one
/// when strict
#[derive(Debug, Default)]
pub struct Diagnostics {
    strict: bool,
    warnings: Vec<ParseWarning>,
}

impl Diagnostics {
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            warnings: Vec::new(),
        }
    }

    /// Record a warning. Returns [`GlbError::Policy`] in strict mode.
    pub fn warn(&mut self, warning: ParseWarning) -> Result<()> {
        warn!("{warning}");
        if self.strict {
            return Err(warning.into());
        }
        self.warnings.push(warning);
        Ok(())
    }

    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<ParseWarning> {
        self.warnings
    }
}

/// Name of a node, or `node_<index>` if it has none
pub fn node_name(document: &Document, index: usize) -> String {
    document
        .nodes
        .get(index)
        .and_then(|node| node.name.clone())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("node_{index}"))
}

/// Read the bind-time transform of every node, in document order.
///
/// Missing TRS fields use the glTF defaults. A node with a `matrix` and no
/// TRS is decomposed from the matrix.
pub fn build_rest_pose(document: &Document) -> Vec<RestPoseNode> {
    document
        .nodes
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let name = node_name(document, index);
            let has_trs = node.translation.is_some() || node.rotation.is_some() || node.scale.is_some();

            let (scale, rotation, translation) = match node.matrix {
                Some(matrix) if !has_trs => {
                    Mat4::from_cols_array(&matrix).to_scale_rotation_translation()
                }
                _ => (
                    node.scale.map_or(Vec3::ONE, Vec3::from_array),
                    node.rotation.map_or(Quat::IDENTITY, Quat::from_array),
                    node.translation.map_or(Vec3::ZERO, Vec3::from_array),
                ),
            };

            RestPoseNode {
                name,
                translation,
                rotation,
                scale,
            }
        })
        .collect()
}

/// Build every animation declared in the document
pub fn build_animations(
    document: &Document,
    blob: &[u8],
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Animation>> {
    let reader = AccessorReader::new(document, blob);
    document
        .animations
        .iter()
        .enumerate()
        .map(|(index, def)| build_animation(document, &reader, index, def, diagnostics))
        .collect()
}

fn build_animation(
    document: &Document,
    reader: &AccessorReader<'_>,
    index: usize,
    def: &AnimationDef,
    diagnostics: &mut Diagnostics,
) -> Result<Animation> {
    let name = def
        .name
        .clone()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("animation_{index}"));

    let mut duration = 0.0f32;
    let mut tracks: Vec<Track> = Vec::new();
    let mut track_index: HashMap<String, usize> = HashMap::new();

    for (channel_index, channel) in def.channels.iter().enumerate() {
        let target = channel.target.node.filter(|&node| node < document.nodes.len());
        let Some(node) = target else {
            diagnostics.warn(ParseWarning::MissingTargetNode {
                animation: name.clone(),
                channel: channel_index,
                node: channel.target.node,
            })?;
            continue;
        };

        let node_name = node_name(document, node);
        let track_slot = *track_index.entry(node_name.clone()).or_insert_with(|| {
            tracks.push(Track::new(node_name.clone()));
            tracks.len() - 1
        });

        let sampler = def.samplers.get(channel.sampler).ok_or_else(|| {
            GlbError::ReferenceError(format!(
                "animation '{name}' channel {channel_index} uses missing sampler {}",
                channel.sampler
            ))
        })?;

        let timestamps = reader.read_scalars(sampler.input, diagnostics)?;
        duration = timestamps.iter().copied().fold(duration, f32::max);

        let path = channel.target.path.as_str();
        let expected = match path {
            "translation" | "scale" => 3,
            "rotation" => 4,
            _ => {
                diagnostics.warn(ParseWarning::UnknownAnimationTarget {
                    animation: name.clone(),
                    channel: channel_index,
                    path: path.to_string(),
                })?;
                continue;
            }
        };

        let mut values = reader.read_values(sampler.output, diagnostics)?;
        if sampler.interpolation == Interpolation::Cubicspline {
            values = values.every_nth(3, 1);
        }
        if values.width() != expected {
            diagnostics.warn(ParseWarning::UnexpectedAccessorType {
                animation: name.clone(),
                channel: channel_index,
                path: path.to_string(),
                expected,
                actual: values.width(),
            })?;
            continue;
        }

        if timestamps.len() != values.len() {
            diagnostics.warn(ParseWarning::KeyCountMismatch {
                animation: name.clone(),
                channel: channel_index,
                timestamps: timestamps.len(),
                values: values.len(),
            })?;
        }

        let track = &mut tracks[track_slot];
        match path {
            "rotation" => {
                let quats = values.to_quats().unwrap_or_default();
                track.rotation_keys.extend(keyframes(&timestamps, quats));
            }
            "translation" => {
                let vectors = values.to_vec3s().unwrap_or_default();
                track.translation_keys.extend(keyframes(&timestamps, vectors));
            }
            _ => {
                let vectors = values.to_vec3s().unwrap_or_default();
                track.scale_keys.extend(keyframes(&timestamps, vectors));
            }
        }
    }

    debug!(
        "Built animation '{}': {} tracks, {:.3}s",
        name,
        tracks.len(),
        duration
    );

    Ok(Animation::new(name, duration, tracks))
}

fn keyframes<'a, T: 'a>(
    timestamps: &'a [f32],
    values: Vec<T>,
) -> impl Iterator<Item = KeyFrame<T>> + 'a {
    timestamps
        .iter()
        .zip(values)
        .map(|(&time, value)| KeyFrame::new(time, value))
}
