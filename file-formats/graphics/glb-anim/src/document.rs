//! The subset of the glTF JSON document read by the animation builder
//!
//! Meshes, materials, textures and skins are not modelled; serde skips
//! every field that is not listed here.

use serde::Deserialize;

use crate::error::{GlbError, Result};

/// Component type code for 32-bit floats
pub const COMPONENT_TYPE_FLOAT: u32 = 5126;

/// Top-level document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub animations: Vec<AnimationDef>,
    #[serde(default)]
    pub accessors: Vec<Accessor>,
    #[serde(default)]
    pub buffer_views: Vec<BufferView>,
}

impl Document {
    /// Parse a document from its JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Look up an accessor by index
    pub fn accessor(&self, index: usize) -> Result<&Accessor> {
        self.accessors
            .get(index)
            .ok_or_else(|| GlbError::ReferenceError(format!("accessor {index} does not exist")))
    }

    /// Look up a buffer view by index
    pub fn buffer_view(&self, index: usize) -> Result<&BufferView> {
        self.buffer_views.get(index).ok_or_else(|| {
            GlbError::ReferenceError(format!("buffer view {index} does not exist"))
        })
    }
}

/// Scene node; only the name and local transform are read
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Node {
    pub name: Option<String>,
    pub translation: Option<[f32; 3]>,
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
    /// Column-major 4x4 local matrix, used when TRS is absent
    pub matrix: Option<[f32; 16]>,
}

/// Animation definition
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnimationDef {
    pub name: Option<String>,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub samplers: Vec<Sampler>,
}

/// Binds a sampler to a node property
#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    pub sampler: usize,
    pub target: ChannelTarget,
}

/// Node and property animated by a channel
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelTarget {
    pub node: Option<usize>,
    pub path: String,
}

/// Pairs a timestamp accessor with a value accessor
#[derive(Debug, Clone, Deserialize)]
pub struct Sampler {
    pub input: usize,
    pub output: usize,
    #[serde(default)]
    pub interpolation: Interpolation,
}

/// Sampler interpolation mode as declared in the document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
    /// Outputs are stored as (in-tangent, value, out-tangent) triplets
    Cubicspline,
}

/// Typed view into a buffer view
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessor {
    pub buffer_view: Option<usize>,
    #[serde(default)]
    pub byte_offset: usize,
    pub component_type: u32,
    pub count: usize,
    #[serde(rename = "type")]
    pub accessor_type: String,
}

impl Accessor {
    /// Number of components per element for the declared type
    pub fn component_count(&self) -> usize {
        match self.accessor_type.as_str() {
            "SCALAR" => 1,
            "VEC2" => 2,
            "VEC3" => 3,
            "MAT2" => 4,
            "MAT3" => 9,
            "MAT4" => 16,
            _ => 4,
        }
    }

    pub fn is_float(&self) -> bool {
        self.component_type == COMPONENT_TYPE_FLOAT
    }
}

/// Byte range inside the binary chunk
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    #[serde(default)]
    pub byte_offset: usize,
}
