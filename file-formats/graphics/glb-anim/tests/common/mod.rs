//! Synthetic GLB fixtures

#![allow(dead_code)]

use glb_anim::write_container;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

/// Accumulates nodes, float accessors and animations, then writes a GLB
#[derive(Default)]
pub struct GlbBuilder {
    nodes: Vec<Value>,
    accessors: Vec<Value>,
    buffer_views: Vec<Value>,
    animations: Vec<Value>,
    blob: Vec<u8>,
}

impl GlbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its index
    pub fn node(&mut self, node: Value) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Append float data behind its own buffer view and return the accessor index
    pub fn accessor(&mut self, accessor_type: &str, values: &[f32]) -> usize {
        let width = match accessor_type {
            "SCALAR" => 1,
            "VEC3" => 3,
            _ => 4,
        };
        self.buffer_views.push(json!({
            "buffer": 0,
            "byteOffset": self.blob.len(),
            "byteLength": values.len() * 4,
        }));
        self.blob
            .extend(values.iter().flat_map(|v| v.to_le_bytes()));
        self.accessors.push(json!({
            "bufferView": self.buffer_views.len() - 1,
            "componentType": 5126,
            "count": values.len() / width,
            "type": accessor_type,
        }));
        self.accessors.len() - 1
    }

    /// Add an animation with one sampler per channel.
    ///
    /// Each channel is (node, path, input accessor, output accessor).
    pub fn animation(&mut self, name: &str, channels: &[(usize, &str, usize, usize)]) {
        let samplers: Vec<Value> = channels
            .iter()
            .map(|&(_, _, input, output)| json!({"input": input, "output": output}))
            .collect();
        let channels: Vec<Value> = channels
            .iter()
            .enumerate()
            .map(|(i, &(node, path, _, _))| {
                json!({"sampler": i, "target": {"node": node, "path": path}})
            })
            .collect();
        self.animations.push(json!({
            "name": name,
            "channels": channels,
            "samplers": samplers,
        }));
    }

    pub fn document(&self) -> Value {
        json!({
            "asset": {"version": "2.0"},
            "nodes": self.nodes,
            "animations": self.animations,
            "accessors": self.accessors,
            "bufferViews": self.buffer_views,
            "buffers": [{"byteLength": self.blob.len()}],
        })
    }

    pub fn build(&self) -> Vec<u8> {
        write_container(&self.document().to_string(), &self.blob)
    }
}

/// Node "Root" at identity rest pose animated by "Walk": translation keys
/// (0, (0,0,0)) and (1, (2,0,0))
pub fn walk_fixture() -> GlbBuilder {
    let mut glb = GlbBuilder::new();
    let root = glb.node(json!({"name": "Root"}));
    let times = glb.accessor("SCALAR", &[0.0, 1.0]);
    let values = glb.accessor("VEC3", &[0.0, 0.0, 0.0, 2.0, 0.0, 0.0]);
    glb.animation("Walk", &[(root, "translation", times, values)]);
    glb
}

/// Route library logs through the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Write bytes into a temporary directory
pub fn write_temp(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("Failed to write test file");
    path
}
