use std::io;
use std::str::Utf8Error;
use thiserror::Error;

/// Error types for container parsing, animation building and playback
#[derive(Error, Debug)]
pub enum GlbError {
    /// I/O error while obtaining the container bytes
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The buffer is too short for the fixed headers, or a declared chunk
    /// length runs past the end of the buffer
    #[error("Malformed container: {0}")]
    MalformedContainer(String),

    /// An accessor reads past the end of the binary chunk
    #[error(
        "Truncated buffer: {needed} bytes requested at offset {offset}, but only {available} bytes available"
    )]
    TruncatedBuffer {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// The JSON chunk is not valid UTF-8
    #[error("Invalid UTF-8 in JSON chunk: {0}")]
    InvalidUtf8(#[from] Utf8Error),

    /// The JSON chunk does not match the document schema
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reference error: a document index points at nothing
    #[error("Reference error: {0}")]
    ReferenceError(String),

    /// A track animates a node that has no rest pose
    #[error("Animation '{animation}' has a track for node '{node}' which is missing from the rest pose")]
    MissingRestPose { animation: String, node: String },

    /// No animation with the requested name exists in the set
    #[error("Animation not found: {0}")]
    AnimationNotFound(String),

    /// A player cannot be built over a set without animations
    #[error("Animation set contains no animations")]
    EmptyAnimationSet,

    /// Frame rate must be finite and positive
    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(f32),

    /// A non-fatal parse warning promoted to an error by strict parsing
    #[error("Policy violation: {0}")]
    Policy(#[from] ParseWarning),

    /// The location names a source this build cannot read
    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),

    /// HTTP error while fetching a remote container
    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Non-fatal conditions found while building animations.
///
/// The default parser logs these at `warn` level and keeps going; a strict
/// parser turns the first one into [`GlbError::Policy`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseWarning {
    /// Accessor declares a component type other than 32-bit float; the data
    /// is decoded as float anyway
    #[error("accessor {accessor} has component type {component_type}, decoding as float32")]
    UnsupportedComponentType { accessor: usize, component_type: u32 },

    /// Channel targets a node index that does not exist
    #[error("animation '{animation}' channel {channel} targets missing node {node:?}")]
    MissingTargetNode {
        animation: String,
        channel: usize,
        node: Option<usize>,
    },

    /// Channel targets a path other than translation, rotation or scale
    #[error("animation '{animation}' channel {channel} targets unsupported path '{path}'")]
    UnknownAnimationTarget {
        animation: String,
        channel: usize,
        path: String,
    },

    /// Output accessor width does not fit the targeted path
    #[error("animation '{animation}' channel {channel}: {path} needs {expected} components, accessor has {actual}")]
    UnexpectedAccessorType {
        animation: String,
        channel: usize,
        path: String,
        expected: usize,
        actual: usize,
    },

    /// Timestamps and values disagree in length; the shorter one wins
    #[error("animation '{animation}' channel {channel}: {timestamps} timestamps but {values} values")]
    KeyCountMismatch {
        animation: String,
        channel: usize,
        timestamps: usize,
        values: usize,
    },
}

/// Result type using GlbError
pub type Result<T> = std::result::Result<T, GlbError>;
