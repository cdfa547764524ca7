//! Animation extraction and playback for binary glTF (GLB) containers.
//!
//! A GLB buffer is split into its JSON document and binary chunk, accessor
//! data is decoded from the binary chunk, and the animations it describes
//! are assembled into an [`AnimationSet`] together with the rest pose of
//! every node. An [`AnimationPlayer`] samples that set over time and yields
//! per-node transforms relative to the rest pose.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use glb_anim::{AnimationParser, AnimationPlayer, FileSource, load_animation_set};
//!
//! let set = load_animation_set(&FileSource::new("fox.glb"), &AnimationParser::new()).await?;
//! let mut player = AnimationPlayer::with_manual_scheduler(Arc::new(set))?;
//! player.set_time(0.5);
//! ```

pub mod accessor;
pub mod animation;
pub mod builder;
pub mod container;
pub mod document;
pub mod error;
pub mod parser;
pub mod scheduler;
pub mod source;

pub use animation::{
    Animation, AnimationPlayer, AnimationSet, KeyFrame, LoopType, NodeTransform, PlayState,
    PlayerSettings, RestPoseNode, Track,
};
pub use container::{Container, parse_container, write_container};
pub use error::{GlbError, ParseWarning, Result};
pub use parser::AnimationParser;
pub use scheduler::{ManualScheduler, TickHandle, TickScheduler};
#[cfg(feature = "http")]
pub use source::HttpSource;
pub use source::{ByteSource, FileSource, Source, load_animation_set};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
