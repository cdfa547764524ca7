//! Animation data and playback
//!
//! This module provides:
//! - Keyframe, track and animation types built from a GLB document
//! - Keyframe bracketing and rest-relative sampling
//! - A playback engine with clamp/loop policies driven by external ticks
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use glb_anim::{AnimationParser, AnimationPlayer, LoopType};
//!
//! let set = AnimationParser::new().parse(&bytes)?;
//! let mut player = AnimationPlayer::with_manual_scheduler(Arc::new(set))?;
//! player.set_loop_type(LoopType::Loop);
//! player.play_animation("Walk")?;
//!
//! // once per scheduled period
//! player.tick();
//! for (node, transform) in player.transforms() {
//!     println!("{node}: {:?}", transform.translation);
//! }
//! ```

mod interpolation;
mod player;
mod state;
mod types;

pub use interpolation::{bracket, sample_channel};
pub use player::{AnimationPlayer, PlaybackState};
pub use state::{DEFAULT_FPS, LoopType, PlayState, PlayerSettings, frame_duration};
pub use types::{
    Animation, AnimationSet, Interpolate, KeyFrame, NodeTransform, RestPoseNode, Track,
    rest_inverse,
};
