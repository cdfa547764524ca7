//! Playback state for the animation player

use std::time::Duration;

use crate::error::{GlbError, Result};

/// Default ticks per second
pub const DEFAULT_FPS: f32 = 30.0;

/// Playback mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PlayState {
    Play,
    #[default]
    Stop,
    Pause,
}

/// What happens when time runs past either end of the animation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LoopType {
    /// Hold the boundary frame
    #[default]
    Clamp,
    /// Wrap around to the other end
    Loop,
}

impl LoopType {
    /// Map a raw time onto [0, duration] according to this policy
    pub fn resolve(self, time: f32, duration: f32) -> f32 {
        match self {
            Self::Clamp => time.clamp(0.0, duration),
            Self::Loop => {
                if duration <= 0.0 {
                    0.0
                } else if time > duration || time < 0.0 {
                    time.rem_euclid(duration)
                } else {
                    time
                }
            }
        }
    }
}

/// Settings applied when a player is created
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSettings {
    /// Scheduled ticks per second
    pub fps: f32,
    /// Playback speed multiplier; negative plays in reverse
    pub speed: f32,
    pub loop_type: LoopType,
}

impl PlayerSettings {
    pub fn with_fps(mut self, fps: f32) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_loop_type(mut self, loop_type: LoopType) -> Self {
        self.loop_type = loop_type;
        self
    }
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            speed: 1.0,
            loop_type: LoopType::Clamp,
        }
    }
}

/// Seconds between ticks for a frame rate, rejecting non-finite or
/// non-positive rates
pub fn frame_duration(fps: f32) -> Result<Duration> {
    if !fps.is_finite() || fps <= 0.0 {
        return Err(GlbError::InvalidFrameRate(fps));
    }
    match Duration::try_from_secs_f32(1.0 / fps) {
        Ok(period) if !period.is_zero() => Ok(period),
        _ => Err(GlbError::InvalidFrameRate(fps)),
    }
}
