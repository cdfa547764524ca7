//! Formatting utilities

use glam::{Quat, Vec3};
use glb_anim::{LoopType, PlayState};
use humansize::{DECIMAL, format_size};

/// Format file size in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

/// Format a duration in seconds
pub fn format_seconds(seconds: f32) -> String {
    format!("{seconds:.3}s")
}

/// Format vector components
pub fn format_vec3(v: Vec3) -> String {
    format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
}

/// Format quaternion components as (x, y, z, w)
pub fn format_quat(q: Quat) -> String {
    format!("({:.3}, {:.3}, {:.3}, {:.3})", q.x, q.y, q.z, q.w)
}

pub fn format_loop_type(loop_type: LoopType) -> &'static str {
    match loop_type {
        LoopType::Clamp => "clamp",
        LoopType::Loop => "loop",
    }
}

pub fn format_play_state(state: PlayState) -> &'static str {
    match state {
        PlayState::Play => "playing",
        PlayState::Stop => "stopped",
        PlayState::Pause => "paused",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1024), "1.02 kB");
    }

    #[test]
    fn test_format_components() {
        assert_eq!(format_vec3(Vec3::new(1.0, 0.5, -2.0)), "(1.000, 0.500, -2.000)");
        assert_eq!(format_quat(Quat::IDENTITY), "(0.000, 0.000, 0.000, 1.000)");
        assert_eq!(format_seconds(1.5), "1.500s");
    }
}
