//! Keyframe sampling for animation channels

use super::types::{Interpolate, KeyFrame};

/// Find the pair of keyframes bracketing `time`
///
/// Returns None if the channel has no keyframes. Outside the key range, and
/// for single-key channels, both entries are the same boundary key. Keys are
/// assumed sorted by time; if they are not, some pair is still returned.
pub fn bracket<T>(keys: &[KeyFrame<T>], time: f32) -> Option<(&KeyFrame<T>, &KeyFrame<T>)> {
    let first = keys.first()?;
    let last = keys.last()?;

    if keys.len() == 1 || time < first.time {
        return Some((first, first));
    }
    if time > last.time {
        return Some((last, last));
    }

    // First key at or after `time`
    let index = keys.partition_point(|k| k.time < time);
    if index == 0 {
        Some((&keys[0], &keys[1]))
    } else {
        Some((&keys[index - 1], &keys[index]))
    }
}

/// Sample a channel at `time`, relative to the node's rest value
///
/// Returns None if the channel has no keyframes, in which case the caller
/// keeps whatever it had before.
#[allow(clippy::float_cmp)]
pub fn sample_channel<T: Interpolate>(keys: &[KeyFrame<T>], time: f32, rest: T) -> Option<T> {
    let (start, end) = bracket(keys, time)?;
    let start_delta = start.value.relative_to(&rest);

    if start.time == end.time {
        return Some(start_delta);
    }

    let t = (time - start.time) / (end.time - start.time);
    let end_delta = end.value.relative_to(&rest);
    Some(start_delta.interpolate(&end_delta, t))
}
