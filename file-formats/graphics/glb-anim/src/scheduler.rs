//! Periodic tick scheduling
//!
//! The player never owns a timer. It asks a [`TickScheduler`] to start a
//! periodic tick when playback begins and cancels it on stop; whoever drives
//! the scheduler calls [`AnimationPlayer::tick`](crate::AnimationPlayer::tick)
//! once per period. Cancellation is synchronous, so no tick is delivered for
//! a handle after `cancel` returns.

use std::collections::HashMap;
use std::time::Duration;

/// Identifies one scheduled periodic tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

impl TickHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Source of periodic ticks
pub trait TickScheduler {
    /// Start a periodic tick
    fn schedule(&mut self, period: Duration) -> TickHandle;

    /// Stop a periodic tick. Unknown handles are ignored.
    fn cancel(&mut self, handle: TickHandle);
}

/// Scheduler that only records registrations; the host loop (or a test)
/// delivers ticks itself
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    active: HashMap<TickHandle, Duration>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a handle is still scheduled
    pub fn is_active(&self, handle: TickHandle) -> bool {
        self.active.contains_key(&handle)
    }

    /// Period a handle was scheduled with
    pub fn period(&self, handle: TickHandle) -> Option<Duration> {
        self.active.get(&handle).copied()
    }

    /// Number of ticks currently scheduled
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of ticks ever scheduled
    pub fn scheduled_total(&self) -> u64 {
        self.next_id
    }
}

impl TickScheduler for ManualScheduler {
    fn schedule(&mut self, period: Duration) -> TickHandle {
        let handle = TickHandle(self.next_id);
        self.next_id += 1;
        self.active.insert(handle, period);
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.active.remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_and_cancel() {
        let mut scheduler = ManualScheduler::new();
        let a = scheduler.schedule(Duration::from_millis(20));
        let b = scheduler.schedule(Duration::from_millis(40));
        assert_ne!(a, b);
        assert_eq!(scheduler.active_count(), 2);
        assert_eq!(scheduler.period(b), Some(Duration::from_millis(40)));

        scheduler.cancel(a);
        assert!(!scheduler.is_active(a));
        assert!(scheduler.is_active(b));

        // Cancelling twice is harmless
        scheduler.cancel(a);
        assert_eq!(scheduler.active_count(), 1);
        assert_eq!(scheduler.scheduled_total(), 2);
    }
}
