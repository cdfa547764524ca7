//! Animation playback engine

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace, warn};

use super::interpolation::sample_channel;
use super::state::{LoopType, PlayState, PlayerSettings, frame_duration};
use super::types::{Animation, AnimationSet, NodeTransform};
use crate::error::{GlbError, Result};
use crate::scheduler::{ManualScheduler, TickHandle, TickScheduler};

/// Mutable playback state owned by a player
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub play_state: PlayState,
    pub loop_type: LoopType,
    /// Index into the set's animations
    pub current_animation: usize,
    /// Seconds into the current animation
    pub current_time: f32,
    pub speed: f32,
    /// Seconds between ticks
    pub frame_duration: Duration,
    /// Scheduled tick, present from the first `play` until `stop`
    pub tick_handle: Option<TickHandle>,
}

/// Plays the animations of an [`AnimationSet`] and produces per-node
/// transforms relative to the rest pose.
///
/// The player starts stopped on the first animation at time 0 with every
/// node at [`NodeTransform::IDENTITY`].
#[derive(Debug)]
pub struct AnimationPlayer<S: TickScheduler = ManualScheduler> {
    set: Arc<AnimationSet>,
    scheduler: S,
    state: PlaybackState,
    transforms: HashMap<String, NodeTransform>,
}

impl AnimationPlayer<ManualScheduler> {
    /// Create a player with default settings and a manual scheduler
    pub fn with_manual_scheduler(set: Arc<AnimationSet>) -> Result<Self> {
        Self::new(set, ManualScheduler::new())
    }
}

impl<S: TickScheduler> AnimationPlayer<S> {
    /// Create a player with default settings
    pub fn new(set: Arc<AnimationSet>, scheduler: S) -> Result<Self> {
        Self::with_settings(set, scheduler, PlayerSettings::default())
    }

    /// Create a player with explicit settings
    pub fn with_settings(
        set: Arc<AnimationSet>,
        scheduler: S,
        settings: PlayerSettings,
    ) -> Result<Self> {
        if set.animations().is_empty() {
            return Err(GlbError::EmptyAnimationSet);
        }

        let state = PlaybackState {
            play_state: PlayState::Stop,
            loop_type: settings.loop_type,
            current_animation: 0,
            current_time: 0.0,
            speed: settings.speed,
            frame_duration: frame_duration(settings.fps)?,
            tick_handle: None,
        };

        let transforms = set
            .node_names()
            .map(|name| (name.to_string(), NodeTransform::IDENTITY))
            .collect();

        Ok(Self {
            set,
            scheduler,
            state,
            transforms,
        })
    }

    /// Start or resume playback of the current animation
    pub fn play(&mut self) {
        match self.state.play_state {
            PlayState::Play => {}
            PlayState::Pause => {
                debug!("Resuming '{}'", self.current_animation().name());
                self.state.play_state = PlayState::Play;
            }
            PlayState::Stop => {
                debug!(
                    "Playing '{}' from {:.3}s",
                    self.current_animation().name(),
                    self.state.current_time
                );
                self.state.play_state = PlayState::Play;
                if self.state.tick_handle.is_none() {
                    self.state.tick_handle = Some(self.scheduler.schedule(self.state.frame_duration));
                }
            }
        }
    }

    /// Switch to a named animation, then behave like [`play`](Self::play).
    ///
    /// An unknown name leaves the player untouched.
    pub fn play_animation(&mut self, name: &str) -> Result<()> {
        self.set_animation(name)?;
        self.play();
        Ok(())
    }

    /// Switch to a named animation without changing the play state
    pub fn set_animation(&mut self, name: &str) -> Result<()> {
        let index = self.set.animation_index(name).ok_or_else(|| {
            warn!("Animation '{name}' not found");
            GlbError::AnimationNotFound(name.to_string())
        })?;
        if index != self.state.current_animation {
            debug!("Switching to animation '{name}'");
            self.state.current_animation = index;
        }
        Ok(())
    }

    /// Freeze playback; only has an effect while playing
    pub fn pause(&mut self) {
        if self.state.play_state == PlayState::Play {
            debug!("Pausing at {:.3}s", self.state.current_time);
            self.state.play_state = PlayState::Pause;
        }
    }

    /// Stop playback.
    ///
    /// The tick is cancelled before this returns, every node goes back to
    /// [`NodeTransform::IDENTITY`] and time rewinds to 0.
    pub fn stop(&mut self) {
        if let Some(handle) = self.state.tick_handle.take() {
            self.scheduler.cancel(handle);
        }
        self.state.play_state = PlayState::Stop;
        self.state.current_time = 0.0;
        for transform in self.transforms.values_mut() {
            *transform = NodeTransform::IDENTITY;
        }
        debug!("Stopped");
    }

    /// Change the tick rate; the scheduled period is left as is, only the
    /// time step per tick changes
    pub fn set_fps(&mut self, fps: f32) -> Result<()> {
        self.state.frame_duration = frame_duration(fps)?;
        Ok(())
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.state.speed = speed;
    }

    pub fn set_loop_type(&mut self, loop_type: LoopType) {
        self.state.loop_type = loop_type;
    }

    /// Seek to a fraction of the current animation's duration
    pub fn set_percent(&mut self, percent: f32) {
        let percent = if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 1.0) };
        self.set_time(percent * self.current_animation().duration());
    }

    /// Seek to a time in seconds and recompute every track's transform.
    ///
    /// Ignored while paused. Times outside the animation are resolved with
    /// the loop policy.
    pub fn set_time(&mut self, time: f32) {
        if self.state.play_state == PlayState::Pause {
            return;
        }
        if !time.is_finite() {
            warn!("Ignoring non-finite time {time}");
            return;
        }

        let duration = self.current_animation().duration();
        self.state.current_time = self.state.loop_type.resolve(time, duration);
        self.apply_pose();
    }

    /// Deliver one scheduled tick: advance by `frame_duration * speed`
    pub fn tick(&mut self) {
        self.advance(self.state.frame_duration);
    }

    /// Advance by a measured wall-clock interval scaled by speed.
    ///
    /// Ignored when no tick is scheduled, so a late delivery after
    /// [`stop`](Self::stop) cannot move any node.
    pub fn advance(&mut self, elapsed: Duration) {
        if self.state.tick_handle.is_none() {
            trace!("Ignoring tick with no schedule");
            return;
        }
        let step = elapsed.as_secs_f32() * self.state.speed;
        self.set_time(self.state.current_time + step);
    }

    fn apply_pose(&mut self) {
        let index = self.state.current_animation;
        let time = self.state.current_time;
        let animation = &self.set.animations()[index];
        let nodes = self.set.nodes();

        trace!("Sampling '{}' at {:.3}s", animation.name(), time);

        for (track, &node) in animation.tracks().iter().zip(self.set.bindings(index)) {
            let rest = &nodes[node];
            let Some(output) = self.transforms.get_mut(&rest.name) else {
                continue;
            };
            if let Some(translation) =
                sample_channel(&track.translation_keys, time, rest.translation)
            {
                output.translation = translation;
            }
            if let Some(rotation) = sample_channel(&track.rotation_keys, time, rest.rotation) {
                output.rotation = rotation;
            }
            if let Some(scale) = sample_channel(&track.scale_keys, time, rest.scale) {
                output.scale = scale;
            }
        }
    }

    pub fn play_state(&self) -> PlayState {
        self.state.play_state
    }

    pub fn loop_type(&self) -> LoopType {
        self.state.loop_type
    }

    pub fn speed(&self) -> f32 {
        self.state.speed
    }

    /// Seconds between ticks
    pub fn frame_duration(&self) -> Duration {
        self.state.frame_duration
    }

    pub fn current_time(&self) -> f32 {
        self.state.current_time
    }

    pub fn current_animation(&self) -> &Animation {
        &self.set.animations()[self.state.current_animation]
    }

    pub fn tick_handle(&self) -> Option<TickHandle> {
        self.state.tick_handle
    }

    /// Full playback state
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn animation_set(&self) -> &Arc<AnimationSet> {
        &self.set
    }

    /// Current output: node name to transform relative to the rest pose
    pub fn transforms(&self) -> &HashMap<String, NodeTransform> {
        &self.transforms
    }

    pub fn transform(&self, node_name: &str) -> Option<&NodeTransform> {
        self.transforms.get(node_name)
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::types::{KeyFrame, RestPoseNode, Track};
    use glam::{Quat, Vec3};
    use pretty_assertions::assert_eq;

    fn walk_set() -> Arc<AnimationSet> {
        let walk = Animation::from_tracks(
            "Walk",
            vec![Track {
                node_name: "Root".to_string(),
                translation_keys: vec![
                    KeyFrame::new(0.0, Vec3::ZERO),
                    KeyFrame::new(1.0, Vec3::new(2.0, 0.0, 0.0)),
                ],
                ..Track::default()
            }],
        );
        let idle = Animation::from_tracks(
            "Idle",
            vec![Track {
                node_name: "Root".to_string(),
                scale_keys: vec![KeyFrame::new(0.0, Vec3::splat(2.0))],
                ..Track::default()
            }],
        );
        let nodes = vec![RestPoseNode::identity("Root"), RestPoseNode::identity("Tail")];
        Arc::new(AnimationSet::new(vec![walk, idle], nodes).unwrap())
    }

    fn player() -> AnimationPlayer {
        AnimationPlayer::with_manual_scheduler(walk_set()).unwrap()
    }

    fn root_x(player: &AnimationPlayer) -> f32 {
        player.transform("Root").unwrap().translation.x
    }

    #[test]
    fn test_initial_state() {
        let player = player();
        assert_eq!(player.play_state(), PlayState::Stop);
        assert_eq!(player.current_time(), 0.0);
        assert_eq!(player.current_animation().name(), "Walk");
        assert_eq!(player.transforms().len(), 2);
        assert_eq!(player.transform("Tail"), Some(&NodeTransform::IDENTITY));
        assert!(player.tick_handle().is_none());
    }

    #[test]
    fn test_empty_set_rejected() {
        let set = Arc::new(AnimationSet::new(vec![], vec![]).unwrap());
        assert!(matches!(
            AnimationPlayer::with_manual_scheduler(set),
            Err(GlbError::EmptyAnimationSet)
        ));
    }

    #[test]
    fn test_invalid_fps_rejected() {
        let settings = PlayerSettings::default().with_fps(0.0);
        let result = AnimationPlayer::with_settings(walk_set(), ManualScheduler::new(), settings);
        assert!(matches!(result, Err(GlbError::InvalidFrameRate(_))));
    }

    #[test]
    fn test_play_schedules_one_tick() {
        let mut player = player();
        player.play();
        let handle = player.tick_handle().unwrap();
        assert!(player.scheduler().is_active(handle));
        assert_eq!(
            player.scheduler().period(handle),
            Some(Duration::from_secs_f32(1.0 / 30.0))
        );
    }

    #[test]
    fn test_play_while_playing_is_noop() {
        let mut player = player();
        player.play();
        player.set_time(0.25);
        let before = player.state().clone();

        player.play();
        assert_eq!(player.state(), &before);
        assert_eq!(player.scheduler().scheduled_total(), 1);
    }

    #[test]
    fn test_pause_freezes_time() {
        let mut player = player();
        player.play();
        player.set_time(0.5);
        player.pause();
        assert_eq!(player.play_state(), PlayState::Pause);

        player.set_time(0.9);
        player.tick();
        player.set_percent(1.0);
        assert_eq!(player.current_time(), 0.5);
        assert!((root_x(&player) - 1.0).abs() < 0.001);

        // Resume keeps the same tick and advances from the frozen time
        let handle = player.tick_handle();
        player.play();
        assert_eq!(player.tick_handle(), handle);
        player.tick();
        assert!(player.current_time() > 0.5);
    }

    #[test]
    fn test_pause_only_from_play() {
        let mut player = player();
        player.pause();
        assert_eq!(player.play_state(), PlayState::Stop);
    }

    #[test]
    fn test_stop_cancels_tick_and_resets_transforms() {
        let mut player = player();
        player.play();
        player.set_time(0.5);
        let handle = player.tick_handle().unwrap();

        player.stop();
        assert_eq!(player.play_state(), PlayState::Stop);
        assert!(!player.scheduler().is_active(handle));
        assert!(player.tick_handle().is_none());
        assert_eq!(player.transform("Root"), Some(&NodeTransform::IDENTITY));

        // A late tick must not move anything
        player.tick();
        assert_eq!(player.transform("Root"), Some(&NodeTransform::IDENTITY));
    }

    #[test]
    fn stop_rewinds_time_to_zero() {
        let mut player = player();
        player.play();
        player.set_time(0.75);
        player.stop();
        assert_eq!(player.current_time(), 0.0);
    }

    #[test]
    fn test_clamp_and_loop() {
        let mut player = player();
        player.set_time(0.5);
        assert!((root_x(&player) - 1.0).abs() < 0.001);

        player.set_time(1.5);
        assert_eq!(player.current_time(), 1.0);
        assert!((root_x(&player) - 2.0).abs() < 0.001);

        player.set_loop_type(LoopType::Loop);
        player.set_time(1.5);
        assert!((player.current_time() - 0.5).abs() < 0.001);
        assert!((root_x(&player) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_reverse_playback_clamps_at_zero() {
        let mut player = player();
        player.set_speed(-1.0);
        player.play();
        player.set_time(0.01);
        player.tick();
        assert_eq!(player.current_time(), 0.0);
    }

    #[test]
    fn test_tick_advances_by_frame_duration_times_speed() {
        let mut player = player();
        player.set_fps(10.0).unwrap();
        player.set_speed(2.0);
        player.play();
        player.tick();
        assert!((player.current_time() - 0.2).abs() < 0.001);

        player.advance(Duration::from_millis(100));
        assert!((player.current_time() - 0.4).abs() < 0.001);
    }

    #[test]
    fn test_set_fps_keeps_scheduled_period() {
        let mut player = player();
        player.play();
        let handle = player.tick_handle().unwrap();
        player.set_fps(60.0).unwrap();
        assert_eq!(player.frame_duration(), Duration::from_secs_f32(1.0 / 60.0));
        assert_eq!(
            player.scheduler().period(handle),
            Some(Duration::from_secs_f32(1.0 / 30.0))
        );
        assert!(player.set_fps(-1.0).is_err());
    }

    #[test]
    fn test_fps_too_high_for_a_period_rejected() {
        let mut player = player();
        player.set_fps(10.0).unwrap();
        assert!(matches!(
            player.set_fps(3.0e9),
            Err(GlbError::InvalidFrameRate(_))
        ));
        assert_eq!(player.frame_duration(), Duration::from_secs_f32(0.1));

        let settings = PlayerSettings::default().with_fps(3.0e9);
        let result = AnimationPlayer::with_settings(walk_set(), ManualScheduler::new(), settings);
        assert!(matches!(result, Err(GlbError::InvalidFrameRate(_))));
    }

    #[test]
    fn test_set_percent() {
        let mut player = player();
        player.set_percent(0.25);
        assert!((player.current_time() - 0.25).abs() < 0.001);
        player.set_percent(3.0);
        assert_eq!(player.current_time(), 1.0);
        player.set_percent(-1.0);
        assert_eq!(player.current_time(), 0.0);
    }

    #[test]
    fn test_play_unknown_animation_leaves_state() {
        let mut player = player();
        let before = player.state().clone();
        let err = player.play_animation("Run").unwrap_err();
        assert!(matches!(err, GlbError::AnimationNotFound(ref name) if name == "Run"));
        assert_eq!(player.state(), &before);
    }

    #[test]
    fn test_play_named_animation() {
        let mut player = player();
        player.play_animation("Idle").unwrap();
        assert_eq!(player.current_animation().name(), "Idle");
        assert_eq!(player.play_state(), PlayState::Play);

        player.set_time(0.0);
        let root = player.transform("Root").unwrap();
        assert_eq!(root.scale, Vec3::splat(1.0));
        assert_eq!(root.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_set_animation_keeps_play_state() {
        let mut player = player();
        player.set_animation("Idle").unwrap();
        assert_eq!(player.play_state(), PlayState::Stop);
        assert!(player.set_animation("Nope").is_err());
        assert_eq!(player.current_animation().name(), "Idle");
    }

    #[test]
    fn test_empty_channels_keep_previous_output() {
        let mut player = player();
        player.set_time(1.0);
        // Idle has no translation keys, so the Walk translation stays
        player.set_animation("Idle").unwrap();
        player.set_time(0.0);
        assert!((root_x(&player) - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_non_finite_time_ignored() {
        let mut player = player();
        player.set_time(0.5);
        player.set_time(f32::NAN);
        assert_eq!(player.current_time(), 0.5);
    }

    #[test]
    fn test_players_share_a_set() {
        let set = walk_set();
        let mut a = AnimationPlayer::with_manual_scheduler(Arc::clone(&set)).unwrap();
        let b = AnimationPlayer::with_manual_scheduler(Arc::clone(&set)).unwrap();
        a.set_time(0.5);
        assert_eq!(b.transform("Root"), Some(&NodeTransform::IDENTITY));
        assert_eq!(Arc::strong_count(&set), 3);
    }
}
