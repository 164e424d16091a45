use crate::tween::{Easing, Oscillator, PoseTween, ReturnTimer};
use glam::{EulerRot, Quat};
use pedestal_common::Pose;
use tracing::debug;

/// Bounds accepted for [`DirectorConfig::return_delay`].
pub const RETURN_DELAY_RANGE: (f32, f32) = (0.5, 2.0);

/// Largest accepted idle sway amplitude magnitude, radians.
pub const MAX_IDLE_AMPLITUDE: f32 = 1.0;

/// Which phase of the interact/return cycle the model is in.
///
/// Exactly one state holds at any instant. The debounce window after a
/// release still counts as `Interacting`; `Returning` begins only when the
/// return move itself starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    /// Untouched: the idle sway runs around the rest pose.
    #[default]
    Idle,
    /// A drag is in progress, or the post-release debounce is counting down.
    Interacting,
    /// The return move toward the rest pose is running.
    Returning,
}

/// A transition record produced by the director.
///
/// The event log is how the shell and tests observe the state machine;
/// there are no completion callbacks to outlive a teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorEvent {
    InteractionStarted,
    InteractionEnded,
    ReturnStarted,
    ReturnCompleted,
}

/// Timing knobs for the idle/return choreography.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectorConfig {
    /// Seconds between the last release and the start of the return move.
    pub return_delay: f32,
    /// Duration of the return move itself.
    pub return_duration: f32,
    /// Peak pitch offset of the idle sway, radians. Negative by default so
    /// the model dips as it turns.
    pub idle_pitch_amplitude: f32,
    /// Peak yaw offset of the idle sway, radians.
    pub idle_yaw_amplitude: f32,
    /// Seconds for one sweep of the idle sway between extremes.
    pub idle_half_period: f32,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            return_delay: 1.0,
            return_duration: 0.8,
            idle_pitch_amplitude: -0.05,
            idle_yaw_amplitude: 0.05,
            idle_half_period: 3.5,
        }
    }
}

impl DirectorConfig {
    /// Clamp out-of-range values into usable ones rather than failing; the
    /// director must always be constructible.
    pub fn validated(self) -> Self {
        Self {
            return_delay: self
                .return_delay
                .clamp(RETURN_DELAY_RANGE.0, RETURN_DELAY_RANGE.1),
            return_duration: self.return_duration.max(0.0),
            idle_pitch_amplitude: self
                .idle_pitch_amplitude
                .clamp(-MAX_IDLE_AMPLITUDE, MAX_IDLE_AMPLITUDE),
            idle_yaw_amplitude: self
                .idle_yaw_amplitude
                .clamp(-MAX_IDLE_AMPLITUDE, MAX_IDLE_AMPLITUDE),
            idle_half_period: self.idle_half_period.max(0.1),
        }
    }
}

/// The idle/interact/return state machine driving the displayed model's
/// pose over time.
///
/// All mutation happens inside [`advance`](Self::advance) on the frame
/// thread. Completion effects (exact snap to the rest pose, idle restart)
/// are applied in the same call that detects them, so nothing can fire
/// after [`teardown`](Self::teardown) has run.
///
/// # Invariants
/// - The idle sway and the return tween are never simultaneously active.
/// - Return completion lands bit-exactly on the rest pose.
/// - After teardown the director is inert: `advance` mutates nothing and
///   no further event is logged.
#[derive(Debug)]
pub struct IdleAnimationDirector {
    config: DirectorConfig,
    /// Canonical rest pose. Never changes after construction.
    anchor: Pose,
    pose: Pose,
    state: InteractionState,
    sway: Oscillator,
    timer: Option<ReturnTimer>,
    returning: Option<PoseTween>,
    events: Vec<DirectorEvent>,
    torn_down: bool,
}

impl IdleAnimationDirector {
    pub fn new(anchor: Pose, config: DirectorConfig) -> Self {
        let config = config.validated();
        Self {
            config,
            anchor,
            pose: anchor,
            state: InteractionState::Idle,
            // Normalized swing in [-1, 1], scaled per axis when applied.
            sway: Oscillator::new(1.0, config.idle_half_period),
            timer: None,
            returning: None,
            events: Vec::new(),
            torn_down: false,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// The pose the displayed model should take this frame.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// The rest pose everything returns to.
    pub fn anchor(&self) -> Pose {
        self.anchor
    }

    pub fn config(&self) -> DirectorConfig {
        self.config
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Take all pending transition events in emission order.
    pub fn drain_events(&mut self) -> Vec<DirectorEvent> {
        std::mem::take(&mut self.events)
    }

    /// A drag began. Freezes the pose at its current value; the sway or
    /// return tween is dropped mid-flight with no snap.
    pub fn on_interaction_start(&mut self) {
        if self.torn_down {
            return;
        }
        // A started drag cannot start again; only the debounce window can
        // legitimately see another press.
        if self.state == InteractionState::Interacting && self.timer.is_none() {
            return;
        }
        self.timer = None;
        self.returning = None;
        self.state = InteractionState::Interacting;
        self.events.push(DirectorEvent::InteractionStarted);
        debug!("interaction started");
    }

    /// The drag was released. Arms the debounce timer; the state stays
    /// `Interacting` until the window closes. The latest release wins.
    pub fn on_interaction_end(&mut self) {
        if self.torn_down || self.state != InteractionState::Interacting {
            return;
        }
        self.timer = Some(ReturnTimer::new(self.config.return_delay));
        self.events.push(DirectorEvent::InteractionEnded);
        debug!(delay = self.config.return_delay, "interaction ended");
    }

    /// Advance the choreography by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        if self.torn_down {
            return;
        }
        match self.state {
            InteractionState::Idle => {
                let sway = self.sway.advance(dt);
                self.pose = Pose {
                    position: self.anchor.position,
                    rotation: sway_rotation(&self.config, sway) * self.anchor.rotation,
                };
            }
            InteractionState::Interacting => {
                if let Some(timer) = &mut self.timer {
                    if timer.advance(dt) {
                        self.timer = None;
                        self.returning = Some(PoseTween::new(
                            self.pose,
                            self.anchor,
                            self.config.return_duration,
                            Easing::QuadOut,
                        ));
                        self.state = InteractionState::Returning;
                        self.events.push(DirectorEvent::ReturnStarted);
                        debug!("return started");
                    }
                }
            }
            InteractionState::Returning => {
                if let Some(tween) = &mut self.returning {
                    self.pose = tween.advance(dt);
                    if tween.finished() {
                        self.returning = None;
                        // Snap, then restart the sway from dead center so
                        // the next idle frame cannot jump.
                        self.pose = self.anchor;
                        self.sway.recenter();
                        self.state = InteractionState::Idle;
                        self.events.push(DirectorEvent::ReturnCompleted);
                        debug!("return completed");
                    }
                }
            }
        }
    }

    /// A new model was placed on the pedestal: drop any in-flight move,
    /// snap to the rest pose, and restart the idle sway from center. A drag
    /// that is still held keeps its state, so the eventual release is seen
    /// and the sway stays off until the debounce closes.
    pub fn reanchor(&mut self) {
        if self.torn_down {
            return;
        }
        let drag_held = self.state == InteractionState::Interacting && self.timer.is_none();
        self.timer = None;
        self.returning = None;
        self.pose = self.anchor;
        self.sway.recenter();
        if !drag_held {
            self.state = InteractionState::Idle;
        }
    }

    /// Cancel every active tween and pending timer and go inert. Safe to
    /// call repeatedly; events already logged remain drainable.
    pub fn teardown(&mut self) {
        self.timer = None;
        self.returning = None;
        self.torn_down = true;
    }
}

/// Small world-space pitch/yaw offset composed onto the rest rotation.
/// The default amplitudes oppose in sign, so the model dips slightly as
/// it turns toward the yaw extreme.
fn sway_rotation(config: &DirectorConfig, sway: f32) -> Quat {
    Quat::from_euler(
        EulerRot::XYZ,
        sway * config.idle_pitch_amplitude,
        sway * config.idle_yaw_amplitude,
        0.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn rest_pose() -> Pose {
        Pose::new(
            Vec3::new(0.0, -0.6, 0.0),
            Quat::from_rotation_y(std::f32::consts::PI - 0.3),
        )
    }

    fn director() -> IdleAnimationDirector {
        IdleAnimationDirector::new(rest_pose(), DirectorConfig::default())
    }

    /// Run `seconds` of frames at a fixed 60 Hz step.
    fn run(d: &mut IdleAnimationDirector, seconds: f32) {
        let steps = (seconds / 0.016).ceil() as usize;
        for _ in 0..steps {
            d.advance(0.016);
        }
    }

    #[test]
    fn starts_idle_at_the_anchor() {
        let d = director();
        assert_eq!(d.state(), InteractionState::Idle);
        assert_eq!(d.pose().position, rest_pose().position);
        assert_eq!(d.pose().rotation, rest_pose().rotation);
    }

    #[test]
    fn idle_sway_starts_centered_and_stays_bounded() {
        let mut d = director();
        d.advance(0.016);
        // First frame barely departs the anchor.
        assert!(d.pose().distance(&rest_pose()) < 0.01);
        for _ in 0..3000 {
            d.advance(0.016);
            let angle = d.pose().rotation.angle_between(rest_pose().rotation);
            // Pitch and yaw combined stay near the configured amplitudes.
            assert!(angle < 0.08 * 1.3);
            assert_eq!(d.pose().position, rest_pose().position);
        }
    }

    #[test]
    fn idle_pitch_and_yaw_sway_at_opposed_amplitudes() {
        let mut d = director();
        let rest_inv = rest_pose().rotation.inverse();
        let mut min_pitch = f32::MAX;
        let mut max_pitch = f32::MIN;
        let mut max_yaw = f32::MIN;
        let mut pitch_at_max_yaw = 0.0f32;
        // 80 s covers many full sweeps.
        for _ in 0..5000 {
            d.advance(0.016);
            let offset = d.pose().rotation * rest_inv;
            let (pitch, yaw, _roll) = offset.to_euler(EulerRot::XYZ);
            min_pitch = min_pitch.min(pitch);
            max_pitch = max_pitch.max(pitch);
            if yaw > max_yaw {
                max_yaw = yaw;
                pitch_at_max_yaw = pitch;
            }
        }
        assert!((min_pitch + 0.05).abs() < 5e-3, "min pitch {min_pitch}");
        assert!((max_pitch - 0.05).abs() < 5e-3, "max pitch {max_pitch}");
        assert!((max_yaw - 0.05).abs() < 5e-3, "max yaw {max_yaw}");
        // The model dips while it turns: pitch opposes yaw.
        assert!(pitch_at_max_yaw < -0.04, "pitch at yaw extreme {pitch_at_max_yaw}");
    }

    #[test]
    fn started_freezes_the_pose() {
        let mut d = director();
        run(&mut d, 1.0);
        d.on_interaction_start();
        let frozen = d.pose();
        run(&mut d, 2.0);
        assert_eq!(d.state(), InteractionState::Interacting);
        assert_eq!(d.pose().position, frozen.position);
        assert_eq!(d.pose().rotation, frozen.rotation);
    }

    #[test]
    fn ended_does_not_return_before_the_delay() {
        let mut d = director();
        d.on_interaction_start();
        d.on_interaction_end();
        run(&mut d, 0.9);
        assert_eq!(d.state(), InteractionState::Interacting);
        assert!(!d.drain_events().contains(&DirectorEvent::ReturnStarted));
    }

    #[test]
    fn started_within_the_delay_cancels_the_return() {
        let mut d = director();
        d.on_interaction_start();
        d.on_interaction_end();
        run(&mut d, 0.5);
        d.on_interaction_start();
        run(&mut d, 10.0);
        assert_eq!(d.state(), InteractionState::Interacting);
        let events = d.drain_events();
        assert!(!events.contains(&DirectorEvent::ReturnStarted));
        assert_eq!(
            events
                .iter()
                .filter(|e| **e == DirectorEvent::InteractionStarted)
                .count(),
            2
        );
    }

    #[test]
    fn quiet_release_returns_exactly_to_the_anchor() {
        let mut d = director();
        run(&mut d, 2.0);
        d.on_interaction_start();
        d.on_interaction_end();
        // Delay plus duration plus slack, stepped unevenly on purpose.
        let mut elapsed = 0.0;
        while elapsed < 3.0 {
            d.advance(0.017);
            elapsed += 0.017;
            if d.state() == InteractionState::Idle {
                break;
            }
        }
        assert_eq!(d.state(), InteractionState::Idle);
        assert_eq!(d.pose().position, rest_pose().position);
        assert_eq!(d.pose().rotation, rest_pose().rotation);
    }

    #[test]
    fn full_cycle_emits_events_in_order() {
        let mut d = director();
        d.on_interaction_start();
        d.on_interaction_end();
        run(&mut d, 3.0);
        assert_eq!(
            d.drain_events(),
            vec![
                DirectorEvent::InteractionStarted,
                DirectorEvent::InteractionEnded,
                DirectorEvent::ReturnStarted,
                DirectorEvent::ReturnCompleted,
            ]
        );
    }

    #[test]
    fn idle_resumes_without_a_jump_after_return() {
        let mut d = director();
        d.on_interaction_start();
        d.on_interaction_end();
        let mut elapsed = 0.0;
        while d.state() != InteractionState::Idle && elapsed < 5.0 {
            d.advance(0.016);
            elapsed += 0.016;
        }
        assert_eq!(d.state(), InteractionState::Idle);
        // The first idle frame after the snap barely departs the anchor.
        d.advance(0.016);
        assert!(d.pose().distance(&rest_pose()) < 0.01);
    }

    #[test]
    fn interrupting_the_return_freezes_mid_flight() {
        let mut d = director();
        d.on_interaction_start();
        d.on_interaction_end();
        // Into the return move but not through it.
        run(&mut d, 1.4);
        assert_eq!(d.state(), InteractionState::Returning);
        d.on_interaction_start();
        let frozen = d.pose();
        run(&mut d, 5.0);
        assert_eq!(d.state(), InteractionState::Interacting);
        assert_eq!(d.pose().rotation, frozen.rotation);
    }

    #[test]
    fn duplicate_started_is_ignored_mid_drag() {
        let mut d = director();
        d.on_interaction_start();
        d.on_interaction_start();
        assert_eq!(
            d.drain_events(),
            vec![DirectorEvent::InteractionStarted]
        );
    }

    #[test]
    fn ended_outside_a_drag_is_ignored() {
        let mut d = director();
        d.on_interaction_end();
        run(&mut d, 5.0);
        assert_eq!(d.state(), InteractionState::Idle);
        assert!(d.drain_events().is_empty());
    }

    #[test]
    fn teardown_cancels_the_pending_return() {
        let mut d = director();
        d.on_interaction_start();
        d.on_interaction_end();
        d.drain_events();
        d.teardown();
        run(&mut d, 10.0);
        assert!(d.drain_events().is_empty());
    }

    #[test]
    fn teardown_makes_advance_inert() {
        let mut d = director();
        d.on_interaction_start();
        d.on_interaction_end();
        run(&mut d, 1.2);
        assert_eq!(d.state(), InteractionState::Returning);
        let before = d.pose();
        d.drain_events();
        d.teardown();
        run(&mut d, 10.0);
        assert_eq!(d.pose().rotation, before.rotation);
        assert_eq!(d.pose().position, before.position);
        assert!(d.drain_events().is_empty());
    }

    #[test]
    fn teardown_is_idempotent_and_silences_input() {
        let mut d = director();
        d.teardown();
        d.teardown();
        d.on_interaction_start();
        d.on_interaction_end();
        assert!(d.drain_events().is_empty());
        assert!(d.is_torn_down());
    }

    #[test]
    fn sway_and_return_are_never_both_active() {
        let mut d = director();
        let mut saw_returning = false;
        d.on_interaction_start();
        d.on_interaction_end();
        for _ in 0..300 {
            d.advance(0.016);
            if d.state() == InteractionState::Returning {
                saw_returning = true;
                // While returning, the pose converges on the anchor rather
                // than oscillating around it.
                assert!(d.returning.is_some());
            } else {
                assert!(d.returning.is_none());
            }
        }
        assert!(saw_returning);
    }

    #[test]
    fn reanchor_resets_a_return_in_flight() {
        let mut d = director();
        d.on_interaction_start();
        d.on_interaction_end();
        run(&mut d, 1.2);
        assert_eq!(d.state(), InteractionState::Returning);
        d.reanchor();
        assert_eq!(d.state(), InteractionState::Idle);
        assert_eq!(d.pose().rotation, rest_pose().rotation);
        d.advance(0.016);
        assert!(d.pose().distance(&rest_pose()) < 0.01);
    }

    #[test]
    fn reanchor_during_a_held_drag_keeps_interacting() {
        let mut d = director();
        d.on_interaction_start();
        run(&mut d, 0.5);
        // A load completing mid-drag re-anchors while the button is held.
        d.reanchor();
        assert_eq!(d.state(), InteractionState::Interacting);
        assert_eq!(d.pose().rotation, rest_pose().rotation);
        // The sway must not run under the held drag.
        run(&mut d, 2.0);
        assert_eq!(d.pose().rotation, rest_pose().rotation);
        // The release is still honored: debounce, return, then idle.
        d.on_interaction_end();
        run(&mut d, 2.0);
        assert_eq!(d.state(), InteractionState::Idle);
        let events = d.drain_events();
        assert!(events.contains(&DirectorEvent::ReturnCompleted));
    }

    #[test]
    fn config_validation_clamps_ranges() {
        let config = DirectorConfig {
            return_delay: 10.0,
            return_duration: -1.0,
            idle_pitch_amplitude: -2.0,
            idle_yaw_amplitude: 2.0,
            idle_half_period: 0.0,
        }
        .validated();
        assert_eq!(config.return_delay, RETURN_DELAY_RANGE.1);
        assert_eq!(config.return_duration, 0.0);
        assert_eq!(config.idle_pitch_amplitude, -MAX_IDLE_AMPLITUDE);
        assert_eq!(config.idle_yaw_amplitude, MAX_IDLE_AMPLITUDE);
        assert!(config.idle_half_period > 0.0);
    }

    #[test]
    fn zero_duration_return_snaps_in_one_frame() {
        let config = DirectorConfig {
            return_duration: 0.0,
            ..DirectorConfig::default()
        };
        let mut d = IdleAnimationDirector::new(rest_pose(), config);
        d.on_interaction_start();
        d.on_interaction_end();
        // Enough frames for the debounce plus the instantaneous snap.
        run(&mut d, 1.1);
        assert_eq!(d.state(), InteractionState::Idle);
        assert!(d.pose().distance(&rest_pose()) < 0.01);
    }
}
