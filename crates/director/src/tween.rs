use pedestal_common::Pose;

/// Easing curve applied to normalized tween progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    /// Accelerate from rest.
    QuadIn,
    /// Decelerate into the target.
    QuadOut,
    /// Sinusoidal ramp in and out.
    SineInOut,
}

impl Easing {
    /// Map linear progress `t` in `[0, 1]` onto the eased curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::SineInOut => 0.5 - 0.5 * (std::f32::consts::PI * t).cos(),
        }
    }
}

/// A time-parameterized scalar ramp from `from` to `to`.
///
/// A finished tween reports exactly `to`; eased interpolation alone never
/// lands there bit-exactly.
#[derive(Debug, Clone)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
            easing,
        }
    }

    /// Advance by `dt` seconds and return the new value.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.value()
    }

    pub fn value(&self) -> f32 {
        if self.finished() {
            return self.to;
        }
        let t = self.easing.apply(self.elapsed / self.duration);
        self.from + (self.to - self.from) * t
    }

    pub fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn target(&self) -> f32 {
        self.to
    }
}

/// Pose ramp used for the return-to-rest move: position lerps and rotation
/// slerps on a shared eased clock.
#[derive(Debug, Clone)]
pub struct PoseTween {
    from: Pose,
    to: Pose,
    clock: Tween,
}

impl PoseTween {
    pub fn new(from: Pose, to: Pose, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            clock: Tween::new(0.0, 1.0, duration, easing),
        }
    }

    /// Advance by `dt` seconds and return the new pose. On completion this
    /// is exactly `to`, never an interpolant.
    pub fn advance(&mut self, dt: f32) -> Pose {
        let t = self.clock.advance(dt);
        if self.clock.finished() {
            return self.to;
        }
        self.from.lerp(&self.to, t)
    }

    pub fn target(&self) -> Pose {
        self.to
    }

    pub fn finished(&self) -> bool {
        self.clock.finished()
    }
}

/// Endless ping-pong swing over `[-amplitude, +amplitude]`.
///
/// The phase starts at the midpoint of the rising half swing, so a freshly
/// constructed (or recentered) oscillator reports a zero offset and eases
/// toward the positive extreme first.
#[derive(Debug, Clone)]
pub struct Oscillator {
    amplitude: f32,
    half_period: f32,
    clock: f32,
}

impl Oscillator {
    pub fn new(amplitude: f32, half_period: f32) -> Self {
        let half_period = half_period.max(f32::EPSILON);
        Self {
            amplitude,
            half_period,
            clock: half_period * 0.5,
        }
    }

    /// Reset to the midpoint of the swing, heading positive.
    pub fn recenter(&mut self) {
        self.clock = self.half_period * 0.5;
    }

    pub fn advance(&mut self, dt: f32) -> f32 {
        self.clock += dt;
        self.offset()
    }

    pub fn offset(&self) -> f32 {
        let phase = (self.clock / self.half_period) % 2.0;
        let up = if phase < 1.0 { phase } else { 2.0 - phase };
        let eased = Easing::SineInOut.apply(up);
        -self.amplitude + 2.0 * self.amplitude * eased
    }
}

/// Debounce window between the end of an interaction and the start of the
/// return move.
#[derive(Debug, Clone)]
pub struct ReturnTimer {
    remaining: f32,
}

impl ReturnTimer {
    pub fn new(delay: f32) -> Self {
        Self {
            remaining: delay.max(0.0),
        }
    }

    /// Count down by `dt`; reports whether the window has closed. The owner
    /// drops the timer once this returns true.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    #[test]
    fn easing_endpoints_are_exact() {
        for easing in [
            Easing::Linear,
            Easing::QuadIn,
            Easing::QuadOut,
            Easing::SineInOut,
        ] {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{easing:?} at 1");
        }
    }

    #[test]
    fn quad_out_front_loads_motion() {
        assert!(Easing::QuadOut.apply(0.5) > 0.5);
        assert!(Easing::QuadIn.apply(0.5) < 0.5);
    }

    #[test]
    fn sine_in_out_is_symmetric() {
        assert!((Easing::SineInOut.apply(0.5) - 0.5).abs() < 1e-6);
        let early = Easing::SineInOut.apply(0.25);
        let late = Easing::SineInOut.apply(0.75);
        assert!((early + late - 1.0).abs() < 1e-5);
    }

    #[test]
    fn tween_lands_exactly_on_target() {
        let mut tween = Tween::new(2.0, 7.0, 0.5, Easing::SineInOut);
        // Uneven steps that do not divide the duration.
        while !tween.finished() {
            tween.advance(0.013);
        }
        assert_eq!(tween.value(), 7.0);
    }

    #[test]
    fn tween_zero_duration_completes_immediately() {
        let mut tween = Tween::new(0.0, 1.0, 0.0, Easing::Linear);
        assert!(tween.finished());
        assert_eq!(tween.advance(0.016), 1.0);
    }

    #[test]
    fn tween_interpolates_monotonically_upward() {
        let mut tween = Tween::new(0.0, 1.0, 1.0, Easing::QuadOut);
        let mut prev = 0.0;
        for _ in 0..50 {
            let v = tween.advance(0.02);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn pose_tween_finishes_on_the_exact_pose() {
        let from = Pose::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_y(0.7));
        let to = Pose::new(Vec3::new(0.0, -0.6, 0.0), Quat::from_rotation_y(-0.4));
        let mut tween = PoseTween::new(from, to, 0.8, Easing::QuadOut);
        let mut pose = from;
        while !tween.finished() {
            pose = tween.advance(0.011);
        }
        assert_eq!(pose.position, to.position);
        assert_eq!(pose.rotation, to.rotation);
    }

    #[test]
    fn oscillator_starts_centered_and_stays_bounded() {
        let mut osc = Oscillator::new(0.05, 3.5);
        assert!(osc.offset().abs() < 1e-6);
        let mut max_seen = 0.0f32;
        for _ in 0..2000 {
            let v = osc.advance(0.016);
            assert!(v.abs() <= 0.05 + 1e-5);
            max_seen = max_seen.max(v.abs());
        }
        // Over several periods the swing reaches its extremes.
        assert!(max_seen > 0.049);
    }

    #[test]
    fn oscillator_heads_positive_then_reverses() {
        let mut osc = Oscillator::new(1.0, 2.0);
        let early = osc.advance(0.2);
        assert!(early > 0.0);
        // Half a period later the swing is at +1 and coming back down.
        let mut osc = Oscillator::new(1.0, 2.0);
        osc.advance(1.0);
        let peak = osc.offset();
        let after = osc.advance(0.5);
        assert!(peak > 0.99);
        assert!(after < peak);
    }

    #[test]
    fn recenter_returns_to_zero_offset() {
        let mut osc = Oscillator::new(0.05, 3.5);
        osc.advance(1.234);
        assert!(osc.offset().abs() > 1e-4);
        osc.recenter();
        assert!(osc.offset().abs() < 1e-6);
    }

    #[test]
    fn return_timer_fires_at_the_deadline() {
        let mut timer = ReturnTimer::new(1.0);
        assert!(!timer.advance(0.4));
        assert!(!timer.advance(0.4));
        assert!(timer.advance(0.4));
    }
}
