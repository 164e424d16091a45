use crate::viewport::Viewport;
use glam::{Mat4, Vec2, Vec3};

/// Velocity below which a coasting orbit is considered stopped.
const REST_THRESHOLD: f32 = 1e-4;

/// Angular bounds on the orbit arc.
///
/// Pitch is always clamped so the camera cannot flip over the poles. The
/// yaw arc is optional; left open, the model can be spun all the way
/// around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitLimits {
    pub pitch_min: f32,
    pub pitch_max: f32,
    pub yaw_arc: Option<(f32, f32)>,
}

impl Default for OrbitLimits {
    fn default() -> Self {
        Self {
            pitch_min: -1.4,
            pitch_max: 1.4,
            yaw_arc: None,
        }
    }
}

impl OrbitLimits {
    /// Restrict rotation to a horizontal sweep of `half_arc` radians to
    /// either side of the initial yaw.
    pub fn horizontal_sweep(half_arc: f32) -> Self {
        let half_arc = half_arc.abs();
        Self {
            pitch_min: 0.0,
            pitch_max: 0.0,
            yaw_arc: Some((-half_arc, half_arc)),
        }
    }
}

/// Drag-driven orbit around a fixed look-at target.
///
/// The radius and target never change: there is no zoom and no pan. A drag
/// imparts angular velocity which decays by the damping factor each frame,
/// so the orbit coasts briefly after release. Decay is applied frame-rate
/// independently; the configured factor is per 60 Hz frame.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub yaw: f32,
    pub pitch: f32,
    pub radius: f32,
    pub target: Vec3,
    pub sensitivity: f32,
    limits: OrbitLimits,
    damping: f32,
    velocity: Vec2,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.033,
            radius: 6.0,
            target: Vec3::ZERO,
            sensitivity: 0.005,
            limits: OrbitLimits::default(),
            damping: 0.05,
            velocity: Vec2::ZERO,
        }
    }
}

impl OrbitCamera {
    pub fn with_limits(limits: OrbitLimits) -> Self {
        let mut camera = Self {
            limits,
            ..Self::default()
        };
        camera.clamp_angles();
        camera
    }

    /// Set the per-frame velocity decay factor, clamped into `[0, 1)`.
    pub fn set_damping(&mut self, damping: f32) {
        self.damping = damping.clamp(0.0, 0.999);
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }

    /// A pointer drag of `delta` pixels this frame. The latest drag sets
    /// the angular velocity outright; stale momentum does not accumulate.
    pub fn apply_drag(&mut self, delta: Vec2) {
        self.velocity = delta * self.sensitivity;
    }

    /// True while released momentum is still carrying the orbit.
    pub fn is_coasting(&self) -> bool {
        self.velocity != Vec2::ZERO
    }

    /// Advance the orbit by `dt` seconds: integrate the angular velocity,
    /// then decay it toward rest.
    pub fn advance(&mut self, dt: f32) {
        if self.velocity == Vec2::ZERO {
            return;
        }
        let frames = dt * 60.0;
        self.yaw += self.velocity.x * frames;
        self.pitch += self.velocity.y * frames;
        self.clamp_angles();

        self.velocity *= (1.0 - self.damping).powf(frames);
        if self.velocity.length() < REST_THRESHOLD {
            self.velocity = Vec2::ZERO;
        }
    }

    fn clamp_angles(&mut self) {
        self.pitch = self
            .pitch
            .clamp(self.limits.pitch_min, self.limits.pitch_max);
        if let Some((min, max)) = self.limits.yaw_arc {
            self.yaw = self.yaw.clamp(min, max);
        }
    }

    /// Camera position on the orbit sphere.
    pub fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target
            + self.radius * Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn view_projection(&self, viewport: &Viewport) -> Mat4 {
        viewport.projection_matrix() * self.view_matrix()
    }
}
