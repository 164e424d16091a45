use glam::Mat4;
use tracing::debug;

/// Vertical field of view of the display camera, degrees.
pub const FOV_DEGREES: f32 = 30.0;
/// Near clip plane distance.
pub const NEAR_PLANE: f32 = 0.1;
/// Far clip plane distance.
pub const FAR_PLANE: f32 = 100.0;

const FALLBACK_ASPECT: f32 = 16.0 / 9.0;

/// Camera projection state and the render-surface dimensions behind it.
///
/// Only [`resize`](Self::resize) mutates a viewport, and it refuses
/// degenerate dimensions: a zero width or height is skipped and the prior
/// valid state is kept, so the projection can never divide by zero. A
/// viewport created before the host window has a real measurement reports
/// not-ready and falls back to a safe aspect until the first non-zero
/// resize arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    width: u32,
    height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        let mut viewport = Self {
            width: 0,
            height: 0,
        };
        viewport.resize(width, height);
        viewport
    }

    /// True once a non-zero measurement has been applied.
    pub fn is_ready(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Width / height, or the fallback aspect while not ready.
    pub fn aspect(&self) -> f32 {
        if self.is_ready() {
            self.width as f32 / self.height as f32
        } else {
            FALLBACK_ASPECT
        }
    }

    /// Apply a new surface measurement. Returns whether anything changed;
    /// zero dimensions are skipped.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            debug!(width, height, "ignoring degenerate resize");
            return false;
        }
        if (width, height) == (self.width, self.height) {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            FOV_DEGREES.to_radians(),
            self.aspect(),
            NEAR_PLANE,
            FAR_PLANE,
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
