//! wgpu render backend for the pedestal viewer.
//!
//! Draws the staged model meshes under a fixed studio light rig over a
//! pedestal-line backdrop. The camera is a drag-driven orbit with inertial
//! damping; zoom and pan do not exist.
//!
//! # Invariants
//! - The renderer never mutates scene state.
//! - Mesh buffers live exactly as long as their model is staged.
//! - A degenerate surface size never reaches the projection math.

mod camera;
mod gpu;
mod shaders;
mod viewport;

pub use camera::{OrbitCamera, OrbitLimits};
pub use gpu::GpuRenderer;
pub use viewport::{FAR_PLANE, FOV_DEGREES, NEAR_PLANE, Viewport};
