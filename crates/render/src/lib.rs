//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - A renderer cannot mutate scene truth directly.
//! - Render state derives from scene state and view.
//!
//! The trait is stable across backends: the desktop shell plugs in the wgpu
//! implementation while the CLI and tests use the headless text renderer.

mod renderer;

pub use renderer::{Renderer, SceneView, TextFrameRenderer};

pub fn crate_info() -> &'static str {
    "pedestal-render v0.1.0"
}
