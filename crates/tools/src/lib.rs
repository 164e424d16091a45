//! Developer Tooling: viewer inspector and frame timing for the overlay.
//!
//! # Invariants
//! - Tools are read-only over viewer state.

mod inspector;
mod timing;

pub use inspector::{ModelInfo, ViewerInspector, ViewerSummary};
pub use timing::FrameTimer;

pub fn crate_info() -> &'static str {
    "pedestal-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
