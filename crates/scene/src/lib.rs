//! The viewer scene: which models are on the pedestal and how they arrive
//! and leave.
//!
//! # Invariants
//! - At most one current model; at most one outgoing model mid-swap.
//! - The outgoing model is disposed only after its exit slide completes.
//! - A failed load never leaves a half-inserted model behind.

mod scene;

pub use scene::{SceneEvent, StagedModel, ViewerScene};

pub fn crate_info() -> &'static str {
    "pedestal-scene v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("scene"));
    }
}
