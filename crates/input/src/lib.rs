//! Pointer input mapped to shared interaction events.
//!
//! # Invariants
//! - Exactly one `Started` per drag, paired with exactly one `Ended`.
//! - A press with no motion emits nothing.

pub mod drag;

pub use drag::{CursorHint, DragTracker, InteractionEvent};

pub fn crate_info() -> &'static str {
    "pedestal-input v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("input"));
    }
}
