//! Background model loading.
//!
//! The one genuinely asynchronous part of the viewer. A dedicated worker
//! thread does all file I/O and parsing; the frame loop rejoins it through
//! `poll`, so scene mutation never leaves the main thread.
//!
//! # Invariants
//! - Results carry request generations; only the latest is surfaced.
//! - After shutdown, late results are dropped and cannot touch the scene.

mod loader;

pub use loader::{LoadOutcome, LoaderError, ModelLoader};

pub fn crate_info() -> &'static str {
    "pedestal-loader v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("loader"));
    }
}
