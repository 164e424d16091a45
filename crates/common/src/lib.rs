//! Shared types for the pedestal viewer: model identity, transforms, poses,
//! bounding boxes.
//!
//! # Invariants
//! - A `Pose` never carries scale; normalization bakes scale into mesh data.
//! - `Aabb` is only constructed from at least one point.

pub mod types;

pub use types::{Aabb, ModelId, Pose, Transform};
