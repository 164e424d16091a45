//! Asset pipeline: glTF import and display conditioning for the pedestal
//! viewer.
//!
//! Models arrive in arbitrary units and orientations. Import flattens the
//! scene graph into mesh buffers, then [`ModelData::normalize`] recenters
//! and rescales the result so every catalog entry presents at the same size
//! on the pedestal.
//!
//! # Invariants
//! - Normalization is baked into vertex data once at load; render code never
//!   rescales per frame.
//! - The renderer consumes [`ModelData`] buffers, never raw file paths.

mod catalog;
mod import;
mod model;

pub use catalog::{Catalog, CatalogEntry};
pub use import::{AssetError, import_model};
pub use model::{
    DISPLAY_POSITION, Material, MeshData, ModelData, NormalizeStats, TARGET_SIZE, display_pose,
    placeholder_slab,
};

pub fn crate_info() -> &'static str {
    "pedestal-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("assets"));
    }
}
