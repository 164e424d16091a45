use crate::import::AssetError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// One displayable model in a [`Catalog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub path: PathBuf,
    pub label: String,
}

/// Ordered list of displayable models, loaded from a YAML manifest.
///
/// Entry paths are resolved against the manifest's directory at load time,
/// so a catalog moves together with its model files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub models: Vec<CatalogEntry>,
}

impl Catalog {
    /// Load a manifest from disk. A catalog with zero entries is an error;
    /// callers may assume `len() > 0` after a successful load.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut catalog: Self = serde_yaml::from_str(&text)?;
        if catalog.models.is_empty() {
            return Err(AssetError::EmptyCatalog(path.display().to_string()));
        }
        if let Some(base) = path.parent() {
            for entry in &mut catalog.models {
                if entry.path.is_relative() {
                    entry.path = base.join(&entry.path);
                }
            }
        }
        info!(
            manifest = %path.display(),
            models = catalog.models.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Build a one-entry catalog for a model given directly on the command
    /// line, labelled after its file stem.
    pub fn single(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());
        Self {
            models: vec![CatalogEntry {
                id: label.clone(),
                path,
                label,
            }],
        }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn entry(&self, index: usize) -> Option<&CatalogEntry> {
        self.models.get(index)
    }

    /// Index after `index`, wrapping past the last entry.
    pub fn next_index(&self, index: usize) -> usize {
        if self.models.is_empty() {
            return 0;
        }
        (index + 1) % self.models.len()
    }

    /// Index before `index`, wrapping past the first entry.
    pub fn prev_index(&self, index: usize) -> usize {
        if self.models.is_empty() {
            return 0;
        }
        (index + self.models.len() - 1) % self.models.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = "\
models:
  - id: first
    path: first.gltf
    label: First
  - id: second
    path: sub/second.gltf
    label: Second
";

    #[test]
    fn load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("catalog.yaml");
        std::fs::write(&manifest, MANIFEST).unwrap();

        let catalog = Catalog::load(&manifest).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.models[0].path, dir.path().join("first.gltf"));
        assert_eq!(catalog.models[1].path, dir.path().join("sub/second.gltf"));
    }

    #[test]
    fn load_rejects_empty_manifests() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("catalog.yaml");
        std::fs::write(&manifest, "models: []\n").unwrap();

        assert!(matches!(
            Catalog::load(&manifest),
            Err(AssetError::EmptyCatalog(_))
        ));
    }

    #[test]
    fn cycling_wraps_both_directions() {
        let catalog = Catalog {
            models: vec![
                CatalogEntry {
                    id: "a".into(),
                    path: "a.gltf".into(),
                    label: "A".into(),
                },
                CatalogEntry {
                    id: "b".into(),
                    path: "b.gltf".into(),
                    label: "B".into(),
                },
                CatalogEntry {
                    id: "c".into(),
                    path: "c.gltf".into(),
                    label: "C".into(),
                },
            ],
        };
        assert_eq!(catalog.next_index(0), 1);
        assert_eq!(catalog.next_index(2), 0);
        assert_eq!(catalog.prev_index(0), 2);
        assert_eq!(catalog.prev_index(1), 0);
    }

    #[test]
    fn single_labels_after_file_stem() {
        let catalog = Catalog::single("demos/obsidian-card.gltf");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.models[0].label, "obsidian-card");
    }
}
