use crate::model::{Material, MeshData, ModelData};
use glam::{Mat4, Vec3};
use std::path::Path;
use tracing::debug;

/// Errors from asset import and catalog loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("no geometry in {0}")]
    NoGeometry(String),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("catalog {0} lists no models")]
    EmptyCatalog(String),
}

/// Import a glTF or GLB file into an in-memory [`ModelData`].
///
/// Walks the default scene and flattens node transforms into vertex
/// positions, one [`MeshData`] per primitive. Primitives without positions
/// are skipped; missing normals fall back to +Y.
pub fn import_model(path: impl AsRef<Path>) -> Result<ModelData, AssetError> {
    let path = path.as_ref();
    let (doc, buffers, _images) = gltf::import(path)?;

    let mut meshes = Vec::new();
    match doc.default_scene().or_else(|| doc.scenes().next()) {
        Some(scene) => {
            for node in scene.nodes() {
                collect_node(&node, Mat4::IDENTITY, &buffers, &mut meshes);
            }
        }
        // Some exporters write meshes without a scene; take them as-is.
        None => {
            for mesh in doc.meshes() {
                collect_mesh(&mesh, Mat4::IDENTITY, &buffers, &mut meshes);
            }
        }
    }

    let model = ModelData { meshes };
    if model.is_empty() {
        return Err(AssetError::NoGeometry(path.display().to_string()));
    }
    debug!(
        path = %path.display(),
        meshes = model.meshes.len(),
        vertices = model.vertex_count(),
        "imported model"
    );
    Ok(model)
}

fn collect_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<MeshData>,
) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        collect_mesh(&mesh, world, buffers, out);
    }
    for child in node.children() {
        collect_node(&child, world, buffers, out);
    }
}

fn collect_mesh(
    mesh: &gltf::Mesh,
    world: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<MeshData>,
) {
    for prim in mesh.primitives() {
        let reader = prim.reader(|b| buffers.get(b.index()).map(|bb| bb.0.as_slice()));
        let Some(pos_iter) = reader.read_positions() else {
            continue;
        };
        let positions: Vec<[f32; 3]> = pos_iter
            .map(|p| world.transform_point3(Vec3::from(p)).to_array())
            .collect();
        if positions.is_empty() {
            continue;
        }
        let normals: Vec<[f32; 3]> = match reader.read_normals() {
            Some(iter) => iter
                .map(|n| {
                    world
                        .transform_vector3(Vec3::from(n))
                        .normalize_or_zero()
                        .to_array()
                })
                .collect(),
            None => vec![[0.0, 1.0, 0.0]; positions.len()],
        };
        let indices: Vec<u32> = match reader.read_indices() {
            Some(idx) => idx.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };
        out.push(MeshData {
            name: mesh.name().unwrap_or("unnamed").to_string(),
            positions,
            normals,
            indices,
            material: read_material(&prim.material()),
        });
    }
}

fn read_material(mat: &gltf::Material) -> Material {
    let pbr = mat.pbr_metallic_roughness();
    Material {
        base_color: pbr.base_color_factor(),
        metallic: pbr.metallic_factor(),
        roughness: pbr.roughness_factor(),
        emissive: mat.emissive_factor(),
    }
}
