use glam::{EulerRot, Quat, Vec3};
use pedestal_common::{Aabb, Pose};
use serde::{Deserialize, Serialize};

/// Length of the longest model axis after [`ModelData::normalize`].
pub const TARGET_SIZE: f32 = 3.0;

/// Resting position of a displayed model, slightly below the camera line.
pub const DISPLAY_POSITION: Vec3 = Vec3::new(0.0, -0.6, 0.0);

const DISPLAY_TILT: f32 = -0.15;
const DISPLAY_TURN: f32 = std::f32::consts::PI - 0.3;

const DISPLAY_METALLIC: f32 = 0.85;
const DISPLAY_ROUGHNESS: f32 = 0.2;
const DISPLAY_EMISSIVE_SCALE: f32 = 0.6;

/// Surface factors for one mesh, following the glTF metallic-roughness model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: [f32; 3],
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: [0.8, 0.8, 0.8, 1.0],
            metallic: 0.0,
            roughness: 0.8,
            emissive: [0.0, 0.0, 0.0],
        }
    }
}

/// Triangle geometry for one primitive, flattened into world space.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub material: Material,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

/// Outcome of [`ModelData::normalize`], for logging and inspection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeStats {
    /// Centroid that was translated to the origin.
    pub center: Vec3,
    /// Uniform scale applied after recentering.
    pub scale: f32,
}

/// A complete imported model: every primitive of every scene node.
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    pub meshes: Vec<MeshData>,
}

impl ModelData {
    /// Bounding box over all mesh positions, or `None` for an empty model.
    pub fn aabb(&self) -> Option<Aabb> {
        Aabb::from_points(
            self.meshes
                .iter()
                .flat_map(|m| m.positions.iter().copied().map(Vec3::from)),
        )
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(MeshData::vertex_count).sum()
    }

    pub fn index_count(&self) -> usize {
        self.meshes.iter().map(MeshData::index_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }

    /// Recenter on the origin and uniformly rescale so the longest axis
    /// spans [`TARGET_SIZE`].
    ///
    /// The transform is baked into vertex positions once at load. Normals
    /// are untouched; uniform scale and translation do not change them.
    pub fn normalize(&mut self) -> NormalizeStats {
        let Some(aabb) = self.aabb() else {
            return NormalizeStats {
                center: Vec3::ZERO,
                scale: 1.0,
            };
        };
        let center = aabb.center();
        let extent = aabb.max_extent();
        let scale = if extent > f32::EPSILON {
            TARGET_SIZE / extent
        } else {
            1.0
        };
        for mesh in &mut self.meshes {
            for p in &mut mesh.positions {
                *p = ((Vec3::from(*p) - center) * scale).to_array();
            }
        }
        NormalizeStats { center, scale }
    }

    /// Condition imported materials for the pedestal's studio lighting:
    /// a uniform lacquered finish with damped emissive channels.
    pub fn apply_display_finish(&mut self) {
        for mesh in &mut self.meshes {
            mesh.material.metallic = DISPLAY_METALLIC;
            mesh.material.roughness = DISPLAY_ROUGHNESS;
            for c in &mut mesh.material.emissive {
                *c *= DISPLAY_EMISSIVE_SCALE;
            }
        }
    }
}

/// Resting pose on the pedestal: turned mostly away from the camera with a
/// slight downward tilt, so the idle sway catches the rim lights.
pub fn display_pose() -> Pose {
    Pose {
        position: DISPLAY_POSITION,
        rotation: Quat::from_euler(EulerRot::XYZ, DISPLAY_TILT, DISPLAY_TURN, 0.0),
    }
}

/// Stand-in model shown while a catalog entry is still loading. A thin slab
/// with card proportions, run through the same normalize/finish pipeline as
/// real imports.
pub fn placeholder_slab() -> ModelData {
    const HX: f32 = 0.428;
    const HY: f32 = 0.27;
    const HZ: f32 = 0.016;

    #[rustfmt::skip]
    let positions: Vec<[f32; 3]> = vec![
        // +Z face
        [-HX, -HY,  HZ], [ HX, -HY,  HZ], [ HX,  HY,  HZ], [-HX,  HY,  HZ],
        // -Z face
        [ HX, -HY, -HZ], [-HX, -HY, -HZ], [-HX,  HY, -HZ], [ HX,  HY, -HZ],
        // +X face
        [ HX, -HY,  HZ], [ HX, -HY, -HZ], [ HX,  HY, -HZ], [ HX,  HY,  HZ],
        // -X face
        [-HX, -HY, -HZ], [-HX, -HY,  HZ], [-HX,  HY,  HZ], [-HX,  HY, -HZ],
        // +Y face
        [-HX,  HY,  HZ], [ HX,  HY,  HZ], [ HX,  HY, -HZ], [-HX,  HY, -HZ],
        // -Y face
        [-HX, -HY, -HZ], [ HX, -HY, -HZ], [ HX, -HY,  HZ], [-HX, -HY,  HZ],
    ];

    #[rustfmt::skip]
    let face_normals: [[f32; 3]; 6] = [
        [0.0, 0.0, 1.0], [0.0, 0.0, -1.0],
        [1.0, 0.0, 0.0], [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0], [0.0, -1.0, 0.0],
    ];

    let mut normals = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (face, normal) in face_normals.iter().enumerate() {
        normals.extend([*normal; 4]);
        let base = (face * 4) as u32;
        indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    ModelData {
        meshes: vec![MeshData {
            name: "placeholder-slab".to_string(),
            positions,
            normals,
            indices,
            material: Material {
                base_color: [0.13, 0.14, 0.16, 1.0],
                metallic: 0.6,
                roughness: 0.35,
                emissive: [0.0, 0.0, 0.0],
            },
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_model(offset: Vec3) -> ModelData {
        let positions = vec![
            (offset + Vec3::new(0.0, 0.0, 0.0)).to_array(),
            (offset + Vec3::new(1.0, 0.0, 0.0)).to_array(),
            (offset + Vec3::new(0.0, 2.0, 0.0)).to_array(),
        ];
        ModelData {
            meshes: vec![MeshData {
                name: "tri".to_string(),
                positions,
                normals: vec![[0.0, 0.0, 1.0]; 3],
                indices: vec![0, 1, 2],
                material: Material::default(),
            }],
        }
    }

    #[test]
    fn placeholder_has_card_proportions() {
        let slab = placeholder_slab();
        assert_eq!(slab.vertex_count(), 24);
        assert_eq!(slab.index_count(), 36);
        let aabb = slab.aabb().unwrap();
        let size = aabb.size();
        assert!(size.x > size.y && size.y > size.z);
    }

    #[test]
    fn normalize_fills_target_size() {
        let mut slab = placeholder_slab();
        let stats = slab.normalize();
        assert!(stats.scale > 1.0);
        let aabb = slab.aabb().unwrap();
        assert!((aabb.max_extent() - TARGET_SIZE).abs() < 1e-4);
        assert!(aabb.center().length() < 1e-4);
    }

    #[test]
    fn normalize_reports_applied_transform() {
        let mut model = triangle_model(Vec3::new(10.0, 0.0, 0.0));
        let stats = model.normalize();
        assert!((stats.center - Vec3::new(10.5, 1.0, 0.0)).length() < 1e-5);
        assert!((stats.scale - 1.5).abs() < 1e-5);
    }

    #[test]
    fn normalize_of_empty_model_is_identity() {
        let mut model = ModelData::default();
        let stats = model.normalize();
        assert_eq!(stats.scale, 1.0);
        assert_eq!(stats.center, Vec3::ZERO);
    }

    #[test]
    fn display_finish_overrides_surface() {
        let mut model = triangle_model(Vec3::ZERO);
        model.meshes[0].material.emissive = [1.0, 0.5, 0.0];
        model.apply_display_finish();
        let mat = &model.meshes[0].material;
        assert!((mat.metallic - 0.85).abs() < 1e-6);
        assert!((mat.roughness - 0.2).abs() < 1e-6);
        assert!((mat.emissive[0] - 0.6).abs() < 1e-6);
        assert!((mat.emissive[1] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn display_pose_tilts_and_turns() {
        let pose = display_pose();
        assert!(pose.position.y < 0.0);
        let (tilt, turn, roll) = pose.rotation.to_euler(EulerRot::XYZ);
        assert!((tilt - DISPLAY_TILT).abs() < 1e-5);
        assert!((turn - DISPLAY_TURN).abs() < 1e-5);
        assert!(roll.abs() < 1e-5);
    }
}
