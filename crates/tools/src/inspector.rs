use pedestal_director::{IdleAnimationDirector, InteractionState};
use pedestal_scene::{StagedModel, ViewerScene};

/// Read-only queries against the viewer state for debugging and the
/// overlay UI.
pub struct ViewerInspector;

impl ViewerInspector {
    /// Produce a summary of the viewer state.
    pub fn summary(scene: &ViewerScene, director: &IdleAnimationDirector) -> ViewerSummary {
        ViewerSummary {
            state: director.state(),
            model: scene.current().map(|m| m.label.clone()),
            mesh_count: scene.current().map(|m| m.data.meshes.len()).unwrap_or(0),
            vertex_count: scene.current().map(|m| m.data.vertex_count()).unwrap_or(0),
            swapping: scene.is_swapping(),
            pose_drift: director.pose().distance(&director.anchor()),
        }
    }

    /// Describe one staged model in detail.
    pub fn inspect_model(model: &StagedModel) -> ModelInfo {
        let pose = model.transform.pose();
        ModelInfo {
            short_id: model.id.0.to_string()[..8].to_string(),
            label: model.label.clone(),
            mesh_count: model.data.meshes.len(),
            vertex_count: model.data.vertex_count(),
            slide_offset: model.slide_offset(),
            position: pose.position.to_array(),
        }
    }
}

/// Summary of viewer state for the inspector.
#[derive(Debug, Clone)]
pub struct ViewerSummary {
    pub state: InteractionState,
    pub model: Option<String>,
    pub mesh_count: usize,
    pub vertex_count: usize,
    pub swapping: bool,
    /// Distance of the animated pose from the rest pose.
    pub pose_drift: f32,
}

impl std::fmt::Display for ViewerSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Viewer: state={:?} model={} meshes={} vertices={} swapping={} drift={:.3}",
            self.state,
            self.model.as_deref().unwrap_or("<none>"),
            self.mesh_count,
            self.vertex_count,
            self.swapping,
            self.pose_drift,
        )
    }
}

/// Detailed info about a single staged model.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub short_id: String,
    pub label: String,
    pub mesh_count: usize,
    pub vertex_count: usize,
    pub slide_offset: f32,
    pub position: [f32; 3],
}

impl std::fmt::Display for ModelInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Model {} [{}] meshes={} vertices={} slide={:+.2} pos=({:.2}, {:.2}, {:.2})",
            self.label,
            self.short_id,
            self.mesh_count,
            self.vertex_count,
            self.slide_offset,
            self.position[0],
            self.position[1],
            self.position[2],
        )
    }
}
