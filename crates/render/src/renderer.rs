use glam::{EulerRot, Vec3};
use pedestal_scene::{StagedModel, ViewerScene};

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct SceneView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for SceneView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.2, 6.0),
            target: Vec3::ZERO,
            fov_degrees: 30.0,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads scene state and a view configuration, then produces
/// output. It never mutates the scene — staging and animation are
/// scene-owned.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene state and view.
    fn render(&self, scene: &ViewerScene, view: &SceneView) -> Self::Output;
}

/// Headless frame renderer.
///
/// Produces a human-readable description of what the GPU backend would
/// draw. Useful for CLI output, logging, and testing the render interface
/// without a window.
#[derive(Debug, Default)]
pub struct TextFrameRenderer;

impl TextFrameRenderer {
    pub fn new() -> Self {
        Self
    }

    fn describe(out: &mut String, heading: &str, model: &StagedModel) {
        let t = model.display_transform();
        let (pitch, yaw, _roll) = t.rotation.to_euler(EulerRot::XYZ);
        out.push_str(&format!(
            "{heading}: {} [{:.8}] meshes={} vertices={} slide={:+.2}\n",
            model.label,
            &model.id.0.to_string()[..8],
            model.data.meshes.len(),
            model.data.vertex_count(),
            model.slide_offset()
        ));
        out.push_str(&format!(
            "  pose: pos=({:.2}, {:.2}, {:.2}) yaw={:.2} pitch={:.2}\n",
            t.position.x, t.position.y, t.position.z, yaw, pitch
        ));
    }
}

impl Renderer for TextFrameRenderer {
    type Output = String;

    fn render(&self, scene: &ViewerScene, view: &SceneView) -> String {
        let mut out = String::new();
        out.push_str("=== Pedestal Frame ===\n");
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}\n",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        ));

        match scene.current() {
            Some(model) => Self::describe(&mut out, "Model", model),
            None => out.push_str("Model: <none>\n"),
        }
        if let Some(outgoing) = scene.exiting() {
            Self::describe(&mut out, "Exiting", outgoing);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pedestal_assets::{display_pose, placeholder_slab};

    #[test]
    fn empty_scene_renders_a_placeholder_line() {
        let scene = ViewerScene::new();
        let output = TextFrameRenderer::new().render(&scene, &SceneView::default());

        assert!(output.contains("Model: <none>"));
        assert!(output.contains("fov=30"));
    }

    #[test]
    fn staged_model_appears_in_the_frame() {
        let mut scene = ViewerScene::new();
        scene.insert("obsidian", placeholder_slab(), display_pose());

        let output = TextFrameRenderer::new().render(&scene, &SceneView::default());
        assert!(output.contains("Model: obsidian"));
        assert!(output.contains("vertices=24"));
        assert!(output.contains("slide=+3.00"));
    }

    #[test]
    fn exiting_model_is_listed_mid_swap() {
        let mut scene = ViewerScene::new();
        scene.insert("first", placeholder_slab(), display_pose());
        for _ in 0..60 {
            scene.update(0.016);
        }
        scene.insert("second", placeholder_slab(), display_pose());
        scene.update(0.1);

        let output = TextFrameRenderer::new().render(&scene, &SceneView::default());
        assert!(output.contains("Model: second"));
        assert!(output.contains("Exiting: first"));
    }

    #[test]
    fn default_view_matches_the_display_framing() {
        let view = SceneView::default();
        assert_eq!(view.fov_degrees, 30.0);
        assert_eq!(view.target, Vec3::ZERO);
        assert!((view.eye.z - 6.0).abs() < 1e-6);
    }
}
