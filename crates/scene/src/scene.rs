use pedestal_assets::ModelData;
use pedestal_common::{ModelId, Pose, Transform};
use pedestal_director::{Easing, Tween};
use tracing::{debug, info};

const ENTER_OFFSET: f32 = 3.0;
const ENTER_DURATION: f32 = 0.7;
const EXIT_OFFSET: f32 = -3.0;
const EXIT_DURATION: f32 = 0.5;

/// A scene change observable by the shell and tests.
///
/// `ModelReady` fires exactly once per successful insertion and
/// `ModelRemoved` exactly once per model leaving the scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEvent {
    /// A model finished loading and is now the current one.
    ModelReady { id: ModelId, label: String },
    /// A model's exit slide completed (or it was displaced early) and it
    /// left the scene.
    ModelRemoved { id: ModelId },
    /// A load failed; the scene kept its prior state.
    LoadFailed { message: String },
}

/// A model staged on the pedestal, with its slide state.
///
/// The slide offset belongs to the scene's swap choreography and is
/// composed additively at render time; the director animates `transform`
/// and never sees the slide, so the two writers cannot fight.
#[derive(Debug)]
pub struct StagedModel {
    pub id: ModelId,
    pub label: String,
    pub data: ModelData,
    pub transform: Transform,
    slide: Tween,
}

impl StagedModel {
    /// Current X displacement of the swap slide.
    pub fn slide_offset(&self) -> f32 {
        self.slide.value()
    }

    /// The transform to render with: the animated pose plus the slide.
    pub fn display_transform(&self) -> Transform {
        let mut t = self.transform;
        t.position.x += self.slide.value();
        t
    }
}

/// The viewer scene: at most one current model, plus (transiently) one
/// outgoing model mid-swap.
///
/// All mutation happens on the frame thread. The outgoing model is
/// disposed only after its exit slide completes; a failed load never
/// leaves a half-inserted model behind.
#[derive(Debug, Default)]
pub struct ViewerScene {
    current: Option<StagedModel>,
    exiting: Option<StagedModel>,
    events: Vec<SceneEvent>,
}

impl ViewerScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&StagedModel> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut StagedModel> {
        self.current.as_mut()
    }

    pub fn exiting(&self) -> Option<&StagedModel> {
        self.exiting.as_ref()
    }

    pub fn has_model(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_swapping(&self) -> bool {
        self.exiting.is_some()
    }

    /// Take all pending scene events in emission order.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    /// Stage a fully loaded model as current. The previous current model,
    /// if any, begins its exit slide; an exit already in progress is cut
    /// short and removed immediately so at most two models ever exist.
    ///
    /// Returns the new model's id.
    pub fn insert(&mut self, label: impl Into<String>, data: ModelData, pose: Pose) -> ModelId {
        let label = label.into();
        if let Some(stale) = self.exiting.take() {
            debug!(id = %stale.id, "exit cut short by a second swap");
            self.events.push(SceneEvent::ModelRemoved { id: stale.id });
        }
        if let Some(mut outgoing) = self.current.take() {
            outgoing.slide = Tween::new(
                outgoing.slide.value(),
                EXIT_OFFSET,
                EXIT_DURATION,
                Easing::QuadIn,
            );
            self.exiting = Some(outgoing);
        }

        let id = ModelId::new();
        info!(
            %id,
            label,
            meshes = data.meshes.len(),
            vertices = data.vertex_count(),
            "model staged"
        );
        self.current = Some(StagedModel {
            id,
            label: label.clone(),
            data,
            transform: Transform::from_pose(pose),
            slide: Tween::new(ENTER_OFFSET, 0.0, ENTER_DURATION, Easing::QuadOut),
        });
        self.events.push(SceneEvent::ModelReady { id, label });
        id
    }

    /// Record a failed load. Scene state is untouched.
    pub fn report_load_failure(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(message, "load failed; scene unchanged");
        self.events.push(SceneEvent::LoadFailed { message });
    }

    /// Copy the director's animated pose onto the current model.
    pub fn apply_pose(&mut self, pose: Pose) {
        if let Some(model) = &mut self.current {
            model.transform = Transform::from_pose(pose);
        }
    }

    /// Advance the swap slides. The outgoing model is removed exactly when
    /// its exit completes.
    pub fn update(&mut self, dt: f32) {
        if let Some(model) = &mut self.current {
            model.slide.advance(dt);
        }
        if let Some(outgoing) = &mut self.exiting {
            outgoing.slide.advance(dt);
            if outgoing.slide.finished() {
                let id = outgoing.id;
                self.exiting = None;
                self.events.push(SceneEvent::ModelRemoved { id });
                debug!(%id, "exit slide complete");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pedestal_assets::{display_pose, placeholder_slab};

    fn ready_scene() -> (ViewerScene, ModelId) {
        let mut scene = ViewerScene::new();
        let id = scene.insert("first", placeholder_slab(), display_pose());
        // Let the enter slide settle.
        for _ in 0..60 {
            scene.update(0.016);
        }
        scene.drain_events();
        (scene, id)
    }

    #[test]
    fn insert_slides_in_from_the_right() {
        let mut scene = ViewerScene::new();
        scene.insert("first", placeholder_slab(), display_pose());
        let model = scene.current().unwrap();
        assert!((model.slide_offset() - 3.0).abs() < 1e-6);
        scene.update(0.1);
        assert!(scene.current().unwrap().slide_offset() < 3.0);
    }

    #[test]
    fn enter_slide_settles_exactly_at_zero() {
        let (scene, _) = ready_scene();
        assert_eq!(scene.current().unwrap().slide_offset(), 0.0);
    }

    #[test]
    fn insert_emits_ready_exactly_once() {
        let mut scene = ViewerScene::new();
        let id = scene.insert("first", placeholder_slab(), display_pose());
        let events = scene.drain_events();
        assert_eq!(
            events,
            vec![SceneEvent::ModelReady {
                id,
                label: "first".to_string()
            }]
        );
        for _ in 0..120 {
            scene.update(0.016);
        }
        assert!(scene.drain_events().is_empty());
    }

    #[test]
    fn swap_keeps_the_outgoing_model_until_its_exit_completes() {
        let (mut scene, first) = ready_scene();
        scene.insert("second", placeholder_slab(), display_pose());
        assert!(scene.is_swapping());
        assert_eq!(scene.exiting().unwrap().id, first);

        // Mid-exit the outgoing model is still present and sliding left.
        scene.update(0.2);
        let outgoing = scene.exiting().unwrap();
        assert!(outgoing.slide_offset() < 0.0);
        assert!(outgoing.slide_offset() > -3.0);

        scene.update(0.4);
        assert!(!scene.is_swapping());
        let events = scene.drain_events();
        let removed: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, SceneEvent::ModelRemoved { id } if *id == first))
            .collect();
        assert_eq!(removed.len(), 1);
    }

    #[test]
    fn rapid_third_insert_cuts_the_stale_exit_short() {
        let (mut scene, first) = ready_scene();
        let second = scene.insert("second", placeholder_slab(), display_pose());
        let third = scene.insert("third", placeholder_slab(), display_pose());

        assert_eq!(scene.current().unwrap().id, third);
        assert_eq!(scene.exiting().unwrap().id, second);

        let events = scene.drain_events();
        assert!(events.contains(&SceneEvent::ModelRemoved { id: first }));
    }

    #[test]
    fn load_failure_keeps_the_scene_intact() {
        let (mut scene, first) = ready_scene();
        scene.report_load_failure("no such file");
        assert_eq!(scene.current().unwrap().id, first);
        assert!(!scene.is_swapping());
        assert_eq!(
            scene.drain_events(),
            vec![SceneEvent::LoadFailed {
                message: "no such file".to_string()
            }]
        );
    }

    #[test]
    fn apply_pose_moves_only_the_current_model() {
        let (mut scene, _) = ready_scene();
        let second = scene.insert("second", placeholder_slab(), display_pose());
        let exiting_before = scene.exiting().unwrap().transform;

        let pose = Pose::new(glam::Vec3::new(0.0, 1.0, 0.0), glam::Quat::IDENTITY);
        scene.apply_pose(pose);

        assert_eq!(scene.current().unwrap().id, second);
        assert_eq!(scene.current().unwrap().transform.position.y, 1.0);
        assert_eq!(
            scene.exiting().unwrap().transform.position,
            exiting_before.position
        );
    }

    #[test]
    fn display_transform_composes_the_slide() {
        let mut scene = ViewerScene::new();
        scene.insert("first", placeholder_slab(), display_pose());
        let model = scene.current().unwrap();
        let shown = model.display_transform();
        assert!((shown.position.x - 3.0).abs() < 1e-6);
        assert_eq!(shown.position.y, model.transform.position.y);
    }

    #[test]
    fn update_without_models_is_a_no_op() {
        let mut scene = ViewerScene::new();
        scene.update(1.0);
        assert!(scene.drain_events().is_empty());
        assert!(!scene.has_model());
    }
}
