use pedestal_assets::{AssetError, ModelData, import_model};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread::JoinHandle;
use tracing::{debug, info_span, warn};

/// Errors from the loader's control surface.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("loader is shut down")]
    ShutDown,
}

struct LoadRequest {
    generation: u64,
    label: String,
    path: PathBuf,
}

struct LoadReply {
    generation: u64,
    label: String,
    outcome: Result<ModelData, AssetError>,
}

/// A load that survived staleness filtering, ready for scene insertion.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Imported, normalized, and conditioned; stage it.
    Ready { label: String, model: ModelData },
    /// The import failed; the scene should keep its prior state.
    Failed { label: String, message: String },
}

/// Background model loader.
///
/// Requests flow to a dedicated worker thread over a channel and results
/// flow back over a second one; the frame loop rejoins them through
/// [`poll`](Self::poll), so all scene mutation stays on the main thread.
///
/// # Invariants
/// - Every request carries a monotonically increasing generation; only the
///   latest generation's result is ever surfaced.
/// - After [`shutdown`](Self::shutdown) the loader surfaces nothing: a load
///   resolving late cannot touch scene state.
pub struct ModelLoader {
    requests: Option<Sender<LoadRequest>>,
    replies: Receiver<LoadReply>,
    worker: Option<JoinHandle<()>>,
    alive: Arc<AtomicBool>,
    generation: u64,
    completed: u64,
}

impl ModelLoader {
    pub fn new() -> Self {
        let (request_tx, request_rx) = channel::<LoadRequest>();
        let (reply_tx, reply_rx) = channel::<LoadReply>();
        let alive = Arc::new(AtomicBool::new(true));
        let worker_alive = Arc::clone(&alive);
        let worker = std::thread::spawn(move || worker_loop(request_rx, reply_tx, worker_alive));
        Self {
            requests: Some(request_tx),
            replies: reply_rx,
            worker: Some(worker),
            alive,
            generation: 0,
            completed: 0,
        }
    }

    /// Queue a load. Returns the request's generation; any earlier request
    /// still in flight becomes stale.
    pub fn begin_load(
        &mut self,
        label: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Result<u64, LoaderError> {
        let requests = self.requests.as_ref().ok_or(LoaderError::ShutDown)?;
        self.generation += 1;
        let request = LoadRequest {
            generation: self.generation,
            label: label.into(),
            path: path.into(),
        };
        debug!(generation = request.generation, label = %request.label, "load queued");
        if requests.send(request).is_err() {
            return Err(LoaderError::ShutDown);
        }
        Ok(self.generation)
    }

    /// True while the latest request has not resolved yet.
    pub fn is_loading(&self) -> bool {
        self.requests.is_some() && self.completed < self.generation
    }

    /// Collect the latest finished load, if any. Stale generations are
    /// discarded here, never surfaced. Returns nothing after shutdown.
    pub fn poll(&mut self) -> Option<LoadOutcome> {
        if !self.alive.load(Ordering::Acquire) {
            return None;
        }
        let _span = info_span!("loader_poll").entered();
        loop {
            match self.replies.try_recv() {
                Ok(reply) if reply.generation != self.generation => {
                    self.completed = self.completed.max(reply.generation);
                    debug!(
                        generation = reply.generation,
                        latest = self.generation,
                        label = %reply.label,
                        "stale load discarded"
                    );
                }
                Ok(reply) => {
                    self.completed = reply.generation;
                    return Some(match reply.outcome {
                        Ok(model) => LoadOutcome::Ready {
                            label: reply.label,
                            model,
                        },
                        Err(e) => {
                            warn!(label = %reply.label, "load failed: {e}");
                            LoadOutcome::Failed {
                                label: reply.label,
                                message: e.to_string(),
                            }
                        }
                    });
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return None,
            }
        }
    }

    /// Stop accepting requests, drop pending results, and join the worker.
    /// Idempotent; the loader is inert afterwards.
    pub fn shutdown(&mut self) {
        self.alive.store(false, Ordering::Release);
        // Closing the request channel wakes the worker out of recv.
        self.requests = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("loader worker panicked during shutdown");
            }
        }
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ModelLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(
    requests: Receiver<LoadRequest>,
    replies: Sender<LoadReply>,
    alive: Arc<AtomicBool>,
) {
    while let Ok(request) = requests.recv() {
        if !alive.load(Ordering::Acquire) {
            break;
        }
        let outcome = load_and_condition(&request.path);
        let reply = LoadReply {
            generation: request.generation,
            label: request.label,
            outcome,
        };
        // A send failure means the main side is gone; stop quietly.
        if replies.send(reply).is_err() {
            break;
        }
    }
}

/// The full worker-side pipeline: file I/O, parse, normalize, condition.
fn load_and_condition(path: &std::path::Path) -> Result<ModelData, AssetError> {
    let mut model = import_model(path)?;
    let stats = model.normalize();
    model.apply_display_finish();
    debug!(
        path = %path.display(),
        scale = stats.scale,
        "model normalized for display"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pedestal_assets::TARGET_SIZE;
    use std::time::{Duration, Instant};

    // Minimal triangle covering y in [0, 2], with embedded buffer data.
    const TRIANGLE_GLTF: &str = r#"{
  "asset": {"version": "2.0"},
  "scene": 0,
  "scenes": [{"nodes": [0]}],
  "nodes": [{"mesh": 0}],
  "meshes": [{"name": "tri", "primitives": [
    {"attributes": {"POSITION": 0, "NORMAL": 1}, "indices": 2}
  ]}],
  "buffers": [{"uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAAEAAAAAAAAAAAAAAAAAAAIA/AAAAAAAAAAAAAIA/AAAAAAAAAAAAAIA/AAABAAIA", "byteLength": 78}],
  "bufferViews": [
    {"buffer": 0, "byteOffset": 0, "byteLength": 36},
    {"buffer": 0, "byteOffset": 36, "byteLength": 36},
    {"buffer": 0, "byteOffset": 72, "byteLength": 6}
  ],
  "accessors": [
    {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
     "min": [0.0, 0.0, 0.0], "max": [1.0, 2.0, 0.0]},
    {"bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC3"},
    {"bufferView": 2, "componentType": 5123, "count": 3, "type": "SCALAR"}
  ]
}"#;

    fn fixture(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, TRIANGLE_GLTF).unwrap();
        path
    }

    fn poll_until(loader: &mut ModelLoader, timeout: Duration) -> Option<LoadOutcome> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Some(outcome) = loader.poll() {
                return Some(outcome);
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        None
    }

    #[test]
    fn load_delivers_a_conditioned_model() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = ModelLoader::new();
        loader.begin_load("tri", fixture(&dir, "tri.gltf")).unwrap();

        let outcome = poll_until(&mut loader, Duration::from_secs(10)).expect("load timed out");
        match outcome {
            LoadOutcome::Ready { label, model } => {
                assert_eq!(label, "tri");
                let aabb = model.aabb().unwrap();
                assert!((aabb.max_extent() - TARGET_SIZE).abs() < 1e-4);
                assert!((model.meshes[0].material.roughness - 0.2).abs() < 1e-6);
            }
            LoadOutcome::Failed { message, .. } => panic!("unexpected failure: {message}"),
        }
        assert!(!loader.is_loading());
    }

    #[test]
    fn failures_surface_without_panicking() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = ModelLoader::new();
        loader
            .begin_load("missing", dir.path().join("missing.gltf"))
            .unwrap();

        match poll_until(&mut loader, Duration::from_secs(10)) {
            Some(LoadOutcome::Failed { label, message }) => {
                assert_eq!(label, "missing");
                assert!(!message.is_empty());
            }
            other => panic!("expected a failure, got {other:?}"),
        }
    }

    #[test]
    fn newer_request_supersedes_the_one_in_flight() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = ModelLoader::new();
        loader.begin_load("a", fixture(&dir, "a.gltf")).unwrap();
        loader.begin_load("b", fixture(&dir, "b.gltf")).unwrap();

        let outcome = poll_until(&mut loader, Duration::from_secs(10)).expect("load timed out");
        match outcome {
            LoadOutcome::Ready { label, .. } => assert_eq!(label, "b"),
            LoadOutcome::Failed { message, .. } => panic!("unexpected failure: {message}"),
        }
        // The stale result for "a" was discarded, not queued behind "b".
        assert!(loader.poll().is_none());
    }

    #[test]
    fn shutdown_mid_flight_discards_the_result() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = ModelLoader::new();
        loader.begin_load("tri", fixture(&dir, "tri.gltf")).unwrap();
        loader.shutdown();

        assert!(loader.poll().is_none());
        assert!(!loader.is_loading());
    }

    #[test]
    fn begin_load_after_shutdown_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = ModelLoader::new();
        loader.shutdown();
        assert!(matches!(
            loader.begin_load("tri", fixture(&dir, "tri.gltf")),
            Err(LoaderError::ShutDown)
        ));
    }

    #[test]
    fn shutdown_is_idempotent() {
        let mut loader = ModelLoader::new();
        loader.shutdown();
        loader.shutdown();
    }

    #[test]
    fn is_loading_tracks_the_latest_generation() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = ModelLoader::new();
        assert!(!loader.is_loading());
        loader.begin_load("tri", fixture(&dir, "tri.gltf")).unwrap();
        assert!(loader.is_loading());
        poll_until(&mut loader, Duration::from_secs(10)).expect("load timed out");
        assert!(!loader.is_loading());
    }
}
