//! Model lifecycle management.
//!
//! A [`ModelHandle`] owns the load state of one model artifact and
//! guarantees that concurrent callers trigger at most one load attempt.
//! Handles are shared process-wide through [`ModelRegistry::global`].

use crate::backend::{InferenceBackend, ModelLoader};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::Notify;
use tracing::{info, warn};

/// Observable state of a model handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    Uninitialized,
    Loading,
    Ready,
    /// Load failed; the engine runs without detections.
    Failed,
}

enum ModelState {
    Uninitialized,
    Loading,
    Ready(Arc<dyn InferenceBackend>),
    Failed(String),
}

/// Load state of a single model file.
pub struct ModelHandle {
    path: PathBuf,
    state: Mutex<ModelState>,
    settled: Notify,
    load_attempts: AtomicUsize,
}

impl ModelHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: Mutex::new(ModelState::Uninitialized),
            settled: Notify::new(),
            load_attempts: AtomicUsize::new(0),
        }
    }

    /// Model file this handle loads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn status(&self) -> ModelStatus {
        match &*self.state.lock() {
            ModelState::Uninitialized => ModelStatus::Uninitialized,
            ModelState::Loading => ModelStatus::Loading,
            ModelState::Ready(_) => ModelStatus::Ready,
            ModelState::Failed(_) => ModelStatus::Failed,
        }
    }

    /// Reason of the last failed load, if the handle is in `Failed`.
    pub fn failure(&self) -> Option<String> {
        match &*self.state.lock() {
            ModelState::Failed(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    /// Number of times a loader was invoked for this handle.
    pub fn load_attempts(&self) -> usize {
        self.load_attempts.load(Ordering::SeqCst)
    }

    /// Return the loaded backend, loading it first if nobody has yet.
    ///
    /// Callers arriving while a load is in flight wait for it instead of
    /// starting another. Returns `None` once the handle is `Failed`; a
    /// failed load is not retried.
    pub async fn ensure_loaded(&self, loader: &dyn ModelLoader) -> Option<Arc<dyn InferenceBackend>> {
        loop {
            let waiter = {
                let mut state = self.state.lock();
                let waiter = match &*state {
                    ModelState::Ready(backend) => return Some(backend.clone()),
                    ModelState::Failed(_) => return None,
                    // Registered before the lock is released so a wakeup is not missed.
                    ModelState::Loading => Some(self.settled.notified()),
                    ModelState::Uninitialized => None,
                };
                if waiter.is_none() {
                    *state = ModelState::Loading;
                }
                waiter
            };

            match waiter {
                Some(notified) => notified.await,
                None => return self.load(loader).await,
            }
        }
    }

    async fn load(&self, loader: &dyn ModelLoader) -> Option<Arc<dyn InferenceBackend>> {
        let attempt = self.load_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        info!(path = %self.path.display(), attempt, "Loading detection model");

        let mut guard = LoadingGuard {
            handle: self,
            armed: true,
        };
        let result = loader.load(&self.path).await;
        guard.armed = false;

        let backend = {
            let mut state = self.state.lock();
            match result {
                Ok(backend) => {
                    *state = ModelState::Ready(backend.clone());
                    Some(backend)
                }
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Model unavailable, continuing without detections"
                    );
                    *state = ModelState::Failed(e.to_string());
                    None
                }
            }
        };
        self.settled.notify_waiters();

        if backend.is_some() {
            info!(path = %self.path.display(), "Detection model ready");
        }
        backend
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("path", &self.path)
            .field("status", &self.status())
            .finish()
    }
}

/// Puts the handle back to `Uninitialized` if a load is abandoned mid-flight.
struct LoadingGuard<'a> {
    handle: &'a ModelHandle,
    armed: bool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            *self.handle.state.lock() = ModelState::Uninitialized;
            self.handle.settled.notify_waiters();
        }
    }
}

/// Shares one [`ModelHandle`] per model path.
#[derive(Default)]
pub struct ModelRegistry {
    handles: Mutex<HashMap<PathBuf, Arc<ModelHandle>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static ModelRegistry {
        static GLOBAL: OnceLock<ModelRegistry> = OnceLock::new();
        GLOBAL.get_or_init(ModelRegistry::new)
    }

    /// Get the handle for `path`, creating it on first use.
    pub fn handle(&self, path: &Path) -> Arc<ModelHandle> {
        self.handles
            .lock()
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(ModelHandle::new(path)))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AiError, AiResult};
    use async_trait::async_trait;
    use ndarray::Array4;
    use std::time::Duration;

    struct EmptyBackend;

    #[async_trait]
    impl InferenceBackend for EmptyBackend {
        async fn run(&self, _input: Array4<f32>) -> AiResult<Vec<f32>> {
            Ok(Vec::new())
        }
    }

    struct SlowLoader {
        calls: AtomicUsize,
        fail: bool,
    }

    impl SlowLoader {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl ModelLoader for SlowLoader {
        async fn load(&self, path: &Path) -> AiResult<Arc<dyn InferenceBackend>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.fail {
                Err(AiError::ModelNotFound {
                    path: path.display().to_string(),
                })
            } else {
                Ok(Arc::new(EmptyBackend))
            }
        }
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_load() {
        let handle = Arc::new(ModelHandle::new("/models/a.onnx"));
        let loader = Arc::new(SlowLoader::new(false));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let handle = handle.clone();
            let loader = loader.clone();
            tasks.push(tokio::spawn(async move {
                handle.ensure_loaded(loader.as_ref()).await.is_some()
            }));
        }
        for task in tasks {
            assert!(task.await.unwrap());
        }

        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
        assert_eq!(handle.load_attempts(), 1);
        assert_eq!(handle.status(), ModelStatus::Ready);
    }

    #[tokio::test]
    async fn test_failed_load_is_sticky() {
        let handle = ModelHandle::new("/models/missing.onnx");
        let loader = SlowLoader::new(true);

        assert!(handle.ensure_loaded(&loader).await.is_none());
        assert_eq!(handle.status(), ModelStatus::Failed);
        assert!(handle.failure().unwrap().contains("missing.onnx"));

        assert!(handle.ensure_loaded(&loader).await.is_none());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_abandoned_load_resets_state() {
        let handle = ModelHandle::new("/models/a.onnx");
        let loader = SlowLoader::new(false);

        let attempt = tokio::time::timeout(Duration::from_millis(1), handle.ensure_loaded(&loader));
        assert!(attempt.await.is_err());
        assert_eq!(handle.status(), ModelStatus::Uninitialized);

        assert!(handle.ensure_loaded(&loader).await.is_some());
        assert_eq!(handle.load_attempts(), 2);
    }

    #[test]
    fn test_registry_shares_handles_per_path() {
        let registry = ModelRegistry::new();
        let a = registry.handle(Path::new("/models/a.onnx"));
        let b = registry.handle(Path::new("/models/a.onnx"));
        let c = registry.handle(Path::new("/models/c.onnx"));
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(registry.len(), 2);
        assert_eq!(a.status(), ModelStatus::Uninitialized);
    }
}
