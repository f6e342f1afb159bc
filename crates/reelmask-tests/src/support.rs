//! Scripted model backends shared by the integration tests.

use async_trait::async_trait;
use ndarray::Array4;
use reelmask_ai::{AiResult, EngineConfig, InferenceBackend, InferenceEngine, ModelHandle, ModelLoader};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Reports one box whose position follows the red channel of pixel (0, 0),
/// so different frames give different detections.
pub struct ScriptedBackend {
    pub runs: Arc<AtomicUsize>,
}

#[async_trait]
impl InferenceBackend for ScriptedBackend {
    async fn run(&self, input: Array4<f32>) -> AiResult<Vec<f32>> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let offset = input[[0, 0, 0, 0]] * 100.0;
        Ok(vec![
            offset, 10.0, offset + 40.0, 50.0, 0.9, 0.0, //
            0.0, 0.0, 5.0, 5.0, 0.2, 1.0,
        ])
    }
}

pub struct ScriptedLoader {
    pub loads: Arc<AtomicUsize>,
    pub runs: Arc<AtomicUsize>,
    pub delay: Duration,
}

impl ScriptedLoader {
    pub fn new() -> Self {
        Self {
            loads: Arc::new(AtomicUsize::new(0)),
            runs: Arc::new(AtomicUsize::new(0)),
            delay: Duration::from_millis(0),
        }
    }
}

#[async_trait]
impl ModelLoader for ScriptedLoader {
    async fn load(&self, _path: &Path) -> AiResult<Arc<dyn InferenceBackend>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(Arc::new(ScriptedBackend {
            runs: self.runs.clone(),
        }))
    }
}

/// Engine with a private model handle so tests do not share load state.
pub fn engine_with(loader: Arc<dyn ModelLoader>) -> InferenceEngine {
    let config = EngineConfig::default();
    let model = Arc::new(ModelHandle::new(&config.model_path));
    InferenceEngine::with_model(config, model, loader)
}
