//! Inference backend seams.
//!
//! The engine only talks to a model through these traits, so tests can
//! swap in scripted backends and builds without ONNX Runtime still run.

use crate::error::{AiError, AiResult};
use async_trait::async_trait;
use ndarray::Array4;
use std::path::Path;
use std::sync::Arc;

/// A loaded detection model.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Run one `[1, 3, H, W]` tensor and return the flat detection output.
    async fn run(&self, input: Array4<f32>) -> AiResult<Vec<f32>>;
}

/// Turns a model artifact into a runnable backend.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self, model_path: &Path) -> AiResult<Arc<dyn InferenceBackend>>;
}

/// Loader used when the crate is built without the `onnx` feature.
///
/// Every load fails, which leaves the engine in its degraded mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableLoader;

#[async_trait]
impl ModelLoader for UnavailableLoader {
    async fn load(&self, model_path: &Path) -> AiResult<Arc<dyn InferenceBackend>> {
        Err(AiError::ModelLoadFailed {
            path: model_path.display().to_string(),
            reason: "built without the `onnx` feature".into(),
        })
    }
}

/// The loader matching this build's features.
pub fn default_loader(config: &crate::config::EngineConfig) -> Arc<dyn ModelLoader> {
    #[cfg(feature = "onnx")]
    {
        Arc::new(crate::session::OnnxLoader::new(config))
    }
    #[cfg(not(feature = "onnx"))]
    {
        let _ = config;
        Arc::new(UnavailableLoader)
    }
}
