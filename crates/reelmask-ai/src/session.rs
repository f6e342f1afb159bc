//! ONNX Runtime session wrapper.
//!
//! Gated behind the `onnx` feature flag.

use crate::backend::{InferenceBackend, ModelLoader};
use crate::config::EngineConfig;
use crate::error::{AiError, AiResult};
use async_trait::async_trait;
use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

fn backend_err(e: impl std::fmt::Display) -> AiError {
    AiError::Backend(e.to_string())
}

fn load_err(path: &Path, e: impl std::fmt::Display) -> AiError {
    AiError::ModelLoadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

/// A loaded ONNX detection model.
pub struct OnnxSession {
    // `Session::run` needs `&mut`; one frame runs at a time.
    session: Arc<Mutex<Session>>,
    input_name: String,
    output_name: String,
    path: PathBuf,
}

impl OnnxSession {
    /// Load an ONNX model from a file path.
    pub fn load(model_path: &Path, config: &EngineConfig) -> AiResult<Self> {
        info!(path = %model_path.display(), "Loading ONNX session");

        let session = Session::builder()
            .map_err(|e| load_err(model_path, e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| load_err(model_path, e))?
            .with_intra_threads(config.intra_threads.max(1))
            .map_err(|e| load_err(model_path, e))?
            .commit_from_file(model_path)
            .map_err(|e| load_err(model_path, e))?;

        info!(path = %model_path.display(), "ONNX session loaded successfully");
        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name: config.input_name.clone(),
            output_name: config.output_name.clone(),
            path: model_path.to_path_buf(),
        })
    }

    /// Path the session was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl InferenceBackend for OnnxSession {
    async fn run(&self, input: Array4<f32>) -> AiResult<Vec<f32>> {
        let session = self.session.clone();
        let input_name = self.input_name.clone();
        let output_name = self.output_name.clone();

        // Inference is CPU bound; keep it off the async workers.
        tokio::task::spawn_blocking(move || {
            let tensor = Tensor::from_array(input).map_err(backend_err)?;
            let mut session = session.lock();
            let outputs = session
                .run(ort::inputs![input_name.as_str() => tensor])
                .map_err(backend_err)?;
            let (shape, data) = outputs[output_name.as_str()]
                .try_extract_tensor::<f32>()
                .map_err(backend_err)?;
            debug!(shape = ?shape, "Model output");
            Ok(data.to_vec())
        })
        .await
        .map_err(backend_err)?
    }
}

/// Loads ONNX sessions on the blocking pool.
pub struct OnnxLoader {
    config: EngineConfig,
}

impl OnnxLoader {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

#[async_trait]
impl ModelLoader for OnnxLoader {
    async fn load(&self, model_path: &Path) -> AiResult<Arc<dyn InferenceBackend>> {
        if !model_path.exists() {
            return Err(AiError::ModelNotFound {
                path: model_path.display().to_string(),
            });
        }

        let path = model_path.to_path_buf();
        let config = self.config.clone();
        let session = tokio::task::spawn_blocking(move || OnnxSession::load(&path, &config))
            .await
            .map_err(|e| load_err(model_path, e))??;
        Ok(Arc::new(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_model_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let loader = OnnxLoader::new(&EngineConfig::default());
        let result = loader.load(&tmp.path().join("absent.onnx")).await;
        assert!(matches!(result, Err(AiError::ModelNotFound { .. })));
    }
}
