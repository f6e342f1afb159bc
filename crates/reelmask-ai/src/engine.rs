//! The frame inference engine.
//!
//! Runs detection on sampled frames, caches the per-frame result and keeps
//! working when the model cannot be loaded: frames then carry a thumbnail
//! but no detections.

use crate::backend::{default_loader, InferenceBackend, ModelLoader};
use crate::cache::FrameCache;
use crate::config::EngineConfig;
use crate::detection::{parse_detections, Detection, FrameResult};
use crate::error::AiResult;
use crate::model_manager::{ModelHandle, ModelRegistry, ModelStatus};
use crate::preprocess::to_input_tensor;
use crate::thumbnail::encode_thumbnail;
use reelmask_core::{FrameIndex, FrameRate, PixelBuffer};
use std::sync::Arc;
use tracing::{debug, warn};

/// Sampling grid: frame index `n` sits at `n / 30` seconds.
pub const SAMPLE_RATE: FrameRate = FrameRate::FPS_30;

/// Detection engine with a per-frame result cache.
pub struct InferenceEngine {
    config: EngineConfig,
    model: Arc<ModelHandle>,
    loader: Arc<dyn ModelLoader>,
    cache: FrameCache,
}

impl InferenceEngine {
    /// Create an engine whose model handle is shared process-wide by path.
    pub fn new(config: EngineConfig, loader: Arc<dyn ModelLoader>) -> Self {
        let model = ModelRegistry::global().handle(&config.model_path);
        Self::with_model(config, model, loader)
    }

    /// Create an engine using the loader that matches this build.
    pub fn with_default_loader(config: EngineConfig) -> Self {
        let loader = default_loader(&config);
        Self::new(config, loader)
    }

    /// Create an engine around an explicit model handle.
    pub fn with_model(
        config: EngineConfig,
        model: Arc<ModelHandle>,
        loader: Arc<dyn ModelLoader>,
    ) -> Self {
        Self {
            config,
            model,
            loader,
            cache: FrameCache::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Sampling grid used to map frame indices to timestamps.
    pub fn sample_rate(&self) -> FrameRate {
        SAMPLE_RATE
    }

    pub fn status(&self) -> ModelStatus {
        self.model.status()
    }

    pub fn model(&self) -> &Arc<ModelHandle> {
        &self.model
    }

    /// Load the model ahead of the first frame.
    pub async fn warm_up(&self) -> ModelStatus {
        self.model.ensure_loaded(self.loader.as_ref()).await;
        self.model.status()
    }

    /// Process the frame at grid position `index`.
    ///
    /// Returns the cached result if this index was already processed. Never
    /// fails: detection problems degrade to an empty detection list and a
    /// thumbnail problem to an empty thumbnail.
    pub async fn process_frame(&self, frame: PixelBuffer, index: FrameIndex) -> Arc<FrameResult> {
        self.cache
            .get_or_compute(index, move || self.compute(frame, index))
            .await
    }

    /// Process the frame sampled at `timestamp` seconds, snapped to the grid.
    pub async fn process_frame_at(&self, frame: PixelBuffer, timestamp: f64) -> Arc<FrameResult> {
        let index = SAMPLE_RATE.nearest_index(timestamp);
        self.process_frame(frame, index).await
    }

    /// Cached result for `index`, if it was processed.
    pub fn cached(&self, index: FrameIndex) -> Option<Arc<FrameResult>> {
        self.cache.get(index)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    async fn compute(&self, frame: PixelBuffer, index: FrameIndex) -> FrameResult {
        let timestamp = SAMPLE_RATE.timestamp_secs(index);

        let detections = match self.model.ensure_loaded(self.loader.as_ref()).await {
            Some(backend) => self
                .detect(backend.as_ref(), &frame)
                .await
                .unwrap_or_else(|e| {
                    warn!(frame = index, error = %e, "Detection failed, frame kept without objects");
                    Vec::new()
                }),
            None => Vec::new(),
        };

        let thumbnail = encode_thumbnail(&frame, self.config.thumbnail_quality).unwrap_or_else(|e| {
            warn!(frame = index, error = %e, "Thumbnail encoding failed");
            Vec::new()
        });

        debug!(
            frame = index,
            timestamp,
            detections = detections.len(),
            thumbnail_bytes = thumbnail.len(),
            "Frame processed"
        );
        FrameResult::new(index, timestamp, detections, thumbnail)
    }

    async fn detect(
        &self,
        backend: &dyn InferenceBackend,
        frame: &PixelBuffer,
    ) -> AiResult<Vec<Detection>> {
        let input = to_input_tensor(frame)?;
        let raw = backend.run(input).await?;
        Ok(parse_detections(&raw, self.config.confidence_threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::UnavailableLoader;
    use crate::error::AiError;
    use async_trait::async_trait;
    use ndarray::Array4;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedBackend {
        output: Vec<f32>,
        runs: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl InferenceBackend for FixedBackend {
        async fn run(&self, input: Array4<f32>) -> AiResult<Vec<f32>> {
            assert_eq!(input.shape()[..2], [1, 3]);
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(self.output.clone())
        }
    }

    struct FixedLoader {
        output: Vec<f32>,
        runs: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ModelLoader for FixedLoader {
        async fn load(&self, _path: &Path) -> AiResult<Arc<dyn InferenceBackend>> {
            Ok(Arc::new(FixedBackend {
                output: self.output.clone(),
                runs: self.runs.clone(),
            }))
        }
    }

    struct BrokenBackend;

    #[async_trait]
    impl InferenceBackend for BrokenBackend {
        async fn run(&self, _input: Array4<f32>) -> AiResult<Vec<f32>> {
            Err(AiError::Backend("device lost".into()))
        }
    }

    struct BrokenLoader;

    #[async_trait]
    impl ModelLoader for BrokenLoader {
        async fn load(&self, _path: &Path) -> AiResult<Arc<dyn InferenceBackend>> {
            Ok(Arc::new(BrokenBackend))
        }
    }

    fn engine(loader: Arc<dyn ModelLoader>) -> InferenceEngine {
        let config = EngineConfig::default();
        let model = Arc::new(ModelHandle::new(&config.model_path));
        InferenceEngine::with_model(config, model, loader)
    }

    #[tokio::test]
    async fn test_process_frame_with_detections() {
        let runs = Arc::new(AtomicUsize::new(0));
        let engine = engine(Arc::new(FixedLoader {
            output: vec![
                1.0, 2.0, 11.0, 12.0, 0.8, 0.0, //
                0.0, 0.0, 1.0, 1.0, 0.1, 0.0,
            ],
            runs: runs.clone(),
        }));

        let result = engine
            .process_frame(PixelBuffer::test_pattern(32, 18), 15)
            .await;
        assert_eq!(result.id, "frame-0.500");
        assert_eq!(result.frame_index, 15);
        assert_eq!(result.detections.len(), 1);
        assert_eq!(result.detections[0].label, "Object-0");
        assert!(!result.thumbnail.is_empty());
        assert_eq!(engine.status(), ModelStatus::Ready);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_repeated_frame_served_from_cache() {
        let runs = Arc::new(AtomicUsize::new(0));
        let engine = engine(Arc::new(FixedLoader {
            output: Vec::new(),
            runs: runs.clone(),
        }));

        let first = engine.process_frame(PixelBuffer::new(8, 8), 2).await;
        let second = engine.process_frame_at(PixelBuffer::new(8, 8), 2.0 / 30.0).await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(engine.cache_len(), 1);

        engine.clear_cache();
        assert!(engine.cached(2).is_none());
        engine.process_frame(PixelBuffer::new(8, 8), 2).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_missing_model_degrades() {
        let engine = engine(Arc::new(UnavailableLoader));
        assert_eq!(engine.warm_up().await, ModelStatus::Failed);

        let result = engine.process_frame(PixelBuffer::test_pattern(16, 16), 0).await;
        assert!(result.detections.is_empty());
        assert_eq!(&result.thumbnail[..2], &[0xFF, 0xD8]);
        assert_eq!(engine.model().load_attempts(), 1);
    }

    #[tokio::test]
    async fn test_backend_failure_keeps_frame() {
        let engine = engine(Arc::new(BrokenLoader));
        let result = engine.process_frame(PixelBuffer::test_pattern(16, 16), 3).await;
        assert!(result.detections.is_empty());
        assert!(!result.thumbnail.is_empty());
        assert_eq!(result.id, "frame-0.100");
    }

    #[tokio::test]
    async fn test_empty_frame_has_no_thumbnail() {
        let engine = engine(Arc::new(UnavailableLoader));
        let result = engine.process_frame(PixelBuffer::new(0, 0), 0).await;
        assert!(result.thumbnail.is_empty());
        assert!(result.detections.is_empty());
    }
}
