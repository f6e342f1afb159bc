//! ReelMask AI - detection inference and frame sampling
//!
//! Provides:
//! - A shared, load-once detection model handle with a degraded mode
//! - Frame preprocessing, model output parsing and JPEG thumbnails
//! - A per-frame result cache
//! - A cancellable frame sampler over any [`VideoSource`](reelmask_media::VideoSource)
//!
//! ONNX Runtime support is behind the `onnx` feature. Without it every
//! model load fails and frames are returned without detections.

pub mod backend;
pub mod cache;
pub mod config;
pub mod detection;
pub mod engine;
pub mod error;
pub mod model_manager;
pub mod preprocess;
pub mod sampler;
#[cfg(feature = "onnx")]
pub mod session;
pub mod thumbnail;

pub use backend::{default_loader, InferenceBackend, ModelLoader, UnavailableLoader};
pub use config::{EngineConfig, SamplerConfig};
pub use detection::{Detection, FrameResult};
pub use engine::InferenceEngine;
pub use error::{AiError, AiResult};
pub use model_manager::{ModelHandle, ModelRegistry, ModelStatus};
pub use sampler::{
    CancelToken, ExtractionOutcome, Extraction, FrameSampler, ProcessedVideo, SampleProgress,
    SampleStep,
};
#[cfg(feature = "onnx")]
pub use session::{OnnxLoader, OnnxSession};
