//! Engine configuration.

use reelmask_core::MemoryClass;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Confidence below which model records are discarded.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// JPEG quality used for frame thumbnails.
pub const DEFAULT_THUMBNAIL_QUALITY: u8 = 50;

/// Configuration for an [`InferenceEngine`](crate::engine::InferenceEngine).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Path to the detection model artifact.
    pub model_path: PathBuf,
    /// Records with a lower confidence are dropped.
    pub confidence_threshold: f32,
    /// JPEG quality (1-100) for thumbnails.
    pub thumbnail_quality: u8,
    /// Name of the model's image input.
    pub input_name: String,
    /// Name of the model's detection output.
    pub output_name: String,
    /// Intra-op threads for the ONNX session.
    pub intra_threads: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            thumbnail_quality: DEFAULT_THUMBNAIL_QUALITY,
            input_name: "images".into(),
            output_name: "output".into(),
            intra_threads: num_cpus::get(),
        }
    }
}

/// Settings that choose the sampling resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Explicit memory class; wins over `device_memory_gb`.
    pub memory_class: Option<MemoryClass>,
    /// Device memory reading in GiB, as reported by the platform.
    pub device_memory_gb: Option<f64>,
}

impl SamplerConfig {
    /// Memory class to sample with.
    pub fn memory_class(&self) -> MemoryClass {
        match (self.memory_class, self.device_memory_gb) {
            (Some(class), _) => class,
            (None, Some(gb)) => MemoryClass::from_device_memory_gb(gb),
            (None, None) => MemoryClass::default(),
        }
    }
}

/// Default location of the detection model in the user cache directory.
pub fn default_model_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("reelmask")
        .join("models")
        .join("yolov8.onnx")
}
