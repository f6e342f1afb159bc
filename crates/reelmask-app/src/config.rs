//! Application configuration.

use anyhow::{Context, Result};
use reelmask_ai::{EngineConfig, SamplerConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything the binary can be configured with from a JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub sampler: SamplerConfig,
}

impl AppConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid config {}", path.display()))
    }
}
