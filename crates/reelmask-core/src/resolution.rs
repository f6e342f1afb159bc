//! Output resolution policy.
//!
//! Sampled frames are scaled down on devices with little memory so a long
//! video does not exhaust RAM while decoded buffers and thumbnails pile up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReelError;

/// Coarse hint about how much memory the host can spend on frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryClass {
    /// Around 2 GB or less
    Small,
    /// Around 4 GB, also used when nothing is known
    #[default]
    Medium,
    /// More than 4 GB
    Large,
}

impl MemoryClass {
    /// Classify a device-memory reading in gigabytes.
    pub fn from_device_memory_gb(gigabytes: f64) -> Self {
        if !gigabytes.is_finite() || gigabytes <= 0.0 {
            return Self::default();
        }
        if gigabytes <= 2.0 {
            Self::Small
        } else if gigabytes <= 4.0 {
            Self::Medium
        } else {
            Self::Large
        }
    }

    /// Linear scale factor applied to both source dimensions.
    pub fn scale_factor(self) -> f64 {
        match self {
            Self::Small => 0.5,
            Self::Medium => 0.75,
            Self::Large => 1.0,
        }
    }
}

impl fmt::Display for MemoryClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        };
        f.write_str(name)
    }
}

impl FromStr for MemoryClass {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            other => Err(ReelError::InvalidParameter(format!(
                "unknown memory class '{other}' (expected small, medium or large)"
            ))),
        }
    }
}

/// Target frame resolution. Both dimensions are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Maps source dimensions and a memory class to the sampling resolution.
pub struct ResolutionManager;

impl ResolutionManager {
    /// Scale `source_width x source_height` by the memory class factor.
    ///
    /// Dimensions are rounded to the nearest pixel and clamped to 1, so a
    /// zero-sized source still yields a usable 1x1 target.
    pub fn adjust(source_width: u32, source_height: u32, memory: MemoryClass) -> Resolution {
        let factor = memory.scale_factor();
        let scale = |v: u32| ((v as f64 * factor).round() as u32).max(1);
        Resolution::new(scale(source_width), scale(source_height))
    }
}
