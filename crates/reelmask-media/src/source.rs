//! The video source contract consumed by the frame sampler.

use async_trait::async_trait;
use reelmask_core::{PixelBuffer, Resolution, Result};
use serde::{Deserialize, Serialize};

/// Immutable metadata of an opened video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Native width in pixels
    pub width: u32,
    /// Native height in pixels
    pub height: u32,
    /// Duration in seconds
    pub duration_secs: f64,
    /// Native frame rate, when the container reports one
    pub native_fps: Option<f64>,
}

/// A seekable video that yields decoded frames.
///
/// Seeking is the only mutating operation and takes `&mut self`, so at most
/// one seek is ever in flight per source.
#[async_trait]
pub trait VideoSource: Send {
    /// Width, height and duration of the video.
    fn metadata(&self) -> VideoMetadata;

    /// Move to `time_secs` and decode the frame there.
    ///
    /// Resolves once the frame is ready to be read.
    async fn seek(&mut self, time_secs: f64) -> Result<()>;

    /// Read the frame decoded by the last seek, scaled to `size`.
    fn read_frame(&mut self, size: Resolution) -> Result<PixelBuffer>;

    /// Drop transient decode state. Must be safe to call more than once.
    fn release(&mut self) {}
}
