//! ReelMask Media - video sources for the frame sampler
//!
//! This crate handles:
//! - The `VideoSource` contract (metadata, async seek, frame readout)
//! - FFmpeg-backed decoding of video files
//! - Media file probing
//! - A synthetic test-pattern source

pub mod decoder;
pub mod pattern;
pub mod probe;
pub mod source;

pub use decoder::FfmpegSource;
pub use pattern::PatternSource;
pub use probe::MediaProbe;
pub use source::{VideoMetadata, VideoSource};

/// Check FFmpeg availability (call once at startup).
pub fn init() -> bool {
    let available = ffmpeg_sidecar::command::ffmpeg_is_installed();
    if available {
        tracing::info!("ReelMask media initialized");
    } else {
        tracing::warn!("FFmpeg binary not found; file sources will be unavailable");
    }
    available
}
