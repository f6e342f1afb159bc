//! Media file probing to get metadata without full decode.

use crate::source::VideoMetadata;
use ffmpeg_sidecar::command::{ffmpeg_is_installed, FfmpegCommand};
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use reelmask_core::{ReelError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Information about a video file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaProbe {
    /// File path
    pub path: String,
    /// Duration in seconds
    pub duration_secs: f64,
    /// Width of the primary video stream
    pub width: u32,
    /// Height of the primary video stream
    pub height: u32,
    /// Frame rate reported for the primary video stream
    pub fps: Option<f64>,
    /// Pixel format of the primary video stream
    pub pixel_format: String,
}

impl MediaProbe {
    /// Probe a media file.
    ///
    /// Runs FFmpeg against the input without producing output and collects
    /// the stream and duration lines it prints.
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.to_string_lossy().to_string();

        if !path.exists() {
            return Err(ReelError::SourceUnavailable(format!(
                "File not found: {}",
                path_str
            )));
        }
        if !ffmpeg_is_installed() {
            return Err(ReelError::SourceUnavailable(
                "FFmpeg binary not found on PATH".into(),
            ));
        }

        let mut child = FfmpegCommand::new()
            .hide_banner()
            .input(&path_str)
            .args(["-t", "0", "-f", "null", "-"])
            .spawn()
            .map_err(|e| ReelError::SourceUnavailable(format!("Failed to spawn FFmpeg: {e}")))?;

        let mut duration = None;
        let mut video = None;
        let mut errors = Vec::new();

        let events = child
            .iter()
            .map_err(|e| ReelError::SourceUnavailable(format!("Failed to read FFmpeg output: {e}")))?;
        for event in events {
            match event {
                FfmpegEvent::ParsedDuration(d) if duration.is_none() => {
                    duration = Some(d.duration);
                }
                FfmpegEvent::ParsedInputStream(stream) if video.is_none() => {
                    if let Some(v) = stream.video_data() {
                        video = Some((v.width, v.height, v.fps, v.pix_fmt.clone()));
                    }
                }
                FfmpegEvent::Error(message)
                | FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, message) => {
                    errors.push(message);
                }
                _ => {}
            }
        }
        let _ = child.wait();

        let (width, height, fps, pixel_format) = video.ok_or_else(|| {
            ReelError::SourceUnavailable(format!(
                "No video stream in {}: {}",
                path_str,
                errors.join("; ")
            ))
        })?;
        let duration_secs = duration.ok_or_else(|| {
            ReelError::SourceUnavailable(format!("Unknown duration for {}", path_str))
        })?;

        debug!(path = %path_str, width, height, duration_secs, "Probed media file");

        Ok(Self {
            path: path_str,
            duration_secs,
            width,
            height,
            fps: (fps > 0.0).then_some(fps as f64),
            pixel_format,
        })
    }

    /// Metadata in the form consumed by the sampler.
    pub fn metadata(&self) -> VideoMetadata {
        VideoMetadata {
            width: self.width,
            height: self.height,
            duration_secs: self.duration_secs,
            native_fps: self.fps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_missing_file() {
        let tmp = tempfile::tempdir().expect("failed to create tempdir");
        let err = MediaProbe::probe(tmp.path().join("missing.mp4")).unwrap_err();
        assert!(matches!(err, ReelError::SourceUnavailable(_)));
    }

    #[test]
    fn test_metadata_from_probe() {
        let probe = MediaProbe {
            path: "clip.mp4".into(),
            duration_secs: 12.5,
            width: 1280,
            height: 720,
            fps: Some(25.0),
            pixel_format: "yuv420p".into(),
        };
        let meta = probe.metadata();
        assert_eq!(meta.width, 1280);
        assert_eq!(meta.height, 720);
        assert_eq!(meta.native_fps, Some(25.0));
    }
}
