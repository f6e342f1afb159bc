//! Video decoder using FFmpeg via ffmpeg-sidecar.

use crate::probe::MediaProbe;
use crate::source::{VideoMetadata, VideoSource};
use async_trait::async_trait;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use reelmask_core::{PixelBuffer, ReelError, Resolution, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Video file source backed by FFmpeg.
///
/// Each seek spawns FFmpeg on the blocking pool to decode the single frame
/// at that time as raw RGBA. This approach works without system FFmpeg
/// development headers.
pub struct FfmpegSource {
    path: PathBuf,
    metadata: VideoMetadata,
    current: Option<PixelBuffer>,
}

impl FfmpegSource {
    /// Open a video file for decoding.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let probe = MediaProbe::probe(&path)?;

        info!(
            path = %path.display(),
            width = probe.width,
            height = probe.height,
            duration = probe.duration_secs,
            "Opened video file"
        );

        Ok(Self {
            path,
            metadata: probe.metadata(),
            current: None,
        })
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl VideoSource for FfmpegSource {
    fn metadata(&self) -> VideoMetadata {
        self.metadata
    }

    async fn seek(&mut self, time_secs: f64) -> Result<()> {
        let path = self.path.clone();
        let frame = tokio::task::spawn_blocking(move || decode_frame_at(&path, time_secs))
            .await
            .map_err(|e| ReelError::Internal(format!("Decode task failed: {e}")))??;
        self.current = Some(frame);
        Ok(())
    }

    fn read_frame(&mut self, size: Resolution) -> Result<PixelBuffer> {
        let frame = self
            .current
            .take()
            .ok_or_else(|| ReelError::Decoder("read_frame called before seek".into()))?;
        scale_frame(frame, size)
    }

    fn release(&mut self) {
        self.current = None;
    }
}

/// Decode exactly one RGBA frame at `time_secs`.
fn decode_frame_at(path: &Path, time_secs: f64) -> Result<PixelBuffer> {
    let mut child = FfmpegCommand::new()
        .hide_banner()
        .seek(format!("{time_secs:.6}"))
        .input(path.to_string_lossy().as_ref())
        .frames(1)
        .format("rawvideo")
        .pix_fmt("rgba")
        .pipe_stdout()
        .spawn()
        .map_err(|e| ReelError::SourceUnavailable(format!("Failed to spawn FFmpeg: {e}")))?;

    let mut frame = None;
    let mut errors = Vec::new();

    let events = child
        .iter()
        .map_err(|e| ReelError::SourceUnavailable(format!("Failed to read FFmpeg output: {e}")))?;
    for event in events {
        match event {
            FfmpegEvent::OutputFrame(output) if frame.is_none() => frame = Some(output),
            FfmpegEvent::Error(message)
            | FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, message) => {
                errors.push(message);
            }
            _ => {}
        }
    }
    let _ = child.wait();

    let output = frame.ok_or_else(|| {
        ReelError::SourceUnavailable(format!(
            "No frame decoded at {time_secs:.3}s: {}",
            errors.join("; ")
        ))
    })?;

    debug!(time = time_secs, width = output.width, height = output.height, "Decoded frame");
    PixelBuffer::from_rgba(output.width, output.height, output.data)
}

/// Resize a decoded frame to the sampling resolution.
fn scale_frame(frame: PixelBuffer, size: Resolution) -> Result<PixelBuffer> {
    if frame.width() == size.width && frame.height() == size.height {
        return Ok(frame);
    }

    let (width, height) = (frame.width(), frame.height());
    let image = RgbaImage::from_raw(width, height, frame.into_bytes()).ok_or_else(|| {
        ReelError::Decoder(format!("Decoded buffer does not match {width}x{height}"))
    })?;
    let resized = imageops::resize(&image, size.width, size.height, FilterType::Triangle);
    PixelBuffer::from_rgba(size.width, size.height, resized.into_raw())
}
