//! Synthetic video source producing color bars.
//!
//! Used for demos and tests where no video file or FFmpeg binary is
//! available. The bars scroll one column per native frame so consecutive
//! samples differ.

use crate::source::{VideoMetadata, VideoSource};
use async_trait::async_trait;
use reelmask_core::{PixelBuffer, ReelError, Resolution, Result};
use tracing::debug;

/// A test-pattern "video" of fixed size and duration.
pub struct PatternSource {
    width: u32,
    height: u32,
    duration: f64,
    fps: f64,
    position: Option<f64>,
    seek_count: usize,
    release_count: usize,
}

impl PatternSource {
    /// Create a pattern source at 30 native frames per second.
    pub fn new(width: u32, height: u32, duration_secs: f64) -> Self {
        Self {
            width,
            height,
            duration: duration_secs,
            fps: 30.0,
            position: None,
            seek_count: 0,
            release_count: 0,
        }
    }

    /// Override the native frame rate used to scroll the pattern.
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    /// Number of seeks performed so far.
    pub fn seek_count(&self) -> usize {
        self.seek_count
    }

    /// Number of times `release` was called.
    pub fn release_count(&self) -> usize {
        self.release_count
    }

    /// Position of the last completed seek.
    pub fn position(&self) -> Option<f64> {
        self.position
    }
}

#[async_trait]
impl VideoSource for PatternSource {
    fn metadata(&self) -> VideoMetadata {
        VideoMetadata {
            width: self.width,
            height: self.height,
            duration_secs: self.duration,
            native_fps: Some(self.fps),
        }
    }

    async fn seek(&mut self, time_secs: f64) -> Result<()> {
        if !(0.0..self.duration).contains(&time_secs) {
            return Err(ReelError::InvalidParameter(format!(
                "Seek to {time_secs:.3}s out of range (0-{:.3}s)",
                self.duration
            )));
        }

        // Completion is signalled on the next poll, like a real decoder callback.
        tokio::task::yield_now().await;

        self.position = Some(time_secs);
        self.seek_count += 1;
        debug!(time = time_secs, "Pattern source seeked");
        Ok(())
    }

    fn read_frame(&mut self, size: Resolution) -> Result<PixelBuffer> {
        let position = self
            .position
            .ok_or_else(|| ReelError::Decoder("read_frame called before seek".into()))?;

        let bars = PixelBuffer::test_pattern(size.width, size.height);
        let shift = ((position * self.fps).floor() as u64 % size.width as u64) as usize;
        if shift == 0 {
            return Ok(bars);
        }

        let mut frame = PixelBuffer::new(size.width, size.height);
        let stride = size.width as usize * PixelBuffer::CHANNELS;
        let offset = shift * PixelBuffer::CHANNELS;
        for y in 0..size.height {
            let src = bars.row(y);
            let dst = frame.row_mut(y);
            dst[..stride - offset].copy_from_slice(&src[offset..]);
            dst[stride - offset..].copy_from_slice(&src[..offset]);
        }
        Ok(frame)
    }

    fn release(&mut self) {
        self.position = None;
        self.release_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seek_then_read() {
        let mut source = PatternSource::new(64, 36, 2.0);
        source.seek(0.5).await.unwrap();
        let frame = source.read_frame(Resolution::new(32, 18)).unwrap();
        assert_eq!(frame.width(), 32);
        assert_eq!(frame.height(), 18);
        assert_eq!(source.seek_count(), 1);
    }

    #[tokio::test]
    async fn test_read_before_seek_fails() {
        let mut source = PatternSource::new(16, 16, 1.0);
        assert!(source.read_frame(Resolution::new(16, 16)).is_err());
    }

    #[tokio::test]
    async fn test_seek_out_of_range() {
        let mut source = PatternSource::new(16, 16, 1.0);
        assert!(source.seek(1.0).await.is_err());
        assert!(source.seek(-0.1).await.is_err());
        assert_eq!(source.seek_count(), 0);
    }

    #[tokio::test]
    async fn test_frames_scroll_over_time() {
        let mut source = PatternSource::new(64, 4, 1.0);
        source.seek(0.0).await.unwrap();
        let first = source.read_frame(Resolution::new(64, 4)).unwrap();
        source.seek(0.1).await.unwrap();
        let second = source.read_frame(Resolution::new(64, 4)).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_release_clears_position() {
        let mut source = PatternSource::new(8, 8, 1.0);
        source.position = Some(0.2);
        source.release();
        source.release();
        assert!(source.position().is_none());
        assert_eq!(source.release_count(), 2);
    }
}
