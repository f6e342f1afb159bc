//! Frame extraction from a video source.
//!
//! Walks the sampling grid of a video one timestamp at a time: seek, read
//! a downscaled frame, run it through the engine. Frames are delivered in
//! timestamp order. Only one seek is ever in flight because the sequence
//! owns the source mutably and awaits each step before the next.
//!
//! Cancellation is cooperative. The token is checked before every seek and
//! again after inference, so a cancelled run stops within one frame and the
//! frame in flight at that moment is discarded.

use crate::detection::FrameResult;
use crate::engine::InferenceEngine;
use crate::error::{AiError, AiResult};
use reelmask_core::{FrameIndex, FrameRate, MemoryClass, PixelBuffer, Resolution, ResolutionManager};
use reelmask_media::{VideoMetadata, VideoSource};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Handle for cancelling an in-progress extraction.
#[derive(Debug, Clone)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a new cancel handle.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Signal cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Check if cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// One step of an extraction.
#[derive(Debug, Clone)]
pub enum SampleStep {
    /// The next frame in timestamp order.
    Frame(Arc<FrameResult>),
    /// Every grid timestamp before the duration was delivered.
    Finished,
    /// The token was cancelled; nothing further will be delivered.
    Cancelled,
}

/// Progress of a running extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleProgress {
    pub frames_done: usize,
    pub total_frames: usize,
}

impl SampleProgress {
    /// Completed fraction in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        if self.total_frames == 0 {
            1.0
        } else {
            self.frames_done as f32 / self.total_frames as f32
        }
    }
}

/// Every frame of a finished extraction.
#[derive(Debug, Clone)]
pub struct ProcessedVideo {
    pub frames: Vec<Arc<FrameResult>>,
    pub duration_secs: f64,
    pub resolution: Resolution,
}

/// How a collected extraction ended.
#[derive(Debug, Clone)]
pub enum ExtractionOutcome {
    Completed(ProcessedVideo),
    /// Frames delivered before the cancellation was observed.
    Cancelled(Vec<Arc<FrameResult>>),
}

/// Starts extractions against one engine.
pub struct FrameSampler<'e> {
    engine: &'e InferenceEngine,
}

impl<'e> FrameSampler<'e> {
    pub fn new(engine: &'e InferenceEngine) -> Self {
        Self { engine }
    }

    /// Begin extracting frames from `source`.
    ///
    /// Clears the engine's result cache. The sampling resolution is derived
    /// once from the source size and `memory`.
    pub fn extract<S: VideoSource>(
        &self,
        source: S,
        memory: MemoryClass,
        cancel: CancelToken,
    ) -> Extraction<'e, S> {
        let metadata = source.metadata();
        let rate = self.engine.sample_rate();
        let resolution = ResolutionManager::adjust(metadata.width, metadata.height, memory);
        let total_frames = rate.frames_before(metadata.duration_secs);

        self.engine.clear_cache();

        info!(
            source = %format!("{}x{}", metadata.width, metadata.height),
            resolution = %resolution,
            memory = %memory,
            duration = metadata.duration_secs,
            total_frames,
            "Starting frame extraction"
        );

        Extraction {
            engine: self.engine,
            source,
            metadata,
            rate,
            resolution,
            total_frames,
            next_index: 0,
            cancel,
            phase: Phase::Running,
            released: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Running,
    Finished,
    Cancelled,
    Failed(String),
}

/// A lazily driven extraction. Not restartable.
pub struct Extraction<'e, S: VideoSource> {
    engine: &'e InferenceEngine,
    source: S,
    metadata: VideoMetadata,
    rate: FrameRate,
    resolution: Resolution,
    total_frames: FrameIndex,
    next_index: FrameIndex,
    cancel: CancelToken,
    phase: Phase,
    released: bool,
}

impl<'e, S: VideoSource> Extraction<'e, S> {
    /// Resolution frames are read at.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn metadata(&self) -> VideoMetadata {
        self.metadata
    }

    /// Number of grid timestamps strictly before the duration.
    pub fn total_frames(&self) -> usize {
        self.total_frames as usize
    }

    /// Frames delivered so far.
    pub fn frames_done(&self) -> usize {
        self.next_index as usize
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Advance by one frame.
    ///
    /// A seek or decode failure aborts the whole extraction with
    /// [`AiError::SourceUnavailable`]; later calls repeat that error.
    pub async fn next(&mut self) -> AiResult<SampleStep> {
        match &self.phase {
            Phase::Running => {}
            Phase::Finished => return Ok(SampleStep::Finished),
            Phase::Cancelled => return Ok(SampleStep::Cancelled),
            Phase::Failed(reason) => {
                return Err(AiError::SourceUnavailable {
                    time_secs: self.rate.timestamp_secs(self.next_index),
                    reason: reason.clone(),
                })
            }
        }

        if self.next_index >= self.total_frames {
            self.phase = Phase::Finished;
            self.release();
            info!(frames = self.next_index, "Frame extraction finished");
            return Ok(SampleStep::Finished);
        }
        if self.cancel.is_cancelled() {
            return Ok(self.stop_cancelled());
        }

        let index = self.next_index;
        let time_secs = self.rate.timestamp_secs(index);
        let frame = match self.capture(time_secs).await {
            Ok(frame) => frame,
            Err(e) => {
                let reason = e.to_string();
                warn!(time = time_secs, error = %reason, "Frame extraction aborted");
                self.phase = Phase::Failed(reason.clone());
                self.release();
                return Err(AiError::SourceUnavailable { time_secs, reason });
            }
        };

        let result = self.engine.process_frame(frame, index).await;
        if self.cancel.is_cancelled() {
            debug!(frame = index, "Discarding frame finished after cancellation");
            return Ok(self.stop_cancelled());
        }

        self.next_index += 1;
        Ok(SampleStep::Frame(result))
    }

    /// Drive the extraction to its end.
    pub async fn collect(&mut self) -> AiResult<ExtractionOutcome> {
        self.collect_with_progress(|_| {}).await
    }

    /// Drive the extraction to its end, reporting after every frame.
    pub async fn collect_with_progress(
        &mut self,
        mut on_progress: impl FnMut(SampleProgress),
    ) -> AiResult<ExtractionOutcome> {
        let total_frames = self.total_frames();
        let mut frames = Vec::with_capacity(total_frames);
        loop {
            match self.next().await? {
                SampleStep::Frame(frame) => {
                    frames.push(frame);
                    on_progress(SampleProgress {
                        frames_done: frames.len(),
                        total_frames,
                    });
                }
                SampleStep::Finished => {
                    return Ok(ExtractionOutcome::Completed(ProcessedVideo {
                        frames,
                        duration_secs: self.metadata.duration_secs,
                        resolution: self.resolution,
                    }))
                }
                SampleStep::Cancelled => return Ok(ExtractionOutcome::Cancelled(frames)),
            }
        }
    }

    async fn capture(&mut self, time_secs: f64) -> reelmask_core::Result<PixelBuffer> {
        self.source.seek(time_secs).await?;
        self.source.read_frame(self.resolution)
    }

    fn stop_cancelled(&mut self) -> SampleStep {
        info!(frames = self.next_index, "Frame extraction cancelled");
        self.phase = Phase::Cancelled;
        self.release();
        SampleStep::Cancelled
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.source.release();
        }
    }
}

impl<S: VideoSource> Drop for Extraction<'_, S> {
    fn drop(&mut self) {
        self.release();
    }
}
