//! Detection records and model output parsing.

use crate::error::{AiError, AiResult};
use reelmask_core::{FrameIndex, Point, Rect};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Floats per raw detection record: `x1, y1, x2, y2, confidence, class`.
pub const RECORD_LEN: usize = 6;

/// A single detected object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// `Object-<record index>`; the class float is ignored.
    pub label: String,
    pub confidence: f32,
    /// Box in the coordinates the model reported.
    pub bbox: Rect,
}

/// Everything computed for one sampled frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    /// `frame-<timestamp with 3 decimals>`.
    pub id: String,
    pub frame_index: FrameIndex,
    pub timestamp: f64,
    pub detections: Vec<Detection>,
    /// JPEG bytes; empty if encoding failed.
    pub thumbnail: Vec<u8>,
}

impl FrameResult {
    pub fn new(
        frame_index: FrameIndex,
        timestamp: f64,
        detections: Vec<Detection>,
        thumbnail: Vec<u8>,
    ) -> Self {
        Self {
            id: frame_id(timestamp),
            frame_index,
            timestamp,
            detections,
            thumbnail,
        }
    }
}

/// Identifier of the frame sampled at `timestamp` seconds.
pub fn frame_id(timestamp: f64) -> String {
    format!("frame-{timestamp:.3}")
}

/// Parse a flat model output into detections.
///
/// Records whose confidence is below `threshold` (or NaN) are dropped.
/// Labels keep the record's position in the raw output, so a frame may
/// report `Object-0` and `Object-2` with nothing in between.
pub fn try_parse_detections(raw: &[f32], threshold: f32) -> AiResult<Vec<Detection>> {
    if raw.len() % RECORD_LEN != 0 {
        return Err(AiError::MalformedOutput { len: raw.len() });
    }

    Ok(raw
        .chunks_exact(RECORD_LEN)
        .enumerate()
        .filter(|(_, record)| record[4] >= threshold)
        .map(|(i, record)| Detection {
            label: format!("Object-{i}"),
            confidence: record[4].clamp(0.0, 1.0),
            bbox: Rect::from_corners(
                Point::new(record[0], record[1]),
                Point::new(record[2], record[3]),
            ),
        })
        .collect())
}

/// Like [`try_parse_detections`], but a malformed output yields no detections.
pub fn parse_detections(raw: &[f32], threshold: f32) -> Vec<Detection> {
    try_parse_detections(raw, threshold).unwrap_or_else(|e| {
        warn!(error = %e, "Discarding model output");
        Vec::new()
    })
}
