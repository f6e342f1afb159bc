//! JPEG thumbnails of sampled frames.

use crate::error::{AiError, AiResult};
use image::codecs::jpeg::JpegEncoder;
use image::ColorType;
use reelmask_core::PixelBuffer;

/// Encode a frame as JPEG at `quality` (clamped to 1-100).
pub fn encode_thumbnail(frame: &PixelBuffer, quality: u8) -> AiResult<Vec<u8>> {
    let rgb: Vec<u8> = frame
        .as_bytes()
        .chunks_exact(PixelBuffer::CHANNELS)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();

    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
    encoder
        .encode(&rgb, frame.width(), frame.height(), ColorType::Rgb8)
        .map_err(|e| AiError::Thumbnail(e.to_string()))?;
    Ok(out)
}
