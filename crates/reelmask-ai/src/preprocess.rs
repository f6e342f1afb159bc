//! Frame to tensor conversion.

use crate::error::{AiError, AiResult};
use ndarray::Array4;
use rayon::prelude::*;
use reelmask_core::PixelBuffer;

/// Convert an RGBA frame into a planar `[1, 3, H, W]` tensor in `[0, 1]`.
///
/// Alpha is discarded. Each channel plane is filled on its own rayon task.
pub fn to_input_tensor(frame: &PixelBuffer) -> AiResult<Array4<f32>> {
    let w = frame.width() as usize;
    let h = frame.height() as usize;
    let plane_size = w * h;
    if plane_size == 0 {
        return Err(AiError::PreprocessError(format!(
            "Cannot build a tensor from an empty {w}x{h} frame"
        )));
    }

    let pixels = frame.as_bytes();
    let mut data = vec![0.0_f32; 3 * plane_size];
    data.par_chunks_mut(plane_size)
        .enumerate()
        .for_each(|(channel, plane)| {
            for (i, value) in plane.iter_mut().enumerate() {
                *value = pixels[i * PixelBuffer::CHANNELS + channel] as f32 / 255.0;
            }
        });

    Array4::from_shape_vec((1, 3, h, w), data).map_err(|e| AiError::PreprocessError(e.to_string()))
}
