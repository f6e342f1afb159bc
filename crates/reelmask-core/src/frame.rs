//! RGBA pixel buffers captured from the video source.
//!
//! A buffer is produced once per sampled timestamp and moved into the
//! inference engine, which consumes it for preprocessing and thumbnailing.

use crate::error::{ReelError, Result};

/// An 8-bit RGBA frame in CPU memory, tightly packed (no row padding).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Frame width in pixels
    width: u32,
    /// Frame height in pixels
    height: u32,
    /// Row-major RGBA bytes, `width * height * 4` long
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Number of interleaved channels (R, G, B, A).
    pub const CHANNELS: usize = 4;

    /// Create a zeroed (transparent black) buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; Self::byte_len(width, height)],
        }
    }

    /// Wrap existing RGBA bytes. Fails if the length does not match the dimensions.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = Self::byte_len(width, height);
        if data.len() != expected {
            return Err(ReelError::InvalidParameter(format!(
                "RGBA buffer for {width}x{height} needs {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Fill a buffer with a single color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(Self::byte_len(width, height));
        for _ in 0..(width as usize) * (height as usize) {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    fn byte_len(width: u32, height: u32) -> usize {
        (width as usize) * (height as usize) * Self::CHANNELS
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels in the frame.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Raw RGBA bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Take ownership of the raw RGBA bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Get a row of pixel data.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * Self::CHANNELS;
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// Get a mutable row of pixel data.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.width as usize * Self::CHANNELS;
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }

    /// RGBA value at (x, y), or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * Self::CHANNELS;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Create a test pattern frame (color bars).
    pub fn test_pattern(width: u32, height: u32) -> Self {
        let mut frame = Self::new(width, height);
        let colors: [[u8; 4]; 8] = [
            [255, 255, 255, 255], // White
            [255, 255, 0, 255],   // Yellow
            [0, 255, 255, 255],   // Cyan
            [0, 255, 0, 255],     // Green
            [255, 0, 255, 255],   // Magenta
            [255, 0, 0, 255],     // Red
            [0, 0, 255, 255],     // Blue
            [0, 0, 0, 255],       // Black
        ];

        for y in 0..height {
            let row = frame.row_mut(y);
            for x in 0..width {
                let i = (x as usize) * Self::CHANNELS;
                let bar = ((x as u64 * 8) / width as u64) as usize;
                row[i..i + 4].copy_from_slice(&colors[bar.min(7)]);
            }
        }

        frame
    }
}
