//! ReelMask Core - Foundation types for frame sampling and annotation
//!
//! This crate provides the fundamental types used throughout ReelMask:
//! - Frame-grid time representation (RationalTime, FrameRate)
//! - RGBA pixel buffers handed from the video source to the model
//! - Geometric primitives for detections and masks
//! - Output resolution policy driven by available memory

pub mod error;
pub mod frame;
pub mod geometry;
pub mod resolution;
pub mod time;

pub use error::{ReelError, Result};
pub use frame::PixelBuffer;
pub use geometry::{Point, Rect};
pub use resolution::{MemoryClass, Resolution, ResolutionManager};
pub use time::{FrameIndex, FrameRate, RationalTime, MAX_FRAME_INDEX};
