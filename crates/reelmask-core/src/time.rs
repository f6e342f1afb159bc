//! Time representation for the frame sampling grid
//!
//! Sample timestamps are always derived from an integer frame index
//! (`index / rate`), never by repeatedly adding a float step.

use crate::error::{ReelError, Result};
use num_rational::Rational64;

/// Position of a sample on the frame grid (0-based).
pub type FrameIndex = i64;

/// Largest grid index; beyond 2^53 an `f64` timestamp can no longer
/// tell neighbouring frames apart.
pub const MAX_FRAME_INDEX: FrameIndex = 1 << 53;

/// An exact point in time on a frame grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RationalTime {
    /// Time value as a rational number (seconds)
    value: Rational64,
}

impl RationalTime {
    /// Time of grid index `frames` at `rate`. `None` if the product overflows.
    #[inline]
    pub fn from_frames(frames: FrameIndex, rate: FrameRate) -> Option<Self> {
        let numer = frames.checked_mul(rate.denominator as i64)?;
        Some(Self {
            value: Rational64::new(numer, rate.numerator as i64),
        })
    }

    /// Convert to seconds as f64.
    #[inline]
    pub fn to_seconds_f64(self) -> f64 {
        *self.value.numer() as f64 / *self.value.denom() as f64
    }
}

/// Frame rate as a rational number. Both parts are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRate {
    numerator: u32,
    denominator: u32,
}

impl FrameRate {
    /// Sampling rate of the extraction pipeline.
    pub const FPS_30: Self = Self {
        numerator: 30,
        denominator: 1,
    };

    /// Create a frame rate of `numerator / denominator` frames per second.
    pub fn new(numerator: u32, denominator: u32) -> Result<Self> {
        if numerator == 0 || denominator == 0 {
            return Err(ReelError::InvalidParameter(format!(
                "Frame rate {numerator}/{denominator} must have non-zero parts"
            )));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Convert to frames per second as f64.
    #[inline]
    pub fn to_fps_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Timestamp in seconds of a grid index.
    #[inline]
    pub fn timestamp_secs(self, index: FrameIndex) -> f64 {
        match RationalTime::from_frames(index, self) {
            Some(time) => time.to_seconds_f64(),
            None => index as f64 * self.denominator as f64 / self.numerator as f64,
        }
    }

    /// Grid index nearest to a timestamp in seconds.
    #[inline]
    pub fn nearest_index(self, seconds: f64) -> FrameIndex {
        (seconds * self.to_fps_f64()).round() as FrameIndex
    }

    /// Number of grid points strictly before `duration_secs`.
    ///
    /// Equals `ceil(duration * fps)`, corrected so that the last sampled
    /// timestamp is always `< duration` even when the float product lands a
    /// hair above an integer. Zero, negative and non-finite durations give 0;
    /// the count never exceeds [`MAX_FRAME_INDEX`].
    pub fn frames_before(self, duration_secs: f64) -> FrameIndex {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return 0;
        }
        let estimate = (duration_secs * self.to_fps_f64()).ceil();
        if estimate >= MAX_FRAME_INDEX as f64 {
            return MAX_FRAME_INDEX;
        }

        let mut count = estimate as FrameIndex;
        while count > 0 && self.timestamp_secs(count - 1) >= duration_secs {
            count -= 1;
        }
        while count < MAX_FRAME_INDEX && self.timestamp_secs(count) < duration_secs {
            count += 1;
        }
        count
    }
}

impl Default for FrameRate {
    /// Sampling runs at 30 steps per second.
    fn default() -> Self {
        Self::FPS_30
    }
}
