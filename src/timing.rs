//! Mapping interval times onto video frames.
//!
//! An interval `[start, end]` at `fps` frames per second covers the frames
//! `floor(start * fps) ..= floor(end * fps)`. Each frame also gets a
//! progress value that spans exactly `[0, 1]` across the interval, which is
//! what linear labels ramp along.

use thiserror::Error;

/// Why an interval could not be mapped onto frames.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SpanError {
    #[error("frame rate must be positive and finite (got {0})")]
    InvalidFrameRate(f64),

    #[error("interval times must be finite (got {start}..{end})")]
    NonFiniteTime { start: f64, end: f64 },

    #[error("interval {start}..{end} starts before the first frame")]
    NegativeStart { start: f64, end: f64 },

    #[error("interval {start}..{end} covers no frames at {fps} fps")]
    Empty { start: f64, end: f64, fps: f64 },
}

/// Contiguous run of frames covered by an interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSpan {
    pub start_frame: u64,
    pub end_frame: u64,
    pub total_frames: u64,
}

impl FrameSpan {
    /// Maps `[start_time, end_time]` at `fps` onto frame indices.
    pub fn from_times(start_time: f64, end_time: f64, fps: f64) -> Result<Self, SpanError> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(SpanError::InvalidFrameRate(fps));
        }
        if !start_time.is_finite() || !end_time.is_finite() {
            return Err(SpanError::NonFiniteTime {
                start: start_time,
                end: end_time,
            });
        }

        let start_frame = (start_time * fps).floor() as i64;
        let end_frame = (end_time * fps).floor() as i64;
        let total_frames = end_frame - start_frame + 1;

        if total_frames <= 0 {
            return Err(SpanError::Empty {
                start: start_time,
                end: end_time,
                fps,
            });
        }
        if start_frame < 0 {
            return Err(SpanError::NegativeStart {
                start: start_time,
                end: end_time,
            });
        }

        Ok(Self {
            start_frame: start_frame as u64,
            end_frame: end_frame as u64,
            total_frames: total_frames as u64,
        })
    }

    /// Progress of frame `offset` (zero-based within the span).
    ///
    /// A single-frame span sits at the midpoint, 0.5.
    pub fn progress(&self, offset: u64) -> f64 {
        if self.total_frames == 1 {
            0.5
        } else {
            offset as f64 / (self.total_frames - 1) as f64
        }
    }

    /// Absolute video frame index of `offset`.
    #[inline]
    pub fn frame_index(&self, offset: u64) -> u64 {
        self.start_frame + offset
    }

    /// Iterates `(offset, frame_index, progress)` over the span.
    pub fn frames(&self) -> impl Iterator<Item = (u64, u64, f64)> + '_ {
        (0..self.total_frames).map(move |offset| {
            (offset, self.frame_index(offset), self.progress(offset))
        })
    }
}
