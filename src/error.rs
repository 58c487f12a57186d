use thiserror::Error;

/// Errors raised by the segment and coverage engines.
///
/// Nothing here is transient: the engines do no I/O, so every error is
/// either bad input from the caller or a record that was corrupted outside
/// the accumulator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProgressError {
    /// Playback position was negative, NaN or infinite
    #[error("invalid playback position: {0}")]
    InvalidPosition(f64),

    /// Media duration was zero, negative or NaN
    #[error("invalid video duration: {0}")]
    InvalidDuration(f64),

    /// Accumulated watch time was negative or not finite
    #[error("invalid total watch time: {0}")]
    InvalidTotal(f64),

    /// A segment with non-finite bounds or with start after stop
    #[error("invalid segment [{start}, {stop}]")]
    InvalidSegment { start: f64, stop: f64 },

    /// Committed segments are not sorted by start
    #[error("watch segments out of order at index {index}")]
    UnsortedSegments { index: usize },

    /// Two committed segments overlap
    #[error("watch segments overlap at index {index}")]
    OverlappingSegments { index: usize },

    /// Only one of the window bounds was present
    #[error("inconsistent viewing window: start {start:?}, last known position {last:?}")]
    InconsistentWindow {
        start: Option<f64>,
        last: Option<f64>,
    },
}

impl ProgressError {
    /// Rejected caller input; the record was left untouched.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ProgressError::InvalidPosition(_) | ProgressError::InvalidDuration(_)
        )
    }

    /// The record itself is corrupt and should not be "repaired" silently.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            ProgressError::InvalidTotal(_)
                | ProgressError::InvalidSegment { .. }
                | ProgressError::UnsortedSegments { .. }
                | ProgressError::OverlappingSegments { .. }
                | ProgressError::InconsistentWindow { .. }
        )
    }
}
