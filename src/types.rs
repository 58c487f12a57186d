//! Core types for watch progress tracking

use serde::{Deserialize, Serialize};

use crate::error::ProgressError;
use crate::segments;

/// A watched stretch of media, closed on both ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64, // seconds
    pub stop: f64,  // seconds
}

impl Segment {
    pub fn new(start: f64, stop: f64) -> Self {
        Self { start, stop }
    }

    pub fn duration(self) -> f64 {
        self.stop - self.start
    }

    /// True when `time` lies strictly between the bounds.
    pub fn contains_strictly(self, time: f64) -> bool {
        self.start < time && time < self.stop
    }
}

/// The in-progress viewing window that has not been committed yet
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Window {
    #[default]
    Idle,
    Tracking {
        start: f64,
        last: f64,
    },
}

impl Window {
    pub fn is_tracking(self) -> bool {
        matches!(self, Window::Tracking { .. })
    }
}

/// Watch progress for one viewer and one media asset.
///
/// Mutated only through [`crate::coverage::CoverageTracker::record_position`];
/// serialized through [`WatchProgressRecord`] so the reporting side sees the
/// flat camelCase shape with nullable window fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WatchProgressRecord", into = "WatchProgressRecord")]
pub struct WatchProgress {
    /// Committed ranges, sorted and disjoint
    pub watch_segments: Vec<Segment>,
    pub window: Window,
    /// Last raw sample, tracked even while idle
    pub current_position: f64,
    /// Net-new seconds watched, never decreases
    pub total_watch_time: f64,
    pub video_duration: f64,
    pub percent_watched: u8,
}

impl WatchProgress {
    /// Fresh record for a viewer who has not watched anything yet.
    pub fn new(video_duration: f64, initial_position: f64) -> Result<Self, ProgressError> {
        validate_duration(video_duration)?;
        validate_position(initial_position)?;
        Ok(Self {
            watch_segments: Vec::new(),
            window: Window::Idle,
            current_position: initial_position,
            total_watch_time: 0.0,
            video_duration,
            percent_watched: 0,
        })
    }

    pub fn current_start(&self) -> Option<f64> {
        match self.window {
            Window::Tracking { start, .. } => Some(start),
            Window::Idle => None,
        }
    }

    pub fn last_known_position(&self) -> Option<f64> {
        match self.window {
            Window::Tracking { last, .. } => Some(last),
            Window::Idle => None,
        }
    }

    /// Checks everything the accumulator relies on before it mutates the record.
    pub fn validate(&self) -> Result<(), ProgressError> {
        validate_duration(self.video_duration)?;
        validate_position(self.current_position)?;
        if !self.total_watch_time.is_finite() || self.total_watch_time < 0.0 {
            return Err(ProgressError::InvalidTotal(self.total_watch_time));
        }
        if let Window::Tracking { start, last } = self.window {
            validate_position(start)?;
            validate_position(last)?;
            if start > last {
                return Err(ProgressError::InvalidSegment { start, stop: last });
            }
        }
        segments::validate(&self.watch_segments)
    }

    /// Recomputes `percent_watched` from the total and the duration.
    pub(crate) fn refresh_percent(&mut self) {
        self.percent_watched = percent_of(self.total_watch_time, self.video_duration);
    }
}

/// `floor(100 * watched / duration)` clamped to `0..=100`; zero for unbounded media.
pub fn percent_of(watched: f64, duration: f64) -> u8 {
    if !duration.is_finite() || duration <= 0.0 {
        return 0;
    }
    let percent = (100.0 * watched / duration).floor();
    percent.clamp(0.0, 100.0) as u8
}

pub(crate) fn validate_position(position: f64) -> Result<(), ProgressError> {
    if position.is_finite() && position >= 0.0 {
        Ok(())
    } else {
        Err(ProgressError::InvalidPosition(position))
    }
}

pub(crate) fn validate_duration(duration: f64) -> Result<(), ProgressError> {
    // +inf marks live or otherwise unbounded media
    if duration > 0.0 && !duration.is_nan() {
        Ok(())
    } else {
        Err(ProgressError::InvalidDuration(duration))
    }
}

/// Flat wire shape handed to the reporting collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchProgressRecord {
    #[serde(default)]
    pub watch_segments: Vec<Segment>,
    #[serde(default)]
    pub current_start: Option<f64>,
    #[serde(default)]
    pub last_known_position: Option<f64>,
    #[serde(default)]
    pub current_position: f64,
    #[serde(default)]
    pub total_watch_time: f64,
    pub video_duration: f64,
    #[serde(default)]
    pub percent_watched: u8,
}

impl From<WatchProgress> for WatchProgressRecord {
    fn from(progress: WatchProgress) -> Self {
        Self {
            current_start: progress.current_start(),
            last_known_position: progress.last_known_position(),
            watch_segments: progress.watch_segments,
            current_position: progress.current_position,
            total_watch_time: progress.total_watch_time,
            video_duration: progress.video_duration,
            percent_watched: progress.percent_watched,
        }
    }
}

impl TryFrom<WatchProgressRecord> for WatchProgress {
    type Error = ProgressError;

    fn try_from(record: WatchProgressRecord) -> Result<Self, Self::Error> {
        let window = match (record.current_start, record.last_known_position) {
            (Some(start), Some(last)) => Window::Tracking { start, last },
            (None, None) => Window::Idle,
            (start, last) => return Err(ProgressError::InconsistentWindow { start, last }),
        };
        let mut progress = WatchProgress {
            watch_segments: record.watch_segments,
            window,
            current_position: record.current_position,
            total_watch_time: record.total_watch_time,
            video_duration: record.video_duration,
            percent_watched: 0,
        };
        progress.validate()?;
        progress.refresh_percent();
        Ok(progress)
    }
}
