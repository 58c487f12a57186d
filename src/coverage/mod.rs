//! Turns raw playback-position samples into committed watch segments and a
//! running total of newly watched seconds.

mod accumulator;

use anyhow::Result;
use tracing::{debug, warn};

use crate::config::TrackerConfig;
use crate::error::ProgressError;
use crate::types::{validate_position, Segment, WatchProgress};

/// A position landing less than this far past a segment's end continues it.
pub const DEFAULT_JOIN_TOLERANCE: f64 = 2.0;
/// Larger jumps between consecutive samples are seeks, not playback.
pub const DEFAULT_SEEK_TOLERANCE: f64 = 1.2;
/// Remaining seconds under which the total rounds up to the full duration.
pub const DEFAULT_COMPLETION_SNAP: f64 = 1.0;
/// Windows opening this close to the beginning are treated as starting at zero.
pub const DEFAULT_LEAD_IN: f64 = 1.0;

/// What an idle record did with a sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IdleTransition {
    /// Landed inside already credited territory; stays idle
    InsideWatched { segment: Segment },
    /// Landed just past a committed segment, which becomes the open window again
    Reopened { segment: Segment, credited: f64 },
    /// Opened a fresh window at the sample, or at zero when inside the lead-in
    Started { credited: f64 },
}

/// Outcome of a single [`CoverageTracker::record_position`] call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    Idle(IdleTransition),
    /// A seek closed the open window; `then` is how the sample was handled afterwards
    Committed {
        window: Segment,
        /// Lead-in credited when the window was pulled back to zero
        credited: f64,
        then: IdleTransition,
    },
    /// Playback ran into the next committed segment, which was folded into the window
    Absorbed { segment: Segment, credited: f64 },
    Extended { credited: f64 },
    /// Small backward drift while tracking; nothing changes
    Held,
}

impl IdleTransition {
    pub fn credited(&self) -> f64 {
        match *self {
            IdleTransition::Reopened { credited, .. } | IdleTransition::Started { credited } => {
                credited
            }
            IdleTransition::InsideWatched { .. } => 0.0,
        }
    }
}

impl Transition {
    /// Seconds this transition added to the total.
    pub fn credited(&self) -> f64 {
        match *self {
            Transition::Idle(idle) => idle.credited(),
            Transition::Committed { credited, then, .. } => credited + then.credited(),
            Transition::Absorbed { credited, .. } | Transition::Extended { credited } => credited,
            Transition::Held => 0.0,
        }
    }
}

/// Applies playback samples to [`WatchProgress`] records.
///
/// Holds no per-record state, so one tracker can serve any number of
/// sessions. Calls for the same record must be serialized by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverageTracker {
    config: TrackerConfig,
}

impl CoverageTracker {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Feeds one playback sample into `progress`.
    ///
    /// The sample and the record are validated before anything is touched,
    /// so an error leaves `progress` exactly as it was.
    pub fn record_position(
        &self,
        progress: &mut WatchProgress,
        position: f64,
    ) -> Result<Transition, ProgressError> {
        if let Err(err) = validate_position(position).and_then(|_| progress.validate()) {
            warn!(position, error = %err, "rejected playback sample");
            return Err(err);
        }

        let before = progress.total_watch_time;
        let transition = accumulator::advance(progress, position, &self.config);
        accumulator::settle(progress, position, before, &self.config);

        debug!(
            position,
            ?transition,
            tracking = progress.window.is_tracking(),
            total = progress.total_watch_time,
            percent = progress.percent_watched,
            segments = progress.watch_segments.len(),
            "recorded playback position"
        );
        Ok(transition)
    }

    /// Feeds a batch of samples in order, stopping at the first rejected one.
    pub fn replay<I>(
        &self,
        progress: &mut WatchProgress,
        positions: I,
    ) -> Result<Vec<Transition>, ProgressError>
    where
        I: IntoIterator<Item = f64>,
    {
        positions
            .into_iter()
            .map(|position| self.record_position(progress, position))
            .collect()
    }
}

/// [`CoverageTracker::record_position`] with the default tolerances.
pub fn record_position(
    progress: &mut WatchProgress,
    position: f64,
) -> Result<Transition, ProgressError> {
    CoverageTracker::default().record_position(progress, position)
}
