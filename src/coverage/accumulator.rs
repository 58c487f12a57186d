use crate::config::TrackerConfig;
use crate::segments;
use crate::types::{Segment, WatchProgress, Window};

use super::{IdleTransition, Transition};

pub(super) fn advance(
    progress: &mut WatchProgress,
    position: f64,
    config: &TrackerConfig,
) -> Transition {
    match progress.window {
        Window::Idle => Transition::Idle(enter(progress, position, config)),
        Window::Tracking { start, last } => track(progress, start, last, position, config),
    }
}

/// Mirrors the sample into the record and refreshes the derived percentage.
///
/// Finite media never reports more than its duration; `before` is the total
/// prior to this sample so a restored record is never pulled backwards.
pub(super) fn settle(
    progress: &mut WatchProgress,
    position: f64,
    before: f64,
    config: &TrackerConfig,
) {
    progress.current_position = position;
    let duration = progress.video_duration;
    if duration.is_finite() {
        let remaining = duration - progress.total_watch_time;
        if progress.total_watch_time > 0.0
            && remaining > 0.0
            && remaining < config.completion_snap
        {
            progress.total_watch_time = duration;
        } else if remaining < 0.0 {
            progress.total_watch_time = duration.max(before);
        }
    }
    progress.refresh_percent();
}

fn enter(progress: &mut WatchProgress, position: f64, config: &TrackerConfig) -> IdleTransition {
    if let Some(idx) = segments::find_containing(&progress.watch_segments, position) {
        return IdleTransition::InsideWatched {
            segment: progress.watch_segments[idx],
        };
    }

    if let Some(idx) = segments::find_ending_before(&progress.watch_segments, position) {
        // non-negative: the segment ends at or before the sample
        let gap = position - progress.watch_segments[idx].stop;
        if gap < config.join_tolerance {
            let segment = progress.watch_segments.remove(idx);
            progress.window = Window::Tracking {
                start: segment.start,
                last: position,
            };
            progress.total_watch_time += gap;
            return IdleTransition::Reopened {
                segment,
                credited: gap,
            };
        }
    }

    let (start, credited) = lead_in(progress, position, config);
    progress.window = Window::Tracking {
        start,
        last: position,
    };
    progress.total_watch_time += credited;
    IdleTransition::Started { credited }
}

/// Pulls a window opening within the first `lead_in` seconds back to zero.
///
/// Only applies while no committed segment starts before `start`, so the
/// credited lead-in is never time that was already counted.
fn lead_in(progress: &WatchProgress, start: f64, config: &TrackerConfig) -> (f64, f64) {
    let uncovered = progress
        .watch_segments
        .first()
        .map_or(true, |first| first.start >= start);
    if start > 0.0 && start < config.lead_in && uncovered {
        (0.0, start)
    } else {
        (start, 0.0)
    }
}

fn track(
    progress: &mut WatchProgress,
    start: f64,
    last: f64,
    position: f64,
    config: &TrackerConfig,
) -> Transition {
    let step = position - last;

    if step >= 0.0 {
        if let Some(idx) = segments::find_starting_after(&progress.watch_segments, last) {
            let next = progress.watch_segments[idx];
            let reaches = next.start - position < config.join_tolerance;
            // a seek only lands on the next segment if the gap before it would have bridged
            let contiguous =
                step <= config.seek_tolerance || next.start - last < config.join_tolerance;
            if reaches && contiguous {
                let credited = next.start - last;
                progress.watch_segments.remove(idx);
                progress.window = Window::Tracking {
                    start,
                    last: next.stop,
                };
                progress.total_watch_time += credited;
                return Transition::Absorbed {
                    segment: next,
                    credited,
                };
            }
        }
    }

    if step.abs() > config.seek_tolerance {
        let (start, credited) = lead_in(progress, start, config);
        let window = Segment::new(start, last);
        // an empty window never covered anything, committing it would only leave a marker
        if window.duration() > 0.0 {
            progress.watch_segments =
                segments::insert(&progress.watch_segments, window, config.bridge_tolerance);
            progress.total_watch_time += credited;
        }
        progress.window = Window::Idle;
        let then = enter(progress, position, config);
        return Transition::Committed {
            window,
            credited,
            then,
        };
    }

    if step < 0.0 {
        return Transition::Held;
    }

    progress.window = Window::Tracking {
        start,
        last: position,
    };
    progress.total_watch_time += step;
    Transition::Extended { credited: step }
}
