use crate::error::ProgressError;
use crate::types::Segment;


/// Largest gap between two watched ranges that still gets bridged.
///
/// Sized to absorb the drift between a pause and the following resume
/// report; gaps from a genuine seek are at least a couple of seconds.
pub const DEFAULT_BRIDGE_TOLERANCE: f64 = 2.0;

/// Returns the union of `segments` and `new_segment` as a sorted, disjoint list.
///
/// Segments that overlap, or that sit less than `bridge_tolerance` apart,
/// collapse into one. A single insert can fuse several existing segments
/// when the new one fills the gaps between them. Expects `segments` to be
/// sorted by start already.
pub fn insert(segments: &[Segment], new_segment: Segment, bridge_tolerance: f64) -> Vec<Segment> {
    let at = segments.partition_point(|existing| existing.start <= new_segment.start);
    let ordered = segments[..at]
        .iter()
        .chain(std::iter::once(&new_segment))
        .chain(segments[at..].iter());

    let mut merged: Vec<Segment> = Vec::with_capacity(segments.len() + 1);
    for &segment in ordered {
        match merged.last_mut() {
            Some(last) if bridges(*last, segment, bridge_tolerance) => {
                last.stop = last.stop.max(segment.stop);
            }
            _ => merged.push(segment),
        }
    }
    merged
}

/// [`insert`] with [`DEFAULT_BRIDGE_TOLERANCE`].
pub fn insert_segment(segments: &[Segment], new_segment: Segment) -> Vec<Segment> {
    insert(segments, new_segment, DEFAULT_BRIDGE_TOLERANCE)
}

// `previous.start <= next.start` holds for every call
fn bridges(previous: Segment, next: Segment, tolerance: f64) -> bool {
    let gap = next.start - previous.stop;
    gap <= 0.0 || gap < tolerance
}

/// Checks that a committed list is well formed: finite non-negative bounds,
/// `start <= stop`, sorted by start and pairwise disjoint.
pub fn validate(segments: &[Segment]) -> Result<(), ProgressError> {
    for (index, segment) in segments.iter().enumerate() {
        let Segment { start, stop } = *segment;
        if !start.is_finite() || !stop.is_finite() || start < 0.0 || start > stop {
            return Err(ProgressError::InvalidSegment { start, stop });
        }
        if let Some(previous) = index.checked_sub(1).map(|prev| segments[prev]) {
            if start < previous.start {
                return Err(ProgressError::UnsortedSegments { index });
            }
            if start <= previous.stop {
                return Err(ProgressError::OverlappingSegments { index });
            }
        }
    }
    Ok(())
}

/// Index of the segment whose interior contains `time`.
pub fn find_containing(segments: &[Segment], time: f64) -> Option<usize> {
    segments
        .iter()
        .position(|segment| segment.contains_strictly(time))
}

/// Index of the latest segment that ends at or before `time`.
pub fn find_ending_before(segments: &[Segment], time: f64) -> Option<usize> {
    segments
        .partition_point(|segment| segment.stop <= time)
        .checked_sub(1)
}

/// Index of the earliest segment that starts at or after `time`.
pub fn find_starting_after(segments: &[Segment], time: f64) -> Option<usize> {
    let idx = segments.partition_point(|segment| segment.start < time);
    (idx < segments.len()).then_some(idx)
}

/// Total length of all segments, in seconds.
pub fn covered_seconds(segments: &[Segment]) -> f64 {
    segments.iter().map(|segment| segment.duration()).sum()
}
