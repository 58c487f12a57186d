//! Tracks which parts of a media asset a viewer has watched and how much of
//! it counts as newly watched time.

pub mod config;
pub mod coverage;
pub mod error;
pub mod segments;
pub mod types;

pub use config::TrackerConfig;
pub use coverage::{record_position, CoverageTracker, IdleTransition, Transition};
pub use error::ProgressError;
pub use segments::insert;
pub use types::{Segment, WatchProgress, WatchProgressRecord, Window};
