use std::fs;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

use crate::coverage::{
    DEFAULT_COMPLETION_SNAP, DEFAULT_JOIN_TOLERANCE, DEFAULT_LEAD_IN, DEFAULT_SEEK_TOLERANCE,
};
use crate::segments::DEFAULT_BRIDGE_TOLERANCE;

/// Tunable tolerances for the coverage accumulator, all in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// Gap below which two committed segments are fused
    #[serde(alias = "bridgeTolerance")]
    pub bridge_tolerance: f64,
    /// How far past a segment's end a position may land and still reopen it
    #[serde(alias = "joinTolerance")]
    pub join_tolerance: f64,
    /// Position jump beyond which playback is treated as a seek
    #[serde(alias = "seekTolerance")]
    pub seek_tolerance: f64,
    /// Remaining time under which the total is rounded up to the full duration
    #[serde(alias = "completionSnap")]
    pub completion_snap: f64,
    /// Windows opening before this position are counted from zero; 0 disables it
    #[serde(alias = "leadIn")]
    pub lead_in: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            bridge_tolerance: DEFAULT_BRIDGE_TOLERANCE,
            join_tolerance: DEFAULT_JOIN_TOLERANCE,
            seek_tolerance: DEFAULT_SEEK_TOLERANCE,
            completion_snap: DEFAULT_COMPLETION_SNAP,
            lead_in: DEFAULT_LEAD_IN,
        }
    }
}

impl TrackerConfig {
    /// Loads overrides from a JSON file, or returns the defaults.
    pub fn from_path(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read tracker config at {:?}", path))?;
                Self::from_json(&raw)
                    .with_context(|| format!("invalid tracker config in {:?}", path))?
            }
            None => Self::default(),
        };
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw).context("failed to parse tracker config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("bridge_tolerance", self.bridge_tolerance),
            ("join_tolerance", self.join_tolerance),
            ("seek_tolerance", self.seek_tolerance),
        ] {
            ensure!(
                value.is_finite() && value > 0.0,
                "{} must be a positive number of seconds, got {}",
                name,
                value
            );
        }
        for (name, value) in [
            ("completion_snap", self.completion_snap),
            ("lead_in", self.lead_in),
        ] {
            ensure!(
                value.is_finite() && value >= 0.0,
                "{} must be non-negative, got {}",
                name,
                value
            );
        }
        Ok(())
    }
}
