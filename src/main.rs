use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use watch_progress::{CoverageTracker, TrackerConfig, WatchProgress, WatchProgressRecord};

/// Watch progress replay tool
///
/// Feeds recorded playback positions through the coverage tracker and prints
/// the resulting progress record, the same JSON a reporting client would send.
#[derive(Parser, Debug)]
#[command(name = "watch-progress")]
#[command(version = "0.1.0")]
#[command(about = "Replay playback samples through the watch coverage tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply position samples to a progress record and print it as JSON.
    Replay(ReplayArgs),
}

#[derive(Args, Debug, Clone)]
struct ReplayArgs {
    /// Media duration in seconds for a brand new record
    #[arg(long, conflicts_with = "progress")]
    duration: Option<f64>,

    /// Comma separated playback positions in seconds
    #[arg(long, value_delimiter = ',', conflicts_with = "samples_file")]
    positions: Vec<f64>,

    /// File holding positions as a JSON array or whitespace separated numbers
    #[arg(long, value_name = "PATH")]
    samples_file: Option<PathBuf>,

    /// Existing progress record (JSON) to resume from
    #[arg(long, value_name = "PATH")]
    progress: Option<PathBuf>,

    /// Tracker tolerances (JSON)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log every transition
    #[arg(short, long)]
    verbose: bool,
}

impl ReplayArgs {
    fn validate(&self) -> Result<()> {
        if self.duration.is_none() && self.progress.is_none() {
            bail!("Provide a media length via --duration or a record via --progress");
        }
        if self.positions.is_empty() && self.samples_file.is_none() {
            bail!("Provide samples via --positions or --samples-file");
        }
        if let Some(path) = &self.samples_file {
            if !path.is_file() {
                bail!("Samples file does not exist: {:?}", path);
            }
        }
        Ok(())
    }

    fn samples(&self) -> Result<Vec<f64>> {
        match &self.samples_file {
            Some(path) => load_samples(path),
            None => Ok(self.positions.clone()),
        }
    }

    fn initial_progress(&self, first_sample: f64) -> Result<WatchProgress> {
        if let Some(path) = &self.progress {
            return load_progress(path);
        }
        let Some(duration) = self.duration else {
            bail!("No media duration provided"); // Should not happen due to validation
        };
        WatchProgress::new(duration, first_sample).context("Failed to create progress record")
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Replay(args) => {
            init_tracing(args.verbose);
            let record = run_replay(&args).context("Replay failed")?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "watch_progress=debug"
    } else {
        "watch_progress=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_replay(args: &ReplayArgs) -> Result<WatchProgressRecord> {
    args.validate()
        .context("Failed to validate command-line arguments")?;

    let config = TrackerConfig::from_path(args.config.as_deref())?;
    let tracker = CoverageTracker::new(config)?;
    let samples = args.samples()?;
    let mut progress = args.initial_progress(samples.first().copied().unwrap_or(0.0))?;

    info!(
        samples = samples.len(),
        duration = progress.video_duration,
        seek_tolerance = tracker.config().seek_tolerance,
        join_tolerance = tracker.config().join_tolerance,
        "replaying playback samples"
    );
    for (idx, position) in samples.iter().copied().enumerate() {
        tracker
            .record_position(&mut progress, position)
            .with_context(|| format!("Failed to record sample {} ({})", idx + 1, position))?;
    }
    info!(
        total = progress.total_watch_time,
        percent = progress.percent_watched,
        segments = progress.watch_segments.len(),
        tracking = progress.window.is_tracking(),
        "replay complete"
    );

    Ok(progress.into())
}

fn load_samples(path: &Path) -> Result<Vec<f64>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read samples file {:?}", path))?;
    parse_samples(&raw).with_context(|| format!("Invalid samples in {:?}", path))
}

fn parse_samples(raw: &str) -> Result<Vec<f64>> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("Failed to parse samples JSON array");
    }
    trimmed
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<f64>()
                .with_context(|| format!("Failed to parse sample '{}'", token))
        })
        .collect()
}

fn load_progress(path: &Path) -> Result<WatchProgress> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read progress record {:?}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid progress record in {:?}", path))
}
