//! Command-line arguments and the blend timeline derived from them.

use std::{path::PathBuf, time::Duration};

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "fuel-blend")]
#[command(about = "Headless ethanol blend emissions and exhaust simulator", long_about = None)]
#[command(version)]
pub(crate) struct Cli {
    /// TOML file overriding the emission profile and emitter tuning
    #[arg(long, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,

    /// Seed for every random stream (overrides the configuration file)
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Simulated run length in milliseconds
    #[arg(long, default_value_t = 10_000)]
    pub(crate) duration_ms: u64,

    /// Simulated frame length in milliseconds
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..))]
    pub(crate) frame_ms: u64,

    /// Blend percentages applied at evenly spaced points of the run
    #[arg(long = "blend", value_name = "PERCENT", num_args = 1.., allow_negative_numbers = true)]
    pub(crate) blends: Vec<i64>,

    /// Viewport width ambient particles are scattered across (overrides the configuration file)
    #[arg(long)]
    pub(crate) viewport_width: Option<f32>,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub(crate) verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long)]
    pub(crate) quiet: bool,
}

impl Cli {
    pub(crate) fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub(crate) fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }

    /// Log filter selected by `-v`/`-q`; `RUST_LOG` still overrides it.
    pub(crate) fn log_level(&self) -> log::LevelFilter {
        match (self.quiet, self.verbose) {
            (true, _) => log::LevelFilter::Error,
            (false, 0) => log::LevelFilter::Warn,
            (false, 1) => log::LevelFilter::Info,
            (false, 2) => log::LevelFilter::Debug,
            (false, _) => log::LevelFilter::Trace,
        }
    }

    /// Length of the next advance from `now`: one frame, cut short at the end
    /// of the run or at the next pending blend change.
    pub(crate) fn step(&self, now: Duration, next_blend: Option<Duration>) -> Duration {
        let step = self.frame().min(self.duration().saturating_sub(now));
        match next_blend {
            Some(at) => step.min(at.saturating_sub(now)),
            None => step,
        }
    }

    /// Splits the run into equal segments and applies one blend at the end of each but the last.
    pub(crate) fn blend_timeline(&self) -> Vec<(Duration, i64)> {
        let segments = u32::try_from(self.blends.len() + 1).unwrap_or(u32::MAX);
        let segment = self.duration() / segments;
        self.blends
            .iter()
            .zip(1_u32..)
            .map(|(value, index)| (segment * index, *value))
            .collect()
    }
}
