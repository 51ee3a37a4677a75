#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the fuel blend simulator headlessly.

mod cli;
mod report;

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use fuel_blend_rendering::{present, BlendGauge, RenderingBackend};
use fuel_blend_simulation::{Simulation, SimulationConfig};

use crate::{cli::Cli, report::TextBackend};

/// Entry point for the fuel blend command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let stdout = io::stdout();
    let mut backend = TextBackend::new(stdout.lock());
    run(&cli, &mut backend)
}

fn run<W: Write>(cli: &Cli, backend: &mut TextBackend<W>) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(width) = cli.viewport_width {
        config.viewport_width = width;
    }

    let mut simulation =
        Simulation::new(config).context("failed to build simulation from configuration")?;
    backend.present_blend(&BlendGauge::new(simulation.percentage()))?;
    present(&simulation.drain_events(), backend)?;

    simulation.start();
    log::info!(
        "running {:?} of simulated time in {:?} frames",
        cli.duration(),
        cli.frame()
    );

    let end = cli.duration();
    let mut timeline = cli.blend_timeline().into_iter().peekable();
    loop {
        while let Some((_, value)) = timeline.next_if(|(at, _)| *at <= simulation.now()) {
            simulation.set_percentage(value);
        }
        present(&simulation.drain_events(), backend)?;

        if simulation.now() >= end {
            break;
        }
        let next_blend = timeline.peek().map(|(at, _)| *at);
        simulation.advance(cli.step(simulation.now(), next_blend));
    }

    backend.write_summary()?;
    simulation.stop();
    present(&simulation.drain_events(), backend)
}
