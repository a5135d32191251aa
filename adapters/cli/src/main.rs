#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Critter Defence scenario headlessly.

mod scenario;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use critter_defence_core::{Event, TICKS_PER_SECOND};
use tracing_subscriber::EnvFilter;

use crate::scenario::Scenario;

/// Headless Critter Defence runner.
#[derive(Parser, Debug)]
#[command(name = "critter-defence")]
#[command(about = "Run a Critter Defence scenario and print a summary")]
struct Args {
    /// Scenario TOML file describing the map, towers and tuning
    scenario: PathBuf,

    /// Maximum ticks to simulate (60 ticks per second)
    #[arg(long, default_value_t = 36_000)]
    ticks: u64,

    /// Overrides the seed stored in the scenario
    #[arg(long)]
    seed: Option<u64>,
}

/// Entry point for the Critter Defence command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut scenario = Scenario::load(&args.scenario)?;
    if let Some(seed) = args.seed {
        scenario.simulation.seed = seed;
    }

    let mut simulation = scenario.build()?;
    let mut ticks = 0;
    while ticks < args.ticks && !simulation.is_finished() {
        let events = simulation.tick().context("simulation stopped unexpectedly")?;
        for event in events {
            if let Event::CritterExited { critter, power, .. } = event {
                tracing::info!(critter = critter.get(), power, "critter escaped");
            }
        }
        ticks += 1;
    }

    let stats = simulation.stats();
    println!(
        "simulated {} ticks ({:.1} s)",
        stats.ticks,
        stats.ticks as f64 / f64::from(TICKS_PER_SECOND)
    );
    println!(
        "wave {} ({})",
        simulation.current_wave(),
        if simulation.is_finished() {
            "all waves cleared"
        } else {
            "in progress"
        }
    );
    println!(
        "kills: {}  escapes: {}  power leaked: {}",
        stats.kills, stats.exits, stats.power_leaked
    );
    println!(
        "money earned: {}  purse: {}",
        stats.money_earned,
        simulation.purse()
    );
    for tower in simulation.towers().iter() {
        println!(
            "  tower {} {:?} level {} at ({}, {}): {} kills",
            tower.id.get(),
            tower.kind,
            tower.stats.level,
            tower.cell.column(),
            tower.cell.row(),
            tower.kills
        );
    }
    Ok(())
}
