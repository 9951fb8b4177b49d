#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless FaeMaze session.

mod settings;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use faemaze_core::Event;
use faemaze_simulation::{PlacementInput, Simulation};
use faemaze_world::{query, MazeLayout};
use log::{debug, info, LevelFilter};

use crate::settings::Settings;

/// Runs a maze for a fixed number of ticks and reports how the visitors fared.
#[derive(Debug, Parser)]
#[command(name = "faemaze", version, about)]
struct Args {
    /// ASCII maze file (`#` wall, `.` path, `~` water, `S` entrance, `H` heart).
    #[arg(long, value_name = "PATH")]
    maze: PathBuf,
    /// Optional TOML settings file overriding the built-in tuning.
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u64,
    /// Simulated milliseconds per tick.
    #[arg(long = "tick-ms", default_value_t = 100)]
    tick_ms: u64,
    /// Log routine simulation decisions.
    #[arg(long)]
    verbose: bool,
}

/// Entry point for the FaeMaze command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let maze = fs::read_to_string(&args.maze)
        .with_context(|| format!("failed to read maze file {}", args.maze.display()))?;
    let layout = MazeLayout::parse(&maze)
        .with_context(|| format!("failed to parse maze file {}", args.maze.display()))?;
    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    let mut simulation = Simulation::new(&layout, settings.simulation_config())
        .context("invalid simulation settings")?;
    println!("{}", query::welcome_banner(simulation.world()));

    let z = query::transform(simulation.world()).origin().z;
    let placements = settings.placements();
    let dt = Duration::from_millis(args.tick_ms);
    for tick in 0..args.ticks {
        let requests = placements
            .iter()
            .filter(|placement| placement.at_tick == tick)
            .map(|placement| placement.request(z))
            .collect();
        let report = simulation.tick(dt, &PlacementInput::new(requests));
        for event in &report.events {
            log_event(report.tick, event);
        }
    }

    let stats = simulation.stats();
    println!("ticks simulated: {}", simulation.tick_count());
    println!("visitors spawned: {}", stats.spawned);
    println!("reached the heart: {}", stats.reached_heart);
    println!("lured away: {}", stats.lost);
    println!("still wandering: {}", query::visitor_count(simulation.world()));
    println!("props placed: {}", query::prop_count(simulation.world()));
    println!("essence: {}", stats.essence);
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn log_event(tick: u64, event: &Event) {
    match event {
        Event::VisitorStateChanged { visitor, state } => {
            info!("[{tick}] visitor {} is now {state:?}", visitor.get());
        }
        Event::WispMoved { prop, to, .. } => {
            debug!("[{tick}] wisp {} drifted to {to:?}", prop.get());
        }
        Event::EssenceChanged { essence } => debug!("[{tick}] essence {essence}"),
        _ => {}
    }
}
