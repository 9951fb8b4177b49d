#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulation root that owns the FaeMaze world and drives every system once per tick.
//!
//! Adapters hand [`Simulation::tick`] the elapsed time and a sampled
//! [`PlacementInput`]; the simulation applies the resulting commands and
//! pumps world events through the systems until they fall silent.

use std::time::Duration;

use faemaze_core::{Command, Event, PropKind};
use faemaze_system_fae::{Fae, FaeContext};
use faemaze_system_movement::Movement;
use faemaze_system_placement::Placement;
use faemaze_system_spawning::Spawning;
use faemaze_world::{self as world, query, GridError, MazeLayout, World, WorldConfig};
use log::{debug, info, warn};

pub use faemaze_system_fae::Config as FaeConfig;
pub use faemaze_system_movement::Config as MovementConfig;
pub use faemaze_system_placement::{PlacementInput, PlacementRequest};
pub use faemaze_system_spawning::Config as SpawningConfig;

/// Upper bound on command/event rounds processed within a single tick.
const MAX_ROUNDS_PER_TICK: usize = 8;

/// Tuning for the world and every system owned by the simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimulationConfig {
    /// World construction parameters.
    pub world: WorldConfig,
    /// Visitor spawning cadence.
    pub spawning: SpawningConfig,
    /// Visitor route planning.
    pub movement: MovementConfig,
    /// Fascination, wisp and puka behaviour.
    pub fae: FaeConfig,
}

/// Running totals gathered from the events of every tick so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// Visitors that entered the maze.
    pub spawned: usize,
    /// Visitors that reached a heart.
    pub reached_heart: usize,
    /// Visitors lured away by pukas.
    pub lost: usize,
    /// Essence currently available.
    pub essence: u32,
}

/// Outcome of a single simulation tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    /// Sequence number of the tick, starting at one.
    pub tick: u64,
    /// Every event the world emitted during the tick, in order.
    pub events: Vec<Event>,
}

/// Explicit simulation context owning the world and its systems.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    placement: Placement,
    spawning: Spawning,
    movement: Movement,
    fae: Fae,
    tick: u64,
    stats: Stats,
}

impl Simulation {
    /// Builds a simulation for the provided maze layout.
    pub fn new(layout: &MazeLayout, config: SimulationConfig) -> Result<Self, GridError> {
        let world = World::new(layout, config.world)?;
        info!(
            "{} {}x{} maze with {} entrances and {} hearts",
            query::welcome_banner(&world),
            layout.width(),
            layout.height(),
            layout.entrances().len(),
            layout.hearts().len()
        );
        let stats = Stats {
            essence: query::essence(&world),
            ..Stats::default()
        };
        Ok(Self {
            world,
            placement: Placement::new(),
            spawning: Spawning::new(config.spawning),
            movement: Movement::new(config.movement),
            fae: Fae::new(config.fae),
            tick: 0,
            stats,
        })
    }

    /// Read-only access to the world for adapters and queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Totals accumulated over every tick so far.
    #[must_use]
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Number of ticks simulated so far.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Advances the simulation by `dt`, applying the sampled input first.
    pub fn tick(&mut self, dt: Duration, input: &PlacementInput) -> TickReport {
        self.tick += 1;
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        let mut commands = Vec::new();
        let current = &self.world;
        self.placement.handle(
            input,
            |position| query::world_to_grid(current, position),
            &mut commands,
        );
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }

        let mut log = events.clone();
        let mut pending = events;
        let mut rounds = 0;
        while !pending.is_empty() {
            if rounds == MAX_ROUNDS_PER_TICK {
                warn!(
                    "tick {} still busy after {MAX_ROUNDS_PER_TICK} rounds; deferring {} events",
                    self.tick,
                    pending.len()
                );
                break;
            }
            rounds += 1;

            let commands = self.dispatch(&pending);
            if commands.is_empty() {
                break;
            }

            let mut produced = Vec::new();
            for command in commands {
                world::apply(&mut self.world, command, &mut produced);
            }
            log.extend(produced.iter().cloned());
            pending = produced;
        }

        self.record(&log);
        debug!("tick {} produced {} events in {rounds} rounds", self.tick, log.len());
        TickReport {
            tick: self.tick,
            events: log,
        }
    }

    /// Runs every system over one batch of events.
    fn dispatch(&mut self, events: &[Event]) -> Vec<Command> {
        let world = &self.world;
        let visitors = query::visitor_view(world);
        let props = query::prop_view(world);
        let mut commands = Vec::new();

        self.spawning.handle(
            events,
            query::entrances(world),
            query::visitor_count(world),
            &mut commands,
        );

        let context = FaeContext {
            visitors: &visitors,
            props: &props,
            grid: query::grid(world),
            pathfinder: query::pathfinder(world),
            wisp: query::prop_tuning(world, PropKind::Wisp),
        };
        self.fae.handle(
            events,
            context,
            |cell| query::in_influence(world, cell),
            &mut commands,
        );

        self.movement.handle(
            events,
            &visitors,
            query::grid(world),
            query::pathfinder(world),
            query::hearts(world),
            &mut commands,
        );

        commands
    }

    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::VisitorSpawned { .. } => self.stats.spawned += 1,
                Event::VisitorReachedHeart { visitor, cell } => {
                    self.stats.reached_heart += 1;
                    info!("visitor {} reached the heart at {cell:?}", visitor.get());
                }
                Event::VisitorLost { visitor, cell } => {
                    self.stats.lost += 1;
                    info!("visitor {} was lured away at {cell:?}", visitor.get());
                }
                Event::PropPlaced { kind, cell, .. } => info!("{kind:?} placed at {cell:?}"),
                Event::PropPlacementRejected { kind, cell, reason } => {
                    warn!("{kind:?} at {cell:?} rejected: {reason:?}");
                }
                _ => {}
            }
        }
        self.stats.essence = query::essence(&self.world);
    }
}
