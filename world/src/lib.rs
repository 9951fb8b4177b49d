#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for FaeMaze.
//!
//! The world owns the maze grid, the placed props, the visitors and the
//! player's essence. Every mutation arrives as a [`Command`] through
//! [`apply`]; read access goes through the [`query`] module.

mod grid;
mod layout;
mod pathfinding;
mod props;
mod reachability;
mod transform;
mod visitors;

use std::time::Duration;

use faemaze_core::{CellCoord, Command, Event, PlacementError, PropKind, Terrain, WELCOME_BANNER};
use glam::Vec3;
use log::{debug, warn};

pub use grid::{GridError, MazeGrid, MazeNode};
pub use layout::{LayoutError, MazeLayout};
pub use pathfinding::{PathCosts, Pathfinder};
pub use props::{PropCatalog, PropTuning};
pub use transform::GridTransform;

use props::PropRegistry;
use visitors::VisitorRegistry;

/// Tuning applied when constructing a [`World`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldConfig {
    /// World position of the lower-left corner of cell `(0, 0)`.
    pub origin: Vec3,
    /// Edge length of a cell in world units.
    pub tile_size: f32,
    /// Cost model used by the pathfinder.
    pub path_costs: PathCosts,
    /// Minimum time a visitor waits between steps.
    pub visitor_step_interval: Duration,
    /// Essence available before any prop is placed.
    pub starting_essence: u32,
    /// Essence granted whenever a visitor reaches a heart.
    pub essence_per_visitor: u32,
    /// Per-kind prop tuning.
    pub props: PropCatalog,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            tile_size: 1.0,
            path_costs: PathCosts::default(),
            visitor_step_interval: Duration::from_millis(500),
            starting_essence: 100,
            essence_per_visitor: 5,
            props: PropCatalog::default(),
        }
    }
}

/// Represents the authoritative FaeMaze world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: MazeGrid,
    transform: GridTransform,
    pathfinder: Pathfinder,
    entrances: Vec<CellCoord>,
    hearts: Vec<CellCoord>,
    props: PropRegistry,
    visitors: VisitorRegistry,
    essence: u32,
    config: WorldConfig,
}

impl World {
    /// Creates a world from a parsed layout.
    pub fn new(layout: &MazeLayout, config: WorldConfig) -> Result<Self, GridError> {
        let grid = layout.to_grid();
        let transform = GridTransform::for_grid(&grid, config.origin, config.tile_size)?;
        Ok(Self {
            banner: WELCOME_BANNER,
            transform,
            pathfinder: Pathfinder::new(config.path_costs),
            entrances: layout.entrances().to_vec(),
            hearts: layout.hearts().to_vec(),
            props: PropRegistry::new(),
            visitors: VisitorRegistry::new(),
            essence: config.starting_essence,
            grid,
            config,
        })
    }

    fn placement_error(&self, kind: PropKind, cell: CellCoord) -> Option<PlacementError> {
        let terrain = match self.grid.terrain(cell) {
            Some(terrain) => terrain,
            None => return Some(PlacementError::OutOfBounds),
        };

        if kind.requires_water() {
            if terrain != Terrain::Water {
                return Some(PlacementError::RequiresWater);
            }
        } else if !terrain.is_walkable() {
            return Some(PlacementError::NotWalkable);
        }

        if self.props.occupied(cell) {
            return Some(PlacementError::Occupied);
        }

        if self.essence < self.config.props.tuning(kind).cost {
            return Some(PlacementError::InsufficientEssence);
        }

        None
    }

    fn place_prop(&mut self, kind: PropKind, cell: CellCoord, out_events: &mut Vec<Event>) {
        if let Some(reason) = self.placement_error(kind, cell) {
            debug!("rejected {kind:?} at {cell:?}: {reason:?}");
            out_events.push(Event::PropPlacementRejected { kind, cell, reason });
            return;
        }

        let tuning = self.config.props.tuning(kind);
        let influence = if kind.emits_attraction() {
            self.grid
                .flood_fill_reachable(cell, tuning.radius, tuning.max_steps)
        } else {
            Default::default()
        };

        for &target in &influence {
            let delta = tuning.falloff(target.manhattan_distance(cell));
            if let Err(error) = self.grid.add_attraction(target, delta) {
                warn!("{kind:?} at {cell:?} could not raise attraction: {error}");
            }
        }

        self.essence -= tuning.cost;
        out_events.push(Event::EssenceChanged {
            essence: self.essence,
        });

        let influence_cells = u32::try_from(influence.len()).unwrap_or(u32::MAX);
        let prop = self.props.insert(kind, cell, influence);
        debug!("placed {kind:?} {} at {cell:?}", prop.get());
        out_events.push(Event::PropPlaced {
            prop,
            kind,
            cell,
            influence: influence_cells,
        });

        if influence_cells > 0 {
            out_events.push(Event::AttractionChanged {
                origin: cell,
                cells: influence_cells,
            });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
            for visitor in world.visitors.iter_mut() {
                visitor.accumulator = visitor.accumulator.saturating_add(dt);
                if visitor.elapse_state(dt) {
                    out_events.push(Event::VisitorStateChanged {
                        visitor: visitor.id,
                        state: visitor.state,
                    });
                }
            }
        }
        Command::PlaceProp { kind, cell } => world.place_prop(kind, cell, out_events),
        Command::AddAttraction { cell, delta } => match world.grid.add_attraction(cell, delta) {
            Ok(_) => out_events.push(Event::AttractionChanged {
                origin: cell,
                cells: 1,
            }),
            Err(error) => warn!("ignored attraction change: {error}"),
        },
        Command::SpawnVisitor { entrance } => {
            if !world.entrances.contains(&entrance) {
                warn!("ignored spawn request at {entrance:?}: not an entrance");
                return;
            }
            let visitor = world.visitors.spawn(entrance);
            out_events.push(Event::VisitorSpawned {
                visitor,
                cell: entrance,
            });
        }
        Command::StepVisitor { visitor, direction } => {
            let step_interval = world.config.visitor_step_interval;
            let Some(state) = world.visitors.get_mut(visitor) else {
                debug!("ignored step for unknown visitor {}", visitor.get());
                return;
            };
            if state.accumulator < step_interval {
                return;
            }
            let from = state.cell;
            let Some(to) = from
                .step(direction)
                .filter(|cell| world.grid.is_walkable(*cell))
            else {
                debug!("visitor {} cannot step {direction:?} from {from:?}", visitor.get());
                return;
            };

            state.cell = to;
            state.accumulator = state.accumulator.saturating_sub(step_interval);
            out_events.push(Event::VisitorAdvanced { visitor, from, to });

            if world.hearts.contains(&to) {
                let _ = world.visitors.remove(visitor);
                world.essence = world
                    .essence
                    .saturating_add(world.config.essence_per_visitor);
                out_events.push(Event::VisitorReachedHeart { visitor, cell: to });
                out_events.push(Event::EssenceChanged {
                    essence: world.essence,
                });
            }
        }
        Command::SetVisitorState {
            visitor,
            state,
            duration,
        } => {
            if let Some(entry) = world.visitors.get_mut(visitor) {
                if entry.apply_state(state, duration) {
                    out_events.push(Event::VisitorStateChanged { visitor, state });
                }
            }
        }
        Command::StepWisp { prop, direction } => {
            let occupied = |cell: CellCoord| world.props.occupied(cell);
            let Some(to) = world
                .props
                .get(prop)
                .filter(|entry| entry.kind == PropKind::Wisp)
                .and_then(|entry| entry.cell.step(direction))
                .filter(|cell| world.grid.is_walkable(*cell) && !occupied(*cell))
            else {
                debug!("wisp {} cannot step {direction:?}", prop.get());
                return;
            };
            if let Some(entry) = world.props.get_mut(prop) {
                let from = entry.cell;
                entry.cell = to;
                out_events.push(Event::WispMoved { prop, from, to });
            }
        }
        Command::LoseVisitor { visitor } => {
            if let Some(lost) = world.visitors.remove(visitor) {
                out_events.push(Event::VisitorLost {
                    visitor,
                    cell: lost.cell,
                });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::{collections::BTreeSet, time::Duration};

    use faemaze_core::{CellCoord, PropId, PropKind, PropView, VisitorView};
    use glam::Vec3;

    use super::{GridTransform, MazeGrid, Pathfinder, PropTuning, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the maze grid.
    #[must_use]
    pub fn grid(world: &World) -> &MazeGrid {
        &world.grid
    }

    /// Provides the world/grid coordinate transform.
    #[must_use]
    pub fn transform(world: &World) -> &GridTransform {
        &world.transform
    }

    /// Provides the pathfinder configured for the world.
    #[must_use]
    pub fn pathfinder(world: &World) -> &Pathfinder {
        &world.pathfinder
    }

    /// Converts a world position into a grid cell, if it lies on the grid.
    #[must_use]
    pub fn world_to_grid(world: &World, position: Vec3) -> Option<CellCoord> {
        world.transform.world_to_grid(position)
    }

    /// World-space centre of a grid cell.
    #[must_use]
    pub fn grid_to_world(world: &World, cell: CellCoord) -> Vec3 {
        world.transform.grid_to_world(cell)
    }

    /// Walkable cells reachable from `cell` within the radius and step budget.
    #[must_use]
    pub fn flood_fill_reachable(
        world: &World,
        cell: CellCoord,
        radius: u32,
        max_steps: u32,
    ) -> BTreeSet<CellCoord> {
        world.grid.flood_fill_reachable(cell, radius, max_steps)
    }

    /// Searches for a route with the world's cost model.
    pub fn try_find_path(
        world: &World,
        start: CellCoord,
        goal: CellCoord,
        out: &mut Vec<CellCoord>,
        attraction_multiplier: f32,
    ) -> bool {
        world
            .pathfinder
            .try_find_path(&world.grid, start, goal, out, attraction_multiplier)
    }

    /// Captures a read-only view of the visitors inside the maze.
    #[must_use]
    pub fn visitor_view(world: &World) -> VisitorView {
        let interval = world.config.visitor_step_interval;
        VisitorView::from_snapshots(
            world
                .visitors
                .iter()
                .map(|visitor| visitor.snapshot(interval))
                .collect(),
        )
    }

    /// Number of visitors currently inside the maze.
    #[must_use]
    pub fn visitor_count(world: &World) -> usize {
        world.visitors.len()
    }

    /// Captures a read-only view of the placed props.
    #[must_use]
    pub fn prop_view(world: &World) -> PropView {
        PropView::from_snapshots(world.props.iter().map(|prop| prop.snapshot()).collect())
    }

    /// Number of props placed in the maze.
    #[must_use]
    pub fn prop_count(world: &World) -> usize {
        world.props.len()
    }

    /// Cells whose attraction the prop raised at placement.
    #[must_use]
    pub fn influence_of(world: &World, prop: PropId) -> Option<&BTreeSet<CellCoord>> {
        world.props.get(prop).map(|entry| &entry.influence)
    }

    /// Reports whether any prop's influence area covers the cell.
    #[must_use]
    pub fn in_influence(world: &World, cell: CellCoord) -> bool {
        world.props.in_influence(cell)
    }

    /// Tuning that applies to props of the provided kind.
    #[must_use]
    pub fn prop_tuning(world: &World, kind: PropKind) -> PropTuning {
        world.config.props.tuning(kind)
    }

    /// Entrances where visitors appear.
    #[must_use]
    pub fn entrances(world: &World) -> &[CellCoord] {
        &world.entrances
    }

    /// Heart cells visitors try to reach.
    #[must_use]
    pub fn hearts(world: &World) -> &[CellCoord] {
        &world.hearts
    }

    /// Essence currently available to the player.
    #[must_use]
    pub fn essence(world: &World) -> u32 {
        world.essence
    }

    /// Minimum time a visitor waits between steps.
    #[must_use]
    pub fn visitor_step_interval(world: &World) -> Duration {
        world.config.visitor_step_interval
    }
}
