#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that plans attraction-weighted routes and proposes visitor steps.

use std::collections::{BTreeMap, VecDeque};

use faemaze_core::{
    CellCoord, Command, Direction, Event, VisitorId, VisitorSnapshot, VisitorState, VisitorView,
};
use faemaze_world::{MazeGrid, Pathfinder};
use log::trace;
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the movement system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    walking_multiplier: f32,
    fascinated_multiplier: f32,
    confused_multiplier: f32,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration from per-state attraction multipliers and a wander seed.
    #[must_use]
    pub const fn new(
        walking_multiplier: f32,
        fascinated_multiplier: f32,
        confused_multiplier: f32,
        rng_seed: u64,
    ) -> Self {
        Self {
            walking_multiplier,
            fascinated_multiplier,
            confused_multiplier,
            rng_seed,
        }
    }

    /// Attraction multiplier handed to the pathfinder for a visitor in `state`.
    #[must_use]
    pub const fn multiplier_for(&self, state: VisitorState) -> f32 {
        match state {
            VisitorState::Walking => self.walking_multiplier,
            VisitorState::Fascinated => self.fascinated_multiplier,
            VisitorState::Confused => self.confused_multiplier,
        }
    }

    /// Seed of the generator used when a visitor has no route and wanders.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(1.0, 2.0, 1.5, 0x00c0_ffee)
    }
}

#[derive(Clone, Debug)]
struct Route {
    state: VisitorState,
    steps: VecDeque<CellCoord>,
}

impl Route {
    /// Next cell to enter from `cell`, discarding steps the visitor already took.
    fn next_from(&mut self, cell: CellCoord) -> Option<CellCoord> {
        if let Some(index) = self.steps.iter().position(|step| *step == cell) {
            let _ = self.steps.drain(..=index);
        }
        self.steps
            .front()
            .copied()
            .filter(|next| next.manhattan_distance(cell) == 1)
    }
}

/// Pure system that reacts to world events and emits visitor step commands.
#[derive(Debug)]
pub struct Movement {
    config: Config,
    routes: BTreeMap<VisitorId, Route>,
    rng: ChaCha8Rng,
    scratch: Vec<CellCoord>,
    goals: Vec<CellCoord>,
}

impl Movement {
    /// Creates a new movement system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            routes: BTreeMap::new(),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            scratch: Vec::new(),
            goals: Vec::new(),
        }
    }

    /// Number of visitors that currently hold a cached route.
    #[must_use]
    pub fn cached_routes(&self) -> usize {
        self.routes.len()
    }

    /// Consumes world events and immutable views to emit movement commands.
    ///
    /// Steps are only proposed on batches that advanced time; other batches
    /// merely invalidate cached routes.
    pub fn handle(
        &mut self,
        events: &[Event],
        visitors: &VisitorView,
        grid: &MazeGrid,
        pathfinder: &Pathfinder,
        hearts: &[CellCoord],
        out: &mut Vec<Command>,
    ) {
        let mut time_advanced = false;
        for event in events {
            match event {
                Event::TimeAdvanced { .. } => time_advanced = true,
                Event::AttractionChanged { .. } => self.routes.clear(),
                Event::VisitorStateChanged { visitor, .. }
                | Event::VisitorReachedHeart { visitor, .. }
                | Event::VisitorLost { visitor, .. } => {
                    let _ = self.routes.remove(visitor);
                }
                _ => {}
            }
        }

        if !time_advanced {
            return;
        }

        self.routes
            .retain(|id, _| visitors.get(*id).is_some());

        for visitor in visitors.iter() {
            if !visitor.ready_for_step {
                continue;
            }

            let next = match self.cached_step(visitor) {
                Some(next) => Some(next),
                None => self
                    .plan_route(visitor, grid, pathfinder, hearts)
                    .or_else(|| self.wander(visitor.cell, grid)),
            };

            let Some(direction) = next.and_then(|cell| visitor.cell.direction_to(cell)) else {
                trace!("visitor {} has nowhere to go", visitor.id.get());
                continue;
            };
            out.push(Command::StepVisitor {
                visitor: visitor.id,
                direction,
            });
        }
    }

    fn cached_step(&mut self, visitor: &VisitorSnapshot) -> Option<CellCoord> {
        let route = self.routes.get_mut(&visitor.id)?;
        if route.state != visitor.state {
            return None;
        }
        route.next_from(visitor.cell)
    }

    fn plan_route(
        &mut self,
        visitor: &VisitorSnapshot,
        grid: &MazeGrid,
        pathfinder: &Pathfinder,
        hearts: &[CellCoord],
    ) -> Option<CellCoord> {
        let _ = self.routes.remove(&visitor.id);

        self.goals.clear();
        self.goals.extend_from_slice(hearts);
        self.goals
            .sort_by_key(|heart| heart.manhattan_distance(visitor.cell));

        let multiplier = self.config.multiplier_for(visitor.state);
        for &heart in &self.goals {
            if !pathfinder.try_find_path(grid, visitor.cell, heart, &mut self.scratch, multiplier)
            {
                continue;
            }

            let mut route = Route {
                state: visitor.state,
                steps: self.scratch.iter().copied().collect(),
            };
            let next = route.next_from(visitor.cell);
            let _ = self.routes.insert(visitor.id, route);
            return next;
        }

        None
    }

    fn wander(&mut self, cell: CellCoord, grid: &MazeGrid) -> Option<CellCoord> {
        let options: Vec<CellCoord> = Direction::ALL
            .iter()
            .filter_map(|direction| cell.step(*direction))
            .filter(|neighbor| grid.is_walkable(*neighbor))
            .collect();
        options.choose(&mut self.rng).copied()
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_skips_cells_already_visited() {
        let mut route = Route {
            state: VisitorState::Walking,
            steps: [
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(2, 0),
            ]
            .into_iter()
            .collect(),
        };

        assert_eq!(
            route.next_from(CellCoord::new(1, 0)),
            Some(CellCoord::new(2, 0))
        );
    }

    #[test]
    fn route_never_sends_the_visitor_backwards() {
        let mut route = Route {
            state: VisitorState::Walking,
            steps: [
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(2, 0),
                CellCoord::new(3, 0),
            ]
            .into_iter()
            .collect(),
        };

        assert_eq!(
            route.next_from(CellCoord::new(2, 0)),
            Some(CellCoord::new(3, 0))
        );
        assert_eq!(route.steps.len(), 1);
        assert_eq!(route.next_from(CellCoord::new(3, 0)), None);
        assert!(route.steps.is_empty());
    }

    #[test]
    fn route_rejects_non_adjacent_steps() {
        let mut route = Route {
            state: VisitorState::Walking,
            steps: [CellCoord::new(3, 3)].into_iter().collect(),
        };
        assert_eq!(route.next_from(CellCoord::new(0, 0)), None);
    }

    #[test]
    fn multipliers_follow_state() {
        let config = Config::new(1.0, 4.0, 0.25, 1);
        assert_eq!(config.multiplier_for(VisitorState::Walking), 1.0);
        assert_eq!(config.multiplier_for(VisitorState::Fascinated), 4.0);
        assert_eq!(config.multiplier_for(VisitorState::Confused), 0.25);
    }
}
