#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fae behaviour system: fascination near lanterns and fairy rings, wisps
//! hunting visitors, and pukas luring them off the path.

use std::{
    collections::{BTreeMap, BTreeSet},
    time::Duration,
};

use faemaze_core::{
    CellCoord, Command, Direction, Event, PropId, PropKind, PropSnapshot, PropView, VisitorId,
    VisitorState, VisitorView,
};
use faemaze_world::{MazeGrid, Pathfinder, PropTuning};
use log::{debug, trace};

/// Attraction multiplier wisps use when chasing; they ignore visitor states.
const WISP_ATTRACTION_MULTIPLIER: f32 = 1.0;

/// Configuration parameters required to construct the fae system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    fascination: Duration,
    confusion: Duration,
    wisp_step_interval: Duration,
    puka_reach: u32,
}

impl Config {
    /// Creates a configuration from state durations, wisp cadence and puka reach.
    #[must_use]
    pub const fn new(
        fascination: Duration,
        confusion: Duration,
        wisp_step_interval: Duration,
        puka_reach: u32,
    ) -> Self {
        Self {
            fascination,
            confusion,
            wisp_step_interval,
            puka_reach,
        }
    }

    /// How long a visitor stays fascinated.
    #[must_use]
    pub const fn fascination(&self) -> Duration {
        self.fascination
    }

    /// How long a visitor stays confused after a wisp catches it.
    #[must_use]
    pub const fn confusion(&self) -> Duration {
        self.confusion
    }

    /// Time between two wisp moves.
    #[must_use]
    pub const fn wisp_step_interval(&self) -> Duration {
        self.wisp_step_interval
    }

    /// Manhattan distance at which a puka lures a visitor.
    #[must_use]
    pub const fn puka_reach(&self) -> u32 {
        self.puka_reach
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(3_000),
            Duration::from_millis(4_000),
            Duration::from_millis(400),
            1,
        )
    }
}

/// Read-only world state the fae system reacts to.
#[derive(Clone, Copy, Debug)]
pub struct FaeContext<'a> {
    /// Visitors currently inside the maze.
    pub visitors: &'a VisitorView,
    /// Props placed in the maze.
    pub props: &'a PropView,
    /// Maze grid used for detection areas and chase routes.
    pub grid: &'a MazeGrid,
    /// Pathfinder configured for the world.
    pub pathfinder: &'a Pathfinder,
    /// Tuning bounding every wisp's detection area.
    pub wisp: PropTuning,
}

/// Pure system that emits fae-driven visitor state changes and wisp steps.
#[derive(Debug)]
pub struct Fae {
    config: Config,
    wisp_accumulator: Duration,
    targets: BTreeMap<PropId, VisitorId>,
    scratch: Vec<CellCoord>,
}

impl Fae {
    /// Creates a new fae system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            wisp_accumulator: Duration::ZERO,
            targets: BTreeMap::new(),
            scratch: Vec::new(),
        }
    }

    /// Visitor currently hunted by the wisp, if any.
    #[must_use]
    pub fn target_of(&self, wisp: PropId) -> Option<VisitorId> {
        self.targets.get(&wisp).copied()
    }

    /// Consumes world events and immutable views to emit fae commands.
    ///
    /// The `in_influence` closure should mirror the world's
    /// `query::in_influence` helper.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        context: FaeContext<'_>,
        mut in_influence: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(CellCoord) -> bool,
    {
        let mut lost = BTreeSet::new();
        let mut fascinated = BTreeSet::new();
        let mut elapsed = Duration::ZERO;

        for event in events {
            match event {
                Event::TimeAdvanced { dt } => elapsed = elapsed.saturating_add(*dt),
                Event::VisitorSpawned { visitor, cell } => {
                    self.lure(*visitor, *cell, context.props, &mut lost, out);
                }
                Event::VisitorAdvanced { visitor, to, .. } => {
                    self.lure(*visitor, *to, context.props, &mut lost, out);
                    if lost.contains(visitor) || !in_influence(*to) {
                        continue;
                    }
                    let walking = context
                        .visitors
                        .get(*visitor)
                        .is_some_and(|snapshot| snapshot.state == VisitorState::Walking);
                    if walking && fascinated.insert(*visitor) {
                        out.push(Command::SetVisitorState {
                            visitor: *visitor,
                            state: VisitorState::Fascinated,
                            duration: self.config.fascination,
                        });
                    }
                }
                Event::PropPlaced {
                    kind: PropKind::Puka,
                    ..
                } => {
                    for visitor in context.visitors.iter() {
                        self.lure(visitor.id, visitor.cell, context.props, &mut lost, out);
                    }
                }
                Event::VisitorReachedHeart { visitor, .. } | Event::VisitorLost { visitor, .. } => {
                    self.targets.retain(|_, target| target != visitor);
                }
                _ => {}
            }
        }

        if elapsed.is_zero() || self.resolve_wisp_steps(elapsed) == 0 {
            return;
        }

        self.targets
            .retain(|wisp, _| context.props.iter().any(|prop| prop.id == *wisp));
        for wisp in context.props.of_kind(PropKind::Wisp) {
            self.hunt(wisp, &context, &lost, out);
        }
    }

    /// Counts whole wisp cadences in the accumulated time and keeps only the remainder.
    ///
    /// Wisps move at most one cell per batch, so a backlog of several
    /// cadences still yields a single step.
    fn resolve_wisp_steps(&mut self, elapsed: Duration) -> usize {
        let interval = self.config.wisp_step_interval;
        if interval.is_zero() {
            return 0;
        }

        self.wisp_accumulator = self.wisp_accumulator.saturating_add(elapsed);
        let mut steps = 0;
        while self.wisp_accumulator >= interval {
            self.wisp_accumulator -= interval;
            steps += 1;
        }
        steps
    }

    /// Makes a visitor standing within reach of a puka lost, once per batch.
    fn lure(
        &self,
        visitor: VisitorId,
        cell: CellCoord,
        props: &PropView,
        lost: &mut BTreeSet<VisitorId>,
        out: &mut Vec<Command>,
    ) {
        if lost.contains(&visitor) {
            return;
        }
        let lured = props
            .of_kind(PropKind::Puka)
            .any(|puka| puka.cell.manhattan_distance(cell) <= self.config.puka_reach);
        if lured {
            debug!("puka lured visitor {} at {cell:?}", visitor.get());
            let _ = lost.insert(visitor);
            out.push(Command::LoseVisitor { visitor });
        }
    }

    fn hunt(
        &mut self,
        wisp: &PropSnapshot,
        context: &FaeContext<'_>,
        lost: &BTreeSet<VisitorId>,
        out: &mut Vec<Command>,
    ) {
        let detection = context
            .grid
            .flood_fill_reachable(wisp.cell, context.wisp.radius, context.wisp.max_steps);
        let is_prey = |id: VisitorId| {
            !lost.contains(&id)
                && context.visitors.get(id).is_some_and(|visitor| {
                    visitor.state != VisitorState::Confused && detection.contains(&visitor.cell)
                })
        };

        let target = self
            .targets
            .get(&wisp.id)
            .copied()
            .filter(|id| is_prey(*id))
            .or_else(|| {
                context
                    .visitors
                    .iter()
                    .map(|visitor| visitor.id)
                    .find(|id| is_prey(*id))
            });

        let Some(target) = target else {
            let _ = self.targets.remove(&wisp.id);
            return;
        };
        let Some(prey) = context.visitors.get(target) else {
            return;
        };

        if wisp.cell.manhattan_distance(prey.cell) <= 1 {
            debug!("wisp {} confused visitor {}", wisp.id.get(), target.get());
            let _ = self.targets.remove(&wisp.id);
            out.push(Command::SetVisitorState {
                visitor: target,
                state: VisitorState::Confused,
                duration: self.config.confusion,
            });
            return;
        }

        let _ = self.targets.insert(wisp.id, target);
        if !context.pathfinder.try_find_path(
            context.grid,
            wisp.cell,
            prey.cell,
            &mut self.scratch,
            WISP_ATTRACTION_MULTIPLIER,
        ) {
            trace!("wisp {} has no route to visitor {}", wisp.id.get(), target.get());
            return;
        }

        let occupied = |cell: CellCoord| context.props.iter().any(|prop| prop.cell == cell);
        let next = self
            .scratch
            .get(1)
            .copied()
            .filter(|next| !occupied(*next))
            .or_else(|| self.detour(wisp.cell, prey.cell, context, occupied));

        if let Some(direction) = next.and_then(|next| wisp.cell.direction_to(next)) {
            out.push(Command::StepWisp {
                prop: wisp.id,
                direction,
            });
        }
    }

    /// Free neighbour of `from` with the shortest onward route to `goal`.
    ///
    /// Used when another prop sits on the wisp's next cell; ties keep the
    /// first neighbour in north, east, south, west order.
    fn detour<F>(
        &mut self,
        from: CellCoord,
        goal: CellCoord,
        context: &FaeContext<'_>,
        occupied: F,
    ) -> Option<CellCoord>
    where
        F: Fn(CellCoord) -> bool,
    {
        let mut best: Option<(usize, CellCoord)> = None;
        for neighbor in Direction::ALL
            .iter()
            .filter_map(|direction| from.step(*direction))
            .filter(|cell| context.grid.is_walkable(*cell) && !occupied(*cell))
        {
            if !context.pathfinder.try_find_path(
                context.grid,
                neighbor,
                goal,
                &mut self.scratch,
                WISP_ATTRACTION_MULTIPLIER,
            ) {
                continue;
            }
            let length = self.scratch.len();
            if best.map_or(true, |(shortest, _)| length < shortest) {
                best = Some((length, neighbor));
            }
        }
        if best.is_none() {
            trace!("wisp at {from:?} is boxed in by props");
        }
        best.map(|(_, cell)| cell)
    }
}

impl Default for Fae {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_wisps_move_faster_than_fascination_lasts() {
        let config = Config::default();
        assert!(config.wisp_step_interval < config.fascination());
        assert!(config.confusion() > Duration::ZERO);
        assert_eq!(config.puka_reach, 1);
    }

    #[test]
    fn long_ticks_do_not_build_a_wisp_backlog() {
        let mut fae = Fae::new(Config::new(
            Duration::from_secs(3),
            Duration::from_secs(4),
            Duration::from_millis(400),
            1,
        ));

        for _ in 0..10 {
            assert!(fae.resolve_wisp_steps(Duration::from_millis(1_000)) >= 2);
            assert!(fae.wisp_accumulator < Duration::from_millis(400));
        }
        assert_eq!(fae.resolve_wisp_steps(Duration::from_millis(100)), 0);
    }

    #[test]
    fn wisps_without_cadence_never_step() {
        let mut fae = Fae::new(Config::new(
            Duration::from_secs(3),
            Duration::from_secs(4),
            Duration::ZERO,
            1,
        ));
        assert_eq!(fae.resolve_wisp_steps(Duration::from_secs(60)), 0);
    }
}
