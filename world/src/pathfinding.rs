//! Attraction-weighted A* search over the maze grid.

use faemaze_core::CellCoord;
use pathfinding::prelude::astar;

use crate::grid::MazeGrid;

/// Upper bound applied to a single step so sums stay far from overflow.
const MAX_STEP_COST: u64 = u32::MAX as u64;

/// Fixed-point cost model used by the [`Pathfinder`].
///
/// Entering a cell costs
/// `max(min_step_cost, base_step_cost - round(attraction * multiplier * attraction_weight))`.
/// Positive attraction therefore discounts a step down to the floor, while
/// negative attraction makes a step more expensive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathCosts {
    base_step_cost: u32,
    min_step_cost: u32,
    attraction_weight: f32,
}

impl PathCosts {
    /// Creates a cost model.
    ///
    /// `min_step_cost` is raised to at least one and `base_step_cost` to at
    /// least `min_step_cost`; a non-finite weight disables attraction.
    #[must_use]
    pub fn new(base_step_cost: u32, min_step_cost: u32, attraction_weight: f32) -> Self {
        let min_step_cost = min_step_cost.max(1);
        Self {
            base_step_cost: base_step_cost.max(min_step_cost),
            min_step_cost,
            attraction_weight: if attraction_weight.is_finite() {
                attraction_weight
            } else {
                0.0
            },
        }
    }

    /// Cost of a step across an unattractive cell.
    #[must_use]
    pub const fn base_step_cost(&self) -> u32 {
        self.base_step_cost
    }

    /// Floor applied to every step cost.
    #[must_use]
    pub const fn min_step_cost(&self) -> u32 {
        self.min_step_cost
    }

    /// Cost units removed per point of attraction.
    #[must_use]
    pub const fn attraction_weight(&self) -> f32 {
        self.attraction_weight
    }

    /// Cost of entering a cell with the given attraction.
    #[must_use]
    pub fn step_cost(&self, attraction: f32, multiplier: f32) -> u64 {
        let discount =
            f64::from(attraction) * f64::from(multiplier) * f64::from(self.attraction_weight);
        let raw = f64::from(self.base_step_cost) - discount;
        if raw.is_nan() {
            return u64::from(self.base_step_cost);
        }
        raw.round()
            .clamp(f64::from(self.min_step_cost), MAX_STEP_COST as f64) as u64
    }

    fn heuristic(&self, from: CellCoord, goal: CellCoord) -> u64 {
        u64::from(from.manhattan_distance(goal)) * u64::from(self.min_step_cost)
    }
}

impl Default for PathCosts {
    fn default() -> Self {
        Self::new(1_000, 100, 100.0)
    }
}

/// Shortest-path search that treats attraction as a cost discount.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pathfinder {
    costs: PathCosts,
}

impl Pathfinder {
    /// Creates a pathfinder with the provided cost model.
    #[must_use]
    pub const fn new(costs: PathCosts) -> Self {
        Self { costs }
    }

    /// Cost model applied by the pathfinder.
    #[must_use]
    pub const fn costs(&self) -> PathCosts {
        self.costs
    }

    /// Searches for the cheapest walkable route from `start` to `goal`.
    ///
    /// On success `out` holds the route from `start` to `goal` inclusive and
    /// the method returns `true`. When either end is missing or blocked, or
    /// no walkable route connects them, `out` is left empty and the method
    /// returns `false`.
    ///
    /// `attraction_multiplier` scales how strongly attraction discounts a
    /// step; `1.0` is ordinary susceptibility and `0.0` ignores attraction.
    /// Non-finite multipliers are treated as `0.0`.
    ///
    /// The heuristic is the Manhattan distance times the step floor, which
    /// never overestimates, so returned routes are optimal under the cost
    /// model. Neighbours expand north, east, south, west, which makes equal
    /// cost ties resolve the same way on every run.
    pub fn try_find_path(
        &self,
        grid: &MazeGrid,
        start: CellCoord,
        goal: CellCoord,
        out: &mut Vec<CellCoord>,
        attraction_multiplier: f32,
    ) -> bool {
        out.clear();
        if !grid.is_walkable(start) || !grid.is_walkable(goal) {
            return false;
        }
        if start == goal {
            out.push(start);
            return true;
        }

        let multiplier = if attraction_multiplier.is_finite() {
            attraction_multiplier
        } else {
            0.0
        };
        let costs = self.costs;

        let result = astar(
            &start,
            |cell| {
                grid.walkable_neighbors(*cell)
                    .map(|neighbor| {
                        let attraction = grid.attraction(neighbor).unwrap_or(0.0);
                        (neighbor, costs.step_cost(attraction, multiplier))
                    })
                    .collect::<Vec<_>>()
            },
            |cell| costs.heuristic(*cell, goal),
            |cell| *cell == goal,
        );

        match result {
            Some((path, _cost)) => {
                out.extend(path);
                true
            }
            None => false,
        }
    }
}

impl MazeGrid {
    /// Finds a route with the default cost model.
    ///
    /// See [`Pathfinder::try_find_path`] for the contract.
    pub fn try_find_path(
        &self,
        start: CellCoord,
        goal: CellCoord,
        out: &mut Vec<CellCoord>,
        attraction_multiplier: f32,
    ) -> bool {
        Pathfinder::default().try_find_path(self, start, goal, out, attraction_multiplier)
    }
}
