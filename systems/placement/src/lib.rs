#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure placement system that turns sampled player input into prop placement commands.

use faemaze_core::{CellCoord, Command, PropKind};
use glam::Vec3;
use log::debug;

/// Player request to drop a prop at a world-space position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementRequest {
    /// Kind of prop the player selected.
    pub kind: PropKind,
    /// World-space position the player pointed at.
    pub position: Vec3,
}

impl PlacementRequest {
    /// Creates a new placement request.
    #[must_use]
    pub const fn new(kind: PropKind, position: Vec3) -> Self {
        Self { kind, position }
    }
}

/// Input snapshot sampled once per tick by the adapter driving the simulation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlacementInput {
    /// Placement requests issued since the previous tick, in arrival order.
    pub requests: Vec<PlacementRequest>,
}

impl PlacementInput {
    /// Creates an input snapshot carrying the provided requests.
    #[must_use]
    pub fn new(requests: Vec<PlacementRequest>) -> Self {
        Self { requests }
    }

    /// Reports whether the snapshot carries no requests.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// Placement system translating input snapshots into world commands.
#[derive(Debug, Default, Clone)]
pub struct Placement {
    dropped: usize,
}

impl Placement {
    /// Creates a new placement system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self { dropped: 0 }
    }

    /// Number of requests discarded because they pointed outside the grid.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped
    }

    /// Converts each request into a [`Command::PlaceProp`].
    ///
    /// The `world_to_grid` closure should mirror the world's
    /// `query::world_to_grid` helper. Requests it cannot map are dropped.
    /// Every other rule (terrain, occupancy, essence) is enforced by the world.
    pub fn handle<F>(&mut self, input: &PlacementInput, mut world_to_grid: F, out: &mut Vec<Command>)
    where
        F: FnMut(Vec3) -> Option<CellCoord>,
    {
        for request in &input.requests {
            match world_to_grid(request.position) {
                Some(cell) => out.push(Command::PlaceProp {
                    kind: request.kind,
                    cell,
                }),
                None => {
                    self.dropped += 1;
                    debug!(
                        "dropped {:?} request at {:?}: outside the maze",
                        request.kind, request.position
                    );
                }
            }
        }
    }
}
