#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the FaeMaze simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable views, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to FaeMaze.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests placement of a prop on the provided cell.
    PlaceProp {
        /// Kind of prop to place.
        kind: PropKind,
        /// Cell the prop should occupy.
        cell: CellCoord,
    },
    /// Adds an attraction delta to a single cell.
    AddAttraction {
        /// Cell whose attraction should change.
        cell: CellCoord,
        /// Amount added to the cell's attraction.
        delta: f32,
    },
    /// Requests that a visitor enters the maze through the provided entrance.
    SpawnVisitor {
        /// Entrance cell the visitor appears on.
        entrance: CellCoord,
    },
    /// Requests that a visitor advance a single step in the specified direction.
    StepVisitor {
        /// Identifier of the visitor attempting to move.
        visitor: VisitorId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Places a visitor into a temporary state.
    SetVisitorState {
        /// Identifier of the affected visitor.
        visitor: VisitorId,
        /// State the visitor should adopt.
        state: VisitorState,
        /// How long the state lasts before the visitor resumes walking.
        duration: Duration,
    },
    /// Requests that a wisp drift a single step in the specified direction.
    StepWisp {
        /// Identifier of the wisp prop.
        prop: PropId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Removes a visitor from the maze without reaching the heart.
    LoseVisitor {
        /// Identifier of the visitor that is lost.
        visitor: VisitorId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a prop was placed into the world.
    PropPlaced {
        /// Identifier assigned to the prop by the world.
        prop: PropId,
        /// Kind of prop that was placed.
        kind: PropKind,
        /// Cell the prop occupies.
        cell: CellCoord,
        /// Number of cells in the prop's influence area.
        influence: u32,
    },
    /// Reports that a prop placement request was rejected.
    PropPlacementRejected {
        /// Kind of prop requested for placement.
        kind: PropKind,
        /// Cell provided in the placement request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Announces that attraction values changed around a cell.
    AttractionChanged {
        /// Cell the change was centred on.
        origin: CellCoord,
        /// Number of cells whose attraction changed.
        cells: u32,
    },
    /// Confirms that a visitor entered the maze.
    VisitorSpawned {
        /// Identifier assigned to the visitor.
        visitor: VisitorId,
        /// Cell the visitor occupies after spawning.
        cell: CellCoord,
    },
    /// Confirms that a visitor moved between two cells.
    VisitorAdvanced {
        /// Identifier of the visitor that advanced.
        visitor: VisitorId,
        /// Cell the visitor occupied before moving.
        from: CellCoord,
        /// Cell the visitor occupies after the move.
        to: CellCoord,
    },
    /// Announces that a visitor changed state.
    VisitorStateChanged {
        /// Identifier of the affected visitor.
        visitor: VisitorId,
        /// State the visitor adopted.
        state: VisitorState,
    },
    /// Announces that a visitor reached the heart and left the maze.
    VisitorReachedHeart {
        /// Identifier of the visitor.
        visitor: VisitorId,
        /// Heart cell that was reached.
        cell: CellCoord,
    },
    /// Announces that a visitor was lost in the maze.
    VisitorLost {
        /// Identifier of the visitor.
        visitor: VisitorId,
        /// Cell the visitor was lost on.
        cell: CellCoord,
    },
    /// Confirms that a wisp drifted between two cells.
    WispMoved {
        /// Identifier of the wisp prop.
        prop: PropId,
        /// Cell the wisp occupied before moving.
        from: CellCoord,
        /// Cell the wisp occupies after the move.
        to: CellCoord,
    },
    /// Reports the essence balance after it changed.
    EssenceChanged {
        /// Essence available after the change.
        essence: u32,
    },
}

/// Cardinal movement directions available to visitors and wisps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in canonical expansion order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Returns the adjacent cell in the provided direction.
    ///
    /// Yields `None` when the step would leave the non-negative quadrant or
    /// overflow; upper bounds are the caller's concern.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::North => self.row.checked_sub(1).map(|row| Self::new(self.column, row)),
            Direction::East => self
                .column
                .checked_add(1)
                .map(|column| Self::new(column, self.row)),
            Direction::South => self.row.checked_add(1).map(|row| Self::new(self.column, row)),
            Direction::West => self
                .column
                .checked_sub(1)
                .map(|column| Self::new(column, self.row)),
        }
    }

    /// Direction leading from `self` to an orthogonally adjacent cell.
    #[must_use]
    pub fn direction_to(self, to: CellCoord) -> Option<Direction> {
        let column_diff = self.column.abs_diff(to.column);
        let row_diff = self.row.abs_diff(to.row);
        if column_diff + row_diff != 1 {
            return None;
        }

        if column_diff == 1 {
            if to.column > self.column {
                Some(Direction::East)
            } else {
                Some(Direction::West)
            }
        } else if to.row > self.row {
            Some(Direction::South)
        } else {
            Some(Direction::North)
        }
    }
}

/// Terrain classification of a maze cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    /// Open footpath that visitors may walk on.
    Path,
    /// Hedge or stone wall.
    Wall,
    /// Pond or stream; impassable for visitors but home to pukas.
    Water,
}

impl Terrain {
    /// Reports whether visitors may walk across the terrain.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Path)
    }
}

/// Unique identifier assigned to a visitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisitorId(u32);

impl VisitorId {
    /// Creates a new visitor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a placed prop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropId(u32);

impl PropId {
    /// Creates a new prop identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Mystical props the player can place in the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropKind {
    /// Fae lantern that draws visitors through a wide area.
    Lantern,
    /// Ring of mushrooms with a strong, tight pull.
    FairyRing,
    /// Wandering spirit that hunts and confuses visitors.
    Wisp,
    /// Water spirit that claims visitors who stray too close.
    Puka,
}

impl PropKind {
    /// Every prop kind in declaration order.
    pub const ALL: [PropKind; 4] = [
        PropKind::Lantern,
        PropKind::FairyRing,
        PropKind::Wisp,
        PropKind::Puka,
    ];

    /// Reports whether the prop must be placed on water rather than a path.
    #[must_use]
    pub const fn requires_water(self) -> bool {
        matches!(self, Self::Puka)
    }

    /// Reports whether placing the prop raises attraction around it.
    #[must_use]
    pub const fn emits_attraction(self) -> bool {
        matches!(self, Self::Lantern | Self::FairyRing)
    }
}

/// Behavioural state of a visitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitorState {
    /// Heading for the heart with ordinary susceptibility to attraction.
    Walking,
    /// Entranced by a lantern or fairy ring.
    Fascinated,
    /// Led astray by a wisp.
    Confused,
}

/// Reasons a prop placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested cell lies beyond the grid bounds.
    OutOfBounds,
    /// The prop needs a walkable cell but the requested cell is not.
    NotWalkable,
    /// The prop needs a water cell but the requested cell is not water.
    RequiresWater,
    /// Another prop already occupies the requested cell.
    Occupied,
    /// The player cannot afford the prop.
    InsufficientEssence,
}

/// Immutable representation of a single visitor's state used for queries.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VisitorSnapshot {
    /// Unique identifier assigned to the visitor.
    pub id: VisitorId,
    /// Grid cell currently occupied by the visitor.
    pub cell: CellCoord,
    /// Current behavioural state.
    pub state: VisitorState,
    /// Time left before a temporary state expires.
    pub state_remaining: Duration,
    /// Indicates whether the visitor accrued enough time to advance.
    pub ready_for_step: bool,
    /// Duration accumulated toward the next step.
    pub accumulated: Duration,
}

/// Read-only snapshot describing all visitors within the maze.
#[derive(Clone, Debug, Default)]
pub struct VisitorView {
    snapshots: Vec<VisitorSnapshot>,
}

impl VisitorView {
    /// Creates a new visitor view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<VisitorSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured visitor snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &VisitorSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot for a visitor.
    #[must_use]
    pub fn get(&self, id: VisitorId) -> Option<&VisitorSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of visitors captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no visitors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<VisitorSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single prop used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PropSnapshot {
    /// Identifier allocated to the prop by the world.
    pub id: PropId,
    /// Kind of prop that was placed.
    pub kind: PropKind,
    /// Cell currently occupied by the prop.
    pub cell: CellCoord,
}

/// Read-only snapshot describing all props placed within the maze.
#[derive(Clone, Debug, Default)]
pub struct PropView {
    snapshots: Vec<PropSnapshot>,
}

impl PropView {
    /// Creates a new prop view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<PropSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured prop snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &PropSnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over props of a single kind.
    pub fn of_kind(&self, kind: PropKind) -> impl Iterator<Item = &PropSnapshot> {
        self.snapshots
            .iter()
            .filter(move |snapshot| snapshot.kind == kind)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<PropSnapshot> {
        self.snapshots
    }
}
