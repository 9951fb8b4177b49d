//! Dense maze grid storing walkability, terrain and attraction per cell.

use faemaze_core::{CellCoord, Direction, Terrain};
use thiserror::Error;

/// Errors raised by grid mutations and grid-derived configuration.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum GridError {
    /// The addressed cell lies outside the grid.
    #[error("cell ({column}, {row}) lies outside the {width}x{height} grid")]
    OutOfBounds {
        /// Column of the rejected cell.
        column: u32,
        /// Row of the rejected cell.
        row: u32,
        /// Width of the grid in cells.
        width: u32,
        /// Height of the grid in cells.
        height: u32,
    },
    /// Attraction deltas must be finite.
    #[error("attraction delta {0} is not finite")]
    NonFiniteDelta(f32),
    /// Tile sizes must be finite and strictly positive.
    #[error("tile size {0} must be finite and greater than zero")]
    InvalidTileSize(f32),
    /// The grid reaches coordinates where `f32` cannot resolve a quarter tile.
    #[error("tile size {tile_size} is too fine for coordinates reaching {extent}")]
    ImpreciseTransform {
        /// Requested tile size.
        tile_size: f32,
        /// Largest absolute coordinate covered by the grid.
        extent: f32,
    },
}

/// One addressable cell of the maze.
#[derive(Clone, Debug, PartialEq)]
pub struct MazeNode {
    cell: CellCoord,
    walkable: bool,
    terrain: Terrain,
    attraction: f32,
}

impl MazeNode {
    fn new(cell: CellCoord, terrain: Terrain) -> Self {
        Self {
            cell,
            walkable: terrain.is_walkable(),
            terrain,
            attraction: 0.0,
        }
    }

    /// Coordinate of the node.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Column of the node.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.cell.column()
    }

    /// Row of the node.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.cell.row()
    }

    /// Whether visitors may stand on the node.
    #[must_use]
    pub const fn walkable(&self) -> bool {
        self.walkable
    }

    /// Terrain classification of the node.
    #[must_use]
    pub const fn terrain(&self) -> Terrain {
        self.terrain
    }

    /// Accumulated attraction of the node.
    #[must_use]
    pub const fn attraction(&self) -> f32 {
        self.attraction
    }
}

/// Rectangular maze grid stored in row-major order.
///
/// The grid is the sole owner of node state. Terrain is fixed once the grid
/// is built; attraction only ever changes through [`MazeGrid::add_attraction`].
#[derive(Clone, Debug, PartialEq)]
pub struct MazeGrid {
    width: u32,
    height: u32,
    nodes: Vec<MazeNode>,
}

impl MazeGrid {
    /// Creates an open grid where every cell is a walkable path.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Terrain::Path)
    }

    /// Creates a grid where every cell carries the provided terrain.
    #[must_use]
    pub fn filled(width: u32, height: u32, terrain: Terrain) -> Self {
        let capacity = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        let mut nodes = Vec::with_capacity(capacity);
        for row in 0..height {
            for column in 0..width {
                nodes.push(MazeNode::new(CellCoord::new(column, row), terrain));
            }
        }
        Self {
            width,
            height,
            nodes,
        }
    }

    /// Width of the grid measured in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the grid measured in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the cell lies within the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// Returns the node at `(x, y)`, or `None` when the coordinates are out of range.
    #[must_use]
    pub fn get_node(&self, x: u32, y: u32) -> Option<&MazeNode> {
        self.node(CellCoord::new(x, y))
    }

    /// Returns the node stored for the cell, if it lies within the grid.
    #[must_use]
    pub fn node(&self, cell: CellCoord) -> Option<&MazeNode> {
        self.index(cell).and_then(|index| self.nodes.get(index))
    }

    /// Iterator over every node in row-major order.
    pub fn nodes(&self) -> impl Iterator<Item = &MazeNode> {
        self.nodes.iter()
    }

    /// Reports whether the cell exists and is walkable.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.node(cell).is_some_and(MazeNode::walkable)
    }

    /// Terrain stored for the cell.
    #[must_use]
    pub fn terrain(&self, cell: CellCoord) -> Option<Terrain> {
        self.node(cell).map(MazeNode::terrain)
    }

    /// Attraction accumulated on the cell.
    #[must_use]
    pub fn attraction(&self, cell: CellCoord) -> Option<f32> {
        self.node(cell).map(MazeNode::attraction)
    }

    /// Replaces the terrain of a cell while the maze is being built.
    pub fn set_terrain(&mut self, cell: CellCoord, terrain: Terrain) -> Result<(), GridError> {
        let node = self.node_mut(cell)?;
        node.terrain = terrain;
        node.walkable = terrain.is_walkable();
        Ok(())
    }

    /// Adds `delta` to the cell's attraction and returns the new total.
    ///
    /// Deltas accumulate without an upper clamp. Non-finite deltas are
    /// rejected and leave the grid untouched.
    pub fn add_attraction(&mut self, cell: CellCoord, delta: f32) -> Result<f32, GridError> {
        if !delta.is_finite() {
            return Err(GridError::NonFiniteDelta(delta));
        }
        let node = self.node_mut(cell)?;
        node.attraction += delta;
        Ok(node.attraction)
    }

    /// Walkable orthogonal neighbours of a cell in north, east, south, west order.
    pub(crate) fn walkable_neighbors(
        &self,
        cell: CellCoord,
    ) -> impl Iterator<Item = CellCoord> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| cell.step(direction))
            .filter(move |neighbor| self.is_walkable(*neighbor))
    }

    fn node_mut(&mut self, cell: CellCoord) -> Result<&mut MazeNode, GridError> {
        let error = GridError::OutOfBounds {
            column: cell.column(),
            row: cell.row(),
            width: self.width,
            height: self.height,
        };
        let index = self.index(cell).ok_or(error)?;
        self.nodes.get_mut(index).ok_or(error)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}
