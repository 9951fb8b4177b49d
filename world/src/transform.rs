//! Conversion between continuous world positions and grid cells.

use faemaze_core::CellCoord;
use glam::Vec3;

use crate::grid::{GridError, MazeGrid};

/// Maps world-space positions onto the maze grid.
///
/// The grid lies on the XY plane. `origin` is the world position of the
/// lower-left corner of cell `(0, 0)`; columns grow along +X and rows along
/// +Y. The Z component of converted positions is taken from the origin.
///
/// Cell centres are returned as `f32`, so construction rejects grids whose
/// far edge lies where `f32` spacing exceeds a quarter tile. Within that
/// limit every centre maps back to its own cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridTransform {
    origin: Vec3,
    tile_size: f32,
    columns: u32,
    rows: u32,
}

impl GridTransform {
    /// Creates a transform covering a `columns` x `rows` grid.
    pub fn new(origin: Vec3, tile_size: f32, columns: u32, rows: u32) -> Result<Self, GridError> {
        if !tile_size.is_finite() || tile_size <= 0.0 {
            return Err(GridError::InvalidTileSize(tile_size));
        }

        let tile = f64::from(tile_size);
        for (start, count) in [(origin.x, columns), (origin.y, rows)] {
            let start = f64::from(start);
            let extent = start.abs().max((start + f64::from(count) * tile).abs());
            // f32 spacing near `extent` is at most EPSILON * extent.
            if !extent.is_finite() || f64::from(f32::EPSILON) * extent > tile / 4.0 {
                return Err(GridError::ImpreciseTransform {
                    tile_size,
                    extent: extent as f32,
                });
            }
        }

        Ok(Self {
            origin,
            tile_size,
            columns,
            rows,
        })
    }

    /// Creates a transform matching the dimensions of `grid`.
    pub fn for_grid(grid: &MazeGrid, origin: Vec3, tile_size: f32) -> Result<Self, GridError> {
        Self::new(origin, tile_size, grid.width(), grid.height())
    }

    /// World position of the lower-left corner of cell `(0, 0)`.
    #[must_use]
    pub const fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Edge length of a single cell in world units.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Converts a world position into the cell that contains it.
    ///
    /// Returns `None` for positions outside the grid or with non-finite
    /// components. Callers are expected to ignore such input.
    #[must_use]
    pub fn world_to_grid(&self, position: Vec3) -> Option<CellCoord> {
        if !position.is_finite() {
            return None;
        }

        let column = self.axis_index(position.x, self.origin.x, self.columns)?;
        let row = self.axis_index(position.y, self.origin.y, self.rows)?;
        Some(CellCoord::new(column, row))
    }

    /// World-space centre of the provided cell.
    #[must_use]
    pub fn grid_to_world(&self, cell: CellCoord) -> Vec3 {
        let tile = f64::from(self.tile_size);
        let x = f64::from(self.origin.x) + (f64::from(cell.column()) + 0.5) * tile;
        let y = f64::from(self.origin.y) + (f64::from(cell.row()) + 0.5) * tile;
        Vec3::new(x as f32, y as f32, self.origin.z)
    }

    fn axis_index(&self, value: f32, origin: f32, count: u32) -> Option<u32> {
        let local = (f64::from(value) - f64::from(origin)) / f64::from(self.tile_size);
        let index = local.floor();
        if index < 0.0 || index >= f64::from(count) {
            return None;
        }
        Some(index as u32)
    }
}
