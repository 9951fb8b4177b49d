//! Bounded breadth-first reachability used for influence and detection areas.

use std::collections::{BTreeSet, VecDeque};

use faemaze_core::CellCoord;

use crate::grid::MazeGrid;

impl MazeGrid {
    /// Collects the walkable cells reachable from `source`.
    ///
    /// Exploration walks orthogonal neighbours breadth-first. A cell is
    /// accepted when its walking distance from `source` is at most `radius`,
    /// and the search stops once `max_steps` cells have been accepted. The
    /// source itself counts as the first step. A non-walkable source or a
    /// zero step budget yields an empty set.
    ///
    /// Breadth-first acceptance order does not depend on either bound, so
    /// raising `radius` or `max_steps` never removes cells from the result.
    #[must_use]
    pub fn flood_fill_reachable(
        &self,
        source: CellCoord,
        radius: u32,
        max_steps: u32,
    ) -> BTreeSet<CellCoord> {
        let mut reachable = BTreeSet::new();
        if max_steps == 0 || !self.is_walkable(source) {
            return reachable;
        }

        let budget = usize::try_from(max_steps).unwrap_or(usize::MAX);
        let mut queue = VecDeque::new();
        let _ = reachable.insert(source);
        queue.push_back((source, 0_u32));

        while let Some((cell, distance)) = queue.pop_front() {
            if distance >= radius {
                continue;
            }

            for neighbor in self.walkable_neighbors(cell) {
                if reachable.len() >= budget {
                    return reachable;
                }
                if reachable.insert(neighbor) {
                    queue.push_back((neighbor, distance + 1));
                }
            }
        }

        reachable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faemaze_core::Terrain;

    #[test]
    fn open_grid_fills_a_manhattan_diamond() {
        let grid = MazeGrid::new(9, 9);
        let centre = CellCoord::new(4, 4);

        let reachable = grid.flood_fill_reachable(centre, 2, u32::MAX);

        assert_eq!(reachable.len(), 13);
        assert!(reachable
            .iter()
            .all(|cell| cell.manhattan_distance(centre) <= 2));
    }

    #[test]
    fn walls_lengthen_the_walk() {
        let mut grid = MazeGrid::new(3, 3);
        for column in 0..2 {
            grid.set_terrain(CellCoord::new(column, 1), Terrain::Wall)
                .expect("cell in range");
        }

        let reachable = grid.flood_fill_reachable(CellCoord::new(0, 0), 3, u32::MAX);

        // (0, 2) is two cells away as the crow flies but six steps on foot.
        assert!(!reachable.contains(&CellCoord::new(0, 2)));
        assert!(reachable.contains(&CellCoord::new(2, 1)));
        assert_eq!(reachable.len(), 4);
    }

    #[test]
    fn step_budget_truncates_exploration() {
        let grid = MazeGrid::new(5, 5);
        let reachable = grid.flood_fill_reachable(CellCoord::new(2, 2), 10, 3);

        assert_eq!(reachable.len(), 3);
        assert!(reachable.contains(&CellCoord::new(2, 2)));
        assert!(reachable.contains(&CellCoord::new(2, 1)));
        assert!(reachable.contains(&CellCoord::new(3, 2)));
    }

    #[test]
    fn blocked_or_missing_source_is_empty() {
        let mut grid = MazeGrid::new(2, 2);
        grid.set_terrain(CellCoord::new(0, 0), Terrain::Water)
            .expect("cell in range");

        assert!(grid
            .flood_fill_reachable(CellCoord::new(0, 0), 4, 16)
            .is_empty());
        assert!(grid
            .flood_fill_reachable(CellCoord::new(7, 7), 4, 16)
            .is_empty());
        assert!(grid
            .flood_fill_reachable(CellCoord::new(1, 1), 4, 0)
            .is_empty());
    }

    #[test]
    fn zero_radius_keeps_only_the_source() {
        let grid = MazeGrid::new(3, 3);
        let source = CellCoord::new(1, 1);
        let reachable = grid.flood_fill_reachable(source, 0, 9);
        assert_eq!(reachable.into_iter().collect::<Vec<_>>(), vec![source]);
    }
}
