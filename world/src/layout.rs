//! Text maze layouts.
//!
//! A layout is a rectangle of glyphs, one row per line:
//!
//! | Glyph | Meaning |
//! |-------|---------|
//! | `#`   | wall |
//! | `.`   | path |
//! | `~`   | water |
//! | `S`   | entrance (path) |
//! | `H`   | heart (path) |
//!
//! Line `i` becomes row `i`. Trailing whitespace is trimmed and blank lines
//! are only allowed after the last row.

use std::str::FromStr;

use faemaze_core::{CellCoord, Terrain};
use thiserror::Error;

use crate::grid::MazeGrid;

/// Errors reported while parsing a maze layout.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The layout contained no rows.
    #[error("maze layout is empty")]
    Empty,
    /// A row's width differs from the first row.
    #[error("line {line} has {found} cells but the maze is {expected} cells wide")]
    Ragged {
        /// One-based line number of the offending row.
        line: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A glyph did not match any known cell kind.
    #[error("unknown glyph {glyph:?} at line {line}, column {column}")]
    UnknownGlyph {
        /// Glyph that was not understood.
        glyph: char,
        /// One-based line number.
        line: usize,
        /// One-based column number.
        column: usize,
    },
    /// A blank line appeared before or between rows.
    #[error("line {line} is blank but more rows follow")]
    BlankLine {
        /// One-based line number of the blank line.
        line: usize,
    },
    /// The layout has more cells along an axis than the grid can address.
    #[error("maze layout is too large")]
    TooLarge,
    /// The layout has no entrance for visitors.
    #[error("maze layout has no entrance ('S')")]
    MissingEntrance,
    /// The layout has no heart for visitors to reach.
    #[error("maze layout has no heart ('H')")]
    MissingHeart,
}

/// Parsed maze layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MazeLayout {
    width: u32,
    height: u32,
    terrain: Vec<Terrain>,
    entrances: Vec<CellCoord>,
    hearts: Vec<CellCoord>,
}

impl MazeLayout {
    /// Parses a layout from its text form.
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        let mut width: Option<usize> = None;
        let mut terrain = Vec::new();
        let mut entrances = Vec::new();
        let mut hearts = Vec::new();
        let mut row: u32 = 0;

        let mut lines: Vec<&str> = text.lines().map(str::trim_end).collect();
        while lines.last().is_some_and(|line| line.is_empty()) {
            let _ = lines.pop();
        }

        for (line_index, line) in lines.into_iter().enumerate() {
            if line.is_empty() {
                return Err(LayoutError::BlankLine {
                    line: line_index + 1,
                });
            }

            let glyph_count = line.chars().count();
            match width {
                None => width = Some(glyph_count),
                Some(expected) if expected != glyph_count => {
                    return Err(LayoutError::Ragged {
                        line: line_index + 1,
                        expected,
                        found: glyph_count,
                    });
                }
                Some(_) => {}
            }

            for (column_index, glyph) in line.chars().enumerate() {
                let column = u32::try_from(column_index).map_err(|_| LayoutError::TooLarge)?;
                let cell = CellCoord::new(column, row);
                let kind = match glyph {
                    '#' => Terrain::Wall,
                    '.' => Terrain::Path,
                    '~' => Terrain::Water,
                    'S' => {
                        entrances.push(cell);
                        Terrain::Path
                    }
                    'H' => {
                        hearts.push(cell);
                        Terrain::Path
                    }
                    other => {
                        return Err(LayoutError::UnknownGlyph {
                            glyph: other,
                            line: line_index + 1,
                            column: column_index + 1,
                        });
                    }
                };
                terrain.push(kind);
            }

            row = row.checked_add(1).ok_or(LayoutError::TooLarge)?;
        }

        let width = width.ok_or(LayoutError::Empty)?;
        if entrances.is_empty() {
            return Err(LayoutError::MissingEntrance);
        }
        if hearts.is_empty() {
            return Err(LayoutError::MissingHeart);
        }

        Ok(Self {
            width: u32::try_from(width).map_err(|_| LayoutError::TooLarge)?,
            height: row,
            terrain,
            entrances,
            hearts,
        })
    }

    /// Width of the layout in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the layout in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Cells where visitors enter the maze, in reading order.
    #[must_use]
    pub fn entrances(&self) -> &[CellCoord] {
        &self.entrances
    }

    /// Heart cells visitors try to reach, in reading order.
    #[must_use]
    pub fn hearts(&self) -> &[CellCoord] {
        &self.hearts
    }

    /// Builds a fresh grid carrying the layout's terrain.
    #[must_use]
    pub fn to_grid(&self) -> MazeGrid {
        let mut grid = MazeGrid::new(self.width, self.height);
        let cells = (0..self.height)
            .flat_map(|row| (0..self.width).map(move |column| CellCoord::new(column, row)));
        for (cell, terrain) in cells.zip(self.terrain.iter().copied()) {
            if terrain != Terrain::Path {
                // Cells come from the layout's own dimensions.
                let _ = grid.set_terrain(cell, terrain);
            }
        }
        grid
    }
}

impl FromStr for MazeLayout {
    type Err = LayoutError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLADE: &str = "\
#S###
#..~#
#.#.#
#..H#
#####
";

    #[test]
    fn parses_terrain_and_markers() {
        let layout = MazeLayout::parse(GLADE).expect("valid layout");

        assert_eq!((layout.width(), layout.height()), (5, 5));
        assert_eq!(layout.entrances(), &[CellCoord::new(1, 0)]);
        assert_eq!(layout.hearts(), &[CellCoord::new(3, 3)]);

        let grid = layout.to_grid();
        assert_eq!(grid.terrain(CellCoord::new(0, 0)), Some(Terrain::Wall));
        assert_eq!(grid.terrain(CellCoord::new(3, 1)), Some(Terrain::Water));
        assert!(grid.is_walkable(CellCoord::new(1, 0)));
        assert!(grid.is_walkable(CellCoord::new(3, 3)));
    }

    #[test]
    fn trims_trailing_whitespace_and_blank_lines() {
        let layout = MazeLayout::parse("S.H.  \r\n....\n\n  \n").expect("valid layout");
        assert_eq!((layout.width(), layout.height()), (4, 2));
    }

    #[test]
    fn line_numbers_are_row_numbers() {
        let layout = MazeLayout::parse("#.#\n#S#\n#H#\n").expect("valid layout");
        assert_eq!(layout.entrances(), &[CellCoord::new(1, 1)]);
        assert_eq!(layout.hearts(), &[CellCoord::new(1, 2)]);
    }

    #[test]
    fn rejects_blank_lines_before_the_last_row() {
        assert_eq!(
            MazeLayout::parse("S.H.\n\n....\n"),
            Err(LayoutError::BlankLine { line: 2 })
        );
        assert_eq!(
            MazeLayout::parse("\nS.H.\n"),
            Err(LayoutError::BlankLine { line: 1 })
        );
    }

    #[test]
    fn reports_ragged_rows() {
        assert_eq!(
            MazeLayout::parse("S.H\n..\n"),
            Err(LayoutError::Ragged {
                line: 2,
                expected: 3,
                found: 2,
            })
        );
    }

    #[test]
    fn reports_unknown_glyphs_with_position() {
        assert_eq!(
            MazeLayout::parse("S.H\n.x.\n"),
            Err(LayoutError::UnknownGlyph {
                glyph: 'x',
                line: 2,
                column: 2,
            })
        );
    }

    #[test]
    fn requires_entrance_and_heart() {
        assert_eq!(MazeLayout::parse(""), Err(LayoutError::Empty));
        assert_eq!(MazeLayout::parse("..H"), Err(LayoutError::MissingEntrance));
        assert_eq!(MazeLayout::parse("S.."), Err(LayoutError::MissingHeart));
    }
}
