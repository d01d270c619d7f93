//! # Maze Grid
//!
//! Rectangular occupancy grid of wall and open cells.
//!
//! The grid is a closed, internally managed structure: out-of-bounds cell
//! queries are programmer errors and panic. Searches that probe past the edge
//! use [`Grid::is_passable`], which treats the outside as solid.

use crate::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Passability state of a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Wall,
    Open,
}

impl Cell {
    /// Whether a walker may occupy this cell.
    pub fn is_passable(self) -> bool {
        matches!(self, Cell::Open)
    }
}

/// Row-major grid of cells, `rows` tall and `cols` wide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid with every cell set to `fill`.
    pub fn new(rows: usize, cols: usize, fill: Cell) -> Self {
        Self {
            rows,
            cols,
            cells: vec![fill; rows * cols],
        }
    }

    /// Creates a grid with no walls at all.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockdown::{Grid, Position};
    ///
    /// let grid = Grid::open(10, 10);
    /// assert!(grid.is_passable(Position::new(9, 9)));
    /// assert!(!grid.is_passable(Position::new(10, 9)));
    /// ```
    pub fn open(rows: usize, cols: usize) -> Self {
        Self::new(rows, cols, Cell::Open)
    }

    /// Builds a grid from text rows, `#` for walls and anything else open.
    pub fn from_ascii(lines: &[&str]) -> Self {
        let rows = lines.len();
        let cols = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);
        let mut grid = Self::new(rows, cols, Cell::Wall);
        for (y, line) in lines.iter().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                if ch != '#' {
                    grid.set(Position::new(x as i32, y as i32), Cell::Open);
                }
            }
        }
        grid
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Checks whether a position lies inside the grid.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.cols && (pos.y as usize) < self.rows
    }

    /// Checks whether a position lies strictly inside the outer wall ring.
    pub fn is_interior(&self, pos: Position) -> bool {
        pos.x >= 1
            && pos.y >= 1
            && (pos.x as usize) < self.cols.saturating_sub(1)
            && (pos.y as usize) < self.rows.saturating_sub(1)
    }

    fn index(&self, pos: Position) -> usize {
        assert!(
            self.contains(pos),
            "position {:?} outside {}x{} grid",
            pos,
            self.rows,
            self.cols
        );
        pos.y as usize * self.cols + pos.x as usize
    }

    /// Gets the cell at a position. Panics when out of bounds.
    pub fn cell(&self, pos: Position) -> Cell {
        self.cells[self.index(pos)]
    }

    /// Sets the cell at a position. Panics when out of bounds.
    pub fn set(&mut self, pos: Position, cell: Cell) {
        let index = self.index(pos);
        self.cells[index] = cell;
    }

    /// In bounds and open.
    pub fn is_passable(&self, pos: Position) -> bool {
        self.contains(pos) && self.cell(pos).is_passable()
    }

    /// Clamps a position into the grid bounds.
    pub fn clamp(&self, pos: Position) -> Position {
        Position::new(
            pos.x.clamp(0, self.cols as i32 - 1),
            pos.y.clamp(0, self.rows as i32 - 1),
        )
    }

    /// Passable cardinal neighbours of a position, in search order.
    pub fn open_neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        pos.cardinal_adjacent_positions()
            .into_iter()
            .filter(move |&next| self.is_passable(next))
    }

    /// All positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |y| {
            (0..self.cols).map(move |x| Position::new(x as i32, y as i32))
        })
    }

    /// All open positions in row-major order.
    pub fn open_cells(&self) -> Vec<Position> {
        self.positions().filter(|&pos| self.cell(pos).is_passable()).collect()
    }

    /// Number of open cells.
    pub fn open_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_passable()).count()
    }

    /// Copy of this grid with the given cells turned into walls.
    ///
    /// Used to build "what if these were blocked" overlays for the pathfinder
    /// without touching the canonical grid.
    pub fn with_blocked<I>(&self, blocked: I) -> Grid
    where
        I: IntoIterator<Item = Position>,
    {
        let mut overlay = self.clone();
        for pos in blocked {
            overlay.set(pos, Cell::Wall);
        }
        overlay
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.rows {
            for x in 0..self.cols {
                let ch = match self.cell(Position::new(x as i32, y as i32)) {
                    Cell::Wall => '#',
                    Cell::Open => '.',
                };
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(4, 6, Cell::Wall);
        assert_eq!(grid.rows(), 4);
        assert_eq!(grid.cols(), 6);
        assert_eq!(grid.open_count(), 0);
        assert_eq!(Grid::open(4, 6).open_count(), 24);
    }

    #[test]
    fn test_grid_bounds() {
        let grid = Grid::open(3, 5);
        assert!(grid.contains(Position::new(4, 2)));
        assert!(!grid.contains(Position::new(5, 2)));
        assert!(!grid.contains(Position::new(-1, 0)));
        assert!(grid.is_interior(Position::new(1, 1)));
        assert!(grid.is_interior(Position::new(3, 1)));
        assert!(!grid.is_interior(Position::new(4, 1)));
        assert!(!grid.is_interior(Position::new(1, 2)));
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_out_of_bounds_query_panics() {
        let grid = Grid::open(3, 3);
        grid.cell(Position::new(3, 0));
    }

    #[test]
    fn test_from_ascii() {
        let grid = Grid::from_ascii(&["###", "#.#", "###"]);
        assert_eq!(grid.open_cells(), vec![Position::new(1, 1)]);
        assert_eq!(grid.to_string(), "###\n#.#\n###\n");
    }

    #[test]
    fn test_open_neighbors_skip_walls() {
        let grid = Grid::from_ascii(&["#.#", "...", "###"]);
        let neighbors: Vec<_> = grid.open_neighbors(Position::new(1, 1)).collect();
        assert_eq!(
            neighbors,
            vec![Position::new(1, 0), Position::new(2, 1), Position::new(0, 1)]
        );
    }

    #[test]
    fn test_with_blocked_leaves_source_untouched() {
        let grid = Grid::open(3, 3);
        let overlay = grid.with_blocked([Position::new(1, 1)]);
        assert_eq!(overlay.cell(Position::new(1, 1)), Cell::Wall);
        assert_eq!(grid.cell(Position::new(1, 1)), Cell::Open);
    }

    #[test]
    fn test_clamp() {
        let grid = Grid::open(5, 5);
        assert_eq!(grid.clamp(Position::new(-3, 7)), Position::new(0, 4));
    }
}
