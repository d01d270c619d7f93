//! # Pathfinding Algorithms
//!
//! Exact grid searches used for navigation, placement analysis and verification.
//!
//! [`Pathfinder`] runs A* with a Manhattan heuristic and unit step cost over a
//! 4-connected grid. Callers can pass an overlay grid to ask "what if these cells
//! were blocked" without mutating the canonical maze.

use crate::{Grid, Position};
use std::collections::BTreeSet;

/// Ordered tile sequence from a source to a destination, both inclusive.
///
/// An empty path means "no route".
pub type Path = Vec<Position>;

/// A* search bound to a canonical grid.
#[derive(Debug, Clone, Copy)]
pub struct Pathfinder<'a> {
    grid: &'a Grid,
}

impl<'a> Pathfinder<'a> {
    /// Creates a pathfinder over the canonical grid.
    pub fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }

    /// The grid searched when no overlay is given.
    pub fn grid(&self) -> &'a Grid {
        self.grid
    }

    /// Finds a shortest path on the canonical grid.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockdown::{Grid, Pathfinder, Position};
    ///
    /// let grid = Grid::open(10, 10);
    /// let path = Pathfinder::new(&grid).find_path(Position::new(0, 0), Position::new(9, 9));
    /// assert_eq!(path.len(), 19);
    /// assert_eq!(path.first(), Some(&Position::new(0, 0)));
    /// assert_eq!(path.last(), Some(&Position::new(9, 9)));
    /// ```
    pub fn find_path(&self, start: Position, goal: Position) -> Path {
        self.find_path_with(None, start, goal)
    }

    /// Finds a shortest path on `overlay` when given, else on the canonical grid.
    pub fn find_path_with(&self, overlay: Option<&Grid>, start: Position, goal: Position) -> Path {
        let grid = overlay.unwrap_or(self.grid);
        if !grid.contains(start) || !grid.is_passable(goal) {
            return Vec::new();
        }

        ::pathfinding::prelude::astar(
            &start,
            |&pos| grid.open_neighbors(pos).map(|next| (next, 1u32)).collect::<Vec<_>>(),
            |&pos| pos.manhattan_distance(goal),
            |&pos| pos == goal,
        )
        .map(|(path, _cost)| path)
        .unwrap_or_default()
    }
}

/// Length in steps of the shortest route, found by breadth-first search.
///
/// Independent of the A* implementation, which makes it the reference for
/// optimality checks.
pub fn shortest_distance(grid: &Grid, start: Position, goal: Position) -> Option<usize> {
    if !grid.is_passable(goal) {
        return None;
    }
    ::pathfinding::prelude::bfs(
        &start,
        |&pos| grid.open_neighbors(pos).collect::<Vec<_>>(),
        |&pos| pos == goal,
    )
    .map(|path| path.len() - 1)
}

/// Every open cell reachable from `start` without crossing walls.
pub fn reachable_cells(grid: &Grid, start: Position) -> BTreeSet<Position> {
    if !grid.is_passable(start) {
        return BTreeSet::new();
    }
    ::pathfinding::prelude::bfs_reach(start, |&pos| {
        grid.open_neighbors(pos).collect::<Vec<_>>()
    })
    .collect()
}
