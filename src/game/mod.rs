//! # Game Module
//!
//! Core simulation state: the tile grid, doors and keys, guards and their pursuit
//! logic, encounter tracking, and the round state that ties them together.
//!
//! This module contains the fundamental building blocks of a Lockdown round:
//! - Grid representation and coordinates
//! - Door/key bookkeeping and player inventory
//! - Guard agents, the imperfect pursuit planner and the patrol state machine
//! - Capture/escape detection and round metrics

pub mod autopilot;
pub mod encounter;
pub mod grid;
pub mod guard;
pub mod items;
pub mod patrol;
pub mod pursuit;
pub mod state;

pub use autopilot::*;
pub use encounter::*;
pub use grid::*;
pub use guard::*;
pub use items::*;
pub use patrol::*;
pub use pursuit::*;
pub use state::*;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents an integer tile coordinate in the maze.
///
/// `x` is the column and `y` the row, both 0-indexed from the top-left corner.
///
/// # Examples
///
/// ```
/// use lockdown::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
///
/// let adjacent = pos.cardinal_adjacent_positions();
/// assert_eq!(adjacent.len(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Calculates the Manhattan distance to another position.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockdown::Position;
    ///
    /// let pos1 = Position::new(0, 0);
    /// let pos2 = Position::new(3, 4);
    /// assert_eq!(pos1.manhattan_distance(pos2), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Returns the 4 cardinal adjacent positions in search order.
    pub fn cardinal_adjacent_positions(self) -> Vec<Position> {
        Direction::search_order()
            .iter()
            .map(|direction| self + direction.to_delta())
            .collect()
    }

    /// Steps one tile in the given direction.
    pub fn step(self, direction: Direction) -> Position {
        self + direction.to_delta()
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// Cardinal directions for movement. There is no diagonal movement on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Converts a direction to a position delta. North is toward row 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockdown::{Direction, Position};
    ///
    /// let delta = Direction::North.to_delta();
    /// assert_eq!(delta, Position::new(0, -1));
    /// ```
    pub fn to_delta(self) -> Position {
        match self {
            Direction::North => Position::new(0, -1),
            Direction::South => Position::new(0, 1),
            Direction::East => Position::new(1, 0),
            Direction::West => Position::new(-1, 0),
        }
    }

    /// Converts a unit position delta to a direction.
    ///
    /// Returns None if the delta is not a single cardinal step.
    pub fn from_delta(delta: Position) -> Option<Direction> {
        match (delta.x, delta.y) {
            (0, -1) => Some(Direction::North),
            (0, 1) => Some(Direction::South),
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            _ => None,
        }
    }

    /// Canonical neighbour expansion order used by every search on the grid.
    pub fn search_order() -> [Direction; 4] {
        [
            Direction::South,
            Direction::North,
            Direction::East,
            Direction::West,
        ]
    }
}

/// Continuous position in tile units, used for smooth sub-tile motion.
///
/// Integer values sit exactly on a tile; `(2.5, 3.0)` is halfway between
/// tiles `(2, 3)` and `(3, 3)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f32,
    pub y: f32,
}

impl WorldPoint {
    /// Creates a new point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Places a point exactly on a tile.
    pub fn from_tile(tile: Position) -> Self {
        Self::new(tile.x as f32, tile.y as f32)
    }

    /// Tile obtained by truncating the sub-tile progress.
    pub fn tile(self) -> Position {
        Position::new(self.x.floor() as i32, self.y.floor() as i32)
    }

    /// Tile containing the sprite centre.
    pub fn nearest_tile(self) -> Position {
        Position::new((self.x + 0.5).floor() as i32, (self.y + 0.5).floor() as i32)
    }

    /// Every tile this point overlaps while travelling between tiles.
    pub fn overlapped_tiles(self) -> Vec<Position> {
        let xs = [self.x.floor() as i32, self.x.ceil() as i32];
        let ys = [self.y.floor() as i32, self.y.ceil() as i32];
        let mut tiles = Vec::with_capacity(4);
        for &y in &ys {
            for &x in &xs {
                let tile = Position::new(x, y);
                if !tiles.contains(&tile) {
                    tiles.push(tile);
                }
            }
        }
        tiles
    }
}

/// Unique identifier for guards.
pub type EntityId = Uuid;

/// Creates a new entity ID from the simulation RNG so seeded rounds stay reproducible.
pub fn new_entity_id<R: Rng + ?Sized>(rng: &mut R) -> EntityId {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid()
}
