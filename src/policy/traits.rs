//! # Policy Traits
//!
//! The backend interface and the observation handed to it.

use crate::{Direction, Grid, Position};
use serde::{Deserialize, Serialize};

/// Radius, in tiles, of the wall neighbourhood included in a [`PolicyState`].
pub const WALL_SENSE_RADIUS: i32 = 2;

/// What a guard knows when a policy backend chooses its next step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyState {
    /// The guard's tile
    pub guard: Position,
    /// Sign of the player's offset on each axis, known only while the player
    /// is within the visibility box
    pub player_direction: Option<(i32, i32)>,
    /// Blocking cells within [`WALL_SENSE_RADIUS`] of the guard, off-grid cells included
    pub nearby_walls: Vec<Position>,
}

impl PolicyState {
    /// Builds the observation for a guard on `guard` hunting a player on `player`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockdown::{Grid, PolicyState, Position};
    ///
    /// let grid = Grid::open(20, 20);
    /// let near = PolicyState::encode(Position::new(5, 5), Position::new(8, 2), &grid, 5);
    /// assert_eq!(near.player_direction, Some((1, -1)));
    ///
    /// let far = PolicyState::encode(Position::new(5, 5), Position::new(15, 5), &grid, 5);
    /// assert_eq!(far.player_direction, None);
    /// ```
    pub fn encode(guard: Position, player: Position, grid: &Grid, visibility_radius: i32) -> Self {
        let offset = player - guard;
        let player_direction = (offset.x.abs() <= visibility_radius
            && offset.y.abs() <= visibility_radius)
            .then(|| (offset.x.signum(), offset.y.signum()));

        let mut nearby_walls = Vec::new();
        for dy in -WALL_SENSE_RADIUS..=WALL_SENSE_RADIUS {
            for dx in -WALL_SENSE_RADIUS..=WALL_SENSE_RADIUS {
                let pos = Position::new(guard.x + dx, guard.y + dy);
                if pos != guard && !grid.is_passable(pos) {
                    nearby_walls.push(pos);
                }
            }
        }

        Self {
            guard,
            player_direction,
            nearby_walls,
        }
    }

    /// Whether a step in `direction` would leave the guard on an open cell.
    pub fn can_step(&self, direction: Direction) -> bool {
        !self.nearby_walls.contains(&self.guard.step(direction))
    }
}

/// A guard decision maker.
pub trait PolicyBackend: std::fmt::Debug {
    /// Chooses the next cardinal step for the observed guard.
    fn choose_action(&mut self, state: &PolicyState) -> Direction;

    /// Short name used in logs.
    fn backend_name(&self) -> &'static str;
}
