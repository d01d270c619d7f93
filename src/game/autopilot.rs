//! # Autopilot
//!
//! Scripted player used by the headless runner and by tests.
//!
//! The autopilot ignores guards entirely. At every tile centre it re-decides
//! where to go: straight for the exit when an unlocked route exists, otherwise
//! to the closest key, and through locked doors once it holds a key. It always
//! steers around obstacles.

use crate::{Grid, MoveIntent, Path, Pathfinder, Position, RoundState, WorldPoint};
use log::debug;

/// What the autopilot is currently walking toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutopilotGoal {
    Exit,
    Key(Position),
}

/// Produces one [`MoveIntent`] per tick for the player.
#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    waypoint: Option<Position>,
    goal: Option<AutopilotGoal>,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The goal chosen at the last tile centre.
    pub fn goal(&self) -> Option<AutopilotGoal> {
        self.goal
    }

    /// Next movement toward the current goal, or standing still when nothing
    /// is reachable.
    pub fn next_intent(&mut self, round: &RoundState) -> MoveIntent {
        let position = round.player().position;
        let arrived = self
            .waypoint
            .map_or(true, |tile| WorldPoint::from_tile(tile) == position);

        if arrived {
            let (goal, route) = self.choose_route(round);
            if goal != self.goal {
                debug!("Autopilot heading for {:?}", goal);
                self.goal = goal;
            }
            self.waypoint = route
                .into_iter()
                .find(|&tile| WorldPoint::from_tile(tile) != position);
        }

        let Some(waypoint) = self.waypoint else {
            return MoveIntent::none();
        };

        let speed = round.config().player_speed;
        let target = WorldPoint::from_tile(waypoint);
        let dx = (target.x - position.x).clamp(-speed, speed);
        let dy = (target.y - position.y).clamp(-speed, speed);

        // One axis at a time keeps the sprite off wall corners
        if dx != 0.0 {
            MoveIntent::new(dx, 0.0)
        } else {
            MoveIntent::new(0.0, dy)
        }
    }

    fn choose_route(&self, round: &RoundState) -> (Option<AutopilotGoal>, Path) {
        let here = round.player().tile();
        let obstacles = || round.obstacles().iter().map(|obstacle| obstacle.position);
        let unlocked = round.navigation().with_blocked(obstacles());

        let mut options = vec![unlocked];
        if round.items().player_keys > 0 {
            options.push(round.grid().with_blocked(obstacles()));
        }

        for grid in &options {
            let exit = Pathfinder::new(grid).find_path(here, round.exit());
            if !exit.is_empty() {
                return (Some(AutopilotGoal::Exit), exit);
            }
            if let Some((key, path)) = nearest_key(round, grid, here) {
                return (Some(AutopilotGoal::Key(key)), path);
            }
        }

        (None, Vec::new())
    }
}

fn nearest_key(round: &RoundState, grid: &Grid, here: Position) -> Option<(Position, Path)> {
    let pathfinder = Pathfinder::new(grid);
    round
        .items()
        .keys
        .iter()
        .map(|key| (key.position, pathfinder.find_path(here, key.position)))
        .filter(|(_, path)| !path.is_empty())
        .min_by_key(|(key, path)| (path.len(), *key))
}
