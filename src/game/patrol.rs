//! # Patrol Controller
//!
//! Per-tick guard movement: request a plan when idle, then walk it in small
//! sub-tile increments.
//!
//! Guards move along one waypoint at a time at a fixed speed per axis. A guard
//! that would overlap a blocked tile drops its whole plan and asks for a new
//! one on the next tick rather than trying to repair the old route.

use crate::{axis_step, GuardAgent, Grid, Path, PatrolState, Pathfinder, WorldPoint};
use log::trace;

/// What a guard did during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatrolEvent {
    /// No usable plan, the guard held position
    Idle,
    /// Moved toward the head waypoint
    Moved,
    /// Snapped onto the head waypoint and popped it
    Reached,
    /// The next step was blocked and the plan was discarded
    Blocked,
}

/// Moves guards along their plans.
#[derive(Debug, Clone)]
pub struct PatrolController {
    /// Tiles moved per tick on each axis
    pub guard_speed: f32,
}

impl PatrolController {
    pub fn new(guard_speed: f32) -> Self {
        Self { guard_speed }
    }

    /// Advances `guard` by one tick on the `navigation` grid, where walls and
    /// locked doors block.
    ///
    /// `plan` is only called when the guard has no path; it receives the guard
    /// and returns a route from the guard's tile toward the player.
    pub fn advance<F>(&self, guard: &mut GuardAgent, navigation: &Grid, plan: F) -> PatrolEvent
    where
        F: FnOnce(&GuardAgent) -> Path,
    {
        if guard.state == PatrolState::NeedsPath {
            let path = densify(plan(guard), navigation);
            if path.is_empty() {
                return PatrolEvent::Idle;
            }
            trace!("Guard {} adopted a {}-step plan", guard.id(), path.len());
            guard.current_path = path.into();
            guard.state = PatrolState::Following;
        }

        self.follow(guard, navigation)
    }

    fn follow(&self, guard: &mut GuardAgent, navigation: &Grid) -> PatrolEvent {
        let Some(&waypoint) = guard.current_path.front() else {
            guard.state = PatrolState::NeedsPath;
            return PatrolEvent::Idle;
        };

        let speed = self.guard_speed;
        let target = WorldPoint::from_tile(waypoint);
        let dx = axis_step(guard.position.x, target.x, speed);
        let dy = axis_step(guard.position.y, target.y, speed);
        if dx < 0.0 {
            guard.facing_left = true;
        } else if dx > 0.0 {
            guard.facing_left = false;
        }

        let next = WorldPoint::new(guard.position.x + dx, guard.position.y + dy);
        if (next.x - target.x).abs() <= speed && (next.y - target.y).abs() <= speed {
            guard.position = target;
            guard.current_path.pop_front();
            if guard.current_path.is_empty() {
                guard.state = PatrolState::NeedsPath;
            }
            return PatrolEvent::Reached;
        }

        if next
            .overlapped_tiles()
            .into_iter()
            .any(|tile| !navigation.is_passable(tile))
        {
            trace!("Guard {} blocked at {:?}, discarding plan", guard.id(), next);
            guard.discard_path();
            return PatrolEvent::Blocked;
        }

        guard.position = next;
        PatrolEvent::Moved
    }
}

impl Default for PatrolController {
    fn default() -> Self {
        Self::new(crate::config::GUARD_SPEED)
    }
}

/// Re-expands jumps between non-adjacent waypoints into unit moves.
///
/// Stops at the first gap that has no route on `navigation`.
pub fn densify(path: Path, navigation: &Grid) -> Path {
    let mut dense: Path = Vec::with_capacity(path.len());
    let pathfinder = Pathfinder::new(navigation);

    for waypoint in path {
        let Some(&last) = dense.last() else {
            dense.push(waypoint);
            continue;
        };
        if last.manhattan_distance(waypoint) <= 1 {
            dense.push(waypoint);
            continue;
        }
        let bridge = pathfinder.find_path(last, waypoint);
        if bridge.is_empty() {
            break;
        }
        dense.extend(bridge.into_iter().skip(1));
    }

    dense
}
