//! # Heuristic Policy
//!
//! Greedy backend that steps toward the player whenever it can see them.

use crate::{Direction, PolicyBackend, PolicyState};

/// Picks the first open direction, in search order, that shortens the
/// Manhattan distance to the player. Falls back to any open direction, and
/// to standing still against the first direction when boxed in.
#[derive(Debug, Clone, Default)]
pub struct HeuristicPolicy;

impl HeuristicPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl PolicyBackend for HeuristicPolicy {
    fn choose_action(&mut self, state: &PolicyState) -> Direction {
        let open: Vec<Direction> = Direction::search_order()
            .into_iter()
            .filter(|&direction| state.can_step(direction))
            .collect();

        if let Some((sx, sy)) = state.player_direction {
            let closer = open.iter().copied().find(|direction| {
                let delta = direction.to_delta();
                (delta.x != 0 && delta.x == sx) || (delta.y != 0 && delta.y == sy)
            });
            if let Some(direction) = closer {
                return direction;
            }
        }

        open.first()
            .copied()
            .unwrap_or(Direction::search_order()[0])
    }

    fn backend_name(&self) -> &'static str {
        "heuristic"
    }
}
