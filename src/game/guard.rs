//! # Guard Agents
//!
//! Guard records and the fixed behavioral traits that make each guard
//! pursue the player a little differently.

use crate::{new_entity_id, EntityId, Position, WorldPoint};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Per-guard randomness parameters, rolled once at spawn.
///
/// `personality` is the chance a guard shuffles its neighbour order while
/// searching; `error_rate` is the chance each planning step is perturbed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuardTraits {
    personality: f64,
    error_rate: f64,
}

impl GuardTraits {
    /// Creates traits with explicit values.
    pub fn new(personality: f64, error_rate: f64) -> Self {
        Self {
            personality,
            error_rate,
        }
    }

    /// Traits that make a guard plan exact shortest paths.
    pub fn precise() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Draws `personality` from [0, 1) and `error_rate` from [0.1, 0.3).
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng.gen::<f64>(), rng.gen_range(0.1..0.3))
    }

    pub fn personality(&self) -> f64 {
        self.personality
    }

    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }
}

/// Whether a guard is waiting for a plan or walking one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatrolState {
    NeedsPath,
    Following,
}

/// A pursuing guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardAgent {
    id: EntityId,
    traits: GuardTraits,
    /// Current location with sub-tile progress
    pub position: WorldPoint,
    /// Remaining waypoints, head first
    pub current_path: VecDeque<Position>,
    /// True while the last horizontal move was toward -x
    pub facing_left: bool,
    pub state: PatrolState,
}

impl GuardAgent {
    /// Creates a guard on `tile` with the given traits.
    pub fn new(id: EntityId, tile: Position, traits: GuardTraits) -> Self {
        Self {
            id,
            traits,
            position: WorldPoint::from_tile(tile),
            current_path: VecDeque::new(),
            facing_left: false,
            state: PatrolState::NeedsPath,
        }
    }

    /// Spawns a guard on `tile` with id and traits drawn from `rng`.
    pub fn spawn<R: Rng + ?Sized>(tile: Position, rng: &mut R) -> Self {
        let id = new_entity_id(rng);
        let traits = GuardTraits::roll(rng);
        Self::new(id, tile, traits)
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn traits(&self) -> GuardTraits {
        self.traits
    }

    /// Tile under the guard with sub-tile progress truncated.
    pub fn tile(&self) -> Position {
        self.position.tile()
    }

    /// Drops the current plan so a fresh one is requested next tick.
    pub fn discard_path(&mut self) {
        self.current_path.clear();
        self.state = PatrolState::NeedsPath;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_rolled_traits_in_range() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..200 {
            let traits = GuardTraits::roll(&mut rng);
            assert!((0.0..1.0).contains(&traits.personality()));
            assert!((0.1..0.3).contains(&traits.error_rate()));
        }
    }

    #[test]
    fn test_spawned_guard_starts_idle_on_tile() {
        let mut rng = StdRng::seed_from_u64(3);
        let guard = GuardAgent::spawn(Position::new(4, 7), &mut rng);
        assert_eq!(guard.tile(), Position::new(4, 7));
        assert_eq!(guard.state, PatrolState::NeedsPath);
        assert!(guard.current_path.is_empty());
        assert!(!guard.facing_left);
    }

    #[test]
    fn test_discard_path() {
        let mut guard = GuardAgent::new(
            EntityId::nil(),
            Position::new(1, 1),
            GuardTraits::precise(),
        );
        guard.current_path.push_back(Position::new(1, 2));
        guard.state = PatrolState::Following;
        guard.discard_path();
        assert!(guard.current_path.is_empty());
        assert_eq!(guard.state, PatrolState::NeedsPath);
    }
}
