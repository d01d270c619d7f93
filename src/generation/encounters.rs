//! # Encounter Placement
//!
//! Spawn points for guards and furniture obstacles.
//!
//! Guards start outside the player's home region, preferably a fair distance
//! from the start, on cells they can actually walk to the player from.
//! Obstacles only go where they cannot cut the player off from the exit or
//! from any key, either overall or before the first door is opened.

use crate::{reachable_cells, GenerationConfig, Grid, PlayerRegion, Position};
use log::warn;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Chosen spawn cells for one round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPlan {
    pub guards: Vec<Position>,
    pub obstacles: Vec<Position>,
}

/// Places guards and obstacles on the free cells left by the placement planner.
#[derive(Debug, Clone)]
pub struct SpawnPlanner {
    /// Preferred minimum Manhattan distance between a guard spawn and the start
    pub min_guard_distance: u32,
    /// Obstacles to place
    pub obstacle_count: usize,
}

impl SpawnPlanner {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            min_guard_distance: config.min_guard_spawn_distance,
            obstacle_count: config.obstacle_count,
        }
    }

    /// Picks `guard_count` guard spawns and the configured obstacles.
    ///
    /// `must_reach` lists cells (exit, keys) that obstacles may never wall off
    /// from `start`. Cells reachable with the `gates` (locked doors) closed must
    /// stay reachable that way too.
    #[allow(clippy::too_many_arguments)]
    pub fn plan<R: Rng + ?Sized>(
        &self,
        grid: &Grid,
        start: Position,
        region: &PlayerRegion,
        free_cells: &[Position],
        must_reach: &[Position],
        gates: &[Position],
        guard_count: usize,
        rng: &mut R,
    ) -> SpawnPlan {
        let reachable = reachable_cells(grid, start);
        let eligible: Vec<Position> = free_cells
            .iter()
            .copied()
            .filter(|&pos| !region.contains(pos) && reachable.contains(&pos))
            .collect();

        let guards = self.pick_guards(start, &eligible, guard_count, rng);
        if guards.len() < guard_count {
            warn!(
                "Only {} of {} guards could be spawned",
                guards.len(),
                guard_count
            );
        }

        let taken: BTreeSet<Position> = guards.iter().copied().collect();
        let remaining: Vec<Position> = eligible
            .into_iter()
            .filter(|pos| !taken.contains(pos))
            .collect();
        let obstacles = self.pick_obstacles(grid, start, &remaining, must_reach, gates, rng);

        SpawnPlan { guards, obstacles }
    }

    fn pick_guards<R: Rng + ?Sized>(
        &self,
        start: Position,
        eligible: &[Position],
        count: usize,
        rng: &mut R,
    ) -> Vec<Position> {
        let (far, near): (Vec<Position>, Vec<Position>) = eligible
            .iter()
            .partition(|pos| pos.manhattan_distance(start) >= self.min_guard_distance);

        let mut guards: Vec<Position> = far.choose_multiple(rng, count).copied().collect();
        if guards.len() < count {
            let missing = count - guards.len();
            guards.extend(near.choose_multiple(rng, missing).copied());
        }
        guards
    }

    fn pick_obstacles<R: Rng + ?Sized>(
        &self,
        grid: &Grid,
        start: Position,
        candidates: &[Position],
        must_reach: &[Position],
        gates: &[Position],
        rng: &mut R,
    ) -> Vec<Position> {
        let mut shuffled = candidates.to_vec();
        shuffled.shuffle(rng);

        let gated = reachable_cells(&grid.with_blocked(gates.iter().copied()), start);
        let early: Vec<Position> = must_reach
            .iter()
            .copied()
            .filter(|cell| gated.contains(cell))
            .collect();

        let mut obstacles: Vec<Position> = Vec::with_capacity(self.obstacle_count);
        for pos in shuffled {
            if obstacles.len() >= self.obstacle_count {
                break;
            }
            let blocked = || obstacles.iter().copied().chain([pos]);
            let reachable = reachable_cells(&grid.with_blocked(blocked()), start);
            let reachable_gated =
                reachable_cells(&grid.with_blocked(blocked().chain(gates.iter().copied())), start);
            if must_reach.iter().all(|cell| reachable.contains(cell))
                && early.iter().all(|cell| reachable_gated.contains(cell))
            {
                obstacles.push(pos);
            }
        }
        obstacles
    }
}

impl Default for SpawnPlanner {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}
