//! # Pursuit Planning
//!
//! The guards' deliberately imperfect route planner.
//!
//! Each call runs A* toward the player, degraded according to the guard's
//! [`GuardTraits`]: the target may be nudged a few tiles, neighbour order may
//! be shuffled, step costs may wobble and the finished path may skip every
//! other waypoint. With both traits at zero the result is an exact shortest
//! path. When the target cannot be reached the planner retargets to an open
//! cell near it instead.

use crate::{chance, maybe_jitter, Grid, GuardTraits, Path, Position};
use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// Largest per-axis offset applied when a guard misjudges the target.
const TARGET_JITTER: i32 = 3;

/// Node for the noisy A* search.
///
/// Equal f-scores pop newest first, so the order neighbours are pushed in
/// decides between equal-cost routes.
#[derive(Debug, Clone, Copy)]
struct SearchNode {
    position: Position,
    g_score: f64,
    f_score: f64,
    order: u64,
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchNode {}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior in BinaryHeap
        other
            .f_score
            .partial_cmp(&self.f_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.order.cmp(&other.order))
    }
}

/// Plans guard routes toward the player.
#[derive(Debug, Clone)]
pub struct PursuitPlanner {
    /// How many times a failed plan may retarget to a nearby reachable cell
    pub max_fallback_depth: usize,
}

impl PursuitPlanner {
    pub fn new(max_fallback_depth: usize) -> Self {
        Self { max_fallback_depth }
    }

    /// Plans a path from `start` toward `target` on `grid`.
    ///
    /// Returns an empty path when `start == target` or when neither the target
    /// nor any fallback cell can be reached.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockdown::{Grid, GuardTraits, Position, PursuitPlanner};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let grid = Grid::open(10, 10);
    /// let mut rng = StdRng::seed_from_u64(1);
    /// let path = PursuitPlanner::default().plan_path(
    ///     &GuardTraits::precise(),
    ///     Position::new(0, 0),
    ///     Position::new(9, 9),
    ///     &grid,
    ///     &mut rng,
    /// );
    /// assert_eq!(path.len(), 19);
    /// ```
    pub fn plan_path<R: Rng + ?Sized>(
        &self,
        traits: &GuardTraits,
        start: Position,
        target: Position,
        grid: &Grid,
        rng: &mut R,
    ) -> Path {
        self.plan_with_depth(traits, start, target, grid, rng, 0)
    }

    fn plan_with_depth<R: Rng + ?Sized>(
        &self,
        traits: &GuardTraits,
        start: Position,
        target: Position,
        grid: &Grid,
        rng: &mut R,
        depth: usize,
    ) -> Path {
        if start == target {
            return Vec::new();
        }

        let goal = self.misjudge_target(traits, target, grid, rng);
        let path = self.noisy_search(traits, start, goal, grid, rng);
        if !path.is_empty() {
            return self.decimate(traits, path, rng);
        }

        if depth >= self.max_fallback_depth {
            trace!("No route from {:?} toward {:?}, giving up", start, target);
            return Vec::new();
        }

        match self.nearest_open(traits, target, grid, rng) {
            Some(fallback) if fallback != start => {
                trace!("Retargeting from {:?} to {:?}", target, fallback);
                self.plan_with_depth(traits, start, fallback, grid, rng, depth + 1)
            }
            _ => Vec::new(),
        }
    }

    fn misjudge_target<R: Rng + ?Sized>(
        &self,
        traits: &GuardTraits,
        target: Position,
        grid: &Grid,
        rng: &mut R,
    ) -> Position {
        if !chance(rng, traits.error_rate()) {
            return target;
        }
        let offset = Position::new(
            rng.gen_range(-TARGET_JITTER..=TARGET_JITTER),
            rng.gen_range(-TARGET_JITTER..=TARGET_JITTER),
        );
        grid.clamp(target + offset)
    }

    /// A* whose neighbour order and step costs are perturbed per the traits.
    fn noisy_search<R: Rng + ?Sized>(
        &self,
        traits: &GuardTraits,
        start: Position,
        goal: Position,
        grid: &Grid,
        rng: &mut R,
    ) -> Path {
        if !grid.contains(start) || !grid.is_passable(goal) {
            return Vec::new();
        }

        let mut open_set = BinaryHeap::new();
        let mut came_from: HashMap<Position, Position> = HashMap::new();
        let mut g_score: HashMap<Position, f64> = HashMap::new();

        let mut pushed: u64 = 0;
        g_score.insert(start, 0.0);
        open_set.push(SearchNode {
            position: start,
            g_score: 0.0,
            f_score: start.manhattan_distance(goal) as f64,
            order: pushed,
        });

        while let Some(node) = open_set.pop() {
            let current = node.position;
            if node.g_score > g_score.get(&current).copied().unwrap_or(f64::INFINITY) {
                continue;
            }

            if current == goal {
                let mut path = vec![current];
                let mut cursor = current;
                while let Some(&prev) = came_from.get(&cursor) {
                    path.push(prev);
                    cursor = prev;
                }
                path.reverse();
                return path;
            }

            let mut neighbors: Vec<Position> = grid.open_neighbors(current).collect();
            if chance(rng, traits.personality()) {
                neighbors.shuffle(rng);
            }

            for neighbor in neighbors {
                let step_cost = maybe_jitter(rng, traits.error_rate(), 1.0, 0.8, 1.2);
                let tentative = node.g_score + step_cost;
                if tentative < g_score.get(&neighbor).copied().unwrap_or(f64::INFINITY) {
                    came_from.insert(neighbor, current);
                    g_score.insert(neighbor, tentative);
                    pushed += 1;
                    open_set.push(SearchNode {
                        position: neighbor,
                        g_score: tentative,
                        f_score: tentative + neighbor.manhattan_distance(goal) as f64,
                        order: pushed,
                    });
                }
            }
        }

        Vec::new()
    }

    fn decimate<R: Rng + ?Sized>(&self, traits: &GuardTraits, path: Path, rng: &mut R) -> Path {
        if path.len() > 3 && chance(rng, traits.error_rate()) {
            path.into_iter().step_by(2).collect()
        } else {
            path
        }
    }

    /// Open cell in a random-radius square around `target` with the smallest,
    /// possibly misjudged, Manhattan distance to it.
    fn nearest_open<R: Rng + ?Sized>(
        &self,
        traits: &GuardTraits,
        target: Position,
        grid: &Grid,
        rng: &mut R,
    ) -> Option<Position> {
        let radius: i32 = rng.gen_range(3..=7);
        let mut best: Option<(f64, Position)> = None;

        for dx in -radius..=radius {
            for dy in -radius..=radius {
                let candidate = Position::new(target.x + dx, target.y + dy);
                if !grid.is_passable(candidate) {
                    continue;
                }
                let distance = candidate.manhattan_distance(target) as f64;
                let score = maybe_jitter(rng, traits.error_rate(), distance, 0.8, 1.2);
                if best.map_or(true, |(best_score, _)| score < best_score) {
                    best = Some((score, candidate));
                }
            }
        }

        best.map(|(_, pos)| pos)
    }
}

impl Default for PursuitPlanner {
    fn default() -> Self {
        Self::new(2)
    }
}
