//! # Door and Key Placement
//!
//! Reachability analysis around the player start and the planner that gates
//! the maze with doors and keys.
//!
//! Doors go on the routes to the exit but never inside the player's home
//! region, spaced apart so the player meets them one at a time. One key is
//! reserved just outside the home region so the first door is always within
//! easy reach; the rest sit a moderate distance from the doors.

use crate::{
    reachable_cells, Door, GenerationConfig, Grid, Key, Path, Pathfinder, Position,
};
use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Cells reachable from the player start within a fixed radius.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRegion {
    cells: BTreeSet<Position>,
}

impl PlayerRegion {
    pub fn contains(&self, pos: Position) -> bool {
        self.cells.contains(&pos)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.cells.iter()
    }

    /// Manhattan distance from `pos` to the nearest region cell, 0 inside it.
    pub fn distance_to(&self, pos: Position) -> u32 {
        self.cells
            .iter()
            .map(|cell| cell.manhattan_distance(pos))
            .min()
            .unwrap_or(u32::MAX)
    }
}

/// Bounded-radius reachability from a point.
#[derive(Debug, Clone, Copy)]
pub struct RegionAnalyzer<'a> {
    grid: &'a Grid,
}

impl<'a> RegionAnalyzer<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }

    /// Open cells reachable from `start` by a walk that never leaves the
    /// Manhattan ball of `radius` around it.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockdown::{Grid, Position, RegionAnalyzer};
    ///
    /// let grid = Grid::open(20, 20);
    /// let region = RegionAnalyzer::new(&grid).region(Position::new(10, 10), 1);
    /// assert_eq!(region.len(), 5);
    /// ```
    pub fn region(&self, start: Position, radius: u32) -> PlayerRegion {
        if !self.grid.is_passable(start) {
            return PlayerRegion::default();
        }
        let cells = ::pathfinding::prelude::bfs_reach(start, |&pos| {
            self.grid
                .open_neighbors(pos)
                .filter(|next| next.manhattan_distance(start) <= radius)
                .collect::<Vec<_>>()
        })
        .collect();
        PlayerRegion { cells }
    }
}

/// Result of planning a maze's gating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placement {
    /// Home region around the start
    pub region: PlayerRegion,
    /// Distinct start-to-exit routes discovered
    pub paths: Vec<Path>,
    /// Doors, all locked
    pub doors: Vec<Door>,
    /// Keys, one per door
    pub keys: Vec<Key>,
    /// Open cells still available for guards and obstacles
    pub free_cells: Vec<Position>,
}

/// Chooses door and key positions for a generated maze.
#[derive(Debug, Clone)]
pub struct PlacementPlanner {
    pub home_radius: u32,
    pub min_door_spacing: u32,
    pub max_doors: usize,
    pub border_distance: u32,
    pub alternate_paths: usize,
}

impl PlacementPlanner {
    pub fn new() -> Self {
        Self::from_config(&GenerationConfig::default())
    }

    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            home_radius: config.home_radius,
            min_door_spacing: config.min_door_spacing,
            max_doors: config.max_doors,
            border_distance: config.border_distance,
            alternate_paths: config.alternate_paths,
        }
    }

    /// Number of doors a maze with `open_cells` open cells should get.
    pub fn door_target(&self, open_cells: usize) -> usize {
        self.max_doors.min(open_cells / 10)
    }

    /// Plans doors and keys for `grid` with the player starting at `start`.
    pub fn plan<R: Rng + ?Sized>(
        &self,
        grid: &Grid,
        start: Position,
        exit: Position,
        rng: &mut R,
    ) -> Placement {
        let region = RegionAnalyzer::new(grid).region(start, self.home_radius);
        let paths = self.discover_paths(grid, start, exit, rng);

        let target = self.door_target(grid.open_count());
        let door_cells = self.select_doors(&paths, &region, target);
        if door_cells.len() < target {
            warn!(
                "Only {} of {} doors could be placed on {} routes",
                door_cells.len(),
                target,
                paths.len()
            );
        }

        let door_set: BTreeSet<Position> = door_cells.iter().copied().collect();
        let pool: Vec<Position> = grid
            .open_cells()
            .into_iter()
            .filter(|&pos| pos != start && pos != exit && !door_set.contains(&pos))
            .collect();

        let gated = grid.with_blocked(door_cells.iter().copied());
        let reachable_before_doors = reachable_cells(&gated, start);
        let key_cells = self.select_keys(
            &pool,
            &door_cells,
            &region,
            &reachable_before_doors,
            door_cells.len(),
            rng,
        );

        let key_set: BTreeSet<Position> = key_cells.iter().copied().collect();
        let free_cells = pool
            .into_iter()
            .filter(|pos| !key_set.contains(pos))
            .collect();

        debug!(
            "Placement: region {} cells, {} routes, {} doors, {} keys",
            region.len(),
            paths.len(),
            door_cells.len(),
            key_cells.len()
        );

        Placement {
            region,
            paths,
            doors: door_cells.into_iter().map(Door::locked).collect(),
            keys: key_cells.into_iter().map(Key::new).collect(),
            free_cells,
        }
    }

    /// Finds the shortest route plus up to `alternate_paths` detours, each made
    /// by walling off one random interior cell of the latest route found.
    pub fn discover_paths<R: Rng + ?Sized>(
        &self,
        grid: &Grid,
        start: Position,
        exit: Position,
        rng: &mut R,
    ) -> Vec<Path> {
        let pathfinder = Pathfinder::new(grid);
        let base = pathfinder.find_path(start, exit);
        if base.is_empty() {
            return Vec::new();
        }

        let mut paths = vec![base];
        let mut latest = 0;
        for _ in 0..self.alternate_paths {
            let route = &paths[latest];
            if route.len() < 3 {
                break;
            }
            let blocked = route[rng.gen_range(1..route.len() - 1)];
            let scratch = grid.with_blocked([blocked]);
            let alternate = pathfinder.find_path_with(Some(&scratch), start, exit);
            if !alternate.is_empty() && !paths.contains(&alternate) {
                paths.push(alternate);
                latest = paths.len() - 1;
            }
        }
        paths
    }

    /// Greedily picks doors from the routes' interior cells, closest to the home
    /// region first, keeping every pair at least `min_door_spacing` apart.
    pub fn select_doors(&self, paths: &[Path], region: &PlayerRegion, target: usize) -> Vec<Position> {
        let candidates: BTreeSet<Position> = paths
            .iter()
            .filter(|path| path.len() > 2)
            .flat_map(|path| path[1..path.len() - 1].iter().copied())
            .filter(|&pos| !region.contains(pos))
            .collect();

        let mut ranked: Vec<(u32, Position)> = candidates
            .into_iter()
            .map(|pos| (region.distance_to(pos), pos))
            .collect();
        ranked.sort();

        let mut doors: Vec<Position> = Vec::with_capacity(target);
        for (_, pos) in ranked {
            if doors.len() >= target {
                break;
            }
            if doors
                .iter()
                .all(|door| door.manhattan_distance(pos) >= self.min_door_spacing)
            {
                doors.push(pos);
            }
        }
        doors
    }

    /// Picks `count` key cells from `pool`.
    ///
    /// The first key goes on a border cell just outside the home region that the
    /// player can reach without passing a door, when one exists. The rest come
    /// from the middle third of the pool ranked by distance to the nearest door.
    pub fn select_keys<R: Rng + ?Sized>(
        &self,
        pool: &[Position],
        doors: &[Position],
        region: &PlayerRegion,
        reachable_before_doors: &BTreeSet<Position>,
        count: usize,
        rng: &mut R,
    ) -> Vec<Position> {
        let mut keys = Vec::with_capacity(count);
        if count == 0 {
            return keys;
        }

        let border: Vec<Position> = pool
            .iter()
            .copied()
            .filter(|&pos| {
                !region.contains(pos)
                    && region.distance_to(pos) <= self.border_distance
                    && reachable_before_doors.contains(&pos)
            })
            .collect();
        match border.choose(rng) {
            Some(&pos) => keys.push(pos),
            None => debug!("No border cell for the first key, using generic selection"),
        }

        let mut ranked: Vec<(u32, Position)> = pool
            .iter()
            .copied()
            .filter(|pos| !keys.contains(pos))
            .map(|pos| {
                let nearest = doors
                    .iter()
                    .map(|door| door.manhattan_distance(pos))
                    .min()
                    .unwrap_or(0);
                (nearest, pos)
            })
            .collect();
        ranked.sort();

        let remaining = count - keys.len();
        let middle = &ranked[ranked.len() / 3..ranked.len() * 2 / 3];
        let source = if middle.len() >= remaining {
            middle
        } else {
            &ranked[..]
        };
        keys.extend(
            source
                .choose_multiple(rng, remaining)
                .map(|&(_, pos)| pos),
        );
        keys
    }
}

impl Default for PlacementPlanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MazeGenerator;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_region_respects_walls() {
        let grid = Grid::from_ascii(&[
            "#######",
            "#..#..#",
            "#..#..#",
            "#######",
        ]);
        let region = RegionAnalyzer::new(&grid).region(Position::new(1, 1), 5);
        assert_eq!(region.len(), 4);
        assert!(!region.contains(Position::new(4, 1)));
    }

    #[test]
    fn test_region_radius() {
        let grid = Grid::open(20, 20);
        let region = RegionAnalyzer::new(&grid).region(Position::new(10, 10), 5);
        // Manhattan ball of radius r holds 2r^2 + 2r + 1 cells
        assert_eq!(region.len(), 61);
        assert!(region.iter().all(|pos| pos.manhattan_distance(Position::new(10, 10)) <= 5));
        assert_eq!(region.distance_to(Position::new(10, 17)), 2);
        assert_eq!(region.distance_to(Position::new(10, 12)), 0);
    }

    #[test]
    fn test_door_target_formula() {
        let planner = PlacementPlanner::new();
        assert_eq!(planner.door_target(25), 2);
        assert_eq!(planner.door_target(9), 0);
        assert_eq!(planner.door_target(500), 3);
    }

    #[test]
    fn test_doors_respect_spacing_and_region() {
        let grid = Grid::from_ascii(&[
            "######################",
            "#....................#",
            "######################",
        ]);
        let start = Position::new(1, 1);
        let exit = Position::new(20, 1);
        let planner = PlacementPlanner::new();
        let mut rng = StdRng::seed_from_u64(3);
        let placement = planner.plan(&grid, start, exit, &mut rng);

        // 20 open cells, so two doors
        assert_eq!(placement.doors.len(), 2);
        assert_eq!(placement.keys.len(), 2);
        for door in &placement.doors {
            assert!(door.locked);
            assert!(!placement.region.contains(door.position));
        }
        // Closest to the region first: x = 7, then the next cell 4 tiles away
        assert_eq!(placement.doors[0].position, Position::new(7, 1));
        assert_eq!(placement.doors[1].position, Position::new(11, 1));
    }

    #[test]
    fn test_keys_from_middle_third_without_border() {
        let grid = Grid::from_ascii(&[
            "######################",
            "#....................#",
            "######################",
        ]);
        let start = Position::new(1, 1);
        let planner = PlacementPlanner::new();
        let mut rng = StdRng::seed_from_u64(11);
        let placement = planner.plan(&grid, start, Position::new(20, 1), &mut rng);

        // Region ends at x = 6 and the first door sits on x = 7, so no border
        // cell is reachable without passing it and every key comes from the
        // middle third of the door-distance ranking.
        assert_eq!(placement.keys.len(), 2);
        assert_ne!(placement.keys[0], placement.keys[1]);
        let middle_third = [
            Position::new(9, 1),
            Position::new(13, 1),
            Position::new(4, 1),
            Position::new(14, 1),
            Position::new(3, 1),
        ];
        for key in &placement.keys {
            assert!(middle_third.contains(&key.position), "key {:?}", key.position);
        }
    }

    #[test]
    fn test_border_key_when_reachable() {
        let grid = Grid::from_ascii(&[
            "############",
            "#..........#",
            "#.########.#",
            "#.########.#",
            "#.########.#",
            "#.########.#",
            "#..........#",
            "############",
        ]);
        let start = Position::new(1, 1);
        let planner = PlacementPlanner {
            max_doors: 1,
            ..PlacementPlanner::new()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let placement = planner.plan(&grid, start, Position::new(10, 6), &mut rng);
        assert_eq!(placement.doors.len(), 1);

        let key = placement.keys[0].position;
        let distance = placement.region.distance_to(key);
        assert!(distance >= 1 && distance <= 3, "key {:?} at distance {}", key, distance);
    }

    #[test]
    fn test_discover_paths_are_distinct() {
        let config = GenerationConfig::new(8);
        let mut rng = config.create_rng();
        let grid = MazeGenerator::from_config(&config)
            .carve(config.rows, config.cols, config.start(), config.exit(), &mut rng)
            .unwrap();
        let planner = PlacementPlanner::from_config(&config);
        let paths = planner.discover_paths(&grid, config.start(), config.exit(), &mut rng);

        assert!(!paths.is_empty());
        assert!(paths.len() <= 1 + config.alternate_paths);
        for (i, a) in paths.iter().enumerate() {
            assert_eq!(a.first(), Some(&config.start()));
            assert_eq!(a.last(), Some(&config.exit()));
            for b in &paths[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_free_cells_exclude_items() {
        let config = GenerationConfig::new(21);
        let mut rng = config.create_rng();
        let grid = MazeGenerator::from_config(&config)
            .carve(config.rows, config.cols, config.start(), config.exit(), &mut rng)
            .unwrap();
        let placement =
            PlacementPlanner::from_config(&config).plan(&grid, config.start(), config.exit(), &mut rng);

        for pos in &placement.free_cells {
            assert!(placement.doors.iter().all(|door| door.position != *pos));
            assert!(placement.keys.iter().all(|key| key.position != *pos));
            assert_ne!(*pos, config.start());
            assert_ne!(*pos, config.exit());
        }
    }

    #[test]
    fn test_no_route_no_doors() {
        let grid = Grid::from_ascii(&["#######", "#..#..#", "#######"]);
        let placement = PlacementPlanner::new().plan(
            &grid,
            Position::new(1, 1),
            Position::new(5, 1),
            &mut StdRng::seed_from_u64(1),
        );
        assert!(placement.paths.is_empty());
        assert!(placement.doors.is_empty());
        assert!(placement.keys.is_empty());
    }
}
