//! # Maze Generation
//!
//! Randomized backtracking maze carver with extra loop connections.
//!
//! The carver works on the odd-coordinate lattice, stepping two tiles at a time
//! so a wall always separates parallel corridors. A perfect maze has exactly one
//! route between any two cells, which leaves nothing for the placement planner
//! to discover, so a fraction of walls that touch two or more corridors are
//! knocked out afterwards to create loops.

use crate::{
    reachable_cells, Cell, Direction, GenerationConfig, Generator, Grid, LockdownError,
    LockdownResult, Position,
};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Maze generator using randomized depth-first backtracking.
///
/// This generator creates mazes by:
/// 1. Carving a spanning tree of corridors from the start tile
/// 2. Forcing the exit open and joining it to the corridors
/// 3. Opening extra walls between corridors to create alternate routes
/// 4. Sealing the outer ring so the play area stays enclosed
#[derive(Debug, Clone)]
pub struct MazeGenerator {
    /// Extra wall openings as a fraction of all cells
    pub extra_connection_ratio: f64,
    /// Random wall picks allowed per requested extra connection
    pub attempts_per_connection: usize,
}

/// One level of the carving recursion, kept on an explicit stack.
struct CarveFrame {
    position: Position,
    directions: [Direction; 4],
    next: usize,
}

impl CarveFrame {
    fn new<R: Rng + ?Sized>(position: Position, rng: &mut R) -> Self {
        let mut directions = Direction::search_order();
        directions.shuffle(rng);
        Self {
            position,
            directions,
            next: 0,
        }
    }

    fn next_direction(&mut self) -> Option<Direction> {
        let direction = self.directions.get(self.next).copied();
        self.next += 1;
        direction
    }
}

impl MazeGenerator {
    /// Creates a maze generator with default settings.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockdown::{Cell, MazeGenerator, Position};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let generator = MazeGenerator::new();
    /// let mut rng = StdRng::seed_from_u64(3);
    /// let grid = generator
    ///     .carve(15, 20, Position::new(1, 1), Position::new(18, 13), &mut rng)
    ///     .unwrap();
    /// assert_eq!(grid.cell(Position::new(18, 13)), Cell::Open);
    /// ```
    pub fn new() -> Self {
        Self {
            extra_connection_ratio: 0.1,
            attempts_per_connection: 50,
        }
    }

    /// Creates a generator using the ratio from a generation config.
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            extra_connection_ratio: config.extra_connection_ratio,
            ..Self::new()
        }
    }

    /// Carves a `rows` x `cols` maze in which `start` and `exit` are open and
    /// mutually reachable, and every open cell is reachable from `start`.
    pub fn carve<R: Rng + ?Sized>(
        &self,
        rows: usize,
        cols: usize,
        start: Position,
        exit: Position,
        rng: &mut R,
    ) -> LockdownResult<Grid> {
        if rows < 3 || cols < 3 {
            return Err(LockdownError::InvalidConfig(format!(
                "maze must be at least 3x3, got {}x{}",
                rows, cols
            )));
        }

        let mut grid = Grid::new(rows, cols, Cell::Wall);
        for (name, pos) in [("start", start), ("exit", exit)] {
            if !grid.is_interior(pos) {
                return Err(LockdownError::InvalidConfig(format!(
                    "{} {:?} is not inside the {}x{} boundary",
                    name, pos, rows, cols
                )));
            }
        }

        self.carve_passages(&mut grid, start, rng);
        self.connect_exit(&mut grid, start, exit);
        let extra = self.add_extra_connections(&mut grid, rng);
        self.seal_boundary(&mut grid);

        debug!(
            "Carved {}x{} maze: {} open cells, {} extra connections",
            rows,
            cols,
            grid.open_count(),
            extra
        );

        Ok(grid)
    }

    /// Depth-first carving from `start`, two tiles per step.
    ///
    /// Each frame shuffles its directions once on entry and tries them in
    /// order, exactly as the recursive formulation would.
    fn carve_passages<R: Rng + ?Sized>(&self, grid: &mut Grid, start: Position, rng: &mut R) {
        grid.set(start, Cell::Open);
        let mut stack = vec![CarveFrame::new(start, rng)];

        while let Some(frame) = stack.last_mut() {
            let Some(direction) = frame.next_direction() else {
                stack.pop();
                continue;
            };
            let here = frame.position;

            let between = here.step(direction);
            let target = between.step(direction);
            if grid.is_interior(target) && grid.cell(target) == Cell::Wall {
                grid.set(between, Cell::Open);
                grid.set(target, Cell::Open);
                stack.push(CarveFrame::new(target, rng));
            }
        }
    }

    /// Forces the exit open and, if it is off the carved lattice, digs toward the
    /// start until it joins the carved corridors.
    fn connect_exit(&self, grid: &mut Grid, start: Position, exit: Position) {
        grid.set(exit, Cell::Open);
        let reachable = reachable_cells(grid, start);
        if reachable.contains(&exit) {
            return;
        }

        let mut current = exit;
        while !grid.open_neighbors(current).any(|next| reachable.contains(&next)) {
            current = if current.x != start.x {
                Position::new(current.x - (current.x - start.x).signum(), current.y)
            } else {
                Position::new(current.x, current.y - (current.y - start.y).signum())
            };
            grid.set(current, Cell::Open);
            if reachable.contains(&current) {
                break;
            }
        }
    }

    /// Opens random interior walls that touch at least two open cells.
    ///
    /// Every open cell is already reachable, so any wall bordering one becomes
    /// reachable when opened and connectivity is preserved.
    fn add_extra_connections<R: Rng + ?Sized>(&self, grid: &mut Grid, rng: &mut R) -> usize {
        let target = (self.extra_connection_ratio * (grid.rows() * grid.cols()) as f64) as usize;
        let max_attempts = target * self.attempts_per_connection;
        let mut opened = 0;

        for _ in 0..max_attempts {
            if opened >= target {
                break;
            }
            let pos = Position::new(
                rng.gen_range(1..grid.cols() as i32 - 1),
                rng.gen_range(1..grid.rows() as i32 - 1),
            );
            if grid.cell(pos) == Cell::Wall && grid.open_neighbors(pos).count() >= 2 {
                grid.set(pos, Cell::Open);
                opened += 1;
            }
        }

        opened
    }

    /// Keeps the outer ring solid, including the row and column opposite the start.
    fn seal_boundary(&self, grid: &mut Grid) {
        let boundary: Vec<Position> = grid
            .positions()
            .filter(|&pos| !grid.is_interior(pos))
            .collect();
        for pos in boundary {
            grid.set(pos, Cell::Wall);
        }
    }
}

impl Default for MazeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator<Grid> for MazeGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> LockdownResult<Grid> {
        config.validate()?;
        let grid = self.carve(config.rows, config.cols, config.start(), config.exit(), rng)?;
        self.validate(&grid, config)?;
        Ok(grid)
    }

    fn validate(&self, grid: &Grid, config: &GenerationConfig) -> LockdownResult<()> {
        if grid.cell(config.exit()) != Cell::Open {
            return Err(LockdownError::GenerationFailed(
                "exit tile is not open".to_string(),
            ));
        }

        let reachable = reachable_cells(grid, config.start());
        if !reachable.contains(&config.exit()) {
            return Err(LockdownError::GenerationFailed(
                "exit is not reachable from the start".to_string(),
            ));
        }
        if reachable.len() != grid.open_count() {
            return Err(LockdownError::GenerationFailed(format!(
                "{} open cells are cut off from the start",
                grid.open_count() - reachable.len()
            )));
        }

        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "MazeGenerator"
    }
}
