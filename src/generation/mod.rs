//! # Generation Module
//!
//! Procedural content generation for a round: maze layout, door and key
//! placement, and guard/obstacle spawn points.
//!
//! Generation runs once per round, in order: the maze is carved, the player's
//! home region is measured, doors and keys gate the routes to the exit, and the
//! remaining free cells host guards and obstacles.

pub mod encounters;
pub mod maze;
pub mod placement;

pub use encounters::*;
pub use maze::*;
pub use placement::*;

use crate::config;
use crate::{LockdownError, LockdownResult, Position};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Configuration for procedural generation.
///
/// Controls maze dimensions, corridor density and the door/key/spawn
/// placement parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Maze height in tiles
    pub rows: usize,
    /// Maze width in tiles
    pub cols: usize,
    /// Extra wall openings as a fraction of all cells (loops in the maze)
    pub extra_connection_ratio: f64,
    /// Radius of the player's home region
    pub home_radius: u32,
    /// Minimum Manhattan distance between any two doors
    pub min_door_spacing: u32,
    /// Upper bound on the door count
    pub max_doors: usize,
    /// How far outside the home region the guaranteed first key may sit
    pub border_distance: u32,
    /// Alternate start-to-exit routes probed when choosing doors
    pub alternate_paths: usize,
    /// Number of furniture obstacles
    pub obstacle_count: usize,
    /// Minimum Manhattan distance from the start for guard spawns
    pub min_guard_spawn_distance: u32,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockdown::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(42);
    /// assert_eq!(config.seed, 42);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rows: config::DEFAULT_ROWS,
            cols: config::DEFAULT_COLS,
            extra_connection_ratio: 0.1,
            home_radius: 5,
            min_door_spacing: 4,
            max_doors: 3,
            border_distance: 3,
            alternate_paths: 2,
            obstacle_count: 2,
            min_guard_spawn_distance: 8,
        }
    }

    /// Creates a configuration for testing with a smaller maze.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            rows: 11,
            cols: 11,
            obstacle_count: 1,
            min_guard_spawn_distance: 4,
            ..Self::new(seed)
        }
    }

    /// Player start tile: the top-left interior corner.
    pub fn start(&self) -> Position {
        Position::new(1, 1)
    }

    /// Exit tile: the bottom-right interior corner.
    pub fn exit(&self) -> Position {
        Position::new(self.cols as i32 - 2, self.rows as i32 - 2)
    }

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }

    /// Rejects configurations that cannot produce a maze.
    pub fn validate(&self) -> LockdownResult<()> {
        if self.rows < 3 || self.cols < 3 {
            return Err(LockdownError::InvalidConfig(format!(
                "maze must be at least 3x3, got {}x{}",
                self.rows, self.cols
            )));
        }
        if !(0.0..=1.0).contains(&self.extra_connection_ratio) {
            return Err(LockdownError::InvalidConfig(format!(
                "extra_connection_ratio {} outside [0, 1]",
                self.extra_connection_ratio
            )));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Trait for procedural generators.
///
/// All generation systems implement this trait, so setup code can drive them
/// through one interface and log them uniformly.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> LockdownResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> LockdownResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_config_creation() {
        let config = GenerationConfig::new(12345);
        assert_eq!(config.seed, 12345);
        assert_eq!(config.rows, config::DEFAULT_ROWS);
        assert_eq!(config.cols, config::DEFAULT_COLS);
        assert_eq!(config.min_door_spacing, 4);
        assert_eq!(config.home_radius, 5);
    }

    #[test]
    fn test_start_and_exit_are_interior() {
        let config = GenerationConfig::for_testing(1);
        assert_eq!(config.start(), Position::new(1, 1));
        assert_eq!(config.exit(), Position::new(9, 9));
    }

    #[test]
    fn test_validate_rejects_tiny_maze() {
        let mut config = GenerationConfig::new(1);
        config.rows = 2;
        assert!(matches!(
            config.validate(),
            Err(LockdownError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_ratio() {
        let mut config = GenerationConfig::new(1);
        config.extra_connection_ratio = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GenerationConfig = serde_json::from_str(r#"{"seed": 7, "rows": 21}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.rows, 21);
        assert_eq!(config.cols, config::DEFAULT_COLS);
    }
}
