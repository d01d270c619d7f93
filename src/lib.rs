//! # Lockdown
//!
//! A tile-grid pursuit simulation: guards hunt a player through a procedurally
//! generated maze that is gated by locked doors and the keys that open them.
//!
//! ## Architecture Overview
//!
//! The crate is the simulation core only. Rendering, audio and input decoding
//! belong to whatever shell drives it. The core is organised around:
//!
//! - **Generation System**: maze carving, home-region analysis, door/key planning
//!   and spawn placement
//! - **Pathfinding**: A* over an occupancy grid with an optional overlay grid
//! - **Pursuit**: the per-guard imperfect planner and the patrol state machine
//! - **Round State**: one owned value holding everything a round mutates, advanced
//!   one tick at a time
//! - **Policy Backends**: an optional seam for alternative guard decision makers
//!
//! Every random decision flows through an injected, seedable `StdRng`, so a seed
//! fully determines a round given the same player input.

pub mod game;
pub mod generation;
pub mod policy;
pub mod utils;

pub use game::*;
pub use generation::*;
pub use policy::*;
pub use utils::*;

/// Core error type for the Lockdown simulation.
#[derive(thiserror::Error, Debug)]
pub enum LockdownError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration rejected before the round starts
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Round state is invalid
    #[error("Invalid round state: {0}")]
    InvalidState(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the Lockdown codebase.
pub type LockdownResult<T> = Result<T, LockdownError>;

/// Version information for the simulation.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation configuration constants.
pub mod config {
    /// Default maze height in tiles (600 px window at 40 px tiles)
    pub const DEFAULT_ROWS: usize = 15;

    /// Default maze width in tiles (800 px window at 40 px tiles)
    pub const DEFAULT_COLS: usize = 20;

    /// Edge length of one tile in pixels
    pub const TILE_SIZE: f32 = 40.0;

    /// Collision box inset on every side of a tile, in pixels
    pub const TILE_MARGIN: f32 = 5.0;

    /// Guard movement in tiles per tick
    pub const GUARD_SPEED: f32 = 0.05;

    /// Player movement in tiles per tick (5 px per frame)
    pub const PLAYER_SPEED: f32 = 0.125;

    /// How long an obstacle collision freezes the player
    pub const FREEZE_DURATION_MS: u64 = 3000;

    /// Frames per second target for the simulation loop
    pub const TARGET_FPS: u64 = 60;

    /// Radius within which a policy backend may see the player
    pub const VISIBILITY_RADIUS: i32 = 5;
}
