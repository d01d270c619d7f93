//! # Policy Backends
//!
//! Pluggable decision makers that can replace the pursuit planner for guards.
//!
//! A backend sees a compact [`PolicyState`] rather than the whole round: the
//! guard's tile, a coarse hint of where the player is when the player is close
//! enough to notice, and the walls immediately around the guard. It answers
//! with a single cardinal step.

pub mod heuristic;
pub mod traits;

pub use heuristic::*;
pub use traits::*;
