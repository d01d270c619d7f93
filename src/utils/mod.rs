//! # Utilities Module
//!
//! Grid mathematics and pathfinding shared by generation and pursuit.

pub mod math;
pub mod pathfinding;

pub use self::math::*;
pub use self::pathfinding::*;
