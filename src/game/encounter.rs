//! # Encounter Tracking
//!
//! Capture and escape detection plus the statistics reported at round end.
//!
//! Collision uses pixel-space boxes inset from the tile edges, so a guard and
//! the player must actually overlap on screen, not merely stand on touching
//! tiles.

use crate::{GuardAgent, Position, WorldPoint};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BoundingBox {
    /// Box for an entity at `point`, inset by `margin` pixels on every side.
    pub fn around(point: WorldPoint, tile_size: f32, margin: f32) -> Self {
        Self {
            left: point.x * tile_size + margin,
            top: point.y * tile_size + margin,
            right: (point.x + 1.0) * tile_size - margin,
            bottom: (point.y + 1.0) * tile_size - margin,
        }
    }

    /// Strict overlap; boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }
}

/// How a round ended, if it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    None,
    Capture,
    Escape,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::None)
    }
}

/// Decides capture and escape from entity positions.
#[derive(Debug, Clone)]
pub struct EncounterTracker {
    pub tile_size: f32,
    pub tile_margin: f32,
}

impl EncounterTracker {
    pub fn new(tile_size: f32, tile_margin: f32) -> Self {
        Self {
            tile_size,
            tile_margin,
        }
    }

    /// Capture if any guard's box overlaps the player's, else escape if the
    /// player stands on the exit.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockdown::{EncounterTracker, Outcome, Position, WorldPoint};
    ///
    /// let tracker = EncounterTracker::default();
    /// let player = WorldPoint::new(5.0, 5.0);
    /// let outcome = tracker.evaluate(player, [WorldPoint::new(9.0, 9.0)], Position::new(5, 5));
    /// assert_eq!(outcome, Outcome::Escape);
    /// ```
    pub fn evaluate<I>(&self, player: WorldPoint, guards: I, exit: Position) -> Outcome
    where
        I: IntoIterator<Item = WorldPoint>,
    {
        let player_box = self.bounding_box(player);
        if guards
            .into_iter()
            .any(|guard| self.bounding_box(guard).intersects(&player_box))
        {
            return Outcome::Capture;
        }
        if player.nearest_tile() == exit {
            return Outcome::Escape;
        }
        Outcome::None
    }

    pub fn bounding_box(&self, point: WorldPoint) -> BoundingBox {
        BoundingBox::around(point, self.tile_size, self.tile_margin)
    }
}

impl Default for EncounterTracker {
    fn default() -> Self {
        Self::new(crate::config::TILE_SIZE, crate::config::TILE_MARGIN)
    }
}

/// Running statistics for one round.
#[derive(Debug, Clone)]
pub struct Metrics {
    interceptions: u32,
    total_distance: u64,
    distance_samples: u64,
    ticks: u64,
    started: Instant,
    stopped: Option<Instant>,
}

impl Metrics {
    /// Starts the round timer.
    pub fn start() -> Self {
        Self {
            interceptions: 0,
            total_distance: 0,
            distance_samples: 0,
            ticks: 0,
            started: Instant::now(),
            stopped: None,
        }
    }

    /// Records one tick: each guard's Manhattan tile distance to the player.
    ///
    /// Guards are measured from the tile under their sprite centre, the same
    /// way the player's tile is taken.
    pub fn record_tick(&mut self, player_tile: Position, guards: &[GuardAgent]) {
        self.ticks += 1;
        for guard in guards {
            let guard_tile = guard.position.nearest_tile();
            self.total_distance += u64::from(guard_tile.manhattan_distance(player_tile));
            self.distance_samples += 1;
        }
    }

    /// Records how the round ended and freezes the timer.
    pub fn finish(&mut self, outcome: Outcome) {
        if outcome == Outcome::Capture {
            self.interceptions += 1;
        }
        if self.stopped.is_none() {
            self.stopped = Some(Instant::now());
        }
    }

    pub fn interceptions(&self) -> u32 {
        self.interceptions
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Mean guard-to-player distance over all samples, 0 when nothing was sampled.
    pub fn average_distance(&self) -> f64 {
        if self.distance_samples == 0 {
            0.0
        } else {
            self.total_distance as f64 / self.distance_samples as f64
        }
    }

    pub fn elapsed_seconds(&self) -> f64 {
        let end = self.stopped.unwrap_or_else(Instant::now);
        end.duration_since(self.started).as_secs_f64()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            interceptions: self.interceptions,
            average_distance: self.average_distance(),
            elapsed_seconds: self.elapsed_seconds(),
            ticks: self.ticks,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::start()
    }
}

/// Serializable view of [`Metrics`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub interceptions: u32,
    pub average_distance: f64,
    pub elapsed_seconds: f64,
    pub ticks: u64,
}
