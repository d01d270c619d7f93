//! # Doors and Keys
//!
//! Gating items and the player's key inventory.
//!
//! Doors are created locked and can only ever be unlocked, by the player spending
//! a key on them. Keys vanish the moment they are collected. Both operations are
//! idempotent so the shell may call them on every tick the player stands on a cell.

use crate::{Grid, Position};
use log::debug;
use serde::{Deserialize, Serialize};

/// A door gating one tile of the maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub position: Position,
    pub locked: bool,
}

impl Door {
    /// Creates a locked door.
    pub fn locked(position: Position) -> Self {
        Self {
            position,
            locked: true,
        }
    }
}

/// A collectable key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub position: Position,
}

impl Key {
    pub fn new(position: Position) -> Self {
        Self { position }
    }
}

/// Furniture that freezes the player on contact. Guards are not hindered by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstacle {
    pub position: Position,
}

/// Doors, uncollected keys and the number of keys the player carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLedger {
    pub doors: Vec<Door>,
    pub keys: Vec<Key>,
    pub player_keys: u32,
}

impl ItemLedger {
    /// Creates a ledger with locked doors at `doors` and keys at `keys`.
    pub fn new(doors: Vec<Door>, keys: Vec<Key>) -> Self {
        Self {
            doors,
            keys,
            player_keys: 0,
        }
    }

    /// Collects the key at `pos` if one is still there.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockdown::{ItemLedger, Key, Position};
    ///
    /// let pos = Position::new(2, 3);
    /// let mut items = ItemLedger::new(Vec::new(), vec![Key::new(pos)]);
    /// assert!(items.collect_key(pos));
    /// assert!(!items.collect_key(pos));
    /// assert_eq!(items.player_keys, 1);
    /// ```
    pub fn collect_key(&mut self, pos: Position) -> bool {
        match self.keys.iter().position(|key| key.position == pos) {
            Some(index) => {
                self.keys.remove(index);
                self.player_keys += 1;
                debug!("Key collected at {:?}, player holds {}", pos, self.player_keys);
                true
            }
            None => false,
        }
    }

    /// Spends a key on the locked door at `pos`.
    ///
    /// Fails without side effects when there is no locked door there or the
    /// player has no key.
    pub fn unlock_door(&mut self, pos: Position) -> bool {
        if self.player_keys == 0 {
            return false;
        }
        match self
            .doors
            .iter_mut()
            .find(|door| door.locked && door.position == pos)
        {
            Some(door) => {
                door.locked = false;
                self.player_keys -= 1;
                debug!("Door unlocked at {:?}, player holds {}", pos, self.player_keys);
                true
            }
            None => false,
        }
    }

    /// The door at `pos`, if any.
    pub fn door_at(&self, pos: Position) -> Option<&Door> {
        self.doors.iter().find(|door| door.position == pos)
    }

    /// Whether a still-locked door occupies `pos`.
    pub fn is_locked_door(&self, pos: Position) -> bool {
        self.door_at(pos).map_or(false, |door| door.locked)
    }

    /// Positions of doors that are still locked.
    pub fn locked_doors(&self) -> impl Iterator<Item = Position> + '_ {
        self.doors
            .iter()
            .filter(|door| door.locked)
            .map(|door| door.position)
    }

    /// The grid as guards see it: locked doors count as walls.
    pub fn navigation_grid(&self, grid: &Grid) -> Grid {
        grid.with_blocked(self.locked_doors())
    }

    /// Reopens an unlocked door's tile on a navigation grid built by
    /// [`ItemLedger::navigation_grid`].
    pub fn sync_navigation(&self, canonical: &Grid, navigation: &mut Grid, pos: Position) {
        if !self.is_locked_door(pos) {
            navigation.set(pos, canonical.cell(pos));
        }
    }
}
