//! State Hashing
//!
//! SHA-256 digest over the simulation state. Two runs from the same seed
//! and the same inputs must end with the same digest; the demo binary and
//! the tick tests use this to check that nothing nondeterministic leaked
//! into the simulation.

use std::time::Duration;

use sha2::{Sha256, Digest};
use super::grid::Coord;

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Hasher with typed update helpers.
///
/// Order of updates is part of the digest.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for game state.
    pub fn for_game_state() -> Self {
        Self::new(b"SNAKE_ARENA_STATE_V1")
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i32 value (little-endian).
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a grid coordinate.
    #[inline]
    pub fn update_coord(&mut self, value: Coord) {
        self.update_i32(value.x);
        self.update_i32(value.y);
    }

    /// Update with a run of coordinates, length-prefixed.
    pub fn update_coords<'a, I>(&mut self, coords: I)
    where
        I: IntoIterator<Item = &'a Coord>,
        I::IntoIter: ExactSizeIterator,
    {
        let iter = coords.into_iter();
        self.update_u32(iter.len() as u32);
        for c in iter {
            self.update_coord(*c);
        }
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Update with a duration at millisecond resolution.
    #[inline]
    pub fn update_duration(&mut self, value: Duration) {
        self.update_u64(value.as_millis() as u64);
    }

    /// Update with an optional duration; `None` and `Some(0)` differ.
    pub fn update_opt_duration(&mut self, value: Option<Duration>) {
        self.update_bool(value.is_some());
        if let Some(d) = value {
            self.update_duration(d);
        }
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute the game state hash.
///
/// Tick and seed go first; the closure adds the entity state.
pub fn compute_state_hash<F>(tick: u32, rng_seed: u64, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_game_state();

    hasher.update_u32(tick);
    hasher.update_u64(rng_seed);

    add_state(&mut hasher);

    hasher.finalize()
}

// =============================================================================
// TESTS
// =============================================================================
