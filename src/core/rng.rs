//! Seedable Random Number Generator
//!
//! Xorshift128+ behind an explicit, injectable handle. Spawning and enemy
//! AI take `&mut DeterministicRng` instead of reaching for a global source,
//! so a fixed seed replays a run exactly.

use serde::{Serialize, Deserialize};
use sha2::{Sha256, Digest};

use super::grid::{Coord, Grid};

/// Deterministic PRNG using the Xorshift128+ algorithm.
///
/// # Example
///
/// ```
/// use snake_arena::core::rng::DeterministicRng;
///
/// let mut rng = DeterministicRng::new(12345);
/// let value = rng.next_u64();
/// assert_eq!(value, 6233086606872742541); // Always the same!
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    ///
    /// SplitMix64 expands the seed so weak seeds (0, 1, 2...) still
    /// give well-mixed state.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // Ensure state is never all zeros
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Generate a random integer in range [0, max).
    #[inline]
    pub fn next_int(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        // Simple modulo - slight bias for very large max, but acceptable
        (self.next_u64() % max as u64) as u32
    }

    /// True with probability `1 / n`. `n == 0` never fires.
    #[inline]
    pub fn one_in(&mut self, n: u32) -> bool {
        n != 0 && self.next_int(n) == 0
    }

    /// Uniformly random tile of the grid.
    #[inline]
    pub fn random_cell(&mut self, grid: &Grid) -> Coord {
        let x = self.next_int(grid.width) as i32;
        let y = self.next_int(grid.height) as i32;
        Coord::new(x, y)
    }

    /// Shuffle a slice in place using Fisher-Yates algorithm.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        let len = slice.len();
        for i in (1..len).rev() {
            let j = self.next_int((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Select a random element from a slice.
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            None
        } else {
            let idx = self.next_int(slice.len() as u32) as usize;
            Some(&slice[idx])
        }
    }

    /// Get current state (for hashing and debugging).
    pub fn state(&self) -> [u64; 2] {
        self.state
    }
}

/// SplitMix64 for seed initialization.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Derive a run seed from a label and a host-provided nonce.
///
/// Hosts that want a fresh run each launch pass wall-clock nanos as the
/// nonce; tests and the replay check pass a constant.
pub fn derive_seed(label: &str, nonce: u64) -> u64 {
    let mut hasher = Sha256::new();

    // Domain separator
    hasher.update(b"SNAKE_ARENA_SEED_V1");
    hasher.update(label.as_bytes());
    hasher.update(nonce.to_le_bytes());

    let hash = hasher.finalize();
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&hash[0..8]);
    u64::from_le_bytes(seed)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_determinism() {
        let mut rng1 = DeterministicRng::new(12345);
        let mut rng2 = DeterministicRng::new(12345);

        for _ in 0..1000 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_rng_different_seeds() {
        let mut rng1 = DeterministicRng::new(12345);
        let mut rng2 = DeterministicRng::new(54321);

        assert_ne!(rng1.next_u64(), rng2.next_u64());
    }

    #[test]
    fn test_rng_known_values() {
        // Regression values: seeded runs depend on this sequence.
        let mut rng = DeterministicRng::new(42);
        assert_eq!(rng.next_u64(), 16629283624882167704);
        assert_eq!(rng.next_u64(), 1420492921613871959);
        assert_eq!(rng.next_u64(), 9768315062676884790);
    }

    #[test]
    fn test_next_int() {
        let mut rng = DeterministicRng::new(1234);

        for _ in 0..1000 {
            assert!(rng.next_int(100) < 100);
        }

        assert_eq!(rng.next_int(0), 0);
        assert_eq!(rng.next_int(1), 0);
    }

    #[test]
    fn test_one_in() {
        let mut rng = DeterministicRng::new(31337);
        assert!(!rng.one_in(0));
        assert!(rng.one_in(1));

        let hits = (0..10_000).filter(|_| rng.one_in(10)).count();
        assert!((800..1200).contains(&hits), "got {hits} hits");
    }

    #[test]
    fn test_random_cell_in_grid() {
        let mut rng = DeterministicRng::new(7777);
        let grid = Grid::new(7, 5);

        for _ in 0..500 {
            assert!(grid.contains(rng.random_cell(&grid)));
        }
    }

    #[test]
    fn test_shuffle_determinism() {
        let mut rng1 = DeterministicRng::new(1111);
        let mut rng2 = DeterministicRng::new(1111);

        let mut arr1 = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let mut arr2 = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];

        rng1.shuffle(&mut arr1);
        rng2.shuffle(&mut arr2);

        assert_eq!(arr1, arr2);

        let mut sorted = arr1;
        sorted.sort();
        assert_eq!(sorted, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_derive_seed() {
        assert_eq!(derive_seed("player", 1), derive_seed("player", 1));
        assert_ne!(derive_seed("player", 1), derive_seed("player", 2));
        assert_ne!(derive_seed("player", 1), derive_seed("other", 1));
    }

    #[test]
    fn test_state_tracks_position() {
        let mut rng1 = DeterministicRng::new(5555);
        let mut rng2 = DeterministicRng::new(5555);
        assert_eq!(rng1.state(), rng2.state());

        rng1.next_u64();
        assert_ne!(rng1.state(), rng2.state());

        rng2.next_u64();
        assert_eq!(rng1.state(), rng2.state());
    }
}
