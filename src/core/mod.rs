//! Core primitives.
//!
//! Grid geometry, the seedable random source and state hashing. Nothing
//! in here knows about snakes.

pub mod grid;
pub mod rng;
pub mod hash;

// Re-export core types
pub use grid::{Coord, Direction, Grid};
pub use rng::DeterministicRng;
pub use hash::{StateHash, compute_state_hash};
