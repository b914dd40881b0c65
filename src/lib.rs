//! # Snake Arena
//!
//! Grid snake simulation: a player snake eats food and bonuses while AI
//! snakes roam the field, levels speed up, and a high-score table records
//! the best runs.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SNAKE ARENA                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── grid.rs     - Coordinates, directions, bounds           │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for replay checks           │
//! │                                                              │
//! │  game/           - Simulation (deterministic)                │
//! │  ├── body.rs     - Snake body                                │
//! │  ├── state.rs    - Phase, player, enemies, bonuses           │
//! │  ├── spawn.rs    - Food, bonus and layout placement          │
//! │  ├── ai.rs       - Enemy behaviors                           │
//! │  ├── collision.rs- Collision detection and resolution        │
//! │  ├── progression.rs - Score, levels, tick interval           │
//! │  └── tick.rs     - Session state machine and loop            │
//! │                                                              │
//! │  config.rs       - Tunables, JSON loading                    │
//! │  storage.rs      - High-score table (trait + JSON file)      │
//! │  audio.rs        - Audio cue sink                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! The `core/` and `game/` modules replay identically:
//! - No HashMap (BTreeMap/BTreeSet for ordered iteration)
//! - All randomness from one seeded Xorshift128+
//! - Time comes from the host as a `Duration`, never from the system
//!
//! Given the same config, seed and input frames, two sessions end with
//! the same state hash.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod config;
pub mod storage;
pub mod audio;

// Re-export commonly used types
pub use core::grid::{Coord, Direction, Grid};
pub use core::rng::DeterministicRng;
pub use config::{ConfigError, GameConfig};
pub use game::input::{InputFrame, InputRecording};
pub use game::state::GamePhase;
pub use game::tick::{Game, TickResult};
pub use storage::{JsonScoreStore, MemoryScoreStore, ScoreStore, StorageError};
pub use audio::{AudioSink, TracingAudio};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
