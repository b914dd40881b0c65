//! Game Logic Module
//!
//! All simulation code. Deterministic for a given seed, config and input
//! sequence.
//!
//! ## Module Structure
//!
//! - `body`: Snake body shared by player and enemies
//! - `state`: Phase, player, enemies, bonuses, world
//! - `input`: Input frames and recordings
//! - `spawn`: Food, bonus and layout placement
//! - `ai`: Enemy behavior selection
//! - `collision`: Collision detection and resolution
//! - `progression`: Score, levels, tick interval
//! - `events`: Game events and audio cues
//! - `view`: Render snapshot
//! - `tick`: Session state machine and simulation loop

pub mod body;
pub mod state;
pub mod input;
pub mod spawn;
pub mod ai;
pub mod collision;
pub mod progression;
pub mod events;
pub mod view;
pub mod tick;

// Re-export key types
pub use body::Body;
pub use input::{InputFrame, InputRecording};
pub use state::{Bonus, BonusType, Enemy, GamePhase, Player, World};
pub use ai::{AiSelector, Behavior};
pub use collision::CollisionCause;
pub use progression::Progression;
pub use events::{AudioCue, GameEvent, GameEventData};
pub use view::GameView;
pub use tick::{Game, TickResult};
