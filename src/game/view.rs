//! Render View
//!
//! Read-only snapshot handed to renderers and UI. Colors are not part of
//! it: renderers map `color_index` and [`BonusType`] onto their own
//! palette.

use serde::{Serialize, Deserialize};

use crate::core::grid::{Coord, Direction};
use crate::game::collision::CollisionCause;
use crate::game::state::{BonusType, GamePhase};

/// One enemy as drawn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    /// Enemy id
    pub id: u32,
    /// Tiles, head first
    pub body: Vec<Coord>,
    /// Palette slot
    pub color_index: u8,
    /// Steps per tick
    pub speed: u8,
}

/// One bonus as drawn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BonusView {
    /// Tile
    pub position: Coord,
    /// Effect (renderer picks the color)
    pub bonus_type: BonusType,
    /// Lifetime left
    pub remaining_ms: u64,
}

/// Everything a frame needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameView {
    /// Current phase
    pub phase: GamePhase,
    /// Ticks simulated this run
    pub tick: u32,
    /// Player tiles, head first
    pub player: Vec<Coord>,
    /// Player heading
    pub direction: Direction,
    /// Shield up
    pub shield_active: bool,
    /// Speed boost running
    pub speed_boost_active: bool,
    /// Enemies in id order
    pub enemies: Vec<EnemyView>,
    /// Food tile
    pub food: Coord,
    /// Active bonuses
    pub bonuses: Vec<BonusView>,
    /// Run score
    pub score: u32,
    /// Current level
    pub level: u32,
    /// Lives left
    pub lives: u32,
    /// Score on this level
    pub level_score: u32,
    /// Score needed to finish this level
    pub level_threshold: u32,
    /// `level_score / level_threshold`, capped at 1
    pub level_progress: f32,
    /// Run time excluding pauses
    pub elapsed_ms: u64,
    /// What ended the last life, if anything has
    pub death_cause: Option<CollisionCause>,
}
