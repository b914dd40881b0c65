//! Game Events
//!
//! Everything observable that happens during a tick. The host turns these
//! into audio cues, log lines or UI flashes; the simulation never waits on
//! any of that.

use serde::{Serialize, Deserialize};

use crate::core::grid::Coord;
use crate::game::collision::CollisionCause;
use crate::game::state::{BonusType, GamePhase};

/// Named sound cue for the audio collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    /// Food eaten
    Eat,
    /// Bonus collected
    Bonus,
    /// Level finished
    LevelUp,
    /// Run over
    GameOver,
    /// Life lost, run continues
    Hit,
}

impl AudioCue {
    /// Asset name the audio host looks up.
    pub fn name(self) -> &'static str {
        match self {
            AudioCue::Eat => "eat",
            AudioCue::Bonus => "bonus",
            AudioCue::LevelUp => "level_up",
            AudioCue::GameOver => "game_over",
            AudioCue::Hit => "hit",
        }
    }
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Player ate the food
    FoodEaten {
        /// Where the food was
        position: Coord,
        /// Points awarded
        points: u32,
        /// Run score afterwards
        new_score: u32,
    },

    /// Player picked up a bonus
    BonusCollected {
        /// Effect
        bonus_type: BonusType,
        /// Where it was
        position: Coord,
        /// Lives or points granted
        value: u32,
    },

    /// A bonus appeared
    BonusSpawned {
        /// Effect
        bonus_type: BonusType,
        /// Tile
        position: Coord,
    },

    /// A bonus timed out uncollected
    BonusExpired {
        /// Effect
        bonus_type: BonusType,
        /// Tile
        position: Coord,
    },

    /// The shield took a hit instead of the player
    ShieldAbsorbed {
        /// What was hit
        cause: CollisionCause,
    },

    /// Player lost a life
    PlayerHit {
        /// What was hit
        cause: CollisionCause,
        /// Lives afterwards
        lives_left: u32,
    },

    /// Level threshold reached
    LevelCompleted {
        /// Level just finished
        completed_level: u32,
        /// Level coming up
        next_level: u32,
    },

    /// A fresh layout was laid out
    LevelStarted {
        /// Current level
        level: u32,
        /// Enemies placed
        enemy_count: u32,
    },

    /// Out of lives
    GameOver {
        /// Final score
        score: u32,
        /// Level reached
        level: u32,
        /// Run length in seconds
        duration_secs: u64,
        /// Whether the score made the table (`None` if saving failed)
        high_score: Option<bool>,
    },

    /// Top-level phase changed
    PhaseChanged {
        /// Previous phase
        from: GamePhase,
        /// New phase
        to: GamePhase,
    },
}

/// A game event stamped with its tick.
///
/// Events come out of a tick in the order they happened.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, data: GameEventData) -> Self {
        Self { tick, data }
    }

    /// Create food eaten event.
    pub fn food_eaten(tick: u32, position: Coord, points: u32, new_score: u32) -> Self {
        Self::new(tick, GameEventData::FoodEaten { position, points, new_score })
    }

    /// Create bonus collected event.
    pub fn bonus_collected(tick: u32, bonus_type: BonusType, position: Coord, value: u32) -> Self {
        Self::new(tick, GameEventData::BonusCollected { bonus_type, position, value })
    }

    /// Create bonus spawned event.
    pub fn bonus_spawned(tick: u32, bonus_type: BonusType, position: Coord) -> Self {
        Self::new(tick, GameEventData::BonusSpawned { bonus_type, position })
    }

    /// Create bonus expired event.
    pub fn bonus_expired(tick: u32, bonus_type: BonusType, position: Coord) -> Self {
        Self::new(tick, GameEventData::BonusExpired { bonus_type, position })
    }

    /// Create shield absorbed event.
    pub fn shield_absorbed(tick: u32, cause: CollisionCause) -> Self {
        Self::new(tick, GameEventData::ShieldAbsorbed { cause })
    }

    /// Create player hit event.
    pub fn player_hit(tick: u32, cause: CollisionCause, lives_left: u32) -> Self {
        Self::new(tick, GameEventData::PlayerHit { cause, lives_left })
    }

    /// Create level completed event.
    pub fn level_completed(tick: u32, completed_level: u32, next_level: u32) -> Self {
        Self::new(tick, GameEventData::LevelCompleted { completed_level, next_level })
    }

    /// Create level started event.
    pub fn level_started(tick: u32, level: u32, enemy_count: u32) -> Self {
        Self::new(tick, GameEventData::LevelStarted { level, enemy_count })
    }

    /// Create game over event.
    pub fn game_over(
        tick: u32,
        score: u32,
        level: u32,
        duration_secs: u64,
        high_score: Option<bool>,
    ) -> Self {
        Self::new(tick, GameEventData::GameOver { score, level, duration_secs, high_score })
    }

    /// Create phase changed event.
    pub fn phase_changed(tick: u32, from: GamePhase, to: GamePhase) -> Self {
        Self::new(tick, GameEventData::PhaseChanged { from, to })
    }

    /// Sound to play for this event, if any.
    ///
    /// The final hit of a run plays `game_over` instead of `hit`.
    pub fn audio_cue(&self) -> Option<AudioCue> {
        match &self.data {
            GameEventData::FoodEaten { .. } => Some(AudioCue::Eat),
            GameEventData::BonusCollected { .. } => Some(AudioCue::Bonus),
            GameEventData::PlayerHit { lives_left, .. } if *lives_left > 0 => Some(AudioCue::Hit),
            GameEventData::LevelCompleted { .. } => Some(AudioCue::LevelUp),
            GameEventData::GameOver { .. } => Some(AudioCue::GameOver),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_compare_by_content() {
        let hit = GameEvent::player_hit(10, CollisionCause::Wall, 2);
        assert_eq!(hit, GameEvent::player_hit(10, CollisionCause::Wall, 2));
        assert_ne!(hit, GameEvent::player_hit(10, CollisionCause::Enemy, 2));
        assert_ne!(hit, GameEvent::player_hit(11, CollisionCause::Wall, 2));
        assert_ne!(hit, GameEvent::food_eaten(10, Coord::new(1, 1), 10, 100));
    }

    #[test]
    fn test_audio_cues() {
        let cue = |e: GameEvent| e.audio_cue();

        assert_eq!(cue(GameEvent::food_eaten(1, Coord::new(0, 0), 10, 10)), Some(AudioCue::Eat));
        assert_eq!(
            cue(GameEvent::bonus_collected(1, BonusType::Life, Coord::new(0, 0), 1)),
            Some(AudioCue::Bonus)
        );
        assert_eq!(cue(GameEvent::player_hit(1, CollisionCause::Enemy, 2)), Some(AudioCue::Hit));
        assert_eq!(cue(GameEvent::player_hit(1, CollisionCause::Enemy, 0)), None);
        assert_eq!(cue(GameEvent::level_completed(1, 1, 2)), Some(AudioCue::LevelUp));
        assert_eq!(cue(GameEvent::game_over(1, 0, 1, 0, None)), Some(AudioCue::GameOver));
        assert_eq!(cue(GameEvent::level_started(1, 2, 3)), None);
    }

    #[test]
    fn test_cue_names() {
        assert_eq!(AudioCue::Eat.name(), "eat");
        assert_eq!(AudioCue::Bonus.name(), "bonus");
        assert_eq!(AudioCue::LevelUp.name(), "level_up");
        assert_eq!(AudioCue::GameOver.name(), "game_over");
        assert_eq!(AudioCue::Hit.name(), "hit");
    }
}
