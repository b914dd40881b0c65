//! Game State Definitions
//!
//! Entity types for one run: the player, enemies, food and bonuses, plus
//! the top-level phase. Collections iterate in a fixed order so a seeded
//! run replays identically.

use std::collections::BTreeSet;
use std::time::Duration;
use serde::{Serialize, Deserialize};

use crate::core::grid::{Coord, Grid};
use crate::core::hash::StateHasher;
use crate::game::body::Body;

// =============================================================================
// GAME PHASE
// =============================================================================

/// Top-level state of the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum GamePhase {
    /// Title menu
    #[default]
    Menu,
    /// Simulation running
    Playing,
    /// Simulation frozen by the player
    Paused,
    /// Between levels, waiting for the next layout
    LevelComplete,
    /// Out of lives
    GameOver,
    /// High-score table
    HighScores,
}

impl GamePhase {
    /// Stable lowercase name (for logs and UI lookups).
    pub fn name(self) -> &'static str {
        match self {
            GamePhase::Menu => "menu",
            GamePhase::Playing => "playing",
            GamePhase::Paused => "paused",
            GamePhase::LevelComplete => "level_complete",
            GamePhase::GameOver => "game_over",
            GamePhase::HighScores => "high_scores",
        }
    }
}

// =============================================================================
// PLAYER
// =============================================================================

/// The player-controlled snake.
///
/// Score lives in [`crate::game::progression::Progression`]; the player
/// only carries what a layout reset must preserve or clear.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    /// Snake body
    pub body: Body,

    /// Remaining lives
    pub lives: u32,

    /// Shield expiry on the simulation clock (`None` = no shield)
    pub shield_until: Option<Duration>,

    /// Speed boost expiry on the simulation clock
    pub speed_boost_until: Option<Duration>,
}

impl Player {
    /// Create a player with a fresh body.
    pub fn new(body: Body, lives: u32) -> Self {
        Self {
            body,
            lives,
            shield_until: None,
            speed_boost_until: None,
        }
    }

    /// Check if a shield is up.
    #[inline]
    pub fn is_shielded(&self) -> bool {
        self.shield_until.is_some()
    }

    /// Check if the speed boost is running.
    #[inline]
    pub fn is_boosted(&self) -> bool {
        self.speed_boost_until.is_some()
    }

    /// Raise the shield until `now + duration`.
    pub fn activate_shield(&mut self, now: Duration, duration: Duration) {
        self.shield_until = Some(now + duration);
    }

    /// Drop the shield after it absorbed a hit.
    pub fn consume_shield(&mut self) {
        self.shield_until = None;
    }

    /// Start (or refresh) the speed boost.
    pub fn activate_speed_boost(&mut self, now: Duration, duration: Duration) {
        self.speed_boost_until = Some(now + duration);
    }

    /// Expire timed effects.
    pub fn update_timers(&mut self, now: Duration) {
        if self.shield_until.is_some_and(|until| now >= until) {
            self.shield_until = None;
        }
        if self.speed_boost_until.is_some_and(|until| now >= until) {
            self.speed_boost_until = None;
        }
    }

    /// Lose a life. Returns true while lives remain.
    pub fn lose_life(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        self.lives > 0
    }

    /// Hash this player's state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        self.body.hash_into(hasher);
        hasher.update_u32(self.lives);
        hasher.update_opt_duration(self.shield_until);
        hasher.update_opt_duration(self.speed_boost_until);
    }
}

// =============================================================================
// ENEMY
// =============================================================================

/// AI-controlled snake.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Enemy {
    /// Stable id for the run (keys the AI behavior map)
    pub id: u32,

    /// Snake body
    pub body: Body,

    /// Steps taken per tick (1 = normal, 2 = fast)
    pub speed: u8,

    /// Palette slot for the renderer
    pub color_index: u8,
}

impl Enemy {
    /// Number of palette slots renderers are expected to provide.
    pub const PALETTE_SIZE: u8 = 8;

    /// Create an enemy.
    pub fn new(id: u32, body: Body, speed: u8) -> Self {
        Self {
            id,
            body,
            speed: speed.max(1),
            color_index: (id % Self::PALETTE_SIZE as u32) as u8,
        }
    }
}

// =============================================================================
// BONUS
// =============================================================================

/// Kind of bonus pickup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BonusType {
    /// One extra life
    Life = 0,
    /// Temporary faster ticks
    Speed = 1,
    /// Absorbs one collision
    Shield = 2,
    /// Flat score
    Points = 3,
}

impl BonusType {
    /// All bonus types, spawn-table order.
    pub const ALL: [BonusType; 4] = [
        BonusType::Life,
        BonusType::Speed,
        BonusType::Shield,
        BonusType::Points,
    ];

    /// Value attached to a freshly spawned bonus.
    pub fn value(self, bonus_points: u32) -> u32 {
        match self {
            BonusType::Life => 1,
            BonusType::Points => bonus_points,
            BonusType::Speed | BonusType::Shield => 0,
        }
    }

    /// Get from index.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(BonusType::Life),
            1 => Some(BonusType::Speed),
            2 => Some(BonusType::Shield),
            3 => Some(BonusType::Points),
            _ => None,
        }
    }
}

/// A time-limited pickup on the grid.
///
/// Expiry and collection are independent: an expired bonus is inactive
/// whether or not anyone reached it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bonus {
    /// Tile
    pub position: Coord,

    /// Effect
    pub bonus_type: BonusType,

    /// Spawn time on the simulation clock
    pub created_at: Duration,

    /// Time to live
    pub lifetime: Duration,

    /// Cleared once the lifetime elapses
    pub active: bool,

    /// Lives or points granted (type-specific)
    pub value: u32,
}

impl Bonus {
    /// Create an active bonus.
    pub fn new(
        position: Coord,
        bonus_type: BonusType,
        created_at: Duration,
        lifetime: Duration,
        value: u32,
    ) -> Self {
        Self {
            position,
            bonus_type,
            created_at,
            lifetime,
            active: true,
            value,
        }
    }

    /// Deactivate once `now - created_at > lifetime`.
    pub fn update(&mut self, now: Duration) {
        if self.active && now.saturating_sub(self.created_at) > self.lifetime {
            self.active = false;
        }
    }

    /// Time left before expiry.
    pub fn remaining(&self, now: Duration) -> Duration {
        (self.created_at + self.lifetime).saturating_sub(now)
    }
}

// =============================================================================
// WORLD
// =============================================================================

/// Everything on the grid for the current layout.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct World {
    /// Playfield bounds
    pub grid: Grid,

    /// The player
    pub player: Player,

    /// Enemies in id order
    pub enemies: Vec<Enemy>,

    /// Current food tile
    pub food: Coord,

    /// Bonuses still on the field
    pub bonuses: Vec<Bonus>,
}

impl World {
    /// Every tile a new pickup must avoid: snakes, food and live bonuses.
    pub fn occupied(&self) -> BTreeSet<Coord> {
        let mut occupied: BTreeSet<Coord> = self.player.body.segments().iter().copied().collect();
        for enemy in &self.enemies {
            occupied.extend(enemy.body.segments().iter().copied());
        }
        occupied.insert(self.food);
        occupied.extend(self.bonuses.iter().filter(|b| b.active).map(|b| b.position));
        occupied
    }

    /// Check if any enemy body covers `cell`.
    pub fn enemy_at(&self, cell: Coord) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.body.occupies(cell))
    }

    /// Count of bonuses that are still active.
    pub fn active_bonus_count(&self) -> usize {
        self.bonuses.iter().filter(|b| b.active).count()
    }

    /// Hash the layout for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        self.player.hash_into(hasher);

        hasher.update_u32(self.enemies.len() as u32);
        for enemy in &self.enemies {
            hasher.update_u32(enemy.id);
            enemy.body.hash_into(hasher);
            hasher.update_u8(enemy.speed);
        }

        hasher.update_coord(self.food);

        hasher.update_u32(self.bonuses.len() as u32);
        for bonus in &self.bonuses {
            hasher.update_coord(bonus.position);
            hasher.update_u8(bonus.bonus_type as u8);
            hasher.update_bool(bonus.active);
            hasher.update_duration(bonus.created_at);
            hasher.update_duration(bonus.lifetime);
            hasher.update_u32(bonus.value);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::Direction;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_bonus_expiry() {
        let mut bonus = Bonus::new(Coord::new(1, 1), BonusType::Points, ms(1000), ms(500), 100);

        bonus.update(ms(1500));
        assert!(bonus.active, "exactly at lifetime is still active");

        bonus.update(ms(1501));
        assert!(!bonus.active);
        assert_eq!(bonus.remaining(ms(1600)), Duration::ZERO);
    }

    #[test]
    fn test_bonus_values() {
        assert_eq!(BonusType::Life.value(100), 1);
        assert_eq!(BonusType::Points.value(100), 100);
        assert_eq!(BonusType::Speed.value(100), 0);
        assert_eq!(BonusType::Shield.value(100), 0);
        for t in BonusType::ALL {
            assert_eq!(BonusType::from_index(t as u8), Some(t));
        }
    }

    #[test]
    fn test_player_timers() {
        let body = Body::new(Coord::new(5, 5), Direction::Right, 3);
        let mut player = Player::new(body, 3);

        player.activate_shield(ms(0), ms(100));
        player.activate_speed_boost(ms(0), ms(50));
        assert!(player.is_shielded());
        assert!(player.is_boosted());

        player.update_timers(ms(60));
        assert!(player.is_shielded());
        assert!(!player.is_boosted());

        player.update_timers(ms(100));
        assert!(!player.is_shielded());
    }

    #[test]
    fn test_lose_life() {
        let body = Body::new(Coord::new(5, 5), Direction::Right, 3);
        let mut player = Player::new(body, 2);
        assert!(player.lose_life());
        assert!(!player.lose_life());
        assert!(!player.lose_life());
        assert_eq!(player.lives, 0);
    }

    #[test]
    fn test_occupied_includes_everything_live() {
        let body = Body::new(Coord::new(5, 5), Direction::Right, 3);
        let enemy = Enemy::new(1, Body::new(Coord::new(10, 10), Direction::Up, 2), 1);
        let mut expired = Bonus::new(Coord::new(0, 0), BonusType::Life, ms(0), ms(10), 1);
        expired.active = false;
        let live = Bonus::new(Coord::new(0, 1), BonusType::Life, ms(0), ms(10), 1);

        let world = World {
            grid: Grid::new(16, 16),
            player: Player::new(body, 3),
            enemies: vec![enemy],
            food: Coord::new(7, 7),
            bonuses: vec![expired, live],
        };

        let occupied = world.occupied();
        assert_eq!(occupied.len(), 3 + 2 + 1 + 1);
        assert!(occupied.contains(&Coord::new(10, 11)));
        assert!(occupied.contains(&Coord::new(0, 1)));
        assert!(!occupied.contains(&Coord::new(0, 0)));
        assert_eq!(world.enemy_at(Coord::new(10, 11)).map(|e| e.id), Some(1));
        assert_eq!(world.active_bonus_count(), 1);
    }

    #[test]
    fn test_enemy_color_wraps_palette() {
        let body = Body::new(Coord::new(5, 5), Direction::Right, 3);
        assert_eq!(Enemy::new(3, body.clone(), 1).color_index, 3);
        assert_eq!(Enemy::new(11, body.clone(), 1).color_index, 3);
        assert_eq!(Enemy::new(1, body, 0).speed, 1);
    }
}
