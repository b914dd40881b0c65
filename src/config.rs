//! Game Configuration
//!
//! Every tunable of the simulation lives in [`GameConfig`]. Defaults match
//! the classic ruleset; a JSON file can override any subset of fields.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::grid::{Coord, Direction, Grid};

/// Smallest grid the spawner can lay out a player and an enemy on.
pub const MIN_GRID_SIDE: u32 = 8;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Grid is too small to play on.
    #[error("grid {width}x{height} is smaller than {MIN_GRID_SIDE}x{MIN_GRID_SIDE}")]
    GridTooSmall {
        /// Configured width
        width: u32,
        /// Configured height
        height: u32,
    },

    /// A per-level table is empty.
    #[error("table `{0}` must not be empty")]
    EmptyTable(&'static str),

    /// A field that must be positive is zero.
    #[error("`{0}` must be greater than zero")]
    Zero(&'static str),

    /// The tick interval floor is above the starting interval.
    #[error("min tick interval {min_ms}ms exceeds initial interval {initial_ms}ms")]
    IntervalFloor {
        /// Floor
        min_ms: u64,
        /// Starting interval
        initial_ms: u64,
    },

    /// The starting snake does not fit.
    #[error("player start {start:?} with length {length} does not fit the grid")]
    PlayerStart {
        /// Configured head position
        start: Coord,
        /// Configured length
        length: usize,
    },
}

/// Simulation tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Playfield columns
    pub grid_width: u32,
    /// Playfield rows
    pub grid_height: u32,

    /// Lives at the start of a run
    pub initial_lives: u32,
    /// Player head at each layout reset
    pub player_start: Coord,
    /// Player heading at each layout reset
    pub player_direction: Direction,
    /// Player segment count at each layout reset
    pub initial_snake_length: usize,

    /// Tick interval on level 1 (ms)
    pub initial_tick_interval_ms: u64,
    /// Interval reduction per level (ms)
    pub speed_increment_ms: u64,
    /// Interval floor (ms)
    pub min_tick_interval_ms: u64,

    /// Score per food
    pub points_per_fruit: u32,
    /// Level-local score needed to finish each level; last entry repeats
    pub level_thresholds: Vec<u32>,
    /// Enemies per level; last entry repeats
    pub enemies_per_level: Vec<u32>,
    /// Pause between level complete and the next layout (ms)
    pub level_delay_ms: u64,

    /// Enemy segment count
    pub enemy_length: usize,
    /// Minimum Manhattan distance between an enemy head and the player head
    pub enemy_spawn_clearance: u32,
    /// First level on which even-id enemies move two steps per tick
    pub fast_enemies_from_level: u32,
    /// Patrol enemies turn randomly with probability 1/n per step
    pub patrol_turn_one_in: u32,

    /// Bonus lifetime (ms)
    pub bonus_lifetime_ms: u64,
    /// Each tick spawns a bonus with probability 1/n (0 disables bonuses)
    pub bonus_spawn_one_in: u32,
    /// Cap on simultaneously active bonuses
    pub max_active_bonuses: usize,
    /// Score granted by a Points bonus
    pub bonus_points: u32,
    /// Shield duration (ms)
    pub shield_duration_ms: u64,
    /// Speed boost duration (ms)
    pub speed_boost_duration_ms: u64,
    /// Tick interval while boosted, as a percentage of the level interval
    pub speed_boost_interval_percent: u32,

    /// Where the binary keeps the high-score table
    pub high_score_file: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 32,
            grid_height: 24,
            initial_lives: 3,
            player_start: Coord::new(5, 5),
            player_direction: Direction::Right,
            initial_snake_length: 3,
            initial_tick_interval_ms: 150,
            speed_increment_ms: 10,
            min_tick_interval_ms: 50,
            points_per_fruit: 10,
            level_thresholds: vec![100, 150, 200, 250, 300, 400],
            enemies_per_level: vec![1, 2, 3, 4, 5, 6],
            level_delay_ms: 2000,
            enemy_length: 3,
            enemy_spawn_clearance: 6,
            fast_enemies_from_level: 4,
            patrol_turn_one_in: 10,
            bonus_lifetime_ms: 10_000,
            bonus_spawn_one_in: 60,
            max_active_bonuses: 1,
            bonus_points: 100,
            shield_duration_ms: 10_000,
            speed_boost_duration_ms: 5_000,
            speed_boost_interval_percent: 60,
            high_score_file: PathBuf::from("data/highscores.json"),
        }
    }
}

impl GameConfig {
    /// Load from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width < MIN_GRID_SIDE || self.grid_height < MIN_GRID_SIDE {
            return Err(ConfigError::GridTooSmall {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        if self.level_thresholds.is_empty() {
            return Err(ConfigError::EmptyTable("level_thresholds"));
        }
        if self.level_thresholds.contains(&0) {
            return Err(ConfigError::Zero("level_thresholds"));
        }
        if self.enemies_per_level.is_empty() {
            return Err(ConfigError::EmptyTable("enemies_per_level"));
        }
        if self.initial_lives == 0 {
            return Err(ConfigError::Zero("initial_lives"));
        }
        if self.initial_snake_length == 0 {
            return Err(ConfigError::Zero("initial_snake_length"));
        }
        if self.enemy_length == 0 {
            return Err(ConfigError::Zero("enemy_length"));
        }
        if self.min_tick_interval_ms == 0 {
            return Err(ConfigError::Zero("min_tick_interval_ms"));
        }
        if self.min_tick_interval_ms > self.initial_tick_interval_ms {
            return Err(ConfigError::IntervalFloor {
                min_ms: self.min_tick_interval_ms,
                initial_ms: self.initial_tick_interval_ms,
            });
        }

        // The tail trails opposite to the heading.
        let grid = self.grid();
        let back = self.player_direction.opposite();
        let mut cell = self.player_start;
        for _ in 0..self.initial_snake_length {
            if !grid.contains(cell) {
                return Err(ConfigError::PlayerStart {
                    start: self.player_start,
                    length: self.initial_snake_length,
                });
            }
            cell = cell.step(back);
        }
        Ok(())
    }

    /// Playfield.
    pub fn grid(&self) -> Grid {
        Grid::new(self.grid_width, self.grid_height)
    }

    /// Tick interval on level 1.
    pub fn initial_tick_interval(&self) -> Duration {
        Duration::from_millis(self.initial_tick_interval_ms)
    }

    /// Interval reduction per level.
    pub fn speed_increment(&self) -> Duration {
        Duration::from_millis(self.speed_increment_ms)
    }

    /// Interval floor.
    pub fn min_tick_interval(&self) -> Duration {
        Duration::from_millis(self.min_tick_interval_ms)
    }

    /// Level-complete pause.
    pub fn level_delay(&self) -> Duration {
        Duration::from_millis(self.level_delay_ms)
    }

    /// Bonus lifetime.
    pub fn bonus_lifetime(&self) -> Duration {
        Duration::from_millis(self.bonus_lifetime_ms)
    }

    /// Shield duration.
    pub fn shield_duration(&self) -> Duration {
        Duration::from_millis(self.shield_duration_ms)
    }

    /// Speed boost duration.
    pub fn speed_boost_duration(&self) -> Duration {
        Duration::from_millis(self.speed_boost_duration_ms)
    }
}
