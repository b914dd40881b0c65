//! Level Progression
//!
//! Score, level, tick interval and enemy count for one run. Thresholds and
//! enemy counts come from ascending tables; levels past the end of a table
//! reuse its last entry.

use std::time::Duration;
use serde::{Serialize, Deserialize};

use crate::config::GameConfig;
use crate::core::hash::StateHasher;

/// What changed when a level was completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    /// Level just finished
    pub completed_level: u32,
    /// New current level
    pub level: u32,
    /// Tick interval for the new level
    pub tick_interval: Duration,
    /// Enemies to lay out on the new level
    pub enemy_count: u32,
}

/// Run-wide score and level state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Progression {
    level: u32,
    score: u32,
    level_score: u32,
    tick_interval: Duration,
    enemy_count: u32,

    thresholds: Vec<u32>,
    enemies_per_level: Vec<u32>,
    speed_increment: Duration,
    min_interval: Duration,
    boost_percent: u32,
}

/// Table entry for a 1-based level, clamped to the last entry.
fn table_value(table: &[u32], level: u32) -> u32 {
    let index = level.saturating_sub(1) as usize;
    table
        .get(index)
        .or_else(|| table.last())
        .copied()
        .unwrap_or(0)
}

impl Progression {
    /// Level 1, score 0, the configured starting interval.
    pub fn new(config: &GameConfig) -> Self {
        Self {
            level: 1,
            score: 0,
            level_score: 0,
            tick_interval: config.initial_tick_interval().max(config.min_tick_interval()),
            enemy_count: table_value(&config.enemies_per_level, 1),
            thresholds: config.level_thresholds.clone(),
            enemies_per_level: config.enemies_per_level.clone(),
            speed_increment: config.speed_increment(),
            min_interval: config.min_tick_interval(),
            boost_percent: config.speed_boost_interval_percent,
        }
    }

    /// Add to both the run score and the level score. Returns the new run
    /// score.
    pub fn add_points(&mut self, points: u32) -> u32 {
        self.score = self.score.saturating_add(points);
        self.level_score = self.level_score.saturating_add(points);
        self.score
    }

    /// Level score needed to finish the current level.
    pub fn threshold(&self) -> u32 {
        table_value(&self.thresholds, self.level)
    }

    /// Check if the current level's threshold is reached.
    pub fn is_level_complete(&self) -> bool {
        self.level_score >= self.threshold()
    }

    /// Move to the next level: faster ticks, new enemy count, level score
    /// back to zero.
    pub fn advance(&mut self) -> LevelUp {
        let completed_level = self.level;
        self.level += 1;
        self.level_score = 0;
        self.tick_interval = self
            .tick_interval
            .saturating_sub(self.speed_increment)
            .max(self.min_interval);
        self.enemy_count = table_value(&self.enemies_per_level, self.level);

        LevelUp {
            completed_level,
            level: self.level,
            tick_interval: self.tick_interval,
            enemy_count: self.enemy_count,
        }
    }

    /// Share of the threshold reached, in `[0, 1]`.
    pub fn progress_fraction(&self) -> f32 {
        let threshold = self.threshold();
        if threshold == 0 {
            return 1.0;
        }
        (self.level_score as f32 / threshold as f32).min(1.0)
    }

    /// Interval between ticks on this level.
    #[inline]
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Interval actually used, shortened while a speed boost runs.
    pub fn effective_interval(&self, boosted: bool) -> Duration {
        if !boosted {
            return self.tick_interval;
        }
        (self.tick_interval * self.boost_percent / 100).max(self.min_interval)
    }

    /// Enemies per layout on this level.
    #[inline]
    pub fn enemy_count(&self) -> u32 {
        self.enemy_count
    }

    /// Current level (1-based).
    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Run score.
    #[inline]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Score earned on the current level.
    #[inline]
    pub fn level_score(&self) -> u32 {
        self.level_score
    }

    /// Hash progression state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.level);
        hasher.update_u32(self.score);
        hasher.update_u32(self.level_score);
        hasher.update_u64(self.tick_interval.as_millis() as u64);
        hasher.update_u32(self.enemy_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_starts_at_level_one() {
        let config = GameConfig::default();
        let p = Progression::new(&config);
        assert_eq!(p.level(), 1);
        assert_eq!(p.score(), 0);
        assert_eq!(p.threshold(), 100);
        assert_eq!(p.enemy_count(), 1);
        assert_eq!(p.tick_interval(), ms(150));
    }

    #[test]
    fn test_level_complete_and_advance() {
        let config = GameConfig::default();
        let mut p = Progression::new(&config);

        for _ in 0..9 {
            p.add_points(10);
        }
        assert!(!p.is_level_complete());
        assert_eq!(p.add_points(10), 100);
        assert!(p.is_level_complete());

        let up = p.advance();
        assert_eq!(up.completed_level, 1);
        assert_eq!(up.level, 2);
        assert_eq!(up.tick_interval, ms(140));
        assert_eq!(up.enemy_count, 2);
        assert_eq!(p.level_score(), 0);
        assert_eq!(p.score(), 100);
        assert!(!p.is_level_complete());
        assert_eq!(p.threshold(), 150);
    }

    #[test]
    fn test_tables_clamp_to_last_entry() {
        let config = GameConfig {
            level_thresholds: vec![10, 20],
            enemies_per_level: vec![1, 3],
            ..GameConfig::default()
        };
        let mut p = Progression::new(&config);
        for _ in 0..5 {
            p.advance();
        }
        assert_eq!(p.level(), 6);
        assert_eq!(p.threshold(), 20);
        assert_eq!(p.enemy_count(), 3);
    }

    #[test]
    fn test_interval_floor() {
        let config = GameConfig {
            initial_tick_interval_ms: 70,
            speed_increment_ms: 15,
            min_tick_interval_ms: 50,
            ..GameConfig::default()
        };
        let mut p = Progression::new(&config);
        assert_eq!(p.advance().tick_interval, ms(55));
        assert_eq!(p.advance().tick_interval, ms(50));
        assert_eq!(p.advance().tick_interval, ms(50));
    }

    #[test]
    fn test_boosted_interval() {
        let config = GameConfig::default();
        let p = Progression::new(&config);
        assert_eq!(p.effective_interval(false), ms(150));
        assert_eq!(p.effective_interval(true), ms(90));

        let slow_floor = GameConfig {
            initial_tick_interval_ms: 60,
            ..GameConfig::default()
        };
        let p = Progression::new(&slow_floor);
        assert_eq!(p.effective_interval(true), ms(50));
    }

    #[test]
    fn test_progress_fraction() {
        let config = GameConfig::default();
        let mut p = Progression::new(&config);
        assert_eq!(p.progress_fraction(), 0.0);
        p.add_points(50);
        assert!((p.progress_fraction() - 0.5).abs() < f32::EPSILON);
        p.add_points(500);
        assert_eq!(p.progress_fraction(), 1.0);
    }
}
