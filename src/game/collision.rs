//! Collision Detection and Resolution
//!
//! Runs once per tick after every body has moved. Detection is pure; the
//! resolver applies the outcome to the world and the score.
//!
//! Precedence is fixed:
//!
//! 1. head off the grid (a shield does not help)
//! 2. head on its own body
//! 3. head on any enemy tile
//! 4. head on the food
//! 5. head on an active bonus
//!
//! A shield absorbs the first of 2 or 3 and the rest of the fatal checks
//! are skipped for that tick. Any fatal hit skips 4 and 5.

use std::time::Duration;
use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::config::GameConfig;
use crate::core::rng::DeterministicRng;
use crate::game::events::GameEvent;
use crate::game::progression::Progression;
use crate::game::spawn::place_food;
use crate::game::state::{BonusType, World};

/// What the player ran into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionCause {
    /// Left the grid
    Wall,
    /// Bit its own body
    SelfBody,
    /// Touched an enemy
    Enemy,
}

impl CollisionCause {
    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            CollisionCause::Wall => "wall",
            CollisionCause::SelfBody => "self",
            CollisionCause::Enemy => "enemy",
        }
    }
}

/// Everything the player's head touched this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionReport {
    /// Hit that costs a life
    pub fatal: Option<CollisionCause>,
    /// Hit the shield took instead
    pub absorbed: Option<CollisionCause>,
    /// Head is on the food
    pub food: bool,
    /// Index into `World::bonuses` of an active bonus under the head
    pub bonus: Option<usize>,
}

/// Inspect the world after movement. Does not mutate anything.
pub fn detect(world: &World) -> CollisionReport {
    let player = &world.player;
    let head = player.body.head();
    let mut report = CollisionReport::default();

    if !world.grid.contains(head) {
        report.fatal = Some(CollisionCause::Wall);
        return report;
    }

    let threat = if player.body.self_collision() {
        Some(CollisionCause::SelfBody)
    } else if world.enemy_at(head).is_some() {
        Some(CollisionCause::Enemy)
    } else {
        None
    };

    match threat {
        Some(cause) if player.is_shielded() => report.absorbed = Some(cause),
        Some(cause) => {
            report.fatal = Some(cause);
            return report;
        }
        None => {}
    }

    report.food = head == world.food;
    report.bonus = world
        .bonuses
        .iter()
        .position(|b| b.active && b.position == head);
    report
}

/// Apply this tick's collisions.
///
/// Returns the fatal cause, if any; losing the life is up to the caller.
#[allow(clippy::too_many_arguments)]
pub fn resolve(
    world: &mut World,
    progression: &mut Progression,
    config: &GameConfig,
    rng: &mut DeterministicRng,
    now: Duration,
    tick: u32,
    events: &mut Vec<GameEvent>,
) -> Option<CollisionCause> {
    let report = detect(world);

    if let Some(cause) = report.fatal {
        return Some(cause);
    }

    if let Some(cause) = report.absorbed {
        debug!("shield absorbed {} collision at tick {}", cause.name(), tick);
        world.player.consume_shield();
        events.push(GameEvent::shield_absorbed(tick, cause));
    }

    if report.food {
        let eaten_at = world.food;
        world.player.body.grow();
        let new_score = progression.add_points(config.points_per_fruit);

        let occupied = world.occupied();
        if let Some(cell) = place_food(&world.grid, &occupied, rng) {
            world.food = cell;
        }
        events.push(GameEvent::food_eaten(tick, eaten_at, config.points_per_fruit, new_score));
    }

    if let Some(index) = report.bonus {
        let bonus = world.bonuses.remove(index);
        match bonus.bonus_type {
            BonusType::Life => {
                world.player.lives = world.player.lives.saturating_add(bonus.value);
            }
            BonusType::Speed => {
                world.player.activate_speed_boost(now, config.speed_boost_duration());
            }
            BonusType::Shield => {
                world.player.activate_shield(now, config.shield_duration());
            }
            BonusType::Points => {
                progression.add_points(bonus.value);
            }
        }
        events.push(GameEvent::bonus_collected(
            tick,
            bonus.bonus_type,
            bonus.position,
            bonus.value,
        ));
    }

    None
}

// =============================================================================
// TESTS
// =============================================================================
