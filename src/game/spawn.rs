//! Food, Bonus and Layout Spawning
//!
//! Placement avoids every occupied tile and gives up after a bounded number
//! of attempts. Failing to place is not an error: food stays where it was,
//! a bonus simply does not appear, an enemy is left out of the layout.

use std::collections::BTreeSet;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::GameConfig;
use crate::core::grid::{Coord, Direction, Grid};
use crate::core::rng::DeterministicRng;
use crate::game::body::Body;
use crate::game::events::GameEvent;
use crate::game::state::{Bonus, BonusType, Enemy, Player, World};

/// Random draws per placement before giving up.
pub const PLACEMENT_ATTEMPTS: u32 = 100;

/// Pick a free tile, or `None` if every attempt hit an occupied one.
pub fn find_free_cell(
    grid: &Grid,
    occupied: &BTreeSet<Coord>,
    rng: &mut DeterministicRng,
) -> Option<Coord> {
    (0..PLACEMENT_ATTEMPTS)
        .map(|_| rng.random_cell(grid))
        .find(|cell| !occupied.contains(cell))
}

/// Choose a new food tile.
///
/// `None` means the caller keeps the previous position.
pub fn place_food(
    grid: &Grid,
    occupied: &BTreeSet<Coord>,
    rng: &mut DeterministicRng,
) -> Option<Coord> {
    let cell = find_free_cell(grid, occupied, rng);
    if cell.is_none() {
        debug!("food placement exhausted {} attempts", PLACEMENT_ATTEMPTS);
    }
    cell
}

/// Uniformly random bonus type.
pub fn random_bonus_type(rng: &mut DeterministicRng) -> BonusType {
    *rng.choose(&BonusType::ALL).unwrap_or(&BonusType::Points)
}

/// Create a bonus on a free tile.
pub fn spawn_bonus(
    grid: &Grid,
    occupied: &BTreeSet<Coord>,
    rng: &mut DeterministicRng,
    now: Duration,
    config: &GameConfig,
) -> Option<Bonus> {
    let bonus_type = random_bonus_type(rng);
    let position = find_free_cell(grid, occupied, rng)?;
    Some(Bonus::new(
        position,
        bonus_type,
        now,
        config.bonus_lifetime(),
        bonus_type.value(config.bonus_points),
    ))
}

/// Roll for a new bonus this tick.
pub fn maybe_spawn_bonus(
    world: &mut World,
    config: &GameConfig,
    rng: &mut DeterministicRng,
    now: Duration,
    tick: u32,
) -> Option<GameEvent> {
    if world.active_bonus_count() >= config.max_active_bonuses {
        return None;
    }
    if !rng.one_in(config.bonus_spawn_one_in) {
        return None;
    }

    let occupied = world.occupied();
    let bonus = spawn_bonus(&world.grid, &occupied, rng, now, config)?;
    let event = GameEvent::bonus_spawned(tick, bonus.bonus_type, bonus.position);
    world.bonuses.push(bonus);
    Some(event)
}

/// Drop bonuses whose lifetime ran out.
pub fn expire_bonuses(world: &mut World, now: Duration, tick: u32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for bonus in &mut world.bonuses {
        bonus.update(now);
        if !bonus.active {
            events.push(GameEvent::bonus_expired(tick, bonus.bonus_type, bonus.position));
        }
    }
    world.bonuses.retain(|b| b.active);
    events
}

/// Try to lay a straight enemy on free tiles away from the player.
fn place_enemy(
    id: u32,
    grid: &Grid,
    occupied: &BTreeSet<Coord>,
    player_head: Coord,
    config: &GameConfig,
    level: u32,
    rng: &mut DeterministicRng,
) -> Option<Enemy> {
    for _ in 0..PLACEMENT_ATTEMPTS {
        let head = rng.random_cell(grid);
        if head.manhattan(player_head) < config.enemy_spawn_clearance {
            continue;
        }
        let direction = Direction::from_index(rng.next_int(4) as u8).unwrap_or_default();
        let body = Body::new(head, direction, config.enemy_length);
        let fits = body
            .segments()
            .iter()
            .all(|c| grid.contains(*c) && !occupied.contains(c));
        if !fits {
            continue;
        }

        let fast = level >= config.fast_enemies_from_level && id % 2 == 0;
        return Some(Enemy::new(id, body, if fast { 2 } else { 1 }));
    }
    None
}

/// Build a fresh layout: player at its start, `enemy_count` enemies with
/// ids `1..=enemy_count`, then food.
pub fn build_world(
    config: &GameConfig,
    level: u32,
    enemy_count: u32,
    lives: u32,
    rng: &mut DeterministicRng,
) -> World {
    let grid = config.grid();
    let body = Body::new(
        config.player_start,
        config.player_direction,
        config.initial_snake_length,
    );
    let player = Player::new(body, lives);
    let player_head = player.body.head();

    let mut occupied: BTreeSet<Coord> = player.body.segments().iter().copied().collect();
    // Keep the tile in front of the player clear.
    occupied.insert(player.body.next_head());

    let mut enemies = Vec::with_capacity(enemy_count as usize);
    for id in 1..=enemy_count {
        match place_enemy(id, &grid, &occupied, player_head, config, level, rng) {
            Some(enemy) => {
                occupied.extend(enemy.body.segments().iter().copied());
                enemies.push(enemy);
            }
            None => warn!("could not place enemy {} on level {}", id, level),
        }
    }

    // The grid is never full here, but fall back to the corner anyway.
    let food = place_food(&grid, &occupied, rng).unwrap_or_default();

    World {
        grid,
        player,
        enemies,
        food,
        bonuses: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_place_food_avoids_occupied() {
        let grid = Grid::new(4, 4);
        // Everything but (3, 3) is taken.
        let occupied: BTreeSet<Coord> = grid.cells().filter(|c| *c != Coord::new(3, 3)).collect();

        let mut found = 0;
        for seed in 0..50 {
            let mut rng = DeterministicRng::new(seed);
            if let Some(cell) = place_food(&grid, &occupied, &mut rng) {
                assert_eq!(cell, Coord::new(3, 3));
                found += 1;
            }
        }
        assert!(found > 0);
    }

    #[test]
    fn test_place_food_full_grid_gives_up() {
        let grid = Grid::new(4, 4);
        let mut rng = DeterministicRng::new(1);
        let occupied: BTreeSet<Coord> = grid.cells().collect();
        assert_eq!(place_food(&grid, &occupied, &mut rng), None);
    }

    #[test]
    fn test_spawn_bonus_fields() {
        let config = GameConfig::default();
        let grid = config.grid();
        let mut rng = DeterministicRng::new(99);
        let bonus = spawn_bonus(&grid, &BTreeSet::new(), &mut rng, ms(500), &config).unwrap();

        assert!(bonus.active);
        assert!(grid.contains(bonus.position));
        assert_eq!(bonus.created_at, ms(500));
        assert_eq!(bonus.lifetime, config.bonus_lifetime());
        assert_eq!(bonus.value, bonus.bonus_type.value(config.bonus_points));
    }

    #[test]
    fn test_bonus_types_are_all_reachable() {
        let mut rng = DeterministicRng::new(2024);
        let seen: BTreeSet<BonusType> = (0..200).map(|_| random_bonus_type(&mut rng)).collect();
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_expire_bonuses() {
        let config = GameConfig::default();
        let mut rng = DeterministicRng::new(5);
        let mut world = build_world(&config, 1, 0, 3, &mut rng);
        world.bonuses.push(Bonus::new(Coord::new(0, 0), BonusType::Life, ms(0), ms(100), 1));
        world.bonuses.push(Bonus::new(Coord::new(0, 1), BonusType::Points, ms(50), ms(100), 100));

        let events = expire_bonuses(&mut world, ms(120), 7);
        assert_eq!(events.len(), 1);
        assert_eq!(world.bonuses.len(), 1);
        assert_eq!(world.bonuses[0].position, Coord::new(0, 1));
    }

    #[test]
    fn test_maybe_spawn_respects_cap() {
        let config = GameConfig {
            bonus_spawn_one_in: 1,
            max_active_bonuses: 1,
            ..GameConfig::default()
        };
        let mut rng = DeterministicRng::new(8);
        let mut world = build_world(&config, 1, 2, 3, &mut rng);

        assert!(maybe_spawn_bonus(&mut world, &config, &mut rng, ms(0), 1).is_some());
        assert!(maybe_spawn_bonus(&mut world, &config, &mut rng, ms(0), 2).is_none());
        assert_eq!(world.bonuses.len(), 1);
    }

    #[test]
    fn test_build_world_layout() {
        let config = GameConfig::default();
        let mut rng = DeterministicRng::new(12345);
        let world = build_world(&config, 1, 4, 3, &mut rng);

        assert_eq!(world.player.body.head(), config.player_start);
        assert_eq!(world.player.lives, 3);
        assert_eq!(world.enemies.len(), 4);

        let mut seen = BTreeSet::new();
        for c in world.player.body.segments() {
            assert!(seen.insert(*c));
        }
        for (i, enemy) in world.enemies.iter().enumerate() {
            assert_eq!(enemy.id, i as u32 + 1);
            assert_eq!(enemy.speed, 1);
            assert!(enemy.body.head().manhattan(config.player_start) >= config.enemy_spawn_clearance);
            for c in enemy.body.segments() {
                assert!(world.grid.contains(*c));
                assert!(seen.insert(*c), "enemy overlaps another body at {c:?}");
            }
        }
        assert!(!seen.contains(&world.food));
        assert!(world.grid.contains(world.food));
    }

    #[test]
    fn test_fast_enemies_on_later_levels() {
        let config = GameConfig::default();
        let mut rng = DeterministicRng::new(77);
        let world = build_world(&config, config.fast_enemies_from_level, 4, 3, &mut rng);

        for enemy in &world.enemies {
            let expected = if enemy.id % 2 == 0 { 2 } else { 1 };
            assert_eq!(enemy.speed, expected);
        }
    }

    #[test]
    fn test_layout_is_seed_deterministic() {
        let config = GameConfig::default();
        let a = build_world(&config, 2, 3, 3, &mut DeterministicRng::new(4242));
        let b = build_world(&config, 2, 3, 3, &mut DeterministicRng::new(4242));

        assert_eq!(a.food, b.food);
        for (ea, eb) in a.enemies.iter().zip(&b.enemies) {
            assert_eq!(ea.body, eb.body);
        }
    }

    proptest! {
        #[test]
        fn prop_food_never_on_occupied(
            seed in any::<u64>(),
            taken in proptest::collection::btree_set((0i32..8, 0i32..8), 0..32),
        ) {
            let grid = Grid::new(8, 8);
            let occupied: BTreeSet<Coord> =
                taken.into_iter().map(|(x, y)| Coord::new(x, y)).collect();
            let mut rng = DeterministicRng::new(seed);

            if let Some(cell) = place_food(&grid, &occupied, &mut rng) {
                prop_assert!(grid.contains(cell));
                prop_assert!(!occupied.contains(&cell));
            }
        }

        #[test]
        fn prop_bonus_never_on_occupied(
            seed in any::<u64>(),
            taken in proptest::collection::btree_set((0i32..8, 0i32..8), 0..32),
        ) {
            let grid = Grid::new(8, 8);
            let occupied: BTreeSet<Coord> =
                taken.into_iter().map(|(x, y)| Coord::new(x, y)).collect();
            let mut rng = DeterministicRng::new(seed);
            let config = GameConfig::default();

            if let Some(bonus) = spawn_bonus(&grid, &occupied, &mut rng, Duration::ZERO, &config) {
                prop_assert!(!occupied.contains(&bonus.position));
            }
        }
    }
}
