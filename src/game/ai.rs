//! Enemy AI
//!
//! Each enemy gets one movement policy the first time it is asked about,
//! kept in a map keyed by enemy id. Every step the policy turns the
//! current situation into exactly one direction.
//!
//! "Legal" here only means the next head stays on the grid. Running into
//! bodies is the collision resolver's business.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::grid::{Coord, Direction, Grid};
use crate::core::hash::StateHasher;
use crate::core::rng::DeterministicRng;
use crate::game::state::Enemy;

/// Movement policy of one enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Behavior {
    /// Any legal direction
    Random = 0,
    /// Head towards the player
    Chase = 1,
    /// Head away from the player
    Evade = 2,
    /// Keep going, turning with a `1 / patrol_turn_one_in` chance per step
    Patrol = 3,
}

impl Behavior {
    /// All behaviors, assignment-table order.
    pub const ALL: [Behavior; 4] = [
        Behavior::Random,
        Behavior::Chase,
        Behavior::Evade,
        Behavior::Patrol,
    ];
}

/// What an enemy can see when choosing a move.
#[derive(Clone, Copy, Debug)]
pub struct AiContext {
    /// Playfield bounds
    pub grid: Grid,
    /// Player head before this tick's move
    pub player_head: Coord,
    /// Current food tile (no current policy steers by it)
    pub food: Coord,
}

/// Assigns and runs enemy behaviors.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AiSelector {
    behaviors: BTreeMap<u32, Behavior>,
    patrol_turn_one_in: u32,
}

impl AiSelector {
    /// Create a selector with an empty assignment map.
    pub fn new(patrol_turn_one_in: u32) -> Self {
        Self {
            behaviors: BTreeMap::new(),
            patrol_turn_one_in,
        }
    }

    /// Behavior for `id`, assigning one uniformly at random on first use.
    pub fn behavior_for(&mut self, id: u32, rng: &mut DeterministicRng) -> Behavior {
        *self
            .behaviors
            .entry(id)
            .or_insert_with(|| *rng.choose(&Behavior::ALL).unwrap_or(&Behavior::Random))
    }

    /// Already-assigned behavior, if any.
    pub fn assigned(&self, id: u32) -> Option<Behavior> {
        self.behaviors.get(&id).copied()
    }

    /// Pin a behavior (for scripted enemies and tests).
    pub fn assign(&mut self, id: u32, behavior: Behavior) {
        self.behaviors.insert(id, behavior);
    }

    /// Forget every assignment.
    ///
    /// Called whenever a new level lays out fresh enemies, so a reused id
    /// rolls a new behavior instead of inheriting the previous level's.
    pub fn reset(&mut self) {
        self.behaviors.clear();
    }

    /// Number of enemies with an assigned behavior.
    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    /// Check if nothing is assigned.
    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    /// Hash the assignment map in id order.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.behaviors.len() as u32);
        for (id, behavior) in &self.behaviors {
            hasher.update_u32(*id);
            hasher.update_u8(*behavior as u8);
        }
    }

    /// Choose this step's direction for `enemy`.
    pub fn choose_direction(
        &mut self,
        enemy: &Enemy,
        ctx: &AiContext,
        rng: &mut DeterministicRng,
    ) -> Direction {
        let head = enemy.body.head();
        let current = enemy.body.direction();

        match self.behavior_for(enemy.id, rng) {
            Behavior::Chase => chase(head, ctx.player_head, current, &ctx.grid, rng),
            Behavior::Evade => evade(head, ctx.player_head, current, &ctx.grid, rng),
            Behavior::Patrol => patrol(head, current, &ctx.grid, self.patrol_turn_one_in, rng),
            Behavior::Random => random_move(head, current, &ctx.grid, rng),
        }
    }
}

/// Check if stepping `direction` from `head` stays on the grid.
#[inline]
pub fn is_legal(head: Coord, direction: Direction, grid: &Grid) -> bool {
    grid.contains(head.step(direction))
}

/// Direction along one axis for a signed offset, `None` when it is zero.
fn axis_direction(offset: i32, positive: Direction, negative: Direction) -> Option<Direction> {
    match offset.signum() {
        1 => Some(positive),
        -1 => Some(negative),
        _ => None,
    }
}

/// Primary then secondary axis towards `(dx, dy)`; ties prefer y.
fn axis_preference(dx: i32, dy: i32) -> [Option<Direction>; 2] {
    let horizontal = axis_direction(dx, Direction::Right, Direction::Left);
    let vertical = axis_direction(dy, Direction::Down, Direction::Up);
    if dx.abs() > dy.abs() {
        [horizontal, vertical]
    } else {
        [vertical, horizontal]
    }
}

/// First legal candidate that does not reverse `current`, else a random move.
fn pick_or_random(
    candidates: [Option<Direction>; 2],
    head: Coord,
    current: Direction,
    grid: &Grid,
    rng: &mut DeterministicRng,
) -> Direction {
    candidates
        .into_iter()
        .flatten()
        .find(|dir| *dir != current.opposite() && is_legal(head, *dir, grid))
        .unwrap_or_else(|| random_move(head, current, grid, rng))
}

/// Close in on `target` along the axis with the larger gap first.
pub fn chase(
    head: Coord,
    target: Coord,
    current: Direction,
    grid: &Grid,
    rng: &mut DeterministicRng,
) -> Direction {
    let (dx, dy) = head.offset_to(target);
    pick_or_random(axis_preference(dx, dy), head, current, grid, rng)
}

/// Same axis preference as [`chase`], signs inverted.
pub fn evade(
    head: Coord,
    threat: Coord,
    current: Direction,
    grid: &Grid,
    rng: &mut DeterministicRng,
) -> Direction {
    let (dx, dy) = head.offset_to(threat);
    let away = axis_preference(dx, dy).map(|d| d.map(Direction::opposite));
    pick_or_random(away, head, current, grid, rng)
}

/// Keep the heading, turning randomly with probability `1 / turn_one_in`.
pub fn patrol(
    head: Coord,
    current: Direction,
    grid: &Grid,
    turn_one_in: u32,
    rng: &mut DeterministicRng,
) -> Direction {
    if rng.one_in(turn_one_in) {
        random_move(head, current, grid, rng)
    } else {
        current
    }
}

/// Shuffle the four directions and take the first legal one that does not
/// reverse `current`.
///
/// Falls back to `current` when boxed in.
pub fn random_move(
    head: Coord,
    current: Direction,
    grid: &Grid,
    rng: &mut DeterministicRng,
) -> Direction {
    let mut directions = Direction::ALL;
    rng.shuffle(&mut directions);
    directions
        .into_iter()
        .find(|dir| *dir != current.opposite() && is_legal(head, *dir, grid))
        .unwrap_or(current)
}

// =============================================================================
// TESTS
// =============================================================================
