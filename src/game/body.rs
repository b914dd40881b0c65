//! Movable Body
//!
//! The snake shape shared by the player and the enemies: head-first
//! segments, a committed heading, a buffered heading for the next step and
//! a deferred growth flag. Bounds are not checked here; the collision
//! resolver owns that.

use std::collections::VecDeque;
use serde::{Serialize, Deserialize};

use crate::core::grid::{Coord, Direction};
use crate::core::hash::StateHasher;

/// Ordered run of tiles, head first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBody")]
pub struct Body {
    segments: VecDeque<Coord>,
    direction: Direction,
    next_direction: Direction,
    pending_growth: bool,
}

/// Unchecked wire form of [`Body`].
#[derive(Deserialize)]
struct RawBody {
    segments: VecDeque<Coord>,
    direction: Direction,
    next_direction: Direction,
    pending_growth: bool,
}

impl TryFrom<RawBody> for Body {
    type Error = String;

    fn try_from(raw: RawBody) -> Result<Self, Self::Error> {
        if raw.segments.is_empty() {
            return Err("body must have at least one segment".to_string());
        }
        Ok(Self {
            segments: raw.segments,
            direction: raw.direction,
            next_direction: raw.next_direction,
            pending_growth: raw.pending_growth,
        })
    }
}

impl Body {
    /// Straight body of `length` tiles with its head at `head`, tail
    /// trailing opposite to `direction`.
    ///
    /// `length` is clamped to at least 1.
    pub fn new(head: Coord, direction: Direction, length: usize) -> Self {
        let back = direction.opposite();
        let mut segments = VecDeque::with_capacity(length.max(1));
        let mut cell = head;
        for _ in 0..length.max(1) {
            segments.push_back(cell);
            cell = cell.step(back);
        }
        Self {
            segments,
            direction,
            next_direction: direction,
            pending_growth: false,
        }
    }

    /// Head tile.
    #[inline]
    pub fn head(&self) -> Coord {
        // Never empty: construction and deserialization both require a
        // segment, and move_forward pushes before it pops.
        self.segments[0]
    }

    /// All tiles, head first.
    #[inline]
    pub fn segments(&self) -> &VecDeque<Coord> {
        &self.segments
    }

    /// Segment count.
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false for a constructed or deserialized body.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Committed heading (the one the last step used).
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Heading the next step will use.
    #[inline]
    pub fn next_direction(&self) -> Direction {
        self.next_direction
    }

    /// Check if the next step keeps the tail.
    #[inline]
    pub fn is_growing(&self) -> bool {
        self.pending_growth
    }

    /// Tile the head will enter on the next step.
    #[inline]
    pub fn next_head(&self) -> Coord {
        self.head().step(self.next_direction)
    }

    /// Buffer a heading for the next step.
    ///
    /// The exact reverse of the committed heading is ignored. Returns
    /// whether the heading was accepted.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if self.direction.is_opposite(direction) {
            return false;
        }
        self.next_direction = direction;
        true
    }

    /// Keep the tail on the next step.
    #[inline]
    pub fn grow(&mut self) {
        self.pending_growth = true;
    }

    /// Advance one tile along the buffered heading.
    pub fn move_forward(&mut self) {
        self.direction = self.next_direction;
        let new_head = self.head().step(self.direction);
        self.segments.push_front(new_head);

        if self.pending_growth {
            self.pending_growth = false;
        } else {
            self.segments.pop_back();
        }
    }

    /// Check if the head overlaps any other segment.
    pub fn self_collision(&self) -> bool {
        let head = self.head();
        self.segments.iter().skip(1).any(|c| *c == head)
    }

    /// Check if any segment sits on `cell`.
    #[inline]
    pub fn occupies(&self, cell: Coord) -> bool {
        self.segments.contains(&cell)
    }

    /// Hash tiles, both headings and the growth flag.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_coords(&self.segments);
        hasher.update_u8(self.direction as u8);
        hasher.update_u8(self.next_direction as u8);
        hasher.update_bool(self.pending_growth);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn direction_strategy() -> impl Strategy<Value = Direction> {
        (0u8..4).prop_map(|i| Direction::from_index(i).unwrap())
    }

    #[test]
    fn test_new_body_layout() {
        let body = Body::new(Coord::new(5, 5), Direction::Right, 3);
        let cells: Vec<_> = body.segments().iter().copied().collect();
        assert_eq!(cells, vec![Coord::new(5, 5), Coord::new(4, 5), Coord::new(3, 5)]);
        assert_eq!(body.head(), Coord::new(5, 5));
        assert_eq!(body.len(), 3);
        assert!(!body.self_collision());
    }

    #[test]
    fn test_move_drops_tail() {
        let mut body = Body::new(Coord::new(5, 5), Direction::Right, 3);
        body.move_forward();
        let cells: Vec<_> = body.segments().iter().copied().collect();
        assert_eq!(cells, vec![Coord::new(6, 5), Coord::new(5, 5), Coord::new(4, 5)]);
    }

    #[test]
    fn test_grow_is_deferred_to_next_move() {
        let mut body = Body::new(Coord::new(5, 5), Direction::Right, 3);
        body.grow();
        assert_eq!(body.len(), 3, "grow alone must not change length");
        assert!(body.is_growing());

        body.move_forward();
        assert_eq!(body.len(), 4);
        assert!(!body.is_growing());
        assert_eq!(body.segments().back(), Some(&Coord::new(3, 5)));

        body.move_forward();
        assert_eq!(body.len(), 4);
    }

    #[test]
    fn test_reverse_rejected() {
        let mut body = Body::new(Coord::new(5, 5), Direction::Right, 3);
        assert!(!body.set_direction(Direction::Left));
        assert_eq!(body.next_direction(), Direction::Right);

        assert!(body.set_direction(Direction::Up));
        assert_eq!(body.next_direction(), Direction::Up);
    }

    #[test]
    fn test_quick_double_turn_cannot_reverse() {
        let mut body = Body::new(Coord::new(5, 5), Direction::Right, 3);
        // Up then Left within one tick: Left is checked against the
        // committed Right, not the buffered Up.
        assert!(body.set_direction(Direction::Up));
        assert!(!body.set_direction(Direction::Left));
        body.move_forward();
        assert_eq!(body.head(), Coord::new(5, 4));
    }

    #[test]
    fn test_self_collision() {
        // Length 5 turning in a tight square bites its own tail segment.
        let mut body = Body::new(Coord::new(5, 5), Direction::Right, 5);
        body.grow();
        body.move_forward();
        body.set_direction(Direction::Down);
        body.move_forward();
        body.set_direction(Direction::Left);
        body.move_forward();
        assert!(!body.self_collision());
        body.set_direction(Direction::Up);
        body.move_forward();
        assert!(body.self_collision());
    }

    #[test]
    fn test_deserialize_rejects_empty_body() {
        let empty = r#"{"segments":[],"direction":"Right","next_direction":"Right","pending_growth":false}"#;
        assert!(serde_json::from_str::<Body>(empty).is_err());

        let mut body = Body::new(Coord::new(2, 2), Direction::Down, 2);
        body.grow();
        let text = serde_json::to_string(&body).unwrap();
        let restored: Body = serde_json::from_str(&text).unwrap();
        assert_eq!(restored, body);
        assert_eq!(restored.head(), Coord::new(2, 2));
    }

    #[test]
    fn test_occupies() {
        let body = Body::new(Coord::new(5, 5), Direction::Down, 3);
        assert!(body.occupies(Coord::new(5, 3)));
        assert!(!body.occupies(Coord::new(5, 6)));
    }

    proptest! {
        #[test]
        fn prop_length_invariant_without_growth(
            turns in proptest::collection::vec(direction_strategy(), 0..64),
            length in 1usize..12,
        ) {
            let mut body = Body::new(Coord::new(0, 0), Direction::Right, length);
            for dir in turns {
                body.set_direction(dir);
                body.move_forward();
                prop_assert_eq!(body.len(), length);
            }
        }

        #[test]
        fn prop_chain_stays_connected(
            turns in proptest::collection::vec(direction_strategy(), 0..64),
            grow_every in 1usize..8,
        ) {
            let mut body = Body::new(Coord::new(0, 0), Direction::Right, 3);
            for (i, dir) in turns.into_iter().enumerate() {
                if i % grow_every == 0 {
                    body.grow();
                }
                body.set_direction(dir);
                body.move_forward();
                let segs = body.segments();
                for pair in segs.iter().zip(segs.iter().skip(1)) {
                    prop_assert!(pair.0.is_adjacent(*pair.1));
                }
            }
        }

        #[test]
        fn prop_single_grow_adds_exactly_one(
            turns in proptest::collection::vec(direction_strategy(), 1..32),
        ) {
            let mut body = Body::new(Coord::new(0, 0), Direction::Right, 3);
            body.grow();
            let mut lengths = Vec::new();
            for dir in turns {
                body.set_direction(dir);
                body.move_forward();
                lengths.push(body.len());
                prop_assert!(!body.is_growing());
            }
            prop_assert!(lengths.iter().all(|l| *l == 4));
        }

        #[test]
        fn prop_reverse_never_accepted(dir in direction_strategy()) {
            let mut body = Body::new(Coord::new(0, 0), dir, 3);
            prop_assert!(!body.set_direction(dir.opposite()));
            prop_assert_eq!(body.next_direction(), dir);
        }
    }
}
