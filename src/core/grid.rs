//! Grid Geometry
//!
//! Integer tile coordinates, the four movement directions and the
//! bounded playfield. Coordinates carry no bounds of their own; the
//! `Grid` decides what is inside.

use std::fmt;
use serde::{Serialize, Deserialize};

// =============================================================================
// COORDINATE
// =============================================================================

/// A tile on the playfield.
///
/// Ordered by `x`, then `y`, so it can key `BTreeSet`s.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Coord {
    /// Column
    pub x: i32,
    /// Row (grows downwards)
    pub y: i32,
}

impl Coord {
    /// Create a coordinate.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighbouring tile in the given direction.
    #[inline]
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
        }
    }

    /// Offset from `self` to `other` as `(dx, dy)`.
    #[inline]
    pub fn offset_to(self, other: Self) -> (i32, i32) {
        (other.x - self.x, other.y - self.y)
    }

    /// Manhattan distance.
    #[inline]
    pub fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Check if two tiles share an edge.
    #[inline]
    pub fn is_adjacent(self, other: Self) -> bool {
        self.manhattan(other) == 1
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// =============================================================================
// DIRECTION
// =============================================================================

/// Movement direction on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
#[derive(Default)]
pub enum Direction {
    /// Towards row 0
    Up = 0,
    /// Towards the last column
    #[default]
    Right = 1,
    /// Towards the last row
    Down = 2,
    /// Towards column 0
    Left = 3,
}

impl Direction {
    /// All directions in input-scan order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Unit step `(dx, dy)` for this direction.
    #[inline]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    /// The 180° reverse.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// Check if `other` is the exact reverse of `self`.
    #[inline]
    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }

    /// Get direction from index (0-3).
    pub fn from_index(index: u8) -> Option<Direction> {
        match index {
            0 => Some(Direction::Up),
            1 => Some(Direction::Right),
            2 => Some(Direction::Down),
            3 => Some(Direction::Left),
            _ => None,
        }
    }
}

// =============================================================================
// GRID
// =============================================================================

/// Bounded playfield of `width` × `height` tiles, origin at the top-left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// Columns
    pub width: u32,
    /// Rows
    pub height: u32,
}

impl Grid {
    /// Create a grid.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Check if a tile lies inside the playfield.
    #[inline]
    pub fn contains(&self, c: Coord) -> bool {
        c.x >= 0 && c.y >= 0 && (c.x as u32) < self.width && (c.y as u32) < self.height
    }

    /// Iterate all tiles row by row.
    pub fn cells(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.height as i32)
            .flat_map(move |y| (0..self.width as i32).map(move |x| Coord::new(x, y)))
    }
}

// =============================================================================
// TESTS
// =============================================================================
