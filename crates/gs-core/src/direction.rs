//! Compass directions, turn types, and the fixed movement table.
//!
//! # Conventions
//!
//! A movement is named by the side of the intersection a vehicle **arrives
//! from** and the turn it makes.  A vehicle arriving from the north and
//! going straight leaves through the south side:
//!
//! ```text
//!            N
//!            │  from N: straight → S, left → E, right → W
//!      W ────┼──── E
//!            │
//!            S
//! ```
//!
//! There are 4 directions × 3 turns = 12 movements.  U-turns do not exist.
//! All lookups are plain array indexing; there is no runtime key-absence.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use crate::CoreError;

// ── Direction ─────────────────────────────────────────────────────────────────

/// One side of an intersection.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    N,
    S,
    E,
    W,
}

impl Direction {
    /// All directions in canonical order.
    pub const ALL: [Direction; 4] = [Direction::N, Direction::S, Direction::E, Direction::W];

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::N => Direction::S,
            Direction::S => Direction::N,
            Direction::E => Direction::W,
            Direction::W => Direction::E,
        }
    }

    /// The side a vehicle arriving from `self` leaves through after `turn`.
    #[inline]
    pub fn exit(self, turn: Turn) -> Direction {
        use Direction::*;
        match (self, turn) {
            (N, Turn::Straight) => S,
            (N, Turn::Left)     => E,
            (N, Turn::Right)    => W,
            (S, Turn::Straight) => N,
            (S, Turn::Left)     => W,
            (S, Turn::Right)    => E,
            (E, Turn::Straight) => W,
            (E, Turn::Left)     => N,
            (E, Turn::Right)    => S,
            (W, Turn::Straight) => E,
            (W, Turn::Left)     => S,
            (W, Turn::Right)    => N,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::N => "N",
            Direction::S => "S",
            Direction::E => "E",
            Direction::W => "W",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "N" | "n" => Ok(Direction::N),
            "S" | "s" => Ok(Direction::S),
            "E" | "e" => Ok(Direction::E),
            "W" | "w" => Ok(Direction::W),
            other => Err(CoreError::Parse(format!(
                "invalid direction {other:?}: expected one of N, S, E, W"
            ))),
        }
    }
}

// ── Turn ──────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Turn {
    Straight,
    Left,
    Right,
}

impl Turn {
    pub const ALL: [Turn; 3] = [Turn::Straight, Turn::Left, Turn::Right];

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Turn::Straight => "straight",
            Turn::Left     => "left",
            Turn::Right    => "right",
        }
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Movement ──────────────────────────────────────────────────────────────────

/// A legal (incoming direction, turn) pair.  The outgoing direction is
/// derived, so an illegal (from == to) pair cannot be expressed.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Movement {
    pub from: Direction,
    pub turn: Turn,
}

impl Movement {
    pub const COUNT: usize = 12;

    pub const fn new(from: Direction, turn: Turn) -> Self {
        Self { from, turn }
    }

    /// Find the movement from `from` that leaves through `to`.
    ///
    /// Returns `None` for U-turns (`from == to`).
    pub fn between(from: Direction, to: Direction) -> Option<Movement> {
        Turn::ALL
            .into_iter()
            .map(|turn| Movement::new(from, turn))
            .find(|m| m.to() == to)
    }

    #[inline]
    pub fn to(self) -> Direction {
        self.from.exit(self.turn)
    }

    /// Dense index in `0..12`, used by [`MovementMap`].
    #[inline(always)]
    pub fn index(self) -> usize {
        self.from.index() * 3 + self.turn.index()
    }

    /// All 12 movements in canonical order (by `from`, then `turn`).
    pub fn all() -> impl Iterator<Item = Movement> {
        Direction::ALL
            .into_iter()
            .flat_map(|from| Turn::ALL.into_iter().map(move |turn| Movement::new(from, turn)))
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}→{}", self.from, self.to())
    }
}

// ── MovementMap ───────────────────────────────────────────────────────────────

/// A fixed-size map from every [`Movement`] to a `T`.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementMap<T>(pub [T; Movement::COUNT]);

impl<T: Copy> MovementMap<T> {
    pub fn splat(value: T) -> Self {
        Self([value; Movement::COUNT])
    }

    /// Iterate `(movement, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Movement, T)> + '_ {
        Movement::all().map(move |m| (m, self.0[m.index()]))
    }
}

impl<T> Index<Movement> for MovementMap<T> {
    type Output = T;
    #[inline(always)]
    fn index(&self, m: Movement) -> &T {
        &self.0[m.index()]
    }
}

impl<T> IndexMut<Movement> for MovementMap<T> {
    #[inline(always)]
    fn index_mut(&mut self, m: Movement) -> &mut T {
        &mut self.0[m.index()]
    }
}
