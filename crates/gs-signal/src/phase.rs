//! The four fixed signal phases.

use std::fmt;
use std::ops::{Index, IndexMut};

use gs_core::{Direction, Movement, Turn};

/// A group of movements that receive green together.
///
/// Declaration order is the canonical order: it fixes the timeline
/// sequence and breaks every demand tie.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Phase {
    /// North and south approaches, straight and left.
    NsMain,
    /// East and west approaches, straight and left.
    EwMain,
    /// North and south approaches, right turns only.
    NsRight,
    /// East and west approaches, right turns only.
    EwRight,
}

const NS: [Direction; 2] = [Direction::N, Direction::S];
const EW: [Direction; 2] = [Direction::E, Direction::W];
const MAIN: &[Turn] = &[Turn::Straight, Turn::Left];
const RIGHT: &[Turn] = &[Turn::Right];

impl Phase {
    pub const COUNT: usize = 4;
    pub const ALL: [Phase; 4] = [Phase::NsMain, Phase::EwMain, Phase::NsRight, Phase::EwRight];

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::NsMain  => "ns_main",
            Phase::EwMain  => "ew_main",
            Phase::NsRight => "ns_right",
            Phase::EwRight => "ew_right",
        }
    }

    pub fn approaches(self) -> [Direction; 2] {
        match self {
            Phase::NsMain | Phase::NsRight => NS,
            Phase::EwMain | Phase::EwRight => EW,
        }
    }

    pub fn turns(self) -> &'static [Turn] {
        match self {
            Phase::NsMain | Phase::EwMain   => MAIN,
            Phase::NsRight | Phase::EwRight => RIGHT,
        }
    }

    /// The movements served by this phase, approach-major.
    pub fn movements(self) -> impl Iterator<Item = Movement> {
        let turns = self.turns();
        self.approaches()
            .into_iter()
            .flat_map(move |from| turns.iter().map(move |&turn| Movement::new(from, turn)))
    }

    /// The phase that serves `m`.  Every movement belongs to exactly one.
    pub fn of(m: Movement) -> Phase {
        let ns = matches!(m.from, Direction::N | Direction::S);
        match (ns, m.turn) {
            (true, Turn::Right)  => Phase::NsRight,
            (true, _)            => Phase::NsMain,
            (false, Turn::Right) => Phase::EwRight,
            (false, _)           => Phase::EwMain,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── PhaseMap ──────────────────────────────────────────────────────────────────

/// A fixed-size map from every [`Phase`] to a `T`.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseMap<T>(pub [T; Phase::COUNT]);

impl<T: Copy> PhaseMap<T> {
    pub fn splat(value: T) -> Self {
        Self([value; Phase::COUNT])
    }

    /// `(phase, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Phase, T)> + '_ {
        Phase::ALL.into_iter().map(move |p| (p, self.0[p.index()]))
    }
}

impl PhaseMap<u32> {
    pub fn sum(&self) -> u32 {
        self.0.iter().sum()
    }
}

impl<T> Index<Phase> for PhaseMap<T> {
    type Output = T;
    #[inline(always)]
    fn index(&self, p: Phase) -> &T {
        &self.0[p.index()]
    }
}

impl<T> IndexMut<Phase> for PhaseMap<T> {
    #[inline(always)]
    fn index_mut(&mut self, p: Phase) -> &mut T {
        &mut self.0[p.index()]
    }
}
