//! Signal-timing and flow configuration.
//!
//! Typically loaded from a JSON file by the application crate (with the
//! `serde` feature) and passed to the simulation builder.  All durations are
//! whole seconds.

use crate::{CoreError, CoreResult};

/// Number of phases every intersection cycles through.
pub const PHASE_COUNT: u32 = 4;

// ── SignalConfig ──────────────────────────────────────────────────────────────

/// Cycle-level constants shared by every intersection.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SignalConfig {
    /// Total duration of one cycle, clearance included.  Default: 120 s.
    pub cycle_length: u32,

    /// Minimum green granted to any served phase.  Default: 15 s.
    pub min_green: u32,

    /// Clearance (amber) interval inserted after every served phase.
    /// Default: 3 s.
    pub clearance: u32,

    /// A movement is held red when the downstream node already has this many
    /// vehicles queued on its arrival side.  Default: 10.
    pub capacity_threshold: u32,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            cycle_length:       120,
            min_green:          15,
            clearance:          3,
            capacity_threshold: 10,
        }
    }
}

impl SignalConfig {
    /// Reject configurations under which the allocator cannot honour the
    /// minimum green for every phase.
    pub fn validate(&self) -> CoreResult<()> {
        if self.cycle_length == 0 {
            return Err(CoreError::Config("cycle_length must be positive".into()));
        }
        let worst_case = self
            .min_green
            .checked_add(self.clearance)
            .and_then(|per_phase| per_phase.checked_mul(PHASE_COUNT))
            .ok_or_else(|| {
                CoreError::Config(format!(
                    "{PHASE_COUNT} × (min_green {} + clearance {}) overflows u32",
                    self.min_green, self.clearance,
                ))
            })?;
        if self.cycle_length < worst_case {
            return Err(CoreError::Config(format!(
                "cycle_length {} is shorter than {PHASE_COUNT} × (min_green {} + clearance {}) = {worst_case}",
                self.cycle_length, self.min_green, self.clearance,
            )));
        }
        Ok(())
    }

    /// Green seconds available when `active_phases` phases are served.
    #[inline]
    pub fn usable_green(&self, active_phases: u32) -> u32 {
        self.cycle_length
            .saturating_sub(active_phases.saturating_mul(self.clearance))
    }
}

// ── TurnShares ────────────────────────────────────────────────────────────────

/// Fraction of vehicles arriving at a node that continue straight, turn
/// left, or turn right.  Shares may sum to less than 1; the remainder is
/// treated as vehicles parking or leaving the network mid-block.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnShares {
    pub straight: f64,
    pub left:     f64,
    pub right:    f64,
}

impl Default for TurnShares {
    fn default() -> Self {
        Self { straight: 0.6, left: 0.2, right: 0.2 }
    }
}

impl TurnShares {
    #[inline]
    pub fn get(&self, turn: crate::Turn) -> f64 {
        match turn {
            crate::Turn::Straight => self.straight,
            crate::Turn::Left     => self.left,
            crate::Turn::Right    => self.right,
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        for (name, p) in [("straight", self.straight), ("left", self.left), ("right", self.right)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(CoreError::Config(format!("turn share {name} = {p} is outside [0, 1]")));
            }
        }
        let sum = self.straight + self.left + self.right;
        if sum > 1.0 + 1e-9 {
            return Err(CoreError::Config(format!("turn shares sum to {sum}, expected ≤ 1")));
        }
        Ok(())
    }
}

// ── FlowConfig ────────────────────────────────────────────────────────────────

/// Parameters of the tick-over-tick vehicle flow between intersections.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FlowConfig {
    /// Vehicles discharged per green second on one movement.  Default: 0.5.
    pub saturation_rate: f64,

    /// How arrivals are split across the downstream node's exits.
    pub turn_shares: TurnShares,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            saturation_rate: 0.5,
            turn_shares:     TurnShares::default(),
        }
    }
}

impl FlowConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if !self.saturation_rate.is_finite() || self.saturation_rate < 0.0 {
            return Err(CoreError::Config(format!(
                "saturation_rate must be finite and non-negative, got {}",
                self.saturation_rate
            )));
        }
        self.turn_shares.validate()
    }

    /// Upper bound on vehicles one movement can discharge in `green_secs`.
    #[inline]
    pub fn capacity(&self, green_secs: u32) -> u32 {
        (green_secs as f64 * self.saturation_rate).floor() as u32
    }
}
