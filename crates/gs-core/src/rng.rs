//! Deterministic per-node RNG wrapper.
//!
//! The scheduling core never draws random numbers; these wrappers serve the
//! demand generators that refresh queues between ticks.
//!
//! # Determinism strategy
//!
//! Each node gets its own independent `SmallRng` per tick, seeded by:
//!
//!   seed = global_seed XOR (node_id * MIXING_CONSTANT) XOR (tick * TICK_CONSTANT)
//!
//! so demand drawn for one node never depends on how many values another
//! node consumed, and generation may run in any node order.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::{NodeId, Tick};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Second odd mixing constant so (node, tick) pairs do not collide.
const TICK_CONSTANT: u64 = 0xc2b2_ae3d_27d4_eb4f;

// ── NodeRng ───────────────────────────────────────────────────────────────────

/// Per-node deterministic RNG for one tick.
pub struct NodeRng(SmallRng);

impl NodeRng {
    /// Seed deterministically from the run's global seed, a node, and a tick.
    pub fn new(global_seed: u64, node: NodeId, tick: Tick) -> Self {
        let seed = global_seed
            ^ (node.0 as u64).wrapping_mul(MIXING_CONSTANT)
            ^ tick.0.wrapping_mul(TICK_CONSTANT);
        NodeRng(SmallRng::seed_from_u64(seed))
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}
