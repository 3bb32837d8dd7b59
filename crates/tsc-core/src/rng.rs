//! Deterministic per-intersection and simulation-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each intersection's learning agent gets its own `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (intersection_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive ids uniformly across the seed space.  So:
//!
//! - Agents never share RNG state, which keeps them independent and lets the
//!   decide phase run on any thread.
//! - Registering one more intersection does not disturb the exploration
//!   sequence of the existing ones.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::IntersectionId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-intersection deterministic RNG, owned by that intersection's agent.
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the run's global seed and an intersection.
    pub fn new(global_seed: u64, intersection: IntersectionId) -> Self {
        let seed = global_seed ^ (intersection.0 as u64).wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
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

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG for global operations such as synthetic demand
/// generation.
///
/// Used only in single-threaded contexts.  Derive a [`child`](Self::child)
/// per scenario so adding a scenario does not reshuffle the others.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child `SimRng` with a different seed offset.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}
