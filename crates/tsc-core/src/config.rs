//! Run configuration for the control core.
//!
//! Typically loaded from a JSON file by the application crate (with the
//! `serde` feature) and passed, validated, to the episode controller.
//! Every section has a `Default` that reproduces the reference layout:
//! four approaches per intersection, an 8-slot phase cycle with decision
//! slots 0 and 4, and actions {30 s, 10 s, 20 s}.

use crate::{ConfigError, ConfigResult};

// ── LearningParams ────────────────────────────────────────────────────────────

/// Fixed hyper-parameters of every tabular Q-learning agent.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LearningParams {
    /// Learning rate α in `(0, 1]`.
    pub alpha: f64,
    /// Discount factor γ in `[0, 1]`.
    pub gamma: f64,
    /// Exploration probability ε in `[0, 1]`.
    pub epsilon: f64,
}

impl Default for LearningParams {
    fn default() -> Self {
        Self { alpha: 0.1, gamma: 0.9, epsilon: 0.1 }
    }
}

// ── EncoderConfig ─────────────────────────────────────────────────────────────

/// How raw per-approach vehicle counts become a discrete state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EncoderConfig {
    /// Number of controlled approaches per intersection.  Every count vector
    /// reported by the adapter must have exactly this length.
    pub approaches: usize,
    /// Ascending bin edges.  `count < thresholds[0]` is bin 0,
    /// `thresholds[i-1] <= count < thresholds[i]` is bin `i`, and anything at
    /// or above the last edge falls in the top bin.
    pub bin_thresholds: Vec<u32>,
    /// Phase indices `>= group_split` belong to the second phase group and
    /// shift the encoded state by one full occupancy block.
    pub group_split: u32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            approaches:     4,
            bin_thresholds: vec![5, 9],
            group_split:    4,
        }
    }
}

impl EncoderConfig {
    /// Number of bins per approach (the radix of the encoding).
    #[inline]
    pub fn bins(&self) -> usize {
        self.bin_thresholds.len() + 1
    }

    /// `bins ^ approaches`, or `None` on overflow.
    pub fn occupancy_states(&self) -> Option<usize> {
        let exp = u32::try_from(self.approaches).ok()?;
        self.bins().checked_pow(exp)
    }

    /// Total state count (two phase groups), or `None` on overflow.
    pub fn state_count(&self) -> Option<usize> {
        self.occupancy_states()?.checked_mul(2)
    }
}

// ── ActionConfig ──────────────────────────────────────────────────────────────

/// The discrete action set: one green duration (in ticks) per action.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActionConfig {
    /// `durations[a]` is the countdown set when action `a` is chosen.
    pub durations: Vec<u32>,
    /// Duration returned for an action index outside `durations`.
    pub fallback: u32,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self { durations: vec![30, 10, 20], fallback: 30 }
    }
}

impl ActionConfig {
    #[inline]
    pub fn action_count(&self) -> usize {
        self.durations.len()
    }
}

// ── PhaseConfig ───────────────────────────────────────────────────────────────

/// Shape of the signal program the scheduler cycles through.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PhaseConfig {
    /// Number of phase slots in one full cycle.
    pub phase_count: u32,
    /// Slots at which the countdown runs and decisions fire.
    pub decision_phases: Vec<u32>,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self { phase_count: 8, decision_phases: vec![0, 4] }
    }
}

impl PhaseConfig {
    #[inline]
    pub fn is_decision_phase(&self, phase: u32) -> bool {
        self.decision_phases.contains(&phase)
    }

    /// The slot the scheduler advances to after a decision in `phase`.
    #[inline]
    pub fn next_phase(&self, phase: u32) -> u32 {
        (phase + 1) % self.phase_count
    }
}

// ── RewardKind ────────────────────────────────────────────────────────────────

/// Which per-step scalar the adapter layer samples as reward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RewardKind {
    /// Vehicles currently on the intersection's approaches.
    #[default]
    QueuedVehicles,
    /// The same count, negated (more queueing is worse).
    NegativeQueue,
    /// Mean occupancy ratio over the approaches.
    MeanOccupancy,
}

// ── ControlConfig ─────────────────────────────────────────────────────────────

/// Top-level configuration consumed by the control core.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControlConfig {
    pub learning: LearningParams,
    pub encoder:  EncoderConfig,
    pub actions:  ActionConfig,
    pub phases:   PhaseConfig,
    pub reward:   RewardKind,

    /// Countdown each intersection starts an episode with.
    pub initial_remaining: u32,

    /// Action assumed to have been taken before the first decision.
    pub initial_action: u16,

    /// Master RNG seed.  The same seed always reproduces the same run.
    pub seed: u64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            learning:          LearningParams::default(),
            encoder:           EncoderConfig::default(),
            actions:           ActionConfig::default(),
            phases:            PhaseConfig::default(),
            reward:            RewardKind::default(),
            initial_remaining: 30,
            initial_action:    0,
            seed:              42,
        }
    }
}

impl ControlConfig {
    /// Check every invariant the scheduler and agents rely on.
    ///
    /// In particular every countdown the scheduler can set is at least 2, so
    /// a decision window always collects at least one reward sample before
    /// its boundary.
    pub fn validate(&self) -> ConfigResult<()> {
        let l = &self.learning;
        if !(l.alpha > 0.0 && l.alpha <= 1.0) {
            return invalid(format!("alpha must be in (0, 1], got {}", l.alpha));
        }
        if !(0.0..=1.0).contains(&l.gamma) {
            return invalid(format!("gamma must be in [0, 1], got {}", l.gamma));
        }
        if !(0.0..=1.0).contains(&l.epsilon) {
            return invalid(format!("epsilon must be in [0, 1], got {}", l.epsilon));
        }

        let e = &self.encoder;
        if e.approaches == 0 {
            return invalid("encoder needs at least one approach".into());
        }
        if e.bin_thresholds.is_empty() {
            return invalid("encoder needs at least one bin threshold".into());
        }
        if e.bin_thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return invalid(format!(
                "bin thresholds must be strictly ascending, got {:?}",
                e.bin_thresholds
            ));
        }
        match e.state_count() {
            Some(n) if n <= u32::MAX as usize => {}
            _ => {
                return invalid(format!(
                    "{} bins over {} approaches overflows the state index",
                    e.bins(),
                    e.approaches
                ));
            }
        }

        let a = &self.actions;
        if a.durations.is_empty() {
            return invalid("at least one action duration is required".into());
        }
        if a.durations.len() > u16::MAX as usize {
            return invalid(format!("too many actions: {}", a.durations.len()));
        }
        if let Some(d) = a.durations.iter().chain([&a.fallback]).find(|&&d| d < 2) {
            return invalid(format!("action durations must be at least 2 ticks, got {d}"));
        }
        if self.initial_remaining < 2 {
            return invalid(format!(
                "initial_remaining must be at least 2 ticks, got {}",
                self.initial_remaining
            ));
        }
        if usize::from(self.initial_action) >= a.durations.len() {
            return invalid(format!(
                "initial_action {} is outside the {} configured actions",
                self.initial_action,
                a.durations.len()
            ));
        }

        let p = &self.phases;
        if p.phase_count == 0 {
            return invalid("phase_count must be positive".into());
        }
        if p.decision_phases.is_empty() {
            return invalid("at least one decision phase is required".into());
        }
        if let Some(&bad) = p.decision_phases.iter().find(|&&ph| ph >= p.phase_count) {
            return invalid(format!(
                "decision phase {bad} is outside the {}-slot cycle",
                p.phase_count
            ));
        }
        let mut sorted = p.decision_phases.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != p.decision_phases.len() {
            return invalid(format!("duplicate decision phases in {:?}", p.decision_phases));
        }

        Ok(())
    }

    /// Size of each agent's Q-table as `(states, actions)`.
    ///
    /// Only meaningful after [`validate`](Self::validate) succeeded.
    pub fn table_shape(&self) -> (usize, usize) {
        (
            self.encoder.state_count().unwrap_or(0),
            self.actions.action_count(),
        )
    }
}

fn invalid(msg: String) -> ConfigResult<()> {
    Err(ConfigError::Invalid(msg))
}
