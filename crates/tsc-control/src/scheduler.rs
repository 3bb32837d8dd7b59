//! The per-intersection decision state machine.
//!
//! Once per simulated step, for every intersection:
//!
//! ```text
//! phase ∉ decision_phases ──► IGNORED (nothing happens)
//! phase ∈ decision_phases ──► COUNTING: remaining -= 1
//!     remaining >  0 ──► push reward sample              (train only)
//!     remaining <= 0 ──► boundary:
//!         r      = mean(window)                          (train only)
//!         s'     = encode(counts, phase)
//!         Q.update(last_state, last_action, s', r)       (train only)
//!         a'     = Q.choose(s')
//!         clear window; last = (s', a')
//!         remaining = duration(a'); set_phase((phase + 1) mod N)
//! ```
//!
//! The scheduler never calls the simulator.  [`DecisionScheduler::need`]
//! tells the caller which readings a step requires, the caller packs them
//! into an [`Observation`], and [`DecisionScheduler::step`] returns the
//! [`Decision`] (if any) for the caller to apply.

use tsc_core::{ActionIndex, ControlConfig, IntersectionId, PhaseConfig, StateIndex};
use tracing::debug;

use crate::{
    ActionTranslator, ControlError, ControlResult, IntersectionControlState, QLearningAgent,
    StateEncoder, TimerState,
};

// ── ControlMode ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ControlMode {
    /// Collect rewards, update, and choose.
    #[default]
    Train,
    /// Choose and apply only; tables are never written.
    Evaluate,
    /// Leave the signals to the simulator's own program.
    Plain,
}

impl ControlMode {
    #[inline]
    pub fn is_learning(self) -> bool {
        self == ControlMode::Train
    }

    #[inline]
    pub fn controls_signals(self) -> bool {
        self != ControlMode::Plain
    }
}

impl std::fmt::Display for ControlMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ControlMode::Train => "train",
            ControlMode::Evaluate => "evaluate",
            ControlMode::Plain => "plain",
        })
    }
}

// ── Observation ───────────────────────────────────────────────────────────────

/// Which adapter readings one intersection needs on this step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObservationNeed {
    /// Only the phase index (already read).
    Nothing,
    /// The instantaneous reward sample.
    Reward,
    /// Per-approach counts for encoding at a boundary.
    Counts,
}

/// Adapter readings for one intersection on one step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Observation {
    pub phase:  u32,
    pub reward: Option<f64>,
    pub counts: Option<Vec<u32>>,
}

impl Observation {
    pub fn phase_only(phase: u32) -> Self {
        Self { phase, ..Self::default() }
    }
}

// ── Decision ──────────────────────────────────────────────────────────────────

/// Signal change to apply through the adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseCommand {
    pub intersection: IntersectionId,
    pub phase:        u32,
}

/// Everything that happened at one decision boundary.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Decision {
    pub intersection: IntersectionId,
    /// Phase the boundary fired in.
    pub phase:        u32,
    /// Phase the signal is advanced to.
    pub next_phase:   u32,
    pub state:        StateIndex,
    pub action:       ActionIndex,
    /// Countdown set for the new window.
    pub duration:     u32,
    /// Mean reward of the closed window; `None` outside training.
    pub reward:       Option<f64>,
}

impl Decision {
    #[inline]
    pub fn command(&self) -> PhaseCommand {
        PhaseCommand { intersection: self.intersection, phase: self.next_phase }
    }
}

// ── DecisionScheduler ─────────────────────────────────────────────────────────

/// Shared, read-only scheduling logic.  All mutable state is passed in, so a
/// single scheduler can serve every intersection from any thread.
#[derive(Debug, Clone)]
pub struct DecisionScheduler {
    encoder:    StateEncoder,
    translator: ActionTranslator,
    phases:     PhaseConfig,
    mode:       ControlMode,
}

impl DecisionScheduler {
    pub fn new(config: &ControlConfig, mode: ControlMode) -> ControlResult<Self> {
        config.validate()?;
        Ok(Self {
            encoder: StateEncoder::new(&config.encoder)?,
            translator: ActionTranslator::new(&config.actions),
            phases: config.phases.clone(),
            mode,
        })
    }

    #[inline]
    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    #[inline]
    pub fn encoder(&self) -> &StateEncoder {
        &self.encoder
    }

    #[inline]
    pub fn translator(&self) -> &ActionTranslator {
        &self.translator
    }

    /// Readings `step` will require for `state` observed in `phase`.
    pub fn need(&self, state: &IntersectionControlState, phase: u32) -> ObservationNeed {
        if !self.mode.controls_signals() || !self.phases.is_decision_phase(phase) {
            return ObservationNeed::Nothing;
        }
        if state.remaining_time - 1 > 0 {
            if self.mode.is_learning() {
                ObservationNeed::Reward
            } else {
                ObservationNeed::Nothing
            }
        } else {
            ObservationNeed::Counts
        }
    }

    /// Seed `last_state` from the readings taken right after the simulation
    /// starts.
    pub fn prime(
        &self,
        state: &mut IntersectionControlState,
        counts: &[u32],
        phase: u32,
    ) -> ControlResult<StateIndex> {
        let s = self.encoder.encode(counts, phase)?;
        state.last_state = Some(s);
        Ok(s)
    }

    /// Advance one intersection by one step.
    ///
    /// Returns `Some` exactly when a decision boundary fired; the caller must
    /// then issue [`Decision::command`] through the adapter.
    ///
    /// # Errors
    ///
    /// - [`ControlError::MissingObservation`] if `obs` lacks a reading that
    ///   [`need`](Self::need) asked for.
    /// - [`ControlError::DegenerateWindow`] if a training boundary is reached
    ///   with an empty window.
    pub fn step(
        &self,
        state: &mut IntersectionControlState,
        agent: &mut QLearningAgent,
        obs: &Observation,
    ) -> ControlResult<Option<Decision>> {
        if !self.mode.controls_signals() || !self.phases.is_decision_phase(obs.phase) {
            state.timer = TimerState::Ignored;
            return Ok(None);
        }

        state.timer = TimerState::Counting;
        state.remaining_time -= 1;

        if state.remaining_time > 0 {
            if self.mode.is_learning() {
                let sample = obs.reward.ok_or(ControlError::MissingObservation {
                    intersection: state.id,
                    what:         "reward sample",
                })?;
                state.window.push(sample);
            }
            return Ok(None);
        }

        let reward = if self.mode.is_learning() {
            let r = state.window.reduce().map_err(|source| ControlError::DegenerateWindow {
                intersection: state.id,
                source,
            })?;
            Some(r)
        } else {
            None
        };

        let counts = obs.counts.as_deref().ok_or(ControlError::MissingObservation {
            intersection: state.id,
            what:         "approach counts",
        })?;
        let this_state = self.encoder.encode(counts, obs.phase)?;

        if let (Some(r), Some(prev)) = (reward, state.last_state) {
            agent.update(prev, state.last_action, this_state, r)?;
        }

        let action = agent.choose(this_state)?;
        state.window.clear();
        state.last_state = Some(this_state);
        state.last_action = action;

        let duration = self.translator.duration_for(action);
        state.remaining_time = i64::from(duration);

        let decision = Decision {
            intersection: state.id,
            phase: obs.phase,
            next_phase: self.phases.next_phase(obs.phase),
            state: this_state,
            action,
            duration,
            reward,
        };
        debug!(
            intersection = %state.name,
            state = this_state.0,
            action = action.0,
            reward = ?reward,
            duration,
            "decision boundary"
        );
        Ok(Some(decision))
    }
}
