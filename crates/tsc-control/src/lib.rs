//! `tsc-control`: the per-intersection control core.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                       |
//! |------------------|----------------------------------------------------------------|
//! | [`encoder`]      | `StateEncoder`: counts + phase → `StateIndex`                  |
//! | [`action`]       | `ActionTranslator`: `ActionIndex` → countdown ticks            |
//! | [`window`]       | `RewardWindow`: per-window reward samples, mean reduction      |
//! | [`qlearning`]    | `QTable`, `QLearningAgent` (ε-greedy + TD update)              |
//! | [`pool`]         | `AgentPool`: one independent agent per intersection            |
//! | [`intersection`] | `IntersectionControlState`, `IntersectionArena`                |
//! | [`scheduler`]    | `DecisionScheduler`, `Observation`, `Decision`                 |
//! | [`error`]        | `ControlError`, `ControlResult<T>`                             |
//!
//! # Design notes
//!
//! Nothing in this crate talks to a simulator.  The episode controller reads
//! the adapter, hands each intersection an [`Observation`], and applies the
//! [`Decision`]s that come back.  Per-intersection state lives in the arena
//! and per-intersection agents live in the pool, both indexed by
//! [`IntersectionId`][tsc_core::IntersectionId], so the two can be borrowed
//! mutably side by side and split across threads without sharing.

pub mod action;
pub mod encoder;
pub mod error;
pub mod intersection;
pub mod pool;
pub mod qlearning;
pub mod scheduler;
pub mod window;

#[cfg(test)]
mod tests;

pub use action::ActionTranslator;
pub use encoder::StateEncoder;
pub use error::{ControlError, ControlResult};
pub use intersection::{IntersectionArena, IntersectionControlState, TimerState};
pub use pool::AgentPool;
pub use qlearning::{QLearningAgent, QTable};
pub use scheduler::{
    ControlMode, Decision, DecisionScheduler, Observation, ObservationNeed, PhaseCommand,
};
pub use window::{DegenerateWindow, RewardWindow};
