//! `tsc-core`: foundational types for the `tsc` traffic-signal control
//! workspace.
//!
//! This crate is a dependency of every other `tsc-*` crate.  It has no
//! `tsc-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`ids`]         | `IntersectionId`, `StateIndex`, `ActionIndex`              |
//! | [`time`]        | `Tick`: one simulated step                                |
//! | [`rng`]         | `AgentRng` (per-intersection), `SimRng` (global)           |
//! | [`config`]      | `ControlConfig` and its sections, `validate()`             |
//! | [`discover`]    | `unique_file`, `files_with_suffix`: run input lookup      |
//! | [`error`]       | `ConfigError`, `ConfigResult`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids and config types.    |

pub mod config;
pub mod discover;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{ActionConfig, ControlConfig, EncoderConfig, LearningParams, PhaseConfig, RewardKind};
pub use discover::{files_with_suffix, unique_file};
pub use error::{ConfigError, ConfigResult};
pub use ids::{ActionIndex, IntersectionId, StateIndex};
pub use rng::{AgentRng, SimRng};
pub use time::Tick;
