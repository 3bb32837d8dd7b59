//! Plain data row types written by output backends.

use tsc_control::ControlMode;

/// One decision boundary at one intersection.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionRow {
    /// 1-based position of the episode in the run.
    pub episode:      u32,
    pub tick:         u64,
    pub intersection: String,
    pub phase:        u32,
    pub next_phase:   u32,
    pub state:        u32,
    pub action:       u16,
    pub duration:     u32,
    /// Mean reward of the closed window; `None` outside training.
    pub reward:       Option<f64>,
}

/// Summary of one finished episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeRow {
    pub episode:           u32,
    pub scenario:          String,
    pub mode:              ControlMode,
    pub steps:             u64,
    pub departed:          u64,
    pub completed_trips:   u64,
    pub decisions:         u64,
    /// `None` when no trip completed.
    pub average_trip_time: Option<f64>,
}
