//! Episode observer trait for progress reporting and data collection.

use tsc_adapter::Scenario;
use tsc_control::{ControlMode, Decision};
use tsc_core::Tick;

use crate::EpisodeReport;

/// One decision boundary, with the context an output writer needs.
#[derive(Debug, Clone, Copy)]
pub struct DecisionRecord<'a> {
    pub scenario:     &'a str,
    pub mode:         ControlMode,
    pub tick:         Tick,
    pub intersection: &'a str,
    pub decision:     &'a Decision,
}

/// Callbacks invoked by
/// [`EpisodeController::run_episode`][crate::EpisodeController::run_episode].
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait EpisodeObserver {
    /// Called after the adapter started, before the first step.
    fn on_episode_start(&mut self, _scenario: &Scenario, _mode: ControlMode) {}

    /// Called at the end of every step, after decisions were applied.
    fn on_step_end(&mut self, _tick: Tick) {}

    /// Called once per decision boundary, after its phase change was applied.
    fn on_decision(&mut self, _record: &DecisionRecord<'_>) {}

    /// Called once after the adapter closed.
    fn on_episode_end(&mut self, _report: &EpisodeReport) {}
}

/// An [`EpisodeObserver`] that does nothing.
pub struct NoopObserver;

impl EpisodeObserver for NoopObserver {}

impl<O: EpisodeObserver + ?Sized> EpisodeObserver for &mut O {
    fn on_episode_start(&mut self, scenario: &Scenario, mode: ControlMode) {
        (**self).on_episode_start(scenario, mode);
    }

    fn on_step_end(&mut self, tick: Tick) {
        (**self).on_step_end(tick);
    }

    fn on_decision(&mut self, record: &DecisionRecord<'_>) {
        (**self).on_decision(record);
    }

    fn on_episode_end(&mut self, report: &EpisodeReport) {
        (**self).on_episode_end(report);
    }
}
