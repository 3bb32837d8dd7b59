//! `TrainingSchedule`: train over several scenarios, then evaluate.

use tracing::info;

use tsc_adapter::{Scenario, SimulationAdapter};
use tsc_control::ControlMode;
use tsc_core::ConfigError;

use crate::{EpisodeController, EpisodeObserver, EpisodeReport, EpisodeResult};

/// Ordered list of episodes to run against one controller.
///
/// Training episodes run first, in order, all updating the same agents.
/// Then the held-out scenario is evaluated with learning switched off and,
/// if requested, replayed once more under the simulator's own fixed-time
/// program for comparison.
#[derive(Debug, Clone, Default)]
pub struct TrainingSchedule {
    pub train:          Vec<Scenario>,
    pub evaluate:       Option<Scenario>,
    pub plain_baseline: bool,
}

impl TrainingSchedule {
    pub fn new(train: Vec<Scenario>) -> Self {
        Self { train, ..Self::default() }
    }

    /// Hold out `scenarios[held_out]` for evaluation and train on the rest.
    pub fn hold_out(mut scenarios: Vec<Scenario>, held_out: usize) -> EpisodeResult<Self> {
        if held_out >= scenarios.len() {
            return Err(ConfigError::Invalid(format!(
                "held-out scenario {held_out} out of {} scenarios",
                scenarios.len()
            ))
            .into());
        }
        let evaluate = scenarios.remove(held_out);
        Ok(Self { train: scenarios, evaluate: Some(evaluate), plain_baseline: false })
    }

    pub fn evaluate_on(mut self, scenario: Scenario) -> Self {
        self.evaluate = Some(scenario);
        self
    }

    pub fn with_plain_baseline(mut self, enabled: bool) -> Self {
        self.plain_baseline = enabled;
        self
    }

    /// Number of episodes [`run`](Self::run) will execute.
    pub fn episode_count(&self) -> usize {
        let tail = match &self.evaluate {
            Some(_) if self.plain_baseline => 2,
            Some(_) => 1,
            None => 0,
        };
        self.train.len() + tail
    }

    /// Run every episode in order.  Stops at the first failure.
    pub fn run<A, O>(
        &self,
        controller: &mut EpisodeController<A>,
        observer: &mut O,
    ) -> EpisodeResult<Vec<EpisodeReport>>
    where
        A: SimulationAdapter,
        O: EpisodeObserver,
    {
        let mut reports = Vec::with_capacity(self.episode_count());

        for (i, scenario) in self.train.iter().enumerate() {
            info!(episode = i + 1, of = self.train.len(), scenario = %scenario.name, "training");
            reports.push(controller.run_episode(scenario, ControlMode::Train, observer)?);
        }

        if let Some(scenario) = &self.evaluate {
            reports.push(controller.run_episode(scenario, ControlMode::Evaluate, observer)?);
            if self.plain_baseline {
                reports.push(controller.run_episode(scenario, ControlMode::Plain, observer)?);
            }
        }

        Ok(reports)
    }
}
