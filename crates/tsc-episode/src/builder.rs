//! Fluent builder for constructing an [`EpisodeController`].

use tsc_adapter::{reward_signal, RewardSignal, SimulationAdapter};
use tsc_control::{AgentPool, IntersectionArena};
use tsc_core::ControlConfig;

use crate::{EpisodeController, EpisodeError, EpisodeResult};

/// Fluent builder for [`EpisodeController<A>`].
///
/// # Required inputs
///
/// - [`ControlConfig`]: learning, encoding, action, and phase settings
/// - `A: SimulationAdapter`: the simulation to drive
/// - the intersection identifiers to control, in id order
///
/// # Optional inputs (have defaults)
///
/// | Method              | Default                                   |
/// |---------------------|-------------------------------------------|
/// | `.agents(pool)`     | Fresh all-zero agents seeded from config  |
/// | `.reward(signal)`   | `reward_signal(config.reward)`            |
/// | `.max_steps(n)`     | No limit                                  |
///
/// # Example
///
/// ```rust,ignore
/// let mut controller = EpisodeControllerBuilder::new(config, sim, names).build()?;
/// let report = controller.run_episode(&scenario, ControlMode::Train, &mut NoopObserver)?;
/// ```
pub struct EpisodeControllerBuilder<A: SimulationAdapter> {
    config:        ControlConfig,
    adapter:       A,
    intersections: Vec<String>,
    agents:        Option<AgentPool>,
    reward:        Option<Box<dyn RewardSignal>>,
    max_steps:     Option<u64>,
}

impl<A: SimulationAdapter> EpisodeControllerBuilder<A> {
    pub fn new<I, S>(config: ControlConfig, adapter: A, intersections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            config,
            adapter,
            intersections: intersections.into_iter().map(Into::into).collect(),
            agents: None,
            reward: None,
            max_steps: None,
        }
    }

    /// Continue from previously trained agents (one per intersection).
    pub fn agents(mut self, pool: AgentPool) -> Self {
        self.agents = Some(pool);
        self
    }

    /// Override the reward signal selected by `config.reward`.
    pub fn reward(mut self, signal: Box<dyn RewardSignal>) -> Self {
        self.reward = Some(signal);
        self
    }

    /// Abort an episode that has not drained after `n` steps.
    pub fn max_steps(mut self, n: u64) -> Self {
        self.max_steps = Some(n);
        self
    }

    /// Validate the config and assemble the controller.
    pub fn build(self) -> EpisodeResult<EpisodeController<A>> {
        self.config.validate()?;

        let arena = IntersectionArena::new(self.intersections, &self.config)?;
        let pool = match self.agents {
            Some(pool) => {
                if pool.len() != arena.len() {
                    return Err(EpisodeError::IntersectionCountMismatch {
                        expected: arena.len(),
                        got:      pool.len(),
                        what:     "agent pool",
                    });
                }
                pool
            }
            None => AgentPool::new(&self.config, arena.len())?,
        };
        let reward = self.reward.unwrap_or_else(|| reward_signal(self.config.reward));

        Ok(EpisodeController {
            config: self.config,
            adapter: self.adapter,
            arena,
            pool,
            reward,
            max_steps: self.max_steps,
        })
    }
}
