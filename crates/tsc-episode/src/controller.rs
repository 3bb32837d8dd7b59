//! The `EpisodeController` and its step loop.

use tracing::{info, warn};

use tsc_adapter::{RewardSignal, Scenario, SimulationAdapter};
use tsc_control::{
    AgentPool, ControlMode, ControlResult, Decision, DecisionScheduler, IntersectionArena,
    IntersectionControlState, Observation, ObservationNeed, QLearningAgent,
};
use tsc_core::{ControlConfig, Tick};

use crate::{DecisionRecord, EpisodeError, EpisodeObserver, EpisodeResult, TripTimes};

// ── EpisodeReport ─────────────────────────────────────────────────────────────

/// Outcome of one episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeReport {
    pub scenario:          String,
    pub mode:              ControlMode,
    /// Simulated steps until the network drained.
    pub steps:             u64,
    pub departed:          usize,
    pub completed_trips:   usize,
    pub decisions:         u64,
    /// Mean trip time in steps; `None` when no trip completed.
    pub average_trip_time: Option<f64>,
}

// ── EpisodeController ─────────────────────────────────────────────────────────

/// Drives one adapter through any number of episodes.
///
/// The per-intersection agents in [`pool`](Self::pool) persist across
/// episodes, which is how learning accumulates over a training schedule.
///
/// Create via [`EpisodeControllerBuilder`][crate::EpisodeControllerBuilder].
pub struct EpisodeController<A: SimulationAdapter> {
    pub(crate) config:    ControlConfig,
    pub(crate) adapter:   A,
    pub(crate) arena:     IntersectionArena,
    pub(crate) pool:      AgentPool,
    pub(crate) reward:    Box<dyn RewardSignal>,
    pub(crate) max_steps: Option<u64>,
}

impl<A: SimulationAdapter> EpisodeController<A> {
    /// Run `scenario` from start until the simulation drains.
    ///
    /// Any adapter or control failure aborts the episode and is returned
    /// as-is; no partial report is produced.  Once `start` has succeeded the
    /// adapter is closed on every exit path.
    pub fn run_episode<O: EpisodeObserver>(
        &mut self,
        scenario: &Scenario,
        mode: ControlMode,
        observer: &mut O,
    ) -> EpisodeResult<EpisodeReport> {
        let scheduler = DecisionScheduler::new(&self.config, mode)?;
        info!(scenario = %scenario.name, %mode, intersections = self.arena.len(), "episode start");

        self.adapter.start(scenario)?;
        let outcome = self.drive(scenario, mode, &scheduler, observer);
        let (steps, trips, decisions) = match outcome {
            Ok(run) => {
                self.adapter.close()?;
                run
            }
            Err(err) => {
                if let Err(close_err) = self.adapter.close() {
                    warn!(scenario = %scenario.name, error = %close_err, "close after failed episode");
                }
                return Err(err);
            }
        };

        let report = EpisodeReport {
            scenario: scenario.name.clone(),
            mode,
            steps,
            departed: trips.departed(),
            completed_trips: trips.completed(),
            decisions,
            average_trip_time: trips.average(),
        };
        match report.average_trip_time {
            Some(avg) => info!(
                scenario = %report.scenario,
                %mode,
                steps = report.steps,
                trips = report.completed_trips,
                average_trip_time = avg,
                "episode end"
            ),
            None => warn!(
                scenario = %report.scenario,
                %mode,
                steps = report.steps,
                "episode end: no trip completed"
            ),
        }
        observer.on_episode_end(&report);
        Ok(report)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn arena(&self) -> &IntersectionArena {
        &self.arena
    }

    pub fn pool(&self) -> &AgentPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut AgentPool {
        &mut self.pool
    }

    /// Hand back the adapter and the learned agents.
    pub fn into_parts(self) -> (A, AgentPool) {
        (self.adapter, self.pool)
    }

    // ── Step internals ────────────────────────────────────────────────────

    /// Everything between `start` and `close`.
    fn drive<O: EpisodeObserver>(
        &mut self,
        scenario: &Scenario,
        mode: ControlMode,
        scheduler: &DecisionScheduler,
        observer: &mut O,
    ) -> EpisodeResult<(u64, TripTimes, u64)> {
        self.arena.begin_episode(&self.config);
        if mode.controls_signals() {
            self.prime(scheduler)?;
        }
        observer.on_episode_start(scenario, mode);

        let mut trips = TripTimes::new();
        let mut now = Tick::ZERO;
        let mut decisions = 0u64;

        while !self.adapter.is_drained()? {
            if let Some(limit) = self.max_steps {
                if now.0 >= limit {
                    return Err(EpisodeError::StepLimit {
                        scenario: scenario.name.clone(),
                        limit,
                    });
                }
            }

            self.adapter.step()?;
            now = now.next();

            for vehicle in self.adapter.departed_vehicles()? {
                trips.record_departure(vehicle, now);
            }
            for vehicle in self.adapter.arrived_vehicles()? {
                trips.record_arrival(&vehicle, now);
            }

            if mode.controls_signals() {
                for decision in self.control_step(scheduler)? {
                    decisions += 1;
                    let name = self
                        .arena
                        .get(decision.intersection)
                        .map_or("", |s| s.name.as_str());
                    observer.on_decision(&DecisionRecord {
                        scenario: &scenario.name,
                        mode,
                        tick: now,
                        intersection: name,
                        decision: &decision,
                    });
                }
            }

            observer.on_step_end(now);
        }

        Ok((now.0, trips, decisions))
    }

    /// Encode every intersection's starting state.
    fn prime(&mut self, scheduler: &DecisionScheduler) -> EpisodeResult<()> {
        for state in self.arena.as_mut_slice() {
            let phase = self.adapter.current_phase(&state.name)?;
            let counts = self.adapter.vehicle_counts(&state.name)?;
            scheduler.prime(state, &counts, phase)?;
        }
        Ok(())
    }

    /// Observe, decide, apply.  Returns the decisions in ascending id order.
    fn control_step(&mut self, scheduler: &DecisionScheduler) -> EpisodeResult<Vec<Decision>> {
        // ── Observe (sequential) ──────────────────────────────────────────
        let mut observations = Vec::with_capacity(self.arena.len());
        for state in self.arena.iter() {
            let phase = self.adapter.current_phase(&state.name)?;
            let mut obs = Observation::phase_only(phase);
            match scheduler.need(state, phase) {
                ObservationNeed::Nothing => {}
                ObservationNeed::Reward => {
                    obs.reward = Some(self.reward.sample(&mut self.adapter, &state.name)?);
                }
                ObservationNeed::Counts => {
                    obs.counts = Some(self.adapter.vehicle_counts(&state.name)?);
                }
            }
            observations.push(obs);
        }

        // ── Decide (pure; optionally parallel) ────────────────────────────
        let decisions = decide(
            scheduler,
            self.arena.as_mut_slice(),
            self.pool.as_mut_slice(),
            &observations,
        )?;

        // ── Apply (sequential, ascending id) ──────────────────────────────
        for decision in &decisions {
            let command = decision.command();
            if let Some(state) = self.arena.get(command.intersection) {
                self.adapter.set_phase(&state.name, command.phase)?;
            }
        }

        Ok(decisions)
    }
}

/// Advance every intersection with its observation.
///
/// Each worker gets exclusive `&mut` access to one state/agent pair, so no
/// Q-table is ever touched by two threads.
fn decide(
    scheduler: &DecisionScheduler,
    states: &mut [IntersectionControlState],
    agents: &mut [QLearningAgent],
    observations: &[Observation],
) -> ControlResult<Vec<Decision>> {
    #[cfg(not(feature = "parallel"))]
    {
        let mut decisions = Vec::new();
        for ((state, agent), obs) in states.iter_mut().zip(agents.iter_mut()).zip(observations) {
            if let Some(d) = scheduler.step(state, agent, obs)? {
                decisions.push(d);
            }
        }
        Ok(decisions)
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        let stepped: Vec<Option<Decision>> = states
            .par_iter_mut()
            .zip(agents.par_iter_mut())
            .zip(observations.par_iter())
            .map(|((state, agent), obs)| scheduler.step(state, agent, obs))
            .collect::<ControlResult<_>>()?;
        Ok(stepped.into_iter().flatten().collect())
    }
}
