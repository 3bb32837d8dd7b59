//! Unit tests for tsc-control.

use tsc_core::{ControlConfig, LearningParams};

fn greedy_config() -> ControlConfig {
    ControlConfig {
        learning: LearningParams { epsilon: 0.0, ..LearningParams::default() },
        ..ControlConfig::default()
    }
}

#[cfg(test)]
mod encoder {
    use proptest::prelude::*;
    use tsc_core::{EncoderConfig, StateIndex};

    use crate::{ControlError, StateEncoder};

    fn default_encoder() -> StateEncoder {
        StateEncoder::new(&EncoderConfig::default()).unwrap()
    }

    #[test]
    fn bin_boundaries_are_exact() {
        let enc = default_encoder();
        assert_eq!(enc.bin(0), 0);
        assert_eq!(enc.bin(4), 0);
        assert_eq!(enc.bin(5), 1);
        assert_eq!(enc.bin(8), 1);
        assert_eq!(enc.bin(9), 2);
        assert_eq!(enc.bin(u32::MAX), 2);
    }

    #[test]
    fn mixed_radix_positions() {
        let enc = default_encoder();
        assert_eq!(enc.encode(&[0, 0, 0, 0], 0).unwrap(), StateIndex(0));
        assert_eq!(enc.encode(&[5, 0, 0, 0], 0).unwrap(), StateIndex(1));
        assert_eq!(enc.encode(&[0, 5, 0, 0], 0).unwrap(), StateIndex(3));
        assert_eq!(enc.encode(&[0, 0, 9, 0], 0).unwrap(), StateIndex(18));
        assert_eq!(enc.encode(&[9, 9, 9, 9], 0).unwrap(), StateIndex(80));
    }

    #[test]
    fn second_phase_group_shifts_by_one_block() {
        let enc = default_encoder();
        assert_eq!(enc.occupancy_states(), 81);
        assert_eq!(enc.state_count(), 162);
        assert_eq!(enc.encode(&[9, 9, 9, 9], 4).unwrap(), StateIndex(161));
        assert_eq!(enc.encode(&[0, 0, 0, 0], 3).unwrap(), StateIndex(0));
        assert_eq!(enc.encode(&[0, 0, 0, 0], 7).unwrap(), StateIndex(81));
    }

    #[test]
    fn wrong_count_length_is_rejected() {
        let enc = default_encoder();
        let err = enc.encode(&[1, 2, 3], 0).unwrap_err();
        assert!(matches!(err, ControlError::ApproachMismatch { expected: 4, got: 3 }));
    }

    #[test]
    fn custom_thresholds_change_the_radix() {
        let enc = StateEncoder::new(&EncoderConfig {
            approaches:     2,
            bin_thresholds: vec![3],
            group_split:    1,
        })
        .unwrap();
        assert_eq!(enc.state_count(), 8);
        assert_eq!(enc.encode(&[3, 3], 0).unwrap(), StateIndex(3));
        assert_eq!(enc.encode(&[3, 3], 1).unwrap(), StateIndex(7));
    }

    proptest! {
        #[test]
        fn encode_is_in_range_and_pure(
            counts in proptest::collection::vec(any::<u32>(), 4),
            phase in 0u32..16,
        ) {
            let enc = default_encoder();
            let a = enc.encode(&counts, phase).unwrap();
            let b = enc.encode(&counts, phase).unwrap();
            prop_assert_eq!(a, b);
            prop_assert!(a.index() < enc.state_count());
        }
    }
}

#[cfg(test)]
mod action {
    use tsc_core::{ActionConfig, ActionIndex};

    use crate::ActionTranslator;

    #[test]
    fn default_table_is_total() {
        let t = ActionTranslator::default();
        assert_eq!(t.duration_for(ActionIndex(0)), 30);
        assert_eq!(t.duration_for(ActionIndex(1)), 10);
        assert_eq!(t.duration_for(ActionIndex(2)), 20);
        assert_eq!(t.duration_for(ActionIndex(99)), 30);
        assert_eq!(t.duration_for(ActionIndex::INVALID), 30);
        assert_eq!(t.action_count(), 3);
    }

    #[test]
    fn custom_fallback() {
        let t = ActionTranslator::new(&ActionConfig { durations: vec![5], fallback: 7 });
        assert_eq!(t.duration_for(ActionIndex(0)), 5);
        assert_eq!(t.duration_for(ActionIndex(1)), 7);
    }
}

#[cfg(test)]
mod window {
    use crate::{DegenerateWindow, RewardWindow};

    #[test]
    fn mean_of_samples() {
        let mut w = RewardWindow::new();
        for s in [2.0, 4.0, 6.0] {
            w.push(s);
        }
        assert_eq!(w.reduce(), Ok(4.0));
        // reduce alone leaves the samples in place
        assert_eq!(w.len(), 3);
    }

    #[test]
    fn take_mean_clears() {
        let mut w = RewardWindow::new();
        w.push(2.0);
        w.push(4.0);
        w.push(6.0);
        assert_eq!(w.take_mean(), Ok(4.0));
        assert!(w.is_empty());
    }

    #[test]
    fn empty_window_is_degenerate() {
        let mut w = RewardWindow::new();
        assert_eq!(w.reduce(), Err(DegenerateWindow));
        assert_eq!(w.take_mean(), Err(DegenerateWindow));
    }
}

#[cfg(test)]
mod qlearning {
    use tsc_core::{ActionIndex, AgentRng, IntersectionId, LearningParams, StateIndex};

    use crate::{ControlError, QLearningAgent, QTable};

    fn agent(epsilon: f64) -> QLearningAgent {
        QLearningAgent::new(
            IntersectionId(0),
            (162, 3),
            LearningParams { epsilon, ..LearningParams::default() },
            7,
        )
    }

    #[test]
    fn single_update_from_zero() {
        let mut a = agent(0.0);
        let v = a.update(StateIndex(0), ActionIndex(0), StateIndex(1), 10.0).unwrap();
        assert!((v - 1.0).abs() < 1e-12);
        assert!((a.table().get(StateIndex(0), ActionIndex(0)).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn repeated_updates_converge_monotonically() {
        let mut a = agent(0.0);
        let mut prev = 0.0;
        for _ in 0..200 {
            let v = a.update(StateIndex(0), ActionIndex(1), StateIndex(1), 10.0).unwrap();
            assert!(v > prev);
            assert!(v < 10.0);
            prev = v;
        }
        assert!((prev - 10.0).abs() < 1e-3);
    }

    #[test]
    fn update_bootstraps_from_next_state_max() {
        let mut a = agent(0.0);
        a.update(StateIndex(1), ActionIndex(2), StateIndex(2), 10.0).unwrap();
        // Q(1, 2) = 1.0, so max Q(1, ·) = 1.0
        let v = a.update(StateIndex(0), ActionIndex(0), StateIndex(1), 0.0).unwrap();
        assert!((v - 0.09).abs() < 1e-12);
    }

    #[test]
    fn greedy_ties_go_to_the_first_action() {
        let mut a = agent(0.0);
        assert_eq!(a.choose(StateIndex(5)).unwrap(), ActionIndex(0));

        let table = QTable::from_values(1, 3, vec![1.0, 2.0, 2.0]).unwrap();
        assert_eq!(table.argmax(StateIndex(0)).unwrap(), ActionIndex(1));
        assert_eq!(table.max(StateIndex(0)).unwrap(), 2.0);
    }

    #[test]
    fn greedy_follows_learned_values() {
        let mut a = agent(0.0);
        a.update(StateIndex(3), ActionIndex(2), StateIndex(4), 10.0).unwrap();
        assert_eq!(a.choose(StateIndex(3)).unwrap(), ActionIndex(2));
    }

    #[test]
    fn exploration_is_deterministic_per_seed() {
        let mut a = agent(0.5);
        let mut b = agent(0.5);
        let xs: Vec<_> = (0..100).map(|_| a.choose(StateIndex(0)).unwrap()).collect();
        let ys: Vec<_> = (0..100).map(|_| b.choose(StateIndex(0)).unwrap()).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().any(|&x| x != ActionIndex(0)), "ε = 0.5 should explore");
        assert!(xs.iter().all(|x| x.index() < 3));
    }

    #[test]
    fn out_of_range_state_is_an_error() {
        let mut a = agent(0.0);
        assert!(matches!(
            a.choose(StateIndex(162)),
            Err(ControlError::StateOutOfRange { states: 162, .. })
        ));
        assert!(a.update(StateIndex(0), ActionIndex(3), StateIndex(0), 1.0).is_err());
    }

    #[test]
    fn from_values_checks_length() {
        assert!(QTable::from_values(2, 2, vec![0.0; 3]).is_none());
        let t = QTable::from_values(2, 2, vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let cells: Vec<_> = t.cells().collect();
        assert_eq!(cells[3], (StateIndex(1), ActionIndex(1), 3.0));
    }

    #[test]
    fn replace_table_checks_shape() {
        let mut a = QLearningAgent::with_table(
            QTable::new(2, 2),
            LearningParams::default(),
            AgentRng::new(0, IntersectionId(0)),
        );
        assert!(matches!(
            a.replace_table(QTable::new(3, 2)),
            Err(ControlError::TableShape { expected: (2, 2), got: (3, 2) })
        ));
        assert!(a.replace_table(QTable::from_values(2, 2, vec![1.0; 4]).unwrap()).is_ok());
        assert_eq!(a.table().values(), &[1.0; 4]);
    }
}

#[cfg(test)]
mod pool {
    use tsc_core::{ActionIndex, ControlConfig, IntersectionId, StateIndex};

    use crate::{AgentPool, ControlError, QTable};

    #[test]
    fn agents_are_independent() {
        let mut pool = AgentPool::new(&ControlConfig::default(), 3).unwrap();
        pool.get_mut(IntersectionId(1))
            .unwrap()
            .update(StateIndex(0), ActionIndex(0), StateIndex(1), 10.0)
            .unwrap();

        let tables = pool.tables();
        assert!(tables[0].values().iter().all(|&v| v == 0.0));
        assert!(tables[2].values().iter().all(|&v| v == 0.0));
        assert!(tables[1].values().iter().any(|&v| v != 0.0));
    }

    #[test]
    fn table_shape_follows_config() {
        let pool = AgentPool::new(&ControlConfig::default(), 1).unwrap();
        assert_eq!(pool.get(IntersectionId(0)).unwrap().table().shape(), (162, 3));
    }

    #[test]
    fn load_tables_checks_count() {
        let mut pool = AgentPool::new(&ControlConfig::default(), 2).unwrap();
        let err = pool.load_tables(vec![QTable::new(162, 3)]).unwrap_err();
        assert!(matches!(err, ControlError::AgentCount { expected: 2, got: 1 }));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ControlConfig { initial_remaining: 1, ..ControlConfig::default() };
        assert!(matches!(AgentPool::new(&config, 1), Err(ControlError::Config(_))));
    }
}

#[cfg(test)]
mod arena {
    use tsc_core::{ActionIndex, ControlConfig, IntersectionId, StateIndex};

    use crate::{ControlError, IntersectionArena, TimerState};

    #[test]
    fn ids_follow_registration_order() {
        let arena = IntersectionArena::new(["A", "B", "C"], &ControlConfig::default()).unwrap();
        assert_eq!(arena.len(), 3);
        assert_eq!(arena.id_of("C").unwrap(), IntersectionId(2));
        assert_eq!(arena.names().collect::<Vec<_>>(), ["A", "B", "C"]);

        let b = arena.get(IntersectionId(1)).unwrap();
        assert_eq!(b.name, "B");
        assert_eq!(b.remaining_time, 30);
        assert_eq!(b.last_action, ActionIndex(0));
        assert!(b.last_state.is_none());
        assert!(b.window.is_empty());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = IntersectionArena::new(["A", "A"], &ControlConfig::default()).unwrap_err();
        assert!(matches!(err, ControlError::Config(_)));
    }

    #[test]
    fn unknown_name() {
        let arena = IntersectionArena::new(["A"], &ControlConfig::default()).unwrap();
        assert!(matches!(arena.id_of("Z"), Err(ControlError::UnknownIntersection(_))));
    }

    #[test]
    fn begin_episode_restores_the_initial_decision() {
        let config = ControlConfig::default();
        let mut arena = IntersectionArena::new(["A"], &config).unwrap();
        let a = arena.get_mut(IntersectionId(0)).unwrap();
        a.remaining_time = 4;
        a.last_state = Some(StateIndex(9));
        a.last_action = ActionIndex(2);
        a.window.push(1.0);
        a.timer = TimerState::Counting;

        arena.begin_episode(&config);
        let a = arena.get(IntersectionId(0)).unwrap();
        assert_eq!(a.remaining_time, 30);
        assert!(a.window.is_empty());
        assert_eq!(a.timer, TimerState::Ignored);
        assert!(a.last_state.is_none());
        assert_eq!(a.last_action, ActionIndex(0));
    }
}

#[cfg(test)]
mod scheduler {
    use tsc_core::{ActionIndex, ControlConfig, IntersectionId, StateIndex};

    use super::greedy_config;
    use crate::{
        AgentPool, ControlError, ControlMode, DecisionScheduler, IntersectionArena, Observation,
        ObservationNeed, TimerState,
    };

    struct Fixture {
        scheduler: DecisionScheduler,
        arena:     IntersectionArena,
        pool:      AgentPool,
    }

    fn fixture(mode: ControlMode) -> Fixture {
        let config = ControlConfig { initial_remaining: 3, ..greedy_config() };
        Fixture {
            scheduler: DecisionScheduler::new(&config, mode).unwrap(),
            arena:     IntersectionArena::new(["J0"], &config).unwrap(),
            pool:      AgentPool::new(&config, 1).unwrap(),
        }
    }

    impl Fixture {
        fn step(&mut self, obs: Observation) -> crate::ControlResult<Option<crate::Decision>> {
            let state = self.arena.get_mut(IntersectionId(0)).unwrap();
            let agent = self.pool.get_mut(IntersectionId(0)).unwrap();
            self.scheduler.step(state, agent, &obs)
        }

        fn need(&self, phase: u32) -> ObservationNeed {
            self.scheduler.need(self.arena.get(IntersectionId(0)).unwrap(), phase)
        }
    }

    fn reward(phase: u32, r: f64) -> Observation {
        Observation { phase, reward: Some(r), counts: None }
    }

    fn counts(phase: u32, c: [u32; 4]) -> Observation {
        Observation { phase, reward: None, counts: Some(c.to_vec()) }
    }

    #[test]
    fn non_decision_phase_is_ignored() {
        let mut f = fixture(ControlMode::Train);
        assert_eq!(f.need(2), ObservationNeed::Nothing);
        assert_eq!(f.step(Observation::phase_only(2)).unwrap(), None);
        let s = f.arena.get(IntersectionId(0)).unwrap();
        assert_eq!(s.remaining_time, 3);
        assert_eq!(s.timer, TimerState::Ignored);
    }

    #[test]
    fn training_window_then_boundary() {
        let mut f = fixture(ControlMode::Train);
        {
            let s = f.arena.get_mut(IntersectionId(0)).unwrap();
            assert_eq!(f.scheduler.prime(s, &[0, 0, 0, 0], 0).unwrap(), StateIndex(0));
        }

        assert_eq!(f.need(0), ObservationNeed::Reward);
        assert_eq!(f.step(reward(0, 2.0)).unwrap(), None);
        assert_eq!(f.need(0), ObservationNeed::Reward);
        assert_eq!(f.step(reward(0, 4.0)).unwrap(), None);
        assert_eq!(f.arena.get(IntersectionId(0)).unwrap().window.samples(), &[2.0, 4.0]);

        assert_eq!(f.need(0), ObservationNeed::Counts);
        let d = f.step(counts(0, [9, 0, 0, 0])).unwrap().expect("boundary should fire");
        assert_eq!(d.state, StateIndex(2));
        assert_eq!(d.action, ActionIndex(0));
        assert_eq!(d.duration, 30);
        assert_eq!(d.reward, Some(3.0));
        assert_eq!(d.next_phase, 1);
        assert_eq!(d.command().phase, 1);

        let s = f.arena.get(IntersectionId(0)).unwrap();
        assert_eq!(s.remaining_time, 30);
        assert!(s.window.is_empty());
        assert_eq!(s.last_state, Some(StateIndex(2)));
        assert_eq!(s.last_action, ActionIndex(0));

        // Q(0, 0) = 0.1 · (3.0 + 0.9 · 0 − 0)
        let q = f.pool.get(IntersectionId(0)).unwrap().table();
        assert!((q.get(StateIndex(0), ActionIndex(0)).unwrap() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn boundary_fires_once_per_crossing() {
        let mut f = fixture(ControlMode::Train);
        f.step(reward(4, 1.0)).unwrap();
        f.step(reward(4, 1.0)).unwrap();
        let d = f.step(counts(4, [0, 0, 0, 0])).unwrap();
        assert!(d.is_some());
        assert_eq!(d.unwrap().next_phase, 5);
        assert!(f.arena.get(IntersectionId(0)).unwrap().remaining_time > 0);
        assert_eq!(f.need(4), ObservationNeed::Reward);
        assert_eq!(f.step(reward(4, 1.0)).unwrap(), None);
    }

    #[test]
    fn last_slot_wraps_to_zero() {
        let config = ControlConfig {
            initial_remaining: 2,
            phases: tsc_core::PhaseConfig { phase_count: 8, decision_phases: vec![7] },
            ..greedy_config()
        };
        let scheduler = DecisionScheduler::new(&config, ControlMode::Evaluate).unwrap();
        let mut arena = IntersectionArena::new(["J0"], &config).unwrap();
        let mut pool = AgentPool::new(&config, 1).unwrap();
        let state = arena.get_mut(IntersectionId(0)).unwrap();
        let agent = pool.get_mut(IntersectionId(0)).unwrap();

        scheduler.step(state, agent, &Observation::phase_only(7)).unwrap();
        let obs = Observation { phase: 7, reward: None, counts: Some(vec![0; 4]) };
        let d = scheduler.step(state, agent, &obs).unwrap().unwrap();
        assert_eq!(d.next_phase, 0);
    }

    #[test]
    fn evaluate_mode_never_touches_the_table() {
        let mut f = fixture(ControlMode::Evaluate);
        {
            let s = f.arena.get_mut(IntersectionId(0)).unwrap();
            f.scheduler.prime(s, &[0, 0, 0, 0], 0).unwrap();
        }
        assert_eq!(f.need(0), ObservationNeed::Nothing);
        f.step(Observation::phase_only(0)).unwrap();
        f.step(Observation::phase_only(0)).unwrap();
        assert_eq!(f.need(0), ObservationNeed::Counts);
        let d = f.step(counts(0, [9, 9, 0, 0])).unwrap().unwrap();
        assert_eq!(d.reward, None);
        assert_eq!(d.state, StateIndex(8));

        let q = f.pool.get(IntersectionId(0)).unwrap().table();
        assert!(q.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn plain_mode_does_nothing() {
        let mut f = fixture(ControlMode::Plain);
        assert_eq!(f.need(0), ObservationNeed::Nothing);
        for _ in 0..10 {
            assert_eq!(f.step(Observation::phase_only(0)).unwrap(), None);
        }
        assert_eq!(f.arena.get(IntersectionId(0)).unwrap().remaining_time, 3);
    }

    #[test]
    fn missing_reading_is_reported() {
        let mut f = fixture(ControlMode::Train);
        let err = f.step(Observation::phase_only(0)).unwrap_err();
        assert!(matches!(err, ControlError::MissingObservation { what: "reward sample", .. }));

        let mut f = fixture(ControlMode::Evaluate);
        f.step(Observation::phase_only(0)).unwrap();
        f.step(Observation::phase_only(0)).unwrap();
        let err = f.step(Observation::phase_only(0)).unwrap_err();
        assert!(matches!(err, ControlError::MissingObservation { what: "approach counts", .. }));
    }

    #[test]
    fn new_episode_credits_the_initial_action() {
        let config = ControlConfig { initial_remaining: 3, ..greedy_config() };
        let mut f = fixture(ControlMode::Train);
        {
            let s = f.arena.get_mut(IntersectionId(0)).unwrap();
            s.last_state = Some(StateIndex(5));
            s.last_action = ActionIndex(1);
            s.remaining_time = 1;
        }

        f.arena.begin_episode(&config);
        {
            let s = f.arena.get_mut(IntersectionId(0)).unwrap();
            assert_eq!(s.last_action, ActionIndex(0));
            assert_eq!(s.remaining_time, 3);
            f.scheduler.prime(s, &[0, 0, 0, 0], 0).unwrap();
        }
        f.step(reward(0, 1.0)).unwrap();
        f.step(reward(0, 1.0)).unwrap();
        f.step(counts(0, [0, 0, 0, 0])).unwrap().expect("boundary should fire");

        let q = f.pool.get(IntersectionId(0)).unwrap().table();
        assert!((q.get(StateIndex(0), ActionIndex(0)).unwrap() - 0.1).abs() < 1e-12);
        assert_eq!(q.get(StateIndex(0), ActionIndex(1)).unwrap(), 0.0);
    }

    #[test]
    fn empty_window_is_reported_before_missing_counts() {
        let mut f = fixture(ControlMode::Train);
        f.arena.get_mut(IntersectionId(0)).unwrap().remaining_time = 1;
        let err = f.step(Observation::phase_only(0)).unwrap_err();
        assert!(matches!(err, ControlError::DegenerateWindow { .. }));
    }

    #[test]
    fn empty_window_at_boundary_is_degenerate() {
        let mut f = fixture(ControlMode::Train);
        f.arena.get_mut(IntersectionId(0)).unwrap().remaining_time = 1;
        let err = f.step(counts(0, [0, 0, 0, 0])).unwrap_err();
        assert!(matches!(
            err,
            ControlError::DegenerateWindow { intersection: IntersectionId(0), .. }
        ));
    }
}
