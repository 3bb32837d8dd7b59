//! Unit tests for tsc-core primitives.

#[cfg(test)]
mod ids {
    use crate::{ActionIndex, IntersectionId, StateIndex};

    #[test]
    fn index_roundtrip() {
        let id = IntersectionId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(IntersectionId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(IntersectionId::INVALID.0, u32::MAX);
        assert_eq!(StateIndex::INVALID.0, u32::MAX);
        assert_eq!(ActionIndex::INVALID.0, u16::MAX);
        assert_eq!(ActionIndex::default(), ActionIndex::INVALID);
    }

    #[test]
    fn action_index_rejects_overflow() {
        assert!(ActionIndex::try_from(70_000usize).is_err());
    }

    #[test]
    fn display() {
        assert_eq!(IntersectionId(7).to_string(), "IntersectionId(7)");
    }
}

#[cfg(test)]
mod time {
    use crate::Tick;

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(t.next(), Tick(11));
        assert_eq!(t.next().next().since(t), 2);
    }

    #[test]
    fn since_saturates() {
        assert_eq!(Tick(10).since(Tick(4)), 6);
        assert_eq!(Tick(4).since(Tick(10)), 0);
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentRng, IntersectionId, SimRng};

    #[test]
    fn same_seed_same_sequence() {
        let mut a = AgentRng::new(7, IntersectionId(3));
        let mut b = AgentRng::new(7, IntersectionId(3));
        let xs: Vec<u32> = (0..16).map(|_| a.gen_range(0..1000)).collect();
        let ys: Vec<u32> = (0..16).map(|_| b.gen_range(0..1000)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn different_intersections_diverge() {
        let mut a = AgentRng::new(7, IntersectionId(0));
        let mut b = AgentRng::new(7, IntersectionId(1));
        let xs: Vec<u32> = (0..16).map(|_| a.gen_range(0..1_000_000)).collect();
        let ys: Vec<u32> = (0..16).map(|_| b.gen_range(0..1_000_000)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn gen_bool_clamps() {
        let mut r = AgentRng::new(1, IntersectionId(0));
        assert!(r.gen_bool(2.0));
        assert!(!r.gen_bool(-1.0));
    }

    #[test]
    fn sim_rng_children_are_reproducible() {
        let mut root_a = SimRng::new(99);
        let mut root_b = SimRng::new(99);
        let mut ca = root_a.child(1);
        let mut cb = root_b.child(1);
        assert_eq!(ca.gen_range(0u64..u64::MAX), cb.gen_range(0u64..u64::MAX));
    }
}

#[cfg(test)]
mod config {
    use crate::{ConfigError, ControlConfig};

    fn assert_invalid(cfg: &ControlConfig) {
        assert!(
            matches!(cfg.validate(), Err(ConfigError::Invalid(_))),
            "expected Invalid for {cfg:?}"
        );
    }

    #[test]
    fn default_is_valid() {
        ControlConfig::default().validate().unwrap();
    }

    #[test]
    fn default_table_shape_matches_reference_layout() {
        let cfg = ControlConfig::default();
        assert_eq!(cfg.encoder.occupancy_states(), Some(81));
        assert_eq!(cfg.table_shape(), (162, 3));
    }

    #[test]
    fn rejects_one_tick_duration() {
        let mut cfg = ControlConfig::default();
        cfg.actions.durations = vec![30, 1];
        assert_invalid(&cfg);
    }

    #[test]
    fn rejects_short_initial_countdown() {
        let mut cfg = ControlConfig::default();
        cfg.initial_remaining = 1;
        assert_invalid(&cfg);
    }

    #[test]
    fn rejects_unsorted_thresholds() {
        let mut cfg = ControlConfig::default();
        cfg.encoder.bin_thresholds = vec![9, 5];
        assert_invalid(&cfg);
    }

    #[test]
    fn rejects_decision_phase_outside_cycle() {
        let mut cfg = ControlConfig::default();
        cfg.phases.decision_phases = vec![0, 8];
        assert_invalid(&cfg);
    }

    #[test]
    fn rejects_duplicate_decision_phases() {
        let mut cfg = ControlConfig::default();
        cfg.phases.decision_phases = vec![4, 4];
        assert_invalid(&cfg);
    }

    #[test]
    fn rejects_out_of_range_learning_rates() {
        let mut cfg = ControlConfig::default();
        cfg.learning.alpha = 0.0;
        assert_invalid(&cfg);

        let mut cfg = ControlConfig::default();
        cfg.learning.epsilon = 1.5;
        assert_invalid(&cfg);
    }

    #[test]
    fn rejects_initial_action_outside_action_set() {
        let mut cfg = ControlConfig::default();
        cfg.initial_action = 3;
        assert_invalid(&cfg);
    }

    #[test]
    fn rejects_state_space_overflow() {
        let mut cfg = ControlConfig::default();
        cfg.encoder.approaches = 64;
        assert_invalid(&cfg);
    }

    #[test]
    fn next_phase_wraps() {
        let cfg = ControlConfig::default();
        assert_eq!(cfg.phases.next_phase(0), 1);
        assert_eq!(cfg.phases.next_phase(4), 5);
        assert_eq!(cfg.phases.next_phase(7), 0);
        assert!(cfg.phases.is_decision_phase(4));
        assert!(!cfg.phases.is_decision_phase(3));
    }
}

#[cfg(test)]
mod discover {
    use std::fs;

    use crate::{files_with_suffix, unique_file, ConfigError};

    #[test]
    fn unique_file_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("grid.net.xml"), "").unwrap();
        fs::write(dir.path().join("a.rou.csv"), "").unwrap();
        let found = unique_file(dir.path(), "net.xml").unwrap();
        assert_eq!(found, dir.path().join("grid.net.xml"));
    }

    #[test]
    fn unique_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = unique_file(dir.path(), ".sumocfg").unwrap_err();
        assert!(matches!(err, ConfigError::MissingInput { .. }));
    }

    #[test]
    fn unique_file_ambiguous() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.net.xml"), "").unwrap();
        fs::write(dir.path().join("b.net.xml"), "").unwrap();
        let err = unique_file(dir.path(), "net.xml").unwrap_err();
        assert!(matches!(err, ConfigError::AmbiguousInput { count: 2, .. }));
    }

    #[test]
    fn scenario_listing_is_sorted_and_skips_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("c.rou.csv"), "").unwrap();
        fs::write(dir.path().join("a.rou.csv"), "").unwrap();
        fs::create_dir(dir.path().join("nested.rou.csv")).unwrap();
        let found = files_with_suffix(dir.path(), ".rou.csv").unwrap();
        assert_eq!(found, vec![dir.path().join("a.rou.csv"), dir.path().join("c.rou.csv")]);
    }
}
