//! Per-episode scheduling state for every controlled intersection.
//!
//! # Layout
//!
//! Records are stored densely in registration order, so an
//! [`IntersectionId`] is simply an index.  The learning agents live in a
//! separate [`AgentPool`][crate::AgentPool] with the same indexing; the
//! decide phase zips `arena.as_mut_slice()` with `pool.as_mut_slice()` and
//! hands each worker exclusive access to one pair.

use std::collections::HashMap;

use tsc_core::{ActionIndex, ConfigError, ControlConfig, IntersectionId, StateIndex};

use crate::{ControlError, ControlResult, RewardWindow};

// ── TimerState ────────────────────────────────────────────────────────────────

/// What the countdown did on the most recent step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimerState {
    /// The phase was a decision phase and the countdown ran.
    Counting,
    /// Any other phase; nothing happened.
    #[default]
    Ignored,
}

// ── IntersectionControlState ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct IntersectionControlState {
    pub id:   IntersectionId,
    pub name: String,

    /// Ticks left before the next decision boundary.  Only decremented while
    /// the signal sits in a decision phase.
    pub remaining_time: i64,

    /// State encoded at the previous boundary (or at registration).
    pub last_state: Option<StateIndex>,

    /// Action chosen at the previous boundary.
    pub last_action: ActionIndex,

    /// Rewards sampled since the previous boundary.
    pub window: RewardWindow,

    pub timer: TimerState,
}

impl IntersectionControlState {
    pub fn new(id: IntersectionId, name: impl Into<String>, config: &ControlConfig) -> Self {
        Self {
            id,
            name: name.into(),
            remaining_time: i64::from(config.initial_remaining),
            last_state: None,
            last_action: ActionIndex(config.initial_action),
            window: RewardWindow::new(),
            timer: TimerState::Ignored,
        }
    }

    /// Return to the registration state for a new episode.
    ///
    /// The first window of every episode runs on `initial_remaining` under
    /// `initial_action`, so both are restored together.  The episode
    /// controller re-primes `last_state` from the first observation after
    /// start.
    pub fn begin_episode(&mut self, config: &ControlConfig) {
        self.remaining_time = i64::from(config.initial_remaining);
        self.last_state = None;
        self.last_action = ActionIndex(config.initial_action);
        self.window.clear();
        self.timer = TimerState::Ignored;
    }
}

// ── IntersectionArena ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct IntersectionArena {
    states:  Vec<IntersectionControlState>,
    by_name: HashMap<String, IntersectionId>,
}

impl IntersectionArena {
    /// Register `names` in order.  Ids are assigned `0, 1, 2, …`.
    ///
    /// # Errors
    ///
    /// A duplicate name is a configuration error.
    pub fn new<I, S>(names: I, config: &ControlConfig) -> ControlResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut arena = Self::default();
        for name in names {
            let name = name.into();
            let id = IntersectionId(arena.states.len() as u32);
            if arena.by_name.insert(name.clone(), id).is_some() {
                return Err(ConfigError::Invalid(format!(
                    "intersection {name:?} registered twice"
                ))
                .into());
            }
            arena.states.push(IntersectionControlState::new(id, name, config));
        }
        Ok(arena)
    }

    /// [`begin_episode`](IntersectionControlState::begin_episode) on every record.
    pub fn begin_episode(&mut self, config: &ControlConfig) {
        for state in &mut self.states {
            state.begin_episode(config);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn id_of(&self, name: &str) -> ControlResult<IntersectionId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| ControlError::UnknownIntersection(name.to_owned()))
    }

    #[inline]
    pub fn get(&self, id: IntersectionId) -> Option<&IntersectionControlState> {
        self.states.get(id.index())
    }

    #[inline]
    pub fn get_mut(&mut self, id: IntersectionId) -> Option<&mut IntersectionControlState> {
        self.states.get_mut(id.index())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IntersectionControlState> {
        self.states.iter()
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [IntersectionControlState] {
        &mut self.states
    }

    /// Names in id order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(|s| s.name.as_str())
    }
}
