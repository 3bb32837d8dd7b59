//! Tabular Q-learning: a dense value table and the agent that explores and
//! updates it.
//!
//! The update is the one-step temporal-difference rule
//!
//! ```text
//! Q(s, a) ← Q(s, a) + α · (r + γ · max_a' Q(s', a') − Q(s, a))
//! ```
//!
//! Action selection is ε-greedy.  Ties in the greedy branch go to the lowest
//! action index so that a fresh all-zero table always exploits action 0.

use tsc_core::{ActionIndex, AgentRng, IntersectionId, LearningParams, StateIndex};

use crate::{ControlError, ControlResult};

// ── QTable ────────────────────────────────────────────────────────────────────

/// Dense row-major `states × actions` table of action values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QTable {
    states:  usize,
    actions: usize,
    values:  Vec<f64>,
}

impl QTable {
    /// All-zero table.
    pub fn new(states: usize, actions: usize) -> Self {
        Self { states, actions, values: vec![0.0; states * actions] }
    }

    /// Table from row-major `values`, or `None` if the length does not match
    /// the shape.
    pub fn from_values(states: usize, actions: usize, values: Vec<f64>) -> Option<Self> {
        (values.len() == states * actions).then_some(Self { states, actions, values })
    }

    #[inline]
    pub fn states(&self) -> usize {
        self.states
    }

    #[inline]
    pub fn actions(&self) -> usize {
        self.actions
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.states, self.actions)
    }

    /// Row of action values for `state`.
    pub fn row(&self, state: StateIndex) -> ControlResult<&[f64]> {
        let s = self.check_state(state)?;
        Ok(&self.values[s * self.actions..(s + 1) * self.actions])
    }

    pub fn get(&self, state: StateIndex, action: ActionIndex) -> ControlResult<f64> {
        let i = self.offset(state, action)?;
        Ok(self.values[i])
    }

    pub fn set(&mut self, state: StateIndex, action: ActionIndex, value: f64) -> ControlResult<()> {
        let i = self.offset(state, action)?;
        self.values[i] = value;
        Ok(())
    }

    /// Highest value in `state`'s row.
    pub fn max(&self, state: StateIndex) -> ControlResult<f64> {
        Ok(self.row(state)?.iter().copied().fold(f64::NEG_INFINITY, f64::max))
    }

    /// Greedy action for `state`; the lowest index wins ties.
    pub fn argmax(&self, state: StateIndex) -> ControlResult<ActionIndex> {
        let row = self.row(state)?;
        let mut best = 0usize;
        for (a, &v) in row.iter().enumerate().skip(1) {
            if v > row[best] {
                best = a;
            }
        }
        Ok(ActionIndex(best as u16))
    }

    /// Row-major view of every value.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Every cell as `(state, action, value)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (StateIndex, ActionIndex, f64)> + '_ {
        let actions = self.actions.max(1);
        self.values.iter().enumerate().map(move |(i, &v)| {
            (StateIndex((i / actions) as u32), ActionIndex((i % actions) as u16), v)
        })
    }

    fn check_state(&self, state: StateIndex) -> ControlResult<usize> {
        let s = state.index();
        if s >= self.states {
            return Err(ControlError::StateOutOfRange { state, states: self.states });
        }
        Ok(s)
    }

    fn offset(&self, state: StateIndex, action: ActionIndex) -> ControlResult<usize> {
        let s = self.check_state(state)?;
        let a = action.index();
        if a >= self.actions {
            return Err(ControlError::ActionOutOfRange { action, actions: self.actions });
        }
        Ok(s * self.actions + a)
    }
}

// ── QLearningAgent ────────────────────────────────────────────────────────────

/// One intersection's learner: its table, hyper-parameters, and private RNG.
pub struct QLearningAgent {
    table:  QTable,
    params: LearningParams,
    rng:    AgentRng,
}

impl QLearningAgent {
    /// Fresh all-zero agent for `intersection`, seeded from `seed`.
    pub fn new(
        intersection: IntersectionId,
        (states, actions): (usize, usize),
        params: LearningParams,
        seed: u64,
    ) -> Self {
        Self::with_table(QTable::new(states, actions), params, AgentRng::new(seed, intersection))
    }

    pub fn with_table(table: QTable, params: LearningParams, rng: AgentRng) -> Self {
        Self { table, params, rng }
    }

    /// ε-greedy action for `state`.
    pub fn choose(&mut self, state: StateIndex) -> ControlResult<ActionIndex> {
        // Validate before touching the RNG so a bad state never shifts the
        // exploration sequence.
        let greedy = self.table.argmax(state)?;
        if self.table.actions() > 1 && self.rng.gen_bool(self.params.epsilon) {
            let a = self.rng.gen_range(0..self.table.actions());
            return Ok(ActionIndex(a as u16));
        }
        Ok(greedy)
    }

    /// Apply the TD update for the transition `(prev, action) → next` with
    /// `reward`, returning the new value of `Q(prev, action)`.
    pub fn update(
        &mut self,
        prev: StateIndex,
        action: ActionIndex,
        next: StateIndex,
        reward: f64,
    ) -> ControlResult<f64> {
        let LearningParams { alpha, gamma, .. } = self.params;
        let current = self.table.get(prev, action)?;
        let target = reward + gamma * self.table.max(next)?;
        let updated = current + alpha * (target - current);
        self.table.set(prev, action, updated)?;
        Ok(updated)
    }

    #[inline]
    pub fn table(&self) -> &QTable {
        &self.table
    }

    /// Replace the learned table, e.g. with one loaded from disk.
    ///
    /// # Errors
    ///
    /// [`ControlError::TableShape`] if the shapes differ.
    pub fn replace_table(&mut self, table: QTable) -> ControlResult<()> {
        if table.shape() != self.table.shape() {
            return Err(ControlError::TableShape {
                expected: self.table.shape(),
                got:      table.shape(),
            });
        }
        self.table = table;
        Ok(())
    }

    #[inline]
    pub fn params(&self) -> &LearningParams {
        &self.params
    }
}

impl std::fmt::Debug for QLearningAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QLearningAgent")
            .field("shape", &self.table.shape())
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
