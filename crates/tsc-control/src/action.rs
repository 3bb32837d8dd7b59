//! Action index → countdown duration.

use tsc_core::{ActionConfig, ActionIndex};

/// Fixed lookup from action to green duration, total over every index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTranslator {
    durations: Vec<u32>,
    fallback:  u32,
}

impl ActionTranslator {
    pub fn new(config: &ActionConfig) -> Self {
        Self {
            durations: config.durations.clone(),
            fallback:  config.fallback,
        }
    }

    /// Countdown, in ticks, for `action`.  Unknown actions get the fallback.
    #[inline]
    pub fn duration_for(&self, action: ActionIndex) -> u32 {
        self.durations
            .get(action.index())
            .copied()
            .unwrap_or(self.fallback)
    }

    #[inline]
    pub fn action_count(&self) -> usize {
        self.durations.len()
    }
}

impl Default for ActionTranslator {
    /// `0 → 30`, `1 → 10`, `2 → 20`, anything else `→ 30`.
    fn default() -> Self {
        Self::new(&ActionConfig::default())
    }
}
