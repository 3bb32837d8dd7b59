//! `AgentPool`: one independent Q-learning agent per intersection.
//!
//! Agents persist across episodes; only the per-episode scheduling state in
//! [`IntersectionArena`][crate::IntersectionArena] is rebuilt.

use tsc_core::{ControlConfig, IntersectionId};

use crate::{ControlError, ControlResult, QLearningAgent, QTable};

#[derive(Debug)]
pub struct AgentPool {
    agents: Vec<QLearningAgent>,
}

impl AgentPool {
    /// Build `count` fresh agents from a validated config.
    pub fn new(config: &ControlConfig, count: usize) -> ControlResult<Self> {
        config.validate()?;
        let shape = config.table_shape();
        let agents = (0..count)
            .map(|i| {
                QLearningAgent::new(IntersectionId(i as u32), shape, config.learning, config.seed)
            })
            .collect();
        Ok(Self { agents })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    #[inline]
    pub fn get(&self, id: IntersectionId) -> Option<&QLearningAgent> {
        self.agents.get(id.index())
    }

    #[inline]
    pub fn get_mut(&mut self, id: IntersectionId) -> Option<&mut QLearningAgent> {
        self.agents.get_mut(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (IntersectionId, &QLearningAgent)> {
        self.agents
            .iter()
            .enumerate()
            .map(|(i, a)| (IntersectionId(i as u32), a))
    }

    /// Slice view in id order, for zipping with the arena.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [QLearningAgent] {
        &mut self.agents
    }

    /// Snapshot of every agent's table in id order.
    pub fn tables(&self) -> Vec<QTable> {
        self.agents.iter().map(|a| a.table().clone()).collect()
    }

    /// Install previously saved tables, one per agent in id order.
    pub fn load_tables(&mut self, tables: Vec<QTable>) -> ControlResult<()> {
        if tables.len() != self.agents.len() {
            return Err(ControlError::AgentCount {
                expected: self.agents.len(),
                got:      tables.len(),
            });
        }
        for (agent, table) in self.agents.iter_mut().zip(tables) {
            agent.replace_table(table)?;
        }
        Ok(())
    }
}
