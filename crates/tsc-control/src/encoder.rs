//! Discretisation of raw per-approach counts into a single state index.
//!
//! Each count falls into a bin (`{0: <5, 1: 5..=8, 2: >=9}` by default) and
//! the bin sequence is read as a mixed-radix number, least significant digit
//! first:
//!
//! ```text
//! occupancy = Σ bin[i] · bins^i            in [0, B),  B = bins^approaches
//! state     = occupancy        if phase <  group_split
//!           = occupancy + B    if phase >= group_split
//! ```
//!
//! The top bin absorbs every count at or above the last threshold, so large
//! queues never overflow the encoding.

use tsc_core::{ConfigError, EncoderConfig, StateIndex};

use crate::{ControlError, ControlResult};

#[derive(Debug, Clone)]
pub struct StateEncoder {
    thresholds:       Vec<u32>,
    approaches:       usize,
    bins:             u64,
    occupancy_states: u64,
    group_split:      u32,
}

impl StateEncoder {
    pub fn new(config: &EncoderConfig) -> ControlResult<Self> {
        let occupancy_states = config
            .state_count()
            .and_then(|_| config.occupancy_states())
            .filter(|&b| b.saturating_mul(2) <= u32::MAX as usize)
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "{} bins over {} approaches overflows the state index",
                    config.bins(),
                    config.approaches
                ))
            })?;

        Ok(Self {
            thresholds:       config.bin_thresholds.clone(),
            approaches:       config.approaches,
            bins:             config.bins() as u64,
            occupancy_states: occupancy_states as u64,
            group_split:      config.group_split,
        })
    }

    /// Bin of a single approach count.
    #[inline]
    pub fn bin(&self, count: u32) -> u32 {
        self.thresholds.iter().take_while(|&&t| count >= t).count() as u32
    }

    /// Encode `counts` observed during `phase`.
    ///
    /// # Errors
    ///
    /// [`ControlError::ApproachMismatch`] if `counts` does not have exactly
    /// one entry per configured approach.
    pub fn encode(&self, counts: &[u32], phase: u32) -> ControlResult<StateIndex> {
        if counts.len() != self.approaches {
            return Err(ControlError::ApproachMismatch {
                expected: self.approaches,
                got:      counts.len(),
            });
        }

        let mut state = 0u64;
        let mut weight = 1u64;
        for &count in counts {
            state += u64::from(self.bin(count)) * weight;
            weight *= self.bins;
        }
        if phase >= self.group_split {
            state += self.occupancy_states;
        }
        Ok(StateIndex(state as u32))
    }

    /// Size of one phase group's block of states.
    #[inline]
    pub fn occupancy_states(&self) -> usize {
        self.occupancy_states as usize
    }

    /// Total number of states `encode` can produce.
    #[inline]
    pub fn state_count(&self) -> usize {
        self.occupancy_states as usize * 2
    }

    #[inline]
    pub fn approaches(&self) -> usize {
        self.approaches
    }
}
